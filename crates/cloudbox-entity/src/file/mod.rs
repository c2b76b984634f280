//! File domain entities.

pub mod category;
pub mod model;

pub use category::{FileCategory, ListFilter};
pub use model::File;
