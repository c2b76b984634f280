//! End-to-end scenarios driving a `Workspace` against the in-memory drive.

mod helpers;

mod browse_test;
mod copy_test;
mod poll_test;
mod preview_test;
mod share_test;
