//! Sample drive used by `--offline`.

use cloudbox_client::MemoryFileApi;

/// An in-memory drive with a few folders and files of every category.
pub fn sample_drive() -> MemoryFileApi {
    let api = MemoryFileApi::new();

    let docs = api.add_folder("Docs", None);
    let reports = api.add_folder("Reports", Some(&docs));
    api.add_folder("Photos", None);

    api.add_file("a.png", "image/png", None, &b"\x89PNG\r\n\x1a\n"[..]);
    api.add_file("welcome.pdf", "application/pdf", None, &b"%PDF-1.7\n"[..]);
    api.add_file(
        "budget.xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some(&docs),
        &b"PK\x03\x04"[..],
    );
    api.add_file("q3.pdf", "application/pdf", Some(&reports), &b"%PDF-1.7\n"[..]);
    api.add_file("backup.zip", "application/zip", None, &b"PK\x03\x04"[..]);
    api.add_file("clip.mp4", "video/mp4", None, &b"\x00\x00\x00\x18ftyp"[..]);

    api
}
