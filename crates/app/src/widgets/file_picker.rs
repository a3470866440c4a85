//! Native file dialogs using rfd (rust file dialog).

use std::path::PathBuf;

/// Ask the user for a PDF to attach.
pub fn pick_pdf() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Attach PDF")
        .add_filter("PDF", &["pdf"])
        .pick_file()
}

/// Ask the user for an image to attach.
pub fn pick_image() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Attach Image")
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
        .pick_file()
}
