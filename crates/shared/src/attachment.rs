//! Attachment model for the prompt box.
//!
//! At most one attachment accompanies a message. Image/PDF exclusivity is
//! structural: `Attachment` is a single enum, so there is never a "both set"
//! state for callers to reason about.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single user-selected file accompanying the message draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Attachment {
    /// An image, inlined into the request as a base64 data URL.
    Image { bytes: Vec<u8>, mime: String },
    /// A PDF, sent by reference after a one-time upload.
    ///
    /// `file_id` is the remote identifier returned by the upload endpoint.
    /// It is `None` until the first successful upload and is discarded with
    /// the attachment, so replacing the PDF always re-uploads.
    Pdf {
        bytes: Vec<u8>,
        file_name: String,
        file_id: Option<String>,
    },
}

impl Attachment {
    pub fn image(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Attachment::Image {
            bytes,
            mime: mime.into(),
        }
    }

    pub fn pdf(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        Attachment::Pdf {
            bytes,
            file_name: file_name.into(),
            file_id: None,
        }
    }

    /// Load an attachment from a local path, keying off the extension.
    ///
    /// Returns `Ok(None)` for file types this app doesn't handle.
    pub fn from_path(path: &Path) -> std::io::Result<Option<Self>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let Some(mime) = mime_for_extension(&ext) else {
            return Ok(None);
        };

        let bytes = std::fs::read(path)?;
        if mime == "application/pdf" {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "document.pdf".to_string());
            Ok(Some(Attachment::pdf(bytes, name)))
        } else {
            Ok(Some(Attachment::image(bytes, mime)))
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Attachment::Pdf { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Attachment::Image { .. })
    }

    /// Remote file identifier, if this PDF has already been uploaded.
    pub fn file_id(&self) -> Option<&str> {
        match self {
            Attachment::Pdf { file_id, .. } => file_id.as_deref(),
            Attachment::Image { .. } => None,
        }
    }

    /// Record the identifier returned by the upload endpoint. No-op for images.
    pub fn set_file_id(&mut self, id: String) {
        if let Attachment::Pdf { file_id, .. } = self {
            *file_id = Some(id);
        }
    }

    /// Short label for the attachment indicator chip.
    pub fn label(&self) -> String {
        match self {
            Attachment::Image { bytes, mime } => {
                format!("Image ({}, {} KB)", mime, bytes.len() / 1024)
            }
            Attachment::Pdf { file_name, file_id, .. } => {
                if file_id.is_some() {
                    format!("PDF: {} (uploaded)", file_name)
                } else {
                    format!("PDF: {}", file_name)
                }
            }
        }
    }
}

/// MIME type for the extensions this app accepts, `None` otherwise.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_starts_without_file_id() {
        let att = Attachment::pdf(vec![1, 2, 3], "report.pdf");
        assert!(att.is_pdf());
        assert_eq!(att.file_id(), None);
    }

    #[test]
    fn test_set_file_id_persists_on_pdf() {
        let mut att = Attachment::pdf(vec![0u8; 16], "report.pdf");
        att.set_file_id("file-abc123".to_string());
        assert_eq!(att.file_id(), Some("file-abc123"));
    }

    #[test]
    fn test_set_file_id_is_noop_for_images() {
        let mut att = Attachment::image(vec![0u8; 16], "image/png");
        att.set_file_id("file-abc123".to_string());
        assert_eq!(att.file_id(), None);
    }

    #[test]
    fn test_replacing_attachment_discards_file_id() {
        let mut att = Attachment::pdf(vec![1], "first.pdf");
        att.set_file_id("file-old".to_string());

        // Selecting a new PDF builds a fresh value; nothing carries over.
        att = Attachment::pdf(vec![2], "second.pdf");
        assert_eq!(att.file_id(), None);
    }

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("txt"), None);
    }

    #[test]
    fn test_from_path_rejects_unknown_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        assert!(Attachment::from_path(&path).unwrap().is_none());
    }

    #[test]
    fn test_from_path_reads_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let att = Attachment::from_path(&path).unwrap().unwrap();
        match att {
            Attachment::Pdf { bytes, file_name, file_id } => {
                assert_eq!(bytes, b"%PDF-1.4");
                assert_eq!(file_name, "paper.pdf");
                assert!(file_id.is_none());
            }
            other => panic!("expected PDF, got {:?}", other),
        }
    }
}
