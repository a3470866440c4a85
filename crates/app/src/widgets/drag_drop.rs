//! Drag and drop handler for attaching files.
//!
//! Uses egui's dropped_files functionality to handle file drops. Only
//! extensions the attachment model accepts are kept; everything else is
//! ignored at the drop site.

use egui::{Context, Id, Rect, Vec2};
use shared::attachment::mime_for_extension;
use std::path::{Path, PathBuf};

/// Handler for drag and drop file operations.
pub struct DragDropHandler {
    /// Files that have been dropped
    dropped_files: Vec<PathBuf>,
    /// Whether files are currently being dragged over
    hovering: bool,
    /// ID for the drop overlay
    id: Id,
}

fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| mime_for_extension(&ext.to_ascii_lowercase()).is_some())
        .unwrap_or(false)
}

impl DragDropHandler {
    /// Create a new drag and drop handler.
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            dropped_files: Vec::new(),
            hovering: false,
            id: Id::new(id),
        }
    }

    /// Process any dropped files from the frame.
    ///
    /// Call this each frame to capture dropped files.
    pub fn update(&mut self, ctx: &Context) {
        ctx.input(|i| {
            self.hovering = !i.raw.hovered_files.is_empty();

            for file in &i.raw.dropped_files {
                if let Some(path) = &file.path {
                    if is_accepted(path) {
                        self.dropped_files.push(path.clone());
                    } else {
                        tracing::debug!(path = %path.display(), "ignoring dropped file");
                    }
                }
            }
        });
    }

    /// Take and clear dropped files.
    pub fn take_dropped_files(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.dropped_files)
    }

    /// Check if files are currently being dragged over the window.
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    /// Show an overlay when files are being dragged over the window.
    pub fn show_drag_overlay(&self, ctx: &Context) {
        if !self.hovering {
            return;
        }

        egui::Area::new(self.id.with("overlay"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                let screen_rect = ctx.screen_rect();

                // Semi-transparent overlay
                ui.painter().rect_filled(
                    screen_rect,
                    0.0,
                    egui::Color32::from_black_alpha(100),
                );

                // Centered drop indicator
                let indicator_size = Vec2::new(300.0, 150.0);
                let indicator_rect = Rect::from_center_size(screen_rect.center(), indicator_size);

                ui.painter().rect(
                    indicator_rect,
                    8.0,
                    ui.visuals().extreme_bg_color,
                    egui::Stroke::new(3.0, ui.visuals().selection.bg_fill),
                );

                ui.painter().text(
                    indicator_rect.center(),
                    egui::Align2::CENTER_CENTER,
                    "📥 Drop a PDF or image here",
                    egui::FontId::proportional(18.0),
                    ui.visuals().strong_text_color(),
                );
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_drop_handler_creation() {
        let handler = DragDropHandler::new("test");
        assert!(!handler.is_hovering());
        assert!(handler.dropped_files.is_empty());
    }

    #[test]
    fn test_is_accepted_filters_by_extension() {
        assert!(is_accepted(Path::new("report.pdf")));
        assert!(is_accepted(Path::new("photo.JPEG")));
        assert!(!is_accepted(Path::new("notes.txt")));
        assert!(!is_accepted(Path::new("no_extension")));
    }

    #[test]
    fn test_take_dropped_files_clears_queue() {
        let mut handler = DragDropHandler::new("test");
        handler.dropped_files.push(PathBuf::from("a.pdf"));

        let taken = handler.take_dropped_files();
        assert_eq!(taken, vec![PathBuf::from("a.pdf")]);
        assert!(handler.dropped_files.is_empty());
    }
}
