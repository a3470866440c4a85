//! The single-window prompt layout.

use crate::state::AppState;
use crate::widgets::file_picker;
use eframe::egui;

pub fn draw(ctx: &egui::Context, state: &mut AppState) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Askpad");
        ui.add_space(8.0);

        // Attachment chip with a remove button.
        if let Some(att) = &state.attachment {
            let label = att.label();
            let mut remove = false;
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(format!("📎 {}", label)).weak());
                if ui.small_button("✕").on_hover_text("Remove attachment").clicked() {
                    remove = true;
                }
            });
            if remove {
                state.remove_attachment();
            }
            ui.add_space(4.0);
        }

        // Input row
        ui.horizontal(|ui| {
            let mic_label = if state.recorder.is_recording() {
                "⏹"
            } else {
                "🎤"
            };
            if ui
                .add_sized([36.0, 36.0], egui::Button::new(mic_label))
                .on_hover_text("Record a voice prompt")
                .clicked()
            {
                state.toggle_recording();
            }

            let response = ui.add_sized(
                [ui.available_width() - 76.0, 36.0],
                egui::TextEdit::singleline(&mut state.prompt)
                    .hint_text("Ask a question...")
                    .font(egui::FontId::new(15.0, egui::FontFamily::Proportional)),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                state.send();
            }

            let send = egui::Button::new("Send").fill(egui::Color32::from_rgb(70, 130, 180));
            if ui.add_sized([70.0, 36.0], send).clicked() && !state.loading {
                state.send();
            }
        });

        ui.add_space(4.0);

        // Attachment and capture actions
        ui.horizontal(|ui| {
            if ui.button("Attach PDF").clicked() {
                if let Some(path) = file_picker::pick_pdf() {
                    state.attach_path(&path);
                }
            }
            if ui.button("Attach Image").clicked() {
                if let Some(path) = file_picker::pick_image() {
                    state.attach_path(&path);
                }
            }
            if ui.button("Screenshot").clicked() && !state.loading {
                let text = state.prompt.clone();
                state.send_screenshot(text);
            }
        });

        ui.separator();

        if state.loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
            ui.add_space(4.0);
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                if state.response.is_empty() && !state.loading {
                    ui.label(
                        egui::RichText::new("Responses will appear here.").weak(),
                    );
                } else {
                    ui.label(&state.response);
                }
            });
    });
}
