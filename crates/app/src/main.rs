//! Askpad — a small desktop assistant that forwards text, images, PDFs,
//! voice recordings, and screen captures to the OpenAI API and shows the
//! textual response.

use eframe::egui;
use shared::settings::AppSettings;

mod state;
mod ui;
mod widgets;

use state::AppState;

struct AskpadApp {
    state: AppState,
    drag_drop: widgets::drag_drop::DragDropHandler,
}

impl eframe::App for AskpadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drag_drop.update(ctx);
        for path in self.drag_drop.take_dropped_files() {
            self.state.attach_path(&path);
        }

        self.state.poll_results();
        ui::draw(ctx, &mut self.state);
        self.drag_drop.show_drag_overlay(ctx);

        // Keep polling while a request is in flight.
        if self.state.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = AppSettings::load_or_default();
    if settings.openai_api_key.is_empty() {
        tracing::warn!("no OpenAI API key configured; the API will reject requests");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([760.0, 560.0])
            .with_min_inner_size([480.0, 360.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        "Askpad",
        options,
        Box::new(|_cc| {
            Box::new(AskpadApp {
                state: AppState::new(settings),
                drag_drop: widgets::drag_drop::DragDropHandler::new("askpad_drop"),
            })
        }),
    )
}
