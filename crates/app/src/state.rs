//! App state and the background send plumbing.
//!
//! Network work runs on plain background threads with their own tokio
//! runtime; results come back over `std::sync::mpsc` channels polled once
//! per frame. Two quick sends proceed independently; there is no
//! cancellation or de-duplication, and every completed send is applied
//! in completion order.

use capture::voice::VoiceRecorder;
use providers::openai::OpenAIClient;
use providers::request;
use shared::attachment::Attachment;
use shared::error::AssistError;
use shared::settings::AppSettings;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

/// Result from a background send.
pub struct SendResult {
    pub response: String,
    pub error: Option<String>,
    /// Remote id minted while sending a PDF, persisted for reuse.
    pub pdf_file_id: Option<String>,
    /// The send inlined an image, whose bytes are now spent.
    pub was_image: bool,
    /// Which attachment this send captured; stale results must not touch
    /// an attachment the user has since replaced.
    pub generation: u64,
}

/// Result from a background transcription.
pub struct TranscribeResult {
    pub text: String,
    pub error: Option<String>,
}

pub struct AppState {
    /// Current message draft.
    pub prompt: String,
    /// Latest response or error text for the output pane.
    pub response: String,
    /// At most one attachment; replacing it discards any stored file id.
    pub attachment: Option<Attachment>,
    pub loading: bool,
    pub recorder: VoiceRecorder,

    client: Arc<OpenAIClient>,
    send_rxs: Vec<Receiver<SendResult>>,
    transcribe_rx: Option<Receiver<TranscribeResult>>,
    /// Bumped whenever the attachment slot changes.
    attachment_generation: u64,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            prompt: String::new(),
            response: String::new(),
            attachment: None,
            loading: false,
            recorder: VoiceRecorder::new(),
            client: Arc::new(OpenAIClient::new(&settings)),
            send_rxs: Vec::new(),
            transcribe_rx: None,
            attachment_generation: 0,
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.send_rxs.is_empty() || self.transcribe_rx.is_some()
    }

    /// Attach a picked or dropped file, replacing whatever was there.
    pub fn attach_path(&mut self, path: &Path) {
        match Attachment::from_path(path) {
            Ok(Some(att)) => {
                tracing::info!(path = %path.display(), "attachment selected");
                self.attachment = Some(att);
                self.attachment_generation += 1;
            }
            Ok(None) => {
                self.response = format!("Unsupported file type: {}", path.display());
            }
            Err(e) => {
                self.response = format!("Error: failed to read {}: {}", path.display(), e);
            }
        }
    }

    pub fn remove_attachment(&mut self) {
        self.attachment = None;
        self.attachment_generation += 1;
    }

    /// Kick off a send for the current draft and attachment.
    pub fn send(&mut self) {
        if self.prompt.trim().is_empty() && self.attachment.is_none() {
            self.response = format!("Error: {}", AssistError::EmptyInput);
            return;
        }

        // "screen" in a bare prompt asks for a screenshot-backed answer.
        if self.attachment.is_none() && self.prompt.to_lowercase().contains("screen") {
            let text = self.prompt.clone();
            self.send_screenshot(text);
            return;
        }

        let text = self.prompt.clone();
        let mut attachment = self.attachment.clone();
        let generation = self.attachment_generation;
        let client = Arc::clone(&self.client);
        let (tx, rx) = channel::<SendResult>();
        self.send_rxs.push(rx);
        self.loading = true;
        self.response.clear();

        std::thread::spawn(move || {
            let result: Result<String, AssistError> = (|| {
                let rt = tokio::runtime::Runtime::new()
                    .map_err(|e| AssistError::Completion(e.to_string()))?;
                rt.block_on(client.send_prompt(&text, &mut attachment))
            })();

            let was_image = matches!(attachment, Some(Attachment::Image { .. }));
            let pdf_file_id = attachment
                .as_ref()
                .and_then(|a| a.file_id().map(str::to_string));

            let out = match result {
                Ok(response) => SendResult {
                    response,
                    error: None,
                    pdf_file_id,
                    was_image,
                    generation,
                },
                Err(e) => SendResult {
                    response: String::new(),
                    error: Some(e.to_string()),
                    pdf_file_id,
                    was_image,
                    generation,
                },
            };
            let _ = tx.send(out);
        });
    }

    /// Capture the screen on a background thread and send it as a vision
    /// request with the given text.
    pub fn send_screenshot(&mut self, text: String) {
        let generation = self.attachment_generation;
        let client = Arc::clone(&self.client);
        let (tx, rx) = channel::<SendResult>();
        self.send_rxs.push(rx);
        self.loading = true;
        self.response.clear();

        std::thread::spawn(move || {
            let result: Result<String, AssistError> = (|| {
                let shot = capture::screen::capture_primary()?;
                tracing::info!(width = shot.width, height = shot.height, "screen captured");
                let payload = request::image_payload_from_base64(
                    client.chat_model(),
                    &text,
                    "image/jpeg",
                    &shot.base64_jpeg,
                );
                let rt = tokio::runtime::Runtime::new()
                    .map_err(|e| AssistError::Completion(e.to_string()))?;
                rt.block_on(client.complete(payload))
            })();

            let out = match result {
                Ok(response) => SendResult {
                    response,
                    error: None,
                    pdf_file_id: None,
                    was_image: false,
                    generation,
                },
                Err(e) => SendResult {
                    response: String::new(),
                    error: Some(e.to_string()),
                    pdf_file_id: None,
                    was_image: false,
                    generation,
                },
            };
            let _ = tx.send(out);
        });
    }

    /// Flip the recorder between idle and recording; a stop with captured
    /// audio kicks off transcription.
    pub fn toggle_recording(&mut self) {
        if self.recorder.is_recording() {
            match self.recorder.stop() {
                Ok(Some(wav)) => self.transcribe(wav),
                Ok(None) => {
                    self.response = "No audio recorded. Please try again.".to_string();
                }
                Err(e) => self.response = format!("Error: {}", e),
            }
        } else {
            match self.recorder.start() {
                Ok(()) => {
                    self.response =
                        "Recording... press the microphone button again when finished."
                            .to_string();
                }
                Err(e) => self.response = format!("Error: {}", e),
            }
        }
    }

    fn transcribe(&mut self, wav: Vec<u8>) {
        let client = Arc::clone(&self.client);
        let (tx, rx) = channel::<TranscribeResult>();
        self.transcribe_rx = Some(rx);
        self.loading = true;
        self.response = "Processing your voice recording...".to_string();

        std::thread::spawn(move || {
            let result: Result<String, AssistError> = (|| {
                let rt = tokio::runtime::Runtime::new()
                    .map_err(|e| AssistError::Transcription(e.to_string()))?;
                rt.block_on(client.transcribe(wav))
            })();

            let out = match result {
                Ok(text) => TranscribeResult { text, error: None },
                Err(e) => TranscribeResult {
                    text: String::new(),
                    error: Some(e.to_string()),
                },
            };
            let _ = tx.send(out);
        });
    }

    /// Check for completed background work (called each frame).
    ///
    /// Every completed send is applied, in completion order; receivers for
    /// still-running sends are kept for the next frame.
    pub fn poll_results(&mut self) {
        let mut completed = Vec::new();
        self.send_rxs.retain(|rx| match rx.try_recv() {
            Ok(result) => {
                completed.push(result);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => false,
        });
        for result in completed {
            self.apply_send_result(result);
        }

        if let Some(rx) = &self.transcribe_rx {
            if let Ok(result) = rx.try_recv() {
                self.transcribe_rx = None;
                self.apply_transcribe_result(result);
            }
        }
    }

    fn apply_send_result(&mut self, result: SendResult) {
        self.loading = self.is_busy();

        // Results only touch the attachment they captured; a replacement
        // made while the send was in flight keeps its own (empty) file id
        // and is not cleared.
        let attachment_is_current = result.generation == self.attachment_generation;

        // Persist the uploaded id even when the completion itself failed:
        // the file is on the server, so the next send can reference it.
        if attachment_is_current {
            if let (Some(att), Some(id)) = (self.attachment.as_mut(), result.pdf_file_id) {
                if att.is_pdf() {
                    att.set_file_id(id);
                }
            }
        }

        if let Some(error) = result.error {
            tracing::warn!("send failed: {}", error);
            self.response = format!("Error: {}", error);
            return;
        }

        self.response = result.response;
        self.prompt.clear();
        if result.was_image && attachment_is_current {
            // Image bytes were inlined into the request; nothing to reuse.
            self.attachment = None;
            self.attachment_generation += 1;
        }
    }

    fn apply_transcribe_result(&mut self, result: TranscribeResult) {
        self.loading = self.is_busy();

        if let Some(error) = result.error {
            tracing::warn!("transcription failed: {}", error);
            self.response = format!("Error: {}", error);
            return;
        }
        if result.text.is_empty() {
            self.response = "No speech detected. Please try again.".to_string();
            return;
        }

        append_with_separator(&mut self.prompt, &result.text);
        self.response = format!("Transcribed: \"{}\"", result.text);

        // Spoken "screen" requests route through the screenshot path.
        if result.text.to_lowercase().contains("screen") {
            let text = result.text;
            self.send_screenshot(text);
        }
    }
}

fn append_with_separator(prompt: &mut String, text: &str) {
    if prompt.trim().is_empty() {
        *prompt = text.to_string();
    } else {
        prompt.push(' ');
        prompt.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(AppSettings::default())
    }

    fn ok_result(state: &AppState, response: &str) -> SendResult {
        SendResult {
            response: response.to_string(),
            error: None,
            pdf_file_id: None,
            was_image: false,
            generation: state.attachment_generation,
        }
    }

    #[test]
    fn test_empty_send_is_rejected_without_network() {
        let mut state = test_state();
        state.send();
        assert_eq!(state.response, "Error: Prompt cannot be empty");
        assert!(!state.loading);
        assert!(state.send_rxs.is_empty());
    }

    #[test]
    fn test_append_with_separator() {
        let mut prompt = String::new();
        append_with_separator(&mut prompt, "hello");
        assert_eq!(prompt, "hello");
        append_with_separator(&mut prompt, "world");
        assert_eq!(prompt, "hello world");
    }

    #[test]
    fn test_successful_pdf_send_persists_file_id() {
        let mut state = test_state();
        state.attachment = Some(Attachment::pdf(vec![1, 2, 3], "report.pdf"));

        state.apply_send_result(SendResult {
            pdf_file_id: Some("file-123".to_string()),
            ..ok_result(&state, "summary")
        });

        assert_eq!(state.response, "summary");
        assert!(state.prompt.is_empty());
        // PDF stays attached so the next send reuses the id without uploading.
        let att = state.attachment.as_ref().unwrap();
        assert_eq!(att.file_id(), Some("file-123"));
    }

    #[test]
    fn test_failed_send_keeps_draft_and_attachment() {
        let mut state = test_state();
        state.prompt = "summarize this".to_string();
        state.attachment = Some(Attachment::pdf(vec![1], "report.pdf"));

        state.apply_send_result(SendResult {
            error: Some("File upload failed: quota exceeded".to_string()),
            ..ok_result(&state, "")
        });

        assert_eq!(state.response, "Error: File upload failed: quota exceeded");
        assert_eq!(state.prompt, "summarize this");
        // No id stored; the next send retries the upload from scratch.
        assert_eq!(state.attachment.as_ref().unwrap().file_id(), None);
    }

    #[test]
    fn test_successful_image_send_clears_attachment() {
        let mut state = test_state();
        state.attachment = Some(Attachment::image(vec![9, 9], "image/png"));

        state.apply_send_result(SendResult {
            was_image: true,
            ..ok_result(&state, "a cat")
        });

        assert!(state.attachment.is_none());
        assert_eq!(state.response, "a cat");
    }

    #[test]
    fn test_pdf_replaced_mid_flight_ignores_stale_file_id() {
        let mut state = test_state();
        state.attachment = Some(Attachment::pdf(vec![1], "first.pdf"));
        let in_flight = ok_result(&state, "about the first PDF");

        // User swaps the PDF while the first send is still running.
        state.remove_attachment();
        state.attachment = Some(Attachment::pdf(vec![2], "second.pdf"));

        state.apply_send_result(SendResult {
            pdf_file_id: Some("file-first".to_string()),
            ..in_flight
        });

        // The stale id belongs to first.pdf; second.pdf must upload fresh.
        assert_eq!(state.attachment.as_ref().unwrap().file_id(), None);
        assert_eq!(state.response, "about the first PDF");
    }

    #[test]
    fn test_image_replaced_mid_flight_is_not_cleared() {
        let mut state = test_state();
        state.attachment = Some(Attachment::image(vec![9], "image/png"));
        let in_flight = SendResult {
            was_image: true,
            ..ok_result(&state, "a cat")
        };

        state.remove_attachment();
        state.attachment = Some(Attachment::pdf(vec![2], "report.pdf"));

        state.apply_send_result(in_flight);

        // The stale image result must not discard the new PDF.
        assert!(state.attachment.as_ref().unwrap().is_pdf());
        assert_eq!(state.response, "a cat");
    }

    #[test]
    fn test_poll_results_applies_every_completed_send() {
        let mut state = test_state();
        let (tx1, rx1) = channel::<SendResult>();
        let (tx2, rx2) = channel::<SendResult>();
        state.send_rxs.push(rx1);
        state.send_rxs.push(rx2);
        state.loading = true;

        tx1.send(SendResult {
            pdf_file_id: Some("file-1".to_string()),
            ..ok_result(&state, "first")
        })
        .unwrap();
        tx2.send(ok_result(&state, "second")).unwrap();

        state.attachment = Some(Attachment::pdf(vec![1], "report.pdf"));
        state.poll_results();

        // Both results landed: the id from the first, the text from the last.
        assert_eq!(state.attachment.as_ref().unwrap().file_id(), Some("file-1"));
        assert_eq!(state.response, "second");
        assert!(state.send_rxs.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn test_poll_results_keeps_pending_receivers() {
        let mut state = test_state();
        let (tx_pending, rx_pending) = channel::<SendResult>();
        let (tx_done, rx_done) = channel::<SendResult>();
        state.send_rxs.push(rx_pending);
        state.send_rxs.push(rx_done);
        state.loading = true;

        tx_done.send(ok_result(&state, "done")).unwrap();
        state.poll_results();

        assert_eq!(state.response, "done");
        assert_eq!(state.send_rxs.len(), 1);
        assert!(state.loading);
        drop(tx_pending);
    }

    #[test]
    fn test_replacing_pdf_discards_stored_file_id() {
        let dir = tempfile_dir();
        let first = dir.path().join("first.pdf");
        let second = dir.path().join("second.pdf");
        std::fs::write(&first, b"%PDF-1").unwrap();
        std::fs::write(&second, b"%PDF-2").unwrap();

        let mut state = test_state();
        state.attach_path(&first);
        state
            .attachment
            .as_mut()
            .unwrap()
            .set_file_id("file-old".to_string());

        state.attach_path(&second);
        assert_eq!(state.attachment.as_ref().unwrap().file_id(), None);
    }

    #[test]
    fn test_empty_transcription_shows_no_speech_message() {
        let mut state = test_state();
        state.apply_transcribe_result(TranscribeResult {
            text: String::new(),
            error: None,
        });
        assert_eq!(state.response, "No speech detected. Please try again.");
        assert!(state.prompt.is_empty());
    }

    #[test]
    fn test_transcription_appends_to_draft() {
        let mut state = test_state();
        state.prompt = "please".to_string();
        state.apply_transcribe_result(TranscribeResult {
            text: "summarize the report".to_string(),
            error: None,
        });
        assert_eq!(state.prompt, "please summarize the report");
        assert_eq!(state.response, "Transcribed: \"summarize the report\"");
    }

    fn tempfile_dir() -> tempfile::TempDir {
        tempfile::tempdir().unwrap()
    }
}
