//! OpenAI API client: chat completions, file upload, audio transcription.
//!
//! Each operation is a single HTTP round trip with the shared bearer key.
//! No retry, no backoff; failures map onto the `AssistError` taxonomy with
//! the API's own error message when one is present in the body.

use reqwest::Client;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

use crate::request;
use shared::attachment::Attachment;
use shared::error::AssistError;
use shared::settings::AppSettings;

static SHARED_HTTP: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(2)
        .build()
        .expect("failed to build HTTP client")
});

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct FileResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pull a human-readable message out of an API error body.
///
/// OpenAI errors look like `{"error": {"message": "..."}}`; fall back to the
/// (truncated) raw body, then to the status line.
fn extract_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    let detail: String = body.chars().take(800).collect();
    if detail.trim().is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, detail)
    }
}

async fn error_message(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    extract_error_message(status, &body)
}

// ── Client ───────────────────────────────────────────────────────────

pub struct OpenAIClient {
    http: Client,
    auth_token: String,
    chat_model: String,
    transcribe_model: String,
    transcribe_language: String,
    base_url: String,
}

impl OpenAIClient {
    /// Build a client from settings injected at startup.
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            http: SHARED_HTTP.clone(),
            auth_token: settings.openai_api_key.clone(),
            chat_model: settings.chat_model.clone(),
            transcribe_model: settings.transcribe_model.clone(),
            transcribe_language: settings.transcribe_language.clone(),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Multipart upload of a PDF; returns the remote file identifier.
    pub async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<String, AssistError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| AssistError::Upload(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "user_data")
            .part("file", part);

        let resp = self
            .http
            .post(format!("{}/v1/files", self.base_url))
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssistError::Upload(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AssistError::Upload(error_message(resp).await));
        }

        let file: FileResponse = resp
            .json()
            .await
            .map_err(|e| AssistError::Upload(e.to_string()))?;
        tracing::debug!(id = %file.id, "file uploaded");
        Ok(file.id)
    }

    /// Post a prepared payload and return the assistant's text.
    pub async fn complete(&self, payload: serde_json::Value) -> Result<String, AssistError> {
        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| AssistError::Completion(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AssistError::Completion(error_message(resp).await));
        }

        let body: ChatResponse = resp
            .json()
            .await
            .map_err(|e| AssistError::Completion(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AssistError::Completion("response missing message content".to_string()))
    }

    /// Multipart upload of recorded WAV audio; returns the trimmed transcript.
    pub async fn transcribe(&self, audio_wav: Vec<u8>) -> Result<String, AssistError> {
        let part = reqwest::multipart::Part::bytes(audio_wav)
            .file_name("recording.wav")
            .mime_str("audio/wav")
            .map_err(|e| AssistError::Transcription(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("model", self.transcribe_model.clone())
            .text("language", self.transcribe_language.clone())
            .part("file", part);

        let resp = self
            .http
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssistError::Transcription(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AssistError::Transcription(error_message(resp).await));
        }

        let body: TranscriptionResponse = resp
            .json()
            .await
            .map_err(|e| AssistError::Transcription(e.to_string()))?;
        Ok(body.text.trim().to_string())
    }

    /// Send the draft, uploading the PDF first when it has no remote id yet.
    ///
    /// On a successful upload the returned id is written back into the
    /// attachment so later sends reuse it. On upload failure nothing is
    /// stored and the next send retries from scratch.
    pub async fn send_prompt(
        &self,
        text: &str,
        attachment: &mut Option<Attachment>,
    ) -> Result<String, AssistError> {
        if text.trim().is_empty() && attachment.is_none() {
            return Err(AssistError::EmptyInput);
        }

        if let Some(att) = attachment.as_mut() {
            if let Attachment::Pdf { bytes, file_name, file_id } = att {
                if file_id.is_none() {
                    let id = self.upload(bytes.clone(), file_name).await?;
                    tracing::info!(id = %id, file = %file_name, "PDF uploaded for reuse");
                    *file_id = Some(id);
                }
            }
        }

        let payload = request::payload_for(&self.chat_model, text, attachment.as_ref())?;
        self.complete(payload).await
    }
}
