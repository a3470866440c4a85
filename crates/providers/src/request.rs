//! Builds chat-completion payloads from the message draft and its attachment.
//!
//! Exactly one of three shapes is produced: text-only, image (inlined base64
//! data URL), or PDF (reference by uploaded file id). The upload step itself
//! is sequenced by [`crate::openai::OpenAIClient::send_prompt`]; this module
//! is pure and never touches the network.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use shared::attachment::Attachment;
use shared::error::AssistError;

pub const DEFAULT_TEXT_PROMPT: &str = "Please provide a message";
pub const DEFAULT_IMAGE_PROMPT: &str = "Analyze this image";
pub const DEFAULT_PDF_PROMPT: &str = "Analyze this PDF";

fn non_empty<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.trim().is_empty() {
        fallback
    } else {
        text
    }
}

/// Text-only payload: the content is the literal text.
pub fn text_payload(model: &str, text: &str) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": non_empty(text, DEFAULT_TEXT_PROMPT)
        }]
    })
}

/// Image payload: one text part and one inlined base64 data-URL image part.
pub fn image_payload(model: &str, text: &str, bytes: &[u8], mime: &str) -> Value {
    image_payload_from_base64(model, text, mime, &STANDARD.encode(bytes))
}

/// Image payload from pre-encoded base64 data (screenshots arrive this way).
pub fn image_payload_from_base64(model: &str, text: &str, mime: &str, base64_data: &str) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": non_empty(text, DEFAULT_IMAGE_PROMPT) },
                {
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:{};base64,{}", mime, base64_data)
                    }
                }
            ]
        }]
    })
}

/// PDF payload: a file-reference part followed by a text part.
pub fn pdf_payload(model: &str, text: &str, file_id: &str) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "file", "file": { "file_id": file_id } },
                { "type": "text", "text": non_empty(text, DEFAULT_PDF_PROMPT) }
            ]
        }]
    })
}

/// Dispatch on the attachment to pick the payload shape.
///
/// A PDF must already carry its `file_id`; callers upload first.
pub fn payload_for(
    model: &str,
    text: &str,
    attachment: Option<&Attachment>,
) -> Result<Value, AssistError> {
    match attachment {
        None => Ok(text_payload(model, text)),
        Some(Attachment::Image { bytes, mime }) => Ok(image_payload(model, text, bytes, mime)),
        Some(Attachment::Pdf { file_id, .. }) => match file_id.as_deref() {
            Some(id) => Ok(pdf_payload(model, text, id)),
            None => Err(AssistError::Upload("PDF has not been uploaded yet".to_string())),
        },
    }
}
