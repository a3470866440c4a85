//! Error taxonomy for user-triggered actions.
//!
//! Every failure is caught at the triggering UI action and rendered as
//! `Error: <display>` in the output pane. Nothing propagates past the UI and
//! nothing is retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    /// The `/v1/files` upload was rejected or unreachable.
    #[error("File upload failed: {0}")]
    Upload(String),

    /// The chat completion call failed or returned an unusable body.
    #[error("API request failed: {0}")]
    Completion(String),

    /// The audio transcription call failed.
    #[error("Transcription failed: {0}")]
    Transcription(String),

    /// The platform refused access to a capture device ("Microphone", "Screen").
    #[error("{0} access denied")]
    PermissionDenied(&'static str),

    /// Screen capture failed for a reason other than permissions.
    #[error("Screen capture failed: {0}")]
    Capture(String),

    /// Audio device or encoding problem.
    #[error("Audio error: {0}")]
    Audio(String),

    /// Blank prompt with no attachment; no request is made.
    #[error("Prompt cannot be empty")]
    EmptyInput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_strings() {
        assert_eq!(
            AssistError::Upload("quota exceeded".into()).to_string(),
            "File upload failed: quota exceeded"
        );
        assert_eq!(
            AssistError::PermissionDenied("Microphone").to_string(),
            "Microphone access denied"
        );
        assert_eq!(AssistError::EmptyInput.to_string(), "Prompt cannot be empty");
    }
}
