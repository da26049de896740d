//! Speech-to-text module.
//!
//! The Transcribe step turns the Voice-step payload into editable text.
//! Audio goes to a [`Transcriber`]; plain-text uploads skip the service via
//! [`transcribe_payload`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_to_post::config::AppConfig;
//! use voice_to_post::stt::{transcribe_payload, ApiTranscriber};
//! use voice_to_post::wizard::AudioPayload;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let stt = ApiTranscriber::from_config(&config.transcription);
//!
//!     let payload = AudioPayload::recorded(std::fs::read("note.webm").unwrap(), "audio/webm");
//!     let text = transcribe_payload(&stt, &payload).await.unwrap();
//!     println!("{text}");
//! }
//! ```

pub mod engine;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{ApiTranscriber, SttError, Transcriber};

// test-only re-export so the pipeline test module can import MockTranscriber
// without `use voice_to_post::stt::engine::MockTranscriber`.
#[cfg(test)]
pub use engine::MockTranscriber;

use crate::wizard::AudioPayload;

/// Transcribe `payload`, passing plain text straight through.
pub async fn transcribe_payload(
    transcriber: &dyn Transcriber,
    payload: &AudioPayload,
) -> Result<String, SttError> {
    match payload {
        AudioPayload::Text(text) => {
            log::debug!("stt: text upload, skipping transcription service");
            if text.trim().is_empty() {
                return Err(SttError::EmptyTranscript);
            }
            Ok(text.clone())
        }
        AudioPayload::Audio {
            bytes, mime_type, ..
        } => {
            let mime = if mime_type.is_empty() {
                "audio/webm"
            } else {
                mime_type.as_str()
            };
            transcriber
                .transcribe(bytes, &payload.transcription_file_name(), mime)
                .await
        }
    }
}
