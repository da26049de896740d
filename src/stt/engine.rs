//! Core transcription trait and the HTTP implementation.
//!
//! # Overview
//!
//! [`Transcriber`] is the interface used by the pipeline.  It is object-safe
//! and `Send + Sync` so it can be held behind an `Arc<dyn Transcriber>`.
//!
//! [`ApiTranscriber`] posts the audio to any OpenAI-compatible
//! `/v1/audio/transcriptions` endpoint.
//!
//! [`MockTranscriber`] (available under `#[cfg(test)]`) returns a
//! pre-configured response and counts calls, for unit-testing the
//! pipeline without network access.

use async_trait::async_trait;
use reqwest::multipart;
use thiserror::Error;

use crate::config::TranscriptionConfig;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the transcription service.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// HTTP transport or connection error.
    #[error("transcription request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("transcription request timed out")]
    Timeout,

    /// The service answered with a non-success status.
    #[error("transcription service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The payload exceeds the service's upload limit.
    #[error("Audio file must be less than {max_mb}MB")]
    PayloadTooLarge { max_mb: usize },

    /// The service returned no text.
    #[error("transcription returned no text")]
    EmptyTranscript,
}

impl From<reqwest::Error> for SttError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SttError::Timeout
        } else {
            SttError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Async, thread-safe speech-to-text interface.
///
/// # Arguments
/// * `audio`     – Encoded audio bytes (webm, mp3, wav, ...).
/// * `file_name` – Name sent with the upload; its extension tells the
///                 service how to decode.
/// * `mime_type` – MIME type of `audio`.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<String, SttError>;
}

// Compile-time assertion: Box<dyn Transcriber> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Transcriber>) {}
};

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/audio/transcriptions` endpoint.
pub struct ApiTranscriber {
    client: reqwest::Client,
    config: TranscriptionConfig,
}

impl ApiTranscriber {
    /// Build an `ApiTranscriber` from application config.
    pub fn from_config(config: &TranscriptionConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Reject payloads above the configured upload limit.
    pub fn check_size(&self, len: usize) -> Result<(), SttError> {
        if len > self.config.max_upload_bytes {
            return Err(SttError::PayloadTooLarge {
                max_mb: self.config.max_upload_bytes / (1024 * 1024),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Transcriber for ApiTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        file_name: &str,
        mime_type: &str,
    ) -> Result<String, SttError> {
        self.check_size(audio.len())?;

        let url = format!("{}/v1/audio/transcriptions", self.config.base_url);
        log::debug!("stt: uploading {} bytes as {file_name}", audio.len());

        let part = multipart::Part::bytes(audio.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type)?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "text");

        let mut req = self.client.post(&url).multipart(form);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SttError::Api {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        let text = body.trim().to_string();
        if text.is_empty() {
            return Err(SttError::EmptyTranscript);
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// A test double that returns a pre-configured response without any network
/// access and records how often it was called.
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<String, SttError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockTranscriber {
    /// Create a mock that always returns `Ok(text)`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: Default::default(),
        }
    }

    /// Create a mock that always returns `Err(error)`.
    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _file_name: &str,
        _mime_type: &str,
    ) -> Result<String, SttError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(max_upload_bytes: usize) -> TranscriptionConfig {
        TranscriptionConfig {
            max_upload_bytes,
            ..TranscriptionConfig::default()
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _transcriber = ApiTranscriber::from_config(&TranscriptionConfig::default());
    }

    #[test]
    fn check_size_rejects_oversized_payload() {
        let transcriber = ApiTranscriber::from_config(&make_config(2 * 1024 * 1024));
        assert!(transcriber.check_size(2 * 1024 * 1024).is_ok());
        let err = transcriber.check_size(2 * 1024 * 1024 + 1).unwrap_err();
        assert!(matches!(err, SttError::PayloadTooLarge { max_mb: 2 }));
        assert_eq!(err.to_string(), "Audio file must be less than 2MB");
    }

    #[tokio::test]
    async fn oversized_payload_fails_before_any_request() {
        // Unroutable base URL: reaching the network would yield Request, not
        // PayloadTooLarge.
        let mut config = make_config(4);
        config.base_url = "http://127.0.0.1:9".into();
        let transcriber = ApiTranscriber::from_config(&config);

        let err = transcriber
            .transcribe(&[0u8; 5], "recording.webm", "audio/webm")
            .await
            .unwrap_err();
        assert!(matches!(err, SttError::PayloadTooLarge { .. }));
    }

    #[tokio::test]
    async fn mock_counts_calls() {
        let mock = MockTranscriber::ok("hello");
        assert_eq!(mock.transcribe(b"x", "a.webm", "audio/webm").await.unwrap(), "hello");
        assert_eq!(mock.calls(), 1);
    }

    #[test]
    fn transcriber_is_object_safe() {
        let t: Box<dyn Transcriber> = Box::new(ApiTranscriber::from_config(
            &TranscriptionConfig::default(),
        ));
        drop(t);
    }

    #[test]
    fn api_error_display_includes_status() {
        let e = SttError::Api {
            status: 429,
            message: "slow down".into(),
        };
        assert_eq!(e.to_string(), "transcription service returned 429: slow down");
    }
}
