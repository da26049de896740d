//! `ImageGenerator` trait and the OpenAI-compatible `ApiImageGenerator`.
//!
//! The service is asked for exactly one image per call. Inline base64
//! (`data[0].b64_json`) is stored as-is; a `data[0].url` answer is downloaded
//! and encoded. Either way the assembler embeds the text in a data URI.

use async_trait::async_trait;
use base64::Engine as _;
use thiserror::Error;

use crate::config::ImageConfig;

/// Characters of excerpt context placed in the illustration prompt.
const PROMPT_CONTEXT_CHARS: usize = 200;

// ---------------------------------------------------------------------------
// ImageError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum ImageError {
    #[error("image request failed: {0}")]
    Request(String),

    #[error("image request timed out")]
    Timeout,

    #[error("image service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse image response: {0}")]
    Parse(String),

    #[error("No image generated")]
    NoImage,

    /// The first entry carried neither inline data nor a URL.
    #[error("No image data in response")]
    NoImageData,

    #[error("No blog content provided")]
    EmptyExcerpt,
}

impl From<reqwest::Error> for ImageError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ImageError::Timeout
        } else {
            ImageError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ImageGenerator trait
// ---------------------------------------------------------------------------

/// Produces one base64-encoded PNG illustrating `excerpt`.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, excerpt: &str) -> Result<String, ImageError>;
}

/// Build the watercolor illustration prompt for an excerpt.
pub fn illustration_prompt(excerpt: &str) -> String {
    let context: String = excerpt.trim().chars().take(PROMPT_CONTEXT_CHARS).collect();
    format!(
        "Hand-painted watercolor illustration inspired by this contemplative theme: \"{context}\".

Style requirements:
- Soft washes of color with visible paper texture
- Light ink linework
- Calm, everyday slice-of-life atmosphere
- Natural lighting with a slightly cinematic perspective
- Muted, harmonious palette with gentle blues, greens, and warm neutrals
- No harsh shadows or heavy outlines
- Evocative and meditative mood
- No text or words in the image"
    )
}

// ---------------------------------------------------------------------------
// ApiImageGenerator
// ---------------------------------------------------------------------------

/// Calls `{base_url}/v1/images/generations`.
pub struct ApiImageGenerator {
    client: reqwest::Client,
    config: ImageConfig,
}

impl ApiImageGenerator {
    pub fn from_config(config: &ImageConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }
}

#[async_trait]
impl ImageGenerator for ApiImageGenerator {
    async fn generate(&self, excerpt: &str) -> Result<String, ImageError> {
        if excerpt.trim().is_empty() {
            return Err(ImageError::EmptyExcerpt);
        }

        let url = format!("{}/v1/images/generations", self.config.base_url);
        let body = serde_json::json!({
            "model":   self.config.model,
            "prompt":  illustration_prompt(excerpt),
            "size":    self.config.size,
            "quality": self.config.quality,
            "n":       1
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ImageError::Api {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ImageError::Parse(e.to_string()))?;

        match parse_image_response(&json)? {
            ImagePayload::Inline(b64) => Ok(b64),
            ImagePayload::Url(url) => {
                log::debug!("image: service returned a URL, downloading");
                fetch_as_base64(&self.client, &url).await
            }
        }
    }
}

/// Where the first image in a generations response lives.
#[derive(Debug, PartialEq)]
enum ImagePayload {
    Inline(String),
    Url(String),
}

fn parse_image_response(json: &serde_json::Value) -> Result<ImagePayload, ImageError> {
    let first = json["data"]
        .as_array()
        .and_then(|data| data.first())
        .ok_or(ImageError::NoImage)?;

    let non_empty = |key: &str| {
        first[key]
            .as_str()
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    if let Some(b64) = non_empty("b64_json") {
        Ok(ImagePayload::Inline(b64))
    } else if let Some(url) = non_empty("url") {
        Ok(ImagePayload::Url(url))
    } else {
        Err(ImageError::NoImageData)
    }
}

/// Download a hosted image and return its bytes as standard base64.
async fn fetch_as_base64(client: &reqwest::Client, url: &str) -> Result<String, ImageError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ImageError::Api {
            status: status.as_u16(),
            message: message.trim().to_string(),
        });
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Err(ImageError::NoImageData);
    }
    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}

// ---------------------------------------------------------------------------
// MockImageGenerator  (test-only)
// ---------------------------------------------------------------------------

/// Test double replaying a scripted sequence of responses.
///
/// Once the script is exhausted the last response repeats.
#[cfg(test)]
pub struct MockImageGenerator {
    script: Vec<Result<String, ImageError>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockImageGenerator {
    pub fn ok(b64: impl Into<String>) -> Self {
        Self::scripted(vec![Ok(b64.into())])
    }

    pub fn err(error: ImageError) -> Self {
        Self::scripted(vec![Err(error)])
    }

    pub fn scripted(script: Vec<Result<String, ImageError>>) -> Self {
        assert!(!script.is_empty(), "script needs at least one response");
        Self {
            script,
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ImageGenerator for MockImageGenerator {
    async fn generate(&self, _excerpt: &str) -> Result<String, ImageError> {
        let n = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let idx = n.min(self.script.len() - 1);
        self.script[idx].clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_truncated_context() {
        let excerpt = "x".repeat(500);
        let prompt = illustration_prompt(&excerpt);
        assert!(prompt.contains(&format!("\"{}\"", "x".repeat(PROMPT_CONTEXT_CHARS))));
        assert!(!prompt.contains(&"x".repeat(PROMPT_CONTEXT_CHARS + 1)));
        assert!(prompt.contains("No text or words in the image"));
    }

    /// Serve `body` once on a local port and return its URL.
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let head = format!(
                "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/image.png")
    }

    fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn parses_inline_base64() {
        let json = serde_json::json!({ "data": [{ "b64_json": "iVBORw0KGgo=" }] });
        assert_eq!(
            parse_image_response(&json).unwrap(),
            ImagePayload::Inline("iVBORw0KGgo=".into())
        );
    }

    #[test]
    fn url_only_response_is_downloaded() {
        let json = serde_json::json!({ "data": [{ "url": "https://img.example/1.png" }] });
        assert_eq!(
            parse_image_response(&json).unwrap(),
            ImagePayload::Url("https://img.example/1.png".into())
        );
    }

    #[test]
    fn entry_without_data_or_url_is_no_image_data() {
        let json = serde_json::json!({ "data": [{ "b64_json": "", "revised_prompt": "x" }] });
        let err = parse_image_response(&json).unwrap_err();
        assert!(matches!(err, ImageError::NoImageData));
        assert_eq!(err.to_string(), "No image data in response");
    }

    #[tokio::test]
    async fn fetched_image_is_base64_encoded() {
        let url = serve_once("HTTP/1.1 200 OK", b"Hello").await;
        let b64 = fetch_as_base64(&local_client(), &url).await.unwrap();
        assert_eq!(b64, "SGVsbG8=");
    }

    #[tokio::test]
    async fn failed_download_reports_status() {
        let url = serve_once("HTTP/1.1 404 Not Found", b"gone").await;
        let err = fetch_as_base64(&local_client(), &url).await.unwrap_err();
        assert!(matches!(err, ImageError::Api { status: 404, .. }));
    }

    #[test]
    fn empty_data_is_no_image() {
        let json = serde_json::json!({ "data": [] });
        assert!(matches!(parse_image_response(&json), Err(ImageError::NoImage)));
    }

    #[tokio::test]
    async fn empty_excerpt_is_rejected_before_request() {
        let generator = ApiImageGenerator::from_config(&ImageConfig::default());
        let err = generator.generate("   ").await.unwrap_err();
        assert!(matches!(err, ImageError::EmptyExcerpt));
    }

    #[tokio::test]
    async fn mock_replays_script_then_repeats_last() {
        let mock = MockImageGenerator::scripted(vec![
            Ok("a".into()),
            Err(ImageError::Timeout),
        ]);
        assert_eq!(mock.generate("x").await.unwrap(), "a");
        assert!(mock.generate("x").await.is_err());
        assert!(mock.generate("x").await.is_err());
        assert_eq!(mock.calls(), 3);
    }
}
