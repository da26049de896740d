//! Wizard state and the artifact types it holds.
//!
//! [`WizardState`] is the single source of truth for one wizard session:
//! every artifact (audio, transcript, generated and edited prose, title,
//! positioned images, final HTML) plus the busy/error pair of each async
//! stage.  It is only ever replaced through
//! [`reduce`](crate::wizard::reduce); nothing else writes its fields.

use crate::error::WizardError;

use super::step::WizardStep;

// ---------------------------------------------------------------------------
// Audio
// ---------------------------------------------------------------------------

/// Audio subtypes accepted for upload (matched against the MIME subtype or the
/// file extension).
const AUDIO_KINDS: [&str; 8] = ["mpeg", "mp3", "wav", "webm", "m4a", "mp4", "ogg", "flac"];

/// Where the voice note came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource {
    Recorded,
    Uploaded,
}

/// The user-supplied input of the Voice step.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioPayload {
    /// Encoded audio destined for the transcription service.
    Audio {
        bytes: Vec<u8>,
        mime_type: String,
        file_name: String,
    },
    /// A plain-text upload; bypasses transcription entirely.
    Text(String),
}

impl AudioPayload {
    /// Wrap a finished microphone recording.
    pub fn recorded(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let file_name = format!("recording.{}", extension_for_mime(&mime_type));
        AudioPayload::Audio {
            bytes,
            mime_type,
            file_name,
        }
    }

    /// Validate an uploaded file and classify it as audio or text.
    ///
    /// # Errors
    ///
    /// [`WizardError::Validation`] when the file is neither a supported audio
    /// type nor a `.txt`/`text/plain` file, when it exceeds `max_bytes`, or
    /// when a text file is not UTF-8.
    pub fn from_upload(
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
        max_bytes: usize,
    ) -> Result<Self, WizardError> {
        let is_text = mime_type == "text/plain" || file_name.to_lowercase().ends_with(".txt");
        let is_audio = !is_text && is_supported_audio(file_name, mime_type);

        if !is_audio && !is_text {
            return Err(WizardError::Validation(
                "Please upload a valid audio file (MP3, WAV, WebM, M4A, OGG, FLAC) or text file (TXT)"
                    .into(),
            ));
        }

        if bytes.len() > max_bytes {
            return Err(WizardError::Validation(format!(
                "File must be less than {}MB",
                max_bytes / (1024 * 1024)
            )));
        }

        if is_text {
            let text = String::from_utf8(bytes).map_err(|_| {
                WizardError::Validation("Text file is not valid UTF-8".into())
            })?;
            if text.trim().is_empty() {
                return Err(WizardError::Validation("Text file is empty".into()));
            }
            return Ok(AudioPayload::Text(text));
        }

        Ok(AudioPayload::Audio {
            bytes,
            mime_type: mime_type.to_string(),
            file_name: file_name.to_string(),
        })
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        match self {
            AudioPayload::Audio { bytes, .. } => bytes.len(),
            AudioPayload::Text(text) => text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// File name sent to the transcription service.
    ///
    /// Uploads keep their own name; anything without an extension is named
    /// after its MIME type.
    pub fn transcription_file_name(&self) -> String {
        match self {
            AudioPayload::Audio {
                mime_type,
                file_name,
                ..
            } => {
                if file_name.contains('.') {
                    file_name.clone()
                } else {
                    format!("recording.{}", extension_for_mime(mime_type))
                }
            }
            AudioPayload::Text(_) => "transcript.txt".into(),
        }
    }
}

fn is_supported_audio(file_name: &str, mime_type: &str) -> bool {
    let mime = mime_type.to_lowercase();
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    AUDIO_KINDS
        .iter()
        .any(|kind| mime.contains(kind) || extension == *kind)
}

fn extension_for_mime(mime_type: &str) -> &'static str {
    let mime = if mime_type.is_empty() {
        "audio/webm"
    } else {
        mime_type
    };
    if mime.contains("mp4") {
        "mp4"
    } else if mime.contains("webm") {
        "webm"
    } else if mime.contains("wav") {
        "wav"
    } else if mime.contains("mp3") || mime.contains("mpeg") {
        "mp3"
    } else {
        "webm"
    }
}

/// Opaque id of a playback resource held for the current audio clip.
///
/// Allocated and released by
/// [`PlaybackRegistry`](crate::wizard::store::PlaybackRegistry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackHandle(pub(crate) u64);

impl PlaybackHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// The Voice-step artifact: payload, its playback handle and provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    pub payload: AudioPayload,
    pub handle: PlaybackHandle,
    pub source: AudioSource,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// One of the four fixed illustration slots.  Declaration order is document
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImagePosition {
    Header,
    Middle1,
    Middle2,
    Closing,
}

impl ImagePosition {
    pub const ALL: [ImagePosition; 4] = [
        ImagePosition::Header,
        ImagePosition::Middle1,
        ImagePosition::Middle2,
        ImagePosition::Closing,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ImagePosition::Header => "Header Image",
            ImagePosition::Middle1 => "Middle Image 1",
            ImagePosition::Middle2 => "Middle Image 2",
            ImagePosition::Closing => "Closing Image",
        }
    }

    /// Suffix appended to the post title in the rendered `alt` text.
    pub fn alt_suffix(self) -> &'static str {
        match self {
            ImagePosition::Header => "Header",
            ImagePosition::Middle1 | ImagePosition::Middle2 => "Illustration",
            ImagePosition::Closing => "Closing",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ImagePosition::Header => "header",
            ImagePosition::Middle1 => "middle1",
            ImagePosition::Middle2 => "middle2",
            ImagePosition::Closing => "closing",
        }
    }
}

/// A generated illustration bound to a position.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionImage {
    /// Base64-encoded PNG payload.
    pub base64: String,
    pub position: ImagePosition,
    /// The prose excerpt the image was generated from.
    pub source_excerpt: String,
}

// ---------------------------------------------------------------------------
// StageStatus
// ---------------------------------------------------------------------------

/// Busy flag and last error of one async stage.
///
/// Idle: `busy == false && error.is_none()`.  Busy and an error never
/// coexist after a transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageStatus {
    pub busy: bool,
    pub error: Option<String>,
}

impl StageStatus {
    pub(crate) fn started() -> Self {
        Self {
            busy: true,
            error: None,
        }
    }

    pub(crate) fn failed(message: String) -> Self {
        Self {
            busy: false,
            error: Some(message),
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}

// ---------------------------------------------------------------------------
// WizardState
// ---------------------------------------------------------------------------

/// Number of positioned images a full batch aims for.
pub const IMAGES_PER_POST: usize = ImagePosition::ALL.len();

/// Everything one wizard session knows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardState {
    pub current_step: WizardStep,

    // Voice
    pub audio: Option<AudioClip>,

    // Transcribe
    pub transcript: String,
    pub transcription: StageStatus,

    // Generate
    pub generated_prose: String,
    pub generation: StageStatus,

    // Edit
    pub edited_prose: String,
    pub post_title: String,

    // Illustrate
    pub section_images: Vec<SectionImage>,
    /// Images completed in the current batch (progress display only).
    pub images_completed: usize,
    pub illustration: StageStatus,

    // Output
    pub final_html: String,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// The image currently occupying `position`, if any.
    pub fn image_at(&self, position: ImagePosition) -> Option<&SectionImage> {
        self.section_images.iter().find(|img| img.position == position)
    }

    /// How many of the four slots are empty.  Informational only; a partial
    /// batch never blocks navigation.
    pub fn missing_image_count(&self) -> usize {
        ImagePosition::ALL
            .iter()
            .filter(|pos| self.image_at(**pos).is_none())
            .count()
    }

    /// `true` while any external call is in flight.
    pub fn is_busy(&self) -> bool {
        self.transcription.busy || self.generation.busy || self.illustration.busy
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
