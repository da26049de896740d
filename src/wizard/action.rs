//! Every legal mutation of [`WizardState`](super::WizardState).

use super::state::{AudioClip, SectionImage};
use super::step::WizardStep;

/// Actions accepted by [`reduce`](super::reduce).
///
/// Stage actions come in `Start*` / completion / `*Failed` triples; user edits
/// are plain setters.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardAction {
    /// Move to `step` (gating is the navigation layer's job).
    SetStep(WizardStep),

    /// Attach a voice note, releasing any clip it replaces.
    SetAudio(AudioClip),
    /// Drop the voice note and release its playback handle.
    ClearAudio,

    StartTranscribing,
    SetTranscript(String),
    TranscriptionFailed(String),
    /// User edit of the transcript; does not touch stage status.
    UpdateTranscript(String),

    StartGenerating,
    /// Generation result; also seeds the edited copy.
    SetGeneratedProse(String),
    GenerationFailed(String),

    SetEditedProse(String),
    SetPostTitle(String),

    StartGeneratingImages,
    /// One positioned image; replaces an occupant of the same position.
    AddSectionImage(SectionImage),
    /// Whole batch; replaces the image set and ends the batch.
    SetAllSectionImages(Vec<SectionImage>),
    ClearSectionImages,
    ImageGenerationFailed(String),
    /// End a batch without changing the image set.
    FinishImageGeneration,

    SetFinalHtml(String),

    /// Back to the pristine initial state, releasing held resources.
    Reset,
}

impl WizardAction {
    /// Variant name for log lines (payloads can be large).
    pub fn name(&self) -> &'static str {
        match self {
            WizardAction::SetStep(_) => "SetStep",
            WizardAction::SetAudio(_) => "SetAudio",
            WizardAction::ClearAudio => "ClearAudio",
            WizardAction::StartTranscribing => "StartTranscribing",
            WizardAction::SetTranscript(_) => "SetTranscript",
            WizardAction::TranscriptionFailed(_) => "TranscriptionFailed",
            WizardAction::UpdateTranscript(_) => "UpdateTranscript",
            WizardAction::StartGenerating => "StartGenerating",
            WizardAction::SetGeneratedProse(_) => "SetGeneratedProse",
            WizardAction::GenerationFailed(_) => "GenerationFailed",
            WizardAction::SetEditedProse(_) => "SetEditedProse",
            WizardAction::SetPostTitle(_) => "SetPostTitle",
            WizardAction::StartGeneratingImages => "StartGeneratingImages",
            WizardAction::AddSectionImage(_) => "AddSectionImage",
            WizardAction::SetAllSectionImages(_) => "SetAllSectionImages",
            WizardAction::ClearSectionImages => "ClearSectionImages",
            WizardAction::ImageGenerationFailed(_) => "ImageGenerationFailed",
            WizardAction::FinishImageGeneration => "FinishImageGeneration",
            WizardAction::SetFinalHtml(_) => "SetFinalHtml",
            WizardAction::Reset => "Reset",
        }
    }
}
