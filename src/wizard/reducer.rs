//! The pure transition function `(state, action) → state`.
//!
//! [`reduce`] never performs I/O.  Resources that a transition drops (the
//! playback handle of a replaced or cleared clip) are reported in
//! [`Transition::released`] and freed by the caller, which is always
//! [`WizardStore`](super::WizardStore).

use crate::assemble::assemble;

use super::action::WizardAction;
use super::state::{PlaybackHandle, SectionImage, StageStatus, WizardState};
use super::step::WizardStep;

/// Result of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: WizardState,
    /// Handles whose ownership ended with this transition.
    pub released: Vec<PlaybackHandle>,
}

/// Apply `action` to `state`.
///
/// After the action itself, `final_html` is re-derived when the session sits
/// on the Output step and the action touched one of its inputs (edited
/// prose, title, images) or entered the step.
pub fn reduce(mut state: WizardState, action: WizardAction) -> Transition {
    let mut released = Vec::new();
    let refresh_output = touches_output(&action);

    match action {
        WizardAction::SetStep(step) => {
            state.current_step = step;
        }

        WizardAction::SetAudio(clip) => {
            if let Some(old) = state.audio.replace(clip) {
                released.push(old.handle);
            }
        }

        WizardAction::ClearAudio => {
            if let Some(old) = state.audio.take() {
                released.push(old.handle);
            }
        }

        // ── Transcribe ───────────────────────────────────────────────────
        WizardAction::StartTranscribing => {
            state.transcription = StageStatus::started();
        }
        WizardAction::SetTranscript(text) => {
            state.transcript = text;
            state.transcription = StageStatus::default();
        }
        WizardAction::TranscriptionFailed(message) => {
            state.transcription = StageStatus::failed(message);
        }
        WizardAction::UpdateTranscript(text) => {
            state.transcript = text;
        }

        // ── Generate ─────────────────────────────────────────────────────
        WizardAction::StartGenerating => {
            state.generation = StageStatus::started();
        }
        WizardAction::SetGeneratedProse(html) => {
            state.edited_prose = html.clone();
            state.generated_prose = html;
            state.generation = StageStatus::default();
        }
        WizardAction::GenerationFailed(message) => {
            state.generation = StageStatus::failed(message);
        }

        // ── Edit ─────────────────────────────────────────────────────────
        WizardAction::SetEditedProse(html) => {
            state.edited_prose = html;
        }
        WizardAction::SetPostTitle(title) => {
            state.post_title = title;
        }

        // ── Illustrate ───────────────────────────────────────────────────
        WizardAction::StartGeneratingImages => {
            state.illustration = StageStatus::started();
            state.images_completed = 0;
        }
        WizardAction::AddSectionImage(image) => {
            upsert_image(&mut state.section_images, image);
            state.images_completed += 1;
        }
        WizardAction::SetAllSectionImages(images) => {
            let mut set = Vec::with_capacity(images.len());
            for image in images {
                upsert_image(&mut set, image);
            }
            state.images_completed = set.len();
            state.section_images = set;
            state.illustration = StageStatus::default();
        }
        WizardAction::ClearSectionImages => {
            state.section_images.clear();
            state.images_completed = 0;
        }
        WizardAction::ImageGenerationFailed(message) => {
            state.illustration = StageStatus::failed(message);
        }
        WizardAction::FinishImageGeneration => {
            state.illustration.busy = false;
        }

        // ── Output ───────────────────────────────────────────────────────
        WizardAction::SetFinalHtml(html) => {
            state.final_html = html;
        }

        WizardAction::Reset => {
            if let Some(old) = state.audio.take() {
                released.push(old.handle);
            }
            state = WizardState::default();
        }
    }

    if refresh_output && state.current_step == WizardStep::Output {
        state.final_html = assemble(&state.edited_prose, &state.section_images, &state.post_title);
    }

    Transition { state, released }
}

/// Replace the image at the same position in place, or append.
fn upsert_image(images: &mut Vec<SectionImage>, image: SectionImage) {
    match images.iter_mut().find(|img| img.position == image.position) {
        Some(slot) => *slot = image,
        None => images.push(image),
    }
}

fn touches_output(action: &WizardAction) -> bool {
    matches!(
        action,
        WizardAction::SetStep(WizardStep::Output)
            | WizardAction::SetGeneratedProse(_)
            | WizardAction::SetEditedProse(_)
            | WizardAction::SetPostTitle(_)
            | WizardAction::AddSectionImage(_)
            | WizardAction::SetAllSectionImages(_)
            | WizardAction::ClearSectionImages
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::state::{AudioClip, AudioPayload, AudioSource, ImagePosition};

    fn apply(state: WizardState, actions: Vec<WizardAction>) -> WizardState {
        actions
            .into_iter()
            .fold(state, |s, a| reduce(s, a).state)
    }

    fn clip(id: u64) -> AudioClip {
        AudioClip {
            payload: AudioPayload::Text("voice note".into()),
            handle: PlaybackHandle(id),
            source: AudioSource::Uploaded,
        }
    }

    fn image(position: ImagePosition, data: &str) -> SectionImage {
        SectionImage {
            base64: data.into(),
            position,
            source_excerpt: format!("excerpt for {}", position.key()),
        }
    }

    // ---- audio ownership ---

    #[test]
    fn replacing_audio_releases_previous_handle() {
        let state = reduce(WizardState::new(), WizardAction::SetAudio(clip(1))).state;
        let t = reduce(state, WizardAction::SetAudio(clip(2)));
        assert_eq!(t.released, vec![PlaybackHandle(1)]);
        assert_eq!(t.state.audio.map(|c| c.handle), Some(PlaybackHandle(2)));
    }

    #[test]
    fn clear_audio_releases_handle() {
        let state = reduce(WizardState::new(), WizardAction::SetAudio(clip(7))).state;
        let t = reduce(state, WizardAction::ClearAudio);
        assert_eq!(t.released, vec![PlaybackHandle(7)]);
        assert!(t.state.audio.is_none());
    }

    #[test]
    fn clear_audio_without_clip_releases_nothing() {
        let t = reduce(WizardState::new(), WizardAction::ClearAudio);
        assert!(t.released.is_empty());
    }

    // ---- stage lifecycle ---

    #[test]
    fn start_sets_busy_and_clears_error() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::TranscriptionFailed("boom".into()),
                WizardAction::StartTranscribing,
            ],
        );
        assert!(state.transcription.busy);
        assert!(state.transcription.error.is_none());
    }

    #[test]
    fn failure_preserves_prior_artifact() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetTranscript("first pass".into()),
                WizardAction::StartTranscribing,
                WizardAction::TranscriptionFailed("timeout".into()),
            ],
        );
        assert_eq!(state.transcript, "first pass");
        assert!(!state.transcription.busy);
        assert_eq!(state.transcription.error.as_deref(), Some("timeout"));
    }

    #[test]
    fn transcription_failure_keeps_generated_post() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetGeneratedProse("<p>post</p>".into()),
                WizardAction::StartTranscribing,
                WizardAction::TranscriptionFailed("network".into()),
                WizardAction::StartTranscribing,
            ],
        );
        assert_eq!(state.generated_prose, "<p>post</p>");
        assert_eq!(state.edited_prose, "<p>post</p>");
        assert_eq!(state.generation, StageStatus::default());
    }

    #[test]
    fn starting_one_stage_leaves_other_artifacts() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetTranscript("words".into()),
                WizardAction::AddSectionImage(image(ImagePosition::Header, "H")),
                WizardAction::StartGenerating,
            ],
        );
        assert_eq!(state.transcript, "words");
        assert_eq!(state.section_images.len(), 1);
        assert!(state.generation.busy);
    }

    #[test]
    fn generated_prose_seeds_edit_copy_once() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::StartGenerating,
                WizardAction::SetGeneratedProse("<p>draft</p>".into()),
                WizardAction::SetEditedProse("<p>mine</p>".into()),
            ],
        );
        assert_eq!(state.generated_prose, "<p>draft</p>");
        assert_eq!(state.edited_prose, "<p>mine</p>");
        assert!(!state.generation.busy);
    }

    #[test]
    fn update_transcript_does_not_touch_status() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::StartTranscribing,
                WizardAction::UpdateTranscript("typed".into()),
            ],
        );
        assert_eq!(state.transcript, "typed");
        assert!(state.transcription.busy);
    }

    // ---- images ---

    #[test]
    fn add_image_replaces_same_position_in_place() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::AddSectionImage(image(ImagePosition::Header, "H1")),
                WizardAction::AddSectionImage(image(ImagePosition::Middle1, "M1")),
                WizardAction::AddSectionImage(image(ImagePosition::Header, "H2")),
            ],
        );
        assert_eq!(state.section_images.len(), 2);
        assert_eq!(state.section_images[0].base64, "H2");
        assert_eq!(state.section_images[1].base64, "M1");
        assert_eq!(state.images_completed, 3);
    }

    #[test]
    fn set_all_images_ends_batch_and_dedupes() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::StartGeneratingImages,
                WizardAction::SetAllSectionImages(vec![
                    image(ImagePosition::Header, "a"),
                    image(ImagePosition::Closing, "b"),
                    image(ImagePosition::Header, "c"),
                ]),
            ],
        );
        assert_eq!(state.section_images.len(), 2);
        assert_eq!(state.image_at(ImagePosition::Header).map(|i| i.base64.as_str()), Some("c"));
        assert_eq!(state.images_completed, 2);
        assert!(!state.illustration.busy);
    }

    #[test]
    fn clear_images_resets_counter_only() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetEditedProse("<p>x</p>".into()),
                WizardAction::AddSectionImage(image(ImagePosition::Header, "H")),
                WizardAction::StartGeneratingImages,
                WizardAction::ClearSectionImages,
            ],
        );
        assert!(state.section_images.is_empty());
        assert_eq!(state.images_completed, 0);
        assert!(state.illustration.busy);
        assert_eq!(state.edited_prose, "<p>x</p>");
    }

    #[test]
    fn finish_image_generation_keeps_images() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::StartGeneratingImages,
                WizardAction::AddSectionImage(image(ImagePosition::Middle2, "M")),
                WizardAction::FinishImageGeneration,
            ],
        );
        assert!(!state.illustration.busy);
        assert_eq!(state.section_images.len(), 1);
    }

    // ---- reset ---

    #[test]
    fn reset_returns_initial_state_and_releases_audio() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetAudio(clip(3)),
                WizardAction::SetTranscript("t".into()),
                WizardAction::SetGeneratedProse("<p>g</p>".into()),
                WizardAction::SetPostTitle("Title".into()),
                WizardAction::AddSectionImage(image(ImagePosition::Header, "H")),
                WizardAction::SetStep(WizardStep::Output),
            ],
        );
        let t = reduce(state, WizardAction::Reset);
        assert_eq!(t.released, vec![PlaybackHandle(3)]);
        assert_eq!(t.state, WizardState::default());
        assert_eq!(t.state.current_step, WizardStep::Voice);
    }

    // ---- derived output ---

    #[test]
    fn entering_output_assembles_final_html() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetGeneratedProse("<p>one</p><p>two</p>".into()),
                WizardAction::SetPostTitle("Quiet".into()),
                WizardAction::AddSectionImage(image(ImagePosition::Header, "HDR")),
            ],
        );
        assert!(state.final_html.is_empty());

        let state = reduce(state, WizardAction::SetStep(WizardStep::Output)).state;
        assert!(state.final_html.starts_with("<img src=\"data:image/png;base64,HDR\""));
        assert!(state.final_html.contains("<p>two</p>"));
    }

    #[test]
    fn edits_on_output_step_refresh_final_html() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetEditedProse("<p>before</p>".into()),
                WizardAction::SetStep(WizardStep::Output),
                WizardAction::SetEditedProse("<p>after</p>".into()),
            ],
        );
        assert_eq!(state.final_html, "<p>after</p>");
    }

    #[test]
    fn edits_before_output_step_do_not_derive() {
        let state = apply(
            WizardState::new(),
            vec![
                WizardAction::SetStep(WizardStep::Edit),
                WizardAction::SetEditedProse("<p>draft</p>".into()),
            ],
        );
        assert!(state.final_html.is_empty());
    }
}
