//! Step gating: pure predicates over [`WizardState`].

use super::state::WizardState;
use super::step::WizardStep;

/// Whether forward navigation from the current step is allowed.
///
/// | Step       | Condition                                        |
/// |------------|--------------------------------------------------|
/// | Voice      | a payload is present                             |
/// | Transcribe | trimmed transcript non-empty, not transcribing   |
/// | Generate   | generated prose non-empty, not generating        |
/// | Edit       | edited prose non-empty                           |
/// | Illustrate | ≥ 1 image, not generating images                 |
/// | Output     | never                                            |
pub fn can_advance(state: &WizardState) -> bool {
    match state.current_step {
        WizardStep::Voice => state.has_audio(),
        WizardStep::Transcribe => {
            !state.transcript.trim().is_empty() && !state.transcription.busy
        }
        WizardStep::Generate => !state.generated_prose.is_empty() && !state.generation.busy,
        WizardStep::Edit => !state.edited_prose.is_empty(),
        WizardStep::Illustrate => {
            !state.section_images.is_empty() && !state.illustration.busy
        }
        WizardStep::Output => false,
    }
}

/// Whether backward navigation is allowed.
pub fn can_retreat(state: &WizardState) -> bool {
    state.current_step > WizardStep::FIRST
}

/// Jumps may only go to steps already reached.
pub fn can_jump_to(state: &WizardState, target: WizardStep) -> bool {
    target <= state.current_step
}

/// Whether the orchestrator for the current step should fire on its own.
///
/// True only when the upstream artifact exists, the step's own artifact is
/// absent, the stage is idle, and no earlier attempt failed.  A failure
/// therefore needs an explicit retry, and a populated artifact never
/// triggers a second call.
pub fn should_auto_run(state: &WizardState) -> bool {
    match state.current_step {
        WizardStep::Transcribe => {
            state.has_audio()
                && state.transcript.is_empty()
                && !state.transcription.busy
                && !state.transcription.has_error()
        }
        WizardStep::Generate => {
            !state.transcript.trim().is_empty()
                && state.generated_prose.is_empty()
                && !state.generation.busy
                && !state.generation.has_error()
        }
        WizardStep::Illustrate => {
            !state.edited_prose.trim().is_empty()
                && state.section_images.is_empty()
                && !state.illustration.busy
                && !state.illustration.has_error()
        }
        WizardStep::Voice | WizardStep::Edit | WizardStep::Output => false,
    }
}

/// Hint shown next to a disabled "Next" button, if any.
pub fn blocked_hint(state: &WizardState) -> Option<&'static str> {
    if can_advance(state) {
        return None;
    }
    match state.current_step {
        WizardStep::Voice => Some("Record or upload audio to continue"),
        WizardStep::Transcribe if state.transcription.busy => Some("Transcribing..."),
        WizardStep::Generate if state.generation.busy => Some("Generating post..."),
        WizardStep::Illustrate if state.illustration.busy => Some("Generating images..."),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::state::{
        AudioClip, AudioPayload, AudioSource, ImagePosition, PlaybackHandle, SectionImage,
        StageStatus,
    };

    fn at(step: WizardStep) -> WizardState {
        WizardState {
            current_step: step,
            ..WizardState::default()
        }
    }

    fn busy() -> StageStatus {
        StageStatus {
            busy: true,
            error: None,
        }
    }

    fn header_image() -> SectionImage {
        SectionImage {
            base64: "H".into(),
            position: ImagePosition::Header,
            source_excerpt: String::new(),
        }
    }

    #[test]
    fn voice_requires_payload() {
        let mut state = at(WizardStep::Voice);
        assert!(!can_advance(&state));
        state.audio = Some(AudioClip {
            payload: AudioPayload::Text("hi".into()),
            handle: PlaybackHandle(1),
            source: AudioSource::Uploaded,
        });
        assert!(can_advance(&state));
    }

    #[test]
    fn whitespace_transcript_blocks_even_when_idle() {
        let mut state = at(WizardStep::Transcribe);
        state.transcript = "   \n\t".into();
        assert!(!can_advance(&state));
        state.transcript = String::new();
        assert!(!can_advance(&state));
    }

    #[test]
    fn busy_flag_always_blocks() {
        let mut state = at(WizardStep::Transcribe);
        state.transcript = "text".into();
        state.transcription = busy();
        assert!(!can_advance(&state));

        let mut state = at(WizardStep::Generate);
        state.generated_prose = "<p>x</p>".into();
        state.generation = busy();
        assert!(!can_advance(&state));

        let mut state = at(WizardStep::Illustrate);
        state.section_images.push(header_image());
        state.illustration = busy();
        assert!(!can_advance(&state));
    }

    #[test]
    fn edit_requires_edited_prose() {
        let mut state = at(WizardStep::Edit);
        assert!(!can_advance(&state));
        state.edited_prose = "<p>x</p>".into();
        assert!(can_advance(&state));
    }

    #[test]
    fn single_header_image_is_enough() {
        let mut state = at(WizardStep::Illustrate);
        state.section_images.push(header_image());
        assert!(can_advance(&state));
    }

    #[test]
    fn output_never_advances() {
        let mut state = at(WizardStep::Output);
        state.final_html = "<p>done</p>".into();
        assert!(!can_advance(&state));
    }

    #[test]
    fn retreat_only_after_first_step() {
        assert!(!can_retreat(&at(WizardStep::Voice)));
        assert!(can_retreat(&at(WizardStep::Transcribe)));
        assert!(can_retreat(&at(WizardStep::Output)));
    }

    #[test]
    fn jump_never_skips_ahead() {
        let state = at(WizardStep::Edit);
        assert!(can_jump_to(&state, WizardStep::Voice));
        assert!(can_jump_to(&state, WizardStep::Edit));
        assert!(!can_jump_to(&state, WizardStep::Illustrate));
    }

    #[test]
    fn auto_run_requires_upstream_and_absent_artifact() {
        let mut state = at(WizardStep::Generate);
        assert!(!should_auto_run(&state));
        state.transcript = "spoken words".into();
        assert!(should_auto_run(&state));
        state.generated_prose = "<p>done</p>".into();
        assert!(!should_auto_run(&state));
    }

    #[test]
    fn whitespace_upstream_does_not_auto_run() {
        let mut state = at(WizardStep::Generate);
        state.transcript = "  \n ".into();
        assert!(!should_auto_run(&state));

        let mut state = at(WizardStep::Illustrate);
        state.edited_prose = "\t".into();
        assert!(!should_auto_run(&state));
    }

    #[test]
    fn auto_run_does_not_refire_after_failure() {
        let mut state = at(WizardStep::Illustrate);
        state.edited_prose = "<p>x</p>".into();
        state.illustration = StageStatus {
            busy: false,
            error: Some("quota".into()),
        };
        assert!(!should_auto_run(&state));
    }

    #[test]
    fn auto_run_skips_busy_stage() {
        let mut state = at(WizardStep::Transcribe);
        state.audio = Some(AudioClip {
            payload: AudioPayload::Text("hi".into()),
            handle: PlaybackHandle(1),
            source: AudioSource::Uploaded,
        });
        assert!(should_auto_run(&state));
        state.transcription = busy();
        assert!(!should_auto_run(&state));
    }

    #[test]
    fn auto_run_never_fires_on_manual_steps() {
        let mut state = at(WizardStep::Edit);
        state.transcript = "t".into();
        state.edited_prose = "<p>x</p>".into();
        assert!(!should_auto_run(&state));
    }

    #[test]
    fn blocked_hint_reports_busy_stage() {
        let mut state = at(WizardStep::Generate);
        state.generation = busy();
        assert_eq!(blocked_hint(&state), Some("Generating post..."));
        assert_eq!(blocked_hint(&at(WizardStep::Voice)), Some("Record or upload audio to continue"));
    }
}
