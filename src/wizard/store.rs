//! The session-scoped state container.
//!
//! [`WizardStore`] owns the [`WizardState`], the [`PlaybackRegistry`] holding
//! live audio handles, and a session epoch that advances on every reset.
//! All mutation goes through [`WizardStore::dispatch`].
//!
//! [`SharedStore`] is a type alias for `Arc<Mutex<WizardStore>>` so that
//! orchestrator tasks and the driving loop can hold the same session.  Lock
//! for a short critical section; do **not** hold the lock across `.await`
//! points.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::action::WizardAction;
use super::reducer::reduce;
use super::state::{AudioClip, AudioPayload, AudioSource, PlaybackHandle, StageStatus, WizardState};
use super::step::WizardStep;

// ---------------------------------------------------------------------------
// PlaybackRegistry
// ---------------------------------------------------------------------------

/// Allocates and tracks playback handles for attached audio.
#[derive(Debug, Default)]
pub struct PlaybackRegistry {
    next_id: u64,
    live: HashSet<PlaybackHandle>,
}

impl PlaybackRegistry {
    pub fn acquire(&mut self) -> PlaybackHandle {
        self.next_id += 1;
        let handle = PlaybackHandle(self.next_id);
        self.live.insert(handle);
        handle
    }

    /// Returns `false` if `handle` was not live.
    pub fn release(&mut self, handle: PlaybackHandle) -> bool {
        self.live.remove(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn is_live(&self, handle: PlaybackHandle) -> bool {
        self.live.contains(&handle)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// The three stages backed by an external service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcribe,
    Generate,
    Illustrate,
}

impl Stage {
    /// The stage driven from `step`, if it has one.
    pub fn for_step(step: WizardStep) -> Option<Self> {
        match step {
            WizardStep::Transcribe => Some(Stage::Transcribe),
            WizardStep::Generate => Some(Stage::Generate),
            WizardStep::Illustrate => Some(Stage::Illustrate),
            WizardStep::Voice | WizardStep::Edit | WizardStep::Output => None,
        }
    }

    pub fn status(self, state: &WizardState) -> &StageStatus {
        match self {
            Stage::Transcribe => &state.transcription,
            Stage::Generate => &state.generation,
            Stage::Illustrate => &state.illustration,
        }
    }

    fn start_action(self) -> WizardAction {
        match self {
            Stage::Transcribe => WizardAction::StartTranscribing,
            Stage::Generate => WizardAction::StartGenerating,
            Stage::Illustrate => WizardAction::StartGeneratingImages,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Transcribe => "transcribe",
            Stage::Generate => "generate",
            Stage::Illustrate => "illustrate",
        }
    }
}

// ---------------------------------------------------------------------------
// WizardStore
// ---------------------------------------------------------------------------

/// Owner of one wizard session.
#[derive(Debug, Default)]
pub struct WizardStore {
    state: WizardState,
    epoch: u64,
    playback: PlaybackRegistry,
}

impl WizardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// Session generation; bumped by every [`WizardAction::Reset`].
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn playback(&self) -> &PlaybackRegistry {
        &self.playback
    }

    /// Run `action` through the reducer and release whatever it dropped.
    pub fn dispatch(&mut self, action: WizardAction) {
        log::debug!("wizard: dispatch {}", action.name());

        let is_reset = matches!(action, WizardAction::Reset);
        let transition = reduce(std::mem::take(&mut self.state), action);
        self.state = transition.state;

        for handle in transition.released {
            if !self.playback.release(handle) {
                log::warn!("wizard: playback handle {} was already released", handle.id());
            }
        }

        if is_reset {
            self.epoch += 1;
        }
    }

    /// Dispatch only if no reset happened since `epoch` was observed.
    ///
    /// Returns `false` (and drops the action) for a stale completion.
    pub fn dispatch_if_current(&mut self, epoch: u64, action: WizardAction) -> bool {
        if epoch != self.epoch {
            log::info!(
                "wizard: dropping stale {} from session {epoch} (now {})",
                action.name(),
                self.epoch
            );
            return false;
        }
        self.dispatch(action);
        true
    }

    /// Attach a voice note, allocating its playback handle.
    pub fn attach_audio(&mut self, payload: AudioPayload, source: AudioSource) -> PlaybackHandle {
        let handle = self.playback.acquire();
        self.dispatch(WizardAction::SetAudio(AudioClip {
            payload,
            handle,
            source,
        }));
        handle
    }

    /// Mark `stage` busy unless it already is.
    ///
    /// Check and dispatch happen under the same borrow, so two callers can
    /// never both start one stage.  Returns the epoch the run belongs to.
    pub fn try_begin(&mut self, stage: Stage) -> Option<u64> {
        if stage.status(&self.state).busy {
            log::debug!("wizard: {} already running", stage.name());
            return None;
        }
        self.dispatch(stage.start_action());
        Some(self.epoch)
    }
}

/// Thread-safe handle to a [`WizardStore`].
pub type SharedStore = Arc<Mutex<WizardStore>>;

/// Construct a new [`SharedStore`] for a fresh session.
pub fn new_shared_store() -> SharedStore {
    Arc::new(Mutex::new(WizardStore::new()))
}

/// Lock `store`, recovering the guard if a previous holder panicked.
///
/// Every transition is a whole-value replacement, so a poisoned store still
/// holds a consistent state.
pub fn lock_store(store: &SharedStore) -> MutexGuard<'_, WizardStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn text_payload() -> AudioPayload {
        AudioPayload::Text("hello".into())
    }

    #[test]
    fn attach_audio_allocates_live_handle() {
        let mut store = WizardStore::new();
        let handle = store.attach_audio(text_payload(), AudioSource::Uploaded);
        assert!(store.playback().is_live(handle));
        assert_eq!(store.state().audio.as_ref().map(|c| c.handle), Some(handle));
    }

    #[test]
    fn replacing_audio_releases_old_handle() {
        let mut store = WizardStore::new();
        let first = store.attach_audio(text_payload(), AudioSource::Uploaded);
        let second = store.attach_audio(text_payload(), AudioSource::Recorded);
        assert!(!store.playback().is_live(first));
        assert!(store.playback().is_live(second));
        assert_eq!(store.playback().live_count(), 1);
    }

    #[test]
    fn clear_audio_releases_handle() {
        let mut store = WizardStore::new();
        store.attach_audio(text_payload(), AudioSource::Uploaded);
        store.dispatch(WizardAction::ClearAudio);
        assert_eq!(store.playback().live_count(), 0);
    }

    #[test]
    fn reset_releases_everything_and_bumps_epoch() {
        let mut store = WizardStore::new();
        store.attach_audio(text_payload(), AudioSource::Recorded);
        store.dispatch(WizardAction::SetTranscript("t".into()));
        store.dispatch(WizardAction::SetStep(WizardStep::Generate));

        store.dispatch(WizardAction::Reset);

        assert_eq!(store.playback().live_count(), 0);
        assert_eq!(store.state(), &WizardState::default());
        assert_eq!(store.epoch(), 1);
    }

    #[test]
    fn stale_completion_is_dropped() {
        let mut store = WizardStore::new();
        let epoch = store.try_begin(Stage::Generate).expect("idle stage");
        store.dispatch(WizardAction::Reset);

        let applied =
            store.dispatch_if_current(epoch, WizardAction::SetGeneratedProse("<p>late</p>".into()));

        assert!(!applied);
        assert!(store.state().generated_prose.is_empty());
    }

    #[test]
    fn current_completion_is_applied() {
        let mut store = WizardStore::new();
        let epoch = store.try_begin(Stage::Transcribe).expect("idle stage");
        assert!(store.dispatch_if_current(epoch, WizardAction::SetTranscript("ok".into())));
        assert_eq!(store.state().transcript, "ok");
        assert!(!store.state().transcription.busy);
    }

    #[test]
    fn try_begin_refuses_busy_stage() {
        let mut store = WizardStore::new();
        assert!(store.try_begin(Stage::Illustrate).is_some());
        assert!(store.try_begin(Stage::Illustrate).is_none());
        assert!(store.try_begin(Stage::Transcribe).is_some());
    }

    #[test]
    fn stage_for_step_covers_service_steps_only() {
        assert_eq!(Stage::for_step(WizardStep::Transcribe), Some(Stage::Transcribe));
        assert_eq!(Stage::for_step(WizardStep::Illustrate), Some(Stage::Illustrate));
        assert_eq!(Stage::for_step(WizardStep::Edit), None);
    }

    #[test]
    fn shared_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedStore>();
    }

    #[test]
    fn shared_store_can_be_cloned_and_mutated() {
        let store = new_shared_store();
        let store2 = Arc::clone(&store);
        lock_store(&store).dispatch(WizardAction::SetPostTitle("Shared".into()));
        assert_eq!(lock_store(&store2).state().post_title, "Shared");
    }
}
