//! Wizard state machine for Voice-to-Post.
//!
//! # Architecture
//!
//! ```text
//! user intent ──▶ navigation::{next, prev, jump_to}
//!                     │  (gate::can_advance / can_retreat / can_jump_to)
//!                     ▼
//! StageRunner ──▶ WizardStore::dispatch(WizardAction)
//!                     │
//!                     ▼
//!               reduce(state, action) ──▶ Transition { state, released }
//!                     │                        │
//!                     ▼                        ▼
//!               WizardState          PlaybackRegistry::release
//! ```
//!
//! Everything here is synchronous and pure apart from the store, which owns
//! the state and the playback handles.  The async side lives in
//! [`pipeline`](crate::pipeline).

pub mod action;
pub mod gate;
pub mod navigation;
pub mod reducer;
pub mod state;
pub mod step;
pub mod store;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use action::WizardAction;
pub use gate::{blocked_hint, can_advance, can_jump_to, can_retreat, should_auto_run};
pub use navigation::NavigationBlocked;
pub use reducer::{reduce, Transition};
pub use state::{
    AudioClip, AudioPayload, AudioSource, ImagePosition, PlaybackHandle, SectionImage,
    StageStatus, WizardState, IMAGES_PER_POST,
};
pub use step::WizardStep;
pub use store::{lock_store, new_shared_store, PlaybackRegistry, SharedStore, Stage, WizardStore};
