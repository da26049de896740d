//! Stage orchestration for the wizard.
//!
//! This module connects the three external services to the
//! [`WizardStore`](crate::wizard::WizardStore) through [`StageRunner`].
//!
//! # Architecture
//!
//! ```text
//! Voice ──▶ Transcribe ──▶ Generate ──▶ Edit ──▶ Illustrate ──▶ Output
//!              │              │                     │
//!              ▼              ▼                     ▼
//!        Transcriber    PostGenerator        ImageGenerator × 4
//!              │              │                     │
//!              └──────────────┴─────────┬───────────┘
//!                                       ▼
//!                    SharedStore (Arc<Mutex<WizardStore>>)
//! ```
//!
//! [`StageRunner::auto_run`] fires the current step's stage at most once per
//! artifact; [`StageRunner::run`] is the explicit retry.

pub mod runner;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{StageOutcome, StageRunner, DEFAULT_IMAGE_DELAY};
