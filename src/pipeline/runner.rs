//! Stage orchestrators: transcribe → generate → illustrate.
//!
//! [`StageRunner`] owns a [`SharedStore`] plus one service per stage.  Each
//! stage follows the same shape:
//!
//! ```text
//! begin(stage)              lock: busy check, upstream check, Start* + epoch
//!   └─▶ unlock
//! service call (.await)     no lock held
//!   ├─ Ok  → dispatch_if_current(epoch, completion)
//!   └─ Err → dispatch_if_current(epoch, *Failed(message))
//! ```
//!
//! A missing upstream artifact fails the stage without ever marking it busy.
//! Nothing escapes as an error: every failure becomes stage state.  A
//! completion that arrives after a reset is dropped by the epoch check.

use std::sync::Arc;
use std::time::Duration;

use crate::error::WizardError;
use crate::image::{excerpt_for, section_excerpts, ImageGenerator};
use crate::llm::{extract_title, PostGenerator};
use crate::stt::{transcribe_payload, Transcriber};
use crate::wizard::{
    lock_store, should_auto_run, ImagePosition, SectionImage, SharedStore, Stage, WizardAction,
    WizardState, IMAGES_PER_POST,
};

/// Default pause between sequential image requests in one batch.
pub const DEFAULT_IMAGE_DELAY: Duration = Duration::from_millis(1000);

// ---------------------------------------------------------------------------
// StageOutcome
// ---------------------------------------------------------------------------

/// What one orchestrator run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Transcribed(String),
    Generated {
        html: String,
        title: Option<String>,
    },
    /// Batch finished with `images` stored and `missing` slots left empty.
    Illustrated {
        images: usize,
        missing: usize,
    },
    ImageReplaced(ImagePosition),
    Failed {
        stage: Stage,
        message: String,
    },
    /// The session was reset while the call was in flight; result dropped.
    Stale(Stage),
}

// ---------------------------------------------------------------------------
// StageRunner
// ---------------------------------------------------------------------------

/// Drives the three service-backed stages against one session.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use voice_to_post::config::AppConfig;
/// use voice_to_post::image::ApiImageGenerator;
/// use voice_to_post::llm::ApiPostGenerator;
/// use voice_to_post::pipeline::StageRunner;
/// use voice_to_post::stt::ApiTranscriber;
/// use voice_to_post::wizard::new_shared_store;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let runner = StageRunner::new(
///     new_shared_store(),
///     Arc::new(ApiTranscriber::from_config(&config.transcription)),
///     Arc::new(ApiPostGenerator::from_config(&config.llm)),
///     Arc::new(ApiImageGenerator::from_config(&config.image)),
/// );
/// runner.auto_run().await;
/// # }
/// ```
pub struct StageRunner {
    store: SharedStore,
    transcriber: Arc<dyn Transcriber>,
    generator: Arc<dyn PostGenerator>,
    illustrator: Arc<dyn ImageGenerator>,
    image_delay: Duration,
}

impl StageRunner {
    pub fn new(
        store: SharedStore,
        transcriber: Arc<dyn Transcriber>,
        generator: Arc<dyn PostGenerator>,
        illustrator: Arc<dyn ImageGenerator>,
    ) -> Self {
        Self {
            store,
            transcriber,
            generator,
            illustrator,
            image_delay: DEFAULT_IMAGE_DELAY,
        }
    }

    /// Override the pause between image requests.
    pub fn with_image_delay(mut self, delay: Duration) -> Self {
        self.image_delay = delay;
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Dispatch by stage
    // -----------------------------------------------------------------------

    /// Run the current step's stage if the auto-trigger policy allows it.
    ///
    /// Returns `None` when nothing was started.
    pub async fn auto_run(&self) -> Option<StageOutcome> {
        let stage = {
            let store = lock_store(&self.store);
            let state = store.state();
            if !should_auto_run(state) {
                return None;
            }
            Stage::for_step(state.current_step)?
        };

        log::info!("pipeline: auto-running {}", stage.name());
        self.run(stage).await
    }

    /// Run `stage` unconditionally (manual retry / regenerate).
    pub async fn run(&self, stage: Stage) -> Option<StageOutcome> {
        match stage {
            Stage::Transcribe => self.transcribe().await,
            Stage::Generate => self.generate().await,
            Stage::Illustrate => self.illustrate().await,
        }
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Voice note → transcript.
    pub async fn transcribe(&self) -> Option<StageOutcome> {
        let started = self.begin(Stage::Transcribe, "No audio file provided", |state| {
            state.audio.as_ref().map(|clip| clip.payload.clone())
        });
        let (epoch, payload) = match started {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        log::debug!("pipeline: transcribing {} bytes", payload.len());

        match transcribe_payload(self.transcriber.as_ref(), &payload).await {
            Ok(text) => {
                if !self.complete(epoch, WizardAction::SetTranscript(text.clone())) {
                    return Some(StageOutcome::Stale(Stage::Transcribe));
                }
                log::info!("pipeline: transcript ready ({} chars)", text.len());
                Some(StageOutcome::Transcribed(text))
            }
            Err(e) => self.fail(
                Stage::Transcribe,
                epoch,
                WizardError::ServiceFailure(e.to_string()),
            ),
        }
    }

    /// Transcript → post HTML, seeding the title from its `<h1>`.
    pub async fn generate(&self) -> Option<StageOutcome> {
        let started = self.begin(Stage::Generate, "No transcription provided", |state| {
            non_blank(&state.transcript)
        });
        let (epoch, transcript) = match started {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        match self.generator.generate(&transcript).await {
            Ok(html) => {
                let title = extract_title(&html);

                let mut store = lock_store(&self.store);
                if !store.dispatch_if_current(epoch, WizardAction::SetGeneratedProse(html.clone())) {
                    return Some(StageOutcome::Stale(Stage::Generate));
                }
                if let Some(title) = &title {
                    store.dispatch(WizardAction::SetPostTitle(title.clone()));
                }

                log::info!("pipeline: post generated ({} chars)", html.len());
                Some(StageOutcome::Generated { html, title })
            }
            Err(e) => self.fail(
                Stage::Generate,
                epoch,
                WizardError::ServiceFailure(e.to_string()),
            ),
        }
    }

    /// Edited prose → up to four positioned images.
    ///
    /// The image set is cleared first so a batch never mixes with the
    /// previous one.  Individual failures are skipped; only an empty batch
    /// fails the stage.
    pub async fn illustrate(&self) -> Option<StageOutcome> {
        let started = self.begin(Stage::Illustrate, "No blog content provided", |state| {
            non_blank(&state.edited_prose)
        });
        let (epoch, prose) = match started {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        if !self.complete(epoch, WizardAction::ClearSectionImages) {
            return Some(StageOutcome::Stale(Stage::Illustrate));
        }

        let mut images = Vec::with_capacity(IMAGES_PER_POST);

        for (i, (position, excerpt)) in section_excerpts(&prose).into_iter().enumerate() {
            if i > 0 && !self.image_delay.is_zero() {
                tokio::time::sleep(self.image_delay).await;
            }

            match self.illustrator.generate(&excerpt).await {
                Ok(base64) => {
                    let image = SectionImage {
                        base64,
                        position,
                        source_excerpt: excerpt,
                    };
                    if !self.complete(epoch, WizardAction::AddSectionImage(image.clone())) {
                        return Some(StageOutcome::Stale(Stage::Illustrate));
                    }
                    images.push(image);
                }
                Err(e) => {
                    log::warn!("pipeline: {} image failed: {e}", position.key());
                }
            }
        }

        if images.is_empty() {
            return self.fail(
                Stage::Illustrate,
                epoch,
                WizardError::ServiceFailure("Failed to generate any images".to_string()),
            );
        }

        let count = images.len();
        if !self.complete(epoch, WizardAction::SetAllSectionImages(images)) {
            return Some(StageOutcome::Stale(Stage::Illustrate));
        }

        log::info!("pipeline: {count}/{IMAGES_PER_POST} images generated");
        Some(StageOutcome::Illustrated {
            images: count,
            missing: IMAGES_PER_POST - count,
        })
    }

    /// Regenerate the image at `position` only, replacing it in place.
    pub async fn regenerate_image(&self, position: ImagePosition) -> Option<StageOutcome> {
        let started = self.begin(Stage::Illustrate, "No blog content provided", |state| {
            excerpt_for(&state.edited_prose, position)
        });
        let (epoch, excerpt) = match started {
            Ok(started) => started,
            Err(outcome) => return outcome,
        };

        match self.illustrator.generate(&excerpt).await {
            Ok(base64) => {
                let image = SectionImage {
                    base64,
                    position,
                    source_excerpt: excerpt,
                };

                let mut store = lock_store(&self.store);
                if !store.dispatch_if_current(epoch, WizardAction::AddSectionImage(image)) {
                    return Some(StageOutcome::Stale(Stage::Illustrate));
                }
                store.dispatch(WizardAction::FinishImageGeneration);

                log::info!("pipeline: {} image regenerated", position.key());
                Some(StageOutcome::ImageReplaced(position))
            }
            Err(e) => self.fail(
                Stage::Illustrate,
                epoch,
                WizardError::ServiceFailure(e.to_string()),
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Busy check, upstream check and `Start*` dispatch under one lock.
    ///
    /// `Err(None)` means the stage is already running.  A missing upstream
    /// artifact is recorded as the stage's failure before anything starts.
    fn begin<T>(
        &self,
        stage: Stage,
        missing: &'static str,
        upstream: impl FnOnce(&WizardState) -> Option<T>,
    ) -> Result<(u64, T), Option<StageOutcome>> {
        let mut store = lock_store(&self.store);
        if stage.status(store.state()).busy {
            log::debug!("pipeline: {} already running", stage.name());
            return Err(None);
        }

        let Some(input) = upstream(store.state()) else {
            let message = WizardError::MissingInput(missing).message();
            log::error!("pipeline: {} failed: {message}", stage.name());
            store.dispatch(failure_action(stage, message.clone()));
            return Err(Some(StageOutcome::Failed { stage, message }));
        };

        let epoch = store.try_begin(stage).ok_or(None)?;
        Ok((epoch, input))
    }

    fn complete(&self, epoch: u64, action: WizardAction) -> bool {
        lock_store(&self.store).dispatch_if_current(epoch, action)
    }

    fn fail(&self, stage: Stage, epoch: u64, error: WizardError) -> Option<StageOutcome> {
        let message = error.message();
        log::error!("pipeline: {} failed: {message}", stage.name());

        if self.complete(epoch, failure_action(stage, message.clone())) {
            Some(StageOutcome::Failed { stage, message })
        } else {
            Some(StageOutcome::Stale(stage))
        }
    }
}

fn failure_action(stage: Stage, message: String) -> WizardAction {
    match stage {
        Stage::Transcribe => WizardAction::TranscriptionFailed(message),
        Stage::Generate => WizardAction::GenerationFailed(message),
        Stage::Illustrate => WizardAction::ImageGenerationFailed(message),
    }
}

fn non_blank(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
