//! Application entry point for Voice-to-Post.
//!
//! # Run sequence
//!
//! 1. Initialise logging.
//! 2. Parse CLI args and load [`AppConfig`] (defaults on first run), then
//!    apply `OPENAI_API_KEY`.
//! 3. Read the input file as a Voice-step upload.
//! 4. Walk the wizard: auto-run the current step's stage, then advance
//!    through the step gate, until Output.
//! 5. Write the assembled HTML (and optionally copy it).
//!
//! Any stage failure ends the run with exit code 1.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use voice_to_post::{
    cli::{guess_mime, CliArgs},
    config::AppConfig,
    export,
    image::ApiImageGenerator,
    llm::ApiPostGenerator,
    pipeline::{StageOutcome, StageRunner},
    stt::ApiTranscriber,
    wizard::{lock_store, navigation, new_shared_store, AudioPayload, AudioSource, WizardStep},
};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice-to-Post starting up");

    let args = CliArgs::parse();

    match run(args).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<PathBuf> {
    // Configuration
    let mut config = AppConfig::load_from(&args.resolve_config_path()).unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    config.apply_env_overrides();

    // Voice step: the input file is the upload
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let payload = AudioPayload::from_upload(
        &args.input_file_name(),
        guess_mime(&args.input),
        bytes,
        config.transcription.max_upload_bytes,
    )?;

    let store = new_shared_store();
    lock_store(&store).attach_audio(payload, AudioSource::Uploaded);

    let runner = StageRunner::new(
        Arc::clone(&store),
        Arc::new(ApiTranscriber::from_config(&config.transcription)),
        Arc::new(ApiPostGenerator::from_config(&config.llm)),
        Arc::new(ApiImageGenerator::from_config(&config.image)),
    )
    .with_image_delay(Duration::from_millis(config.image.request_delay_ms));

    // Drive the wizard to the Output step
    loop {
        match runner.auto_run().await {
            Some(StageOutcome::Failed { stage, message }) => {
                bail!("{} failed: {message}", stage.name());
            }
            Some(StageOutcome::Illustrated { missing, .. }) if missing > 0 => {
                log::warn!("{missing} image(s) failed to generate; continuing without them");
            }
            _ => {}
        }

        let mut store = lock_store(&store);
        if store.state().current_step == WizardStep::Output {
            break;
        }
        if let Err(blocked) = navigation::next(&mut store) {
            bail!("{blocked}");
        }
    }

    let (title, html) = {
        let store = lock_store(&store);
        let state = store.state();
        (state.post_title.clone(), state.final_html.clone())
    };

    let dir = args.resolve_output_dir(&config);
    let path = export::write_html(&dir, &title, &html)?;

    if args.copy {
        if let Err(e) = export::copy_html(&html) {
            log::warn!("Clipboard copy failed: {e}");
        }
    }

    Ok(path)
}
