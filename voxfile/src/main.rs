#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod batch;

use std::path::Path;

use args::{Args, Command, SynthesisOverrides};
use clap::Parser;
use tts::{Credentials, Synthesizer, SynthesizerBuilder};
use voxfile_config::{BackendType, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load_or_default(&args.config)?;

    // Initialize telemetry
    voxfile_telemetry::init(&config.telemetry, args.log.as_deref())?;

    tracing::debug!(config_path = %args.config.display(), "starting voxfile");

    match args.command {
        Command::Speak {
            text,
            output,
            overrides,
        } => speak(&config, &text, &output, &overrides).await,
        Command::Batch {
            file,
            output_dir,
            prefix,
            overrides,
        } => run_batch(&config, &file, output_dir.as_deref(), &prefix, &overrides).await,
        Command::Voices => {
            print_voices(config.backend.backend_type);
            Ok(())
        }
    }
}

fn setup(config: &Config) -> anyhow::Result<(Synthesizer, Credentials)> {
    let credentials = Credentials::from_config(&config.credentials)?;
    let synthesizer = SynthesizerBuilder::new(config)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to initialize synthesizer: {e}"))?;

    Ok((synthesizer, credentials))
}

async fn speak(config: &Config, text: &str, output: &Path, overrides: &SynthesisOverrides) -> anyhow::Result<()> {
    let (synthesizer, credentials) = setup(config)?;
    let params = overrides.params(text, &config.synthesis);

    let artifact = synthesizer.synthesize_to_file(&credentials, &params, output).await?;

    println!("{}", artifact.path.display());

    Ok(())
}

async fn run_batch(
    config: &Config,
    file: &Path,
    output_dir: Option<&Path>,
    prefix: &str,
    overrides: &SynthesisOverrides,
) -> anyhow::Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", file.display()))?;

    let items = batch::items(&contents, output_dir, prefix);

    if items.is_empty() {
        tracing::warn!("{} has no text to synthesize", file.display());
        return Ok(());
    }

    let (synthesizer, credentials) = setup(config)?;
    let mut summary = batch::Summary::default();

    for item in &items {
        let params = overrides.params(&item.text, &config.synthesis);

        match synthesizer.synthesize_to_file(&credentials, &params, &item.output).await {
            Ok(artifact) => {
                summary.succeeded += 1;
                println!("[{}/{}] {}", item.index, items.len(), artifact.path.display());
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!(index = item.index, kind = e.kind(), "line {} failed: {e}", item.index);
            }
        }
    }

    println!(
        "{} of {} succeeded, {} failed",
        summary.succeeded,
        summary.total(),
        summary.failed
    );

    if summary.failed > 0 {
        anyhow::bail!("{} of {} texts failed", summary.failed, summary.total());
    }

    Ok(())
}

fn print_voices(backend: BackendType) {
    match backend {
        BackendType::Baidu => {
            for voice in tts::VOICES {
                let tier = if voice.premium { "premium" } else { "basic" };
                println!("{:>4}  {:<30} {tier}", voice.id, voice.name);
            }
        }
        BackendType::Aliyun => {
            for voice in tts::backend::aliyun::VOICES {
                println!("{:<10}  {}", voice.name, voice.description);
            }
        }
    }
}
