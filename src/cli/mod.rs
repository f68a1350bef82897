// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `generate-config`   — activate a run, write config.yaml
//   2. `preview`           — print the first batch of a split
//   3. `prepare-tokenizer` — build tokenizer.json from train
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateConfigArgs, PrepareTokenizerArgs, PreviewArgs};

/// clap reads the fields and generates the argument parser.
#[derive(Parser, Debug)]
#[command(
    name = "textcls",
    version,
    about = "Text-classification data pipeline: configs, previews and tokenizers."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::GenerateConfig(args)   => run_generate_config(args),
            Commands::Preview(args)          => run_preview(args),
            Commands::PrepareTokenizer(args) => run_prepare_tokenizer(args),
        }
    }
}

fn run_generate_config(args: GenerateConfigArgs) -> Result<()> {
    use crate::application::generate_config_use_case::GenerateConfigUseCase;

    let out    = GenerateConfigUseCase::new(args.into()).execute()?;
    let mlflow = &out.config.infrastructure.mlflow;

    println!("Config written to {}", out.path.display());
    println!("  run_id:        {}", mlflow.run_id.as_deref().unwrap_or("-"));
    println!("  experiment_id: {}", mlflow.experiment_id.as_deref().unwrap_or("-"));
    println!("  artifact_uri:  {}", mlflow.artifact_uri.as_deref().unwrap_or("-"));
    Ok(())
}

fn run_preview(args: PreviewArgs) -> Result<()> {
    use crate::application::preview_use_case::PreviewUseCase;

    let preview = PreviewUseCase::new(args.into()).execute()?;

    println!("{} split: {} rows", preview.split, preview.dataset_len);
    println!("texts={:?}", preview.texts);
    println!("labels={:?}", preview.labels);
    if let Some([batch, seq]) = preview.token_shape {
        println!("input_ids shape=[{}, {}]", batch, seq);
    }
    Ok(())
}

fn run_prepare_tokenizer(args: PrepareTokenizerArgs) -> Result<()> {
    use crate::application::prepare_tokenizer_use_case::PrepareTokenizerUseCase;

    let out = PrepareTokenizerUseCase::new(args.into()).execute()?;
    println!("Tokenizer ready at {} ({} tokens)", out.path.display(), out.vocab_size);
    Ok(())
}
