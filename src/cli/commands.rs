// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// clap's derive macros generate help text, missing-argument
// errors and type conversion (string → usize, Split, ...).
//
// Each Args struct converts into its use case's request via
// From, so the application layer never sees clap types.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::application::generate_config_use_case::GenerateConfigRequest;
use crate::application::prepare_tokenizer_use_case::PrepareTokenizerRequest;
use crate::application::preview_use_case::PreviewRequest;
use crate::domain::split::Split;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Activate a tracking run and save the final config with its ids
    GenerateConfig(GenerateConfigArgs),

    /// Print the first batch of a split
    Preview(PreviewArgs),

    /// Build (or reuse) the tokenizer from the train split
    PrepareTokenizer(PrepareTokenizerArgs),
}

#[derive(Args, Debug)]
pub struct GenerateConfigArgs {
    /// Base pipeline config (YAML)
    #[arg(long, default_value = "configs/config.yaml")]
    pub config: PathBuf,

    /// Where config.yaml is written
    #[arg(long, default_value = "configs/automatically_generated")]
    pub output_dir: PathBuf,
}

impl From<GenerateConfigArgs> for GenerateConfigRequest {
    fn from(a: GenerateConfigArgs) -> Self {
        GenerateConfigRequest {
            config_path: a.config,
            output_dir:  a.output_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[arg(long, default_value = "configs/config.yaml")]
    pub config: PathBuf,

    /// train, dev or test
    #[arg(long, default_value = "dev")]
    pub split: Split,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,
}

impl From<PreviewArgs> for PreviewRequest {
    fn from(a: PreviewArgs) -> Self {
        PreviewRequest {
            config_path: a.config,
            split:       a.split,
            batch_size:  a.batch_size,
        }
    }
}

#[derive(Args, Debug)]
pub struct PrepareTokenizerArgs {
    #[arg(long, default_value = "configs/config.yaml")]
    pub config: PathBuf,
}

impl From<PrepareTokenizerArgs> for PrepareTokenizerRequest {
    fn from(a: PrepareTokenizerArgs) -> Self {
        PrepareTokenizerRequest {
            config_path: a.config,
        }
    }
}
