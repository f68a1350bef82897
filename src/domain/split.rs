// ============================================================
// Layer 3 — Splits, Stages and Loader Modes
// ============================================================
//   Split      — which partition a dataset belongs to
//   Stage      — which setup phase builds which splits
//   LoaderMode — whether a loader may shuffle
//
// Fit builds train + dev, Test builds test. Train loaders run
// in LoaderMode::Train; dev and test loaders always run in
// LoaderMode::Eval, which turns shuffling off.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    /// The loader mode a split is always served in
    pub fn mode(self) -> LoaderMode {
        match self {
            Split::Train             => LoaderMode::Train,
            Split::Dev | Split::Test => LoaderMode::Eval,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Dev   => "dev",
            Split::Test  => "test",
        };
        f.write_str(name)
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train"                => Ok(Split::Train),
            "dev" | "val" | "validation" => Ok(Split::Dev),
            "test"                 => Ok(Split::Test),
            other => Err(format!("unknown split '{other}' (expected train, dev or test)")),
        }
    }
}

/// Setup phase requested by a training driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fit,
    Test,
}

impl Stage {
    /// Splits whose datasets this stage constructs
    pub fn splits(self) -> &'static [Split] {
        match self {
            Stage::Fit  => &[Split::Train, Split::Dev],
            Stage::Test => &[Split::Test],
        }
    }
}

/// Capability toggle threaded into loader construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoaderMode {
    /// Shuffling allowed if configured
    Train,
    /// Shuffling always off
    Eval,
}
