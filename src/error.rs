// ============================================================
// Data Pipeline Errors
// ============================================================
// Every failure the data layer can produce. Nothing here is
// retried or recovered: the error aborts the current setup
// call or batch fetch and goes straight back to the caller.
//
// The application and CLI layers wrap these in anyhow with
// extra context; library code returns them typed.

use thiserror::Error;

use crate::domain::split::Split;

/// Errors raised while loading datasets, building loaders,
/// or assembling batches.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    /// The source table could not be read or lacks the
    /// requested columns, or a row is malformed.
    #[error("cannot load '{path}': {reason}")]
    Load { path: String, reason: String },

    /// Index outside `[0, len)`.
    #[error("index {index} out of range for dataset of {len} rows")]
    OutOfRange { index: i64, len: usize },

    /// Raised by the tokenization transformation and propagated unchanged.
    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// A loader was requested before the phase that builds its dataset.
    #[error("{split} dataset is not initialised; call setup with the matching stage first")]
    NotInitialized { split: Split },

    /// Loader options the loader refuses to combine.
    #[error("invalid loader options: {0}")]
    InvalidOptions(String),

    /// Assembling a batch panicked, inline or on a loader worker thread.
    #[error("loader worker failed: {0}")]
    Worker(String),
}

impl DataError {
    pub(crate) fn load(path: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        DataError::Load {
            path:   path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
