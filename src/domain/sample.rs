// ============================================================
// Layer 3 — TextSample Domain Type
// ============================================================
// One row of a text-classification table: the raw text and
// its integer category id. Samples are immutable once read.
//
// A batch of samples can also be viewed column-wise as two
// parallel Vecs (texts, labels). That transpose is what a
// default collate step produces, and what the tokenizing
// batcher consumes.
//
// Example:
//   [("good film", 1), ("dull", 0)]
//     → texts  = ["good film", "dull"]
//       labels = [1, 0]

use serde::{Deserialize, Serialize};

/// A single (text, label) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSample {
    /// Raw, untokenised text
    pub text: String,

    /// Category id
    pub label: i64,
}

impl TextSample {
    pub fn new(text: impl Into<String>, label: i64) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Column-wise view of a batch of samples.
/// `texts[i]` and `labels[i]` always come from the same sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextColumns {
    pub texts:  Vec<String>,
    pub labels: Vec<i64>,
}

impl TextColumns {
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl FromIterator<TextSample> for TextColumns {
    fn from_iter<T: IntoIterator<Item = TextSample>>(iter: T) -> Self {
        let (texts, labels) = iter
            .into_iter()
            .map(|s| (s.text, s.label))
            .unzip();
        Self { texts, labels }
    }
}
