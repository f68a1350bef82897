// ============================================================
// Layer 3 — EncodedText Domain Type
// ============================================================
// What a tokenization transformation hands back for a batch of
// texts: one row of token ids and one attention-mask row per
// input text, in input order.
//
// Rows are expected to be padded to a common length by the
// tokenizer. `is_rectangular` lets the batcher check that
// before stacking into a 2D tensor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedText {
    /// Token ids — one Vec per input text
    pub input_ids: Vec<Vec<u32>>,

    /// 1 = real token, 0 = padding
    pub attention_mask: Vec<Vec<u32>>,
}

impl EncodedText {
    /// Number of encoded rows (the batch dimension)
    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }

    /// Length of the first row, 0 for an empty batch
    pub fn seq_len(&self) -> usize {
        self.input_ids.first().map_or(0, Vec::len)
    }

    /// True when every id row and mask row has the same length
    /// and there are as many mask rows as id rows.
    pub fn is_rectangular(&self) -> bool {
        let seq_len = self.seq_len();
        self.input_ids.len() == self.attention_mask.len()
            && self.input_ids.iter().all(|row| row.len() == seq_len)
            && self.attention_mask.iter().all(|row| row.len() == seq_len)
    }
}
