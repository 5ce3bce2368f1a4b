use std::sync::Arc;

use super::state::StatePair;
use super::weights::Seq2SeqWeights;
use crate::base::error::{Error, Result};
use crate::tokenizer::special_tokens::PAD_ID;

/// Compresses a fixed-length token sequence into a state pair.
pub trait Encoder: Send + Sync {
    /// Run the encoder over `input`, which must be exactly `input_len()` ids
    /// (pre-padded or truncated by the caller).
    fn encode(&self, input: &[u32]) -> Result<StatePair>;

    /// 输入序列的固定长度
    fn input_len(&self) -> usize;
}

/// Embedding + single-layer LSTM encoder.
///
/// Pad positions are masked: the recurrent state flows through them
/// unchanged, so right-padding does not disturb the final state.
pub struct LstmEncoder {
    weights: Arc<Seq2SeqWeights>,
    input_len: usize,
}

impl LstmEncoder {
    pub fn new(weights: Arc<Seq2SeqWeights>, input_len: usize) -> Self {
        Self { weights, input_len }
    }
}

impl Encoder for LstmEncoder {
    fn encode(&self, input: &[u32]) -> Result<StatePair> {
        if input.len() != self.input_len {
            return Err(Error::shape_mismatch(
                &[self.input_len],
                &[input.len()],
                "LstmEncoder::encode",
            )
            .into());
        }

        let vocab_size = self.weights.vocab_size();
        if let Some(&bad) = input.iter().find(|&&id| id as usize >= vocab_size) {
            return Err(Error::InvalidArgument(format!(
                "input token id {} is outside the vocabulary of size {}",
                bad, vocab_size
            ))
            .into());
        }

        let mut state = StatePair::zeros(self.weights.hidden_dim());
        for &token in input.iter().filter(|&&id| id != PAD_ID) {
            let x = self.weights.embedding.forward(token)?;
            state = self.weights.encoder_lstm.forward(x, &state)?;
        }
        Ok(state)
    }

    fn input_len(&self) -> usize {
        self.input_len
    }
}
