use std::sync::Arc;

use ndarray::Array1;

use super::state::StatePair;
use super::weights::Seq2SeqWeights;
use crate::base::error::{Error, Result};
use crate::op::activation::softmax;

/// One autoregressive step: a single token plus the running state in, a
/// distribution over the vocabulary plus the next state out.
pub trait Decoder: Send + Sync {
    fn step(&self, token: u32, state: &StatePair) -> Result<(Array1<f32>, StatePair)>;

    fn vocab_size(&self) -> usize;
}

/// Embedding + LSTM cell + dense softmax head.
pub struct LstmDecoder {
    weights: Arc<Seq2SeqWeights>,
}

impl LstmDecoder {
    pub fn new(weights: Arc<Seq2SeqWeights>) -> Self {
        Self { weights }
    }
}

impl Decoder for LstmDecoder {
    fn step(&self, token: u32, state: &StatePair) -> Result<(Array1<f32>, StatePair)> {
        if token as usize >= self.weights.vocab_size() {
            return Err(Error::InvalidArgument(format!(
                "decoder token id {} is outside the vocabulary of size {}",
                token,
                self.weights.vocab_size()
            ))
            .into());
        }

        let x = self.weights.embedding.forward(token)?;
        let next = self.weights.decoder_lstm.forward(x, state)?;
        let logits = self.weights.dense.forward(next.h.view())?;
        let probs = softmax(logits.view())?;
        Ok((probs, next))
    }

    fn vocab_size(&self) -> usize {
        self.weights.vocab_size()
    }
}
