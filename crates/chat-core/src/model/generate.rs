//! Greedy autoregressive decoding.
//!
//! The loop is an explicit state machine over [`DecodeState`]: encode once,
//! then feed the decoder's argmax back in until it emits the end marker, the
//! pad id, or the step budget runs out.

use std::sync::atomic::{AtomicBool, Ordering};

use super::decoder::Decoder;
use super::encoder::Encoder;
use super::state::StatePair;
use crate::base::error::{Error, Result};
use crate::op::sampler::{ArgmaxSampler, Sampler};
use crate::tokenizer::special_tokens::PAD_ID;
use crate::tokenizer::vocab::Vocabulary;

/// Why the decode loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// 选中了 end-of-sequence
    Eos,
    /// The model put its maximum on the pad id. Treated as a stop signal.
    Pad,
    /// 用完了 max_steps
    Length,
}

/// Result of one decode call.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    /// Emitted token ids, excluding the terminating eos/pad id.
    pub token_ids: Vec<u32>,
    /// Number of decoder invocations.
    pub steps: usize,
    pub finish_reason: FinishReason,
}

/// 解码循环的状态
#[derive(Debug)]
struct DecodeState {
    current_token: u32,
    state: StatePair,
    steps_taken: usize,
}

/// Greedy decode driver over any encoder/decoder pair.
pub struct GreedyDecoder<'a> {
    encoder: &'a dyn Encoder,
    decoder: &'a dyn Decoder,
    vocab: &'a Vocabulary,
    sampler: Box<dyn Sampler + 'a>,
    cancel: Option<&'a AtomicBool>,
}

impl<'a> GreedyDecoder<'a> {
    pub fn new(encoder: &'a dyn Encoder, decoder: &'a dyn Decoder, vocab: &'a Vocabulary) -> Self {
        Self {
            encoder,
            decoder,
            vocab,
            sampler: Box::new(ArgmaxSampler::new()),
            cancel: None,
        }
    }

    /// Abort with [`Error::Cancelled`] once `flag` is set. Checked before
    /// every decoder step.
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Run the loop for at most `max_steps` decoder invocations.
    pub fn generate(&self, input: &[u32], max_steps: usize) -> Result<Generation> {
        if input.len() != self.encoder.input_len() {
            return Err(Error::shape_mismatch(
                &[self.encoder.input_len()],
                &[input.len()],
                "GreedyDecoder::generate",
            )
            .into());
        }

        let bos = self.vocab.bos_id();
        let eos = self.vocab.eos_id();
        let vocab_size = self.decoder.vocab_size();

        let mut ds = DecodeState {
            current_token: bos,
            state: self.encoder.encode(input)?,
            steps_taken: 0,
        };
        let mut token_ids = Vec::new();
        let mut words: Vec<&str> = Vec::new();
        let mut finish_reason = FinishReason::Length;

        while ds.steps_taken < max_steps {
            if self.cancelled() {
                tracing::debug!(steps = ds.steps_taken, "greedy decode cancelled");
                return Err(Error::Cancelled.into());
            }

            let (probs, next_state) = self.decoder.step(ds.current_token, &ds.state)?;
            ds.steps_taken += 1;
            if probs.len() != vocab_size {
                return Err(Error::shape_mismatch(&[vocab_size], &[probs.len()], "Decoder::step").into());
            }

            let next_token = self.sampler.sample(probs.view())?;
            if next_token == eos {
                finish_reason = FinishReason::Eos;
                break;
            }
            if next_token == PAD_ID {
                finish_reason = FinishReason::Pad;
                break;
            }

            words.push(self.vocab.render(next_token));
            token_ids.push(next_token);
            ds.current_token = next_token;
            ds.state = next_state;
        }

        tracing::debug!(
            steps = ds.steps_taken,
            tokens = token_ids.len(),
            finish_reason = ?finish_reason,
            "greedy decode finished"
        );

        Ok(Generation {
            text: words.join(" "),
            token_ids,
            steps: ds.steps_taken,
            finish_reason,
        })
    }
}

/// Decode `input` greedily and return the reply as a space-joined string.
pub fn greedy_decode(
    input: &[u32],
    encoder: &dyn Encoder,
    decoder: &dyn Decoder,
    vocab: &Vocabulary,
    max_steps: usize,
) -> Result<String> {
    GreedyDecoder::new(encoder, decoder, vocab)
        .generate(input, max_steps)
        .map(|g| g.text)
}
