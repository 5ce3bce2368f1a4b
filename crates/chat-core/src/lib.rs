//! Seq2seq reply generation: an LSTM encoder/decoder pair, greedy decoding,
//! and the word-level tokenizer that feeds it.

pub mod base;
pub mod model;
pub mod op;
pub mod tokenizer;

pub use base::error::{Error, Result};
pub use model::{build_seq2seq, greedy_decode, FinishReason, Seq2Seq};
pub use tokenizer::{vocab::Vocabulary, Tokenizer};
