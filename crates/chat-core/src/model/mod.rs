pub mod config;
pub mod decoder;
pub mod encoder;
pub mod generate;
pub mod state;
pub mod weights;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use config::ModelConfig;
use decoder::LstmDecoder;
use encoder::LstmEncoder;
use generate::{Generation, GreedyDecoder};
use weights::Seq2SeqWeights;

use crate::base::error::Result;
use crate::tokenizer::vocab::Vocabulary;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use generate::{greedy_decode, FinishReason};
pub use state::StatePair;

/// Encoder/decoder pair over one shared set of weights.
///
/// Cheap to share: hold it in an `Arc` and call [`Seq2Seq::generate`] from as
/// many threads as needed. Each call allocates its own state pairs.
pub struct Seq2Seq {
    config: ModelConfig,
    weights: Arc<Seq2SeqWeights>,
    encoder: LstmEncoder,
    decoder: LstmDecoder,
}

impl Seq2Seq {
    pub fn from_weights(config: ModelConfig, weights: Seq2SeqWeights) -> Result<Self> {
        config.validate()?;
        if weights.vocab_size() != config.vocab_size || weights.hidden_dim() != config.hidden_dim {
            return Err(crate::base::error::Error::InvalidArgument(format!(
                "weights (vocab {}, hidden {}) do not match config (vocab {}, hidden {})",
                weights.vocab_size(),
                weights.hidden_dim(),
                config.vocab_size,
                config.hidden_dim
            ))
            .into());
        }

        let weights = Arc::new(weights);
        let encoder = LstmEncoder::new(weights.clone(), config.max_len);
        let decoder = LstmDecoder::new(weights.clone());
        Ok(Self { config, weights, encoder, decoder })
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn weights(&self) -> &Seq2SeqWeights {
        &self.weights
    }

    pub fn encoder(&self) -> &LstmEncoder {
        &self.encoder
    }

    pub fn decoder(&self) -> &LstmDecoder {
        &self.decoder
    }

    pub fn generate(&self, input: &[u32], vocab: &Vocabulary, max_steps: usize) -> Result<Generation> {
        GreedyDecoder::new(&self.encoder, &self.decoder, vocab).generate(input, max_steps)
    }

    /// Like [`Seq2Seq::generate`], but gives up with `Error::Cancelled` once
    /// `cancel` is set.
    pub fn generate_with_cancel(
        &self,
        input: &[u32],
        vocab: &Vocabulary,
        max_steps: usize,
        cancel: &AtomicBool,
    ) -> Result<Generation> {
        GreedyDecoder::new(&self.encoder, &self.decoder, vocab)
            .with_cancel(cancel)
            .generate(input, max_steps)
    }
}

/// 构建 seq2seq 模型：共享 embedding + 编码器 LSTM + 解码器 LSTM + 输出层。
///
/// Parameters are initialized from `config.seed`; training is out of scope,
/// so the replies are only as good as those parameters.
pub fn build_seq2seq(config: &ModelConfig) -> Result<Seq2Seq> {
    let weights = Seq2SeqWeights::initialize(config)?;
    tracing::info!(
        vocab_size = config.vocab_size,
        embedding_dim = config.embedding_dim,
        hidden_dim = config.hidden_dim,
        max_len = config.max_len,
        parameters = weights.num_parameters(),
        "seq2seq model built"
    );
    Seq2Seq::from_weights(config.clone(), weights)
}
