use ndarray::{s, Array1, Array2};
use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::ModelConfig;
use crate::base::error::{Error, Result};
use crate::op::{Embedding, LstmCell, Matmul};

/// All parameters of the seq2seq model.
///
/// Built once at startup and shared read-only (behind an `Arc`) by the
/// encoder, the decoder and every in-flight request.
#[derive(Debug, Clone)]
pub struct Seq2SeqWeights {
    /// 编码器与解码器共享的词嵌入表 [vocab_size, embedding_dim]
    pub embedding: Embedding,
    pub encoder_lstm: LstmCell,
    pub decoder_lstm: LstmCell,
    /// 输出投影 [vocab_size, hidden_dim]
    pub dense: Matmul,
}

impl Seq2SeqWeights {
    /// Assemble weights from parts, checking that the shapes line up.
    pub fn from_parts(
        embedding: Embedding,
        encoder_lstm: LstmCell,
        decoder_lstm: LstmCell,
        dense: Matmul,
    ) -> Result<Self> {
        let emb_dim = embedding.dim();
        let vocab_size = embedding.vocab_size();

        for (name, cell) in [("encoder", &encoder_lstm), ("decoder", &decoder_lstm)] {
            if cell.input_dim() != emb_dim {
                return Err(Error::InvalidArgument(format!(
                    "{} LSTM expects input_dim {}, but the embedding dim is {}",
                    name,
                    cell.input_dim(),
                    emb_dim
                ))
                .into());
            }
        }
        if encoder_lstm.hidden_dim() != decoder_lstm.hidden_dim() {
            return Err(Error::shape_mismatch(
                &[encoder_lstm.hidden_dim()],
                &[decoder_lstm.hidden_dim()],
                "Seq2SeqWeights::from_parts (decoder hidden_dim)",
            )
            .into());
        }
        if dense.in_features() != decoder_lstm.hidden_dim() || dense.out_features() != vocab_size {
            return Err(Error::shape_mismatch(
                &[vocab_size, decoder_lstm.hidden_dim()],
                &[dense.out_features(), dense.in_features()],
                "Seq2SeqWeights::from_parts (dense)",
            )
            .into());
        }

        Ok(Self { embedding, encoder_lstm, decoder_lstm, dense })
    }

    /// 用固定种子初始化未训练的参数。
    ///
    /// Kernels are drawn from `U(-init_scale, init_scale)`; biases start at
    /// zero except the forget gate, which starts at one. The same seed always
    /// yields the same parameters.
    pub fn initialize(config: &ModelConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let dist = Uniform::new(-config.init_scale, config.init_scale)
            .map_err(|e| Error::InvalidArgument(format!("invalid init range: {}", e)))?;
        let mut uniform = |rows: usize, cols: usize| -> Array2<f32> {
            Array2::from_shape_simple_fn((rows, cols), || rng.sample(dist))
        };

        let (v, e, h) = (config.vocab_size, config.embedding_dim, config.hidden_dim);

        let embedding = Embedding::from(uniform(v, e));
        let encoder_kernel = Matmul::from(uniform(4 * h, e), lstm_bias(h))?;
        let encoder_lstm = LstmCell::from(encoder_kernel, uniform(4 * h, h))?;
        let decoder_kernel = Matmul::from(uniform(4 * h, e), lstm_bias(h))?;
        let decoder_lstm = LstmCell::from(decoder_kernel, uniform(4 * h, h))?;
        let dense = Matmul::from(uniform(v, h), Array1::zeros(v))?;

        Self::from_parts(embedding, encoder_lstm, decoder_lstm, dense)
    }

    pub fn vocab_size(&self) -> usize {
        self.embedding.vocab_size()
    }

    pub fn hidden_dim(&self) -> usize {
        self.decoder_lstm.hidden_dim()
    }

    pub fn num_parameters(&self) -> usize {
        let cell = |c: &LstmCell| c.kernel.weight.len() + c.kernel.bias.len() + c.recurrent.len();
        self.embedding.weight.len()
            + cell(&self.encoder_lstm)
            + cell(&self.decoder_lstm)
            + self.dense.weight.len()
            + self.dense.bias.len()
    }
}

fn lstm_bias(hidden_dim: usize) -> Array1<f32> {
    let mut bias = Array1::zeros(4 * hidden_dim);
    bias.slice_mut(s![hidden_dim..2 * hidden_dim]).fill(1.0);
    bias
}
