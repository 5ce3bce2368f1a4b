// src/model/config.rs

use serde::{Deserialize, Serialize};

use crate::base::error::{Error, Result};

pub const VOCAB_SIZE: usize = 20000;
pub const EMBEDDING_DIM: usize = 100;
pub const HIDDEN_DIM: usize = 300;
/// 编码器输入的固定长度，同时也是默认的解码步数上限。
pub const MAX_LEN: usize = 20;
pub const DEFAULT_SEED: u64 = 42;
/// 未训练参数的均匀初始化范围 [-INIT_SCALE, INIT_SCALE]
pub const INIT_SCALE: f32 = 0.05;

/// Hyper-parameters of the seq2seq model.
///
/// The defaults reproduce the conversational model this service was designed
/// around: a 20k-word vocabulary, 100-dimensional shared embeddings and a
/// single 300-unit LSTM on each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub hidden_dim: usize,
    pub max_len: usize,
    /// Seed for the deterministic parameter initialization.
    pub seed: u64,
    pub init_scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vocab_size: VOCAB_SIZE,
            embedding_dim: EMBEDDING_DIM,
            hidden_dim: HIDDEN_DIM,
            max_len: MAX_LEN,
            seed: DEFAULT_SEED,
            init_scale: INIT_SCALE,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        // pad / bos / eos 至少需要三个 id，外加一个可生成的词
        if self.vocab_size < 4 {
            return Err(Error::InvalidArgument(format!(
                "vocab_size must be at least 4 (pad, bos, eos and one word), got {}",
                self.vocab_size
            ))
            .into());
        }
        if self.vocab_size > u32::MAX as usize {
            return Err(Error::InvalidArgument(format!(
                "vocab_size {} does not fit u32 token ids",
                self.vocab_size
            ))
            .into());
        }
        if self.embedding_dim == 0 || self.hidden_dim == 0 {
            return Err(Error::InvalidArgument(format!(
                "embedding_dim ({}) and hidden_dim ({}) must be positive",
                self.embedding_dim, self.hidden_dim
            ))
            .into());
        }
        if self.max_len == 0 {
            return Err(Error::InvalidArgument("max_len must be positive".into()).into());
        }
        if !(self.init_scale.is_finite() && self.init_scale > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "init_scale must be a positive finite value, got {}",
                self.init_scale
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert_eq!(config.vocab_size, 20000);
        assert_eq!(config.embedding_dim, 100);
        assert_eq!(config.hidden_dim, 300);
        assert_eq!(config.max_len, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ModelConfig::default();
        config.vocab_size = 3;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.hidden_dim = 0;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.max_len = 0;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.init_scale = f32::NAN;
        assert!(config.validate().is_err());
    }
}
