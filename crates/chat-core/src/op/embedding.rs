use ndarray::{Array2, ArrayView1};

use crate::base::error::{Error, Result};

/// Embedding 算子，根据输入的 token ID 从权重矩阵中查找嵌入向量。
///
/// The same table is shared by the encoder and the decoder, so lookups only
/// ever borrow from it.
#[derive(Debug, Clone)]
pub struct Embedding {
    /// 权重矩阵 (查询表), 形状为 [vocab_size, dim]。
    pub weight: Array2<f32>,

    vocab_size: usize,
    dim: usize,
}

impl Embedding {
    /// 创建一个全零的 Embedding 算子。
    pub fn new(vocab_size: usize, dim: usize) -> Self {
        Self::from(Array2::zeros((vocab_size, dim)))
    }

    pub fn from(weight: Array2<f32>) -> Self {
        let (vocab_size, dim) = weight.dim();
        Self { weight, vocab_size, dim }
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// 查找单个 token 的嵌入向量 (零拷贝视图)。
    pub fn forward(&self, token_id: u32) -> Result<ArrayView1<'_, f32>> {
        let idx = token_id as usize;
        if idx >= self.vocab_size {
            return Err(Error::IndexOutOfBounds(format!(
                "token id {} is outside the embedding table of size {}",
                token_id, self.vocab_size
            ))
            .into());
        }
        Ok(self.weight.row(idx))
    }
}
