pub use anyhow::Result;
// 使用 thiserror 定义库内的错误类型，对外统一转换为 anyhow::Error
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Shape mismatch in {in_method}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        in_method: String,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization/Deserialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl Error {
    pub fn shape_mismatch(expected: &[usize], actual: &[usize], in_method: &str) -> Self {
        Error::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
            in_method: in_method.to_string(),
        }
    }
}
