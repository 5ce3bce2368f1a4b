//! CPU operators used by the seq2seq model.
//!
//! Every operator works on `ndarray` vectors for a single time step; batching
//! is not needed since each request decodes one sequence.

pub mod activation;
pub mod embedding;
pub mod lstm;
pub mod matmul;
pub mod sampler;

pub use embedding::Embedding;
pub use lstm::LstmCell;
pub use matmul::Matmul;
pub use sampler::{argmax, ArgmaxSampler, Sampler};
