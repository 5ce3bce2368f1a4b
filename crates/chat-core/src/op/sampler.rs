// Token selection for the decode loop.
//
// Only greedy selection is provided; the trait is the seam where another
// strategy would plug in.

use ndarray::ArrayView1;

use crate::base::error::{Error, Result};

/// Sampler trait for different selection strategies
pub trait Sampler: Send + Sync {
    /// Pick the next token id from a probability distribution over the vocabulary.
    fn sample(&self, probs: ArrayView1<f32>) -> Result<u32>;
}

// ================ Argmax Sampler (Greedy Decoding) ================

#[derive(Debug, Clone, Copy, Default)]
pub struct ArgmaxSampler;

impl ArgmaxSampler {
    pub fn new() -> Self {
        Self
    }
}

impl Sampler for ArgmaxSampler {
    fn sample(&self, probs: ArrayView1<f32>) -> Result<u32> {
        argmax(probs)
    }
}

/// 在 CPU 上对 1D 分布执行 argmax。
///
/// Ties resolve to the lowest index: a later element must be strictly greater
/// to replace the current best. NaN entries never win.
pub fn argmax(probs: ArrayView1<f32>) -> Result<u32> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &p) in probs.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((idx, p)),
        }
    }

    let (idx, _) = best.ok_or_else(|| {
        Error::InvalidArgument(format!(
            "argmax over a distribution with no comparable entries (len {})",
            probs.len()
        ))
    })?;

    u32::try_from(idx).map_err(|_| {
        Error::IndexOutOfBounds(format!("argmax index {} does not fit a token id", idx)).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_argmax_picks_max() -> Result<()> {
        assert_eq!(argmax(array![0.1f32, 0.7, 0.2].view())?, 1);
        Ok(())
    }

    #[test]
    fn test_argmax_tie_prefers_lowest_id() -> Result<()> {
        assert_eq!(argmax(array![0.1f32, 0.4, 0.1, 0.4].view())?, 1);
        assert_eq!(argmax(array![0.25f32, 0.25, 0.25, 0.25].view())?, 0);
        Ok(())
    }

    #[test]
    fn test_argmax_skips_nan() -> Result<()> {
        assert_eq!(argmax(array![f32::NAN, 0.2, 0.8].view())?, 2);
        Ok(())
    }

    #[test]
    fn test_argmax_empty_or_all_nan_is_error() {
        let empty: Array1<f32> = Array1::zeros(0);
        assert!(argmax(empty.view()).is_err());
        assert!(argmax(array![f32::NAN, f32::NAN].view()).is_err());
    }

    #[test]
    fn test_sampler_trait_object() -> Result<()> {
        let sampler: Box<dyn Sampler> = Box::new(ArgmaxSampler::new());
        assert_eq!(sampler.sample(array![0.0f32, 0.0, 1.0].view())?, 2);
        Ok(())
    }
}
