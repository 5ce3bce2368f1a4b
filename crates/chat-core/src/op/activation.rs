use ndarray::{Array1, ArrayView1, ArrayViewMut1};

use crate::base::error::{Error, Result};

#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// 原地 sigmoid
pub fn sigmoid_inplace(mut x: ArrayViewMut1<f32>) {
    x.mapv_inplace(sigmoid);
}

/// 原地 tanh
pub fn tanh_inplace(mut x: ArrayViewMut1<f32>) {
    x.mapv_inplace(f32::tanh);
}

/// Numerically stable softmax over a 1D logits vector.
///
/// The max logit is subtracted before exponentiation so large logits do not
/// overflow. An empty input is rejected since there is no distribution to form.
pub fn softmax(logits: ArrayView1<f32>) -> Result<Array1<f32>> {
    if logits.is_empty() {
        return Err(Error::InvalidArgument("softmax over an empty logits vector".into()).into());
    }

    let max = logits.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let mut probs = logits.mapv(|v| (v - max).exp());
    let sum = probs.sum();
    if !(sum.is_finite() && sum > 0.0) {
        return Err(Error::InternalError(format!(
            "softmax normalizer is not a positive finite value: {}",
            sum
        ))
        .into());
    }
    probs /= sum;
    Ok(probs)
}
