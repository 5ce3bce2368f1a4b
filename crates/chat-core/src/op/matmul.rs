use ndarray::{Array1, Array2, ArrayView1, Zip};

use crate::base::error::{Error, Result};

/// 全连接层: y = W x + b
///
/// * `weight`: 形状 [out_features, in_features]
/// * `bias`:   形状 [out_features]
///
/// Rows are reduced in parallel with rayon once the output is wide enough
/// (the vocabulary projection is the hot spot of every decode step).
#[derive(Debug, Clone)]
pub struct Matmul {
    pub weight: Array2<f32>,
    pub bias: Array1<f32>,
}

/// Below this many output rows the serial `dot` is cheaper than a rayon split.
const PARALLEL_ROW_THRESHOLD: usize = 4096;

impl Matmul {
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self {
            weight: Array2::zeros((out_features, in_features)),
            bias: Array1::zeros(out_features),
        }
    }

    pub fn from(weight: Array2<f32>, bias: Array1<f32>) -> Result<Self> {
        if weight.nrows() != bias.len() {
            return Err(Error::shape_mismatch(
                &[weight.nrows()],
                &[bias.len()],
                "Matmul::from",
            )
            .into());
        }
        Ok(Self { weight, bias })
    }

    pub fn in_features(&self) -> usize {
        self.weight.ncols()
    }

    pub fn out_features(&self) -> usize {
        self.weight.nrows()
    }

    pub fn forward(&self, input: ArrayView1<f32>) -> Result<Array1<f32>> {
        if input.len() != self.in_features() {
            return Err(Error::shape_mismatch(
                &[self.in_features()],
                &[input.len()],
                "Matmul::forward",
            )
            .into());
        }

        if self.out_features() < PARALLEL_ROW_THRESHOLD {
            return Ok(self.weight.dot(&input) + &self.bias);
        }

        let mut output = Array1::<f32>::zeros(self.out_features());
        Zip::from(&mut output)
            .and(self.weight.rows())
            .and(&self.bias)
            .par_for_each(|out, row, &b| *out = row.dot(&input) + b);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_matmul_small() -> Result<()> {
        let layer = Matmul::from(array![[1.0f32, 2.0], [3.0, 4.0], [5.0, 6.0]], array![0.5f32, 0.0, -1.0])?;
        let out = layer.forward(array![1.0f32, 1.0].view())?;
        assert_eq!(out.to_vec(), vec![3.5, 7.0, 10.0]);
        Ok(())
    }

    #[test]
    fn test_matmul_parallel_path_matches_serial() -> Result<()> {
        let rows = PARALLEL_ROW_THRESHOLD + 3;
        let weight = Array2::from_shape_fn((rows, 4), |(r, c)| ((r * 7 + c) % 11) as f32 * 0.1);
        let bias = Array1::from_shape_fn(rows, |r| (r % 5) as f32);
        let input = array![0.25f32, -0.5, 1.0, 2.0];

        let expected = weight.dot(&input) + &bias;
        let layer = Matmul::from(weight, bias)?;
        let out = layer.forward(input.view())?;

        for (a, b) in out.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-5);
        }
        Ok(())
    }

    #[test]
    fn test_matmul_rejects_wrong_input_width() {
        let layer = Matmul::new(3, 2);
        assert!(layer.forward(array![1.0f32, 2.0].view()).is_err());
    }

    #[test]
    fn test_matmul_from_rejects_bias_mismatch() {
        assert!(Matmul::from(Array2::zeros((3, 2)), Array1::zeros(2)).is_err());
    }
}
