use ndarray::{s, Array2, ArrayView1};

use super::activation::{sigmoid_inplace, tanh_inplace};
use super::matmul::Matmul;
use crate::base::error::{Error, Result};
use crate::model::state::StatePair;

/// 单层 LSTM 单元 (单步前向)
///
/// Gate layout follows the Keras convention, stacked along the first axis of
/// both kernels as `[input, forget, cell, output]`:
///
/// ```text
/// z  = W x + b + U h
/// i  = sigmoid(z[0H..1H])    f = sigmoid(z[1H..2H])
/// g  = tanh(z[2H..3H])       o = sigmoid(z[3H..4H])
/// c' = f * c + i * g
/// h' = o * tanh(c')
/// ```
#[derive(Debug, Clone)]
pub struct LstmCell {
    /// 输入权重 W [4H, input_dim] 以及偏置 b [4H]
    pub kernel: Matmul,
    /// 循环权重 U [4H, H]
    pub recurrent: Array2<f32>,
    hidden_dim: usize,
}

impl LstmCell {
    pub fn new(input_dim: usize, hidden_dim: usize) -> Self {
        Self {
            kernel: Matmul::new(input_dim, 4 * hidden_dim),
            recurrent: Array2::zeros((4 * hidden_dim, hidden_dim)),
            hidden_dim,
        }
    }

    pub fn from(kernel: Matmul, recurrent: Array2<f32>) -> Result<Self> {
        let hidden_dim = recurrent.ncols();
        if kernel.out_features() != 4 * hidden_dim || recurrent.nrows() != 4 * hidden_dim {
            return Err(Error::shape_mismatch(
                &[4 * hidden_dim, hidden_dim],
                &[kernel.out_features(), recurrent.nrows()],
                "LstmCell::from",
            )
            .into());
        }
        Ok(Self { kernel, recurrent, hidden_dim })
    }

    pub fn input_dim(&self) -> usize {
        self.kernel.in_features()
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// 执行一步前向计算，返回新的状态对。输入状态不会被修改。
    pub fn forward(&self, input: ArrayView1<f32>, state: &StatePair) -> Result<StatePair> {
        if state.hidden_size() != self.hidden_dim {
            return Err(Error::shape_mismatch(
                &[self.hidden_dim],
                &[state.hidden_size()],
                "LstmCell::forward",
            )
            .into());
        }

        let h = self.hidden_dim;
        let mut z = self.kernel.forward(input)?;
        z += &self.recurrent.dot(&state.h);

        sigmoid_inplace(z.slice_mut(s![0..2 * h]));
        tanh_inplace(z.slice_mut(s![2 * h..3 * h]));
        sigmoid_inplace(z.slice_mut(s![3 * h..4 * h]));

        let i = z.slice(s![0..h]);
        let f = z.slice(s![h..2 * h]);
        let g = z.slice(s![2 * h..3 * h]);
        let o = z.slice(s![3 * h..4 * h]);

        let c = &f * &state.c + &i * &g;
        let h_next = &o * &c.mapv(f32::tanh);

        Ok(StatePair::new(h_next, c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_zero_weights_halve_cell_state() -> Result<()> {
        // 全零权重: i = f = o = 0.5, g = 0
        // c' = 0.5 * c, h' = 0.5 * tanh(c')
        let cell = LstmCell::new(3, 2);
        let state = StatePair::new(Array1::zeros(2), array![1.0f32, -2.0]);
        let next = cell.forward(array![1.0f32, 2.0, 3.0].view(), &state)?;

        assert_eq!(next.c.to_vec(), vec![0.5, -1.0]);
        assert!((next.h[0] - 0.5 * 0.5f32.tanh()).abs() < 1e-6);
        assert!((next.h[1] - 0.5 * (-1.0f32).tanh()).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_input_gate_bias_admits_candidate() -> Result<()> {
        let hidden = 1;
        let mut cell = LstmCell::new(1, hidden);
        // i 饱和打开, f 关闭, g = tanh(1 * x), o 打开
        cell.kernel.bias = array![50.0f32, -50.0, 0.0, 50.0];
        cell.kernel.weight = array![[0.0f32], [0.0], [1.0], [0.0]];

        let state = StatePair::zeros(hidden);
        let next = cell.forward(array![0.5f32].view(), &state)?;

        assert!((next.c[0] - 0.5f32.tanh()).abs() < 1e-5);
        assert!((next.h[0] - next.c[0].tanh()).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_state_dimension_mismatch() {
        let cell = LstmCell::new(2, 4);
        let state = StatePair::zeros(3);
        assert!(cell.forward(array![0.0f32, 0.0].view(), &state).is_err());
    }

    #[test]
    fn test_from_validates_gate_stacking() {
        let kernel = Matmul::new(2, 8);
        assert!(LstmCell::from(kernel.clone(), Array2::zeros((8, 2))).is_ok());
        assert!(LstmCell::from(kernel, Array2::zeros((8, 3))).is_err());
    }
}
