use ndarray::Array1;

/// Recurrent memory handed from the encoder to the decoder and between
/// decode steps: `h` is the short-term (hidden) state, `c` the long-term
/// (cell) state. Both have length `hidden_dim`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatePair {
    pub h: Array1<f32>,
    pub c: Array1<f32>,
}

impl StatePair {
    pub fn new(h: Array1<f32>, c: Array1<f32>) -> Self {
        debug_assert_eq!(h.len(), c.len(), "h and c must share the hidden size");
        Self { h, c }
    }

    pub fn zeros(hidden_size: usize) -> Self {
        Self {
            h: Array1::zeros(hidden_size),
            c: Array1::zeros(hidden_size),
        }
    }

    pub fn hidden_size(&self) -> usize {
        self.h.len()
    }
}
