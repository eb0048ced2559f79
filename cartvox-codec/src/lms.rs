//! LMS (Least Mean Squares) predictor
//!
//! This is the decoder state that persists across frames. A fresh `Lms` is
//! the fixed starting configuration every stream is encoded from.

use crate::LMS_LEN;

/// Initial filter weights, roughly `[0, 0, -1, 2]` after the prediction shift
const INITIAL_WEIGHTS: [i32; LMS_LEN] = [0, 0, -(1 << 13), 1 << 14];

/// 4-tap LMS predictor state
///
/// Predicts the next sample from the last four reconstructed samples. The
/// weights adapt after each sample to minimize prediction error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lms {
    /// History of last 4 reconstructed samples
    pub history: [i32; LMS_LEN],

    /// Adaptive filter weights
    pub weights: [i32; LMS_LEN],
}

impl Default for Lms {
    fn default() -> Self {
        Self::new()
    }
}

impl Lms {
    /// Create the starting predictor state
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: [0; LMS_LEN],
            weights: INITIAL_WEIGHTS,
        }
    }

    /// Reset to the starting state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Predict next sample based on history
    ///
    /// Returns the predicted sample value (before adding the dequantized residual).
    #[inline]
    #[must_use]
    pub fn predict(&self) -> i32 {
        let mut prediction = 0i32;
        for i in 0..LMS_LEN {
            prediction = prediction.wrapping_add(self.weights[i].wrapping_mul(self.history[i]));
        }
        prediction >> 13
    }

    /// Update weights and history after reconstructing a sample
    ///
    /// # Arguments
    /// * `sample` - The reconstructed sample (predicted + dequantized residual, clamped)
    /// * `residual` - The dequantized residual value
    #[inline]
    pub fn update(&mut self, sample: i32, residual: i32) {
        let delta = residual >> 4;
        for i in 0..LMS_LEN {
            self.weights[i] += if self.history[i] < 0 { -delta } else { delta };
        }

        self.history.copy_within(1.., 0);
        self.history[LMS_LEN - 1] = sample;
    }
}
