//! Quantized fully-connected layer.
//!
//! One output per weight row:
//!
//! ```text
//! acc[o] = bias[o] + Σ_i (w[o][i] - w_zp) · (x[i] - x_zp)      (64-bit)
//! out[o] = finalize(acc[o])
//! ```
//!
//! [`QuantMode::Saturate`] has both zero points at 0 and finalizes with a
//! plain clamp; [`QuantMode::Affine`] applies the layer's zero points and
//! [`requantize`]. [`FullyConnected::forward_wide`] keeps the accumulator
//! at 32 bits instead of narrowing to 8.

use crate::fixed_point::{requantize, saturate_i32, saturate_i8};

/// Per-layer affine quantization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuantParams {
    /// Integer rescale multiplier
    pub multiplier: i32,
    /// Right shift after the multiply; negative shifts left
    pub shift: i32,
    /// Zero point of the input activations
    pub input_zero_point: i8,
    /// Zero point of the weights
    pub weight_zero_point: i8,
}

impl QuantParams {
    /// Rescale with zero points at 0.
    pub const fn new(multiplier: i32, shift: i32) -> Self {
        Self {
            multiplier,
            shift,
            input_zero_point: 0,
            weight_zero_point: 0,
        }
    }

    /// Same rescale with the given zero points.
    #[must_use]
    pub const fn with_zero_points(mut self, input: i8, weight: i8) -> Self {
        self.input_zero_point = input;
        self.weight_zero_point = weight;
        self
    }
}

/// How an accumulator becomes an 8-bit output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantMode {
    /// No zero points, no rescale; clamp to `[-128, 127]`.
    Saturate,
    /// Zero-point corrected accumulation, then [`requantize`].
    Affine(QuantParams),
}

impl QuantMode {
    /// `(input, weight)` zero points as accumulator terms.
    pub(crate) fn zero_points(self) -> (i32, i32) {
        match self {
            Self::Saturate => (0, 0),
            Self::Affine(p) => (i32::from(p.input_zero_point), i32::from(p.weight_zero_point)),
        }
    }

    /// Narrow an accumulator to the output type.
    pub(crate) fn finalize(self, acc: i64) -> i8 {
        match self {
            Self::Saturate => saturate_i8(acc),
            Self::Affine(p) => requantize(acc, p.multiplier, p.shift),
        }
    }
}

/// Zero-point corrected dot product of equal-length slices.
pub(crate) fn dot(weights: &[i8], input: &[i8], weight_zp: i32, input_zp: i32) -> i64 {
    weights
        .iter()
        .zip(input)
        .map(|(&w, &x)| i64::from((i32::from(w) - weight_zp) * (i32::from(x) - input_zp)))
        .sum()
}

/// A fully-connected layer over borrowed, immutable parameters.
///
/// `weights` is row-major: row `o` feeds output `o`. On the target the
/// parameters are ROM statics; nothing here copies them.
#[derive(Debug, Clone, Copy)]
pub struct FullyConnected<'w, const IN: usize, const OUT: usize> {
    weights: &'w [[i8; IN]; OUT],
    bias: &'w [i32; OUT],
}

impl<'w, const IN: usize, const OUT: usize> FullyConnected<'w, IN, OUT> {
    const SHAPE: () = assert!(IN > 0 && OUT > 0, "layer dimensions must be non-zero");

    /// Layer over `weights` and `bias`.
    pub const fn new(weights: &'w [[i8; IN]; OUT], bias: &'w [i32; OUT]) -> Self {
        let () = Self::SHAPE;
        Self { weights, bias }
    }

    /// Weight rows.
    pub const fn weights(&self) -> &'w [[i8; IN]; OUT] {
        self.weights
    }

    /// Bias vector.
    pub const fn bias(&self) -> &'w [i32; OUT] {
        self.bias
    }

    /// Plain integer matrix-vector product plus bias, saturated to `i32`.
    pub fn forward_wide(&self, input: &[i8; IN], output: &mut [i32; OUT]) {
        for ((row, &bias), out) in self.weights.iter().zip(self.bias).zip(output) {
            *out = saturate_i32(i64::from(bias) + dot(row, input, 0, 0));
        }
    }

    /// Quantized forward pass with per-layer `mode`.
    pub fn forward(&self, input: &[i8; IN], output: &mut [i8; OUT], mode: QuantMode) {
        let (input_zp, weight_zp) = mode.zero_points();
        for ((row, &bias), out) in self.weights.iter().zip(self.bias).zip(output) {
            let acc = i64::from(bias) + dot(row, input, weight_zp, input_zp);
            *out = mode.finalize(acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: [[i8; 3]; 2] = [[1, 2, 3], [-4, 5, -6]];
    const B: [i32; 2] = [10, -10];

    #[test]
    fn wide_output_is_dot_plus_bias() {
        let layer = FullyConnected::new(&W, &B);
        let mut out = [0i32; 2];
        layer.forward_wide(&[1, 1, 1], &mut out);
        assert_eq!(out, [16, -15]);
    }

    #[test]
    fn saturate_mode_clamps_wide_result() {
        let layer = FullyConnected::new(&W, &B);
        let mut out = [0i8; 2];
        layer.forward(&[100, 100, 100], &mut out, QuantMode::Saturate);
        assert_eq!(out, [127, -128]);
        layer.forward(&[1, 1, 1], &mut out, QuantMode::Saturate);
        assert_eq!(out, [16, -15]);
    }

    #[test]
    fn affine_mode_subtracts_zero_points_then_rescales() {
        let weights = [[3i8, 3]];
        let bias = [0i32];
        let layer = FullyConnected::new(&weights, &bias);
        let params = QuantParams::new(1, 1).with_zero_points(2, 1);
        let mut out = [0i8; 1];
        // (3-1)*(5-2) * 2 = 12, >> 1 with rounding = 6
        layer.forward(&[5, 5], &mut out, QuantMode::Affine(params));
        assert_eq!(out, [6]);
    }

    #[test]
    fn wide_output_saturates_at_i32() {
        let weights = [[127i8; 1]];
        let bias = [i32::MAX];
        let layer = FullyConnected::new(&weights, &bias);
        let mut out = [0i32; 1];
        layer.forward_wide(&[127], &mut out);
        assert_eq!(out, [i32::MAX]);
    }
}
