#![deny(unsafe_code)]

//! 8-bit quantized neural-network kernels
//!
//! This crate provides the integer kernels of a quantized inference engine
//! for a memory-constrained target: fully-connected layers over `i8`
//! activations and weights with `i32` bias, per-layer fixed-point
//! requantization, and a variant that streams weights through fast scratch
//! memory.
//!
//! # Kernels
//!
//! | Entry point | Output | Notes |
//! |-------------|--------|-------|
//! | [`FullyConnected::forward_wide`] | `[i32; OUT]` | plain dot product + bias |
//! | [`FullyConnected::forward`] | `[i8; OUT]` | [`QuantMode::Saturate`] or [`QuantMode::Affine`] |
//! | [`StreamedFullyConnected::forward`] | `[i8; OUT]` | bit-identical, weights via [`BlockCopy`](romstream_driver::BlockCopy) |
//! | [`relu_i8`] | `[i8; N]` | |
//!
//! # Example
//!
//! ```
//! use romstream_kernels::{FullyConnected, QuantMode, QuantParams};
//!
//! static WEIGHTS: [[i8; 4]; 2] = [[1, 2, 3, 4], [-1, -2, -3, -4]];
//! static BIAS: [i32; 2] = [0, 10];
//!
//! let layer = FullyConnected::new(&WEIGHTS, &BIAS);
//! let mut out = [0i8; 2];
//! layer.forward(&[10, 10, 10, 10], &mut out, QuantMode::Affine(QuantParams::new(1, 1)));
//! assert_eq!(out, [50, -45]);
//! ```
//!
//! Layer shapes are const generics: a zero-sized layer or a mismatched
//! buffer is rejected at compile time.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

mod activation;
pub mod fixed_point;
mod fully_connected;
mod streamed;

pub use activation::{relu_i8, relu_i8_in_place};
pub use fixed_point::{requantize, saturate_i32, saturate_i8};
pub use fully_connected::{FullyConnected, QuantMode, QuantParams};
pub use streamed::StreamedFullyConnected;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{FullyConnected, QuantMode, QuantParams, StreamedFullyConnected};
}
