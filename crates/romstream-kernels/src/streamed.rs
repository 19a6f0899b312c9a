//! Fully-connected layer with weights streamed through fast scratch.
//!
//! Weight rows live in slow storage. For every row, each whole `CHUNK` of
//! weights is block-copied into a fast scratch region borrowed by the layer
//! and the MAC loop runs against the copy with 32-bit packed loads; the tail of
//! the row (`IN % CHUNK` bytes) is read in place.
//!
//! ```text
//! row o:  [ chunk 0 | chunk 1 | ... | tail ]
//!              │         │
//!         copy ▼    copy ▼
//!         scratch   scratch  ── MAC against input[offset..offset + CHUNK]
//! ```
//!
//! On the target the scratch region is an `.iwram` static:
//!
//! ```ignore
//! #[link_section = ".iwram"]
//! static mut WEIGHT_CHUNK: ScratchRegion<Fast, 64> = ScratchRegion::new();
//!
//! let scratch = unsafe { &mut *(&raw mut WEIGHT_CHUNK) };
//! let mut layer = StreamedFullyConnected::<_, 256, 10, 64>::new(fc, BiosFastSet, scratch);
//! ```
//!
//! Accumulation order and arithmetic match [`FullyConnected`] exactly, so
//! outputs are bit-identical to the in-place kernel in every mode.

use crate::fully_connected::{dot, FullyConnected, QuantMode};
use crate::fixed_point::saturate_i32;
use romstream_driver::{windows, BlockCopy, Fast, ScratchRegion, BLOCK_BYTES};
use tracing::debug;

/// Dot product of packed weight words against `4 * words.len()` inputs.
fn mac_packed(words: &[u32], input: &[i8], weight_zp: i32, input_zp: i32) -> i64 {
    words
        .iter()
        .zip(input.chunks_exact(4))
        .map(|(word, x)| {
            word.to_ne_bytes()
                .iter()
                .zip(x)
                .map(|(&w, &x)| {
                    let w = i32::from(i8::from_ne_bytes([w]));
                    i64::from((w - weight_zp) * (i32::from(x) - input_zp))
                })
                .sum::<i64>()
        })
        .sum()
}

/// A [`FullyConnected`] layer whose inner loop reads weights from a
/// `CHUNK`-byte fast scratch region filled by a [`BlockCopy`] engine.
#[derive(Debug)]
pub struct StreamedFullyConnected<
    'w,
    's,
    B,
    const IN: usize,
    const OUT: usize,
    const CHUNK: usize,
> {
    layer: FullyConnected<'w, IN, OUT>,
    copier: B,
    scratch: &'s mut ScratchRegion<Fast, CHUNK>,
}

impl<'w, 's, B: BlockCopy, const IN: usize, const OUT: usize, const CHUNK: usize>
    StreamedFullyConnected<'w, 's, B, IN, OUT, CHUNK>
{
    const CHUNK_SHAPE: () = assert!(
        CHUNK.is_power_of_two() && CHUNK % BLOCK_BYTES == 0,
        "chunk must be a power of two and a whole number of copy blocks"
    );

    /// Stream `layer`'s weights with `copier` through `scratch`.
    pub fn new(
        layer: FullyConnected<'w, IN, OUT>,
        copier: B,
        scratch: &'s mut ScratchRegion<Fast, CHUNK>,
    ) -> Self {
        let () = Self::CHUNK_SHAPE;
        debug!(inputs = IN, outputs = OUT, chunk = CHUNK, "streamed layer ready");
        Self {
            layer,
            copier,
            scratch,
        }
    }

    /// The wrapped layer.
    pub fn layer(&self) -> &FullyConnected<'w, IN, OUT> {
        &self.layer
    }

    /// The block-copy engine.
    pub fn copier(&self) -> &B {
        &self.copier
    }

    fn row_dot(&mut self, row: &[i8; IN], input: &[i8; IN], weight_zp: i32, input_zp: i32) -> i64 {
        let mut chunks = windows::<CHUNK>(row, 0);
        let mut acc = 0i64;
        for (offset, chunk) in chunks.by_ref() {
            self.copier.copy(chunk, self.scratch);
            acc += mac_packed(
                self.scratch.words(),
                &input[offset..offset + CHUNK],
                weight_zp,
                input_zp,
            );
        }
        let (offset, tail) = chunks.remainder();
        acc + dot(tail, &input[offset..], weight_zp, input_zp)
    }

    /// Streamed [`FullyConnected::forward_wide`].
    pub fn forward_wide(&mut self, input: &[i8; IN], output: &mut [i32; OUT]) {
        let weights = self.layer.weights();
        let bias = self.layer.bias();
        for ((row, &b), out) in weights.iter().zip(bias).zip(output) {
            *out = saturate_i32(i64::from(b) + self.row_dot(row, input, 0, 0));
        }
    }

    /// Streamed [`FullyConnected::forward`].
    pub fn forward(&mut self, input: &[i8; IN], output: &mut [i8; OUT], mode: QuantMode) {
        let (input_zp, weight_zp) = mode.zero_points();
        let weights = self.layer.weights();
        let bias = self.layer.bias();
        for ((row, &b), out) in weights.iter().zip(bias).zip(output) {
            let acc = i64::from(b) + self.row_dot(row, input, weight_zp, input_zp);
            *out = mode.finalize(acc);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fully_connected::QuantParams;
    use romstream_driver::SoftwareBlockCopy;

    #[test]
    fn packed_mac_matches_bytewise_dot() {
        let weights: [i8; 8] = [1, -2, 3, -4, 127, -128, 0, 9];
        let input: [i8; 8] = [-1, 2, -3, 4, 1, 1, 50, -9];
        let mut region = ScratchRegion::<Fast, 8>::new();
        region.as_array_mut().copy_from_slice(&weights);
        assert_eq!(mac_packed(region.words(), &input, 3, -2), dot(&weights, &input, 3, -2));
    }

    #[test]
    fn copies_every_whole_chunk_and_skips_the_tail() {
        let weights = [[1i8; 80]; 3];
        let bias = [0i32; 3];
        let layer = FullyConnected::new(&weights, &bias);
        let mut scratch = ScratchRegion::new();
        let mut streamed =
            StreamedFullyConnected::<_, 80, 3, 32>::new(layer, SoftwareBlockCopy::new(), &mut scratch);
        let mut out = [0i8; 3];
        streamed.forward(&[1; 80], &mut out, QuantMode::Saturate);
        assert_eq!(out, [80; 3]);
        assert_eq!(streamed.copier().copies(), 6);
        assert_eq!(streamed.copier().bytes(), 6 * 32);
    }

    #[test]
    fn weights_pass_through_the_callers_region() {
        let weights: [[i8; 64]; 2] = std::array::from_fn(|o| std::array::from_fn(|i| (o * 64 + i) as i8));
        let bias = [0i32; 2];
        let mut scratch = ScratchRegion::<Fast, 32>::new();
        let mut streamed = StreamedFullyConnected::<_, 64, 2, 32>::new(
            FullyConnected::new(&weights, &bias),
            SoftwareBlockCopy::new(),
            &mut scratch,
        );
        let mut out = [0i32; 2];
        streamed.forward_wide(&[0; 64], &mut out);
        drop(streamed);
        assert_eq!(scratch.as_array()[..], weights[1][32..]);
    }

    #[test]
    fn affine_streamed_matches_in_place() {
        let weights: [[i8; 96]; 4] =
            std::array::from_fn(|o| std::array::from_fn(|i| ((o * 31 + i * 7) % 255) as u8 as i8));
        let bias = [5, -7, 1000, -1000];
        let input: [i8; 96] = std::array::from_fn(|i| (i as i8).wrapping_mul(3));
        let layer = FullyConnected::new(&weights, &bias);
        let mode = QuantMode::Affine(QuantParams::new(3, 6).with_zero_points(-4, 2));
        let mut expected = [0i8; 4];
        layer.forward(&input, &mut expected, mode);
        let mut scratch = ScratchRegion::new();
        let mut streamed =
            StreamedFullyConnected::<_, 96, 4, 64>::new(layer, SoftwareBlockCopy::new(), &mut scratch);
        let mut got = [0i8; 4];
        streamed.forward(&input, &mut got, mode);
        assert_eq!(got, expected);
    }
}
