//! Fixed-size windows over a byte stream, tagged with their global offset.
//!
//! Shared by the streamed kernel (weight chunks) and the transfer
//! strategies (compute windows), so both walk data the same way:
//!
//! ```text
//! data:   [ w0 | w1 | w2 | .. | tail ]
//! yields: (base, w0) (base + W, w1) ...      remainder() = (offset, tail)
//! ```

use std::slice;

/// Iterator over the whole `W`-byte windows of a slice.
#[derive(Debug, Clone)]
pub struct Windows<'a, const W: usize> {
    chunks: slice::Iter<'a, [i8; W]>,
    next_offset: usize,
    tail_offset: usize,
    tail: &'a [i8],
}

struct NonZero<const W: usize>;

impl<const W: usize> NonZero<W> {
    const CHECK: () = assert!(W > 0, "window size must not be zero");
}

/// Windows of `W` bytes over `data`, numbering bytes from `base_offset`.
pub fn windows<const W: usize>(data: &[i8], base_offset: usize) -> Windows<'_, W> {
    let () = NonZero::<W>::CHECK;
    let (chunks, tail) = data.as_chunks::<W>();
    Windows {
        chunks: chunks.iter(),
        next_offset: base_offset,
        tail_offset: base_offset + chunks.len() * W,
        tail,
    }
}

impl<'a, const W: usize> Windows<'a, W> {
    /// Bytes after the last whole window, with their global offset.
    pub fn remainder(&self) -> (usize, &'a [i8]) {
        (self.tail_offset, self.tail)
    }
}

impl<'a, const W: usize> Iterator for Windows<'a, W> {
    type Item = (usize, &'a [i8; W]);

    fn next(&mut self) -> Option<Self::Item> {
        let window = self.chunks.next()?;
        let offset = self.next_offset;
        self.next_offset += W;
        Some((offset, window))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl<const W: usize> ExactSizeIterator for Windows<'_, W> {}
