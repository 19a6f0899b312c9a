//! Tier-typed scratch regions.
//!
//! A [`ScratchRegion<T, N>`] is a word-aligned `[i8; N]` whose type names the
//! memory tier its storage must live in. Sizes are const generics, so a
//! buffer of the wrong length does not type-check against a transfer or a
//! kernel expecting a different one.
//!
//! On the target, regions are statics placed with the tier's link section:
//!
//! ```ignore
//! use romstream_driver::{Fast, ScratchRegion};
//!
//! #[link_section = ".iwram"]
//! static mut CHUNK: ScratchRegion<Fast, 512> = ScratchRegion::new();
//! ```
//!
//! On the host they are plain locals.

use romstream_chip::MemoryTier;
use std::fmt;
use std::marker::PhantomData;

mod sealed {
    pub trait Sealed {}
}

/// A memory tier a scratch region can be placed in.
pub trait Tier: sealed::Sealed + 'static {
    /// The tier in the platform model.
    const KIND: MemoryTier;
    /// Linker section a static of this tier must be placed in.
    const LINK_SECTION: &'static str;
}

/// Zero-wait-state internal RAM.
#[derive(Debug)]
pub enum Fast {}

/// External RAM behind the 16-bit bus.
#[derive(Debug)]
pub enum Medium {}

impl sealed::Sealed for Fast {}
impl sealed::Sealed for Medium {}

impl Tier for Fast {
    const KIND: MemoryTier = MemoryTier::Fast;
    const LINK_SECTION: &'static str = ".iwram";
}

impl Tier for Medium {
    const KIND: MemoryTier = MemoryTier::Medium;
    const LINK_SECTION: &'static str = ".ewram";
}

/// Fixed-size, word-aligned scratch buffer in tier `T`.
#[repr(C, align(4))]
pub struct ScratchRegion<T: Tier, const N: usize> {
    bytes: [i8; N],
    tier: PhantomData<T>,
}

impl<T: Tier, const N: usize> ScratchRegion<T, N> {
    const NON_EMPTY: () = assert!(N > 0, "scratch region must not be empty");
    const WHOLE_WORDS: () = assert!(N % 4 == 0, "packed access needs a whole number of words");

    /// Zero-filled region. Usable in `static` initializers.
    pub const fn new() -> Self {
        let () = Self::NON_EMPTY;
        Self {
            bytes: [0; N],
            tier: PhantomData,
        }
    }

    /// Length in bytes.
    pub const fn len(&self) -> usize {
        N
    }

    /// Always `false`; regions are never empty.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Tier the region belongs to.
    pub const fn tier(&self) -> MemoryTier {
        T::KIND
    }

    /// Contents.
    pub const fn as_array(&self) -> &[i8; N] {
        &self.bytes
    }

    /// Mutable contents.
    pub fn as_array_mut(&mut self) -> &mut [i8; N] {
        &mut self.bytes
    }

    /// Contents as packed native-endian words, for 32-bit loads on the fast bus.
    pub fn words(&self) -> &[u32] {
        let () = Self::WHOLE_WORDS;
        bytemuck::cast_slice(&self.bytes)
    }

    /// Start address, for programming a transfer engine.
    pub const fn as_ptr(&self) -> *const i8 {
        self.bytes.as_ptr()
    }

    /// Mutable start address, for programming a transfer engine.
    pub fn as_mut_ptr(&mut self) -> *mut i8 {
        self.bytes.as_mut_ptr()
    }

    /// Overwrite every byte with `value`.
    pub fn fill(&mut self, value: i8) {
        self.bytes.fill(value);
    }
}

impl<T: Tier, const N: usize> Default for ScratchRegion<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Tier, const N: usize> fmt::Debug for ScratchRegion<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScratchRegion")
            .field("tier", &T::KIND)
            .field("len", &N)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_are_word_aligned() {
        let fast = ScratchRegion::<Fast, 36>::new();
        let medium = ScratchRegion::<Medium, 8>::new();
        assert_eq!(fast.as_ptr() as usize % 4, 0);
        assert_eq!(medium.as_ptr() as usize % 4, 0);
        assert_eq!(std::mem::align_of::<ScratchRegion<Fast, 1>>(), 4);
    }

    #[test]
    fn link_section_matches_platform_model() {
        assert_eq!(Some(Fast::LINK_SECTION), MemoryTier::Fast.link_section());
        assert_eq!(Some(Medium::LINK_SECTION), MemoryTier::Medium.link_section());
        assert_eq!(ScratchRegion::<Medium, 4>::new().tier(), MemoryTier::Medium);
    }

    #[test]
    fn words_view_covers_every_byte() {
        let mut region = ScratchRegion::<Fast, 8>::new();
        region.as_array_mut().copy_from_slice(&[1, 2, 3, 4, -1, -2, -3, -4]);
        let words = region.words();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].to_ne_bytes(), [1, 2, 3, 4]);
        assert_eq!(words[1].to_ne_bytes(), [0xFF, 0xFE, 0xFD, 0xFC]);
    }
}
