//! Synchronous block-copy accelerator.
//!
//! On the target this is the BIOS `CpuFastSet` call, which moves 32-byte
//! bursts with `LDMIA/STMIA` and returns when done. [`SoftwareBlockCopy`]
//! is the portable stand-in.

use crate::channel::Prefetch;
use crate::region::{ScratchRegion, Tier};
use romstream_chip::bios::FAST_SET_BLOCK_BYTES;

/// Granularity of a block copy in bytes.
pub const BLOCK_BYTES: usize = FAST_SET_BLOCK_BYTES;

struct WholeBlocks<const N: usize>;

impl<const N: usize> WholeBlocks<N> {
    const CHECK: () = assert!(
        N > 0 && N % BLOCK_BYTES == 0,
        "block copies move whole 32-byte blocks"
    );
}

/// A synchronous block-copy engine.
pub trait BlockCopy {
    /// Copy `src` into `dst`.
    ///
    /// Callers guarantee `src.len() == dst.len()`, a non-zero multiple of
    /// [`BLOCK_BYTES`], and a word-aligned `dst`; go through
    /// [`copy`](Self::copy) to have that checked at compile time.
    fn copy_blocks(&mut self, src: &[i8], dst: &mut [i8]);

    /// Copy `src` into `dst`, returning when the data has landed.
    fn copy<T: Tier, const N: usize>(&mut self, src: &[i8; N], dst: &mut ScratchRegion<T, N>)
    where
        Self: Sized,
    {
        let () = WholeBlocks::<N>::CHECK;
        self.copy_blocks(src, dst.as_array_mut());
    }
}

/// Portable block copy with transfer statistics.
#[derive(Debug, Default, Clone)]
pub struct SoftwareBlockCopy {
    copies: u64,
    bytes: u64,
}

impl SoftwareBlockCopy {
    /// Create a new software block copier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of copies performed.
    pub fn copies(&self) -> u64 {
        self.copies
    }

    /// Bytes moved.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

impl BlockCopy for SoftwareBlockCopy {
    fn copy_blocks(&mut self, src: &[i8], dst: &mut [i8]) {
        dst.copy_from_slice(src);
        self.copies += 1;
        self.bytes += src.len() as u64;
    }
}

/// BIOS `CpuFastSet` block copy.
#[cfg(target_arch = "arm")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BiosFastSet;

#[cfg(target_arch = "arm")]
impl BlockCopy for BiosFastSet {
    fn copy_blocks(&mut self, src: &[i8], dst: &mut [i8]) {
        // CpuFastSet silently rounds misaligned sources down; a payload
        // slice at an odd offset falls back to a plain copy.
        let Some(control) = romstream_chip::bios::fast_copy_control(src.len()) else {
            dst.copy_from_slice(src);
            return;
        };
        if src.as_ptr() as usize % 4 != 0 || dst.as_ptr() as usize % 4 != 0 {
            dst.copy_from_slice(src);
            return;
        }
        // SAFETY: both slices are `src.len()` bytes, word aligned, and a
        // whole number of bursts; `control` has the fill bit clear so the
        // BIOS reads exactly `src` and writes exactly `dst`. The call uses
        // the supervisor stack and preserves everything but r0-r3 and lr.
        unsafe {
            #[cfg(target_feature = "thumb-mode")]
            core::arch::asm!(
                "swi {n}",
                n = const romstream_chip::bios::SWI_CPU_FAST_SET,
                in("r0") src.as_ptr(),
                in("r1") dst.as_mut_ptr(),
                in("r2") control,
                clobber_abi("C"),
            );
            #[cfg(not(target_feature = "thumb-mode"))]
            core::arch::asm!(
                "swi {n}",
                n = const (romstream_chip::bios::SWI_CPU_FAST_SET as u32) << 16,
                in("r0") src.as_ptr(),
                in("r1") dst.as_mut_ptr(),
                in("r2") control,
                clobber_abi("C"),
            );
        }
    }
}

/// Adapts a block copier to [`Prefetch`]: the copy completes before `work`
/// runs, so a pipeline fills its next buffer ahead of compute.
#[derive(Debug)]
pub struct FillAhead<'a, B>(pub &'a mut B);

impl<B: BlockCopy> Prefetch for FillAhead<'_, B> {
    fn prefetch<T: Tier, const N: usize, R>(
        &mut self,
        src: &[i8; N],
        dst: &mut ScratchRegion<T, N>,
        work: impl FnOnce() -> R,
    ) -> R {
        self.0.copy(src, dst);
        work()
    }
}
