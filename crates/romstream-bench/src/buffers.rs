//! Scratch buffers the strategies stream through.
//!
//! | Set             | Field        | Tier   | Size     | Used by                                 |
//! |-----------------|--------------|--------|----------|-----------------------------------------|
//! | [`FastScratch`] | `pair_32`    | Fast   | 2 × 32   | block copy, single/dual channel, relays |
//! |                 | `pair_128`   | Fast   | 2 × 128  | block-copy ping-pong                    |
//! |                 | `pair_512`   | Fast   | 2 × 512  | large chunk, staged relay               |
//! | [`MediumScratch`] | `stage_32` | Medium | 32       | relays                                  |
//! |                 | `stage_512`  | Medium | 512      | staged relay                            |
//!
//! Each set holds buffers of one tier only, so on the target each is its own
//! static in that tier's section (see `target_scratch`). A
//! [`ScratchSet`] borrows one of each; hosts build it from locals.

use romstream_driver::{Fast, Medium, ScratchRegion, Tier};

/// Two regions of the same tier and size, swapped by double buffering.
#[derive(Debug)]
pub struct BufferPair<T: Tier, const N: usize> {
    a: ScratchRegion<T, N>,
    b: ScratchRegion<T, N>,
}

impl<T: Tier, const N: usize> BufferPair<T, N> {
    /// Two zeroed regions.
    pub const fn new() -> Self {
        Self {
            a: ScratchRegion::new(),
            b: ScratchRegion::new(),
        }
    }

    /// Both regions, mutably.
    pub fn split(&mut self) -> (&mut ScratchRegion<T, N>, &mut ScratchRegion<T, N>) {
        (&mut self.a, &mut self.b)
    }

    fn fill(&mut self, value: i8) {
        self.a.fill(value);
        self.b.fill(value);
    }
}

impl<T: Tier, const N: usize> Default for BufferPair<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fast-tier buffers. Place in `.iwram` on the target.
#[derive(Debug, Default)]
pub struct FastScratch {
    /// 32-byte pair
    pub pair_32: BufferPair<Fast, 32>,
    /// 128-byte pair
    pub pair_128: BufferPair<Fast, 128>,
    /// 512-byte pair
    pub pair_512: BufferPair<Fast, 512>,
}

impl FastScratch {
    /// All buffers zeroed. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            pair_32: BufferPair::new(),
            pair_128: BufferPair::new(),
            pair_512: BufferPair::new(),
        }
    }
}

/// Medium-tier relay stages. Place in `.ewram` on the target.
#[derive(Debug, Default)]
pub struct MediumScratch {
    /// 32-byte stage
    pub stage_32: ScratchRegion<Medium, 32>,
    /// 512-byte stage
    pub stage_512: ScratchRegion<Medium, 512>,
}

impl MediumScratch {
    /// All buffers zeroed. Usable in `static` initializers.
    pub const fn new() -> Self {
        Self {
            stage_32: ScratchRegion::new(),
            stage_512: ScratchRegion::new(),
        }
    }
}

/// Every buffer any strategy needs, borrowed per tier.
#[derive(Debug)]
pub struct ScratchSet<'s> {
    /// Fast-tier buffers
    pub fast: &'s mut FastScratch,
    /// Medium-tier stages
    pub medium: &'s mut MediumScratch,
}

impl<'s> ScratchSet<'s> {
    /// Borrow one set of each tier.
    pub fn new(fast: &'s mut FastScratch, medium: &'s mut MediumScratch) -> Self {
        Self { fast, medium }
    }

    /// Overwrite every buffer with `value`.
    pub fn poison(&mut self, value: i8) {
        self.fast.pair_32.fill(value);
        self.fast.pair_128.fill(value);
        self.fast.pair_512.fill(value);
        self.medium.stage_32.fill(value);
        self.medium.stage_512.fill(value);
    }
}

/// Borrow the target's statically placed scratch: [`FastScratch`] in
/// `.iwram`, [`MediumScratch`] in `.ewram`.
///
/// # Safety
///
/// Call at most once; the returned set must be the only access to these
/// statics.
#[cfg(target_arch = "arm")]
#[allow(unsafe_code)]
pub unsafe fn target_scratch() -> ScratchSet<'static> {
    #[link_section = ".iwram"]
    static mut FAST: FastScratch = FastScratch::new();
    #[link_section = ".ewram"]
    static mut MEDIUM: MediumScratch = MediumScratch::new();

    const _: () = assert!(same_section(Fast::LINK_SECTION, ".iwram"));
    const _: () = assert!(same_section(Medium::LINK_SECTION, ".ewram"));

    // SAFETY: forwarded from the caller; nothing else names the statics.
    let (fast, medium) = unsafe { (&mut *(&raw mut FAST), &mut *(&raw mut MEDIUM)) };
    ScratchSet::new(fast, medium)
}

#[cfg(target_arch = "arm")]
const fn same_section(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
