//! Platform model for a three-tier memory handheld target (ARM7TDMI, 16.78 MHz).
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the platform: memory map and tier properties, the DMA and
//! timer register blocks, the BIOS block-copy call, and which DMA channel may
//! move data between which tiers.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`memory`] | Tier map (ROM slow, EWRAM medium, IWRAM fast), sizes, bus widths, wait states, link sections |
//! | [`regs`] | I/O register map with DMA and timer control bit definitions |
//! | [`dma`] | The four DMA channels, register blocks, length limits and route matrix |
//! | [`timer`] | The four 16-bit timers, prescalers, cascade pairs |
//! | [`bios`] | BIOS software-interrupt numbers and `CpuFastSet` control word |
//! | [`clock`] | CPU clock rate and cycle conversions |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bios;
pub mod clock;
pub mod dma;
pub mod memory;
pub mod regs;
pub mod timer;

pub use memory::MemoryTier;
