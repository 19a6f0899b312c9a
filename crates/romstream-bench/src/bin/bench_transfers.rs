// SPDX-License-Identifier: AGPL-3.0-only

//! Transfer-strategy benchmark: stream the 32 KiB payload through every
//! registered strategy on the software platform and rank them by cycles.
//!
//! Host cycle counts come from the wall clock scaled to the 16.78 MHz CPU
//! clock, so the ranking reflects the simulated engines, not the target bus.
//! Every strategy must still reproduce the oracle checksum.
//!
//! Usage:
//!   cargo run --bin bench_transfers
//!   cargo run --bin bench_transfers -- --passes 10 --latency 8
//!   cargo run --bin bench_transfers -- --latency 16 --seed 42   # random latency

use anyhow::Result;
use romstream_bench::{
    BenchConfig, FastScratch, MediumScratch, ScratchSet, Selector, DEFAULT_PASSES, PAYLOAD,
    PAYLOAD_LEN,
};
use romstream_driver::{Latency, SimulatedPlatform};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

const DEFAULT_LATENCY_POLLS: u32 = 4;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let passes = parse_arg(&args, "--passes", DEFAULT_PASSES);
    let polls = parse_arg(&args, "--latency", DEFAULT_LATENCY_POLLS);
    let latency = match find_arg::<u64>(&args, "--seed") {
        Some(seed) => Latency::Random {
            seed,
            max_polls: polls,
        },
        None => Latency::Fixed(polls),
    };

    println!("Transfer strategy benchmark");
    println!("===========================");
    println!("Payload       : {} bytes", PAYLOAD_LEN);
    println!("Passes        : {passes}");
    println!("Latency       : {latency:?}");
    println!();

    let config = BenchConfig::default()
        .with_passes(passes)
        .with_latency(latency);
    let mut platform = SimulatedPlatform::simulated(config.latency);
    let (mut fast, mut medium) = (FastScratch::new(), MediumScratch::new());
    let mut scratch = ScratchSet::new(&mut fast, &mut medium);
    let report = Selector::new(config)?.run(&mut platform, &mut scratch, &PAYLOAD)?;

    println!("{report}");
    println!();
    println!(
        "Channel stats : primary {:?}, secondary {:?}",
        platform.engines.primary.stats(),
        platform.engines.secondary.stats()
    );

    report.verify()?;
    Ok(())
}

fn parse_arg<T: FromStr>(args: &[String], flag: &str, default: T) -> T {
    find_arg(args, flag).unwrap_or(default)
}

fn find_arg<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}
