//! Strategy and selector behaviour on the software platform.

use proptest::prelude::*;
use romstream_bench::{
    BenchConfig, BenchError, BenchReport, Checksum, FastScratch, MediumScratch, Outcome, Payload,
    ScratchSet, Selector, StrategyKind, PAYLOAD,
};
use romstream_driver::chip::Channel;
use romstream_driver::{
    BlockCopy, Capabilities, ChannelRole, CycleCounter, Engines, Latency, MemoryTier, Mover,
    Platform, SimulatedChannel, SimulatedPlatform, SoftwareBlockCopy, TransferChannel,
    TransferFlags,
};
use std::collections::VecDeque;

const PRIMARY: Mover = Mover::Channel(ChannelRole::Primary);

/// Counter that reports a scripted sequence of cycle counts.
struct Scripted(VecDeque<u64>);

impl CycleCounter for Scripted {
    fn restart(&mut self) {}

    fn elapsed(&self) -> u64 {
        self.0.front().copied().unwrap_or(0)
    }

    fn stop(&mut self) -> u64 {
        self.0.pop_front().unwrap_or(0)
    }

    fn clock_hz(&self) -> u32 {
        16_777_216
    }
}

/// Counter that keeps ticking across strategies unless restarted, and logs
/// every call.
#[derive(Default)]
struct Ledger {
    ticks: u64,
    calls: Vec<&'static str>,
}

impl CycleCounter for Ledger {
    fn restart(&mut self) {
        self.ticks = 0;
        self.calls.push("restart");
    }

    fn elapsed(&self) -> u64 {
        self.ticks
    }

    fn stop(&mut self) -> u64 {
        self.ticks += 100;
        self.calls.push("stop");
        self.ticks
    }

    fn clock_hz(&self) -> u32 {
        16_777_216
    }
}

/// Run `config` on `platform` with host-local scratch.
fn run_on<C, B, K>(
    platform: &mut Platform<C, B, K>,
    config: BenchConfig,
) -> Result<BenchReport, BenchError>
where
    C: TransferChannel,
    B: BlockCopy,
    K: CycleCounter,
{
    let (mut fast, mut medium) = (FastScratch::new(), MediumScratch::new());
    let mut scratch = ScratchSet::new(&mut fast, &mut medium);
    Selector::new(config)?.run(platform, &mut scratch, &PAYLOAD)
}

fn target_engines() -> Engines<SimulatedChannel, SoftwareBlockCopy> {
    Engines {
        primary: SimulatedChannel::new(Channel::Dma3, Latency::Immediate),
        secondary: SimulatedChannel::new(Channel::Dma1, Latency::Immediate),
        block_copy: SoftwareBlockCopy::new(),
    }
}

/// Channel that reports idle without ever moving data.
struct Dropped(Channel);

impl TransferChannel for Dropped {
    fn id(&self) -> Channel {
        self.0
    }

    unsafe fn start(&mut self, _: *const u8, _: *mut u8, _: u16, _: TransferFlags) {}

    fn is_busy(&mut self) -> bool {
        false
    }
}

#[test]
fn default_run_agrees_with_oracle() {
    let mut platform = SimulatedPlatform::simulated(Latency::Fixed(3));
    let report = run_on(&mut platform, BenchConfig::default()).unwrap();

    assert_eq!(report.entries().len(), StrategyKind::ALL.len());
    assert_eq!(report.oracle(), Checksum::oracle(&PAYLOAD, 5));
    report.verify().unwrap();
    assert!(report.winner().is_some());
}

#[test]
fn entries_follow_registration_order() {
    let order = [
        StrategyKind::StagedLargeChunk,
        StrategyKind::DirectRead,
        StrategyKind::Relay,
    ];
    let mut platform = SimulatedPlatform::simulated(Latency::Immediate);
    let config = BenchConfig::default().with_passes(1).with_strategies(order);
    let report = run_on(&mut platform, config).unwrap();
    let got: Vec<_> = report.entries().iter().map(|e| e.strategy).collect();
    assert_eq!(got, order);
}

#[test]
fn selector_picks_lowest_scripted_count() {
    let counter = Scripted([300, 100, 100, 250].into());
    let mut platform = Platform::new(target_engines(), counter, Capabilities::target()).unwrap();
    let config = BenchConfig::default().with_passes(1).with_strategies([
        StrategyKind::DirectRead,
        StrategyKind::BlockCopy,
        StrategyKind::SingleChannel,
        StrategyKind::DualChannel,
    ]);

    let report = run_on(&mut platform, config).unwrap();

    let best = report.winner().unwrap();
    assert_eq!((best.strategy, best.cycles()), (StrategyKind::BlockCopy, Some(100)));
    assert_eq!(best.checksum(), Some(report.oracle()));
    assert_eq!(report.entries()[3].cycles(), Some(250));
}

#[test]
fn counter_restarts_before_every_timed_run() {
    let mut platform =
        Platform::new(target_engines(), Ledger::default(), Capabilities::target()).unwrap();
    let config = BenchConfig::default().with_passes(1);

    let report = run_on(&mut platform, config).unwrap();

    let n = StrategyKind::ALL.len();
    assert_eq!(platform.counter.calls.len(), 2 * n);
    for pair in platform.counter.calls.chunks(2) {
        assert_eq!(pair, ["restart", "stop"]);
    }
    for entry in report.entries() {
        assert_eq!(entry.cycles(), Some(100), "{}", entry.strategy);
    }
}

#[test]
fn skipped_strategies_are_not_timed() {
    let caps = Capabilities::with_channels(Channel::Dma3, Channel::Dma0);
    let engines = Engines {
        primary: SimulatedChannel::new(Channel::Dma3, Latency::Immediate),
        secondary: SimulatedChannel::new(Channel::Dma0, Latency::Immediate),
        block_copy: SoftwareBlockCopy::new(),
    };
    let mut platform = Platform::new(engines, Ledger::default(), caps).unwrap();
    let config = BenchConfig::default()
        .with_passes(1)
        .with_strategies([StrategyKind::DualChannel, StrategyKind::SingleChannel]);

    run_on(&mut platform, config).unwrap();

    assert_eq!(platform.counter.calls, ["restart", "stop"]);
}

#[test]
fn unsupported_routes_are_skipped() {
    let caps = Capabilities::with_channels(Channel::Dma3, Channel::Dma0);
    let mut platform = SimulatedPlatform::simulated_with(caps, Latency::Fixed(1));
    let config = BenchConfig::default().with_passes(1);
    let report = run_on(&mut platform, config).unwrap();

    for entry in report.entries() {
        let needs_secondary_from_rom = matches!(
            entry.strategy,
            StrategyKind::DualChannel
                | StrategyKind::LargeChunk
                | StrategyKind::DualChannelRelay
                | StrategyKind::StagedLargeChunk
        );
        assert_eq!(
            matches!(entry.outcome, Outcome::Skipped(_)),
            needs_secondary_from_rom,
            "{}",
            entry.strategy
        );
    }
    report.verify().unwrap();
}

#[test]
fn nothing_runnable_is_an_error() {
    let caps = Capabilities::target().without_route(PRIMARY, MemoryTier::Slow, MemoryTier::Fast);
    let mut platform = SimulatedPlatform::simulated_with(caps, Latency::Immediate);
    let config = BenchConfig::default().with_strategies([StrategyKind::SingleChannel]);
    let err = run_on(&mut platform, config).unwrap_err();
    assert!(matches!(err, BenchError::NoRunnableStrategy { skipped: 1 }));
}

#[test]
fn lost_transfers_fail_verification() {
    let engines = Engines {
        primary: Dropped(Channel::Dma3),
        secondary: Dropped(Channel::Dma1),
        block_copy: SoftwareBlockCopy::new(),
    };
    let counter = Scripted(VecDeque::new());
    let mut platform = Platform::new(engines, counter, Capabilities::target()).unwrap();
    let config = BenchConfig::default()
        .with_passes(1)
        .with_strategies([StrategyKind::BlockCopy, StrategyKind::SingleChannel]);

    let report = run_on(&mut platform, config).unwrap();

    let err = report.verify().unwrap_err();
    assert!(matches!(
        err,
        BenchError::ChecksumMismatch {
            strategy: StrategyKind::SingleChannel,
            ..
        }
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Randomised latencies and payloads: a buffer read before its transfer
    /// landed would fold poison and miss the oracle.
    #[test]
    fn pipelines_never_read_in_flight_buffers(
        payload_seed in any::<u64>(),
        latency_seed in any::<u64>(),
        max_polls in 0u32..24,
    ) {
        let payload = Payload::generate(payload_seed);
        let oracle = Checksum::oracle(&payload, 2);
        let latency = Latency::Random { seed: latency_seed, max_polls };
        let mut platform = SimulatedPlatform::simulated(latency);
        let (mut fast, mut medium) = (FastScratch::new(), MediumScratch::new());
        let mut scratch = ScratchSet::new(&mut fast, &mut medium);

        for kind in StrategyKind::ALL {
            let sum = kind.run(&mut platform.engines, &mut scratch, &payload, 2);
            prop_assert_eq!(sum, oracle, "{}", kind);
        }
    }
}
