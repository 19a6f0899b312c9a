//! Run the registered strategies and rank them.
//!
//! ```text
//! for each strategy (registration order):
//!     routes unsupported?  -> Skipped, next
//!     poison scratch
//!     counter.restart()
//!     checksum = strategy.run(..)      <- timed
//!     cycles   = counter.stop()
//!     record (cycles, checksum, checksum == oracle)
//! winner = lowest cycles, first registered on ties
//! ```
//!
//! A wrong checksum does not disqualify a strategy from the ranking; it is
//! reported and [`BenchReport::verify`] fails.

use crate::buffers::ScratchSet;
use crate::checksum::Checksum;
use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::payload::Payload;
use crate::strategy::StrategyKind;
use romstream_driver::chip::clock::cycles_to_micros;
use romstream_driver::{BlockCopy, CycleCounter, Platform, StreamError, TransferChannel};
use std::fmt;
use tracing::{debug, info, warn};

/// Scratch poisoned before every strategy so stale bytes cannot pass as data.
const SCRATCH_POISON: i8 = 0x5A;

/// What happened to one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The strategy ran.
    Measured {
        /// Elapsed cycles
        cycles: u64,
        /// Checksum it produced
        checksum: Checksum,
        /// Whether it equals the oracle
        matches_oracle: bool,
    },
    /// The platform cannot make one of its hops.
    Skipped(StreamError),
}

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Strategy
    pub strategy: StrategyKind,
    /// Result
    pub outcome: Outcome,
}

impl Entry {
    /// Elapsed cycles, if the strategy ran.
    pub fn cycles(&self) -> Option<u64> {
        match self.outcome {
            Outcome::Measured { cycles, .. } => Some(cycles),
            Outcome::Skipped(_) => None,
        }
    }

    /// Checksum produced, if the strategy ran.
    pub fn checksum(&self) -> Option<Checksum> {
        match self.outcome {
            Outcome::Measured { checksum, .. } => Some(checksum),
            Outcome::Skipped(_) => None,
        }
    }
}

/// Ranked results of one selector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchReport {
    oracle: Checksum,
    passes: u32,
    clock_hz: u32,
    entries: Vec<Entry>,
}

impl BenchReport {
    /// Checksum every strategy should produce.
    pub fn oracle(&self) -> Checksum {
        self.oracle
    }

    /// Passes each strategy made over the payload.
    pub fn passes(&self) -> u32 {
        self.passes
    }

    /// Clock the cycle counts refer to.
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Rows in registration order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Row of the fastest measured strategy; the first registered wins a
    /// tie.
    pub fn winner(&self) -> Option<&Entry> {
        self.entries
            .iter()
            .filter_map(|e| e.cycles().map(|c| (e, c)))
            .reduce(|best, next| if next.1 < best.1 { next } else { best })
            .map(|(e, _)| e)
    }

    /// Measured strategies whose checksum differs from the oracle.
    pub fn mismatches(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| {
            matches!(
                e.outcome,
                Outcome::Measured {
                    matches_oracle: false,
                    ..
                }
            )
        })
    }

    /// Check that every measured strategy produced the oracle checksum.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::ChecksumMismatch`] for the first strategy that
    /// did not.
    pub fn verify(&self) -> Result<()> {
        match self.mismatches().next() {
            Some(Entry {
                strategy,
                outcome: Outcome::Measured { checksum, .. },
            }) => Err(BenchError::ChecksumMismatch {
                strategy: *strategy,
                actual: *checksum,
                expected: self.oracle,
            }),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  {:<26}  {:>12}  {:>10}  {:>10}  {:>6}",
            "strategy", "cycles", "µs", "checksum", "oracle"
        )?;
        writeln!(f, "  {:-<26}  {:-<12}  {:-<10}  {:-<10}  {:-<6}", "", "", "", "", "")?;
        let winner = self.winner().map(|e| e.strategy);
        for entry in &self.entries {
            let name = entry.strategy.name();
            match &entry.outcome {
                Outcome::Measured {
                    cycles,
                    checksum,
                    matches_oracle,
                } => {
                    let mark = if Some(entry.strategy) == winner { " ←" } else { "" };
                    writeln!(
                        f,
                        "  {:<26}  {:>12}  {:>10.1}  {}  {:>6}{}",
                        name,
                        cycles,
                        cycles_to_micros(*cycles, self.clock_hz),
                        checksum,
                        if *matches_oracle { "ok" } else { "FAIL" },
                        mark
                    )?;
                }
                Outcome::Skipped(reason) => {
                    writeln!(f, "  {name:<26}  skipped: {reason}")?;
                }
            }
        }
        writeln!(f)?;
        write!(f, "  oracle {} over {} pass(es)", self.oracle, self.passes)?;
        if let Some(Entry {
            strategy,
            outcome: Outcome::Measured {
                cycles, checksum, ..
            },
        }) = self.winner()
        {
            write!(f, "; fastest: {strategy} ({cycles} cycles, checksum {checksum})")?;
        }
        Ok(())
    }
}

/// Runs a configured set of strategies against a platform.
#[derive(Debug)]
pub struct Selector {
    config: BenchConfig,
}

impl Selector {
    /// Selector for a validated `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidConfig`] if `config` does not validate.
    pub fn new(config: BenchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run every registered strategy once over `payload`, streaming
    /// through `scratch`, and rank them.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::NoRunnableStrategy`] if the platform supports
    /// none of the registered strategies.
    pub fn run<C, B, K>(
        &mut self,
        platform: &mut Platform<C, B, K>,
        scratch: &mut ScratchSet<'_>,
        payload: &Payload,
    ) -> Result<BenchReport>
    where
        C: TransferChannel,
        B: BlockCopy,
        K: CycleCounter,
    {
        let passes = self.config.passes;
        let oracle = Checksum::oracle(payload, passes);
        info!(
            strategies = self.config.strategies.len(),
            passes,
            %oracle,
            "benchmark started"
        );

        let mut entries = Vec::with_capacity(self.config.strategies.len());
        for &strategy in &self.config.strategies {
            if let Err(reason) = strategy.check(&platform.capabilities) {
                warn!(%strategy, %reason, "strategy skipped");
                entries.push(Entry {
                    strategy,
                    outcome: Outcome::Skipped(reason),
                });
                continue;
            }

            scratch.poison(SCRATCH_POISON);
            platform.counter.restart();
            let checksum = strategy.run(&mut platform.engines, scratch, payload, passes);
            let cycles = platform.counter.stop();

            let matches_oracle = checksum == oracle;
            if matches_oracle {
                debug!(%strategy, cycles, "strategy measured");
            } else {
                warn!(%strategy, %checksum, %oracle, "checksum mismatch");
            }
            entries.push(Entry {
                strategy,
                outcome: Outcome::Measured {
                    cycles,
                    checksum,
                    matches_oracle,
                },
            });
        }

        let report = BenchReport {
            oracle,
            passes,
            clock_hz: platform.counter.clock_hz(),
            entries,
        };
        let Some(best) = report.winner() else {
            return Err(BenchError::NoRunnableStrategy {
                skipped: report.entries.len(),
            });
        };
        info!(strategy = %best.strategy, cycles = best.cycles(), "benchmark finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(strategy: StrategyKind, cycles: u64, ok: bool) -> Entry {
        Entry {
            strategy,
            outcome: Outcome::Measured {
                cycles,
                checksum: Checksum::new(),
                matches_oracle: ok,
            },
        }
    }

    fn report(entries: Vec<Entry>) -> BenchReport {
        BenchReport {
            oracle: Checksum::new(),
            passes: 1,
            clock_hz: 16_777_216,
            entries,
        }
    }

    #[test]
    fn lowest_cycles_wins() {
        let r = report(vec![
            measured(StrategyKind::DirectRead, 900, true),
            measured(StrategyKind::DualChannel, 300, true),
            measured(StrategyKind::LargeChunk, 400, true),
        ]);
        assert_eq!(r.winner(), Some(&r.entries()[1]));
    }

    #[test]
    fn tie_goes_to_first_registered() {
        let r = report(vec![
            measured(StrategyKind::Relay, 500, true),
            measured(StrategyKind::BlockCopy, 200, true),
            measured(StrategyKind::SingleChannel, 200, true),
        ]);
        assert_eq!(r.winner().map(|e| e.strategy), Some(StrategyKind::BlockCopy));
    }

    #[test]
    fn skipped_rows_never_win() {
        let skipped = Entry {
            strategy: StrategyKind::DualChannel,
            outcome: Outcome::Skipped(StreamError::invalid_config("test")),
        };
        let r = report(vec![skipped, measured(StrategyKind::Relay, 10, true)]);
        assert_eq!(r.winner().and_then(Entry::cycles), Some(10));
    }

    #[test]
    fn verify_reports_first_mismatch() {
        let r = report(vec![
            measured(StrategyKind::DirectRead, 1, true),
            measured(StrategyKind::Relay, 2, false),
            measured(StrategyKind::DualChannel, 3, false),
        ]);
        assert_eq!(r.mismatches().count(), 2);
        let err = r.verify().unwrap_err();
        assert!(matches!(
            err,
            BenchError::ChecksumMismatch {
                strategy: StrategyKind::Relay,
                ..
            }
        ));
    }

    #[test]
    fn mismatch_still_ranked() {
        let r = report(vec![
            measured(StrategyKind::DirectRead, 50, true),
            measured(StrategyKind::Relay, 5, false),
        ]);
        assert_eq!(r.winner().map(|e| e.strategy), Some(StrategyKind::Relay));
    }

    #[test]
    fn table_lists_every_row() {
        let r = report(vec![
            measured(StrategyKind::DirectRead, 16_777_216, true),
            measured(StrategyKind::Relay, 2, false),
        ]);
        let text = r.to_string();
        assert!(text.contains("direct read"));
        assert!(text.contains("1000000.0"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("fastest: relay via medium 32B (2 cycles, checksum 0x00000000)"));
    }

    #[test]
    fn invalid_config_rejected_up_front() {
        let err = Selector::new(BenchConfig::default().with_passes(0)).unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig { .. }));
    }
}
