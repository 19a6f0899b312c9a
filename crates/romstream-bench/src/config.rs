//! Benchmark run configuration.

use crate::error::{BenchError, Result};
use crate::strategy::StrategyKind;
use romstream_driver::Latency;

/// Passes over the payload per strategy.
pub const DEFAULT_PASSES: u32 = 5;

/// What a benchmark run measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Passes over the payload per strategy
    pub passes: u32,
    /// Strategies to run, in registration order
    pub strategies: Vec<StrategyKind>,
    /// Channel latency of a simulated platform
    pub latency: Latency,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            strategies: StrategyKind::ALL.to_vec(),
            latency: Latency::default(),
        }
    }
}

impl BenchConfig {
    /// Set the number of passes.
    #[must_use]
    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes;
        self
    }

    /// Register exactly these strategies, in this order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = StrategyKind>) -> Self {
        self.strategies = strategies.into_iter().collect();
        self
    }

    /// Set the simulated channel latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BenchError::InvalidConfig`] for zero passes, an empty
    /// strategy list or a strategy registered twice.
    pub fn validate(&self) -> Result<()> {
        if self.passes == 0 {
            return Err(BenchError::invalid_config("passes must be at least 1"));
        }
        if self.strategies.is_empty() {
            return Err(BenchError::invalid_config("no strategies registered"));
        }
        for (i, kind) in self.strategies.iter().enumerate() {
            if self.strategies[..i].contains(kind) {
                return Err(BenchError::invalid_config(format!(
                    "strategy '{kind}' registered twice"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_runs_everything_five_times() {
        let config = BenchConfig::default();
        assert_eq!(config.passes, 5);
        assert_eq!(config.strategies, StrategyKind::ALL);
        config.validate().unwrap();
    }

    #[test]
    fn zero_passes_rejected() {
        let err = BenchConfig::default().with_passes(0).validate().unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig { .. }));
    }

    #[test]
    fn empty_list_rejected() {
        let err = BenchConfig::default()
            .with_strategies([])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("no strategies"));
    }

    #[test]
    fn duplicates_rejected() {
        let err = BenchConfig::default()
            .with_strategies([
                StrategyKind::Relay,
                StrategyKind::DualChannel,
                StrategyKind::Relay,
            ])
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("relay via medium 32B"));
    }

    #[test]
    fn builder_sets_latency() {
        let config = BenchConfig::default().with_latency(Latency::Immediate);
        assert_eq!(config.latency, Latency::Immediate);
    }
}
