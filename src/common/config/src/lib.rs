//! Configuration management for Quarry.
//!
//! Provides the knobs of the normalization driver: how many fixpoint
//! iterations to allow, whether to record rule traces, and whether to
//! verify name hygiene on the final tree.

use common_error::{ensure, QuarryResult};
use serde::{Deserialize, Serialize};

/// Default cap on fixpoint iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Normalization driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Maximum number of fixpoint iterations before stopping.
    pub max_iterations: usize,
    /// Record a before/after trace of every rule that changed the tree.
    pub enable_trace: bool,
    /// Check the hygiene invariant on the final tree.
    pub verify_hygiene: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            enable_trace: false,
            verify_hygiene: true,
        }
    }
}

impl NormalizerConfig {
    /// Set the iteration cap.
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Enable or disable tracing.
    #[must_use]
    pub fn with_trace(mut self, enable: bool) -> Self {
        self.enable_trace = enable;
        self
    }

    /// Enable or disable the final hygiene check.
    #[must_use]
    pub fn with_verify_hygiene(mut self, enable: bool) -> Self {
        self.verify_hygiene = enable;
        self
    }

    /// Load a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> QuarryResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the driver cannot run with.
    pub fn validate(&self) -> QuarryResult<()> {
        ensure!(
            self.max_iterations > 0,
            InvalidParameter: "max_iterations must be at least 1"
        );
        Ok(())
    }
}
