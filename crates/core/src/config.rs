//! Aggregator configuration.
//!
//! Configuration is always passed explicitly by the caller. Nothing here reads
//! environment variables or other process-wide state.

use serde::{Deserialize, Serialize};

/// Knobs for an [`Aggregator`](crate::Aggregator).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    /// Skip the input-shape check.
    ///
    /// Meant for trusted call sites. A non-map input is then aggregated as an
    /// empty mapping and whatever it held is dropped without being observed.
    pub skip_validation: bool,
}

impl AggregateConfig {
    /// Enable or disable the input-shape check bypass.
    pub fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }
}
