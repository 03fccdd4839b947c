//! Aggregation hooks for observability.
//!
//! The aggregators never log on their own. A caller that wants to see what an
//! aggregation is doing attaches a hook with
//! [`Aggregator::with_hook`](crate::Aggregator::with_hook).
//!
//! ## Events
//!
//! - `on_start`: the aggregate was first polled and is observing `len` computations
//! - `on_invalid_input`: the input was rejected before anything was observed
//! - `on_settle`: one computation settled
//! - `on_finish`: the aggregate is about to be delivered
//!
//! ## Example
//!
//! ```ignore
//! struct SlowCallAlarm;
//!
//! impl AggregateHook for SlowCallAlarm {
//!     fn on_finish(&self, summary: &AggregateSummary) {
//!         if summary.elapsed > Duration::from_secs(1) {
//!             eprintln!("slow aggregation: {summary}");
//!         }
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::TypeKindError;

// ============================================================================
// Policy and Summary
// ============================================================================

/// Which aggregation policy produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// `all_of`: the first failure ends the aggregate.
    FailFast,
    /// `all_settled_of`: every outcome is collected.
    Exhaustive,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailFast => write!(f, "all_of"),
            Self::Exhaustive => write!(f, "all_settled_of"),
        }
    }
}

/// Bookkeeping for one finished aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateSummary {
    pub policy: Policy,
    /// Number of keys in the input.
    pub total: usize,
    /// Computations observed to fulfil.
    pub fulfilled: usize,
    /// Computations observed to reject.
    pub rejected: usize,
    /// The fail-fast policy returned before every computation settled.
    pub short_circuited: bool,
    pub elapsed: Duration,
}

impl AggregateSummary {
    pub(crate) fn new(policy: Policy, total: usize) -> Self {
        Self {
            policy,
            total,
            fulfilled: 0,
            rejected: 0,
            short_circuited: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Computations whose outcome was never observed.
    pub fn unobserved(&self) -> usize {
        self.total - self.fulfilled - self.rejected
    }
}

impl fmt::Display for AggregateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}/{} fulfilled, {} rejected in {:?}",
            self.policy, self.fulfilled, self.total, self.rejected, self.elapsed
        )?;
        if self.short_circuited {
            write!(f, " (short-circuited, {} unobserved)", self.unobserved())?;
        }
        Ok(())
    }
}

// ============================================================================
// Aggregate Hook Trait
// ============================================================================

/// Trait for observing aggregation events.
///
/// All methods have default no-op implementations, so you only need to
/// implement the events you care about. Hooks see keys and counts, never the
/// values or failure reasons themselves.
pub trait AggregateHook: Send + Sync {
    /// Called when a validated aggregate is first polled.
    ///
    /// Every `on_start` is followed by `on_finish` unless the aggregate
    /// future is dropped before completing.
    ///
    /// # Arguments
    /// * `policy` - The aggregation policy
    /// * `len` - Number of computations about to be observed
    fn on_start(&self, _policy: Policy, _len: usize) {}

    /// Called when the input is rejected by the validator.
    fn on_invalid_input(&self, _policy: Policy, _error: &TypeKindError) {}

    /// Called each time one computation settles.
    ///
    /// # Arguments
    /// * `key` - The key naming the computation
    /// * `fulfilled` - Whether it fulfilled (`false` means it rejected)
    fn on_settle(&self, _policy: Policy, _key: &dyn fmt::Debug, _fulfilled: bool) {}

    /// Called right before the aggregate result is delivered.
    fn on_finish(&self, _summary: &AggregateSummary) {}
}

// ============================================================================
// Null Hook (Default)
// ============================================================================

/// A no-op hook implementation for when no observation is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHook;

impl AggregateHook for NullHook {}

// ============================================================================
// Logging Hook
// ============================================================================

/// A hook that writes events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHook {
    /// Whether to log every settled key as well
    pub verbose: bool,
}

impl LoggingHook {
    /// Create a new logging hook.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a verbose logging hook.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl AggregateHook for LoggingHook {
    fn on_start(&self, policy: Policy, len: usize) {
        log::debug!("{policy}: observing {len} computation(s)");
    }

    fn on_invalid_input(&self, policy: Policy, error: &TypeKindError) {
        log::warn!("{policy}: rejected {} input: {error}", error.found());
    }

    fn on_settle(&self, policy: Policy, key: &dyn fmt::Debug, fulfilled: bool) {
        if self.verbose {
            let status = if fulfilled { "fulfilled" } else { "rejected" };
            log::trace!("{policy}: {key:?} {status}");
        }
    }

    fn on_finish(&self, summary: &AggregateSummary) {
        if summary.rejected > 0 {
            log::info!("{summary}");
        } else {
            log::debug!("{summary}");
        }
    }
}

// ============================================================================
// Composite Hook
// ============================================================================

/// A hook that delegates to multiple inner hooks.
#[derive(Default)]
pub struct CompositeHook {
    hooks: Vec<Box<dyn AggregateHook>>,
}

impl CompositeHook {
    /// Create a new composite hook.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Add a hook to the composite.
    pub fn with<H: AggregateHook + 'static>(mut self, hook: H) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for CompositeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeHook")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl AggregateHook for CompositeHook {
    fn on_start(&self, policy: Policy, len: usize) {
        for hook in &self.hooks {
            hook.on_start(policy, len);
        }
    }

    fn on_invalid_input(&self, policy: Policy, error: &TypeKindError) {
        for hook in &self.hooks {
            hook.on_invalid_input(policy, error);
        }
    }

    fn on_settle(&self, policy: Policy, key: &dyn fmt::Debug, fulfilled: bool) {
        for hook in &self.hooks {
            hook.on_settle(policy, key, fulfilled);
        }
    }

    fn on_finish(&self, summary: &AggregateSummary) {
        for hook in &self.hooks {
            hook.on_finish(summary);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingHook {
        settles: Arc<AtomicUsize>,
        finishes: Arc<AtomicUsize>,
    }

    impl CountingHook {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let settles = Arc::new(AtomicUsize::new(0));
            let finishes = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    settles: Arc::clone(&settles),
                    finishes: Arc::clone(&finishes),
                },
                settles,
                finishes,
            )
        }
    }

    impl AggregateHook for CountingHook {
        fn on_settle(&self, _policy: Policy, _key: &dyn fmt::Debug, _fulfilled: bool) {
            self.settles.fetch_add(1, Ordering::SeqCst);
        }

        fn on_finish(&self, _summary: &AggregateSummary) {
            self.finishes.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_null_hook() {
        let hook = NullHook;
        hook.on_start(Policy::FailFast, 3);
        hook.on_finish(&AggregateSummary::new(Policy::FailFast, 3));
    }

    #[test]
    fn test_logging_hook_does_not_panic_without_logger() {
        let hook = LoggingHook::verbose();
        hook.on_start(Policy::Exhaustive, 1);
        hook.on_settle(Policy::Exhaustive, &"a", false);
        hook.on_invalid_input(Policy::FailFast, &TypeKindError::new(InputKind::Null));
        hook.on_finish(&AggregateSummary::new(Policy::Exhaustive, 1));
    }

    #[test]
    fn test_composite_hook() {
        let (hook1, settles1, finishes1) = CountingHook::new();
        let (hook2, settles2, _) = CountingHook::new();

        let composite = CompositeHook::new().with(hook1).with(hook2);
        assert_eq!(composite.len(), 2);

        composite.on_settle(Policy::FailFast, &"key", true);
        composite.on_finish(&AggregateSummary::new(Policy::FailFast, 1));

        assert_eq!(settles1.load(Ordering::SeqCst), 1);
        assert_eq!(settles2.load(Ordering::SeqCst), 1);
        assert_eq!(finishes1.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_summary_display() {
        let mut summary = AggregateSummary::new(Policy::FailFast, 3);
        summary.fulfilled = 1;
        summary.rejected = 1;
        summary.short_circuited = true;

        let text = summary.to_string();
        assert!(text.starts_with("all_of: 1/3 fulfilled, 1 rejected"));
        assert!(text.ends_with("(short-circuited, 1 unobserved)"));
        assert_eq!(summary.unobserved(), 1);
    }
}
