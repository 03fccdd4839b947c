//! # Keyed Aggregation
//!
//! Wait for a named set of computations and hand the names back.
//!
//! ## Pattern: Validate → Extract → Observe → Reassemble
//!
//! ```text
//!    { a: fut_a,                 keys  [a, b, c]                      { a: 1,
//!      b: fut_b,   ──extract──▶                 ──observe──▶ slots ──▶  b: 2,
//!      c: fut_c }                futs  [fa, fb, fc]   (any order)       c: 3 }
//! ```
//!
//! Computations are observed together in a single `FuturesUnordered`, so they
//! settle in whatever order they actually finish. Each result is written to the
//! slot of its position and the slots are paired with the keys at the end.
//!
//! ## Policies
//!
//! | Policy                            | Inner failure                        | Result                    |
//! |-----------------------------------|--------------------------------------|---------------------------|
//! | [`all_of`] (fail-fast)            | first one observed ends the call     | `IndexMap<K, T>`          |
//! | [`all_settled_of`] (exhaustive)   | recorded, never escalated            | `IndexMap<K, Outcome<T, E>>` |
//!
//! "First failure" means first in real time, not first in key order. When two
//! computations fail close together, which reason wins is not deterministic.
//!
//! Neither policy cancels anything. After a fail-fast return, computations
//! created with [`Computation::spawn`](crate::Computation::spawn) keep running
//! and their outcomes are discarded. Deferred computations only move while the
//! aggregate polls them, so they stop there.

use std::fmt::Debug;
use std::future::{Future, IntoFuture};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexMap;

use crate::config::AggregateConfig;
use crate::error::{AggregateError, TypeKindError};
use crate::hooks::{AggregateHook, AggregateSummary, NullHook, Policy};
use crate::input::{extract, validate, KeyedInput};
use crate::outcome::Outcome;

/// Fail-fast result: every key mapped to its fulfilled value.
pub type AggregateResult<K, T> = IndexMap<K, T>;

/// Exhaustive result: every key mapped to how its computation settled.
pub type SettledResult<K, T, E> = IndexMap<K, Outcome<T, E>>;

// ============================================================================
// Aggregator
// ============================================================================

/// Entry point carrying configuration and an optional observer.
///
/// The free functions [`all_of`] and [`all_settled_of`] use
/// `Aggregator::default()`.
///
/// # Example
///
/// ```rust
/// use keyed_join_core::{AggregateConfig, Aggregator, Computation, LoggingHook};
/// use std::collections::HashMap;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let aggregator = Aggregator::new(AggregateConfig::default()).with_hook(LoggingHook::new());
///
/// let mut input = HashMap::new();
/// input.insert("a", Computation::<i32, String>::resolved(1));
/// input.insert("b", Computation::resolved(2));
///
/// let result = aggregator.all_of(input).await.unwrap();
/// assert_eq!(result["a"], 1);
/// assert_eq!(result["b"], 2);
/// # }
/// ```
#[derive(Clone)]
pub struct Aggregator {
    config: AggregateConfig,
    hook: Arc<dyn AggregateHook>,
}

impl Aggregator {
    /// Create an aggregator with the given configuration and no observer.
    pub fn new(config: AggregateConfig) -> Self {
        Self {
            config,
            hook: Arc::new(NullHook),
        }
    }

    /// Attach an observer, replacing the current one.
    pub fn with_hook<H: AggregateHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    /// Attach an observer that is shared with other owners.
    pub fn with_shared_hook(mut self, hook: Arc<dyn AggregateHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn config(&self) -> &AggregateConfig {
        &self.config
    }

    /// Wait for every computation; fail with the first failure observed.
    ///
    /// The input is validated and split when this method is called. An invalid
    /// input yields a future that fails with [`AggregateError::TypeKind`] and
    /// never touches a computation. Otherwise the future resolves to a map with
    /// exactly the input's keys, or fails with
    /// [`AggregateError::Rejected`] carrying the reason of whichever
    /// computation was seen to fail first.
    ///
    /// Keys may be of any type that can be hashed and compared. They must also
    /// be `Debug`, because hooks receive the key of each settled computation.
    pub fn all_of<K, V, T, E, I>(
        &self,
        input: I,
    ) -> impl Future<Output = Result<AggregateResult<K, T>, AggregateError<E>>>
    where
        I: Into<KeyedInput<K, V>>,
        K: Hash + Eq + Debug,
        V: IntoFuture<Output = Result<T, E>>,
    {
        let prepared = self.prepare(Policy::FailFast, input.into());
        let hook = Arc::clone(&self.hook);

        async move {
            let (keys, computations) = prepared?;
            fail_fast(keys, computations, hook.as_ref()).await
        }
    }

    /// Wait for every computation and report each outcome.
    ///
    /// Inner failures never fail the aggregate; the only error is
    /// [`TypeKindError`] for an input that is not a keyed mapping.
    ///
    /// Keys carry the same `Hash + Eq + Debug` bound as [`Aggregator::all_of`].
    pub fn all_settled_of<K, V, T, E, I>(
        &self,
        input: I,
    ) -> impl Future<Output = Result<SettledResult<K, T, E>, TypeKindError>>
    where
        I: Into<KeyedInput<K, V>>,
        K: Hash + Eq + Debug,
        V: IntoFuture<Output = Result<T, E>>,
    {
        let prepared = self.prepare(Policy::Exhaustive, input.into());
        let hook = Arc::clone(&self.hook);

        async move {
            let (keys, computations) = prepared?;
            Ok(exhaustive(keys, computations, hook.as_ref()).await)
        }
    }

    /// Validate (unless bypassed) and extract.
    fn prepare<K, V>(
        &self,
        policy: Policy,
        input: KeyedInput<K, V>,
    ) -> Result<(Vec<K>, Vec<V>), TypeKindError> {
        if !self.config.skip_validation {
            if let Err(err) = validate(&input) {
                self.hook.on_invalid_input(policy, &err);
                return Err(err);
            }
        }

        Ok(match input {
            KeyedInput::Map(map) => extract(map),
            _ => (Vec::new(), Vec::new()),
        })
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(AggregateConfig::default())
    }
}

impl Debug for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aggregator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// [`Aggregator::all_of`] with the default configuration.
///
/// `K: Debug` is required so keys can be handed to hooks.
pub fn all_of<K, V, T, E, I>(
    input: I,
) -> impl Future<Output = Result<AggregateResult<K, T>, AggregateError<E>>>
where
    I: Into<KeyedInput<K, V>>,
    K: Hash + Eq + Debug,
    V: IntoFuture<Output = Result<T, E>>,
{
    Aggregator::default().all_of(input)
}

/// [`Aggregator::all_settled_of`] with the default configuration.
///
/// `K: Debug` is required so keys can be handed to hooks.
pub fn all_settled_of<K, V, T, E, I>(
    input: I,
) -> impl Future<Output = Result<SettledResult<K, T, E>, TypeKindError>>
where
    I: Into<KeyedInput<K, V>>,
    K: Hash + Eq + Debug,
    V: IntoFuture<Output = Result<T, E>>,
{
    Aggregator::default().all_settled_of(input)
}

// ============================================================================
// Policies
// ============================================================================

/// Observe every computation at once, tagging each result with its position.
fn observe<V, T, E>(
    computations: Vec<V>,
) -> FuturesUnordered<impl Future<Output = (usize, Result<T, E>)>>
where
    V: IntoFuture<Output = Result<T, E>>,
{
    computations
        .into_iter()
        .enumerate()
        .map(|(index, computation)| {
            let future = computation.into_future();
            async move { (index, future.await) }
        })
        .collect()
}

fn empty_slots<R>(len: usize) -> Vec<Option<R>> {
    std::iter::repeat_with(|| None).take(len).collect()
}

async fn fail_fast<K, V, T, E>(
    keys: Vec<K>,
    computations: Vec<V>,
    hook: &dyn AggregateHook,
) -> Result<AggregateResult<K, T>, AggregateError<E>>
where
    K: Hash + Eq + Debug,
    V: IntoFuture<Output = Result<T, E>>,
{
    hook.on_start(Policy::FailFast, keys.len());
    let started = Instant::now();
    let mut summary = AggregateSummary::new(Policy::FailFast, keys.len());
    let mut slots = empty_slots(keys.len());
    let mut pending = observe(computations);

    while let Some((index, result)) = pending.next().await {
        hook.on_settle(Policy::FailFast, &keys[index], result.is_ok());
        match result {
            Ok(value) => {
                summary.fulfilled += 1;
                slots[index] = Some(value);
            }
            Err(reason) => {
                summary.rejected += 1;
                summary.short_circuited = summary.unobserved() > 0;
                summary.elapsed = started.elapsed();
                hook.on_finish(&summary);
                return Err(AggregateError::Rejected(reason));
            }
        }
    }

    summary.elapsed = started.elapsed();
    hook.on_finish(&summary);
    Ok(reassemble(keys, slots.into_iter().flatten().collect()))
}

async fn exhaustive<K, V, T, E>(
    keys: Vec<K>,
    computations: Vec<V>,
    hook: &dyn AggregateHook,
) -> SettledResult<K, T, E>
where
    K: Hash + Eq + Debug,
    V: IntoFuture<Output = Result<T, E>>,
{
    hook.on_start(Policy::Exhaustive, keys.len());
    let started = Instant::now();
    let mut summary = AggregateSummary::new(Policy::Exhaustive, keys.len());
    let mut slots = empty_slots(keys.len());
    let mut pending = observe(computations);

    while let Some((index, result)) = pending.next().await {
        hook.on_settle(Policy::Exhaustive, &keys[index], result.is_ok());
        if result.is_ok() {
            summary.fulfilled += 1;
        } else {
            summary.rejected += 1;
        }
        slots[index] = Some(Outcome::from(result));
    }

    summary.elapsed = started.elapsed();
    hook.on_finish(&summary);
    reassemble(keys, slots.into_iter().flatten().collect())
}

// ============================================================================
// Reassembler
// ============================================================================

/// Pair `results[i]` with `keys[i]`.
///
/// Both sequences come from the same extraction, so their lengths always match.
pub fn reassemble<K: Hash + Eq, R>(keys: Vec<K>, results: Vec<R>) -> IndexMap<K, R> {
    debug_assert_eq!(
        keys.len(),
        results.len(),
        "every key needs exactly one result"
    );
    keys.into_iter().zip(results).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computation::Computation;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingHook {
        settled: Mutex<Vec<(String, bool)>>,
        summaries: Mutex<Vec<AggregateSummary>>,
        invalid: Mutex<usize>,
        started: Mutex<usize>,
    }

    impl AggregateHook for RecordingHook {
        fn on_start(&self, _policy: Policy, _len: usize) {
            *self.started.lock().unwrap() += 1;
        }

        fn on_invalid_input(&self, _policy: Policy, _error: &TypeKindError) {
            *self.invalid.lock().unwrap() += 1;
        }

        fn on_settle(&self, _policy: Policy, key: &dyn Debug, fulfilled: bool) {
            self.settled
                .lock()
                .unwrap()
                .push((format!("{key:?}"), fulfilled));
        }

        fn on_finish(&self, summary: &AggregateSummary) {
            self.summaries.lock().unwrap().push(summary.clone());
        }
    }

    #[test]
    fn test_reassemble_pairs_by_position() {
        let map = reassemble(vec!["b", "a"], vec![2, 1]);
        assert_eq!(map.get_index(0), Some((&"b", &2)));
        assert_eq!(map.get_index(1), Some((&"a", &1)));
    }

    #[test]
    fn test_reassemble_empty() {
        let map: IndexMap<&str, i32> = reassemble(Vec::new(), Vec::new());
        assert!(map.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_follows_input_order_not_completion_order() {
        fn delayed(ms: u64) -> Computation<u64, ()> {
            Computation::deferred(async move {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(ms)
            })
        }

        let mut input = IndexMap::new();
        input.insert("slow", delayed(30));
        input.insert("fast", delayed(10));
        input.insert("mid", delayed(20));

        let recorder = Arc::new(RecordingHook::default());
        let result = Aggregator::default()
            .with_shared_hook(recorder.clone())
            .all_of(input)
            .await
            .unwrap();

        let keys: Vec<_> = result.keys().copied().collect();
        assert_eq!(keys, vec!["slow", "fast", "mid"]);

        let settled: Vec<_> = recorder
            .settled
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect();
        assert_eq!(settled, vec!["\"fast\"", "\"mid\"", "\"slow\""]);
    }

    #[tokio::test]
    async fn test_fail_fast_summary_reports_short_circuit() {
        let mut input = IndexMap::new();
        input.insert("ok", Computation::<i32, &str>::resolved(1));
        input.insert("bad", Computation::rejected("err"));
        input.insert("never", Computation::deferred(futures::future::pending()));

        let recorder = Arc::new(RecordingHook::default());
        let err = Aggregator::default()
            .with_shared_hook(recorder.clone())
            .all_of(input)
            .await
            .unwrap_err();
        assert_eq!(err, AggregateError::Rejected("err"));

        let summaries = recorder.summaries.lock().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].policy, Policy::FailFast);
        assert_eq!(summaries[0].rejected, 1);
        assert!(summaries[0].short_circuited);
        assert!(summaries[0].unobserved() >= 1);
    }

    #[tokio::test]
    async fn test_exhaustive_summary_counts_everything() {
        let mut input = IndexMap::new();
        input.insert("a", Computation::<i32, &str>::resolved(1));
        input.insert("b", Computation::rejected("x"));
        input.insert("c", Computation::rejected("y"));

        let recorder = Arc::new(RecordingHook::default());
        let result = Aggregator::default()
            .with_shared_hook(recorder.clone())
            .all_settled_of(input)
            .await
            .unwrap();
        assert_eq!(result.len(), 3);

        let summaries = recorder.summaries.lock().unwrap();
        assert_eq!(summaries[0].fulfilled, 1);
        assert_eq!(summaries[0].rejected, 2);
        assert!(!summaries[0].short_circuited);
    }

    #[tokio::test]
    async fn test_invalid_input_notifies_hook_without_start() {
        let recorder = Arc::new(RecordingHook::default());
        let aggregator = Aggregator::default().with_shared_hook(recorder.clone());

        let input: KeyedInput<&str, Computation<i32, ()>> = KeyedInput::Null;
        let err = aggregator.all_of(input).await.unwrap_err();
        assert!(err.is_type_kind());

        assert_eq!(*recorder.invalid.lock().unwrap(), 1);
        assert_eq!(*recorder.started.lock().unwrap(), 0);
        assert!(recorder.summaries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_and_finish_pair_up_on_poll() {
        let recorder = Arc::new(RecordingHook::default());
        let aggregator = Aggregator::default().with_shared_hook(recorder.clone());

        let input = || IndexMap::from([("a", Computation::<i32, ()>::resolved(1))]);

        let dropped = aggregator.all_of(input());
        drop(dropped);
        assert_eq!(*recorder.started.lock().unwrap(), 0);

        aggregator.all_settled_of(input()).await.unwrap();
        assert_eq!(*recorder.started.lock().unwrap(), 1);
        assert_eq!(recorder.summaries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shared_hook_outlives_aggregator() {
        let recorder = Arc::new(RecordingHook::default());
        let shared: Arc<dyn AggregateHook> = recorder.clone();

        let first = Aggregator::default().with_shared_hook(Arc::clone(&shared));
        let second = Aggregator::default().with_shared_hook(shared);

        let input = || IndexMap::from([("k", Computation::<i32, ()>::resolved(7))]);
        first.all_of(input()).await.unwrap();
        second.all_settled_of(input()).await.unwrap();
        drop((first, second));

        assert_eq!(recorder.settled.lock().unwrap().len(), 2);
        assert_eq!(recorder.summaries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_skip_validation_treats_non_map_as_empty() {
        let aggregator = Aggregator::new(AggregateConfig::default().with_skip_validation(true));

        let input: KeyedInput<&str, Computation<i32, ()>> =
            vec![Computation::resolved(1)].into();
        let result = aggregator.all_of(input).await.unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_aggregator_debug() {
        let text = format!("{:?}", Aggregator::default());
        assert!(text.contains("skip_validation: false"));
    }
}
