//! # Keyed Join - Named Concurrent Aggregation
//!
//! Wait for a named set of asynchronous computations and get a result shaped
//! by the same names:
//!
//! - **Input**: keyed mappings, shape validation and extraction
//! - **Computations**: eager tasks, deferred futures and plain values
//! - **Aggregation**: fail-fast [`all_of`] and exhaustive [`all_settled_of`]
//! - **Outcomes**: tagged fulfilled/rejected results
//! - **Hooks**: opt-in observation of aggregation events
//! - **JSON**: `serde_json` inputs and typed decoding of results
//! - **Macros**: the same policies over struct fields of differing types
//!
//! ## Quick Start
//!
//! ```rust
//! use keyed_join_core::{all_of, all_settled_of, Computation, Outcome};
//! use indexmap::IndexMap;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut input = IndexMap::new();
//! input.insert("a", Computation::<i32, &str>::resolved(1));
//! input.insert("b", Computation::spawn(async { Ok(2) }));
//!
//! let result = all_of(input).await.unwrap();
//! assert_eq!(result["a"], 1);
//! assert_eq!(result["b"], 2);
//!
//! let mut input = IndexMap::new();
//! input.insert("a", Computation::<i32, &str>::resolved(1));
//! input.insert("b", Computation::rejected("err"));
//!
//! let settled = all_settled_of(input).await.unwrap();
//! assert_eq!(settled["a"], Outcome::Fulfilled { value: 1 });
//! assert_eq!(settled["b"], Outcome::Rejected { reason: "err" });
//! # }
//! ```
//!
//! ## Design Notes
//!
//! The aggregators own nothing but a positional buffer per call. They do not
//! spawn, cancel, retry or time out computations, and they never log unless a
//! hook is attached.

pub mod aggregate;
pub mod computation;
pub mod config;
pub mod error;
pub mod hooks;
pub mod input;
pub mod json;
pub mod macros;
pub mod outcome;

// Re-export key types at crate root for convenience
pub use aggregate::{
    all_of, all_settled_of, reassemble, AggregateResult, Aggregator, SettledResult,
};
pub use computation::Computation;
pub use config::AggregateConfig;
pub use error::{AggregateError, TypeKindError};
pub use hooks::{AggregateHook, AggregateSummary, CompositeHook, LoggingHook, NullHook, Policy};
pub use input::{extract, validate, InputKind, KeyedInput, ScalarKind};
pub use outcome::{settle, Outcome};

#[doc(hidden)]
pub mod __private {
    pub use futures;
}
