//! Settled outcome of a single computation.

use std::future::Future;

use serde::{Deserialize, Serialize};

/// What a computation settled to.
///
/// Serializes as `{"status": "fulfilled", "value": ...}` or
/// `{"status": "rejected", "reason": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome<T, E> {
    /// The computation succeeded.
    Fulfilled { value: T },
    /// The computation failed; `reason` is exactly what it failed with.
    Rejected { reason: E },
}

impl<T, E> Outcome<T, E> {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The fulfilled value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled { value } => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    /// The rejection reason, if any.
    pub fn reason(&self) -> Option<&E> {
        match self {
            Self::Fulfilled { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled { value },
            Err(reason) => Self::Rejected { reason },
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Fulfilled { value } => Ok(value),
            Outcome::Rejected { reason } => Err(reason),
        }
    }
}

/// Await one computation and capture how it settled, never failing.
pub async fn settle<F, T, E>(future: F) -> Outcome<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    future.await.into()
}
