//! # Error Types
//!
//! Two kinds of failure can end an aggregation:
//!
//! - the input was not a keyed mapping at all ([`TypeKindError`]), which is
//!   decided before a single computation is observed;
//! - an inner computation failed and the fail-fast policy surfaced it
//!   ([`AggregateError::Rejected`]).
//!
//! The second kind carries the inner reason exactly as the computation produced
//! it. Nothing here inspects, translates or annotates that value.

use thiserror::Error;

use crate::input::InputKind;

/// The input handed to an aggregator was not an associative structure.
///
/// Raised for absent input, null, scalars and sequences. The message is fixed;
/// the rejected shape is available through [`TypeKindError::found`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("the input must be a plain associative object")]
pub struct TypeKindError {
    found: InputKind,
}

impl TypeKindError {
    pub(crate) fn new(found: InputKind) -> Self {
        Self { found }
    }

    /// The shape that was rejected.
    pub fn found(&self) -> InputKind {
        self.found
    }
}

/// Failure of a fail-fast aggregation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AggregateError<E> {
    /// The input was not a keyed mapping.
    #[error(transparent)]
    TypeKind(#[from] TypeKindError),

    /// The first computation observed to fail, with its reason untouched.
    #[error("{0}")]
    Rejected(E),
}

impl<E> AggregateError<E> {
    /// Whether this is an input-shape failure.
    pub fn is_type_kind(&self) -> bool {
        matches!(self, Self::TypeKind(_))
    }

    /// Borrow the inner failure reason, if a computation failed.
    pub fn reason(&self) -> Option<&E> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::TypeKind(_) => None,
        }
    }

    /// Take the inner failure reason, if a computation failed.
    pub fn into_reason(self) -> Option<E> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::TypeKind(_) => None,
        }
    }
}
