//! # Keyed Input
//!
//! [`KeyedInput`] is what callers hand to an aggregator: a mapping from names to
//! computations. It is deliberately a *dynamic* shape. Callers that assemble
//! inputs from loosely typed sources (JSON payloads, optional arguments, lists
//! built elsewhere) can hand over whatever they have, and the validator decides
//! whether it is usable.
//!
//! ```text
//!   KeyedInput ──validate──▶ Map(IndexMap<K, V>) ──extract──▶ (keys, computations)
//!        │
//!        └── Absent / Null / Scalar / Sequence ──▶ TypeKindError
//! ```
//!
//! A sequence is rejected even when it holds computations: a list gives no
//! stable name to each entry, so there is nothing to reassemble the result on.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::TypeKindError;

/// Kind of scalar that was supplied where a mapping was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Number,
    String,
}

/// Coarse shape of an input, as reported by [`TypeKindError::found`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Absent,
    Null,
    Scalar(ScalarKind),
    Sequence,
    Map,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Null => write!(f, "null"),
            Self::Scalar(ScalarKind::Bool) => write!(f, "boolean"),
            Self::Scalar(ScalarKind::Number) => write!(f, "number"),
            Self::Scalar(ScalarKind::String) => write!(f, "string"),
            Self::Sequence => write!(f, "sequence"),
            Self::Map => write!(f, "map"),
        }
    }
}

/// Input to [`all_of`](crate::all_of) and [`all_settled_of`](crate::all_settled_of).
///
/// Only [`KeyedInput::Map`] is accepted. The other variants exist so that a
/// malformed input is reported as a [`TypeKindError`] instead of being ruled out
/// at the type level, which keeps dynamic call sites honest.
#[derive(Debug, Clone)]
pub enum KeyedInput<K, V> {
    /// Names mapped to computations, in the source's enumeration order.
    Map(IndexMap<K, V>),
    /// A positional list.
    Sequence(Vec<V>),
    /// A single scalar value.
    Scalar(ScalarKind),
    /// An explicit null.
    Null,
    /// No input at all.
    Absent,
}

impl<K: Hash + Eq, V: PartialEq> PartialEq for KeyedInput<K, V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::Null, Self::Null) | (Self::Absent, Self::Absent) => true,
            _ => false,
        }
    }
}

impl<K, V> KeyedInput<K, V> {
    /// The coarse shape of this input.
    pub fn kind(&self) -> InputKind {
        match self {
            Self::Map(_) => InputKind::Map,
            Self::Sequence(_) => InputKind::Sequence,
            Self::Scalar(kind) => InputKind::Scalar(*kind),
            Self::Null => InputKind::Null,
            Self::Absent => InputKind::Absent,
        }
    }

    /// Number of named entries; zero for anything that is not a map.
    pub fn len(&self) -> usize {
        match self {
            Self::Map(map) => map.len(),
            _ => 0,
        }
    }

    /// Whether there are no named entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for KeyedInput<K, V> {
    fn default() -> Self {
        Self::Map(IndexMap::new())
    }
}

impl<K: Hash + Eq, V> FromIterator<(K, V)> for KeyedInput<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(iter.into_iter().collect())
    }
}

impl<K, V> From<IndexMap<K, V>> for KeyedInput<K, V> {
    fn from(map: IndexMap<K, V>) -> Self {
        Self::Map(map)
    }
}

impl<K: Hash + Eq, V> From<HashMap<K, V>> for KeyedInput<K, V> {
    fn from(map: HashMap<K, V>) -> Self {
        Self::Map(map.into_iter().collect())
    }
}

impl<K: Hash + Eq, V> From<BTreeMap<K, V>> for KeyedInput<K, V> {
    fn from(map: BTreeMap<K, V>) -> Self {
        Self::Map(map.into_iter().collect())
    }
}

impl<K, V> From<Vec<V>> for KeyedInput<K, V> {
    fn from(items: Vec<V>) -> Self {
        Self::Sequence(items)
    }
}

impl<K, V, const N: usize> From<[V; N]> for KeyedInput<K, V> {
    fn from(items: [V; N]) -> Self {
        Self::Sequence(items.into())
    }
}

impl<K, V, M> From<Option<M>> for KeyedInput<K, V>
where
    M: Into<KeyedInput<K, V>>,
{
    fn from(input: Option<M>) -> Self {
        match input {
            Some(input) => input.into(),
            None => Self::Absent,
        }
    }
}

impl<K, V> From<()> for KeyedInput<K, V> {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl<K, V> From<bool> for KeyedInput<K, V> {
    fn from(_: bool) -> Self {
        Self::Scalar(ScalarKind::Bool)
    }
}

impl<K, V> From<String> for KeyedInput<K, V> {
    fn from(_: String) -> Self {
        Self::Scalar(ScalarKind::String)
    }
}

impl<K, V> From<&str> for KeyedInput<K, V> {
    fn from(_: &str) -> Self {
        Self::Scalar(ScalarKind::String)
    }
}

macro_rules! number_input {
    ($($ty:ty),*) => {
        $(
            impl<K, V> From<$ty> for KeyedInput<K, V> {
                fn from(_: $ty) -> Self {
                    Self::Scalar(ScalarKind::Number)
                }
            }
        )*
    };
}

number_input!(i32, i64, u32, u64, usize, f32, f64);

/// Check that an input is a keyed mapping.
///
/// Empty mappings are valid. Nothing inside the input is touched.
pub fn validate<K, V>(input: &KeyedInput<K, V>) -> Result<(), TypeKindError> {
    match input.kind() {
        InputKind::Map => Ok(()),
        other => Err(TypeKindError::new(other)),
    }
}

/// Split a validated mapping into parallel `keys` and `computations`.
///
/// `keys[i]` names `computations[i]`; both follow the map's enumeration order.
pub fn extract<K, V>(map: IndexMap<K, V>) -> (Vec<K>, Vec<V>) {
    map.into_iter().unzip()
}
