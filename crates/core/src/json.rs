//! `serde_json` interop.
//!
//! A [`Value`] converts into a [`KeyedInput`] of the matching shape, with every
//! member treated as an already-fulfilled computation. Objects become maps and
//! keep their member order; arrays, scalars and `null` become the shapes the
//! validator rejects.
//!
//! [`decode`] goes the other way: it turns a string-keyed aggregate into any
//! `Deserialize` struct, so heterogeneous results can be destructured by name.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::computation::Computation;
use crate::input::{KeyedInput, ScalarKind};

impl<E> From<Value> for KeyedInput<String, Computation<Value, E>> {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Scalar(ScalarKind::Bool),
            Value::Number(_) => Self::Scalar(ScalarKind::Number),
            Value::String(_) => Self::Scalar(ScalarKind::String),
            Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Computation::resolved).collect())
            }
            Value::Object(members) => Self::Map(
                members
                    .into_iter()
                    .map(|(key, value)| (key, Computation::resolved(value)))
                    .collect(),
            ),
        }
    }
}

impl<E> KeyedInput<String, Computation<Value, E>> {
    /// Shorthand for `KeyedInput::from(value)` that pins the value type.
    pub fn from_json(value: Value) -> Self {
        value.into()
    }
}

/// Deserialize a string-keyed aggregate into `S`.
pub fn decode<S: DeserializeOwned>(
    result: IndexMap<String, Value>,
) -> Result<S, serde_json::Error> {
    let object: Map<String, Value> = result.into_iter().collect();
    serde_json::from_value(Value::Object(object))
}
