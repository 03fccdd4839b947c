//! Aggregation over struct fields.
//!
//! A map needs one value type for every key. When each name has its own type,
//! let a struct play the role of the map: its fields are the keys. The struct
//! is named by a plain path such as `Profile` or `models::Profile`.
//!
//! ```rust
//! use keyed_join_core::{all_of_struct, Computation};
//!
//! struct Profile {
//!     name: String,
//!     age: u32,
//! }
//!
//! # futures::executor::block_on(async {
//! let profile = all_of_struct!(Profile {
//!     name: Computation::<_, String>::resolved("ada".to_string()),
//!     age: async { Ok(36) },
//! })
//! .await
//! .unwrap();
//!
//! assert_eq!(profile.name, "ada");
//! assert_eq!(profile.age, 36);
//! # });
//! ```

/// Await every field concurrently and build `Ty`, or fail with the first error.
///
/// All field futures must share one error type. The result is a future of
/// `Result<Ty, E>`.
#[macro_export]
macro_rules! all_of_struct {
    ($($ty:ident)::+ { $($field:ident : $computation:expr),+ $(,)? }) => {
        async {
            match $crate::__private::futures::try_join!($($computation),+) {
                ::core::result::Result::Ok(($($field,)+)) => {
                    ::core::result::Result::Ok($($ty)::+ { $($field),+ })
                }
                ::core::result::Result::Err(reason) => ::core::result::Result::Err(reason),
            }
        }
    };
}

/// Await every field concurrently and build `Ty` from their outcomes.
///
/// Every field of `Ty` must be an [`Outcome`](crate::Outcome). Never fails.
#[macro_export]
macro_rules! all_settled_of_struct {
    ($($ty:ident)::+ { $($field:ident : $computation:expr),+ $(,)? }) => {
        async {
            let ($($field,)+) = $crate::__private::futures::join!(
                $($crate::outcome::settle($computation)),+
            );
            $($ty)::+ { $($field),+ }
        }
    };
}
