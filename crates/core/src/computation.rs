//! # Computations
//!
//! A [`Computation`] is a handle to work that eventually produces exactly one
//! `Ok(value)` or `Err(reason)`. Aggregators only *observe* computations. They
//! never start, retry or cancel one.
//!
//! | Constructor                 | Starts running            | Dropped handle        |
//! |-----------------------------|---------------------------|-----------------------|
//! | [`Computation::spawn`]      | immediately, as a task    | task keeps running    |
//! | [`Computation::deferred`]   | when first polled         | future is dropped     |
//! | [`Computation::resolved`]   | already fulfilled         | nothing to drop       |
//! | [`Computation::rejected`]   | already rejected          | nothing to drop       |
//!
//! Plain values are not rejected for "not being async"; wrap them with
//! [`Computation::resolved`] and they count as already fulfilled.

use std::fmt;
use std::future::Future;
use std::panic;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::task::JoinHandle;

enum State<T, E> {
    Settled(Option<Result<T, E>>),
    Task(JoinHandle<Result<T, E>>),
    Deferred(BoxFuture<'static, Result<T, E>>),
}

/// An asynchronous computation, or a value standing in for one.
///
/// Implements `Future<Output = Result<T, E>>`, so it can be awaited directly or
/// placed in a [`KeyedInput`](crate::KeyedInput).
pub struct Computation<T, E> {
    state: State<T, E>,
}

impl<T, E> Computation<T, E> {
    /// An already-fulfilled computation.
    pub fn resolved(value: T) -> Self {
        Self {
            state: State::Settled(Some(Ok(value))),
        }
    }

    /// An already-rejected computation.
    pub fn rejected(reason: E) -> Self {
        Self {
            state: State::Settled(Some(Err(reason))),
        }
    }

    /// Start `future` on the current tokio runtime right away.
    ///
    /// The task runs whether or not anybody awaits the handle, and dropping the
    /// handle does not stop it. A panic inside the task is re-raised wherever
    /// the computation is awaited.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        Self {
            state: State::Task(tokio::spawn(future)),
        }
    }

    /// Wrap a future that only makes progress while the computation is polled.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            state: State::Deferred(future.boxed()),
        }
    }

    /// Whether the outcome is already known without waiting.
    ///
    /// True for [`resolved`](Self::resolved) and [`rejected`](Self::rejected)
    /// values, false for anything that still has to be awaited.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, State::Settled(Some(_)))
    }
}

// `Settled` is only ever moved out of with `Option::take`, never pinned.
impl<T, E> Unpin for Computation<T, E> {}

impl<T, E> Future for Computation<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().state {
            State::Settled(slot) => match slot.take() {
                Some(result) => Poll::Ready(result),
                None => panic!("`Computation` polled after completion"),
            },
            State::Task(handle) => match ready!(Pin::new(handle).poll(cx)) {
                Ok(result) => Poll::Ready(result),
                Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
                Err(err) => panic!("computation task did not finish: {err}"),
            },
            State::Deferred(future) => future.as_mut().poll(cx),
        }
    }
}

impl<T, E> From<Result<T, E>> for Computation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self {
            state: State::Settled(Some(result)),
        }
    }
}

impl<T, E> From<JoinHandle<Result<T, E>>> for Computation<T, E> {
    fn from(handle: JoinHandle<Result<T, E>>) -> Self {
        Self {
            state: State::Task(handle),
        }
    }
}

impl<T, E> fmt::Debug for Computation<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            State::Settled(Some(Ok(_))) => "resolved",
            State::Settled(Some(Err(_))) => "rejected",
            State::Settled(None) => "consumed",
            State::Task(_) => "task",
            State::Deferred(_) => "deferred",
        };
        f.debug_struct("Computation").field("state", &state).finish()
    }
}
