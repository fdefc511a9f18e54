//! Timer and future-racing primitives used by the connectivity gate.
//!
//! Three small building blocks: a delay that resolves to a value, a deadline
//! that fails, and a two-way race that prefers whichever side produces a
//! usable value first.

use std::future::Future;
use std::pin::pin;
use std::time::Duration;

use futures::future::{self, Either};
use thiserror::Error;

/// Error produced by [`fail_after`] once the deadline elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {0:?} elapsed")]
pub struct DeadlineElapsed(pub Duration);

/// Resolve to `value` after `duration`. Never fails.
pub async fn delay<T>(duration: Duration, value: T) -> T {
    tokio::time::sleep(duration).await;
    value
}

/// Fail with [`DeadlineElapsed`] after `duration`.
///
/// Raced against a pending operation, this bounds how long that operation
/// may keep running.
pub async fn fail_after<T>(duration: Duration) -> Result<T, DeadlineElapsed> {
    tokio::time::sleep(duration).await;
    Err(DeadlineElapsed(duration))
}

/// Race two futures and resolve with the first `Some` either of them yields.
///
/// Whichever side settles first wins if it carries a value. A `None` defers
/// to the other side instead of concluding the race, so neither slot wins on
/// timer order alone. The combinator itself never fails; its operands are
/// infallible by type.
pub async fn first_some<T, A, B>(a: A, b: B) -> Option<T>
where
    A: Future<Output = Option<T>>,
    B: Future<Output = Option<T>>,
{
    match future::select(pin!(a), pin!(b)).await {
        Either::Left((Some(value), _)) | Either::Right((Some(value), _)) => Some(value),
        Either::Left((None, rest)) => rest.await,
        Either::Right((None, rest)) => rest.await,
    }
}
