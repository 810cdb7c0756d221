//! Error types for the async combinators
//!
//! Cache lookups never fail (a miss is `None`); only the combinators in
//! [`crate::tasks`] report errors.

use std::time::Duration;

use thiserror::Error;

// == Timeout ==
/// The operation did not finish in time and has been cancelled.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation timed out after {duration:?}")]
pub struct Timeout {
    pub duration: Duration,
}

// == Retry Exhausted ==
/// Every attempt failed; carries the error of the last one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("operation failed after {attempts} attempts: {last_error}")]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E> RetryExhausted<E> {
    pub fn into_inner(self) -> E {
        self.last_error
    }
}

// == Cancelled ==
/// The invocation was superseded or aborted before it ran.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;
