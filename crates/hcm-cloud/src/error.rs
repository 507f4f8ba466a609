//! Poller error types

use crate::vendor::Vendor;
use thiserror::Error;

/// Errors that end a [`poll_until_done`](crate::AsyncOperationPoller::poll_until_done) call
///
/// None of these occur with default [`PollerOptions`](crate::PollerOptions)
/// unless the cancellation token fires. Per-resource failures are reported
/// through the outcome, not through this type.
///
/// `last_outcome` is the most recent partial classification a pending poll
/// reported, if any.
#[derive(Error, Debug)]
pub enum PollError<O = ()> {
    #[error("{vendor}: polling cancelled after {attempts} attempt(s)")]
    Cancelled {
        vendor: Vendor,
        attempts: u32,
        last_outcome: Option<O>,
    },

    #[error("{vendor}: operation not done after {attempts} attempt(s)")]
    AttemptsExhausted {
        vendor: Vendor,
        attempts: u32,
        last_outcome: Option<O>,
    },

    #[error("{vendor}: poll failed on attempt {attempts}: {source}")]
    PollFailed {
        vendor: Vendor,
        attempts: u32,
        last_outcome: Option<O>,
        #[source]
        source: anyhow::Error,
    },
}

impl<O> PollError<O> {
    /// Number of `poll` invocations made before the error
    pub fn attempts(&self) -> u32 {
        match self {
            PollError::Cancelled { attempts, .. }
            | PollError::AttemptsExhausted { attempts, .. }
            | PollError::PollFailed { attempts, .. } => *attempts,
        }
    }

    pub fn last_outcome(&self) -> Option<&O> {
        match self {
            PollError::Cancelled { last_outcome, .. }
            | PollError::AttemptsExhausted { last_outcome, .. }
            | PollError::PollFailed { last_outcome, .. } => last_outcome.as_ref(),
        }
    }

    pub fn into_last_outcome(self) -> Option<O> {
        match self {
            PollError::Cancelled { last_outcome, .. }
            | PollError::AttemptsExhausted { last_outcome, .. }
            | PollError::PollFailed { last_outcome, .. } => last_outcome,
        }
    }
}

/// Result of a poll, with the outcome type doubling as the partial carried by errors
pub type Result<T, O = T> = std::result::Result<T, PollError<O>>;
