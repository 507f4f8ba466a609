//! Asynchronous operation poller
//!
//! Cloud APIs acknowledge a mutating call long before the resource settles.
//! [`AsyncOperationPoller`] keeps asking the vendor for the current state of
//! the targeted resources until the vendor-specific [`PollingHandler`] says
//! the operation is done.

use crate::error::{PollError, Result};
use crate::vendor::Vendor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Vendor-supplied polling capability
///
/// Implemented once per vendor and operation kind, e.g. "wait for CVM
/// instances to become RUNNING" or "wait for a HuaWei async job's sub jobs".
#[async_trait]
pub trait PollingHandler: Send + Sync {
    /// Vendor client handle, owned by the caller and only read here
    type Client: Send + Sync;

    /// Raw remote state returned by one poll
    type PollResult: Send;

    /// Classified result handed back to the caller
    type Outcome: Send;

    /// Fetch the current remote state of `ids`
    ///
    /// Errors are treated as transient unless the poller is configured with
    /// `abort_on_error`.
    async fn poll(&self, client: &Self::Client, ids: &[String]) -> anyhow::Result<Self::PollResult>;

    /// Decide whether the operation has finished
    fn done(&self, result: &Self::PollResult) -> Completion<Self::Outcome>;
}

/// Verdict of [`PollingHandler::done`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion<O> {
    /// Still running; may carry a partial classification
    Pending(Option<O>),
    /// Finished; the outcome is returned to the caller as is
    Done(O),
}

impl<O> Completion<O> {
    pub fn is_done(&self) -> bool {
        matches!(self, Completion::Done(_))
    }
}

/// Poller configuration
///
/// Defaults poll every second forever and treat every poll error as
/// transient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerOptions {
    /// Delay before each poll (milliseconds)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Maximum number of polls; `None` polls until done or cancelled
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Return the first poll error instead of retrying it
    #[serde(default)]
    pub abort_on_error: bool,
}

fn default_interval_ms() -> u64 {
    1000 // 1s
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_attempts: None,
            abort_on_error: false,
        }
    }
}

impl PollerOptions {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// `Some(0)` behaves like `Some(1)`: the first poll always happens
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_abort_on_error(mut self, abort_on_error: bool) -> Self {
        self.abort_on_error = abort_on_error;
        self
    }
}

/// Drives a [`PollingHandler`] until the operation is done
pub struct AsyncOperationPoller<H> {
    handler: H,
    vendor: Vendor,
    options: PollerOptions,
    cancel: CancellationToken,
}

impl<H: PollingHandler> AsyncOperationPoller<H> {
    pub fn new(vendor: Vendor, handler: H) -> Self {
        Self {
            handler,
            vendor,
            options: PollerOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: PollerOptions) -> Self {
        self.options = options;
        self
    }

    /// Stop polling when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    pub fn options(&self) -> &PollerOptions {
        &self.options
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Poll `ids` until the handler reports the operation done
    ///
    /// Sleeps for the configured interval before every poll, including the
    /// first one. Failures of individual resources are part of the returned
    /// outcome; an `Err` only means polling itself was stopped, and carries
    /// the latest partial outcome reported while pending.
    pub async fn poll_until_done(&self, client: &H::Client, ids: &[String]) -> Result<H::Outcome> {
        let interval = self.options.interval();
        let started = Instant::now();
        let mut attempts: u32 = 0;
        let mut last_outcome: Option<H::Outcome> = None;

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(self.cancelled(attempts, last_outcome));
                }
                _ = sleep(interval) => {}
            }

            attempts += 1;
            tracing::debug!(
                vendor = %self.vendor,
                attempt = attempts,
                ids = ?ids,
                "Polling async operation"
            );

            let polled = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(self.cancelled(attempts, last_outcome));
                }
                polled = self.handler.poll(client, ids) => polled,
            };

            match polled {
                Ok(result) => match self.handler.done(&result) {
                    Completion::Done(outcome) => {
                        tracing::info!(
                            vendor = %self.vendor,
                            attempts,
                            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                            "Async operation done"
                        );
                        return Ok(outcome);
                    }
                    Completion::Pending(partial) => {
                        tracing::debug!(
                            vendor = %self.vendor,
                            attempt = attempts,
                            partial = partial.is_some(),
                            "Async operation still running"
                        );
                        if partial.is_some() {
                            last_outcome = partial;
                        }
                    }
                },
                Err(error) => {
                    if self.options.abort_on_error {
                        return Err(PollError::PollFailed {
                            vendor: self.vendor,
                            attempts,
                            last_outcome,
                            source: error,
                        });
                    }
                    tracing::warn!(
                        vendor = %self.vendor,
                        attempt = attempts,
                        error = %error,
                        "Poll failed, retrying"
                    );
                }
            }

            if let Some(max_attempts) = self.options.max_attempts {
                if attempts >= max_attempts {
                    return Err(PollError::AttemptsExhausted {
                        vendor: self.vendor,
                        attempts,
                        last_outcome,
                    });
                }
            }
        }
    }

    fn cancelled(&self, attempts: u32, last_outcome: Option<H::Outcome>) -> PollError<H::Outcome> {
        tracing::info!(vendor = %self.vendor, attempts, "Polling cancelled");
        PollError::Cancelled {
            vendor: self.vendor,
            attempts,
            last_outcome,
        }
    }
}
