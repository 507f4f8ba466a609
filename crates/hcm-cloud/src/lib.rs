//! HCM Cloud operation tracking
//!
//! This crate provides the vendor-agnostic half of the HCM consistency
//! layer: waiting for asynchronous cloud operations to finish.
//!
//! Mutating calls against cloud APIs (create, start, stop, delete, reset)
//! return before the remote resource reaches its final state. Each vendor
//! adaptor supplies a [`PollingHandler`] for the operation it issued, and the
//! [`AsyncOperationPoller`] drives it until the operation is observably done.
//!
//! # Supported Vendors
//!
//! - **TCloud**, **AWS**, **HuaWei**, **GCP**, **Azure** (see [`Vendor`])
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │            vendor adaptor (create VM)            │
//! └─────────────────┬───────────────────────────────┘
//!                   │ ids
//! ┌─────────────────▼───────────────────────────────┐
//! │                   hcm-cloud                      │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        AsyncOperationPoller<H>            │   │
//! │  │  sleep → H::poll → H::done → ...          │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ PollOutcome  │  │ PollerOptions│            │
//! │  └──────────────┘  └──────────────┘            │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod outcome;
pub mod poller;
pub mod vendor;

// Re-exports
pub use error::{PollError, Result};
pub use outcome::PollOutcome;
pub use poller::{AsyncOperationPoller, Completion, PollerOptions, PollingHandler};
pub use vendor::Vendor;
