//! HCM Inventory Reconciliation
//!
//! Keeps the locally stored inventory of cloud resources convergent with
//! what the cloud vendor actually reports.
//!
//! The cloud listing is the *source* and the local storage is the *target*.
//! Records on both sides are correlated by a cross-system UUID (usually the
//! cloud-native resource id), while the target addresses its records by a
//! separate local id.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Syncer<H, P>                    │
//! │       all_pages / batch_or_all / sweep           │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐ ┌─────────────┐
//! │   Pager (P)   │ │  Handler (H)  │ │    diff()   │
//! │ source/target │ │ query/mutate  │ │ create/upd/ │
//! │    cursors    │ │ per resource  │ │   delete    │
//! └───────────────┘ └───────────────┘ └─────────────┘
//! ```
//!
//! A pager and a handler are implemented once per resource type (CVM
//! instances, disks, elastic IPs, network interfaces, ...).

pub mod data;
pub mod diff;
pub mod error;
pub mod handler;
pub mod pager;
pub mod result;
pub mod syncer;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use data::{SourceData, TargetData};
pub use diff::{DiffResult, diff};
pub use error::{Cursor, Result, SyncError, SyncErrorKind};
pub use handler::Handler;
pub use pager::Pager;
pub use result::{MutationKind, ReconciliationResult, ReconciliationSummary};
pub use syncer::{SyncOptions, Syncer};
