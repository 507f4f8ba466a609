//! Reconciliation error types

use crate::result::MutationKind;
use thiserror::Error;

/// Which pager cursor an error or limit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Source,
    Target,
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cursor::Source => write!(f, "source"),
            Cursor::Target => write!(f, "target"),
        }
    }
}

/// Errors that abort a reconciliation pass
///
/// `resource` is the [`Handler::name`](crate::Handler::name) of the resource
/// type being synchronized.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{resource}: query from source failed: {source}")]
    QuerySource {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{resource}: query from target failed: {source}")]
    QueryTarget {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{resource}: {kind} target data failed: {source}")]
    Mutate {
        resource: String,
        kind: MutationKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("{resource}: next page from {cursor} failed: {source}")]
    Pager {
        resource: String,
        cursor: Cursor,
        #[source]
        source: anyhow::Error,
    },

    #[error("{resource}: sync cancelled")]
    Cancelled { resource: String },

    #[error("{resource}: more than {limit} {cursor} pages")]
    PageLimitExceeded {
        resource: String,
        cursor: Cursor,
        limit: u32,
    },
}

/// Fieldless discriminant of [`SyncError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncErrorKind {
    QuerySourceFailed,
    QueryTargetFailed,
    MutateFailed,
    PagerFailed,
    Cancelled,
    PageLimitExceeded,
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::QuerySource { .. } => SyncErrorKind::QuerySourceFailed,
            SyncError::QueryTarget { .. } => SyncErrorKind::QueryTargetFailed,
            SyncError::Mutate { .. } => SyncErrorKind::MutateFailed,
            SyncError::Pager { .. } => SyncErrorKind::PagerFailed,
            SyncError::Cancelled { .. } => SyncErrorKind::Cancelled,
            SyncError::PageLimitExceeded { .. } => SyncErrorKind::PageLimitExceeded,
        }
    }

    pub fn resource(&self) -> &str {
        match self {
            SyncError::QuerySource { resource, .. }
            | SyncError::QueryTarget { resource, .. }
            | SyncError::Mutate { resource, .. }
            | SyncError::Pager { resource, .. }
            | SyncError::Cancelled { resource }
            | SyncError::PageLimitExceeded { resource, .. } => resource,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
