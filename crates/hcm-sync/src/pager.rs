//! Cursor abstraction over the source and target listings

use async_trait::async_trait;
use std::collections::HashMap;

/// Independent page cursors over the source and the target
///
/// The cloud side usually paginates with vendor tokens and the local side
/// with offsets, so the two cursors advance separately. The target cursor
/// drives the orphan sweep; the source cursor drives discovery of new and
/// changed resources.
///
/// `has_next_from_*` is consulted before every fetch, so it must return
/// `true` for a fresh cursor that still has anything to read.
#[async_trait]
pub trait Pager: Send {
    /// Query parameter understood by the matching [`Handler`](crate::Handler)
    type Param: Send + Sync;

    /// Build a parameter that selects exactly `uuids` on either side
    fn build_param(&self, uuids: &[String]) -> Self::Param;

    /// Next page of source UUIDs
    async fn next_from_source(&mut self) -> anyhow::Result<Vec<String>>;

    fn has_next_from_source(&self) -> bool;

    /// Next page of target records as UUID → local id
    async fn next_from_target(&mut self) -> anyhow::Result<HashMap<String, String>>;

    fn has_next_from_target(&self) -> bool;

    /// Rewind both cursors to the first page
    ///
    /// Called at the start of every pass so one pager serves repeated runs.
    fn reset(&mut self);
}
