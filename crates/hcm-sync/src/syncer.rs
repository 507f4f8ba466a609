//! Reconciliation orchestration
//!
//! [`Syncer`] combines a [`Pager`], a [`Handler`] and [`diff`] into three
//! passes:
//!
//! - [`batch_or_all`](Syncer::batch_or_all): reconcile the records selected
//!   by one parameter.
//! - [`remove_deleted_from_source`](Syncer::remove_deleted_from_source):
//!   walk the whole target and delete records the source no longer has.
//! - [`all_pages`](Syncer::all_pages): the sweep followed by a batch per
//!   source page.
//!
//! Every pass fails fast. Nothing computed before the failing step is
//! returned, and re-running the pass is safe because each diff is computed
//! from the current state of both planes.

use crate::data::SourceData;
use crate::diff::{DiffResult, diff};
use crate::error::{Cursor, Result, SyncError};
use crate::handler::Handler;
use crate::pager::Pager;
use crate::result::{MutationKind, ReconciliationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;

/// Syncer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Maximum pages read from each cursor in one pass; `None` is unbounded
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Run the orphan sweep at the start of `all_pages`
    #[serde(default = "default_sweep_orphans")]
    pub sweep_orphans: bool,
}

fn default_sweep_orphans() -> bool {
    true
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            max_pages: None,
            sweep_orphans: default_sweep_orphans(),
        }
    }
}

impl SyncOptions {
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_sweep_orphans(mut self, sweep_orphans: bool) -> Self {
        self.sweep_orphans = sweep_orphans;
        self
    }
}

/// Reconciles one resource type
pub struct Syncer<H, P> {
    handler: H,
    pager: P,
    options: SyncOptions,
    cancel: CancellationToken,
}

impl<H, P> Syncer<H, P>
where
    H: Handler,
    P: Pager<Param = H::Param>,
{
    pub fn new(handler: H, pager: P) -> Self {
        Self {
            handler,
            pager,
            options: SyncOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Abort at the next page or batch boundary once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn pager(&self) -> &P {
        &self.pager
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Reconcile the records selected by `param`
    ///
    /// Both planes are queried with the same parameter. Mutations are
    /// applied in the order delete, update, create so that deletions free
    /// unique keys before anything reuses them.
    pub async fn batch_or_all(&self, param: &H::Param) -> Result<ReconciliationResult> {
        self.check_cancelled()?;
        let resource = self.handler.name();

        let source = self
            .handler
            .query_from_source(param)
            .await
            .map_err(|source| {
                abort(SyncError::QuerySource {
                    resource: resource.to_string(),
                    source,
                })
            })?;
        let target = self
            .handler
            .query_from_target(param)
            .await
            .map_err(|source| {
                abort(SyncError::QueryTarget {
                    resource: resource.to_string(),
                    source,
                })
            })?;

        if source.is_empty() && target.is_empty() {
            tracing::debug!(resource, "Both planes empty, skipping batch");
            return Ok(ReconciliationResult::new());
        }

        let (source_count, target_count) = (source.len(), target.len());
        let DiffResult {
            create,
            update,
            delete,
        } = diff(source, target, |s, t| self.handler.diff(s, t));

        let mut result = ReconciliationResult::new();

        if !delete.is_empty() {
            self.handler
                .delete_target_data(param, &delete)
                .await
                .map_err(|source| mutate_error(resource, MutationKind::Delete, source))?;
            result.delete_ids = delete;
        }

        if !update.is_empty() {
            let update_ids: Vec<String> = update.keys().cloned().collect();
            self.handler
                .update_target_data(param, update)
                .await
                .map_err(|source| mutate_error(resource, MutationKind::Update, source))?;
            result.update_ids = update_ids;
        }

        if !create.is_empty() {
            result.create_ids = self
                .handler
                .create_target_data(param, create)
                .await
                .map_err(|source| mutate_error(resource, MutationKind::Create, source))?;
        }

        tracing::info!(
            resource,
            source = source_count,
            target = target_count,
            created = result.create_ids.len(),
            updated = result.update_ids.len(),
            deleted = result.delete_ids.len(),
            "Synced batch"
        );
        Ok(result)
    }

    /// Delete every target record whose UUID the source no longer reports
    ///
    /// Walks the target cursor only. For each page the source is re-queried
    /// for exactly the page's UUIDs; when it returns fewer records than were
    /// asked for, the missing UUIDs are orphans. Returns the deleted local
    /// ids.
    pub async fn remove_deleted_from_source(&mut self) -> Result<Vec<String>> {
        self.pager.reset();
        let mut deleted = Vec::new();
        let mut pages: u32 = 0;

        while self.pager.has_next_from_target() {
            self.check_cancelled()?;

            let resource = self.handler.name();
            let page = self.pager.next_from_target().await.map_err(|source| {
                abort(SyncError::Pager {
                    resource: resource.to_string(),
                    cursor: Cursor::Target,
                    source,
                })
            })?;
            pages += 1;
            if !self.within_page_limit(Cursor::Target, pages, page.is_empty())? {
                break;
            }
            if page.is_empty() {
                continue;
            }

            let uuids: Vec<String> = page.keys().cloned().collect();
            let param = self.pager.build_param(&uuids);
            let source = self
                .handler
                .query_from_source(&param)
                .await
                .map_err(|source| {
                    abort(SyncError::QuerySource {
                        resource: resource.to_string(),
                        source,
                    })
                })?;
            if source.len() >= uuids.len() {
                continue;
            }

            let present: HashSet<&str> = source.iter().map(|s| s.uuid()).collect();
            let orphans: Vec<String> = page
                .iter()
                .filter(|(uuid, _)| !present.contains(uuid.as_str()))
                .map(|(_, local_id)| local_id.clone())
                .collect();
            if orphans.is_empty() {
                continue;
            }

            tracing::warn!(
                resource,
                page = pages,
                orphans = ?orphans,
                "Removing records deleted from source"
            );
            self.handler
                .delete_target_data(&param, &orphans)
                .await
                .map_err(|source| mutate_error(resource, MutationKind::Delete, source))?;
            deleted.extend(orphans);
        }

        Ok(deleted)
    }

    /// Full sync of the resource type
    ///
    /// Runs the orphan sweep (unless disabled), then reconciles every source
    /// page with [`batch_or_all`](Self::batch_or_all). Orphans removed by the
    /// sweep are reported in `delete_ids` alongside the batch deletions.
    pub async fn all_pages(&mut self) -> Result<ReconciliationResult> {
        self.pager.reset();
        let mut total = ReconciliationResult::new();

        if self.options.sweep_orphans {
            total.delete_ids = self.remove_deleted_from_source().await?;
        }

        let mut pages: u32 = 0;
        while self.pager.has_next_from_source() {
            self.check_cancelled()?;

            let resource = self.handler.name();
            let uuids = self.pager.next_from_source().await.map_err(|source| {
                abort(SyncError::Pager {
                    resource: resource.to_string(),
                    cursor: Cursor::Source,
                    source,
                })
            })?;
            pages += 1;
            if !self.within_page_limit(Cursor::Source, pages, uuids.is_empty())? {
                break;
            }
            if uuids.is_empty() {
                continue;
            }

            let param = self.pager.build_param(&uuids);
            total.merge(self.batch_or_all(&param).await?);
        }

        tracing::info!(
            resource = self.handler.name(),
            pages,
            summary = %total.summary(),
            "Full sync finished"
        );
        Ok(total)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(abort(SyncError::Cancelled {
                resource: self.handler.name().to_string(),
            }));
        }
        Ok(())
    }

    /// `Ok(false)` ends the walk: the page after the last allowed one came
    /// back empty. A non-empty page past the limit is an error.
    fn within_page_limit(&self, cursor: Cursor, pages: u32, empty: bool) -> Result<bool> {
        match self.options.max_pages {
            Some(limit) if pages > limit => {
                if empty {
                    return Ok(false);
                }
                Err(abort(SyncError::PageLimitExceeded {
                    resource: self.handler.name().to_string(),
                    cursor,
                    limit,
                }))
            }
            _ => Ok(true),
        }
    }
}

fn mutate_error(resource: &str, kind: MutationKind, source: anyhow::Error) -> SyncError {
    abort(SyncError::Mutate {
        resource: resource.to_string(),
        kind,
        source,
    })
}

fn abort(err: SyncError) -> SyncError {
    tracing::error!(resource = err.resource(), error = %err, "Sync aborted");
    err
}
