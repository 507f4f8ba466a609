//! Per-resource-type query and mutation glue

use crate::data::{SourceData, TargetData};
use async_trait::async_trait;
use std::collections::HashMap;

/// Resource-type specific access to both planes
///
/// One implementation exists per vendor resource type (e.g. TCloud CVM,
/// AWS EBS volume). All target mutations address records by local id and
/// are expected to be atomic per call.
#[async_trait]
pub trait Handler: Send + Sync {
    type Param: Send + Sync;
    type Source: SourceData + Send + Sync;
    type Target: TargetData + Send + Sync;

    /// Resource type name used in logs and errors (e.g. "tcloud-cvm")
    fn name(&self) -> &str;

    async fn query_from_source(&self, param: &Self::Param) -> anyhow::Result<Vec<Self::Source>>;

    async fn query_from_target(&self, param: &Self::Param) -> anyhow::Result<Vec<Self::Target>>;

    /// Whether a matched pair differs and the target must be updated
    fn diff(&self, source: &Self::Source, target: &Self::Target) -> bool;

    async fn delete_target_data(&self, param: &Self::Param, local_ids: &[String]) -> anyhow::Result<()>;

    /// Insert `sources` and return the local ids they were stored under
    async fn create_target_data(
        &self,
        param: &Self::Param,
        sources: Vec<Self::Source>,
    ) -> anyhow::Result<Vec<String>>;

    /// Rewrite target records, keyed by local id
    async fn update_target_data(
        &self,
        param: &Self::Param,
        updates: HashMap<String, Self::Source>,
    ) -> anyhow::Result<()>;
}
