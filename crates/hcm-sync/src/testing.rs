//! In-memory source/target planes for tests
//!
//! [`MemoryInventory`] holds a fake cloud listing and a fake local table.
//! [`MemoryHandler`] and [`MemoryPager`] implement the sync capabilities
//! over it, record every call and can be told to fail a given operation.

use crate::data::{SourceData, TargetData};
use crate::handler::Handler;
use crate::pager::Pager;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::{Arc, Mutex, MutexGuard};

/// Resource as the cloud reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudResource {
    pub uuid: String,
    pub name: String,
    pub state: String,
}

impl CloudResource {
    pub fn new(uuid: impl Into<String>, name: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            state: state.into(),
        }
    }
}

impl SourceData for CloudResource {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}

/// Resource as the local table stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResource {
    pub local_id: String,
    pub uuid: String,
    pub name: String,
    pub state: String,
}

impl SourceData for StoredResource {
    fn uuid(&self) -> &str {
        &self.uuid
    }
}

impl TargetData for StoredResource {
    fn local_id(&self) -> &str {
        &self.local_id
    }
}

/// Query parameter selecting records by UUID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryParam {
    pub uuids: Vec<String>,
}

/// Operation that can be recorded or made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    QuerySource,
    QueryTarget,
    Create,
    Update,
    Delete,
    NextFromSource,
    NextFromTarget,
}

/// One recorded call with the ids it carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub operation: Operation,
    pub ids: Vec<String>,
}

#[derive(Default)]
struct Planes {
    source: BTreeMap<String, CloudResource>,
    target: BTreeMap<String, StoredResource>,
    next_local_id: u64,
    calls: Vec<Call>,
    failures: HashSet<Operation>,
}

/// Shared fake cloud listing and local table
#[derive(Default)]
pub struct MemoryInventory {
    planes: Mutex<Planes>,
}

impl MemoryInventory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Planes> {
        self.planes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn put_source(&self, resource: CloudResource) {
        self.lock().source.insert(resource.uuid.clone(), resource);
    }

    pub fn remove_source(&self, uuid: &str) -> Option<CloudResource> {
        self.lock().source.remove(uuid)
    }

    /// Insert a target row directly, bypassing the handler
    pub fn put_target(&self, local_id: &str, resource: CloudResource) {
        self.lock().target.insert(
            local_id.to_string(),
            StoredResource {
                local_id: local_id.to_string(),
                uuid: resource.uuid,
                name: resource.name,
                state: resource.state,
            },
        );
    }

    pub fn source(&self) -> Vec<CloudResource> {
        self.lock().source.values().cloned().collect()
    }

    /// Target rows ordered by local id
    pub fn target(&self) -> Vec<StoredResource> {
        self.lock().target.values().cloned().collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Calls of a single operation kind
    pub fn calls_of(&self, operation: Operation) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Make every further `operation` fail
    pub fn fail_on(&self, operation: Operation) {
        self.lock().failures.insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.lock().failures.remove(&operation);
    }

    /// True when both planes hold the same UUIDs with the same content
    pub fn is_converged(&self) -> bool {
        let planes = self.lock();
        let target: HashMap<&str, &StoredResource> = planes
            .target
            .values()
            .map(|t| (t.uuid.as_str(), t))
            .collect();
        target.len() == planes.target.len()
            && target.len() == planes.source.len()
            && planes.source.values().all(|s| {
                target
                    .get(s.uuid.as_str())
                    .is_some_and(|t| t.name == s.name && t.state == s.state)
            })
    }

    fn record(planes: &mut Planes, operation: Operation, ids: Vec<String>) -> anyhow::Result<()> {
        planes.calls.push(Call { operation, ids });
        if planes.failures.contains(&operation) {
            anyhow::bail!("injected {:?} failure", operation);
        }
        Ok(())
    }
}

/// [`Handler`] over a [`MemoryInventory`]
pub struct MemoryHandler {
    name: String,
    inventory: Arc<MemoryInventory>,
}

impl MemoryHandler {
    pub fn new(name: impl Into<String>, inventory: Arc<MemoryInventory>) -> Self {
        Self {
            name: name.into(),
            inventory,
        }
    }
}

#[async_trait]
impl Handler for MemoryHandler {
    type Param = MemoryParam;
    type Source = CloudResource;
    type Target = StoredResource;

    fn name(&self) -> &str {
        &self.name
    }

    async fn query_from_source(&self, param: &MemoryParam) -> anyhow::Result<Vec<CloudResource>> {
        let mut planes = self.inventory.lock();
        MemoryInventory::record(&mut planes, Operation::QuerySource, param.uuids.clone())?;
        Ok(param
            .uuids
            .iter()
            .filter_map(|uuid| planes.source.get(uuid).cloned())
            .collect())
    }

    async fn query_from_target(&self, param: &MemoryParam) -> anyhow::Result<Vec<StoredResource>> {
        let mut planes = self.inventory.lock();
        MemoryInventory::record(&mut planes, Operation::QueryTarget, param.uuids.clone())?;
        let wanted: HashSet<&str> = param.uuids.iter().map(String::as_str).collect();
        Ok(planes
            .target
            .values()
            .filter(|t| wanted.contains(t.uuid.as_str()))
            .cloned()
            .collect())
    }

    fn diff(&self, source: &CloudResource, target: &StoredResource) -> bool {
        source.name != target.name || source.state != target.state
    }

    async fn delete_target_data(&self, _param: &MemoryParam, local_ids: &[String]) -> anyhow::Result<()> {
        let mut planes = self.inventory.lock();
        MemoryInventory::record(&mut planes, Operation::Delete, local_ids.to_vec())?;
        for id in local_ids {
            planes.target.remove(id);
        }
        Ok(())
    }

    async fn create_target_data(
        &self,
        _param: &MemoryParam,
        sources: Vec<CloudResource>,
    ) -> anyhow::Result<Vec<String>> {
        let mut planes = self.inventory.lock();
        let uuids = sources.iter().map(|s| s.uuid.clone()).collect();
        MemoryInventory::record(&mut planes, Operation::Create, uuids)?;

        let mut created = Vec::with_capacity(sources.len());
        for source in sources {
            planes.next_local_id += 1;
            let local_id = format!("{:08}", planes.next_local_id);
            planes.target.insert(
                local_id.clone(),
                StoredResource {
                    local_id: local_id.clone(),
                    uuid: source.uuid,
                    name: source.name,
                    state: source.state,
                },
            );
            created.push(local_id);
        }
        Ok(created)
    }

    async fn update_target_data(
        &self,
        _param: &MemoryParam,
        updates: HashMap<String, CloudResource>,
    ) -> anyhow::Result<()> {
        let mut planes = self.inventory.lock();
        let mut ids: Vec<String> = updates.keys().cloned().collect();
        ids.sort();
        MemoryInventory::record(&mut planes, Operation::Update, ids)?;

        for (local_id, source) in updates {
            match planes.target.get_mut(&local_id) {
                Some(row) => {
                    row.name = source.name;
                    row.state = source.state;
                }
                None => anyhow::bail!("record {} not found", local_id),
            }
        }
        Ok(())
    }
}

/// Keyset [`Pager`] over a [`MemoryInventory`]
///
/// The source cursor walks UUIDs in order, the target cursor walks local
/// ids in order. Cursors resume after the last key they returned, so rows
/// deleted mid-walk do not shift later pages.
pub struct MemoryPager {
    inventory: Arc<MemoryInventory>,
    page_size: usize,
    source_after: Option<String>,
    source_done: bool,
    target_after: Option<String>,
    target_done: bool,
}

impl MemoryPager {
    pub fn new(inventory: Arc<MemoryInventory>, page_size: usize) -> Self {
        Self {
            inventory,
            page_size: page_size.max(1),
            source_after: None,
            source_done: false,
            target_after: None,
            target_done: false,
        }
    }

    fn lower_bound(after: &Option<String>) -> Bound<&str> {
        match after {
            Some(key) => Bound::Excluded(key.as_str()),
            None => Bound::Unbounded,
        }
    }
}

#[async_trait]
impl Pager for MemoryPager {
    type Param = MemoryParam;

    fn build_param(&self, uuids: &[String]) -> MemoryParam {
        MemoryParam {
            uuids: uuids.to_vec(),
        }
    }

    async fn next_from_source(&mut self) -> anyhow::Result<Vec<String>> {
        let page: Vec<String> = {
            let mut planes = self.inventory.lock();
            MemoryInventory::record(&mut planes, Operation::NextFromSource, Vec::new())?;
            planes
                .source
                .range::<str, _>((Self::lower_bound(&self.source_after), Bound::Unbounded))
                .take(self.page_size)
                .map(|(uuid, _)| uuid.clone())
                .collect()
        };

        self.source_done = page.len() < self.page_size;
        if let Some(last) = page.last() {
            self.source_after = Some(last.clone());
        }
        Ok(page)
    }

    fn has_next_from_source(&self) -> bool {
        !self.source_done
    }

    async fn next_from_target(&mut self) -> anyhow::Result<HashMap<String, String>> {
        let rows: Vec<(String, String)> = {
            let mut planes = self.inventory.lock();
            MemoryInventory::record(&mut planes, Operation::NextFromTarget, Vec::new())?;
            planes
                .target
                .range::<str, _>((Self::lower_bound(&self.target_after), Bound::Unbounded))
                .take(self.page_size)
                .map(|(local_id, row)| (local_id.clone(), row.uuid.clone()))
                .collect()
        };

        self.target_done = rows.len() < self.page_size;
        if let Some((last, _)) = rows.last() {
            self.target_after = Some(last.clone());
        }
        Ok(rows
            .into_iter()
            .map(|(local_id, uuid)| (uuid, local_id))
            .collect())
    }

    fn has_next_from_target(&self) -> bool {
        !self.target_done
    }

    fn reset(&mut self) {
        self.source_after = None;
        self.source_done = false;
        self.target_after = None;
        self.target_done = false;
    }
}
