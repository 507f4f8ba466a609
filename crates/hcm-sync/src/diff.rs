//! Source/target partitioning

use crate::data::{SourceData, TargetData};
use std::collections::HashMap;

/// Partition of one batch into the mutations that converge the target
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult<S> {
    /// Source records with no target counterpart
    pub create: Vec<S>,

    /// Changed source records, keyed by the matching target's local id
    pub update: HashMap<String, S>,

    /// Local ids of target records with no source counterpart
    ///
    /// Order follows hash iteration and carries no meaning.
    pub delete: Vec<String>,
}

impl<S> DiffResult<S> {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

impl<S> Default for DiffResult<S> {
    fn default() -> Self {
        Self {
            create: Vec::new(),
            update: HashMap::new(),
            delete: Vec::new(),
        }
    }
}

/// Compare a source listing against a target listing
///
/// Target records are indexed by UUID (a later duplicate replaces an earlier
/// one). Every source record is either created or matched; a matched pair is
/// updated when `is_change` says so. Whatever target records remain
/// unmatched are deleted.
pub fn diff<S, T, F>(source: Vec<S>, target: Vec<T>, is_change: F) -> DiffResult<S>
where
    S: SourceData,
    T: TargetData,
    F: Fn(&S, &T) -> bool,
{
    let mut index: HashMap<String, T> = target
        .into_iter()
        .map(|t| (t.uuid().to_string(), t))
        .collect();

    let mut result = DiffResult::default();
    for s in source {
        match index.remove(s.uuid()) {
            None => result.create.push(s),
            Some(t) => {
                if is_change(&s, &t) {
                    result.update.insert(t.local_id().to_string(), s);
                }
            }
        }
    }

    result.delete = index.into_values().map(|t| t.local_id().to_string()).collect();
    result
}
