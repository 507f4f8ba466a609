//! Reconciliation results

use serde::{Deserialize, Serialize};

/// Kind of mutation applied to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Insert records that exist only in the source
    Create,
    /// Rewrite matched records whose content changed
    Update,
    /// Remove records that no longer exist in the source
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationKind::Create => write!(f, "create"),
            MutationKind::Update => write!(f, "update"),
            MutationKind::Delete => write!(f, "delete"),
        }
    }
}

/// Local ids touched by one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    /// Local ids of newly created target records
    pub create_ids: Vec<String>,

    /// Local ids of updated target records
    pub update_ids: Vec<String>,

    /// Local ids of deleted target records
    pub delete_ids: Vec<String>,
}

impl ReconciliationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.create_ids.is_empty() && self.update_ids.is_empty() && self.delete_ids.is_empty()
    }

    /// Append every id set of `other`
    pub fn merge(&mut self, other: ReconciliationResult) {
        self.create_ids.extend(other.create_ids);
        self.update_ids.extend(other.update_ids);
        self.delete_ids.extend(other.delete_ids);
    }

    /// Ids recorded for one mutation kind
    pub fn ids(&self, kind: MutationKind) -> &[String] {
        match kind {
            MutationKind::Create => &self.create_ids,
            MutationKind::Update => &self.update_ids,
            MutationKind::Delete => &self.delete_ids,
        }
    }

    pub fn summary(&self) -> ReconciliationSummary {
        ReconciliationSummary {
            created: self.create_ids.len(),
            updated: self.update_ids.len(),
            deleted: self.delete_ids.len(),
        }
    }
}

/// Counts of a [`ReconciliationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl std::fmt::Display for ReconciliationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted",
            self.created, self.updated, self.deleted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_appends_all_sets() {
        let mut total = ReconciliationResult::new();
        total.merge(ReconciliationResult {
            create_ids: strings(&["1"]),
            update_ids: vec![],
            delete_ids: strings(&["9"]),
        });
        total.merge(ReconciliationResult {
            create_ids: strings(&["2"]),
            update_ids: strings(&["5"]),
            delete_ids: vec![],
        });

        assert_eq!(total.ids(MutationKind::Create), strings(&["1", "2"]));
        assert_eq!(total.ids(MutationKind::Update), strings(&["5"]));
        assert_eq!(total.ids(MutationKind::Delete), strings(&["9"]));
        assert_eq!(total.summary().to_string(), "2 created, 1 updated, 1 deleted");
    }

    #[test]
    fn test_empty_result() {
        let result = ReconciliationResult::new();
        assert!(result.is_empty());
        assert_eq!(result.summary().to_string(), "0 created, 0 updated, 0 deleted");
    }

    #[test]
    fn test_mutation_kind_serde() {
        assert_eq!(
            serde_json::to_string(&MutationKind::Delete).unwrap(),
            "\"delete\""
        );
        assert_eq!(MutationKind::Update.to_string(), "update");
    }
}
