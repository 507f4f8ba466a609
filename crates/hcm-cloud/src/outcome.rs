//! Per-resource classification of an asynchronous operation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Outcome of a batch operation, classified per resource
///
/// An id lives in at most one of the three sets. The mutators move an id
/// out of the other sets before inserting it, so a resource that was
/// reported unknown on one poll and succeeded on the next ends up only in
/// `success_ids`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOutcome {
    /// Resources whose operation finished successfully
    pub success_ids: BTreeSet<String>,

    /// Resources whose operation failed
    pub failed_ids: BTreeSet<String>,

    /// Resources whose final state could not be determined
    pub unknown_ids: BTreeSet<String>,

    /// Message of the most recent failure
    pub failed_message: String,
}

impl PollOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as succeeded
    pub fn succeed(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.failed_ids.remove(&id);
        self.unknown_ids.remove(&id);
        self.success_ids.insert(id);
    }

    /// Mark `id` as failed; `message` replaces any earlier failure message
    pub fn fail(&mut self, id: impl Into<String>, message: impl Into<String>) {
        let id = id.into();
        self.success_ids.remove(&id);
        self.unknown_ids.remove(&id);
        self.failed_ids.insert(id);
        self.failed_message = message.into();
    }

    /// Mark `id` as unknown
    pub fn unknown(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.success_ids.remove(&id);
        self.failed_ids.remove(&id);
        self.unknown_ids.insert(id);
    }

    pub fn with_success(mut self, id: impl Into<String>) -> Self {
        self.succeed(id);
        self
    }

    pub fn with_failure(mut self, id: impl Into<String>, message: impl Into<String>) -> Self {
        self.fail(id, message);
        self
    }

    pub fn with_unknown(mut self, id: impl Into<String>) -> Self {
        self.unknown(id);
        self
    }

    /// True when nothing failed and nothing is unknown
    pub fn is_success(&self) -> bool {
        self.failed_ids.is_empty() && self.unknown_ids.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of classified resources
    pub fn total(&self) -> usize {
        self.success_ids.len() + self.failed_ids.len() + self.unknown_ids.len()
    }
}

impl std::fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} succeeded, {} failed, {} unknown",
            self.success_ids.len(),
            self.failed_ids.len(),
            self.unknown_ids.len()
        )?;
        if !self.failed_message.is_empty() {
            write!(f, " (last failure: {})", self.failed_message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reclassification_keeps_sets_disjoint() {
        let mut outcome = PollOutcome::new().with_unknown("ins-1").with_unknown("ins-2");
        outcome.succeed("ins-1");
        outcome.fail("ins-2", "quota exceeded");

        assert!(outcome.unknown_ids.is_empty());
        assert!(outcome.success_ids.contains("ins-1"));
        assert!(outcome.failed_ids.contains("ins-2"));
        assert_eq!(outcome.total(), 2);
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_last_failure_message_wins() {
        let outcome = PollOutcome::new()
            .with_failure("disk-1", "first")
            .with_failure("disk-2", "second");

        assert_eq!(outcome.failed_message, "second");
        assert_eq!(outcome.failed_ids.len(), 2);
    }

    #[test]
    fn test_display_summary() {
        let outcome = PollOutcome::new()
            .with_success("a")
            .with_success("b")
            .with_failure("c", "ResourceInsufficient");

        assert_eq!(
            outcome.to_string(),
            "2 succeeded, 1 failed, 0 unknown (last failure: ResourceInsufficient)"
        );
    }

    #[test]
    fn test_json_field_names() {
        let outcome = PollOutcome::new().with_success("eip-1");
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["success_ids"], serde_json::json!(["eip-1"]));
        assert_eq!(value["failed_ids"], serde_json::json!([]));
        assert_eq!(value["unknown_ids"], serde_json::json!([]));
        assert_eq!(value["failed_message"], serde_json::json!(""));
    }
}
