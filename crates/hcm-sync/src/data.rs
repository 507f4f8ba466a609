//! Identity of synchronized records

/// A record as reported by the source (cloud) side
pub trait SourceData {
    /// Cross-system natural key, e.g. the cloud resource id
    fn uuid(&self) -> &str;
}

/// A record as persisted on the target (local storage) side
///
/// The local id is the storage primary key and may differ from the UUID
/// when storage uses a surrogate key. Mutations of target records are
/// always addressed by local id.
pub trait TargetData: SourceData {
    fn local_id(&self) -> &str;
}
