use hcm_sync::Syncer;
use hcm_sync::testing::{CloudResource, MemoryHandler, MemoryInventory, MemoryPager};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

/// Route sync logs to the test harness; filter with RUST_LOG
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn instance(uuid: &str, name: &str, state: &str) -> CloudResource {
    CloudResource::new(uuid, name, state)
}

/// Fill the cloud side with `count` running instances ins-000 .. ins-NNN
pub fn seed_cloud(inventory: &MemoryInventory, count: usize) {
    for i in 0..count {
        let uuid = format!("ins-{:03}", i);
        inventory.put_source(instance(&uuid, &format!("web-{:03}", i), "RUNNING"));
    }
}

/// A syncer with a fresh pager over `inventory`
pub fn cvm_syncer(
    inventory: &Arc<MemoryInventory>,
    page_size: usize,
) -> Syncer<MemoryHandler, MemoryPager> {
    Syncer::new(
        MemoryHandler::new("tcloud-cvm", inventory.clone()),
        MemoryPager::new(inventory.clone(), page_size),
    )
}
