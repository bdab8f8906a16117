use leadline::config::{AppConfig, StorageConfig};
use leadline::error::AppError;
use leadline::workflows::contacts::{
    ContactDeskService, ContactStore, MemoryContactStore, SqliteContactStore, StoreError,
};
use leadline::workflows::quality::ContactScorer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type DeskService = ContactDeskService<dyn ContactStore>;

pub(crate) fn open_store(storage: &StorageConfig) -> Result<Arc<dyn ContactStore>, StoreError> {
    let store: Arc<dyn ContactStore> = match &storage.database_path {
        Some(path) => {
            info!(path = %path.display(), "opening sqlite contact store");
            Arc::new(SqliteContactStore::open(path)?)
        }
        None => {
            info!("no database path configured; contacts are kept in memory");
            Arc::new(MemoryContactStore::new())
        }
    };
    Ok(store)
}

/// Wire the configured store and scorer into a desk service with starter advisors.
pub(crate) fn build_desk(config: &AppConfig) -> Result<Arc<DeskService>, AppError> {
    let store = open_store(&config.storage)?;
    let scorer = ContactScorer::from_config(&config.scoring, &config.ai);
    let service = Arc::new(ContactDeskService::new(
        store,
        scorer,
        config.distribution.clone(),
    ));

    let seeded = service.seed_default_advisors()?;
    if !seeded.is_empty() {
        info!(advisors = seeded.len(), "seeded default advisors");
    }
    Ok(service)
}
