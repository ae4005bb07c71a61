use leaddesk::config::StoreConfig;
use leaddesk::dashboard::Section;
use leaddesk::error::AppError;
use leaddesk::records::RecordKind;
use leaddesk::store::MemoryStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Open the in-memory store, seeded from `override_path` or the configured file.
pub(crate) fn open_store(
    config: &StoreConfig,
    override_path: Option<&Path>,
) -> Result<Arc<MemoryStore>, AppError> {
    let seed = override_path.or(config.seed_path.as_deref());
    let store = match seed {
        Some(path) => {
            let store = MemoryStore::from_seed_path(path)?;
            info!(seed = %path.display(), "document store seeded");
            store
        }
        None => MemoryStore::new(),
    };
    Ok(Arc::new(store))
}

pub(crate) fn parse_record_kind(raw: &str) -> Result<RecordKind, String> {
    Section::parse(raw)
        .and_then(Section::record_kind)
        .ok_or_else(|| {
            format!("unknown section '{raw}' (expected applications, projects, messages or jobs)")
        })
}
