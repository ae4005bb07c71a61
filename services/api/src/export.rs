use crate::infra::{open_store, parse_record_kind};
use clap::Args;
use leaddesk::config::AppConfig;
use leaddesk::dashboard::{Dashboard, Section, StatusFilter};
use leaddesk::error::AppError;
use leaddesk::records::RecordKind;
use leaddesk::telemetry;
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Section to export: applications, projects, messages or jobs
    #[arg(long, value_parser = parse_record_kind)]
    pub(crate) kind: RecordKind,
    /// Status filter applied by the store (defaults to all)
    #[arg(long, default_value = "all")]
    pub(crate) status: String,
    /// Free-text search applied to the loaded records
    #[arg(long, default_value = "")]
    pub(crate) search: String,
    /// JSON seed file for the document store (overrides APP_STORE_SEED)
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Directory the CSV file is written to
    #[arg(long, default_value = ".")]
    pub(crate) out_dir: PathBuf,
}

pub(crate) async fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let store = open_store(&config.store, args.seed.as_deref())?;
    let dashboard = Dashboard::new(store, &config.dashboard);
    let password = config
        .dashboard
        .credentials
        .password
        .clone()
        .unwrap_or_default();

    let loads = dashboard
        .login(&config.dashboard.credentials.username, &password)
        .await?;
    for failure in loads.failures() {
        warn!(kind = ?failure.kind, error = ?failure.error, "section failed to load");
    }

    dashboard.select_section(Section::for_kind(args.kind))?;
    dashboard.set_search(&args.search)?;
    dashboard
        .set_status_filter(StatusFilter::from(args.status))
        .await?;

    let export = dashboard.export(args.kind)?;
    tokio::fs::create_dir_all(&args.out_dir).await?;
    let path = args.out_dir.join(&export.filename);
    tokio::fs::write(&path, export.body.as_bytes()).await?;

    println!(
        "Exported {} {} to {}",
        export.row_count(),
        args.kind.label(),
        path.display()
    );
    dashboard.logout();
    Ok(())
}
