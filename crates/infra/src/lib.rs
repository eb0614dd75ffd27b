//! Infrastructure layer: stores and the operation surface built on them.

pub mod config;
pub mod decisions;
pub mod feedback;
pub mod listing;
pub mod service;
pub mod version_store;

pub use config::Settings;
pub use listing::{Page, TenderFilter};
pub use service::{ProcurementService, Stores};

/// Load [`Settings`] from the environment and install the tracing subscriber they ask for.
pub fn bootstrap() -> anyhow::Result<Settings> {
    let settings = Settings::from_env()?;
    tenderflow_observability::init(settings.log_format);
    tracing::info!(
        quorum_max = settings.quorum.max_threshold,
        rejection = ?settings.quorum.rejection,
        close_tender_on_approval = settings.close_tender_on_approval,
        "tenderflow configured"
    );
    Ok(settings)
}
