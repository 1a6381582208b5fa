use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lumen_core::broadcast::UpdatesChannel;
use lumen_core::client::SubscriptionManager;
use lumen_core::content::{EntityKind, EntitySnapshot, SyncAction};
use lumen_core::sync::{
    spawn_sync_worker, SnapshotProviderTrait, SyncAdminService, SyncDispatcher, SyncLedgerTrait,
    SyncOrchestrator, SyncRequest,
};
use lumen_realtime::{RealtimeDbClient, RealtimeLiveSource, RealtimeStoreAdapter};
use lumen_storage_sqlite::{
    bundles::BundleRepository,
    contact::ContactRepository,
    db::{self, write_actor},
    gallery::GalleryRepository,
    portfolio::PortfolioRepository,
    sync::SyncRepository,
};

use crate::config::Config;

pub struct AppState {
    pub portfolio_repository: Arc<PortfolioRepository>,
    pub gallery_repository: Arc<GalleryRepository>,
    pub bundle_repository: Arc<BundleRepository>,
    pub contact_repository: Arc<ContactRepository>,
    pub sync_admin_service: Arc<SyncAdminService>,
    pub dispatcher: SyncDispatcher,
    pub updates: UpdatesChannel,
    pub subscription_manager: Arc<SubscriptionManager>,
    pub db_path: String,
}

impl AppState {
    /// Hands a freshly-written row to the sync subsystem, without awaiting.
    ///
    /// A snapshot that cannot even be serialized is a sync-side problem; it
    /// is logged and must never fail the HTTP response already produced for
    /// the mutation.
    pub fn dispatch_entity_sync(
        &self,
        kind: EntityKind,
        action: SyncAction,
        snapshot: lumen_core::Result<EntitySnapshot>,
    ) {
        match snapshot {
            Ok(snapshot) => self
                .dispatcher
                .dispatch(SyncRequest::new(kind, action, snapshot, None)),
            Err(err) => tracing::error!("failed to snapshot {} row for sync: {}", kind, err),
        }
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("LUMEN_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    // Ensure DATABASE_URL aligns with LUMEN_DB_PATH so storage picks the right file
    std::env::set_var("DATABASE_URL", &config.db_path);
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));
    let gallery_repository = Arc::new(GalleryRepository::new(pool.clone(), writer.clone()));
    let bundle_repository = Arc::new(BundleRepository::new(pool.clone(), writer.clone()));
    let contact_repository = Arc::new(ContactRepository::new(pool.clone(), writer.clone()));
    let sync_repository = Arc::new(SyncRepository::new(pool.clone(), writer.clone()));

    // Secondary store client - constructed once here, injected everywhere.
    let realtime_client = RealtimeDbClient::new(
        &config.realtime_url,
        &config.realtime_namespace,
        config.realtime_auth.clone(),
    )
    .map_err(anyhow::Error::new)?;
    let adapter = Arc::new(RealtimeStoreAdapter::new(realtime_client.clone()));

    let updates = UpdatesChannel::new();
    let orchestrator = Arc::new(SyncOrchestrator::new(
        adapter,
        sync_repository.clone() as Arc<dyn SyncLedgerTrait>,
        updates.clone(),
    ));
    let dispatcher = spawn_sync_worker(orchestrator.clone());

    let sync_admin_service = Arc::new(SyncAdminService::new(
        orchestrator,
        sync_repository.clone() as Arc<dyn SnapshotProviderTrait>,
        sync_repository.clone() as Arc<dyn SyncLedgerTrait>,
    ));

    // Server-side subscriber feeding the admin activity feed.
    let live_source = Arc::new(RealtimeLiveSource::new(realtime_client));
    let subscription_manager = SubscriptionManager::new(&updates, live_source);

    Ok(Arc::new(AppState {
        portfolio_repository,
        gallery_repository,
        bundle_repository,
        contact_repository,
        sync_admin_service,
        dispatcher,
        updates,
        subscription_manager,
        db_path,
    }))
}
