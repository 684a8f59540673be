use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::rest::auth::AuthState;
use crate::api::rest::routes;
use crate::config::RideHubConfig;
use crate::domain::service::{AppServices, Integrations, ServiceConfig};
use crate::infra::assets::{BrandLookupClient, CloudinaryClient};
use crate::infra::storage::SeaRepository;
use crate::infra::storage::db::connect;
use crate::infra::storage::migrations::Migrator;
use crate::infra::strava::StravaHttpClient;

/// Concrete services over the `SeaORM` repositories.
/// Lives in the composition root to keep infra types out of the domain.
pub type Services = AppServices<SeaRepository>;

/// Database settings the module needs from the host.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Fully wired application: services, auth and the background sync schedule.
pub struct RideHub {
    services: Arc<Services>,
    auth: AuthState,
    sync_interval: Option<Duration>,
}

impl RideHub {
    /// Connect, migrate and wire the HTTP clients from config.
    pub async fn init(cfg: &RideHubConfig, database: &DatabaseSettings) -> anyhow::Result<Self> {
        info!("Initializing ridehub");
        debug!(
            "Loaded ridehub config: default_page_size={}, max_page_size={}, max_recurrence_occurrences={}",
            cfg.default_page_size, cfg.max_page_size, cfg.max_recurrence_occurrences
        );

        let db = connect(&database.url, database.max_connections)
            .await
            .context("failed to connect to the database")?;
        migrate(&db).await?;

        let integrations = Integrations {
            strava: Arc::new(StravaHttpClient::new(&cfg.strava)?),
            images: Arc::new(CloudinaryClient::new(&cfg.cloudinary)?),
            brands: Arc::new(BrandLookupClient::new(&cfg.brands)?),
            strava_state_secret: cfg.strava.state_secret.clone(),
        };
        Self::from_parts(db, cfg, integrations)
    }

    /// Wire an already migrated connection with the given integrations.
    pub fn from_parts(
        db: DatabaseConnection,
        cfg: &RideHubConfig,
        integrations: Integrations,
    ) -> anyhow::Result<Self> {
        let auth = AuthState::from_config(&cfg.auth)?;
        let services = Arc::new(AppServices::new(
            SeaRepository,
            db,
            integrations,
            ServiceConfig::from(cfg),
        ));
        let sync_interval = (cfg.strava.sync_interval_secs > 0)
            .then(|| Duration::from_secs(cfg.strava.sync_interval_secs));
        Ok(Self {
            services,
            auth,
            sync_interval,
        })
    }

    pub fn services(&self) -> Arc<Services> {
        Arc::clone(&self.services)
    }

    pub fn router(&self) -> axum::Router {
        info!("Registering ridehub REST routes");
        routes::register_routes(axum::Router::new(), self.services(), self.auth.clone())
    }

    /// Start the periodic Strava sync when an interval is configured.
    pub fn spawn_periodic_sync(&self, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        let every = self.sync_interval?;
        let strava = Arc::clone(&self.services.strava);
        Some(tokio::spawn(strava.run_periodic(every, cancel)))
    }
}

pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("Running ridehub database migrations");
    Migrator::up(db, None)
        .await
        .context("database migration failed")?;
    info!("Database migrations completed successfully");
    Ok(())
}
