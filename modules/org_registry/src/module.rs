//! Module declaration and lifecycle: connect, migrate, wire, expose

use crate::config::Config;
use crate::contract::OrganizationRegistryApi;
use crate::domain::{Service, TracingProgressReporter};
use crate::infra::storage::{
    Migrator, SeaOrmDocumentRepository, SeaOrmMemberRepository, SeaOrmNormalizationStore,
    SeaOrmOrganizationRepository,
};
use anyhow::{Context, Result};
use parking_lot::RwLock;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

/// Organization registry module
pub struct OrgRegistryModule {
    config: RwLock<Config>,
    db: RwLock<Option<Arc<DatabaseConnection>>>,
    service: RwLock<Option<Arc<Service>>>,
}

impl Default for OrgRegistryModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            db: RwLock::new(None),
            service: RwLock::new(None),
        }
    }
}

impl OrgRegistryModule {
    /// Connect to the configured database and wire the service
    pub async fn init(&self, config: Config) -> Result<()> {
        let mut options = ConnectOptions::new(config.database_url.clone());
        options
            .max_connections(config.max_connections)
            .sqlx_logging(false);
        let conn = Database::connect(options)
            .await
            .with_context(|| format!("connecting to {}", redact(&config.database_url)))?;

        self.init_with_connection(config, conn).await
    }

    /// Wire the service over an existing connection
    pub async fn init_with_connection(&self, config: Config, conn: DatabaseConnection) -> Result<()> {
        let conn = Arc::new(conn);
        *self.db.write() = Some(conn.clone());
        let run_schema_migrations = config.run_schema_migrations;
        *self.config.write() = config;

        if run_schema_migrations {
            self.migrate().await?;
        }

        // Build repositories
        let organizations = Arc::new(SeaOrmOrganizationRepository::new(conn.clone()));
        let members = Arc::new(SeaOrmMemberRepository::new(conn.clone()));
        let documents = Arc::new(SeaOrmDocumentRepository::new(conn.clone()));
        let store = Arc::new(SeaOrmNormalizationStore::new(conn));

        // Build domain service
        let service = Arc::new(Service::new(
            organizations,
            members,
            documents,
            store,
            Arc::new(TracingProgressReporter),
        ));
        *self.service.write() = Some(service);

        tracing::info!("Organization registry initialized");
        Ok(())
    }

    /// Apply pending schema migrations
    pub async fn migrate(&self) -> Result<()> {
        let conn = self
            .db
            .read()
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Database not connected"))?
            .clone();

        Migrator::up(&*conn, None).await?;
        tracing::info!("Organization registry migrations completed");
        Ok(())
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn service(&self) -> Result<Arc<Service>> {
        self.service
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))
    }

    /// In-process client for downstream consumers
    pub fn client(&self) -> Result<Arc<dyn OrganizationRegistryApi>> {
        let service = self.service()?;
        Ok(Arc::new(crate::api::native::NativeClient::new(service)))
    }

    /// Mount the REST routes onto `router`
    pub fn register_rest(&self, router: axum::Router) -> Result<axum::Router> {
        let service = self.service()?;

        tracing::info!("Registering organization registry REST routes");
        crate::api::rest::routes::register_routes(router, service)
    }
}

/// Connection string without credentials, for logs and errors
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => {
            format!("{}://***{}", &url[..scheme], &url[at..])
        }
        _ => url.to_string(),
    }
}
