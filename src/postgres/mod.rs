// ABOUTME: PostgreSQL connection management for the problems store
// ABOUTME: Builds the TLS connector and the connection pool shared by sync and serve

pub mod schema;
pub mod store;
pub mod writer;

pub use schema::ensure_schema;
pub use store::PgProblemStore;
pub use writer::ProblemWriter;

use anyhow::{Context, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;

use crate::config::DatabaseConfig;

/// Build the TLS connector used for every PostgreSQL connection.
///
/// Whether TLS is actually negotiated follows the connection's `sslmode`
/// (tokio-postgres defaults to `prefer`).
pub fn make_tls_connector(allow_self_signed_certs: bool) -> Result<MakeTlsConnector> {
    let mut builder = TlsConnector::builder();
    if allow_self_signed_certs {
        tracing::warn!("Accepting invalid TLS certificates for PostgreSQL connections");
        builder.danger_accept_invalid_certs(true);
    }
    let connector = builder.build().context("Failed to build TLS connector")?;
    Ok(MakeTlsConnector::new(connector))
}

/// Build a connection pool without opening any connection.
///
/// The first `pool.get()` is what connects; configuration errors (bad URL,
/// TLS setup) still surface here.
pub fn build_pool(config: &DatabaseConfig) -> Result<Pool> {
    let pg_config = config.to_pg_config()?;
    let tls = make_tls_connector(config.allow_self_signed_certs)?;

    let manager = Manager::from_config(
        pg_config,
        tls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(config.pool_size.max(1))
        .build()
        .context("Failed to build PostgreSQL connection pool")
}

/// Create a connection pool and verify the database is reachable.
///
/// A pool that cannot hand out a connection is never returned, so callers
/// either get a working handle or an error at startup.
pub async fn create_pool(config: &DatabaseConfig) -> Result<Pool> {
    let pool = build_pool(config)?;

    tracing::info!("Connecting to PostgreSQL at {}", config.display_target());
    let client = pool
        .get()
        .await
        .with_context(|| format!("Failed to connect to PostgreSQL at {}", config.display_target()))?;
    drop(client);
    tracing::info!(
        "PostgreSQL connection pool ready (max {} connections)",
        config.pool_size.max(1)
    );

    Ok(pool)
}
