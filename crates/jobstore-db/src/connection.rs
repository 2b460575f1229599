use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions};
use sqlx::Connection;
use std::time::Duration;
use tracing::{info, instrument};

use crate::{Error, Result};

/// Upper bound on concurrently checked-out connections
pub const MAX_POOL_SIZE: u32 = 5;

/// How long an operation waits for a free pooled connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "jobstore".to_string(),
            user: None,
            password: None,
        }
    }
}

impl ConnectionConfig {
    fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name);

        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }

        options
    }
}

/// Owns the pooled connection to the job store.
///
/// Open it once at startup, share it (it is cheap to clone), and close it
/// once at shutdown.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    pool: PgPool,
}

impl ConnectionManager {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, database = %config.name))]
    pub async fn open(config: &ConnectionConfig) -> Result<Self> {
        info!("Initializing database connection");

        let options = config.connect_options();

        // A single direct attempt reports the driver's own failure (refused,
        // unknown host, bad credentials) instead of a pool timeout.
        let first = PgConnection::connect_with(&options)
            .await
            .map_err(connection_failed)?;
        first.close().await.map_err(connection_failed)?;

        let pool = PgPoolOptions::new()
            .max_connections(MAX_POOL_SIZE)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(connection_failed)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the jobs table and its indexes if they do not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id BIGSERIAL PRIMARY KEY,
                document JSONB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_uid ON jobs ((document->>'uid'))")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_jobs_since ON jobs (((document->>'since')::double precision) DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn close(self) {
        info!("Closing database connection");
        self.pool.close().await;
    }
}

fn connection_failed(err: sqlx::Error) -> Error {
    tracing::error!(error = %err, "Failed to connect to job store");
    Error::Connection(err.to_string())
}
