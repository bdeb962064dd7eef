//! Standalone schema-migration binary: runs the same `initialize_schema`
//! the server calls on boot, then exits. Grounded on `main.rs`'s own
//! startup sequence (pool + schema init) per SPEC_FULL.md §6.

use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use catalogd::infrastructure::database::{initialize_schema, ConnectionPool, ConnectionPoolConfig};
use catalogd::shared::Config;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = Config::from_env();

    let result: anyhow::Result<()> = async {
        let pool_config = ConnectionPoolConfig::new(config.database_url.clone());
        let connection_pool = ConnectionPool::create(pool_config)
            .await
            .map_err(|e| anyhow::anyhow!("failed to create connection pool: {}", e))?;
        initialize_schema(connection_pool.inner()).await?;
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            info!("migration complete");
            std::process::exit(0);
        }
        Err(e) => {
            error!("migration failed: {}", e);
            std::process::exit(1);
        }
    }
}
