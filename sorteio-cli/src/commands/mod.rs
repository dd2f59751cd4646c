pub mod admin;
pub mod client;
pub mod demo;

pub use admin::{handle_admin_command, AdminCommands};
pub use client::{handle_client_command, ClientCommands};
pub use demo::{run_demo, DemoArgs};

use crate::config::CliConfig;
use sorteio_core::{RaffleConfig, SorteioError, SqliteStore};
use sorteio_raffle::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How often long-running commands look for writes made by other processes
pub const EXTERNAL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Everything a command needs: paths, raffle settings and the shared store
pub struct AppContext {
    pub cli: CliConfig,
    pub raffle: RaffleConfig,
    pub store: Arc<SqliteStore>,
}

impl AppContext {
    pub async fn open(cli: CliConfig, raffle: RaffleConfig) -> Result<Self> {
        tokio::fs::create_dir_all(&cli.data_dir)
            .await
            .map_err(SorteioError::from)?;
        let store = Arc::new(SqliteStore::new(&cli.database_path()).await?);
        tracing::debug!("Opened store at {}", cli.database_path().display());

        Ok(Self { cli, raffle, store })
    }

    /// Pick up draws and registrations made by other `sorteio` processes
    pub async fn follow_external_writes(&self) -> Result<JoinHandle<()>> {
        Ok(self.store.watch_external(EXTERNAL_POLL_INTERVAL).await?)
    }
}

/// Block until Ctrl-C
pub async fn wait_for_shutdown() -> Result<()> {
    tokio::signal::ctrl_c().await.map_err(SorteioError::from)?;
    println!();
    Ok(())
}
