//! Service assembly from configuration
//!
//! Centralizes the wiring shared by the API binary and the integration tests.

use crate::{
    common::traits::SessionStore,
    config::{MinesConfig, StorageBackend},
    errors::MinesResult,
    games::service::GameService,
    metrics::GameMetrics,
    storage::{spawn_expiry_sweeper, MemorySessionStore, RocksSessionStore},
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// A ready game service plus the background sweeper keeping its store tidy
pub struct MinesRuntime {
    pub service: Arc<GameService>,
    pub sweeper: JoinHandle<()>,
}

impl MinesRuntime {
    pub fn shutdown(self) {
        self.sweeper.abort();
    }
}

pub struct ServiceFactory;

impl ServiceFactory {
    /// Open the configured store backend
    pub fn create_store(config: &MinesConfig) -> MinesResult<Arc<dyn SessionStore>> {
        let store: Arc<dyn SessionStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemorySessionStore::new()),
            StorageBackend::RocksDb => {
                std::fs::create_dir_all(&config.storage.data_directory)?;
                Arc::new(RocksSessionStore::open(
                    &config.storage.data_directory,
                    config.storage.clear_on_start,
                )?)
            }
        };
        Ok(store)
    }

    pub fn create_service(config: &MinesConfig, store: Arc<dyn SessionStore>) -> MinesResult<GameService> {
        config.validate()?;
        let metrics = Arc::new(GameMetrics::new()?);

        Ok(GameService::new(store, config.game_rules(), metrics).with_store_timeout(config.store_timeout()))
    }

    /// Validate, open the store, build the service and start the sweeper.
    /// Must be called from within a tokio runtime.
    pub fn create_runtime(config: &MinesConfig) -> MinesResult<MinesRuntime> {
        let store = Self::create_store(config)?;
        let service = Arc::new(Self::create_service(config, store.clone())?);
        let sweeper = spawn_expiry_sweeper(store, config.sweep_interval());

        info!(
            backend = %config.storage.backend,
            minimum_bet = config.game.minimum_bet,
            house_edge = config.game.house_edge,
            "Game service ready"
        );

        Ok(MinesRuntime { service, sweeper })
    }
}
