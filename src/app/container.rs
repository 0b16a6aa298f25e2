use std::sync::Arc;

use tracing::debug;

use crate::adapters::{FFmpegAdapter, JsonFileKeyValueStore};
use crate::adapters::toml_config::AppConfig;
use crate::app::cut_interactor::{CutSettings, CuttingCoordinator};
use crate::app::persistence::MarkerPersistence;
use crate::app::session_interactor::MarkerSession;
use crate::error::MarkCutResult;
use crate::ports::{EnginePort, KeyValuePort};

pub trait AppContainer: Send + Sync {
    fn persistence(&self) -> Arc<MarkerPersistence>;
    fn session(&self) -> MarkerSession;
    fn coordinator(&self, engine: Arc<dyn EnginePort>) -> CuttingCoordinator;
}

pub struct DefaultAppContainer {
    config: AppConfig,
    persistence: Arc<MarkerPersistence>,
}

impl DefaultAppContainer {
    /// Wire the application from configuration, opening the state file
    pub fn new(config: AppConfig) -> MarkCutResult<Self> {
        let store = Arc::new(JsonFileKeyValueStore::open(&config.storage.path)?);
        debug!(path = %store.path().display(), "State store opened");
        Ok(Self::with_store(config, store))
    }

    /// Wire the application over an existing key-value backend
    pub fn with_store(config: AppConfig, store: Arc<dyn KeyValuePort>) -> Self {
        let persistence = Arc::new(MarkerPersistence::new(
            store,
            config.storage.namespace.clone(),
        ));
        Self {
            config,
            persistence,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cut_settings(&self) -> CutSettings {
        CutSettings {
            ready_timeout: self.config.ready_timeout(),
            poll_interval: self.config.poll_interval(),
            large_input_threshold: self.config.large_input_threshold_bytes(),
        }
    }

    /// Create the ffmpeg engine and start loading it in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_engine(&self) -> MarkCutResult<Arc<FFmpegAdapter>> {
        let engine = Arc::new(FFmpegAdapter::new(
            self.config.engine.ffmpeg_path.clone(),
            self.config.engine.scratch_dir.as_deref(),
        )?);
        debug!(scratch = %engine.scratch_dir().display(), "Video engine created");

        let loader = Arc::clone(&engine);
        tokio::spawn(async move {
            loader.load().await;
        });
        Ok(engine)
    }
}

impl AppContainer for DefaultAppContainer {
    fn persistence(&self) -> Arc<MarkerPersistence> {
        Arc::clone(&self.persistence)
    }

    fn session(&self) -> MarkerSession {
        MarkerSession::restore(Arc::clone(&self.persistence))
    }

    fn coordinator(&self, engine: Arc<dyn EnginePort>) -> CuttingCoordinator {
        CuttingCoordinator::new(engine, self.cut_settings())
    }
}
