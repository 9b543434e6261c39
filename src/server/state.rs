//! Application state shared across handlers

use std::sync::Arc;

use crate::error::Result;
use crate::evaluation::EvaluationEngine;
use crate::forecast::ForecastEngine;
use crate::registry::ModelRegistry;
use crate::training::TrainingOrchestrator;

use super::auth::{AllowAll, Authorizer, StaticKey};
use super::ServerConfig;

pub struct AppState {
    pub config: ServerConfig,
    pub registry: Arc<ModelRegistry>,
    pub orchestrator: Arc<TrainingOrchestrator>,
    pub forecast: ForecastEngine,
    pub evaluation: EvaluationEngine,
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self> {
        let registry = Arc::new(ModelRegistry::open(&config.models_dir)?);

        let authorizer: Arc<dyn Authorizer> = match &config.api_key {
            Some(key) => Arc::new(StaticKey::new(key.clone())),
            None => Arc::new(AllowAll),
        };

        Ok(Self {
            orchestrator: Arc::new(TrainingOrchestrator::new(
                Arc::clone(&registry),
                config.train_workers,
            )),
            forecast: ForecastEngine::new(Arc::clone(&registry)),
            evaluation: EvaluationEngine::new(Arc::clone(&registry)),
            registry,
            authorizer,
            config,
        })
    }
}
