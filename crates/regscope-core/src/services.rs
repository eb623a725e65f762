//! Assembly of the shared service graph used by every front end

use crate::catalog::RegulatoryCatalog;
use crate::config::Config;
use crate::error::Result;
use crate::llm::{client_from_config, LLMClient};
use crate::research::ResearchWorkflow;
use crate::store::{self, Storage};
use std::sync::Arc;

/// Storage, catalog, LLM client and research workflow built from one config
pub struct Services {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub catalog: Arc<RegulatoryCatalog>,
    pub client: Arc<dyn LLMClient>,
    pub workflow: ResearchWorkflow,
}

impl Services {
    /// Open the configured storage and LLM provider
    pub fn from_config(config: Config) -> Result<Self> {
        let storage = store::open(&config.storage)?;
        let client = client_from_config(&config.llm_service)?;
        Ok(Self::new(
            config,
            storage,
            Arc::new(RegulatoryCatalog::new()),
            client,
        ))
    }

    /// Wire explicit collaborators, e.g. a scripted client in tests
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        catalog: Arc<RegulatoryCatalog>,
        client: Arc<dyn LLMClient>,
    ) -> Self {
        let workflow = ResearchWorkflow::new(
            client.clone(),
            catalog.clone(),
            catalog.clone(),
            storage.clone(),
            &config.research,
        );
        Self {
            config,
            storage,
            catalog,
            client,
            workflow,
        }
    }
}
