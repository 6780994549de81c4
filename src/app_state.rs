use std::sync::Arc;

use crate::{
    colpali_client::{ColpaliClient, RagBackend},
    config::AppConfig,
    llm::{AnthropicClient, Answerer},
    registry::IndexRegistry,
};

/// Estado compartido del servicio: configuración, registro de índices y los
/// clientes de los dos colaboradores externos (motor multimodal y modelo de
/// respuesta).
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub registry: Arc<IndexRegistry>,
    pub backend: Arc<dyn RagBackend>,
    pub answerer: Arc<dyn Answerer>,
}

impl AppState {
    /// Construye el estado con colaboradores ya instanciados. El registro de
    /// índices se carga desde el fichero de la configuración.
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn RagBackend>,
        answerer: Arc<dyn Answerer>,
    ) -> Self {
        let registry = Arc::new(IndexRegistry::load(&config.registry_file));
        Self {
            config,
            registry,
            backend,
            answerer,
        }
    }

    /// Cableado por defecto: sidecar ColPali y API de Anthropic según la
    /// configuración.
    pub fn from_config(config: AppConfig) -> Self {
        let backend = Arc::new(ColpaliClient::new(
            &config.colpali_endpoint,
            &config.colpali_model,
        ));
        let answerer = Arc::new(AnthropicClient::new(
            &config.anthropic_base_url,
            &config.anthropic_api_key,
            &config.anthropic_model,
            config.answer_max_tokens,
        ));
        Self::new(config, backend, answerer)
    }
}
