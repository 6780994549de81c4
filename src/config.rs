//! Carga y gestión de configuración de la aplicación (almacenamiento,
//! sidecar ColPali y Anthropic).

use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use url::Url;

/// Configuración completa de la aplicación.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Directorio donde se guardan los ficheros subidos en bruto.
    pub upload_dir: PathBuf,
    /// Directorio canónico de artefactos de índice por documento.
    pub index_dir: PathBuf,
    /// Fichero JSON con el mapeo document_id → registro de índice.
    pub registry_file: PathBuf,

    /// Endpoint HTTP del sidecar de indexado/búsqueda multimodal.
    pub colpali_endpoint: String,
    /// Modelo multimodal que el sidecar debe usar.
    pub colpali_model: String,

    pub anthropic_base_url: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    /// Longitud máxima de la respuesta generada (tokens).
    pub answer_max_tokens: u32,
}

impl AppConfig {
    /// Carga la configuración desde variables de entorno (usando .env si existe).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            dirs::data_local_dir()
                .map(|d| d.join("colpali_rag"))
                .unwrap_or_else(|| PathBuf::from("./data"))
        });

        // Nombres de variable heredados de despliegues anteriores del servicio.
        let upload_dir = env::var("UPLOAD_FOLDER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("uploads"));
        let index_dir = env::var("INDEX_FOLDER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("indices"));
        let registry_file = env::var("DOCUMENT_INDEX_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("document_indices.json"));

        let colpali_endpoint =
            env::var("COLPALI_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:7077".to_string());
        Url::parse(&colpali_endpoint)
            .map_err(|_| anyhow!("COLPALI_ENDPOINT no es una URL válida: {colpali_endpoint}"))?;
        let colpali_endpoint = colpali_endpoint.trim_end_matches('/').to_string();

        let colpali_model =
            env::var("COLPALI_MODEL").unwrap_or_else(|_| "vidore/colpali-v1.2".to_string());

        let anthropic_base_url = env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let anthropic_api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| anyhow!("Falta ANTHROPIC_API_KEY en el entorno"))?;
        let anthropic_model = env::var("ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-3-sonnet-20240229".to_string());

        let answer_max_tokens = match env::var("ANSWER_MAX_TOKENS") {
            Ok(raw) => raw
                .parse::<u32>()
                .map_err(|_| anyhow!("ANSWER_MAX_TOKENS no es un entero válido: {raw}"))?,
            Err(_) => 4000,
        };

        Ok(Self {
            upload_dir,
            index_dir,
            registry_file,
            colpali_endpoint,
            colpali_model,
            anthropic_base_url,
            anthropic_api_key,
            anthropic_model,
            answer_max_tokens,
        })
    }
}
