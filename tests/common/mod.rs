//! Dobles de los colaboradores externos para los tests de integración: un
//! motor multimodal que fabrica artefactos en disco y devuelve resultados
//! enlatados, y un modelo de respuesta que captura el último mensaje.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use colpali_rag_claude_service::colpali_client::RagBackend;
use colpali_rag_claude_service::config::AppConfig;
use colpali_rag_claude_service::error::{RagError, Result};
use colpali_rag_claude_service::llm::Answerer;
use colpali_rag_claude_service::models::{Answer, RetrievalResult, TokenUsage};
use colpali_rag_claude_service::prompt::GroundingMessage;

/// Configuración apuntando a un directorio temporal del test.
pub fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        upload_dir: root.join("uploads"),
        index_dir: root.join("indices"),
        registry_file: root.join("document_indices.json"),
        colpali_endpoint: "http://127.0.0.1:7077".to_string(),
        colpali_model: "vidore/colpali-v1.2".to_string(),
        anthropic_base_url: "https://api.anthropic.com".to_string(),
        anthropic_api_key: "sk-test".to_string(),
        anthropic_model: "claude-3-sonnet-20240229".to_string(),
        answer_max_tokens: 4000,
    }
}

fn canned_result(page_num: i64, score: f64) -> RetrievalResult {
    let mut metadata = serde_json::Map::new();
    metadata.insert("filename".to_string(), serde_json::json!("informe.pdf"));
    metadata.insert("page".to_string(), serde_json::json!(page_num));
    RetrievalResult {
        doc_id: 0,
        page_num,
        score,
        metadata,
        base64: format!("cGFnaW5hLW51bS0{page_num}"),
    }
}

/// Lote desordenado y con más entradas que el `k` por defecto, para que los
/// tests observen el orden y el truncado del motor de recuperación.
pub fn canned_results() -> Vec<RetrievalResult> {
    vec![
        canned_result(1, 12.5),
        canned_result(2, 27.0),
        canned_result(3, 19.0),
        canned_result(4, 8.0),
    ]
}

/// Motor multimodal de mentira: `build_index` deja un artefacto bajo
/// `artifact_root` (salvo que `produce_artifact` sea falso) y las búsquedas
/// devuelven siempre el lote enlatado completo, ignorando `k`.
pub struct FakeBackend {
    pub artifact_root: PathBuf,
    pub produce_artifact: bool,
    pub canned: Vec<RetrievalResult>,
}

impl FakeBackend {
    pub fn new(artifact_root: &Path) -> Self {
        Self {
            artifact_root: artifact_root.to_path_buf(),
            produce_artifact: true,
            canned: canned_results(),
        }
    }
}

#[async_trait]
impl RagBackend for FakeBackend {
    async fn build_index(&self, _input_path: &Path, index_name: &str) -> Result<PathBuf> {
        let produced = self.artifact_root.join(index_name);
        if self.produce_artifact {
            std::fs::create_dir_all(&produced).expect("crear artefacto");
            std::fs::write(produced.join("index.bin"), b"indice").expect("escribir artefacto");
        }
        Ok(produced)
    }

    async fn search_index(
        &self,
        index_path: &Path,
        _query: &str,
        _k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        if !index_path.exists() {
            return Err(RagError::Backend(format!(
                "index artifact missing at {}",
                index_path.display()
            )));
        }
        Ok(self.canned.clone())
    }

    async fn search_image(
        &self,
        _query: &str,
        _image_base64: &str,
        _k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        Ok(self.canned.clone())
    }
}

/// Modelo de respuesta de mentira: responde siempre lo mismo y guarda el
/// último mensaje recibido para que el test lo inspeccione.
pub struct FakeAnswerer {
    pub last_message: Mutex<Option<GroundingMessage>>,
}

impl FakeAnswerer {
    pub fn new() -> Self {
        Self {
            last_message: Mutex::new(None),
        }
    }

    pub fn last(&self) -> GroundingMessage {
        self.last_message
            .lock()
            .expect("lock")
            .clone()
            .expect("el modelo no recibió ningún mensaje")
    }
}

#[async_trait]
impl Answerer for FakeAnswerer {
    async fn answer(&self, message: &GroundingMessage) -> Result<Answer> {
        *self.last_message.lock().expect("lock") = Some(message.clone());
        Ok(Answer {
            text: "Respuesta basada en los extractos recuperados.".to_string(),
            usage: TokenUsage::new(128, 64),
        })
    }
}

/// Inicializa el logging de los tests (idempotente).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
