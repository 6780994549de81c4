//! Modelos de dominio (registro de índices, resultados de búsqueda y consumo
//! de tokens).

use serde::{Deserialize, Serialize};

/// Entrada del registro persistente de índices.
/// Asocia un documento con la ruta de su índice vectorial en disco.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub document_id: String,
    pub index_path: String,
    pub created_at: String,
}

/// Resultado individual de una búsqueda en el índice multimodal.
/// `base64` transporta la página renderizada tal y como la devuelve el
/// sidecar; `doc_id` y `page_num` son identificadores internos del índice,
/// no el `document_id` del registro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub doc_id: i64,
    pub page_num: i64,
    pub score: f64,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub base64: String,
}

/// Tokens consumidos por una llamada al modelo de respuesta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Construye el consumo a partir de los contadores de entrada y salida.
    /// `total_tokens` es siempre la suma de ambos.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Respuesta generada por el modelo junto con su consumo de tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub usage: TokenUsage,
}
