//! Peticiones, respuestas y mapeo de errores de la API del servicio.
//!
//! El encaminamiento HTTP, la autenticación y el manejo del multipart viven
//! en el binario que incruste esta biblioteca; aquí solo se definen las
//! formas de los datos y su validación de frontera.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::models::{RetrievalResult, TokenUsage};
use crate::retrieval::DEFAULT_K;

// --- Peticiones ---

/// Consulta textual sobre un documento ya subido.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub document_id: String,
    pub query: String,
    pub k: Option<usize>,
}

impl QueryRequest {
    pub fn validate(&self) -> Result<()> {
        if self.document_id.trim().is_empty() || self.query.trim().is_empty() {
            return Err(RagError::MissingInput("document_id or query"));
        }
        Ok(())
    }

    /// `k` efectivo: lo pedido por el cliente (mínimo 1) o el valor por
    /// defecto del motor.
    pub fn effective_k(&self) -> usize {
        self.k.unwrap_or(DEFAULT_K).max(1)
    }
}

/// Consulta por imagen contra la colección global. Llega como formulario
/// multipart, así que el binario construye esta estructura a mano.
#[derive(Debug, Clone)]
pub struct ImageQueryRequest {
    pub image: Vec<u8>,
    pub image_filename: String,
    pub query: String,
    pub k: Option<usize>,
}

impl ImageQueryRequest {
    pub fn validate(&self) -> Result<()> {
        if self.image.is_empty() {
            return Err(RagError::MissingInput("image"));
        }
        if self.query.trim().is_empty() {
            return Err(RagError::MissingInput("query"));
        }
        Ok(())
    }

    pub fn effective_k(&self) -> usize {
        self.k.unwrap_or(DEFAULT_K).max(1)
    }
}

// --- Respuestas ---

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub document_id: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub results: Vec<RetrievalResult>,
    pub answer: String,
    pub tokens_consumed: TokenUsage,
}

#[derive(Debug, Serialize)]
pub struct ImageQueryResponse {
    pub results: Vec<RetrievalResult>,
    pub answer: String,
    pub query_image_base64: String,
    pub tokens_consumed: TokenUsage,
}

// --- Errores ---

/// Cuerpo de error que el servicio expone al cliente.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&RagError> for ErrorResponse {
    fn from(err: &RagError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}
