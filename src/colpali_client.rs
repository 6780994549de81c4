//! Cliente HTTP del sidecar de indexado/búsqueda multimodal (ColPali).
//!
//! El sidecar expone tres operaciones JSON: construir un índice a partir de
//! un PDF, buscar por texto dentro de un índice concreto y buscar por texto
//! contra la colección global usando además una imagen de consulta.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::models::RetrievalResult;

/// Abstracción del motor de indexado y búsqueda multimodal. Permite
/// sustituir el sidecar por una implementación en memoria en los tests.
#[async_trait]
pub trait RagBackend: Send + Sync {
    /// Construye el índice del documento y devuelve la ruta del artefacto
    /// generado (todavía en el área de trabajo del motor, no en su
    /// ubicación definitiva).
    async fn build_index(&self, input_path: &Path, index_name: &str) -> Result<PathBuf>;

    /// Búsqueda textual dentro del índice de un documento.
    async fn search_index(
        &self,
        index_path: &Path,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievalResult>>;

    /// Búsqueda por imagen (más texto de consulta) contra el índice global.
    async fn search_image(
        &self,
        query: &str,
        image_base64: &str,
        k: usize,
    ) -> Result<Vec<RetrievalResult>>;
}

pub struct ColpaliClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct IndexRequest<'a> {
    input_path: &'a str,
    index_name: &'a str,
    store_collection_with_index: bool,
    overwrite: bool,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct IndexResponse {
    index_path: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    index_path: &'a str,
    query: &'a str,
    k: usize,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct ImageSearchRequest<'a> {
    query: &'a str,
    image_base64: &'a str,
    k: usize,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<RetrievalResult>,
}

impl ColpaliClient {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// POST JSON con comprobación de estado. Devuelve el detalle como texto
    /// para que cada operación lo envuelva en su variante de error; en caso
    /// de error HTTP el detalle incluye el cuerpo de la respuesta.
    async fn post_json<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> std::result::Result<reqwest::Response, String> {
        let url = format!("{}/{}", self.endpoint, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| format!("request to {url} failed: {e}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(format!("{url} returned {status}: {detail}"));
        }
        Ok(response)
    }
}

#[async_trait]
impl RagBackend for ColpaliClient {
    async fn build_index(&self, input_path: &Path, index_name: &str) -> Result<PathBuf> {
        let input_path = input_path.to_string_lossy();
        let body = IndexRequest {
            input_path: &input_path,
            index_name,
            store_collection_with_index: true,
            overwrite: true,
            model: &self.model,
        };

        let parsed: IndexResponse = self
            .post_json("index", &body)
            .await
            .map_err(RagError::IndexCreationFailure)?
            .json()
            .await
            .map_err(|e| RagError::IndexCreationFailure(format!("invalid index response: {e}")))?;

        Ok(PathBuf::from(parsed.index_path))
    }

    async fn search_index(
        &self,
        index_path: &Path,
        query: &str,
        k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let index_path = index_path.to_string_lossy();
        let body = SearchRequest {
            index_path: &index_path,
            query,
            k,
            model: &self.model,
        };

        let parsed: SearchResponse = self
            .post_json("search", &body)
            .await
            .map_err(RagError::Backend)?
            .json()
            .await
            .map_err(|e| RagError::Backend(format!("invalid search response: {e}")))?;

        Ok(parsed.results)
    }

    async fn search_image(
        &self,
        query: &str,
        image_base64: &str,
        k: usize,
    ) -> Result<Vec<RetrievalResult>> {
        let body = ImageSearchRequest {
            query,
            image_base64,
            k,
            model: &self.model,
        };

        let parsed: SearchResponse = self
            .post_json("search_image", &body)
            .await
            .map_err(RagError::Backend)?
            .json()
            .await
            .map_err(|e| RagError::Backend(format!("invalid search response: {e}")))?;

        Ok(parsed.results)
    }
}
