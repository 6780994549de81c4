//! Motor de recuperación: resuelve el documento contra el registro, valida
//! que su índice siga en disco y delega la búsqueda en el motor multimodal.

use std::path::Path;

use tracing::info;

use crate::colpali_client::RagBackend;
use crate::error::{RagError, Result};
use crate::models::RetrievalResult;
use crate::registry::IndexRegistry;

/// Número de resultados cuando la petición no especifica `k`.
pub const DEFAULT_K: usize = 3;

/// Búsqueda textual sobre el índice de un documento concreto.
pub async fn query_by_text(
    registry: &IndexRegistry,
    backend: &dyn RagBackend,
    document_id: &str,
    query: &str,
    k: usize,
) -> Result<Vec<RetrievalResult>> {
    let k = k.max(1);
    let record = registry
        .get(document_id)
        .ok_or(RagError::InvalidDocumentId)?;

    let index_path = Path::new(&record.index_path);
    if !index_path.exists() {
        return Err(RagError::IndexNotFound);
    }

    let mut results = backend.search_index(index_path, query, k).await?;
    sort_by_score(&mut results);
    results.truncate(k);
    info!(
        "Consulta textual sobre {}: {} resultado(s)",
        document_id,
        results.len()
    );
    Ok(results)
}

/// Búsqueda por imagen contra el índice global del motor.
pub async fn query_by_image(
    backend: &dyn RagBackend,
    query: &str,
    image_base64: &str,
    k: usize,
) -> Result<Vec<RetrievalResult>> {
    let k = k.max(1);
    let mut results = backend.search_image(query, image_base64, k).await?;
    sort_by_score(&mut results);
    results.truncate(k);
    info!("Consulta por imagen: {} resultado(s)", results.len());
    Ok(results)
}

/// Orden estable por puntuación descendente; los empates conservan el orden
/// en que los devolvió el motor.
fn sort_by_score(results: &mut [RetrievalResult]) {
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
