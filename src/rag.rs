//! Orquestación de las consultas RAG.
//!
//! Flujo:
//!   1. Validación de la petición en la frontera.
//!   2. Recuperación de los top-k resultados (índice del documento o índice
//!      global, según el tipo de consulta).
//!   3. Construcción del mensaje multimodal de grounding.
//!   4. El modelo responde; se devuelven resultados, respuesta y tokens.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mime_guess::MimeGuess;
use tracing::info;

use crate::{
    api::{ImageQueryRequest, ImageQueryResponse, QueryRequest, QueryResponse},
    app_state::AppState,
    error::Result,
    prompt, retrieval,
};

/// Consulta textual sobre un documento subido previamente.
pub async fn query_document(state: &AppState, request: &QueryRequest) -> Result<QueryResponse> {
    // 1) Validación de frontera
    request.validate()?;
    let k = request.effective_k();

    // 2) Recuperación sobre el índice del documento
    let results = retrieval::query_by_text(
        &state.registry,
        state.backend.as_ref(),
        &request.document_id,
        &request.query,
        k,
    )
    .await?;

    // 3) Mensaje de grounding con los extractos recuperados
    let message = prompt::text_query_message(&request.query, &results);

    // 4) Respuesta del modelo
    let answer = state.answerer.answer(&message).await?;
    info!(
        "Consulta sobre {} respondida ({} tokens)",
        request.document_id, answer.usage.total_tokens
    );

    Ok(QueryResponse {
        results,
        answer: answer.text,
        tokens_consumed: answer.usage,
    })
}

/// Consulta por imagen contra la colección global.
pub async fn query_image(
    state: &AppState,
    request: &ImageQueryRequest,
) -> Result<ImageQueryResponse> {
    // 1) Validación de frontera
    request.validate()?;
    let k = request.effective_k();

    // 2) La imagen de consulta viaja en base64, sin pasar por disco
    let query_image_base64 = BASE64.encode(&request.image);
    let media_type = media_type_for(&request.image_filename);

    // 3) Recuperación contra el índice global
    let results = retrieval::query_by_image(
        state.backend.as_ref(),
        &request.query,
        &query_image_base64,
        k,
    )
    .await?;

    // 4) Mensaje de grounding: imagen de consulta, resultados y pregunta
    let message =
        prompt::image_query_message(&request.query, &query_image_base64, &media_type, &results);

    // 5) Respuesta del modelo
    let answer = state.answerer.answer(&message).await?;
    info!(
        "Consulta por imagen respondida ({} tokens)",
        answer.usage.total_tokens
    );

    Ok(ImageQueryResponse {
        results,
        answer: answer.text,
        query_image_base64,
        tokens_consumed: answer.usage,
    })
}

/// Tipos de imagen que admite la API de mensajes en bloques `image`.
const QUERY_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Tipo MIME de la imagen de consulta según su extensión. Cualquier tipo
/// fuera de los admitidos por la API se sustituye por PNG, como el resto del
/// pipeline.
fn media_type_for(filename: &str) -> String {
    match MimeGuess::from_path(Path::new(filename)).first() {
        Some(mime) if QUERY_IMAGE_TYPES.contains(&mime.essence_str()) => {
            mime.essence_str().to_string()
        }
        _ => prompt::PAGE_MEDIA_TYPE.to_string(),
    }
}
