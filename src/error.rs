//! Errores del pipeline RAG.
//!
//! Los mensajes `Display` conservan el texto que el servicio expone por la
//! API ("Invalid file type", "Invalid document_id", ...); son el contrato
//! visible para el cliente, no texto de logging.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    /// La extensión del fichero subido no es `.pdf`.
    #[error("Invalid file type")]
    InvalidFileType,

    /// Falta un campo obligatorio en la petición (fichero, imagen o query).
    #[error("Missing {0}")]
    MissingInput(&'static str),

    /// El document_id no figura en el registro de índices.
    #[error("Invalid document_id")]
    InvalidDocumentId,

    /// El registro apunta a una ruta de índice que ya no existe en disco.
    #[error("Index file not found")]
    IndexNotFound,

    /// El paso de indexado no produjo un artefacto en la ubicación esperada.
    #[error("Index creation failed: {0}")]
    IndexCreationFailure(String),

    /// La llamada al modelo de respuesta no pudo completarse.
    #[error("Answer generation unavailable: {0}")]
    UpstreamUnavailable(String),

    /// No se pudo reescribir el fichero del registro de índices.
    #[error("Failed to persist document index registry: {source}")]
    PersistFailure {
        #[source]
        source: std::io::Error,
    },

    /// Fallo del sidecar de búsqueda multimodal en tiempo de consulta.
    #[error("Multimodal search backend error: {0}")]
    Backend(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RagError>;
