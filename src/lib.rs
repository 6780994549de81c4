//! Núcleo RAG multimodal: ingesta de PDFs con un índice ColPali por
//! documento y consultas (texto o imagen) respondidas por Claude con
//! grounding visual de las páginas recuperadas.
//!
//! La biblioteca implementa el pipeline completo (registro de índices,
//! ingesta, recuperación, mensaje de grounding y llamada al modelo). El
//! encaminamiento HTTP y la autenticación quedan para el binario que la
//! incruste.

pub mod api;
pub mod app_state;
pub mod colpali_client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod rag;
pub mod registry;
pub mod retrieval;

pub use app_state::AppState;
pub use config::AppConfig;
pub use error::{RagError, Result};
