//! Registro persistente de índices de documentos.
//!
//! Mantiene en memoria el mapa `document_id -> IndexRecord` y lo respalda en
//! un único fichero JSON. Cada escritura reescribe el fichero completo de
//! forma atómica (fichero temporal + rename) para que un corte a mitad de
//! escritura nunca deje un registro corrupto.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use crate::error::{RagError, Result};
use crate::models::IndexRecord;

pub struct IndexRegistry {
    file_path: PathBuf,
    entries: Mutex<HashMap<String, IndexRecord>>,
}

impl IndexRegistry {
    /// Carga el registro desde disco. Un fichero ausente o ilegible produce
    /// un registro vacío: el servicio arranca igualmente y los documentos
    /// afectados simplemente dejan de estar consultables.
    pub fn load(file_path: &Path) -> Self {
        let entries = match fs::read_to_string(file_path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, IndexRecord>>(&raw) {
                Ok(map) => {
                    info!(
                        "Registro de índices cargado: {} documento(s) desde {}",
                        map.len(),
                        file_path.display()
                    );
                    map
                }
                Err(e) => {
                    warn!(
                        "Registro de índices ilegible en {} ({}). Se arranca con registro vacío.",
                        file_path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(_) => {
                info!(
                    "Sin registro previo en {}. Se arranca con registro vacío.",
                    file_path.display()
                );
                HashMap::new()
            }
        };

        Self {
            file_path: file_path.to_path_buf(),
            entries: Mutex::new(entries),
        }
    }

    /// Devuelve la entrada del documento, si existe.
    pub fn get(&self, document_id: &str) -> Option<IndexRecord> {
        self.entries.lock().unwrap().get(document_id).cloned()
    }

    /// Inserta (o reemplaza) la entrada y reescribe el fichero del registro.
    /// Si la escritura falla, la entrada en memoria se revierte para que
    /// memoria y disco no diverjan.
    pub fn put(&self, record: IndexRecord) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        let key = record.document_id.clone();
        let previous = entries.insert(key.clone(), record);

        if let Err(source) = persist(&self.file_path, &entries) {
            match previous {
                Some(prev) => {
                    entries.insert(key, prev);
                }
                None => {
                    entries.remove(&key);
                }
            }
            return Err(RagError::PersistFailure { source });
        }
        Ok(())
    }

    /// Número de documentos registrados.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

/// Escritura atómica: volcado a `<registro>.json.tmp` y rename sobre el
/// fichero definitivo.
fn persist(file_path: &Path, entries: &HashMap<String, IndexRecord>) -> std::io::Result<()> {
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let tmp_path = file_path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, file_path)?;
    Ok(())
}
