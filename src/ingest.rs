//! Ingesta de documentos PDF: validación, persistencia del fichero subido,
//! construcción del índice multimodal y alta en el registro.
//!
//! El motor de indexado genera el artefacto en su propia área de trabajo;
//! aquí se reubica a su carpeta definitiva y solo después se registra el
//! documento. Un documento registrado siempre tiene índice en disco.

use std::{fs, path::Path};

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::{
    app_state::AppState,
    error::{RagError, Result},
    models::IndexRecord,
};

/// Procesa la subida de un PDF de principio a fin y devuelve el
/// `document_id` asignado.
pub async fn upload_document(
    state: &AppState,
    file_bytes: &[u8],
    original_filename: &str,
) -> Result<String> {
    if file_bytes.is_empty() || original_filename.trim().is_empty() {
        return Err(RagError::MissingInput("file"));
    }
    if !original_filename.to_lowercase().ends_with(".pdf") {
        return Err(RagError::InvalidFileType);
    }

    let doc_id = Uuid::new_v4().to_string();
    let filename = sanitize_filename(original_filename);

    fs::create_dir_all(&state.config.upload_dir)?;
    let upload_path = state.config.upload_dir.join(format!("{doc_id}_{filename}"));
    fs::write(&upload_path, file_bytes)?;
    info!(
        "Documento {} guardado en {} ({} bytes)",
        doc_id,
        upload_path.display(),
        file_bytes.len()
    );

    let index_name = format!("index_{doc_id}");
    let produced = state.backend.build_index(&upload_path, &index_name).await?;

    let index_path = state.config.index_dir.join(&index_name);
    relocate_index(&produced, &index_path)?;
    info!(
        "Índice reubicado de {} a {}",
        produced.display(),
        index_path.display()
    );

    state.registry.put(IndexRecord {
        document_id: doc_id.clone(),
        index_path: index_path.to_string_lossy().into_owned(),
        created_at: Utc::now().to_rfc3339(),
    })?;
    info!("Documento {} indexado y registrado", doc_id);

    Ok(doc_id)
}

/// Versión segura del nombre de fichero enviado por el cliente: se queda con
/// el último componente de la ruta, sustituye todo lo que no sea
/// `[A-Za-z0-9._-]` y descarta los puntos iniciales.
pub(crate) fn sanitize_filename(original: &str) -> String {
    let last = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let clean: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    clean.trim_start_matches('.').to_string()
}

/// Mueve el artefacto del índice a su ubicación definitiva. `fs::rename` no
/// funciona entre dispositivos distintos; en ese caso se copia de forma
/// recursiva y se borra el origen.
fn relocate_index(produced: &Path, destination: &Path) -> Result<()> {
    if !produced.exists() {
        return Err(RagError::IndexCreationFailure(format!(
            "index artifact missing at {}",
            produced.display()
        )));
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::rename(produced, destination) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(
                "No se pudo renombrar {} ({}). Se copia el artefacto.",
                produced.display(),
                e
            );
            copy_recursive(produced, destination)?;
            remove_artifact(produced)?;
            Ok(())
        }
    }
}

fn copy_recursive(source: &Path, destination: &Path) -> Result<()> {
    if source.is_file() {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, destination)?;
        return Ok(());
    }

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            RagError::IndexCreationFailure(format!("cannot walk index artifact: {e}"))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| RagError::IndexCreationFailure(e.to_string()))?;
        let target = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

fn remove_artifact(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_se_queda_con_el_ultimo_componente() {
        assert_eq!(sanitize_filename("../../etc/informe.pdf"), "informe.pdf");
        assert_eq!(sanitize_filename("C:\\docs\\informe.pdf"), "informe.pdf");
    }

    #[test]
    fn sanitize_sustituye_caracteres_fuera_del_alfabeto() {
        assert_eq!(
            sanitize_filename("informe final (v2).pdf"),
            "informe_final__v2_.pdf"
        );
        assert_eq!(sanitize_filename("año.pdf"), "a_o.pdf");
    }

    #[test]
    fn sanitize_descarta_puntos_iniciales() {
        assert_eq!(sanitize_filename(".oculto.pdf"), "oculto.pdf");
        assert_eq!(sanitize_filename("..pdf"), "pdf");
    }

    #[test]
    fn relocate_mueve_un_directorio_completo() {
        let dir = tempdir().unwrap();
        let produced = dir.path().join("trabajo").join("index_doc");
        fs::create_dir_all(produced.join("sub")).unwrap();
        fs::write(produced.join("index.bin"), b"datos").unwrap();
        fs::write(produced.join("sub").join("pages.bin"), b"paginas").unwrap();

        let destination = dir.path().join("indices").join("index_doc");
        relocate_index(&produced, &destination).unwrap();

        assert!(!produced.exists());
        assert_eq!(fs::read(destination.join("index.bin")).unwrap(), b"datos");
        assert_eq!(
            fs::read(destination.join("sub").join("pages.bin")).unwrap(),
            b"paginas"
        );
    }

    #[test]
    fn relocate_sin_artefacto_falla() {
        let dir = tempdir().unwrap();
        let produced = dir.path().join("no_existe");
        let destination = dir.path().join("indices").join("index_doc");

        let err = relocate_index(&produced, &destination).unwrap_err();
        assert!(matches!(err, RagError::IndexCreationFailure(_)));
        assert!(!destination.exists());
    }

    #[test]
    fn copy_recursive_acepta_un_fichero_suelto() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("index.bin");
        fs::write(&source, b"datos").unwrap();

        let destination = dir.path().join("indices").join("index.bin");
        copy_recursive(&source, &destination).unwrap();
        assert_eq!(fs::read(destination).unwrap(), b"datos");
    }
}
