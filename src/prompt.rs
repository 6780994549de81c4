//! Construcción del mensaje multimodal de grounding para el modelo.
//!
//! Los literales en inglés ("Here are some relevant document excerpts",
//! "Excerpt {n}", ...) son parte del contrato con el modelo de respuesta y
//! no se traducen. Cada resultado recuperado aporta siempre tres segmentos:
//! etiqueta, imagen de la página y línea de metadatos.

use serde::Serialize;

use crate::models::RetrievalResult;

/// Las páginas que devuelve el índice multimodal vienen renderizadas a PNG.
pub const PAGE_MEDIA_TYPE: &str = "image/png";

/// Origen de una imagen embebida en el mensaje (siempre base64 en línea).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub fn base64(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            source_type: "base64".to_string(),
            media_type: media_type.into(),
            data: data.into(),
        }
    }
}

/// Segmento de contenido del mensaje: texto plano o imagen embebida.
/// Serializa con la forma `{"type": "text", ...}` / `{"type": "image", ...}`
/// que espera la API de mensajes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Segment {
    Text { text: String },
    Image { source: ImageSource },
}

impl Segment {
    pub fn text(text: impl Into<String>) -> Self {
        Segment::Text { text: text.into() }
    }

    /// Imagen de página renderizada (PNG) tal y como la entrega el índice.
    pub fn page_image(data: impl Into<String>) -> Self {
        Segment::Image {
            source: ImageSource::base64(PAGE_MEDIA_TYPE, data),
        }
    }
}

/// Mensaje único de usuario con todo el contexto recuperado y la pregunta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundingMessage {
    pub role: String,
    pub content: Vec<Segment>,
}

impl GroundingMessage {
    pub fn user(content: Vec<Segment>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Mensaje para una consulta textual sobre un documento concreto:
/// cabecera, tres segmentos por resultado y la pregunta al final.
pub fn text_query_message(query: &str, results: &[RetrievalResult]) -> GroundingMessage {
    let mut content = Vec::with_capacity(2 + results.len() * 3);
    content.push(Segment::text("Here are some relevant document excerpts:\n\n"));

    for (idx, result) in results.iter().enumerate() {
        content.push(Segment::text(format!("Excerpt {}:\n", idx + 1)));
        content.push(Segment::page_image(result.base64.clone()));
        content.push(Segment::text(metadata_line(result)));
    }

    content.push(Segment::text(format!(
        "Based on these excerpts, please answer the following question: {query}"
    )));
    GroundingMessage::user(content)
}

/// Mensaje para una consulta por imagen contra el índice global: la imagen
/// de consulta abre el mensaje, siguen los resultados y cierra la pregunta.
pub fn image_query_message(
    query: &str,
    query_image_base64: &str,
    query_media_type: &str,
    results: &[RetrievalResult],
) -> GroundingMessage {
    let mut content = Vec::with_capacity(4 + results.len() * 3);
    content.push(Segment::text("Here's the query image:"));
    content.push(Segment::Image {
        source: ImageSource::base64(query_media_type, query_image_base64),
    });
    content.push(Segment::text("Here are some relevant image results:\n\n"));

    for (idx, result) in results.iter().enumerate() {
        content.push(Segment::text(format!("Image {}:\n", idx + 1)));
        content.push(Segment::page_image(result.base64.clone()));
        content.push(Segment::text(metadata_line(result)));
    }

    content.push(Segment::text(format!(
        "Based on these images, please answer the following question: {query}"
    )));
    GroundingMessage::user(content)
}

/// Línea de metadatos de un resultado, con el mapa renderizado como JSON
/// compacto.
fn metadata_line(result: &RetrievalResult) -> String {
    format!(
        "Metadata: {}\n\n",
        serde_json::Value::Object(result.metadata.clone())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(page_num: i64, score: f64) -> RetrievalResult {
        let mut metadata = serde_json::Map::new();
        metadata.insert("filename".to_string(), serde_json::json!("informe.pdf"));
        RetrievalResult {
            doc_id: 0,
            page_num,
            score,
            metadata,
            base64: format!("cGFnaW5hLXt9{page_num}"),
        }
    }

    #[test]
    fn mensaje_textual_con_dos_resultados() {
        let results = vec![result(1, 19.5), result(7, 12.0)];
        let message = text_query_message("¿Cuál es el total?", &results);

        assert_eq!(message.role, "user");
        // cabecera + 3 segmentos por resultado + pregunta final
        assert_eq!(message.content.len(), 1 + 3 * 2 + 1);

        assert_eq!(
            message.content[0],
            Segment::text("Here are some relevant document excerpts:\n\n")
        );
        assert_eq!(message.content[1], Segment::text("Excerpt 1:\n"));
        assert!(matches!(message.content[2], Segment::Image { .. }));
        assert_eq!(message.content[4], Segment::text("Excerpt 2:\n"));
        assert_eq!(
            message.content[7],
            Segment::text(
                "Based on these excerpts, please answer the following question: ¿Cuál es el total?"
            )
        );
    }

    #[test]
    fn mensaje_textual_sin_resultados() {
        let message = text_query_message("pregunta", &[]);
        assert_eq!(message.content.len(), 2);
        assert_eq!(
            message.content[1],
            Segment::text("Based on these excerpts, please answer the following question: pregunta")
        );
    }

    #[test]
    fn mensaje_de_imagen_antepone_la_imagen_de_consulta() {
        let results = vec![result(2, 9.0)];
        let message = image_query_message("¿qué figura es?", "aW1n", "image/jpeg", &results);

        // 3 segmentos de cabecera + 3 por resultado + pregunta final
        assert_eq!(message.content.len(), 3 + 3 + 1);
        assert_eq!(message.content[0], Segment::text("Here's the query image:"));
        assert_eq!(
            message.content[1],
            Segment::Image {
                source: ImageSource::base64("image/jpeg", "aW1n")
            }
        );
        assert_eq!(
            message.content[2],
            Segment::text("Here are some relevant image results:\n\n")
        );
        assert_eq!(message.content[3], Segment::text("Image 1:\n"));
        assert_eq!(
            message.content[6],
            Segment::text(
                "Based on these images, please answer the following question: ¿qué figura es?"
            )
        );
    }

    #[test]
    fn mensaje_de_imagen_sin_resultados() {
        let message = image_query_message("pregunta", "aW1n", "image/png", &[]);

        // Las tres cabeceras y la pregunta se emiten aunque no haya resultados.
        assert_eq!(message.content.len(), 4);
        assert_eq!(message.content[0], Segment::text("Here's the query image:"));
        assert!(matches!(message.content[1], Segment::Image { .. }));
        assert_eq!(
            message.content[2],
            Segment::text("Here are some relevant image results:\n\n")
        );
        assert_eq!(
            message.content[3],
            Segment::text("Based on these images, please answer the following question: pregunta")
        );
    }

    #[test]
    fn metadatos_renderizados_como_json_compacto() {
        let results = vec![result(1, 10.0)];
        let message = text_query_message("q", &results);
        assert_eq!(
            message.content[3],
            Segment::text("Metadata: {\"filename\":\"informe.pdf\"}\n\n")
        );
    }

    #[test]
    fn segmentos_serializan_con_la_forma_de_la_api() {
        let message = text_query_message("q", &[result(1, 10.0)]);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"][0]["type"], "text");
        assert_eq!(json["content"][2]["type"], "image");
        assert_eq!(json["content"][2]["source"]["type"], "base64");
        assert_eq!(json["content"][2]["source"]["media_type"], "image/png");
        assert_eq!(json["content"][2]["source"]["data"], "cGFnaW5hLXt91");
    }
}
