//! Normalized message parts and the helpers a renderer needs to show them.

use crate::dedup;
use a2a_types::{FileContent, Part};
use base64::Engine;
use serde::Serialize;

/// Where a file part's content lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FileSource {
    Bytes(Vec<u8>),
    Uri(String),
}

/// One normalized segment of an agent reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ConversationPart {
    Text {
        text: String,
    },
    File {
        name: Option<String>,
        mime_type: Option<String>,
        content: FileSource,
    },
    /// Structured payload as an indented JSON document.
    Data {
        json: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Text,
    File,
    Data,
}

impl PartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Text => "text",
            PartKind::File => "file",
            PartKind::Data => "data",
        }
    }
}

/// Normalize one protocol part, deduplicating text against `prior_texts`.
///
/// Returns `None` when the part is dropped: unknown kinds, undecodable file
/// bytes, and text that is empty or deduplicates to nothing.
pub fn normalize_part<S: AsRef<str>>(part: &Part, prior_texts: &[S]) -> Option<ConversationPart> {
    match part {
        Part::Text { text, .. } => {
            if text.is_empty() {
                return None;
            }
            let cleaned = dedup::clean(text, prior_texts);
            if cleaned.trim().is_empty() {
                tracing::debug!("text part removed by deduplication");
                return None;
            }
            Some(ConversationPart::Text { text: cleaned })
        }
        Part::File { file, .. } => normalize_file(file),
        Part::Data { data, .. } => {
            let json = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
            Some(ConversationPart::Data { json })
        }
        Part::Unknown => {
            tracing::debug!("dropping part of unknown kind");
            None
        }
    }
}

fn normalize_file(file: &FileContent) -> Option<ConversationPart> {
    match file {
        FileContent::WithBytes(f) => {
            match base64::engine::general_purpose::STANDARD.decode(f.bytes.trim()) {
                Ok(bytes) => Some(ConversationPart::File {
                    name: f.name.clone(),
                    mime_type: f.mime_type.clone(),
                    content: FileSource::Bytes(bytes),
                }),
                Err(e) => {
                    tracing::warn!(
                        name = ?f.name,
                        error = %e,
                        "dropping file part with invalid base64"
                    );
                    None
                }
            }
        }
        FileContent::WithUri(f) => Some(ConversationPart::File {
            name: f.name.clone(),
            mime_type: f.mime_type.clone(),
            content: FileSource::Uri(f.uri.clone()),
        }),
    }
}

/// Normalize a sequence of parts, keeping their order.
pub fn normalize_parts<S: AsRef<str>>(parts: &[Part], prior_texts: &[S]) -> Vec<ConversationPart> {
    parts
        .iter()
        .filter_map(|p| normalize_part(p, prior_texts))
        .collect()
}

impl ConversationPart {
    pub fn kind(&self) -> PartKind {
        match self {
            ConversationPart::Text { .. } => PartKind::Text,
            ConversationPart::File { .. } => PartKind::File,
            ConversationPart::Data { .. } => PartKind::Data,
        }
    }

    /// File and data parts make a reply count as task output.
    pub fn is_rich(&self) -> bool {
        !matches!(self, ConversationPart::Text { .. })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConversationPart::Text { text } => Some(text),
            _ => None,
        }
    }

    fn mime_type(&self) -> Option<&str> {
        match self {
            ConversationPart::File { mime_type, .. } => mime_type.as_deref(),
            _ => None,
        }
    }

    fn bytes(&self) -> Option<&[u8]> {
        match self {
            ConversationPart::File {
                content: FileSource::Bytes(bytes),
                ..
            } => Some(bytes),
            _ => None,
        }
    }

    pub fn is_svg(&self) -> bool {
        self.mime_type() == Some("image/svg+xml")
    }

    /// Raster images; SVG is reported by [`is_svg`](Self::is_svg).
    pub fn is_image(&self) -> bool {
        self.mime_type().is_some_and(|m| m.starts_with("image/")) && !self.is_svg()
    }

    pub fn is_text(&self) -> bool {
        self.mime_type().is_some_and(|m| {
            m.starts_with("text/") || m == "application/json" || m == "application/xml"
        })
    }

    /// File bytes decoded as UTF-8, for text and SVG files.
    pub fn text_content(&self) -> Option<String> {
        self.bytes()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// A URL the file can be loaded from: a `data:` URL for inline bytes.
    pub fn data_url(&self) -> Option<String> {
        match self {
            ConversationPart::File {
                mime_type,
                content: FileSource::Bytes(bytes),
                ..
            } => Some(format!(
                "data:{};base64,{}",
                mime_type.as_deref().unwrap_or("application/octet-stream"),
                base64::engine::general_purpose::STANDARD.encode(bytes)
            )),
            ConversationPart::File {
                content: FileSource::Uri(uri),
                ..
            } => Some(uri.clone()),
            _ => None,
        }
    }

    pub fn size(&self) -> Option<usize> {
        self.bytes().map(<[u8]>::len)
    }
}

pub fn format_file_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut len = bytes as f64;
    let mut order = 0;
    while len >= 1024.0 && order < UNITS.len() - 1 {
        order += 1;
        len /= 1024.0;
    }

    let formatted = format!("{:.2}", len);
    let formatted = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", formatted, UNITS[order])
}

/// Re-indent a JSON document; text that is not JSON comes back unchanged.
pub fn pretty_json(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| raw.to_string())
}

/// Short description of a JSON document's top level as label/value pairs.
pub fn data_summary(raw: &str) -> Vec<(String, String)> {
    use serde_json::Value;

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => {
            return vec![(
                "Error".to_string(),
                "Unable to analyze JSON structure".to_string(),
            )]
        }
    };

    let mut summary = vec![("Type".to_string(), json_type(&value).to_string())];
    match &value {
        Value::Object(map) => {
            summary.push(("Properties".to_string(), map.len().to_string()));
            for (key, item) in map.iter().take(5) {
                let preview = match item {
                    Value::String(s) => format!("\"{}\"", s),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    Value::Array(items) => format!("Array[{}]", items.len()),
                    Value::Object(_) => "Object{...}".to_string(),
                    Value::Null => "Null".to_string(),
                };
                summary.push((key.clone(), preview));
            }
        }
        Value::Array(items) => summary.push(("Items".to_string(), items.len().to_string())),
        _ => {}
    }
    summary
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Object(_) => "Object",
        serde_json::Value::Array(_) => "Array",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Number(_) => "Number",
        serde_json::Value::Bool(_) => "Boolean",
        serde_json::Value::Null => "Null",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use a2a_types::{FileWithBytes, FileWithUri};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NONE: &[&str] = &[];

    fn svg_part(bytes: &str) -> Part {
        Part::file(FileContent::WithBytes(FileWithBytes {
            bytes: bytes.to_string(),
            mime_type: Some("image/svg+xml".to_string()),
            name: Some("pic.svg".to_string()),
        }))
    }

    #[test]
    fn inline_bytes_are_decoded() {
        let part = normalize_part(&svg_part("PHN2Zy8+"), NONE).unwrap();
        assert_eq!(part.kind(), PartKind::File);
        assert!(part.is_svg());
        assert!(!part.is_image());
        assert_eq!(part.text_content().as_deref(), Some("<svg/>"));
        assert_eq!(part.data_url().as_deref(), Some("data:image/svg+xml;base64,PHN2Zy8+"));
    }

    #[test]
    fn invalid_base64_is_dropped() {
        assert_eq!(normalize_part(&svg_part("***"), NONE), None);
    }

    #[test]
    fn uri_file_keeps_reference() {
        let part = Part::file(FileContent::WithUri(FileWithUri {
            uri: "https://example.com/a.png".to_string(),
            mime_type: Some("image/png".to_string()),
            name: None,
        }));
        let normalized = normalize_part(&part, NONE).unwrap();

        assert!(normalized.is_image());
        assert_eq!(normalized.size(), None);
        assert_eq!(
            normalized,
            ConversationPart::File {
                name: None,
                mime_type: Some("image/png".to_string()),
                content: FileSource::Uri("https://example.com/a.png".to_string()),
            }
        );
    }

    #[test]
    fn data_is_indented_json() {
        let normalized = normalize_part(&Part::data(json!({"a": 1})), NONE).unwrap();
        assert_eq!(
            normalized,
            ConversationPart::Data {
                json: "{\n  \"a\": 1\n}".to_string()
            }
        );
    }

    #[test]
    fn empty_unknown_and_echoed_text_are_dropped() {
        assert_eq!(normalize_part(&Part::text(""), NONE), None);
        assert_eq!(normalize_part(&Part::Unknown, NONE), None);
        assert_eq!(normalize_part(&Part::text("Same"), &["same"]), None);
    }

    #[test]
    fn parts_keep_their_order() {
        let parts = vec![Part::text("one"), Part::Unknown, Part::data(json!(true))];
        let normalized = normalize_parts(&parts, NONE);

        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized[0].as_text(), Some("one"));
        assert!(normalized[1].is_rich());
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(1023), "1023 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(3 * 1024 * 1024), "3 MB");
    }

    #[test]
    fn pretty_json_passes_malformed_text_through() {
        assert_eq!(pretty_json("{not json"), "{not json");
        assert_eq!(pretty_json("[1,2]"), "[\n  1,\n  2\n]");
    }

    #[test]
    fn summary_describes_top_level() {
        let summary = data_summary(r#"{"name": "echo", "tags": [1, 2], "ok": true}"#);
        assert_eq!(summary[0], ("Type".to_string(), "Object".to_string()));
        assert_eq!(summary[1], ("Properties".to_string(), "3".to_string()));
        assert!(summary.contains(&("tags".to_string(), "Array[2]".to_string())));
        assert!(summary.contains(&("name".to_string(), "\"echo\"".to_string())));

        assert_eq!(data_summary("[1]")[1], ("Items".to_string(), "1".to_string()));
        assert_eq!(data_summary("nope")[0].0, "Error");
    }
}
