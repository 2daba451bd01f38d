use super::extractor::AttributeExtractor;
use crate::error::ExtractError;
use crate::types::ExtractedAttributes;
use anyhow::Result;
use std::path::Path;

/// Reads attributes that were already extracted and saved as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDumpExtractor;

impl JsonDumpExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl AttributeExtractor for JsonDumpExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedAttributes> {
        let attrs: ExtractedAttributes = serde_json::from_slice(bytes).map_err(ExtractError::Dump)?;
        Ok(attrs)
    }

    fn name(&self) -> &str {
        "JSON dump"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alignment, RoleHint};

    #[test]
    fn test_reads_minimal_dump() {
        let json = br#"{
            "page": {"margins": {"top": 1.0, "bottom": 1.0, "left": 1.0, "right": 1.0},
                     "page_size": {"width_inches": 8.5, "height_inches": 11.0}},
            "paragraphs": [
                {"text": "Method", "font_name": "Arial", "font_size": 11.0, "line_spacing": 2.0,
                 "bold": true, "alignment": "center", "role_hint": "heading"}
            ]
        }"#;
        let attrs = JsonDumpExtractor::new().extract(json).unwrap();
        assert_eq!(attrs.page.page_count, 0);
        assert_eq!(attrs.paragraphs[0].alignment, Alignment::Center);
        assert_eq!(attrs.paragraphs[0].role_hint, Some(RoleHint::Heading));
    }

    #[test]
    fn test_rejects_malformed_dump() {
        let err = JsonDumpExtractor::new().extract(b"{\"page\": 3}").unwrap_err();
        assert!(err.to_string().contains("invalid attribute dump"));
    }
}
