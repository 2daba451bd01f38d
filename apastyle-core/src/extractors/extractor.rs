// Extractor abstraction: source document -> ExtractedAttributes
//
// Extractors are the boundary between file formats and the checker. Everything
// after this point works on plain paragraph and page records.

use crate::types::ExtractedAttributes;
use anyhow::Result;
use std::path::Path;

/// Reads formatting attributes out of one document format.
pub trait AttributeExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedAttributes>;

    fn name(&self) -> &str;

    fn supports_file_type(&self, path: &Path) -> bool;
}
