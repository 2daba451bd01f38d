//! DOCX attribute extraction.
//!
//! Two steps, mirroring the container format:
//! 1. Package -> parts: unzip the WordprocessingML parts we need
//! 2. Parts -> attributes: resolve styles and read the body

mod wordml;

pub use wordml::{DocumentBody, StyleSheet, ThemeFonts};

use super::extractor::AttributeExtractor;
use crate::error::ExtractError;
use crate::types::*;
use anyhow::Result;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const THEME_PART: &str = "word/theme/theme1.xml";
const APP_PART: &str = "docProps/app.xml";

/// Raw XML parts of a DOCX package.
#[derive(Debug, Clone, Default)]
pub struct DocxParts {
    pub document: String,
    pub styles: Option<String>,
    pub theme: Option<String>,
    pub app: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Step 1: unzip the parts.
    pub fn read_parts(&self, bytes: &[u8]) -> Result<DocxParts, ExtractError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let document = read_part(&mut archive, DOCUMENT_PART)?.ok_or(ExtractError::MissingPart(DOCUMENT_PART))?;

        Ok(DocxParts {
            document,
            styles: read_part(&mut archive, STYLES_PART)?,
            theme: read_part(&mut archive, THEME_PART)?,
            app: read_part(&mut archive, APP_PART)?,
        })
    }

    /// Step 2: parts to attributes.
    pub fn parse_parts(&self, parts: &DocxParts) -> Result<ExtractedAttributes, ExtractError> {
        let styles = match &parts.styles {
            Some(xml) => StyleSheet::parse(xml)?,
            None => StyleSheet::default(),
        };
        let theme = match &parts.theme {
            Some(xml) => ThemeFonts::parse(xml)?,
            None => ThemeFonts::default(),
        };
        let body = DocumentBody::parse(&parts.document, &styles, &theme)?;
        let pages = match &parts.app {
            Some(xml) => wordml::parse_page_count(xml)?,
            None => None,
        };

        let page_size = body.page_size.unwrap_or_else(|| {
            debug!("No w:pgSz in document, assuming US Letter");
            PageSize::LETTER
        });
        let margins = body.margins.unwrap_or_else(|| {
            debug!("No w:pgMar in document, assuming 1in margins");
            Margins::uniform(1.0)
        });
        let page_count = pages.unwrap_or(body.page_breaks + 1);

        debug!(
            "Extracted {} paragraphs, {} pages from DOCX",
            body.paragraphs.len(),
            page_count
        );

        Ok(ExtractedAttributes {
            page: PageAttributes {
                margins,
                page_size,
                page_count,
            },
            paragraphs: body.paragraphs,
        })
    }
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &'static str,
) -> Result<Option<String>, ExtractError> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(Some(content))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl AttributeExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedAttributes> {
        let parts = self.read_parts(bytes)?;
        Ok(self.parse_parts(&parts)?)
    }

    fn name(&self) -> &str {
        "DOCX"
    }

    fn supports_file_type(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
    }
}
