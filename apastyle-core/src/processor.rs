use crate::config::StyleProfile;
use crate::extractors::{AttributeExtractor, DocxExtractor, JsonDumpExtractor};
use crate::fingerprint::{calculate_config_hash, calculate_document_hash};
use crate::rules::ComplianceChecker;
use crate::types::*;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A report plus where it came from. The report itself stays deterministic;
/// the timestamp lives only here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRecord {
    pub source: String,
    pub extractor: String,
    pub profile: String,
    pub document_sha256: String,
    pub rule_set_sha256: String,
    pub checked_at: DateTime<Utc>,
    pub paragraph_count: usize,
    pub page_count: u32,
    pub report: ComplianceReport,
}

type BoxedExtractor = Box<dyn AttributeExtractor + Send + Sync>;

/// File -> extractor -> checker -> `CheckRecord`.
pub struct ComplianceProcessor {
    extractors: Vec<BoxedExtractor>,
    profile: StyleProfile,
    checker: ComplianceChecker,
    rule_set_hash: String,
}

impl ComplianceProcessor {
    /// Processor with the built-in DOCX and JSON-dump extractors
    pub fn new(profile: StyleProfile) -> Result<Self> {
        Self::new_with_extractors(
            profile,
            vec![Box::new(DocxExtractor::new()), Box::new(JsonDumpExtractor::new())],
        )
    }

    /// Create a processor with explicit extractors, tried in order
    pub fn new_with_extractors(profile: StyleProfile, extractors: Vec<BoxedExtractor>) -> Result<Self> {
        let checker = ComplianceChecker::new(&profile)
            .with_context(|| format!("Profile '{}' is invalid", profile.name))?;
        let rule_set_hash = calculate_config_hash(&profile.rule_set)?;

        Ok(Self {
            extractors,
            profile,
            checker,
            rule_set_hash,
        })
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    pub fn extractor_for(&self, path: &Path) -> Option<&(dyn AttributeExtractor + Send + Sync)> {
        self.extractors
            .iter()
            .find(|e| e.supports_file_type(path))
            .map(|e| e.as_ref())
    }

    pub fn check_attributes(&self, attrs: &ExtractedAttributes) -> ComplianceReport {
        self.checker.check(&attrs.page, &attrs.paragraphs)
    }

    pub fn check_file(&self, path: &Path) -> Result<CheckRecord> {
        let extractor = self.extractor_for(path).ok_or_else(|| {
            anyhow!(
                "Unsupported file type: {} (supported: .docx, .json attribute dumps)",
                path.display()
            )
        })?;

        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let document_sha256 = calculate_document_hash(&bytes);
        let attrs = extractor
            .extract(&bytes)
            .with_context(|| format!("{} extraction failed for {}", extractor.name(), path.display()))?;

        info!(
            "Checking {} with profile '{}' ({} extractor)",
            path.display(),
            self.profile.name,
            extractor.name()
        );
        let report = self.check_attributes(&attrs);

        Ok(CheckRecord {
            source: path.display().to_string(),
            extractor: extractor.name().to_string(),
            profile: self.profile.name.clone(),
            document_sha256,
            rule_set_sha256: self.rule_set_hash.clone(),
            checked_at: Utc::now(),
            paragraph_count: attrs.paragraphs.len(),
            page_count: attrs.page.page_count,
            report,
        })
    }

    /// Check each file independently; one failure does not stop the rest.
    pub fn check_files(&self, paths: &[PathBuf]) -> Vec<(PathBuf, Result<CheckRecord>)> {
        paths
            .iter()
            .map(|path| {
                let result = self.check_file(path);
                if let Err(e) = &result {
                    warn!("Skipping {}: {e:#}", path.display());
                }
                (path.clone(), result)
            })
            .collect()
    }
}
