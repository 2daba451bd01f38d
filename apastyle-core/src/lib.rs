// APA Style Core Library
//
// Extracts formatting attributes from academic documents and checks them
// against the APA 7 rule set. Also lays out document models the way a
// conforming renderer would.

pub mod config;
pub mod document;
pub mod error;
pub mod extractors;
pub mod fingerprint;
pub mod processor;
pub mod report;
pub mod rules;
pub mod types;

// Re-export main types and functions for easy use
pub use types::*;
pub use config::{ProfileManager, RuleSet, StyleProfile, DEFAULT_PROFILE};
pub use document::{AcademicDocument, AttributeDumpRenderer, DocumentRenderer};
pub use error::{ExtractError, ProfileError};
pub use extractors::{AttributeExtractor, DocxExtractor, JsonDumpExtractor};
pub use processor::{CheckRecord, ComplianceProcessor};
pub use report::{render_text, ReportView};
pub use rules::{check, ComplianceChecker};
