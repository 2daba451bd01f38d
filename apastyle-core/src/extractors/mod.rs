//! Attribute extractors
//!
//! ```text
//! Document (DOCX, JSON dump)
//!     ↓
//! [Format-specific AttributeExtractor]
//!     ↓
//! ExtractedAttributes (page record + ordered paragraph records)
//!     ↓
//! [ComplianceChecker]
//! ```

pub mod docx;
pub mod dump;
pub mod extractor;

pub use docx::DocxExtractor;
pub use dump::JsonDumpExtractor;
pub use extractor::AttributeExtractor;
