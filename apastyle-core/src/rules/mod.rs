// Compliance checking - delegates to one module per stage:
// - engine.rs: ComplianceChecker, pipeline dispatch, shared layout analysis
// - detection.rs: heading and reference-list heuristics
// - page.rs: margins and page size
// - typography.rs: fonts and line spacing
// - paragraphs.rs: space around paragraphs and first-line indent of body text
// - headings.rs: heading levels and sequence
// - references.rs: hanging indent and alphabetical order

pub mod detection;
pub mod engine;
pub mod headings;
pub mod page;
pub mod paragraphs;
pub mod references;
pub mod typography;

pub use engine::*;
