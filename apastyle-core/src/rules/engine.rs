use crate::config::{DetectionConfig, PipelineConfig, RuleSet, StyleProfile};
use crate::error::ProfileError;
use crate::types::*;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use tracing::{debug, info, warn};

use super::detection::{ObservedHeading, RoleDetector};
use super::headings::{classify_heading, HeadingAttribute, HeadingStage};
use super::page::PageLayoutStage;
use super::paragraphs::{ParagraphIndentStage, ParagraphSpacingStage};
use super::references::ReferenceStage;
use super::typography::{FontStage, LineSpacingStage};

/// A check stage appends findings and records how many checks it ran.
pub trait CheckStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink);
    fn name(&self) -> &str;
}

/// Inputs shared by every stage of one run.
pub struct CheckContext<'a> {
    pub rule_set: &'a RuleSet,
    pub page: &'a PageAttributes,
    pub paragraphs: &'a [ParagraphAttributes],
    pub layout: &'a DocumentLayout,
}

/// Collects findings and the check tally for one run.
#[derive(Debug, Default)]
pub struct FindingSink {
    findings: Vec<Finding>,
    tally: CheckTally,
}

impl FindingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one check.
    pub fn record(&mut self, passed: bool) {
        self.tally.record(passed);
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn tally(&self) -> CheckTally {
        self.tally
    }

    pub fn into_report(self) -> ComplianceReport {
        ComplianceReport::from_tally(self.findings, self.tally)
    }
}

/// Error finding for a value that cannot be meaningfully compared.
pub fn unreadable(message: impl Into<String>, location: Location) -> Finding {
    Finding::violation(
        "attribute.unreadable",
        CheckCategory::Integrity,
        Severity::Error,
        message,
    )
    .at(location)
}

/// Paragraphs sharing one attribute value.
pub(crate) struct Group<V> {
    pub value: V,
    pub indices: Vec<usize>,
}

/// Groups in order of first appearance. A group's value comes from its
/// first member, so the key must capture everything the verdict depends on.
pub(crate) fn group_paragraphs<K, V>(entries: impl Iterator<Item = (usize, K, V)>) -> Vec<Group<V>>
where
    K: Eq + Hash,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Group<V>> = Vec::new();
    for (index, key, value) in entries {
        match positions.get(&key) {
            Some(&position) => groups[position].indices.push(index),
            None => {
                positions.insert(key, groups.len());
                groups.push(Group {
                    value,
                    indices: vec![index],
                });
            }
        }
    }
    groups
}

// ============================================================================
// DOCUMENT LAYOUT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedHeading {
    pub index: usize,
    pub observed: ObservedHeading,
    /// Exact or closest heading level
    pub level: u8,
    /// Attributes that differ from the rule for `level`; empty on exact match
    pub mismatches: Vec<HeadingAttribute>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRegion {
    pub title_index: usize,
    pub entries: Vec<usize>,
}

/// Paragraph roles worked out once per run and shared by the stages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentLayout {
    pub headings: Vec<DetectedHeading>,
    pub references: Option<ReferenceRegion>,
    /// The abstract's own paragraph, which APA leaves unindented
    pub abstract_index: Option<usize>,
}

// ============================================================================
// CHECKER
// ============================================================================

/// Runs the profile's check pipeline over extracted attributes.
/// Holds no mutable state; share it freely across threads.
#[derive(Debug, Clone)]
pub struct ComplianceChecker {
    rule_set: RuleSet,
    pipeline: PipelineConfig,
    detector: RoleDetector,
}

impl ComplianceChecker {
    pub fn new(profile: &StyleProfile) -> Result<Self, ProfileError> {
        profile.validate()?;
        Self::from_parts(profile.rule_set.clone(), profile.pipeline.clone(), &profile.detection)
    }

    pub fn from_parts(
        rule_set: RuleSet,
        pipeline: PipelineConfig,
        detection: &DetectionConfig,
    ) -> Result<Self, ProfileError> {
        Ok(Self {
            rule_set,
            pipeline,
            detector: RoleDetector::new(detection)?,
        })
    }

    pub fn check(&self, page: &PageAttributes, paragraphs: &[ParagraphAttributes]) -> ComplianceReport {
        if paragraphs.is_empty() {
            debug!("No paragraphs to check, returning empty report");
            return ComplianceReport::empty();
        }

        let layout = self.analyze(paragraphs);
        debug!(
            "Detected {} headings, reference list: {}",
            layout.headings.len(),
            layout.references.as_ref().map_or(0, |r| r.entries.len())
        );

        let ctx = CheckContext {
            rule_set: &self.rule_set,
            page,
            paragraphs,
            layout: &layout,
        };
        let mut sink = FindingSink::new();

        for stage_config in &self.pipeline.stages {
            if !stage_config.enabled {
                debug!("Skipping disabled stage: {}", stage_config.name);
                continue;
            }
            self.run_stage_by_name(&stage_config.name, &ctx, &mut sink);
        }

        let report = sink.into_report();
        info!(
            "Checked {} paragraphs: score {} ({}/{} checks passed)",
            paragraphs.len(),
            report.score(),
            report.checks_passed(),
            report.total_checks()
        );
        report
    }

    fn run_stage_by_name(&self, stage_name: &str, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let stage: Box<dyn CheckStage> = match stage_name {
            "PageLayout" => Box::new(PageLayoutStage),
            "Fonts" => Box::new(FontStage),
            "LineSpacing" => Box::new(LineSpacingStage),
            "ParagraphSpacing" => Box::new(ParagraphSpacingStage),
            "ParagraphIndent" => Box::new(ParagraphIndentStage),
            "Headings" => Box::new(HeadingStage),
            "References" => Box::new(ReferenceStage),
            _ => {
                warn!("Unknown check stage: {stage_name}. Skipping...");
                return;
            }
        };

        let findings_before = sink.findings().len();
        let checks_before = sink.tally().total();
        stage.run(ctx, sink);
        debug!(
            "Stage {}: {} findings, {} checks",
            stage.name(),
            sink.findings().len() - findings_before,
            sink.tally().total() - checks_before
        );
    }

    /// Classify headings and locate the reference list.
    pub fn analyze(&self, paragraphs: &[ParagraphAttributes]) -> DocumentLayout {
        let headings: Vec<DetectedHeading> = self
            .detector
            .heading_candidates(paragraphs)
            .into_iter()
            .map(|index| {
                let observed = self.detector.observe(&paragraphs[index]);
                let (level, mismatches) = classify_heading(&observed, &self.rule_set);
                DetectedHeading {
                    index,
                    observed,
                    level,
                    mismatches,
                }
            })
            .collect();

        let references = self.locate_references(paragraphs, &headings);
        let abstract_index = self.locate_abstract(paragraphs, &headings);
        DocumentLayout {
            headings,
            references,
            abstract_index,
        }
    }

    /// First non-blank paragraph between an abstract title and the next heading.
    fn locate_abstract(&self, paragraphs: &[ParagraphAttributes], headings: &[DetectedHeading]) -> Option<usize> {
        let position = headings
            .iter()
            .position(|h| self.detector.is_abstract_title(&h.observed.text))?;
        let start = headings[position].index + 1;
        let end = headings.get(position + 1).map_or(paragraphs.len(), |h| h.index);
        (start..end).find(|&i| !paragraphs[i].is_blank())
    }

    /// Paragraphs after the first references title, up to the next level-1
    /// heading or the end of the document.
    fn locate_references(
        &self,
        paragraphs: &[ParagraphAttributes],
        headings: &[DetectedHeading],
    ) -> Option<ReferenceRegion> {
        let position = headings
            .iter()
            .position(|h| self.detector.is_reference_title(&h.observed.text))?;
        let title_index = headings[position].index;
        let end = headings[position + 1..]
            .iter()
            .find(|h| h.level == 1)
            .map_or(paragraphs.len(), |h| h.index);
        let heading_indices: HashSet<usize> = headings.iter().map(|h| h.index).collect();

        let entries = (title_index + 1..end)
            .filter(|i| !heading_indices.contains(i))
            .filter(|&i| {
                let paragraph = &paragraphs[i];
                !paragraph.is_blank() && paragraph.role_hint != Some(RoleHint::TitlePage)
            })
            .collect();

        Some(ReferenceRegion {
            title_index,
            entries,
        })
    }
}

/// Check attributes against a rule set with the default heuristics and the
/// full stage pipeline.
pub fn check(
    rule_set: &RuleSet,
    page: &PageAttributes,
    paragraphs: &[ParagraphAttributes],
) -> ComplianceReport {
    let checker = ComplianceChecker::from_parts(
        rule_set.clone(),
        PipelineConfig::default(),
        &DetectionConfig::default(),
    )
    .unwrap_or_else(|e| panic!("built-in detection patterns must compile: {e}"));
    checker.check(page, paragraphs)
}
