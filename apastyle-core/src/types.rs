use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// EXTRACTED ATTRIBUTES
// ============================================================================

/// Horizontal paragraph alignment as reported by the source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Role a paragraph plays, when the source format says so explicitly
/// (e.g. a paragraph styled "Heading 2").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleHint {
    Body,
    Heading,
    Reference,
    TitlePage,
}

/// Formatting attributes of one paragraph. Order in the enclosing list is
/// document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphAttributes {
    pub text: String,
    pub font_name: String,
    /// Points
    pub font_size: f32,
    /// Emphasis of the paragraph's leading text
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub alignment: Alignment,
    #[serde(default)]
    pub left_indent_inches: f32,
    /// Negative values are a hanging indent
    #[serde(default)]
    pub first_line_indent_inches: f32,
    /// Multiple of single spacing (2.0 = double)
    pub line_spacing: f32,
    /// Points of extra space above and below the paragraph
    #[serde(default)]
    pub space_before_pt: f32,
    #[serde(default)]
    pub space_after_pt: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_hint: Option<RoleHint>,
}

impl ParagraphAttributes {
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        line_spacing: f32,
    ) -> Self {
        Self {
            text: text.into(),
            font_name: font_name.into(),
            font_size,
            bold: false,
            italic: false,
            alignment: Alignment::Left,
            left_indent_inches: 0.0,
            first_line_indent_inches: 0.0,
            line_spacing,
            space_before_pt: 0.0,
            space_after_pt: 0.0,
            role_hint: None,
        }
    }

    pub fn with_emphasis(mut self, bold: bool, italic: bool) -> Self {
        self.bold = bold;
        self.italic = italic;
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_indents(mut self, left_inches: f32, first_line_inches: f32) -> Self {
        self.left_indent_inches = left_inches;
        self.first_line_indent_inches = first_line_inches;
        self
    }

    pub fn with_paragraph_spacing(mut self, before_pt: f32, after_pt: f32) -> Self {
        self.space_before_pt = before_pt;
        self.space_after_pt = after_pt;
        self
    }

    pub fn with_role(mut self, role: RoleHint) -> Self {
        self.role_hint = Some(role);
        self
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Short, single-line preview used in finding messages.
    pub fn preview(&self) -> String {
        let text = self.text.trim();
        if text.chars().count() > 50 {
            let head: String = text.chars().take(47).collect();
            format!("{head}...")
        } else {
            text.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarginSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl MarginSide {
    pub const ALL: [MarginSide; 4] = [
        MarginSide::Top,
        MarginSide::Bottom,
        MarginSide::Left,
        MarginSide::Right,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarginSide::Top => "top",
            MarginSide::Bottom => "bottom",
            MarginSide::Left => "left",
            MarginSide::Right => "right",
        }
    }
}

impl fmt::Display for MarginSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Margins {
    pub fn uniform(inches: f32) -> Self {
        Self {
            top: inches,
            bottom: inches,
            left: inches,
            right: inches,
        }
    }

    pub fn get(&self, side: MarginSide) -> f32 {
        match side {
            MarginSide::Top => self.top,
            MarginSide::Bottom => self.bottom,
            MarginSide::Left => self.left,
            MarginSide::Right => self.right,
        }
    }
}

/// Physical page size in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width_inches: f32,
    pub height_inches: f32,
}

impl PageSize {
    pub const LETTER: PageSize = PageSize {
        width_inches: 8.5,
        height_inches: 11.0,
    };

    pub const A4: PageSize = PageSize {
        width_inches: 8.27,
        height_inches: 11.69,
    };
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}\" x {:.2}\"", self.width_inches, self.height_inches)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageAttributes {
    pub margins: Margins,
    pub page_size: PageSize,
    #[serde(default)]
    pub page_count: u32,
}

/// Everything an extractor reads out of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAttributes {
    pub page: PageAttributes,
    pub paragraphs: Vec<ParagraphAttributes>,
}

// ============================================================================
// FINDINGS AND REPORTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Error, Severity::Warning, Severity::Info];
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    Page,
    Font,
    Spacing,
    Heading,
    Reference,
    /// Attribute values that could not be read sensibly
    Integrity,
    /// Model-level validation of a document before layout
    Document,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 7] = [
        CheckCategory::Page,
        CheckCategory::Font,
        CheckCategory::Spacing,
        CheckCategory::Heading,
        CheckCategory::Reference,
        CheckCategory::Integrity,
        CheckCategory::Document,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CheckCategory::Page => "Page layout",
            CheckCategory::Font => "Fonts",
            CheckCategory::Spacing => "Line spacing",
            CheckCategory::Heading => "Headings",
            CheckCategory::Reference => "References",
            CheckCategory::Integrity => "Unreadable attributes",
            CheckCategory::Document => "Document",
        }
    }
}

/// Where a finding applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Location {
    Paragraph { index: usize },
    Paragraphs { indices: Vec<usize> },
    Margin { side: MarginSide },
    Page,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 8;
        match self {
            Location::Paragraph { index } => write!(f, "paragraph {index}"),
            Location::Paragraphs { indices } => {
                let listed: Vec<String> = indices.iter().take(SHOWN).map(|i| i.to_string()).collect();
                write!(f, "paragraphs {}", listed.join(", "))?;
                if indices.len() > SHOWN {
                    write!(f, " and {} more", indices.len() - SHOWN)?;
                }
                Ok(())
            }
            Location::Margin { side } => write!(f, "{side} margin"),
            Location::Page => f.write_str("page"),
        }
    }
}

/// One itemized result of a check. Built once and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub category: CheckCategory,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Finding {
    pub fn violation(
        rule_id: impl Into<String>,
        category: CheckCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            category,
            severity,
            message: message.into(),
            location: None,
            passed: false,
            expected: None,
            actual: None,
        }
    }

    /// A passing (or purely informational) finding. Always `Info` severity.
    pub fn pass(rule_id: impl Into<String>, category: CheckCategory, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            category,
            severity: Severity::Info,
            message: message.into(),
            location: None,
            passed: true,
            expected: None,
            actual: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn expected_actual(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    /// A failed check at error severity.
    pub fn is_blocking(&self) -> bool {
        !self.passed && self.severity == Severity::Error
    }
}

/// Running count of checks performed and passed. The only way to obtain a
/// score or a `ComplianceReport`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckTally {
    total: u32,
    passed: u32,
}

impl CheckTally {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn passed(&self) -> u32 {
        self.passed
    }

    /// `round(100 * passed / total)`, 100 when nothing was checked.
    pub fn score(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let ratio = f64::from(self.passed) * 100.0 / f64::from(self.total);
        ratio.round().clamp(0.0, 100.0) as u8
    }
}

/// Findings in checker order plus the derived score. Only built from a
/// tally, so it serializes but never deserializes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceReport {
    findings: Vec<Finding>,
    score: u8,
    total_checks: u32,
    checks_passed: u32,
}

impl ComplianceReport {
    pub fn from_tally(findings: Vec<Finding>, tally: CheckTally) -> Self {
        Self {
            findings,
            score: tally.score(),
            total_checks: tally.total(),
            checks_passed: tally.passed(),
        }
    }

    pub fn empty() -> Self {
        Self::from_tally(Vec::new(), CheckTally::default())
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn total_checks(&self) -> u32 {
        self.total_checks
    }

    pub fn checks_passed(&self) -> u32 {
        self.checks_passed
    }

    pub fn violations(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| !f.passed)
    }

    /// True when no error-severity finding failed. Warnings do not block.
    pub fn is_compliant(&self) -> bool {
        !self.findings.iter().any(Finding::is_blocking)
    }
}
