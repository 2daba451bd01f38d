//! Academic document model, model-level validation and layout.
//!
//! ```text
//! AcademicDocument (YAML/JSON model)
//!     ↓ validate()      -> Vec<Finding>
//!     ↓ layout(rules)   -> ExtractedAttributes
//! [DocumentRenderer]    -> output file
//! ```
//!
//! `layout` produces the paragraph and page records a conforming renderer
//! would write, so a laid-out valid model passes the compliance checker.

use crate::config::{FontSpec, HeadingAlignment, HeadingRule, Placement, CaseStyle, RuleSet, DEFAULT_MINOR_WORDS};
use crate::rules::detection::{leading_token, to_sentence_case, to_title_case};
use crate::types::*;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

const MAX_TITLE_WORDS: usize = 12;
const MAX_RUNNING_HEAD_CHARS: usize = 50;
const MAX_ABSTRACT_WORDS: usize = 250;
const TITLE_PAGE_BLANK_LINES: usize = 3;
/// Rough capacity of a double-spaced page
const WORDS_PER_PAGE: usize = 250;

// Any parenthesized text; split on ';' into individual citations
static PAREN_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^()]+)\)").expect("valid group regex"));
// "Walker, 2017" / "Diekelmann & Born, 2010a" / "Kim et al., n.d."
static PAREN_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?),\s*(\d{4}|n\.d\.)[a-z]?$").expect("valid citation regex"));
// "Walker (2017)" / "Diekelmann and Born (2010)" / "Kim et al. (2021)"
static NARRATIVE_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\p{Lu}[\p{L}'\-]+)(?:\s+(?:et\s+al\.|(?:&|and|y)\s+\p{Lu}[\p{L}'\-]+))?\s+\((\d{4}|n\.d\.)[a-z]?\)")
        .expect("valid narrative citation regex")
});
// Publication year of a reference entry: "(2017)." / "(2020, March 3)." / "(n.d.)."
static REFERENCE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4}|n\.d\.)[a-z]?[,)]").expect("valid reference year regex"));

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentVariant {
    #[default]
    Student,
    Professional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitlePage {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Professional papers only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub running_head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_note: Option<String>,
    #[serde(default)]
    pub variant: DocumentVariant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub subsections: Vec<Section>,
}

fn default_level() -> u8 {
    1
}

impl Section {
    pub fn new(heading: impl Into<String>, level: u8) -> Self {
        Self {
            heading: Some(heading.into()),
            level,
            paragraphs: Vec::new(),
            subsections: Vec::new(),
        }
    }

    pub fn with_paragraph(mut self, text: impl Into<String>) -> Self {
        self.paragraphs.push(text.into());
        self
    }

    pub fn with_subsection(mut self, section: Section) -> Self {
        self.subsections.push(section);
        self
    }

    fn word_count(&self) -> usize {
        self.paragraphs.iter().map(|p| count_words(p)).sum::<usize>()
            + self.subsections.iter().map(Section::word_count).sum::<usize>()
    }
}

/// A complete paper. References are already-formatted entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicDocument {
    pub title_page: TitlePage,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub appendices: Vec<Section>,
    #[serde(default = "default_font")]
    pub font: FontSpec,
}

fn default_font() -> FontSpec {
    FontSpec::new("Times New Roman", 12.0)
}

fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

// ============================================================================
// VALIDATION
// ============================================================================

fn document_issue(rule_id: &str, severity: Severity, message: String) -> Finding {
    Finding::violation(rule_id, CheckCategory::Document, severity, message)
}

impl AcademicDocument {
    /// Model-level problems; empty when the model is valid.
    pub fn validate(&self) -> Vec<Finding> {
        let mut issues = Vec::new();
        let tp = &self.title_page;

        if tp.title.trim().is_empty() {
            issues.push(document_issue(
                "document.title",
                Severity::Error,
                "The title page has no title".to_string(),
            ));
        }
        let title_words = count_words(&tp.title);
        if title_words > MAX_TITLE_WORDS {
            issues.push(
                document_issue(
                    "document.title_length",
                    Severity::Warning,
                    format!("Title has {title_words} words; keep it to {MAX_TITLE_WORDS} or fewer"),
                )
                .expected_actual(format!("≤ {MAX_TITLE_WORDS} words"), format!("{title_words} words")),
            );
        }

        if tp.authors.iter().all(|a| a.trim().is_empty()) {
            issues.push(document_issue(
                "document.authors",
                Severity::Error,
                "At least one author is required".to_string(),
            ));
        }

        if tp.variant == DocumentVariant::Professional {
            match tp.running_head.as_deref().map(str::trim) {
                None | Some("") => issues.push(document_issue(
                    "document.running_head",
                    Severity::Error,
                    "Professional papers need a running head".to_string(),
                )),
                Some(head) => {
                    let chars = head.chars().count();
                    if chars > MAX_RUNNING_HEAD_CHARS {
                        issues.push(
                            document_issue(
                                "document.running_head",
                                Severity::Error,
                                format!("Running head is {chars} characters long"),
                            )
                            .expected_actual(
                                format!("≤ {MAX_RUNNING_HEAD_CHARS} characters"),
                                format!("{chars} characters"),
                            ),
                        );
                    }
                }
            }
        }

        if let Some(abstract_text) = &self.abstract_text {
            let words = count_words(abstract_text);
            if words > MAX_ABSTRACT_WORDS {
                issues.push(
                    document_issue(
                        "document.abstract_length",
                        Severity::Warning,
                        format!("Abstract has {words} words"),
                    )
                    .expected_actual(format!("≤ {MAX_ABSTRACT_WORDS} words"), format!("{words} words")),
                );
            }
        }

        for section in self.sections.iter().chain(&self.appendices) {
            validate_section(section, None, &mut issues);
        }

        self.cross_check_citations(&mut issues);

        issues
    }

    /// Every in-text citation needs a reference entry and every entry needs a
    /// citation. Authors match on the folded first surname, years exactly.
    fn cross_check_citations(&self, issues: &mut Vec<Finding>) {
        let mut texts = Vec::new();
        for section in self.sections.iter().chain(&self.appendices) {
            collect_paragraphs(section, &mut texts);
        }
        let mut citations: Vec<Citation> = Vec::new();
        for text in texts {
            for citation in citations_in(text) {
                if !citations.iter().any(|c| c.key == citation.key && c.year == citation.year) {
                    citations.push(citation);
                }
            }
        }

        let entries: Vec<&String> = self.references.iter().filter(|r| !r.trim().is_empty()).collect();
        if entries.is_empty() {
            if !citations.is_empty() {
                issues.push(document_issue(
                    "document.no_references",
                    Severity::Error,
                    format!("The text has {} citation(s) but no reference list", citations.len()),
                ));
            }
            return;
        }

        let keys: Vec<(String, Option<String>)> = entries
            .iter()
            .map(|entry| {
                let year = REFERENCE_YEAR.captures(entry).map(|c| c[1].to_string());
                (leading_token(entry), year)
            })
            .collect();
        let mut cited = vec![false; entries.len()];

        for citation in &citations {
            let found = keys
                .iter()
                .position(|(key, year)| *key == citation.key && year.as_deref() == Some(citation.year.as_str()));
            match found {
                Some(index) => cited[index] = true,
                None => issues.push(
                    document_issue(
                        "document.citation_orphan",
                        Severity::Error,
                        format!(
                            "Citation ({}, {}) has no matching reference entry",
                            citation.author, citation.year
                        ),
                    )
                    .expected_actual("a reference entry by the same author and year", "none"),
                ),
            }
        }

        for (entry, _) in entries.iter().zip(&cited).filter(|(_, cited)| !**cited) {
            let preview: String = entry.trim().chars().take(40).collect();
            issues.push(document_issue(
                "document.reference_uncited",
                Severity::Warning,
                format!("Reference '{preview}' is never cited in the text"),
            ));
        }
    }
}

/// An in-text citation reduced to its matching key.
#[derive(Debug, Clone, PartialEq)]
struct Citation {
    /// First surname as written
    author: String,
    /// Folded surname, comparable with a reference entry's sort key
    key: String,
    /// Four-digit year or "n.d."
    year: String,
}

fn collect_paragraphs<'a>(section: &'a Section, texts: &mut Vec<&'a str>) {
    texts.extend(section.paragraphs.iter().map(String::as_str));
    for sub in &section.subsections {
        collect_paragraphs(sub, texts);
    }
}

/// Parenthetical citations first, then narrative ones, each in text order.
fn citations_in(text: &str) -> Vec<Citation> {
    let mut found = Vec::new();
    let mut push = |author: &str, year: &str| {
        let key = leading_token(author);
        if !key.is_empty() {
            found.push(Citation {
                author: author.to_string(),
                key,
                year: year.to_string(),
            });
        }
    };

    for group in PAREN_GROUP.captures_iter(text) {
        for part in group[1].split(';') {
            let Some(captures) = PAREN_CITATION.captures(part.trim()) else {
                continue;
            };
            // Skip lead-ins such as "see" or "e.g.,"
            let author = captures[1]
                .split_whitespace()
                .find(|word| word.chars().next().is_some_and(char::is_uppercase));
            if let Some(author) = author {
                push(author.trim_end_matches(','), &captures[2]);
            }
        }
    }
    for captures in NARRATIVE_CITATION.captures_iter(text) {
        push(&captures[1], &captures[2]);
    }
    found
}

fn validate_section(section: &Section, parent_level: Option<u8>, issues: &mut Vec<Finding>) {
    let name = section.heading.as_deref().unwrap_or("(untitled)");

    if !(1..=5).contains(&section.level) {
        issues.push(document_issue(
            "document.heading_level",
            Severity::Error,
            format!("Section '{name}' has level {}; levels run from 1 to 5", section.level),
        ));
    } else if let Some(parent) = parent_level {
        if section.level != parent + 1 {
            issues.push(
                document_issue(
                    "document.heading_nesting",
                    Severity::Warning,
                    format!("Subsection '{name}' should be one level below its parent"),
                )
                .expected_actual(format!("level {}", parent + 1), format!("level {}", section.level)),
            );
        }
    }

    for sub in &section.subsections {
        validate_section(sub, Some(section.level), issues);
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

impl AcademicDocument {
    /// Paragraph and page attributes of this document as a conforming
    /// renderer would produce them under `rules`.
    pub fn layout(&self, rules: &RuleSet) -> ExtractedAttributes {
        let mut writer = LayoutWriter::new(rules, &self.font);

        self.layout_title_page(&mut writer);

        if let Some(abstract_text) = &self.abstract_text {
            writer.heading("Abstract", 1, None);
            writer.body(abstract_text, 0.0);
            if !self.keywords.is_empty() {
                let keywords = format!("Keywords: {}", self.keywords.join(", "));
                let paragraph = writer.paragraph(keywords, RoleHint::Body).with_emphasis(false, true);
                writer.push(paragraph.with_indents(0.0, rules.paragraph_indent_inches));
            }
            writer.page_break();
        }

        // The title opens the first page of text
        writer.heading(&self.title_page.title, 1, None);
        for section in &self.sections {
            writer.section(section);
        }

        if !self.references.is_empty() {
            writer.page_break();
            writer.heading("References", 1, None);
            let mut entries: Vec<&String> = self.references.iter().collect();
            entries.sort_by_cached_key(|e| (leading_token(e), e.to_lowercase()));
            for entry in entries {
                let paragraph = writer.paragraph(entry.trim(), RoleHint::Reference).with_indents(
                    rules.reference_indent_inches,
                    -rules.reference_indent_inches,
                );
                writer.push(paragraph);
            }
        }

        let lettered = self.appendices.len() > 1;
        for (i, appendix) in self.appendices.iter().enumerate() {
            writer.page_break();
            let label = if lettered {
                format!("Appendix {}", appendix_letter(i))
            } else {
                "Appendix".to_string()
            };
            writer.heading(&label, 1, None);
            writer.section(appendix);
        }

        let body_words = count_words(&self.title_page.title)
            + self.sections.iter().map(Section::word_count).sum::<usize>();
        let body_pages = body_words.div_ceil(WORDS_PER_PAGE).max(1);
        let page_count = writer.page_breaks + body_pages as u32;
        debug!(
            "Laid out {} paragraphs over an estimated {} pages",
            writer.paragraphs.len(),
            page_count
        );

        ExtractedAttributes {
            page: PageAttributes {
                margins: Margins {
                    top: rules.expected_margin(MarginSide::Top),
                    bottom: rules.expected_margin(MarginSide::Bottom),
                    left: rules.expected_margin(MarginSide::Left),
                    right: rules.expected_margin(MarginSide::Right),
                },
                page_size: rules.page_size,
                page_count,
            },
            paragraphs: writer.paragraphs,
        }
    }

    fn layout_title_page(&self, writer: &mut LayoutWriter<'_>) {
        let tp = &self.title_page;

        for _ in 0..TITLE_PAGE_BLANK_LINES {
            writer.title_line("", false);
        }
        writer.title_line(&to_title_case(tp.title.trim(), DEFAULT_MINOR_WORDS), true);
        writer.title_line("", false);
        writer.title_line(&join_authors(&tp.authors), false);
        writer.title_line(&tp.affiliation, false);

        match tp.variant {
            DocumentVariant::Student => {
                for line in [&tp.course, &tp.instructor].into_iter().flatten() {
                    writer.title_line(line, false);
                }
                if let Some(date) = tp.due_date {
                    writer.title_line(&date.format("%B %-d, %Y").to_string(), false);
                }
            }
            DocumentVariant::Professional => {
                if let Some(note) = &tp.author_note {
                    writer.title_line("", false);
                    writer.title_line("Author Note", true);
                    let paragraph = writer
                        .paragraph(note.trim(), RoleHint::TitlePage)
                        .with_indents(0.0, writer.rules.paragraph_indent_inches);
                    writer.push(paragraph);
                }
            }
        }

        writer.page_break();
    }
}

fn join_authors(authors: &[String]) -> String {
    match authors {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

fn appendix_letter(index: usize) -> String {
    let mut n = index;
    let mut label = String::new();
    loop {
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    label
}

/// Accumulates laid-out paragraphs in document order.
struct LayoutWriter<'a> {
    rules: &'a RuleSet,
    font: &'a FontSpec,
    paragraphs: Vec<ParagraphAttributes>,
    page_breaks: u32,
}

impl<'a> LayoutWriter<'a> {
    fn new(rules: &'a RuleSet, font: &'a FontSpec) -> Self {
        Self {
            rules,
            font,
            paragraphs: Vec::new(),
            page_breaks: 0,
        }
    }

    fn paragraph(&self, text: impl Into<String>, role: RoleHint) -> ParagraphAttributes {
        ParagraphAttributes::new(text, self.font.name.clone(), self.font.size_pt, self.rules.line_spacing)
            .with_role(role)
    }

    fn push(&mut self, paragraph: ParagraphAttributes) {
        self.paragraphs.push(paragraph);
    }

    fn page_break(&mut self) {
        self.page_breaks += 1;
    }

    fn title_line(&mut self, text: &str, bold: bool) {
        let paragraph = self
            .paragraph(text.trim(), RoleHint::TitlePage)
            .with_alignment(Alignment::Center)
            .with_emphasis(bold, false);
        self.push(paragraph);
    }

    fn body(&mut self, text: &str, first_line_indent: f32) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let paragraph = self
            .paragraph(text, RoleHint::Body)
            .with_indents(0.0, first_line_indent);
        self.push(paragraph);
    }

    /// A heading formatted per the rule for `level`. Run-in headings carry
    /// the first paragraph of their section on the same line.
    fn heading(&mut self, text: &str, level: u8, run_in_body: Option<&str>) {
        let rule: &HeadingRule = self.rules.heading_rule(level.clamp(1, 5));
        let mut heading = match rule.case {
            CaseStyle::Title => to_title_case(text.trim(), DEFAULT_MINOR_WORDS),
            CaseStyle::Sentence => to_sentence_case(text.trim()),
        };

        let (alignment, first_line) = match rule.alignment {
            HeadingAlignment::Centered => (Alignment::Center, 0.0),
            HeadingAlignment::FlushLeft => (Alignment::Left, 0.0),
            HeadingAlignment::Indented => (Alignment::Left, self.rules.paragraph_indent_inches),
        };

        if rule.placement == Placement::RunIn {
            if !heading.ends_with(['.', '!', '?']) {
                heading.push('.');
            }
            if let Some(body) = run_in_body.map(str::trim).filter(|b| !b.is_empty()) {
                heading = format!("{heading} {body}");
            }
        }

        let paragraph = self
            .paragraph(heading, RoleHint::Heading)
            .with_alignment(alignment)
            .with_emphasis(rule.bold, rule.italic)
            .with_indents(0.0, first_line);
        self.push(paragraph);
    }

    fn section(&mut self, section: &Section) {
        let level = section.level.clamp(1, 5);
        let mut paragraphs = section.paragraphs.iter().map(String::as_str);

        if let Some(heading) = section.heading.as_deref().filter(|h| !h.trim().is_empty()) {
            if self.rules.heading_rule(level).placement == Placement::RunIn {
                self.heading(heading, level, paragraphs.next());
            } else {
                self.heading(heading, level, None);
            }
        }

        let indent = self.rules.paragraph_indent_inches;
        for text in paragraphs {
            self.body(text, indent);
        }
        for sub in &section.subsections {
            self.section(sub);
        }
    }
}

// ============================================================================
// RENDERERS
// ============================================================================

/// Writes a document to some output format.
pub trait DocumentRenderer {
    /// Render `document` under `rules` to `output`, returning the written path
    fn render(&self, document: &AcademicDocument, rules: &RuleSet, output: &Path) -> Result<PathBuf>;

    fn name(&self) -> &str;
}

/// Writes the laid-out attribute records as pretty JSON, readable again by
/// the JSON dump extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeDumpRenderer;

impl AttributeDumpRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for AttributeDumpRenderer {
    fn render(&self, document: &AcademicDocument, rules: &RuleSet, output: &Path) -> Result<PathBuf> {
        let attrs = document.layout(rules);
        let json = serde_json::to_string_pretty(&attrs).context("Failed to serialize laid-out attributes")?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
        std::fs::write(output, json).with_context(|| format!("Failed to write {}", output.display()))?;

        info!("Wrote {} paragraphs to {}", attrs.paragraphs.len(), output.display());
        Ok(output.to_path_buf())
    }

    fn name(&self) -> &str {
        "attribute dump"
    }
}
