//! Heading and reference-list heuristics.
//!
//! Everything that guesses at a paragraph's role lives here so the checking
//! stages only deal with already-classified paragraphs.

use crate::config::{DetectionConfig, HeadingAlignment, Placement};
use crate::error::ProfileError;
use crate::types::{Alignment, ParagraphAttributes, RoleHint};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// "Lead sentence. Body continues" - the lead of a run-in heading
static RUN_IN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*([^.!?]+[.!?])\s+(\S.*)$").expect("valid run-in regex"));

/// Capitalization pattern of a heading text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservedCase {
    Title,
    Sentence,
    /// Nothing but the first word (and minor words) to judge by
    Either,
    /// All caps, or starts lowercase
    Other,
}

impl ObservedCase {
    pub fn describe(&self) -> &'static str {
        match self {
            ObservedCase::Title => "title case",
            ObservedCase::Sentence => "sentence case",
            ObservedCase::Either => "title or sentence case",
            ObservedCase::Other => "non-standard case",
        }
    }
}

/// Formatting of a paragraph seen as a heading.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedHeading {
    /// Heading text without run-in body text
    pub text: String,
    /// `None` for right-aligned paragraphs, which match no heading level
    pub alignment: Option<HeadingAlignment>,
    pub bold: bool,
    pub italic: bool,
    pub case: ObservedCase,
    pub placement: Placement,
}

impl ObservedHeading {
    pub fn describe(&self) -> String {
        let alignment = match self.alignment {
            Some(HeadingAlignment::Centered) => "centered",
            Some(HeadingAlignment::FlushLeft) => "flush left",
            Some(HeadingAlignment::Indented) => "indented",
            None => "right aligned",
        };
        let emphasis = match (self.bold, self.italic) {
            (true, true) => "bold italic",
            (true, false) => "bold",
            (false, true) => "italic",
            (false, false) => "plain",
        };
        format!("{alignment}, {emphasis}, {}", self.case.describe())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ParagraphStyle {
    bold: bool,
    italic: bool,
    alignment: Alignment,
}

impl ParagraphStyle {
    fn of(paragraph: &ParagraphAttributes) -> Self {
        Self {
            bold: paragraph.bold,
            italic: paragraph.italic,
            alignment: paragraph.alignment,
        }
    }
}

/// Decides which paragraphs are headings and where the reference list is.
#[derive(Debug, Clone)]
pub struct RoleDetector {
    config: DetectionConfig,
    section_patterns: Vec<Regex>,
    minor_words: HashSet<String>,
    reference_titles: HashSet<String>,
    abstract_titles: HashSet<String>,
}

impl RoleDetector {
    pub fn new(config: &DetectionConfig) -> Result<Self, ProfileError> {
        Ok(Self {
            section_patterns: config.compiled_section_patterns()?,
            minor_words: config.minor_words.iter().map(|w| w.to_lowercase()).collect(),
            reference_titles: config.reference_titles.iter().map(|t| t.to_lowercase()).collect(),
            abstract_titles: config.abstract_titles.iter().map(|t| t.to_lowercase()).collect(),
            config: config.clone(),
        })
    }

    /// Indices of heading paragraphs in document order. An explicit role hint
    /// always wins; unhinted paragraphs go through the heuristic.
    pub fn heading_candidates(&self, paragraphs: &[ParagraphAttributes]) -> Vec<usize> {
        let body = self.dominant_body_style(paragraphs);
        paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| match p.role_hint {
                Some(RoleHint::Heading) => !p.is_blank(),
                Some(_) => false,
                None => self.looks_like_heading(p, body),
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn looks_like_heading(&self, paragraph: &ParagraphAttributes, body: Option<ParagraphStyle>) -> bool {
        let text = paragraph.text.trim();
        if text.is_empty() {
            return false;
        }

        let emphasized = paragraph.bold || paragraph.italic;
        let distinct = emphasized && body != Some(ParagraphStyle::of(paragraph));

        if self.is_short(text) && !self.ends_with_terminal_punctuation(text) {
            return distinct || self.matches_section_pattern(text);
        }

        // Bold lead sentence followed by body text. Italic alone is not
        // enough: reference entries without an author open with an italic title.
        distinct
            && paragraph.bold
            && self
                .split_run_in(text)
                .is_some_and(|(lead, _)| self.is_short(lead))
    }

    /// Most common (bold, italic, alignment) among paragraphs too long to be
    /// headings; ties go to the style seen first.
    fn dominant_body_style(&self, paragraphs: &[ParagraphAttributes]) -> Option<ParagraphStyle> {
        let unhinted = |p: &&ParagraphAttributes| {
            !p.is_blank() && matches!(p.role_hint, None | Some(RoleHint::Body))
        };
        let long: Vec<&ParagraphAttributes> = paragraphs
            .iter()
            .filter(unhinted)
            .filter(|p| !self.is_short(p.text.trim()))
            .collect();
        let pool = if long.is_empty() {
            paragraphs.iter().filter(unhinted).collect()
        } else {
            long
        };

        let mut counts: Vec<(ParagraphStyle, usize)> = Vec::new();
        for paragraph in pool {
            let style = ParagraphStyle::of(paragraph);
            match counts.iter_mut().find(|(s, _)| *s == style) {
                Some((_, count)) => *count += 1,
                None => counts.push((style, 1)),
            }
        }

        let mut best: Option<(ParagraphStyle, usize)> = None;
        for (style, count) in counts {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((style, count));
            }
        }
        best.map(|(style, _)| style)
    }

    /// How a heading paragraph is formatted.
    pub fn observe(&self, paragraph: &ParagraphAttributes) -> ObservedHeading {
        let text = paragraph.text.trim();
        let (heading_text, placement) = match self.split_run_in(text) {
            Some((lead, _)) => (lead.trim_end_matches(['.', '!', '?']).trim(), Placement::RunIn),
            None => (text, Placement::OwnLine),
        };

        let threshold = self.config.indent_threshold_inches;
        let alignment = match paragraph.alignment {
            Alignment::Center => Some(HeadingAlignment::Centered),
            Alignment::Right => None,
            Alignment::Left | Alignment::Justify => {
                if paragraph.first_line_indent_inches >= threshold
                    || paragraph.left_indent_inches >= threshold
                {
                    Some(HeadingAlignment::Indented)
                } else {
                    Some(HeadingAlignment::FlushLeft)
                }
            }
        };

        ObservedHeading {
            text: heading_text.to_string(),
            alignment,
            bold: paragraph.bold,
            italic: paragraph.italic,
            case: self.detect_case(heading_text),
            placement,
        }
    }

    pub fn detect_case(&self, text: &str) -> ObservedCase {
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
            return ObservedCase::Other;
        }
        let starts_lowercase = text
            .chars()
            .find(|c| c.is_alphabetic())
            .is_some_and(|c| c.is_lowercase());
        if starts_lowercase {
            return ObservedCase::Other;
        }

        let mut capitalized = 0;
        let mut lowercase = 0;
        let mut after_colon = false;
        for (i, word) in text.split_whitespace().enumerate() {
            let starts_clause = i == 0 || after_colon;
            after_colon = word.ends_with(':');
            if starts_clause {
                continue;
            }
            let core = word.trim_matches(|c: char| !c.is_alphanumeric());
            let Some(first) = core.chars().next() else {
                continue;
            };
            if !first.is_alphabetic() || self.minor_words.contains(&core.to_lowercase()) {
                continue;
            }
            if first.is_uppercase() {
                capitalized += 1;
            } else {
                lowercase += 1;
            }
        }

        match (capitalized, lowercase) {
            (0, 0) => ObservedCase::Either,
            (_, 0) => ObservedCase::Title,
            // Capitalized proper nouns are allowed in sentence case
            _ => ObservedCase::Sentence,
        }
    }

    pub fn is_reference_title(&self, text: &str) -> bool {
        self.reference_titles.contains(&normalize_title(text))
    }

    pub fn is_abstract_title(&self, text: &str) -> bool {
        self.abstract_titles.contains(&normalize_title(text))
    }

    fn split_run_in<'t>(&self, text: &'t str) -> Option<(&'t str, &'t str)> {
        let captures = RUN_IN_SPLIT.captures(text)?;
        let lead = captures.get(1)?.as_str();
        let rest = captures.get(2)?.as_str();
        Some((lead, rest))
    }

    fn is_short(&self, text: &str) -> bool {
        text.chars().count() <= self.config.max_heading_chars
            && text.split_whitespace().count() <= self.config.max_heading_words
    }

    fn ends_with_terminal_punctuation(&self, text: &str) -> bool {
        text.chars()
            .last()
            .is_some_and(|c| self.config.terminal_punctuation.contains(c))
    }

    fn matches_section_pattern(&self, text: &str) -> bool {
        self.section_patterns.iter().any(|pattern| pattern.is_match(text))
    }
}

fn normalize_title(text: &str) -> String {
    text.trim().trim_end_matches([':', '.']).trim().to_lowercase()
}

/// Sort key of a reference entry: its first surname or organisation token,
/// lowercased, accents folded, punctuation dropped.
pub fn leading_token(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .map(|raw| {
            raw.nfkd()
                .filter(|c| !is_combining_mark(*c))
                .flat_map(char::to_lowercase)
                .map(fold_stroke)
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .find(|token| !token.is_empty())
        .unwrap_or_default()
}

/// Letters with no canonical decomposition.
fn fold_stroke(c: char) -> char {
    match c {
        'ø' => 'o',
        'ł' => 'l',
        'đ' => 'd',
        'ħ' => 'h',
        other => other,
    }
}

/// Title case: every word capitalized except minor words in the middle.
/// All-caps input is lowered first.
pub fn to_title_case(text: &str, minor_words: &[&str]) -> String {
    let all_caps = is_all_caps(text);
    let words: Vec<&str> = text.split_whitespace().collect();
    let last = words.len().saturating_sub(1);
    let mut after_colon = false;

    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            let word = if all_caps { word.to_lowercase() } else { word.to_string() };
            let forced = i == 0 || i == last || after_colon;
            after_colon = word.ends_with(':');
            let bare = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if !forced && minor_words.contains(&bare.as_str()) {
                word.to_lowercase()
            } else {
                capitalize_first(&word)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sentence case: first word and words after a colon capitalized; other
/// words lowered unless they carry inner capitals (acronyms, "McDonald").
pub fn to_sentence_case(text: &str) -> String {
    let all_caps = is_all_caps(text);
    let mut after_colon = false;

    text.split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let word = if all_caps { word.to_lowercase() } else { word.to_string() };
            let starts_clause = i == 0 || after_colon;
            after_colon = word.ends_with(':');
            if starts_clause {
                capitalize_first(&word)
            } else if word.chars().skip(1).any(char::is_uppercase) {
                word
            } else {
                word.to_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
}

fn capitalize_first(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut done = false;
    for c in word.chars() {
        if !done && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            done = true;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MINOR_WORDS;

    fn detector() -> RoleDetector {
        RoleDetector::new(&DetectionConfig::default()).unwrap()
    }

    fn body(text: &str) -> ParagraphAttributes {
        ParagraphAttributes::new(text, "Times New Roman", 12.0, 2.0).with_indents(0.0, 0.5)
    }

    fn long_body() -> ParagraphAttributes {
        body(&"Participants completed the survey in a quiet room. ".repeat(4))
    }

    #[test]
    fn test_case_detection() {
        let d = detector();
        assert_eq!(d.detect_case("Effects of Sleep on Memory"), ObservedCase::Title);
        assert_eq!(d.detect_case("Effects of sleep on memory"), ObservedCase::Sentence);
        assert_eq!(d.detect_case("Method"), ObservedCase::Either);
        assert_eq!(d.detect_case("Appendix A"), ObservedCase::Either);
        assert_eq!(d.detect_case("METHOD AND RESULTS"), ObservedCase::Other);
        assert_eq!(d.detect_case("results of the study"), ObservedCase::Other);
        assert_eq!(d.detect_case("Sleep: An Overview of Findings"), ObservedCase::Title);
    }

    #[test]
    fn test_heuristic_finds_emphasized_short_paragraphs() {
        let d = detector();
        let paragraphs = vec![
            long_body(),
            body("Method").with_emphasis(true, false).with_alignment(Alignment::Center).with_indents(0.0, 0.0),
            long_body(),
            body("A bold sentence that ends with a period.").with_emphasis(true, false),
            body("Participants").with_emphasis(true, false).with_indents(0.0, 0.0),
            long_body(),
        ];
        assert_eq!(d.heading_candidates(&paragraphs), vec![1, 4]);
    }

    #[test]
    fn test_italic_lead_sentence_is_not_a_run_in_heading() {
        let d = detector();
        let entry = |text: &str| body(text).with_indents(0.5, -0.5);
        let paragraphs = vec![
            long_body(),
            entry("Publication manual of the American Psychological Association. (2020). American Psychological Association.")
                .with_emphasis(false, true),
            body("Sample Size. We recruited 120 adults from two sites.").with_emphasis(true, true),
            long_body(),
        ];
        assert_eq!(d.heading_candidates(&paragraphs), vec![2]);
    }

    #[test]
    fn test_role_hints_override_heuristic() {
        let d = detector();
        let paragraphs = vec![
            long_body(),
            body("Plain Heading").with_role(RoleHint::Heading),
            body("Bold Title").with_emphasis(true, false).with_role(RoleHint::TitlePage),
        ];
        assert_eq!(d.heading_candidates(&paragraphs), vec![1]);
    }

    #[test]
    fn test_known_section_title_without_emphasis_is_heading() {
        let d = detector();
        let paragraphs = vec![long_body(), body("References").with_indents(0.0, 0.0), long_body()];
        assert_eq!(d.heading_candidates(&paragraphs), vec![1]);
    }

    #[test]
    fn test_bold_body_style_is_not_a_heading_signal() {
        let d = detector();
        let bold_body = || long_body().with_emphasis(true, false);
        let paragraphs = vec![bold_body(), body("Short bold line").with_emphasis(true, false), bold_body()];
        // Same emphasis and alignment as the dominant body style
        assert!(d.heading_candidates(&paragraphs).is_empty());
    }

    #[test]
    fn test_observe_run_in_heading() {
        let d = detector();
        let paragraph = body("Sample Size. We recruited 120 adults from two sites.")
            .with_emphasis(true, true)
            .with_role(RoleHint::Heading);
        let observed = d.observe(&paragraph);
        assert_eq!(observed.text, "Sample Size");
        assert_eq!(observed.placement, Placement::RunIn);
        assert_eq!(observed.alignment, Some(HeadingAlignment::Indented));
        assert_eq!(observed.case, ObservedCase::Title);
    }

    #[test]
    fn test_reference_titles() {
        let d = detector();
        assert!(d.is_reference_title("References"));
        assert!(d.is_reference_title("  BIBLIOGRAFÍA: "));
        assert!(!d.is_reference_title("Reference Materials"));
        assert!(d.is_abstract_title("Abstract"));
        assert!(d.is_abstract_title("RESUMEN:"));
        assert!(!d.is_abstract_title("References"));
    }

    #[test]
    fn test_leading_token_folds_case_accents_and_punctuation() {
        assert_eq!(leading_token("Álvarez, M. (2019). Title."), "alvarez");
        assert_eq!(leading_token("O'Brien, T. (2020)."), "obrien");
        assert_eq!(leading_token("  (n.d.) Anonymous"), "nd");
        assert_eq!(leading_token(""), "");
        assert!(leading_token("Brown, A.") < leading_token("Browning, B."));
    }

    #[test]
    fn test_leading_token_folds_accents_beyond_latin1() {
        assert_eq!(leading_token("Šimek, A. (2019)."), "simek");
        assert_eq!(leading_token("Dvořák, A."), "dvorak");
        assert_eq!(leading_token("Erdős, P."), "erdos");
        assert_eq!(leading_token("Łukasiewicz, J."), "lukasiewicz");
        assert_eq!(leading_token("Nguyễn, V."), "nguyen");
        assert!(leading_token("Šimek, A.") < leading_token("Smith, B."));
    }

    #[test]
    fn test_title_case_conversion() {
        assert_eq!(
            to_title_case("effects of sleep on memory", DEFAULT_MINOR_WORDS),
            "Effects of Sleep on Memory"
        );
        assert_eq!(to_title_case("RESULTS AND DISCUSSION", DEFAULT_MINOR_WORDS), "Results and Discussion");
        assert_eq!(to_title_case("what it is for", DEFAULT_MINOR_WORDS), "What It Is For");
        assert_eq!(to_sentence_case("Effects Of Sleep On APA Memory"), "Effects of sleep on APA memory");
    }
}
