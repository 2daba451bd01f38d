use crate::error::ProfileError;
use crate::types::{MarginSide, PageSize};
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_PROFILE: &str = "apa7";

/// Check stages the engine knows how to run, in default order.
pub const STAGE_NAMES: [&str; 7] = [
    "PageLayout",
    "Fonts",
    "LineSpacing",
    "ParagraphSpacing",
    "ParagraphIndent",
    "Headings",
    "References",
];

/// Words left lowercase in title case unless first, last or after a colon.
pub const DEFAULT_MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "if", "in", "nor", "of", "off", "on", "or",
    "per", "so", "the", "to", "up", "via", "yet", // Spanish
    "al", "con", "de", "del", "e", "el", "en", "la", "las", "lo", "los", "o", "para", "por",
    "sin", "u", "un", "una", "y",
];

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_heading_level() -> u8 {
    1
}

// ============================================================================
// RULE SET
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingAlignment {
    Centered,
    FlushLeft,
    /// Indented 0.5in from the left margin
    Indented,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStyle {
    Title,
    Sentence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    OwnLine,
    /// Heading ends with a period and body text continues on the same line
    RunIn,
}

/// Formatting required for one heading level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadingRule {
    #[serde(default = "default_heading_level")]
    pub level: u8,
    pub alignment: HeadingAlignment,
    pub bold: bool,
    pub italic: bool,
    pub case: CaseStyle,
    pub placement: Placement,
}

impl HeadingRule {
    pub fn describe(&self) -> String {
        let alignment = match self.alignment {
            HeadingAlignment::Centered => "centered",
            HeadingAlignment::FlushLeft => "flush left",
            HeadingAlignment::Indented => "indented",
        };
        let emphasis = match (self.bold, self.italic) {
            (true, true) => "bold italic",
            (true, false) => "bold",
            (false, true) => "italic",
            (false, false) => "plain",
        };
        let case = match self.case {
            CaseStyle::Title => "title case",
            CaseStyle::Sentence => "sentence case",
        };
        let placement = match self.placement {
            Placement::OwnLine => "own line",
            Placement::RunIn => "run-in",
        };
        format!("{alignment}, {emphasis}, {case}, {placement}")
    }
}

/// A permitted font face and nominal size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub name: String,
    pub size_pt: f32,
}

impl FontSpec {
    pub fn new(name: impl Into<String>, size_pt: f32) -> Self {
        Self {
            name: name.into(),
            size_pt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub margin_inches: f32,
    pub indent_inches: f32,
    pub line_spacing: f32,
    pub font_size_pt: f32,
    pub page_size_inches: f32,
    pub paragraph_spacing_pt: f32,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            margin_inches: 0.02,
            indent_inches: 0.05,
            line_spacing: 0.05,
            font_size_pt: 0.5,
            page_size_inches: 0.05,
            paragraph_spacing_pt: 0.5,
        }
    }
}

/// Formatting rules of the style guide. Missing fields in a profile file
/// fall back to the APA 7 student-paper values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    /// Uniform margin on all four sides
    pub margins_inches: f32,
    /// Wider left margin for bound copies; replaces `margins_inches` on the left
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding_margin_inches: Option<f32>,
    pub allowed_fonts: Vec<FontSpec>,
    pub line_spacing: f32,
    pub heading_rules: Vec<HeadingRule>,
    pub reference_indent_inches: f32,
    /// First-line indent of body paragraphs
    pub paragraph_indent_inches: f32,
    /// Extra space above and below each paragraph; APA wants none
    pub paragraph_spacing_pt: f32,
    pub page_size: PageSize,
    pub tolerances: Tolerances,
}

impl Default for RuleSet {
    fn default() -> Self {
        use CaseStyle::Title;
        use HeadingAlignment::*;
        use Placement::*;

        let rule = |level, alignment, bold, italic, placement| HeadingRule {
            level,
            alignment,
            bold,
            italic,
            case: Title,
            placement,
        };

        Self {
            margins_inches: 1.0,
            binding_margin_inches: None,
            allowed_fonts: vec![
                FontSpec::new("Times New Roman", 12.0),
                FontSpec::new("Calibri", 11.0),
                FontSpec::new("Arial", 11.0),
                FontSpec::new("Georgia", 11.0),
                FontSpec::new("Lucida Sans Unicode", 10.0),
                FontSpec::new("Computer Modern", 10.0),
            ],
            line_spacing: 2.0,
            heading_rules: vec![
                rule(1, Centered, true, false, OwnLine),
                rule(2, FlushLeft, true, false, OwnLine),
                rule(3, FlushLeft, true, true, OwnLine),
                rule(4, Indented, true, false, RunIn),
                rule(5, Indented, true, true, RunIn),
            ],
            reference_indent_inches: 0.5,
            paragraph_indent_inches: 0.5,
            paragraph_spacing_pt: 0.0,
            page_size: PageSize::LETTER,
            tolerances: Tolerances::default(),
        }
    }
}

impl RuleSet {
    /// Case-insensitive font name, size within the font-size tolerance.
    pub fn is_font_allowed(&self, name: &str, size_pt: f32) -> bool {
        let name = name.trim();
        self.allowed_fonts.iter().any(|font| {
            font.name.eq_ignore_ascii_case(name)
                && (font.size_pt - size_pt).abs() <= self.tolerances.font_size_pt
        })
    }

    /// Rule for a heading level.
    ///
    /// # Panics
    /// If `level` is outside 1..=5 or the rule set was built without it.
    /// Validated rule sets always carry all five levels.
    pub fn heading_rule(&self, level: u8) -> &HeadingRule {
        assert!((1..=5).contains(&level), "heading level {level} out of range 1..=5");
        self.heading_rules
            .iter()
            .find(|rule| rule.level == level)
            .unwrap_or_else(|| panic!("rule set has no rule for heading level {level}"))
    }

    pub fn margin_tolerance_inches(&self) -> f32 {
        self.tolerances.margin_inches
    }

    pub fn expected_margin(&self, side: MarginSide) -> f32 {
        match (side, self.binding_margin_inches) {
            (MarginSide::Left, Some(binding)) => binding,
            _ => self.margins_inches,
        }
    }

    /// "Times New Roman 12pt, Calibri 11pt, ..."
    pub fn allowed_fonts_summary(&self) -> String {
        self.allowed_fonts
            .iter()
            .map(|font| format!("{} {}pt", font.name, font.size_pt))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |msg: String| Err(ProfileError::InvalidRuleSet(msg));

        let positive = [
            ("margins_inches", self.margins_inches),
            ("line_spacing", self.line_spacing),
            ("reference_indent_inches", self.reference_indent_inches),
            ("paragraph_indent_inches", self.paragraph_indent_inches),
            ("page_size.width_inches", self.page_size.width_inches),
            ("page_size.height_inches", self.page_size.height_inches),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{field} must be a positive number, got {value}"));
            }
        }
        if !(self.paragraph_spacing_pt.is_finite() && self.paragraph_spacing_pt >= 0.0) {
            return invalid(format!(
                "paragraph_spacing_pt must be zero or positive, got {}",
                self.paragraph_spacing_pt
            ));
        }
        if let Some(binding) = self.binding_margin_inches {
            if !(binding.is_finite() && binding > 0.0) {
                return invalid(format!("binding_margin_inches must be positive, got {binding}"));
            }
        }
        let widest_margins = self.margins_inches + self.expected_margin(MarginSide::Left);
        if widest_margins >= self.page_size.width_inches {
            return invalid(format!(
                "left and right margins ({widest_margins:.2}in) leave no text area on a {:.2}in page",
                self.page_size.width_inches
            ));
        }

        let t = &self.tolerances;
        for (field, value) in [
            ("margin_inches", t.margin_inches),
            ("indent_inches", t.indent_inches),
            ("line_spacing", t.line_spacing),
            ("font_size_pt", t.font_size_pt),
            ("page_size_inches", t.page_size_inches),
            ("paragraph_spacing_pt", t.paragraph_spacing_pt),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return invalid(format!("tolerances.{field} must be zero or positive, got {value}"));
            }
        }

        if self.allowed_fonts.is_empty() {
            return invalid("allowed_fonts must list at least one font".to_string());
        }
        for font in &self.allowed_fonts {
            if font.name.trim().is_empty() || !(font.size_pt.is_finite() && font.size_pt > 0.0) {
                return invalid(format!("allowed font '{}' {}pt is not usable", font.name, font.size_pt));
            }
        }

        if self.heading_rules.len() != 5 {
            return invalid(format!(
                "heading_rules must define exactly 5 levels, got {}",
                self.heading_rules.len()
            ));
        }
        for level in 1..=5u8 {
            let count = self.heading_rules.iter().filter(|r| r.level == level).count();
            if count != 1 {
                return invalid(format!("heading level {level} is defined {count} times"));
            }
        }

        Ok(())
    }
}

// ============================================================================
// DETECTION AND PIPELINE
// ============================================================================

/// Tuning for the heading and reference-list heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Longer paragraphs are never headings
    pub max_heading_chars: usize,
    pub max_heading_words: usize,
    /// A paragraph ending in one of these is body text, not a heading
    pub terminal_punctuation: String,
    /// Left or first-line indent at which a heading counts as indented
    pub indent_threshold_inches: f32,
    /// Heading texts (case-insensitive) that open the reference list
    pub reference_titles: Vec<String>,
    /// Heading texts whose first paragraph is the unindented abstract
    pub abstract_titles: Vec<String>,
    /// Regex patterns of well-known section titles. A short paragraph matching
    /// one is treated as a heading even without emphasis.
    pub section_patterns: Vec<String>,
    pub minor_words: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_heading_chars: 120,
            max_heading_words: 15,
            terminal_punctuation: ".,;:".to_string(),
            indent_threshold_inches: 0.25,
            reference_titles: vec![
                "references".to_string(),
                "referencias".to_string(),
                "bibliography".to_string(),
                "bibliografía".to_string(),
                "bibliografia".to_string(),
            ],
            abstract_titles: vec!["abstract".to_string(), "resumen".to_string()],
            section_patterns: vec![
                r"(?i)^(abstract|method|methods|results|discussion|conclusions?|references|bibliography)$".to_string(),
                r"(?i)^(resumen|método|resultados|discusión|conclusiones|referencias|bibliografía)$".to_string(),
                r"(?i)^(appendix|apéndice)( [a-z])?$".to_string(),
            ],
            minor_words: DEFAULT_MINOR_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl DetectionConfig {
    pub fn compiled_section_patterns(&self) -> Result<Vec<Regex>, ProfileError> {
        self.section_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ProfileError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stages to run, in order
    pub stages: Vec<StageConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stages: STAGE_NAMES
                .iter()
                .map(|name| StageConfig {
                    name: name.to_string(),
                    enabled: true,
                })
                .collect(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (i, stage) in self.stages.iter().enumerate() {
            if !STAGE_NAMES.contains(&stage.name.as_str()) {
                return Err(ProfileError::InvalidPipeline(format!(
                    "unknown stage '{}' (known: {})",
                    stage.name,
                    STAGE_NAMES.join(", ")
                )));
            }
            if self.stages[..i].iter().any(|s| s.name == stage.name) {
                return Err(ProfileError::InvalidPipeline(format!(
                    "stage '{}' listed more than once",
                    stage.name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// PROFILES
// ============================================================================

/// A named bundle of rule set, heuristic tuning and check pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rule_set: RuleSet,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            name: DEFAULT_PROFILE.to_string(),
            description: "APA 7th edition, US Letter".to_string(),
            rule_set: RuleSet::default(),
            detection: DetectionConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl StyleProfile {
    pub fn validate(&self) -> Result<(), ProfileError> {
        self.rule_set.validate()?;
        self.pipeline.validate()?;
        self.detection.compiled_section_patterns()?;
        Ok(())
    }

    /// Load and validate a profile from a YAML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read profile {}", path.display()))?;
        let profile: StyleProfile = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse profile {}", path.display()))?;
        profile
            .validate()
            .with_context(|| format!("Profile {} is invalid", path.display()))?;
        debug!("Loaded profile '{}' from {}", profile.name, path.display());
        Ok(profile)
    }

    /// Load a profile, falling back to the default profile on any error
    pub fn load_with_fallback(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("Failed to load profile from {}, using defaults: {e:#}", p.display());
                Self::default()
            }),
            None => Self::default(),
        }
    }

    fn a4() -> Self {
        Self {
            name: "apa7-a4".to_string(),
            description: "APA 7th edition on A4 paper".to_string(),
            rule_set: RuleSet {
                page_size: PageSize::A4,
                ..RuleSet::default()
            },
            ..Self::default()
        }
    }

    fn binding() -> Self {
        Self {
            name: "apa7-binding".to_string(),
            description: "APA 7th edition with a 4 cm left margin for bound theses".to_string(),
            rule_set: RuleSet {
                binding_margin_inches: Some(4.0 / 2.54),
                ..RuleSet::default()
            },
            ..Self::default()
        }
    }
}

/// Resolves profile names to built-in profiles or YAML files in the user's
/// profile directory.
#[derive(Debug, Clone)]
pub struct ProfileManager {
    profiles: BTreeMap<String, StyleProfile>,
    user_dir: Option<PathBuf>,
}

impl ProfileManager {
    pub fn new() -> Self {
        let mut manager = Self {
            profiles: BTreeMap::new(),
            user_dir: dirs::config_dir().map(|dir| dir.join("apastyle").join("profiles")),
        };
        manager.load_builtin_profiles();
        manager
    }

    /// Look for user profiles in `dir` instead of the platform config directory.
    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    pub fn user_dir(&self) -> Option<&Path> {
        self.user_dir.as_deref()
    }

    fn load_builtin_profiles(&mut self) {
        for profile in [StyleProfile::default(), StyleProfile::a4(), StyleProfile::binding()] {
            self.profiles.insert(profile.name.clone(), profile);
        }
    }

    pub fn get(&self, name: &str) -> Option<&StyleProfile> {
        self.profiles.get(name)
    }

    /// Names of registered profiles, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &StyleProfile> {
        self.profiles.values()
    }

    /// Names of `*.yaml` / `*.yml` files in the user profile directory.
    pub fn user_profile_names(&self) -> Result<Vec<String>> {
        let Some(dir) = &self.user_dir else {
            return Ok(Vec::new());
        };
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
            let path = entry?.path();
            let is_yaml = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml") | Some("yml")
            );
            if let (true, Some(stem)) = (is_yaml, path.file_stem().and_then(|s| s.to_str())) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Registered profile by name, else `<user dir>/<name>.yaml`.
    pub fn resolve(&self, name: &str) -> Result<StyleProfile> {
        if let Some(profile) = self.profiles.get(name) {
            return Ok(profile.clone());
        }

        if let Some(dir) = &self.user_dir {
            for ext in ["yaml", "yml"] {
                let candidate = dir.join(format!("{name}.{ext}"));
                if candidate.is_file() {
                    return StyleProfile::load_from_file(&candidate);
                }
            }
        }

        Err(ProfileError::UnknownProfile(name.to_string()).into())
    }
}

impl Default for ProfileManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("apastyle-config-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_default_rule_set_is_valid() {
        let rules = RuleSet::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.heading_rules.len(), 5);
        assert_eq!(rules.margin_tolerance_inches(), 0.02);
    }

    #[test]
    fn test_font_lookup_is_case_insensitive_with_tolerance() {
        let rules = RuleSet::default();
        assert!(rules.is_font_allowed("times new roman", 12.0));
        assert!(rules.is_font_allowed("Arial", 11.4));
        assert!(!rules.is_font_allowed("Arial", 12.0));
        assert!(!rules.is_font_allowed("Comic Sans MS", 12.0));
    }

    #[test]
    fn test_heading_rules_by_level() {
        let rules = RuleSet::default();
        let l1 = rules.heading_rule(1);
        assert_eq!(l1.alignment, HeadingAlignment::Centered);
        assert!(l1.bold && !l1.italic);
        let l5 = rules.heading_rule(5);
        assert_eq!(l5.placement, Placement::RunIn);
        assert!(l5.bold && l5.italic);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_heading_rule_level_zero_panics() {
        RuleSet::default().heading_rule(0);
    }

    #[test]
    fn test_binding_margin_only_affects_left() {
        let profile = StyleProfile::binding();
        let rules = &profile.rule_set;
        assert!((rules.expected_margin(MarginSide::Left) - 1.5748).abs() < 0.001);
        assert_eq!(rules.expected_margin(MarginSide::Right), 1.0);
    }

    #[test]
    fn test_validate_rejects_missing_heading_level() {
        let mut rules = RuleSet::default();
        rules.heading_rules.pop();
        let err = rules.validate().unwrap_err();
        assert!(err.to_string().contains("exactly 5 levels"));

        let mut rules = RuleSet::default();
        rules.heading_rules[4].level = 4;
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_measurements() {
        let rules = RuleSet {
            margins_inches: -1.0,
            ..RuleSet::default()
        };
        assert!(rules.validate().is_err());

        let rules = RuleSet {
            allowed_fonts: vec![],
            ..RuleSet::default()
        };
        assert!(rules.validate().is_err());

        let rules = RuleSet {
            margins_inches: 4.5,
            ..RuleSet::default()
        };
        assert!(rules.validate().is_err());

        let rules = RuleSet {
            paragraph_spacing_pt: -6.0,
            ..RuleSet::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_pipeline_rejects_unknown_and_duplicate_stages() {
        let mut pipeline = PipelineConfig::default();
        pipeline.stages.push(StageConfig {
            name: "Fonts".to_string(),
            enabled: false,
        });
        assert!(pipeline.validate().is_err());

        let pipeline = PipelineConfig {
            stages: vec![StageConfig {
                name: "Tables".to_string(),
                enabled: true,
            }],
        };
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn test_partial_profile_yaml_fills_defaults() {
        let dir = temp_dir("partial");
        let path = dir.join("thesis.yaml");
        fs::write(
            &path,
            "name: thesis\nrule_set:\n  margins_inches: 1.25\npipeline:\n  stages:\n    - name: PageLayout\n    - name: Fonts\n      enabled: false\n",
        )
        .unwrap();

        let profile = StyleProfile::load_from_file(&path).unwrap();
        assert_eq!(profile.name, "thesis");
        assert_eq!(profile.rule_set.margins_inches, 1.25);
        assert_eq!(profile.rule_set.line_spacing, 2.0);
        assert_eq!(profile.pipeline.stages.len(), 2);
        assert!(!profile.pipeline.stages[1].enabled);
        assert_eq!(profile.detection, DetectionConfig::default());
    }

    #[test]
    fn test_load_with_fallback_uses_default_on_error() {
        let profile = StyleProfile::load_with_fallback(Some(Path::new("/nonexistent/profile.yaml")));
        assert_eq!(profile.name, DEFAULT_PROFILE);
    }

    #[test]
    fn test_manager_resolves_builtins_and_user_profiles() {
        let dir = temp_dir("manager");
        fs::write(dir.join("journal.yml"), "name: journal\ndescription: Journal house style\n").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let manager = ProfileManager::new().with_user_dir(&dir);
        assert_eq!(manager.names(), vec!["apa7", "apa7-a4", "apa7-binding"]);
        assert_eq!(manager.resolve("apa7-a4").unwrap().rule_set.page_size, PageSize::A4);
        assert_eq!(manager.user_profile_names().unwrap(), vec!["journal".to_string()]);
        assert_eq!(manager.resolve("journal").unwrap().description, "Journal house style");

        let err = manager.resolve("mla9").unwrap_err();
        assert!(err.to_string().contains("unknown style profile 'mla9'"));
    }

    #[test]
    fn test_rule_set_yaml_round_trip_is_stable() {
        let rules = RuleSet::default();
        let yaml = serde_yaml::to_string(&rules).unwrap();
        assert!(yaml.contains("flush_left"));
        let parsed: RuleSet = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, rules);
    }
}
