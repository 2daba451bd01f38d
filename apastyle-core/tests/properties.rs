//! Property tests for the checker's scoring and grouping rules.

use apastyle_core::*;
use proptest::prelude::*;
use std::collections::HashSet;

const FONTS: [&str; 4] = ["Times New Roman", "Arial", "Calibri", "Comic Sans MS"];
const SIZES: [f32; 4] = [10.0, 11.0, 12.0, 14.0];
const SPACINGS: [f32; 3] = [1.0, 1.5, 2.0];

// ============================================================================
// Strategies
// ============================================================================

/// Plain body paragraphs. No emphasis, so none of them reads as a heading.
fn paragraph() -> impl Strategy<Value = ParagraphAttributes> {
    (
        "[a-z]{3,10}( [a-z]{3,10}){2,6}",
        0..FONTS.len(),
        0..SIZES.len(),
        0..SPACINGS.len(),
    )
        .prop_map(|(words, font, size, spacing)| {
            ParagraphAttributes::new(format!("Item {words}."), FONTS[font], SIZES[size], SPACINGS[spacing])
                .with_indents(0.0, 0.5)
        })
}

fn page() -> impl Strategy<Value = PageAttributes> {
    (0.5f32..1.5, 0.5f32..1.5, 0.5f32..1.5, 0.5f32..1.5, any::<bool>()).prop_map(
        |(top, bottom, left, right, letter)| PageAttributes {
            margins: Margins {
                top,
                bottom,
                left,
                right,
            },
            page_size: if letter { PageSize::LETTER } else { PageSize::A4 },
            page_count: 1,
        },
    )
}

fn letter() -> PageAttributes {
    PageAttributes {
        margins: Margins::uniform(1.0),
        page_size: PageSize::LETTER,
        page_count: 1,
    }
}

fn surnames() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[a-z]{3,10}", 3..12).prop_map(|set| {
        // BTreeSet iterates in ascending order
        set.into_iter()
            .map(|s| {
                let mut chars = s.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => s,
                }
            })
            .collect()
    })
}

fn reference_list(surnames: &[String]) -> Vec<ParagraphAttributes> {
    let heading = ParagraphAttributes::new("References", "Times New Roman", 12.0, 2.0)
        .with_alignment(Alignment::Center)
        .with_emphasis(true, false)
        .with_role(RoleHint::Heading);
    std::iter::once(heading)
        .chain(surnames.iter().map(|name| {
            ParagraphAttributes::new(format!("{name}, A. (2020). A title."), "Times New Roman", 12.0, 2.0)
                .with_indents(0.5, -0.5)
                .with_role(RoleHint::Reference)
        }))
        .collect()
}

// ============================================================================
// Scoring
// ============================================================================

proptest! {
    /// Property: score stays within 0..=100 and passed never exceeds total
    #[test]
    fn score_is_bounded(page in page(), paragraphs in prop::collection::vec(paragraph(), 0..30)) {
        let report = check(&RuleSet::default(), &page, &paragraphs);
        prop_assert!(report.score() <= 100);
        prop_assert!(report.checks_passed() <= report.total_checks());
        if paragraphs.is_empty() {
            prop_assert_eq!(report.score(), 100);
            prop_assert_eq!(report.total_checks(), 0);
        }
    }

    /// Property: the same input always yields the same report
    #[test]
    fn check_is_deterministic(page in page(), paragraphs in prop::collection::vec(paragraph(), 1..30)) {
        let rules = RuleSet::default();
        let first = check(&rules, &page, &paragraphs);
        let second = check(&rules, &page, &paragraphs);
        prop_assert_eq!(first, second);
    }

    /// Property: moving a compliant paragraph to a disallowed font never raises the score
    #[test]
    fn extra_violation_never_raises_score(
        page in page(),
        paragraphs in prop::collection::vec(paragraph(), 1..30),
        pick in any::<prop::sample::Index>(),
    ) {
        let rules = RuleSet::default();
        let compliant: Vec<usize> = paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| rules.is_font_allowed(&p.font_name, p.font_size))
            .map(|(i, _)| i)
            .collect();
        prop_assume!(!compliant.is_empty());

        let target = compliant[pick.index(compliant.len())];
        let mut worse = paragraphs.clone();
        worse[target].font_name = "Comic Sans MS".to_string();

        let before = check(&rules, &page, &paragraphs);
        let after = check(&rules, &page, &worse);
        prop_assert!(after.score() <= before.score());
    }

    /// Property: one font finding per distinct non-compliant (font, size) pair
    #[test]
    fn font_findings_match_distinct_pairs(paragraphs in prop::collection::vec(paragraph(), 1..40)) {
        let rules = RuleSet::default();
        let page = PageAttributes {
            margins: Margins::uniform(1.0),
            page_size: PageSize::LETTER,
            page_count: 1,
        };
        let report = check(&rules, &page, &paragraphs);

        let distinct_bad: HashSet<(String, u32)> = paragraphs
            .iter()
            .filter(|p| !rules.is_font_allowed(&p.font_name, p.font_size))
            .map(|p| (p.font_name.to_lowercase(), (p.font_size * 2.0) as u32))
            .collect();
        let findings = report.findings().iter().filter(|f| f.rule_id == "font.not_allowed").count();
        prop_assert_eq!(findings, distinct_bad.len());
    }

    /// Property: with sizes off the half-point grid, a paragraph is flagged
    /// exactly when its own font and size are not allowed
    #[test]
    fn font_verdict_is_per_paragraph(sizes in prop::collection::vec(10.5f32..13.5, 1..30)) {
        let rules = RuleSet::default();
        let paragraphs: Vec<ParagraphAttributes> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                ParagraphAttributes::new(format!("Item {i}."), "Times New Roman", *size, 2.0).with_indents(0.0, 0.5)
            })
            .collect();
        let report = check(&rules, &letter(), &paragraphs);

        let mut flagged = HashSet::new();
        for finding in report.findings().iter().filter(|f| f.rule_id == "font.not_allowed") {
            if let Some(Location::Paragraphs { indices }) = &finding.location {
                flagged.extend(indices.iter().copied());
            }
        }
        for (i, p) in paragraphs.iter().enumerate() {
            prop_assert_eq!(flagged.contains(&i), !rules.is_font_allowed(&p.font_name, p.font_size));
        }
    }
}

// ============================================================================
// Reference ordering
// ============================================================================

proptest! {
    /// Property: a sorted list has no ordering findings
    #[test]
    fn sorted_references_pass(names in surnames()) {
        let paragraphs = reference_list(&names);
        let report = check(&RuleSet::default(), &PageAttributes {
            margins: Margins::uniform(1.0),
            page_size: PageSize::LETTER,
            page_count: 1,
        }, &paragraphs);
        prop_assert_eq!(report.findings().iter().filter(|f| f.rule_id == "reference.order").count(), 0);
    }

    /// Property: swapping one adjacent pair yields exactly one finding for that pair
    #[test]
    fn one_swap_one_finding(names in surnames(), pick in any::<prop::sample::Index>()) {
        let mut names = names;
        let k = pick.index(names.len() - 1);
        names.swap(k, k + 1);

        let paragraphs = reference_list(&names);
        let report = check(&RuleSet::default(), &PageAttributes {
            margins: Margins::uniform(1.0),
            page_size: PageSize::LETTER,
            page_count: 1,
        }, &paragraphs);

        let order: Vec<&Finding> = report.findings().iter().filter(|f| f.rule_id == "reference.order").collect();
        prop_assert_eq!(order.len(), 1);
        // The heading sits at index 0
        prop_assert_eq!(
            order[0].location.clone(),
            Some(Location::Paragraphs { indices: vec![k + 1, k + 2] })
        );
    }
}
