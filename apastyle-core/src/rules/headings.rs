use crate::config::{CaseStyle, RuleSet};
use crate::types::*;
use std::fmt;

use super::detection::{ObservedCase, ObservedHeading};
use super::engine::{CheckContext, CheckStage, FindingSink};

/// Heading attribute compared against a level's rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingAttribute {
    Alignment,
    Bold,
    Italic,
    Case,
}

impl fmt::Display for HeadingAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeadingAttribute::Alignment => "alignment",
            HeadingAttribute::Bold => "bold",
            HeadingAttribute::Italic => "italic",
            HeadingAttribute::Case => "capitalization",
        })
    }
}

fn case_matches(observed: ObservedCase, required: CaseStyle) -> bool {
    match (observed, required) {
        (ObservedCase::Either, _) => true,
        (ObservedCase::Title, CaseStyle::Title) => true,
        (ObservedCase::Sentence, CaseStyle::Sentence) => true,
        _ => false,
    }
}

/// Level whose rule differs from the observed heading in the fewest
/// attributes. Ties go to the shallower level.
pub fn classify_heading(observed: &ObservedHeading, rule_set: &RuleSet) -> (u8, Vec<HeadingAttribute>) {
    let mut best: Option<(u8, Vec<HeadingAttribute>)> = None;

    for level in 1..=5u8 {
        let rule = rule_set.heading_rule(level);
        let mut differences = Vec::new();
        if observed.alignment != Some(rule.alignment) {
            differences.push(HeadingAttribute::Alignment);
        }
        if observed.bold != rule.bold {
            differences.push(HeadingAttribute::Bold);
        }
        if observed.italic != rule.italic {
            differences.push(HeadingAttribute::Italic);
        }
        if !case_matches(observed.case, rule.case) {
            differences.push(HeadingAttribute::Case);
        }

        let closer = best
            .as_ref()
            .map_or(true, |(_, best_diff)| differences.len() < best_diff.len());
        if closer {
            best = Some((level, differences));
        }
    }

    best.unwrap_or_else(|| unreachable!("five heading levels are always compared"))
}

// HeadingStage - heading formatting per level and level sequence
pub struct HeadingStage;

impl CheckStage for HeadingStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let headings = &ctx.layout.headings;
        if headings.is_empty() {
            sink.push(Finding::pass(
                "heading.none",
                CheckCategory::Heading,
                "No headings detected; heading checks skipped",
            ));
            return;
        }

        let mut all_passed = true;
        for (n, heading) in headings.iter().enumerate() {
            let mut passed = true;

            if !heading.mismatches.is_empty() {
                passed = false;
                let differing: Vec<String> = heading.mismatches.iter().map(|a| a.to_string()).collect();
                let rule = ctx.rule_set.heading_rule(heading.level);
                sink.push(
                    Finding::violation(
                        "heading.format",
                        CheckCategory::Heading,
                        Severity::Warning,
                        format!(
                            "Heading \"{}\" is closest to level {} but differs in {}",
                            heading.observed.text,
                            heading.level,
                            differing.join(", ")
                        ),
                    )
                    .at(Location::Paragraph {
                        index: heading.index,
                    })
                    .expected_actual(
                        format!("level {}: {}", heading.level, rule.describe()),
                        heading.observed.describe(),
                    ),
                );
            }

            // Going deeper by more than one level skips a level
            if n > 0 {
                let previous = &headings[n - 1];
                if heading.level > previous.level + 1 {
                    passed = false;
                    sink.push(
                        Finding::violation(
                            "heading.sequence",
                            CheckCategory::Heading,
                            Severity::Warning,
                            format!(
                                "Heading \"{}\" jumps from level {} to level {}",
                                heading.observed.text, previous.level, heading.level
                            ),
                        )
                        .at(Location::Paragraphs {
                            indices: vec![previous.index, heading.index],
                        })
                        .expected_actual(
                            format!("level {} or shallower", previous.level + 1),
                            format!("level {}", heading.level),
                        ),
                    );
                }
            }

            sink.record(passed);
            all_passed &= passed;
        }

        if all_passed {
            sink.push(Finding::pass(
                "heading.structure",
                CheckCategory::Heading,
                format!("All {} headings match their APA level", headings.len()),
            ));
        }
    }

    fn name(&self) -> &str {
        "Headings"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeadingAlignment, Placement};
    use crate::rules::engine::{DetectedHeading, DocumentLayout};

    fn observed(alignment: HeadingAlignment, bold: bool, italic: bool, case: ObservedCase) -> ObservedHeading {
        ObservedHeading {
            text: "Heading".to_string(),
            alignment: Some(alignment),
            bold,
            italic,
            case,
            placement: Placement::OwnLine,
        }
    }

    fn detected(index: usize, level: u8) -> DetectedHeading {
        DetectedHeading {
            index,
            observed: observed(HeadingAlignment::Centered, true, false, ObservedCase::Title),
            level,
            mismatches: Vec::new(),
        }
    }

    fn run(headings: Vec<DetectedHeading>) -> FindingSink {
        let rule_set = RuleSet::default();
        let page = PageAttributes {
            margins: Margins::uniform(1.0),
            page_size: PageSize::LETTER,
            page_count: 1,
        };
        let layout = DocumentLayout {
            headings,
            references: None,
            abstract_index: None,
        };
        let ctx = CheckContext {
            rule_set: &rule_set,
            page: &page,
            paragraphs: &[],
            layout: &layout,
        };
        let mut sink = FindingSink::new();
        HeadingStage.run(&ctx, &mut sink);
        sink
    }

    #[test]
    fn test_exact_matches_for_each_level() {
        let rules = RuleSet::default();
        use HeadingAlignment::*;
        let cases = [
            (observed(Centered, true, false, ObservedCase::Title), 1),
            (observed(FlushLeft, true, false, ObservedCase::Title), 2),
            (observed(FlushLeft, true, true, ObservedCase::Either), 3),
            (observed(Indented, true, false, ObservedCase::Title), 4),
            (observed(Indented, true, true, ObservedCase::Title), 5),
        ];
        for (heading, level) in cases {
            assert_eq!(classify_heading(&heading, &rules), (level, vec![]));
        }
    }

    #[test]
    fn test_bold_flush_left_sentence_case_is_level_two_case_mismatch() {
        let rules = RuleSet::default();
        let heading = observed(HeadingAlignment::FlushLeft, true, false, ObservedCase::Sentence);
        assert_eq!(classify_heading(&heading, &rules), (2, vec![HeadingAttribute::Case]));
    }

    #[test]
    fn test_ties_break_toward_shallower_level() {
        let rules = RuleSet::default();
        // Plain flush left: one difference from level 2 (bold), two from level 3
        let heading = observed(HeadingAlignment::FlushLeft, false, false, ObservedCase::Title);
        assert_eq!(classify_heading(&heading, &rules).0, 2);
        // Plain centered italic: level 1 differs in bold and italic; level 3 in
        // alignment and bold. Equal distance, shallower wins.
        let heading = observed(HeadingAlignment::Centered, false, true, ObservedCase::Title);
        assert_eq!(classify_heading(&heading, &rules).0, 1);
    }

    #[test]
    fn test_descending_jump_yields_one_warning() {
        let sink = run(vec![detected(0, 1), detected(3, 3), detected(7, 2), detected(9, 1)]);
        let jumps: Vec<&Finding> = sink
            .findings()
            .iter()
            .filter(|f| f.rule_id == "heading.sequence")
            .collect();
        assert_eq!(jumps.len(), 1);
        assert_eq!(jumps[0].severity, Severity::Warning);
        assert_eq!(jumps[0].location, Some(Location::Paragraphs { indices: vec![0, 3] }));
        assert_eq!(sink.tally().total(), 4);
        assert_eq!(sink.tally().passed(), 3);
    }

    #[test]
    fn test_no_headings_skips_stage() {
        let sink = run(vec![]);
        assert_eq!(sink.tally().total(), 0);
        assert_eq!(sink.findings().len(), 1);
        assert_eq!(sink.findings()[0].rule_id, "heading.none");
        assert_eq!(sink.findings()[0].severity, Severity::Info);
    }

    #[test]
    fn test_all_matching_headings_produce_single_pass_finding() {
        let sink = run(vec![detected(0, 1), detected(2, 2)]);
        assert_eq!(sink.findings().len(), 1);
        assert_eq!(sink.findings()[0].rule_id, "heading.structure");
        assert!(sink.findings()[0].passed);
    }
}
