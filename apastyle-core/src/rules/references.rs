use crate::types::*;

use super::detection::leading_token;
use super::engine::{group_paragraphs, unreadable, CheckContext, CheckStage, FindingSink};

const MAX_PLAUSIBLE_INDENT_INCHES: f32 = 5.0;

// ReferenceStage - hanging indent and alphabetical order of the reference list
pub struct ReferenceStage;

impl CheckStage for ReferenceStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let Some(region) = &ctx.layout.references else {
            sink.push(Finding::pass(
                "reference.missing",
                CheckCategory::Reference,
                "No reference list found; reference checks skipped",
            ));
            return;
        };
        if region.entries.is_empty() {
            sink.push(
                Finding::pass(
                    "reference.empty",
                    CheckCategory::Reference,
                    "The reference list is empty; reference checks skipped",
                )
                .at(Location::Paragraph {
                    index: region.title_index,
                }),
            );
            return;
        }

        let indents_ok = self.check_hanging_indent(ctx, &region.entries, sink);
        let order_ok = self.check_order(ctx, &region.entries, sink);

        if indents_ok && order_ok {
            sink.push(Finding::pass(
                "reference.list",
                CheckCategory::Reference,
                format!(
                    "{} references are alphabetized with a hanging indent",
                    region.entries.len()
                ),
            ));
        }
    }

    fn name(&self) -> &str {
        "References"
    }
}

impl ReferenceStage {
    /// One check per distinct (left, first-line) indentation pair.
    fn check_hanging_indent(&self, ctx: &CheckContext<'_>, entries: &[usize], sink: &mut FindingSink) -> bool {
        let expected = ctx.rule_set.reference_indent_inches;
        let tolerance = ctx.rule_set.tolerances.indent_inches;
        let plausible = |v: f32| v.is_finite() && v.abs() <= MAX_PLAUSIBLE_INDENT_INCHES;

        let mut unreadable_indices = Vec::new();
        let readable = entries.iter().copied().filter(|&index| {
            let p = &ctx.paragraphs[index];
            let ok = plausible(p.left_indent_inches) && plausible(p.first_line_indent_inches);
            if !ok {
                unreadable_indices.push(index);
            }
            ok
        });
        let groups = group_paragraphs(readable.map(|index| {
            let p = &ctx.paragraphs[index];
            let (left, first) = (p.left_indent_inches, p.first_line_indent_inches);
            // Hanging indent: body shifted right, first line pulled back to the margin
            let ok = (left - expected).abs() <= tolerance + 1e-4 && (first + expected).abs() <= tolerance + 1e-4;
            // Hundredths of an inch
            let key = ((left * 100.0).round() as i32, (first * 100.0).round() as i32, ok);
            (index, key, (left, first, ok))
        }));

        let mut all_ok = true;
        for group in groups {
            let (left, first, ok) = group.value;
            let indices = group.indices;
            sink.record(ok);
            if ok {
                continue;
            }
            all_ok = false;
            sink.push(
                Finding::violation(
                    "reference.hanging_indent",
                    CheckCategory::Reference,
                    Severity::Error,
                    format!(
                        "{} a {expected:.2}in hanging indent (left {left:.2}in, first line {first:.2}in)",
                        if indices.len() == 1 {
                            "1 reference entry lacks".to_string()
                        } else {
                            format!("{} reference entries lack", indices.len())
                        }
                    ),
                )
                .at(Location::Paragraphs { indices })
                .expected_actual(
                    format!("left {expected:.2}in, first line -{expected:.2}in"),
                    format!("left {left:.2}in, first line {first:.2}in"),
                ),
            );
        }

        if !unreadable_indices.is_empty() {
            all_ok = false;
            sink.push(unreadable(
                format!("Indentation cannot be read for {} reference entries", unreadable_indices.len()),
                Location::Paragraphs {
                    indices: unreadable_indices,
                },
            ));
            sink.record(false);
        }

        all_ok
    }

    /// One check per adjacent pair of entries.
    fn check_order(&self, ctx: &CheckContext<'_>, entries: &[usize], sink: &mut FindingSink) -> bool {
        let keys: Vec<String> = entries
            .iter()
            .map(|&i| leading_token(&ctx.paragraphs[i].text))
            .collect();

        let mut all_ok = true;
        for (pair, window) in entries.windows(2).enumerate() {
            let (first_key, second_key) = (&keys[pair], &keys[pair + 1]);
            let ok = first_key <= second_key;
            sink.record(ok);
            if ok {
                continue;
            }
            all_ok = false;
            let (earlier, later) = (&ctx.paragraphs[window[0]], &ctx.paragraphs[window[1]]);
            sink.push(
                Finding::violation(
                    "reference.order",
                    CheckCategory::Reference,
                    Severity::Error,
                    format!(
                        "\"{}\" should come before \"{}\"",
                        later.preview(),
                        earlier.preview()
                    ),
                )
                .at(Location::Paragraphs {
                    indices: vec![window[0], window[1]],
                })
                .expected_actual(
                    format!("'{second_key}' before '{first_key}'"),
                    format!("'{first_key}' before '{second_key}'"),
                ),
            );
        }
        all_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuleSet;
    use crate::rules::engine::{DocumentLayout, ReferenceRegion};

    fn entry(text: &str) -> ParagraphAttributes {
        ParagraphAttributes::new(text, "Times New Roman", 12.0, 2.0)
            .with_indents(0.5, -0.5)
            .with_role(RoleHint::Reference)
    }

    fn run(paragraphs: &[ParagraphAttributes], references: Option<ReferenceRegion>) -> FindingSink {
        let rule_set = RuleSet::default();
        let page = PageAttributes {
            margins: Margins::uniform(1.0),
            page_size: PageSize::LETTER,
            page_count: 1,
        };
        let layout = DocumentLayout {
            headings: Vec::new(),
            references,
            abstract_index: None,
        };
        let ctx = CheckContext {
            rule_set: &rule_set,
            page: &page,
            paragraphs,
            layout: &layout,
        };
        let mut sink = FindingSink::new();
        ReferenceStage.run(&ctx, &mut sink);
        sink
    }

    fn region(entries: Vec<usize>) -> Option<ReferenceRegion> {
        Some(ReferenceRegion {
            title_index: 0,
            entries,
        })
    }

    #[test]
    fn test_alphabetized_list_passes() {
        let paragraphs = vec![
            ParagraphAttributes::new("References", "Times New Roman", 12.0, 2.0),
            entry("Álvarez, M. (2019). Memory."),
            entry("Brown, A. (2018). Sleep."),
            entry("Browning, C. (2020). Dreams."),
        ];
        let sink = run(&paragraphs, region(vec![1, 2, 3]));
        // One indent group plus two adjacent pairs
        assert_eq!(sink.tally().total(), 3);
        assert_eq!(sink.tally().passed(), 3);
        assert_eq!(sink.findings().last().unwrap().rule_id, "reference.list");
    }

    #[test]
    fn test_each_out_of_order_pair_reported_once() {
        let paragraphs = vec![
            ParagraphAttributes::new("References", "Times New Roman", 12.0, 2.0),
            entry("Adams, A. (2020)."),
            entry("Gamma, G. (2020)."),
            entry("Beta, B. (2020)."),
        ];
        let sink = run(&paragraphs, region(vec![1, 2, 3]));
        let order: Vec<&Finding> = sink
            .findings()
            .iter()
            .filter(|f| f.rule_id == "reference.order")
            .collect();
        assert_eq!(order.len(), 1);
        assert_eq!(order[0].location, Some(Location::Paragraphs { indices: vec![2, 3] }));
        assert_eq!(order[0].severity, Severity::Error);
    }

    #[test]
    fn test_missing_hanging_indent_grouped() {
        let flush = |text: &str| entry(text).with_indents(0.0, 0.0);
        let paragraphs = vec![
            ParagraphAttributes::new("References", "Times New Roman", 12.0, 2.0),
            flush("Adams, A. (2020)."),
            entry("Baker, B. (2020)."),
            flush("Clark, C. (2020)."),
        ];
        let sink = run(&paragraphs, region(vec![1, 2, 3]));
        let indent: Vec<&Finding> = sink
            .findings()
            .iter()
            .filter(|f| f.rule_id == "reference.hanging_indent")
            .collect();
        assert_eq!(indent.len(), 1);
        assert_eq!(indent[0].location, Some(Location::Paragraphs { indices: vec![1, 3] }));
        // Two indent groups, two pairs
        assert_eq!(sink.tally().total(), 4);
        assert_eq!(sink.tally().passed(), 3);
    }

    #[test]
    fn test_indent_group_split_at_tolerance_edge() {
        // Both round to 0.55in; only the first is within 0.05in of 0.5
        let paragraphs = vec![
            ParagraphAttributes::new("References", "Times New Roman", 12.0, 2.0),
            entry("Adams, A. (2020).").with_indents(0.548, -0.5),
            entry("Baker, B. (2020).").with_indents(0.553, -0.5),
        ];
        let sink = run(&paragraphs, region(vec![1, 2]));
        let indent: Vec<&Finding> = sink
            .findings()
            .iter()
            .filter(|f| f.rule_id == "reference.hanging_indent")
            .collect();
        assert_eq!(indent.len(), 1);
        assert_eq!(indent[0].location, Some(Location::Paragraphs { indices: vec![2] }));
    }

    #[test]
    fn test_accents_outside_latin1_sort_by_base_letter() {
        let paragraphs = vec![
            ParagraphAttributes::new("References", "Times New Roman", 12.0, 2.0),
            entry("Čapek, K. (1920). R.U.R."),
            entry("Chen, L. (2015). Networks."),
            entry("Šimek, A. (2019). Perception."),
            entry("Smith, B. (2018). Attention."),
            entry("Žižek, S. (2006). Parallax."),
        ];
        let sink = run(&paragraphs, region(vec![1, 2, 3, 4, 5]));
        assert!(sink.findings().iter().all(|f| f.rule_id != "reference.order"));
        assert_eq!(sink.tally().passed(), sink.tally().total());
    }

    #[test]
    fn test_absent_or_empty_region_is_skipped() {
        let sink = run(&[], None);
        assert_eq!(sink.tally().total(), 0);
        assert_eq!(sink.findings()[0].rule_id, "reference.missing");

        let paragraphs = vec![ParagraphAttributes::new("References", "Arial", 11.0, 2.0)];
        let sink = run(&paragraphs, region(vec![]));
        assert_eq!(sink.tally().total(), 0);
        assert_eq!(sink.findings()[0].rule_id, "reference.empty");
    }
}
