use crate::types::*;
use std::collections::HashSet;

use super::engine::{group_paragraphs, unreadable, CheckContext, CheckStage, FindingSink};
use super::typography::paragraph_count;

const MAX_PLAUSIBLE_SPACE_PT: f32 = 200.0;
const MAX_PLAUSIBLE_INDENT_INCHES: f32 = 5.0;

// ParagraphSpacingStage - one check per distinct (space before, space after) pair
pub struct ParagraphSpacingStage;

impl CheckStage for ParagraphSpacingStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let expected = ctx.rule_set.paragraph_spacing_pt;
        let tolerance = ctx.rule_set.tolerances.paragraph_spacing_pt;
        let plausible = |v: f32| v.is_finite() && (0.0..=MAX_PLAUSIBLE_SPACE_PT).contains(&v);
        let within = |v: f32| (v - expected).abs() <= tolerance + 1e-4;
        let mut unreadable_indices = Vec::new();

        let readable = ctx.paragraphs.iter().enumerate().filter(|(i, p)| {
            if p.is_blank() {
                return false;
            }
            let ok = plausible(p.space_before_pt) && plausible(p.space_after_pt);
            if !ok {
                unreadable_indices.push(*i);
            }
            ok
        });
        let groups = group_paragraphs(readable.map(|(i, p)| {
            let (before, after) = (p.space_before_pt, p.space_after_pt);
            let ok = within(before) && within(after);
            // Half-point buckets
            let key = ((before * 2.0).round() as i32, (after * 2.0).round() as i32, ok);
            (i, key, (before, after, ok))
        }));

        let mut all_ok = unreadable_indices.is_empty();
        for group in &groups {
            let (before, after, ok) = group.value;
            sink.record(ok);
            if ok {
                continue;
            }
            all_ok = false;
            sink.push(
                Finding::violation(
                    "spacing.paragraph",
                    CheckCategory::Spacing,
                    Severity::Warning,
                    format!(
                        "{} {before}pt before and {after}pt after; expected {expected}pt",
                        paragraph_count(group.indices.len())
                    ),
                )
                .at(Location::Paragraphs {
                    indices: group.indices.clone(),
                })
                .expected_actual(
                    format!("{expected}pt before and after"),
                    format!("{before}pt before, {after}pt after"),
                ),
            );
        }

        if !unreadable_indices.is_empty() {
            sink.push(unreadable(
                format!(
                    "Space before or after cannot be read for {} paragraph(s)",
                    unreadable_indices.len()
                ),
                Location::Paragraphs {
                    indices: unreadable_indices,
                },
            ));
            sink.record(false);
        }

        if all_ok && !groups.is_empty() {
            sink.push(Finding::pass(
                "spacing.paragraph",
                CheckCategory::Spacing,
                format!("No paragraph adds more than {expected}pt of space before or after"),
            ));
        }
    }

    fn name(&self) -> &str {
        "ParagraphSpacing"
    }
}

// ParagraphIndentStage - one check per distinct first-line indent of body text
pub struct ParagraphIndentStage;

impl ParagraphIndentStage {
    /// Body text only. Headings, reference entries, the abstract, centered
    /// lines and block quotes (anything on a left indent) follow other rules.
    fn body_indices(ctx: &CheckContext<'_>) -> Vec<usize> {
        let layout = ctx.layout;
        let tolerance = ctx.rule_set.tolerances.indent_inches;
        let mut excluded: HashSet<usize> = layout.headings.iter().map(|h| h.index).collect();
        if let Some(region) = &layout.references {
            excluded.insert(region.title_index);
            excluded.extend(region.entries.iter().copied());
        }
        excluded.extend(layout.abstract_index);

        ctx.paragraphs
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                !excluded.contains(i)
                    && !p.is_blank()
                    && matches!(p.role_hint, None | Some(RoleHint::Body))
                    && p.alignment != Alignment::Center
                    && p.left_indent_inches.abs() <= tolerance
            })
            .map(|(i, _)| i)
            .collect()
    }
}

impl CheckStage for ParagraphIndentStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let expected = ctx.rule_set.paragraph_indent_inches;
        let tolerance = ctx.rule_set.tolerances.indent_inches;
        let mut unreadable_indices = Vec::new();

        let body = Self::body_indices(ctx);
        let readable = body.iter().copied().filter(|&i| {
            let first = ctx.paragraphs[i].first_line_indent_inches;
            let ok = first.is_finite() && first.abs() <= MAX_PLAUSIBLE_INDENT_INCHES;
            if !ok {
                unreadable_indices.push(i);
            }
            ok
        });
        let groups = group_paragraphs(readable.map(|i| {
            let first = ctx.paragraphs[i].first_line_indent_inches;
            let ok = (first - expected).abs() <= tolerance + 1e-4;
            // Hundredths of an inch
            (i, ((first * 100.0).round() as i32, ok), (first, ok))
        }));

        let mut all_ok = unreadable_indices.is_empty();
        for group in &groups {
            let (first, ok) = group.value;
            sink.record(ok);
            if ok {
                continue;
            }
            all_ok = false;
            sink.push(
                Finding::violation(
                    "indent.first_line",
                    CheckCategory::Spacing,
                    Severity::Error,
                    format!(
                        "{} a {first:.2}in first-line indent; expected {expected:.2}in",
                        paragraph_count(group.indices.len())
                    ),
                )
                .at(Location::Paragraphs {
                    indices: group.indices.clone(),
                })
                .expected_actual(format!("{expected:.2}in"), format!("{first:.2}in")),
            );
        }

        if !unreadable_indices.is_empty() {
            sink.push(unreadable(
                format!(
                    "First-line indent cannot be read for {} paragraph(s)",
                    unreadable_indices.len()
                ),
                Location::Paragraphs {
                    indices: unreadable_indices,
                },
            ));
            sink.record(false);
        }

        if all_ok && !groups.is_empty() {
            sink.push(Finding::pass(
                "indent.first_line",
                CheckCategory::Spacing,
                format!("Body paragraphs open with a {expected:.2}in first-line indent"),
            ));
        }
    }

    fn name(&self) -> &str {
        "ParagraphIndent"
    }
}
