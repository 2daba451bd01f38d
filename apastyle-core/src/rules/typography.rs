use crate::types::*;

use super::engine::{group_paragraphs, unreadable, CheckContext, CheckStage, FindingSink};

const MAX_PLAUSIBLE_FONT_PT: f32 = 200.0;
const MAX_PLAUSIBLE_SPACING: f32 = 10.0;

pub(super) fn paragraph_count(n: usize) -> String {
    if n == 1 {
        "1 paragraph uses".to_string()
    } else {
        format!("{n} paragraphs use")
    }
}

// FontStage - one check per distinct (font, size) pair
pub struct FontStage;

impl CheckStage for FontStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let rules = ctx.rule_set;
        let mut unreadable_indices = Vec::new();

        let readable = ctx.paragraphs.iter().enumerate().filter(|(i, p)| {
            if p.is_blank() {
                return false;
            }
            let ok = !p.font_name.trim().is_empty()
                && p.font_size.is_finite()
                && p.font_size > 0.0
                && p.font_size <= MAX_PLAUSIBLE_FONT_PT;
            if !ok {
                unreadable_indices.push(*i);
            }
            ok
        });
        let groups = group_paragraphs(readable.map(|(i, p)| {
            let name = p.font_name.trim();
            let ok = rules.is_font_allowed(name, p.font_size);
            // Half-point buckets, split by verdict so a bucket straddling the
            // size tolerance never hides a failing paragraph
            let key = (name.to_lowercase(), (p.font_size * 2.0).round() as i32, ok);
            (i, key, (name.to_string(), p.font_size, ok))
        }));

        let mut all_ok = unreadable_indices.is_empty();
        for group in &groups {
            let (name, size, ok) = &group.value;
            sink.record(*ok);
            if *ok {
                continue;
            }
            all_ok = false;
            sink.push(
                Finding::violation(
                    "font.not_allowed",
                    CheckCategory::Font,
                    Severity::Error,
                    format!(
                        "{} {name} {size}pt, which is not an allowed font and size",
                        paragraph_count(group.indices.len())
                    ),
                )
                .at(Location::Paragraphs {
                    indices: group.indices.clone(),
                })
                .expected_actual(rules.allowed_fonts_summary(), format!("{name} {size}pt")),
            );
        }

        if !unreadable_indices.is_empty() {
            sink.push(unreadable(
                format!("Font name or size cannot be read for {} paragraph(s)", unreadable_indices.len()),
                Location::Paragraphs {
                    indices: unreadable_indices,
                },
            ));
            sink.record(false);
        }

        if all_ok && !groups.is_empty() {
            let used: Vec<String> = groups
                .iter()
                .map(|g| format!("{} {}pt", g.value.0, g.value.1))
                .collect();
            sink.push(Finding::pass(
                "font.allowed",
                CheckCategory::Font,
                format!("All text uses an allowed font: {}", used.join(", ")),
            ));
        }
    }

    fn name(&self) -> &str {
        "Fonts"
    }
}

// LineSpacingStage - one check per distinct line spacing
pub struct LineSpacingStage;

impl CheckStage for LineSpacingStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let rules = ctx.rule_set;
        let expected = rules.line_spacing;
        let tolerance = rules.tolerances.line_spacing;
        let mut unreadable_indices = Vec::new();

        let readable = ctx.paragraphs.iter().enumerate().filter(|(i, p)| {
            if p.is_blank() {
                return false;
            }
            let ok = p.line_spacing.is_finite()
                && p.line_spacing > 0.0
                && p.line_spacing <= MAX_PLAUSIBLE_SPACING;
            if !ok {
                unreadable_indices.push(*i);
            }
            ok
        });
        let groups = group_paragraphs(readable.map(|(i, p)| {
            let ok = (p.line_spacing - expected).abs() <= tolerance + 1e-4;
            (i, ((p.line_spacing * 100.0).round() as i32, ok), (p.line_spacing, ok))
        }));

        let mut all_ok = unreadable_indices.is_empty();
        for group in &groups {
            let (spacing, ok) = group.value;
            sink.record(ok);
            if ok {
                continue;
            }
            all_ok = false;
            sink.push(
                Finding::violation(
                    "spacing.line",
                    CheckCategory::Spacing,
                    Severity::Error,
                    format!(
                        "{} {spacing:.2} line spacing; expected {expected:.1}",
                        paragraph_count(group.indices.len())
                    ),
                )
                .at(Location::Paragraphs {
                    indices: group.indices.clone(),
                })
                .expected_actual(format!("{expected:.2}"), format!("{spacing:.2}")),
            );
        }

        if !unreadable_indices.is_empty() {
            sink.push(unreadable(
                format!("Line spacing cannot be read for {} paragraph(s)", unreadable_indices.len()),
                Location::Paragraphs {
                    indices: unreadable_indices,
                },
            ));
            sink.record(false);
        }

        if all_ok && !groups.is_empty() {
            sink.push(Finding::pass(
                "spacing.line",
                CheckCategory::Spacing,
                format!("All text is spaced at {expected:.1}"),
            ));
        }
    }

    fn name(&self) -> &str {
        "LineSpacing"
    }
}
