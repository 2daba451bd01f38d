use crate::types::*;

use super::engine::{unreadable, CheckContext, CheckStage, FindingSink};

/// Margins wider than this are treated as misread values.
const MAX_PLAUSIBLE_MARGIN_INCHES: f32 = 5.0;
const MAX_PLAUSIBLE_PAGE_INCHES: f32 = 100.0;

// Absorbs f32 rounding when a value sits exactly on the tolerance boundary
const EPSILON: f32 = 1e-4;

fn within(actual: f32, expected: f32, tolerance: f32) -> bool {
    (actual - expected).abs() <= tolerance + EPSILON
}

// PageLayoutStage - four margins plus the page size
pub struct PageLayoutStage;

impl CheckStage for PageLayoutStage {
    fn run(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let rules = ctx.rule_set;
        let margins = &ctx.page.margins;
        let tolerance = rules.margin_tolerance_inches();
        let mut all_margins_ok = true;

        for side in MarginSide::ALL {
            let actual = margins.get(side);
            let expected = rules.expected_margin(side);

            if !(actual.is_finite() && (0.0..=MAX_PLAUSIBLE_MARGIN_INCHES).contains(&actual)) {
                sink.push(unreadable(
                    format!("The {side} margin value ({actual}) cannot be read"),
                    Location::Margin { side },
                ));
                sink.record(false);
                all_margins_ok = false;
                continue;
            }

            let ok = within(actual, expected, tolerance);
            sink.record(ok);
            if !ok {
                all_margins_ok = false;
                sink.push(
                    Finding::violation(
                        format!("page.margin.{side}"),
                        CheckCategory::Page,
                        Severity::Error,
                        format!("The {side} margin is {actual:.2}in; APA 7 requires {expected:.2}in"),
                    )
                    .at(Location::Margin { side })
                    .expected_actual(format!("{expected:.2}in"), format!("{actual:.2}in")),
                );
            }
        }

        if all_margins_ok {
            sink.push(Finding::pass(
                "page.margins",
                CheckCategory::Page,
                format!("All four margins are within {tolerance:.2}in of the required width"),
            ));
        }

        self.check_page_size(ctx, sink);
    }

    fn name(&self) -> &str {
        "PageLayout"
    }
}

impl PageLayoutStage {
    fn check_page_size(&self, ctx: &CheckContext<'_>, sink: &mut FindingSink) {
        let actual = ctx.page.page_size;
        let expected = ctx.rule_set.page_size;
        let readable = |v: f32| v.is_finite() && v > 0.0 && v <= MAX_PLAUSIBLE_PAGE_INCHES;

        if !(readable(actual.width_inches) && readable(actual.height_inches)) {
            sink.push(unreadable(
                format!("The page size ({} x {}) cannot be read", actual.width_inches, actual.height_inches),
                Location::Page,
            ));
            sink.record(false);
            return;
        }

        let tolerance = ctx.rule_set.tolerances.page_size_inches;
        let ok = within(actual.width_inches, expected.width_inches, tolerance)
            && within(actual.height_inches, expected.height_inches, tolerance);
        sink.record(ok);

        if ok {
            sink.push(
                Finding::pass("page.size", CheckCategory::Page, format!("Page size is {actual}"))
                    .at(Location::Page),
            );
        } else {
            sink.push(
                Finding::violation(
                    "page.size",
                    CheckCategory::Page,
                    Severity::Error,
                    format!("Page size is {actual}; expected {expected}"),
                )
                .at(Location::Page)
                .expected_actual(expected.to_string(), actual.to_string()),
            );
        }
    }
}
