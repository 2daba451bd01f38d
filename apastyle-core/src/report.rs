use crate::types::*;
use serde::Serialize;
use std::fmt;

/// Findings of one category, in checker order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: CheckCategory,
    pub findings: Vec<Finding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityGroup {
    pub severity: Severity,
    pub categories: Vec<CategoryGroup>,
}

/// A report regrouped for display: by severity (error, warning, info), then
/// by category. Empty groups are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    pub score: u8,
    pub total_checks: u32,
    pub checks_passed: u32,
    pub compliant: bool,
    pub groups: Vec<SeverityGroup>,
}

impl ReportView {
    pub fn from_report(report: &ComplianceReport) -> Self {
        let groups = Severity::ALL
            .iter()
            .filter_map(|&severity| {
                let categories: Vec<CategoryGroup> = CheckCategory::ALL
                    .iter()
                    .filter_map(|&category| {
                        let findings: Vec<Finding> = report
                            .findings()
                            .iter()
                            .filter(|f| f.severity == severity && f.category == category)
                            .cloned()
                            .collect();
                        (!findings.is_empty()).then_some(CategoryGroup { category, findings })
                    })
                    .collect();
                (!categories.is_empty()).then_some(SeverityGroup {
                    severity,
                    categories,
                })
            })
            .collect();

        Self {
            score: report.score(),
            total_checks: report.total_checks(),
            checks_passed: report.checks_passed(),
            compliant: report.is_compliant(),
            groups,
        }
    }

    /// True when no error-severity finding failed.
    pub fn compliant(&self) -> bool {
        self.compliant
    }

    fn count_failed(&self, severity: Severity) -> usize {
        self.groups
            .iter()
            .filter(|g| g.severity == severity)
            .flat_map(|g| &g.categories)
            .flat_map(|c| &c.findings)
            .filter(|f| !f.passed)
            .count()
    }
}

fn severity_heading(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌ Errors",
        Severity::Warning => "⚠️  Warnings",
        Severity::Info => "ℹ️  Passed and informational",
    }
}

fn category_icon(category: CheckCategory) -> &'static str {
    match category {
        CheckCategory::Page => "📄",
        CheckCategory::Font => "🔤",
        CheckCategory::Spacing => "📏",
        CheckCategory::Heading => "🏷️ ",
        CheckCategory::Reference => "📚",
        CheckCategory::Integrity => "🧩",
        CheckCategory::Document => "📝",
    }
}

fn status_icon(finding: &Finding) -> &'static str {
    match (finding.passed, finding.severity) {
        (true, _) => "✅",
        (false, Severity::Error) => "❌",
        (false, Severity::Warning) => "⚠️ ",
        (false, Severity::Info) => "ℹ️ ",
    }
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "📊 Score: {}/100 ({}/{} checks passed)",
            self.score, self.checks_passed, self.total_checks
        )?;
        if self.compliant {
            writeln!(f, "✅ Compliant")?;
        } else {
            writeln!(
                f,
                "❌ Not compliant: {} error(s), {} warning(s)",
                self.count_failed(Severity::Error),
                self.count_failed(Severity::Warning)
            )?;
        }

        for group in &self.groups {
            writeln!(f)?;
            writeln!(f, "{}", severity_heading(group.severity))?;
            for category in &group.categories {
                writeln!(f, "   {} {}", category_icon(category.category), category.category.label())?;
                for finding in &category.findings {
                    write!(f, "      {} {}", status_icon(finding), finding.message)?;
                    match &finding.location {
                        Some(location) => writeln!(f, " ({location})")?,
                        None => writeln!(f)?,
                    }
                    if let (Some(expected), Some(actual)) = (&finding.expected, &finding.actual) {
                        writeln!(f, "         expected: {expected}")?;
                        writeln!(f, "         found:    {actual}")?;
                    }
                }
            }
        }
        Ok(())
    }
}

/// Human-readable report text as printed by the CLI.
pub fn render_text(view: &ReportView) -> String {
    view.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_report() -> ComplianceReport {
        let mut tally = CheckTally::default();
        let findings = vec![
            Finding::violation("page.margin.left", CheckCategory::Page, Severity::Error, "left")
                .at(Location::Margin { side: MarginSide::Left })
                .expected_actual("1.00in", "0.80in"),
            Finding::pass("page.size", CheckCategory::Page, "size ok"),
            Finding::violation("heading.sequence", CheckCategory::Heading, Severity::Warning, "jump"),
            Finding::violation("font.not_allowed", CheckCategory::Font, Severity::Error, "font"),
            Finding::pass("spacing.line", CheckCategory::Spacing, "spacing ok"),
            Finding::violation("page.margin.top", CheckCategory::Page, Severity::Error, "top"),
        ];
        for finding in &findings {
            tally.record(finding.passed);
        }
        ComplianceReport::from_tally(findings, tally)
    }

    #[test]
    fn test_groups_by_severity_then_category_preserving_order() {
        let view = ReportView::from_report(&sample_report());
        let layout: Vec<(Severity, CheckCategory, Vec<&str>)> = view
            .groups
            .iter()
            .flat_map(|g| {
                g.categories.iter().map(move |c| {
                    (
                        g.severity,
                        c.category,
                        c.findings.iter().map(|f| f.rule_id.as_str()).collect(),
                    )
                })
            })
            .collect();
        assert_eq!(
            layout,
            vec![
                (Severity::Error, CheckCategory::Page, vec!["page.margin.left", "page.margin.top"]),
                (Severity::Error, CheckCategory::Font, vec!["font.not_allowed"]),
                (Severity::Warning, CheckCategory::Heading, vec!["heading.sequence"]),
                (Severity::Info, CheckCategory::Page, vec!["page.size"]),
                (Severity::Info, CheckCategory::Spacing, vec!["spacing.line"]),
            ]
        );
        assert!(!view.compliant());
        assert_eq!(view.score, 33);
    }

    #[test]
    fn test_text_rendering_lists_icons_and_details() {
        let text = render_text(&ReportView::from_report(&sample_report()));
        assert!(text.starts_with("📊 Score: 33/100 (2/6 checks passed)\n❌ Not compliant: 3 error(s), 1 warning(s)\n"));
        assert!(text.contains("      ❌ left (left margin)\n         expected: 1.00in\n         found:    0.80in\n"));
        assert!(text.contains("      ✅ size ok\n"));
    }

    #[test]
    fn test_empty_report_view() {
        let view = ReportView::from_report(&ComplianceReport::empty());
        assert!(view.groups.is_empty());
        assert!(view.compliant());
        assert_eq!(render_text(&view), "📊 Score: 100/100 (0/0 checks passed)\n✅ Compliant\n");
    }
}
