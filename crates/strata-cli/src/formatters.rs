//! Output formatters for CLI commands.
//!
//! `json` prints the serialized value; `text` and `pretty` print the
//! human-readable rendering, `pretty` with colors.

use anyhow::Result;
use colored::{ColoredString, Colorize};
use serde::Serialize;
use strata_codegen::{FileStatus, GenReport, RouteEntry};
use strata_core::cli::OutputFormat;
use strata_lint::LintReport;

/// Human-readable rendering of a command result.
pub trait Render {
    /// Renders `self` as lines; `paint` decides whether colors apply.
    fn render(&self, paint: Paint) -> String;
}

/// Whether rendered output is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint(bool);

impl Paint {
    /// Colors on.
    pub const COLOR: Self = Self(true);
    /// Colors off.
    pub const PLAIN: Self = Self(false);

    fn apply(self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.0 {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }
}

/// Formats `data` according to `format`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Examples
///
/// ```
/// use strata_cli::formatters::format_output;
/// use strata_core::cli::OutputFormat;
/// use strata_lint::LintReport;
///
/// let report = LintReport::default();
/// let json = format_output(&report, OutputFormat::Json)?;
/// assert!(json.contains("\"violations\": []"));
/// assert_eq!(format_output(&report, OutputFormat::Text)?, "no violations in 0 file(s)");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize + Render>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::Text => Ok(data.render(Paint::PLAIN)),
        OutputFormat::Pretty => Ok(data.render(Paint::COLOR)),
    }
}

impl Render for LintReport {
    fn render(&self, paint: Paint) -> String {
        if self.is_clean() {
            return paint.apply(
                &format!("no violations in {} file(s)", self.files_checked),
                |s| s.green(),
            );
        }
        let mut lines = Vec::new();
        for (check, violations) in self.by_check() {
            lines.push(paint.apply(&format!("{check} ({})", violations.len()), |s| s.bold().red()));
            for v in violations {
                lines.push(format!("  {}", v.message));
            }
        }
        lines.push(paint.apply(
            &format!(
                "{} violation(s) in {} file(s)",
                self.violations.len(),
                self.files_checked
            ),
            |s| s.red(),
        ));
        lines.join("\n")
    }
}

impl Render for GenReport {
    fn render(&self, paint: Paint) -> String {
        let mut lines = Vec::new();
        for file in self.files.iter().filter(|f| f.status != FileStatus::Unchanged) {
            let status = format!("{:>9}", file.status.to_string());
            let status = match file.status {
                FileStatus::Created => paint.apply(&status, |s| s.green()),
                FileStatus::Changed => paint.apply(&status, |s| s.yellow()),
                FileStatus::Skipped => paint.apply(&status, |s| s.dimmed()),
                FileStatus::Unchanged => status,
            };
            lines.push(format!("{status} {}", file.path));
        }
        for path in &self.pruned {
            lines.push(format!("{} {path}", paint.apply(&format!("{:>9}", "pruned"), |s| s.red())));
        }
        let verb = if self.dry_run { "would write" } else { "wrote" };
        lines.push(paint.apply(
            &format!(
                "{} model(s), {verb} {} file(s), {} pruned",
                self.models,
                self.changed_count(),
                self.pruned.len()
            ),
            |s| s.bold(),
        ));
        lines.join("\n")
    }
}

impl Render for Vec<RouteEntry> {
    fn render(&self, paint: Paint) -> String {
        if self.is_empty() {
            return "no routes".to_string();
        }
        let width = self.iter().map(|r| r.path.len()).max().unwrap_or(0);
        self.iter()
            .map(|r| {
                let method = paint.apply(&format!("{:<6}", r.method), |s| s.cyan());
                let access = if r.public { "public" } else { "auth" };
                format!(
                    "{method} {:<width$}  {:<6} {}",
                    r.path,
                    access,
                    r.model
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Phase;
    use strata_lint::{Check, Violation};

    #[test]
    fn test_lint_report_text() {
        let report = LintReport {
            files_checked: 3,
            consumer: true,
            violations: vec![
                Violation::new(Check::Plural, "src/model/users.rs: plural"),
                Violation::new(Check::Layering, "src/service/a/b.rs: import"),
            ],
        };
        assert_eq!(
            report.render(Paint::PLAIN),
            "layering (1)\n  src/service/a/b.rs: import\nplural (1)\n  src/model/users.rs: plural\n2 violation(s) in 3 file(s)"
        );
    }

    #[test]
    fn test_gen_report_text() {
        let mut report = GenReport::new(true);
        report.models = 1;
        report.push("src/main.rs", FileStatus::Created);
        report.push("src/model/registry.rs", FileStatus::Unchanged);
        report.pruned.push("src/service/user/get.rs".to_string());
        assert_eq!(
            report.render(Paint::PLAIN),
            "  created src/main.rs\n   pruned src/service/user/get.rs\n1 model(s), would write 1 file(s), 1 pruned"
        );
    }

    #[test]
    fn test_routes_text_and_json() {
        let routes = vec![RouteEntry {
            method: "GET",
            path: "/users/:id".to_string(),
            phase: Phase::Get,
            public: true,
            model: "crate::model::user::User".to_string(),
            payload: "User".to_string(),
            result: "User".to_string(),
        }];
        assert_eq!(
            routes.render(Paint::PLAIN),
            "GET    /users/:id  public crate::model::user::User"
        );
        let json = format_output(&routes, OutputFormat::Json).unwrap();
        assert!(json.contains("\"path\": \"/users/:id\""));
        assert_eq!(Vec::<RouteEntry>::new().render(Paint::PLAIN), "no routes");
    }
}
