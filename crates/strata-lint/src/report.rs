//! Lint findings.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use strata_core::cli::ExitCode;

/// Kind of check that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// A source file failed to parse
    Parse,
    /// A layer imports another module of the same layer
    Layering,
    /// A model directory or file name looks plural
    Plural,
    /// A serde rename, alias or rename_all is not snake_case
    Tags,
    /// A module file or directory is misnamed
    ModuleNames,
    /// A top-level source directory is outside the allow-list
    Layout,
}

impl Check {
    /// Every check, in report order.
    pub const ALL: [Self; 6] = [
        Self::Parse,
        Self::Layering,
        Self::Plural,
        Self::Tags,
        Self::ModuleNames,
        Self::Layout,
    ];

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Layering => "layering",
            Self::Plural => "plural",
            Self::Tags => "tags",
            Self::ModuleNames => "module_names",
            Self::Layout => "layout",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One convention violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Check that flagged it
    pub check: Check,
    /// Human-readable message, starting with the offending path
    pub message: String,
}

impl Violation {
    /// Creates a violation.
    #[must_use]
    pub fn new(check: Check, message: impl Into<String>) -> Self {
        Self {
            check,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.check, self.message)
    }
}

/// Result of one lint run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LintReport {
    /// Number of Rust source files inspected
    pub files_checked: usize,
    /// Whether the project depends on the framework
    pub consumer: bool,
    /// Violations in discovery order
    pub violations: Vec<Violation>,
}

impl LintReport {
    /// Whether nothing was flagged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of violations of one kind.
    #[must_use]
    pub fn count(&self, check: Check) -> usize {
        self.violations.iter().filter(|v| v.check == check).count()
    }

    /// Violations grouped by check.
    #[must_use]
    pub fn by_check(&self) -> BTreeMap<Check, Vec<&Violation>> {
        let mut groups: BTreeMap<Check, Vec<&Violation>> = BTreeMap::new();
        for v in &self.violations {
            groups.entry(v.check).or_default().push(v);
        }
        groups
    }

    /// Process exit code for this report.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.violations.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::VIOLATIONS
        }
    }

    pub(crate) fn extend(&mut self, violations: impl IntoIterator<Item = Violation>) {
        self.violations.extend(violations);
    }
}
