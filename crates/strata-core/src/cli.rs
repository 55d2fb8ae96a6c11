//! Output format and exit status of `strata-gen` commands.
//!
//! # Examples
//!
//! ```
//! use strata_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "JSON".parse().unwrap();
//! assert_eq!(format, OutputFormat::Json);
//! assert_eq!(ExitCode::VIOLATIONS.as_i32(), 1);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// How a command prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Serialized report, for scripts and editors
    Json,
    /// Plain lines without colors
    Text,
    /// Colored lines for a terminal
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Every format, in the order `--help` lists them.
    pub const ALL: [Self; 3] = [Self::Pretty, Self::Text, Self::Json];

    /// Name accepted by `--format`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
                Error::InvalidArgument(format!(
                    "unknown output format '{s}', expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// Process exit status.
///
/// Lint violations and propagated errors both exit with 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ExitCode(i32);

impl ExitCode {
    /// The command did its work, or had nothing to do.
    pub const SUCCESS: Self = Self(0);

    /// The linter flagged at least one violation.
    pub const VIOLATIONS: Self = Self(1);

    /// Numeric status for `std::process::exit`.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Whether this is [`ExitCode::SUCCESS`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_round_trips_names() {
        for format in OutputFormat::ALL {
            assert_eq!(format.to_string().parse::<OutputFormat>().unwrap(), format);
        }
        assert_eq!("Text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::default(), OutputFormat::Pretty);
    }

    #[test]
    fn test_unknown_output_format() {
        let err = "yaml".parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(err.to_string().contains("expected one of: pretty, text, json"));
    }

    #[test]
    fn test_exit_codes() {
        assert!(ExitCode::SUCCESS.is_success());
        assert!(!ExitCode::VIOLATIONS.is_success());
        assert_eq!(ExitCode::default(), ExitCode::SUCCESS);
        assert_eq!(ExitCode::VIOLATIONS.to_string(), "1");
    }
}
