//! Error reporting and diagnostics for isolation analysis.
//!
//! Diagnostics are created by other crates (for example, the textual
//! isolation reader in `isola-core`) and rendered here for display.

use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Diagnostic severity and categories
// ---------------------------------------------------------------------------

/// How severe a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Broad category for diagnostics. Used for filtering and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Textual isolation keyword is not recognized.
    UnknownIsolation,
    /// Textual isolation names a payload-bearing kind whose payload is lost.
    DegradedIsolation,
    /// Textual isolation uses a legacy spelling.
    LegacyIsolationAlias,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::UnknownIsolation,
        Category::DegradedIsolation,
        Category::LegacyIsolationAlias,
    ];

    pub fn from_code(code: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|cat| cat.code().eq_ignore_ascii_case(code))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::UnknownIsolation => "unknown_isolation",
            Category::DegradedIsolation => "degraded_isolation",
            Category::LegacyIsolationAlias => "legacy_isolation_alias",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Category::UnknownIsolation => "E0201",
            Category::DegradedIsolation => "W0202",
            Category::LegacyIsolationAlias => "W0203",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Category::UnknownIsolation => "The text does not name a known isolation kind.",
            Category::DegradedIsolation => {
                "The isolation kind was recovered but its actor or global actor type was not."
            }
            Category::LegacyIsolationAlias => "The isolation keyword is a legacy alias.",
        }
    }

    pub fn example_fix(self) -> &'static str {
        match self {
            Category::UnknownIsolation => {
                "Use one of unspecified, actor_instance, nonisolated, nonisolated_unsafe, global_actor."
            }
            Category::DegradedIsolation => {
                "Re-derive the isolation from the declaration when the payload is needed."
            }
            Category::LegacyIsolationAlias => "Write `global_actor` instead.",
        }
    }
}

// ---------------------------------------------------------------------------
// Source locations
// ---------------------------------------------------------------------------

/// A source location for diagnostics, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    pub file_id: u32,
    pub start: u32,
    pub end: u32,
}

// ---------------------------------------------------------------------------
// Diagnostic
// ---------------------------------------------------------------------------

/// A structured diagnostic message.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    /// Stable diagnostic code (e.g. E0201).
    pub code: Option<String>,
    pub severity: Severity,
    pub category: Category,
    /// Primary message: what went wrong.
    pub message: String,
    /// Where it went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Suggested fix, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    pub fn warning(category: Category, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn new(severity: Severity, category: Category, message: impl Into<String>) -> Self {
        Self {
            code: Some(category.code().to_string()),
            severity,
            category,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        if let Some(code) = &self.code {
            write!(f, "{prefix}[{code}]: {}", self.message)?;
        } else {
            write!(f, "{prefix}: {}", self.message)?;
        }
        if let Some(help) = &self.help {
            write!(f, "\n  help: {help}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_builder() {
        let loc = SourceLocation {
            file_id: 0,
            start: 10,
            end: 20,
        };
        let diag = Diagnostic::error(Category::UnknownIsolation, "unknown isolation `bogus`")
            .at(loc)
            .with_help("write `nonisolated`");

        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_deref(), Some("E0201"));
        assert_eq!(diag.category, Category::UnknownIsolation);
        assert_eq!(diag.location, Some(loc));
        assert!(diag.is_error());
        assert!(diag.help.unwrap().contains("nonisolated"));
    }

    #[test]
    fn diagnostic_display() {
        let diag = Diagnostic::warning(Category::LegacyIsolationAlias, "legacy alias")
            .with_help("Write `global_actor` instead.");
        let s = format!("{diag}");
        assert_eq!(
            s,
            "warning[W0203]: legacy alias\n  help: Write `global_actor` instead."
        );
    }

    #[test]
    fn warnings_are_not_errors() {
        let diag = Diagnostic::warning(Category::DegradedIsolation, "payload lost");
        assert_eq!(diag.severity, Severity::Warning);
        assert!(!diag.is_error());
    }

    #[test]
    fn category_metadata_is_stable_and_unique() {
        let mut codes = std::collections::BTreeSet::new();
        for cat in Category::ALL {
            assert!(!cat.as_str().is_empty());
            assert!(!cat.description().is_empty());
            assert!(!cat.example_fix().is_empty());
            assert!(
                codes.insert(cat.code()),
                "duplicate diagnostic code detected: {}",
                cat.code()
            );
            assert_eq!(Category::from_code(cat.code()), Some(cat));
        }
        assert_eq!(Category::from_code("w0203"), Some(Category::LegacyIsolationAlias));
        assert_eq!(Category::from_code("E9999"), None);
    }
}
