//! Session-wide settings for isolation queries.

use serde::Deserialize;

/// Settings that change how contexts resolve to an isolation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IsolationConfig {
    /// Isolation of top-level code in script files.
    pub top_level: TopLevelIsolation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopLevelIsolation {
    #[default]
    Unspecified,
    /// Top-level code runs on the main actor when the session declares one.
    MainActor,
}
