//! Decoding isolation from its lowered textual form.
//!
//! The textual form carries only the kind keyword, so every decoded value is
//! degraded: its actor or global actor type is unavailable. Input is untrusted
//! and unknown keywords are reported, never fatal.

use std::str::FromStr;

use isola_diag::{Category, Diagnostic, SourceLocation};

use crate::{ActorIsolation, IsolationKind};

/// Older spelling of `global_actor`, accepted on input and never printed.
pub const LEGACY_GLOBAL_ACTOR_ALIAS: &str = "global_actor_unsafe";

impl IsolationKind {
    /// Map a keyword, including the legacy alias, to its kind.
    pub fn from_keyword(text: &str) -> Option<IsolationKind> {
        match text {
            "unspecified" => Some(IsolationKind::Unspecified),
            "actor_instance" => Some(IsolationKind::ActorInstance),
            "nonisolated" => Some(IsolationKind::Nonisolated),
            "nonisolated_unsafe" => Some(IsolationKind::NonisolatedUnsafe),
            "global_actor" | LEGACY_GLOBAL_ACTOR_ALIAS => Some(IsolationKind::GlobalActor),
            _ => None,
        }
    }
}

impl ActorIsolation {
    /// Decode a textual keyword. The result is always degraded.
    pub fn for_textual(text: &str) -> Option<ActorIsolation> {
        IsolationKind::from_keyword(text).map(ActorIsolation::degraded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown isolation keyword `{0}`")]
pub struct UnknownIsolationKeyword(pub String);

impl FromStr for ActorIsolation {
    type Err = UnknownIsolationKeyword;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        ActorIsolation::for_textual(text).ok_or_else(|| UnknownIsolationKeyword(text.to_string()))
    }
}

/// Decode an isolation keyword read at `location`.
///
/// On success, returns the degraded value plus warnings about lost payload
/// and legacy spellings. Unknown keywords yield an error diagnostic.
pub fn parse_isolation_at(
    text: &str,
    location: SourceLocation,
) -> Result<(ActorIsolation, Vec<Diagnostic>), Vec<Diagnostic>> {
    let Some(isolation) = ActorIsolation::for_textual(text) else {
        let category = Category::UnknownIsolation;
        return Err(vec![
            Diagnostic::error(category, format!("unknown isolation keyword `{text}`"))
                .at(location)
                .with_help(category.example_fix()),
        ]);
    };

    let mut warnings = Vec::new();
    if text == LEGACY_GLOBAL_ACTOR_ALIAS {
        let category = Category::LegacyIsolationAlias;
        warnings.push(
            Diagnostic::warning(
                category,
                format!("`{LEGACY_GLOBAL_ACTOR_ALIAS}` is a legacy spelling of `global_actor`"),
            )
            .at(location)
            .with_help(category.example_fix()),
        );
    }
    if isolation.is_actor_isolated() {
        warnings.push(
            Diagnostic::warning(
                Category::DegradedIsolation,
                format!("`{}` isolation decoded without its actor", isolation.kind()),
            )
            .at(location),
        );
    }
    Ok((isolation, warnings))
}
