//! Serializable snapshots of isolation values for tooling output.

use serde::Serialize;

use crate::{ActorIsolation, Isolation, IsolationCrossing};

/// One isolation value, flattened for JSON consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IsolationReport {
    pub isolation: &'static str,
    pub actor_isolated: bool,
    pub nonisolated: bool,
    pub degraded: bool,
    pub preconcurrency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_actor: Option<String>,
}

impl From<&ActorIsolation> for IsolationReport {
    fn from(isolation: &ActorIsolation) -> Self {
        let global_actor = match isolation.isolation() {
            Isolation::GlobalActor { actor } => actor.as_ref().map(ToString::to_string),
            Isolation::Unspecified
            | Isolation::ActorInstance { .. }
            | Isolation::Nonisolated
            | Isolation::NonisolatedUnsafe => None,
        };
        Self {
            isolation: isolation.kind().as_str(),
            actor_isolated: isolation.is_actor_isolated(),
            nonisolated: isolation.is_nonisolated(),
            degraded: isolation.is_degraded(),
            preconcurrency: isolation.preconcurrency(),
            global_actor,
        }
    }
}

/// A call-site crossing and its derived predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossingReport {
    pub caller: IsolationReport,
    pub callee: IsolationReport,
    pub exits_isolation: bool,
    pub diagnose: IsolationReport,
}

impl From<&IsolationCrossing> for CrossingReport {
    fn from(crossing: &IsolationCrossing) -> Self {
        Self {
            caller: crossing.caller().into(),
            callee: crossing.callee().into(),
            exits_isolation: crossing.exits_isolation(),
            diagnose: crossing.diagnose_isolation().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use isola_types::{NominalDeclId, Type};

    use super::*;

    #[test]
    fn global_actor_report_renders_its_type() {
        let isolation = ActorIsolation::global_actor(Type::nominal(NominalDeclId(0), "MainActor"))
            .with_preconcurrency(true);
        let json = serde_json::to_string(&IsolationReport::from(&isolation)).unwrap();
        assert_snapshot!(json, @r#"{"isolation":"global_actor","actor_isolated":true,"nonisolated":false,"degraded":false,"preconcurrency":true,"global_actor":"MainActor"}"#);
    }

    #[test]
    fn degraded_report_omits_the_global_actor() {
        let isolation = ActorIsolation::for_textual("global_actor_unsafe").unwrap();
        let report = IsolationReport::from(&isolation);
        assert_eq!(report.isolation, "global_actor");
        assert!(report.degraded);
        assert_eq!(report.global_actor, None);
    }

    #[test]
    fn crossing_report_names_the_diagnosed_side() {
        let crossing = IsolationCrossing::new(
            ActorIsolation::unspecified(),
            ActorIsolation::nonisolated(false),
        );
        let json = serde_json::to_string(&CrossingReport::from(&crossing)).unwrap();
        assert_snapshot!(json, @r#"{"caller":{"isolation":"unspecified","actor_isolated":false,"nonisolated":false,"degraded":false,"preconcurrency":false},"callee":{"isolation":"nonisolated","actor_isolated":false,"nonisolated":true,"degraded":false,"preconcurrency":false},"exits_isolation":true,"diagnose":{"isolation":"unspecified","actor_isolated":false,"nonisolated":false,"degraded":false,"preconcurrency":false}}"#);
    }
}
