//! Isolation crossings at call sites.

use crate::ActorIsolation;

/// Caller and callee isolation recorded for one call.
///
/// Lowering uses it to insert hops into the callee's actor; diagnostics use
/// it when non-sendable values are passed across isolation domains.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IsolationCrossing {
    caller: ActorIsolation,
    callee: ActorIsolation,
}

impl IsolationCrossing {
    pub fn new(caller: ActorIsolation, callee: ActorIsolation) -> Self {
        Self { caller, callee }
    }

    pub fn caller(&self) -> &ActorIsolation {
        &self.caller
    }

    pub fn callee(&self) -> &ActorIsolation {
        &self.callee
    }

    /// A call into a callee that is not actor-isolated leaves isolation.
    pub fn exits_isolation(&self) -> bool {
        !self.callee.is_actor_isolated()
    }

    /// The isolation worth naming in a diagnostic about this call.
    ///
    /// Normally the callee's; when the call exits isolation the callee says
    /// nothing useful, so the caller's domain is reported instead.
    pub fn diagnose_isolation(&self) -> &ActorIsolation {
        if self.exits_isolation() {
            &self.caller
        } else {
            &self.callee
        }
    }
}
