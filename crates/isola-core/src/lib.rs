//! Actor isolation for a statically checked concurrent language.
//!
//! Every declaration and lexical scope carries an [`ActorIsolation`] stating
//! which concurrency domain may access it. This crate implements:
//! - the isolation value itself, one variant per kind carrying exactly the
//!   payload that kind needs
//! - equality, hashing, printing and textual decoding over isolation values
//! - substitution of global-actor types under generic instantiation
//! - the caller/callee crossing recorded at each call site
//! - the query surface the isolation inference collaborator is consumed through
//!
//! Nothing here decides *why* a declaration is isolated; the inference pass
//! computes isolation and records it in an [`context::IsolationTable`].

pub mod cache;
pub mod config;
pub mod context;
pub mod crossing;
pub mod report;
pub mod subst;
pub mod textual;

use std::fmt;
use std::hash::{Hash, Hasher};

use isola_ast::{DeclArena, ExprId, ValueDeclId};
use isola_types::{NominalDeclId, Type};

pub use cache::SubstCache;
pub use config::{IsolationConfig, TopLevelIsolation};
pub use context::{
    ClosureIsolationLookup, CommittedClosures, IsolationQueries, IsolationTable,
    SpeculativeClosures,
};
pub use crossing::IsolationCrossing;
pub use textual::{UnknownIsolationKeyword, parse_isolation_at};

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The five isolation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IsolationKind {
    /// Nothing is known. Assumed unsafe to touch from any actor.
    Unspecified,
    /// Isolated to one instance of an actor.
    ActorInstance,
    /// Usable from any actor, but cannot see actor-isolated state.
    Nonisolated,
    /// Like `Nonisolated`, but the checker does not enforce it.
    NonisolatedUnsafe,
    /// Isolated to a global actor type shared by everything annotated with it.
    GlobalActor,
}

impl IsolationKind {
    pub const ALL: [IsolationKind; 5] = [
        IsolationKind::Unspecified,
        IsolationKind::ActorInstance,
        IsolationKind::Nonisolated,
        IsolationKind::NonisolatedUnsafe,
        IsolationKind::GlobalActor,
    ];

    /// Canonical textual keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            IsolationKind::Unspecified => "unspecified",
            IsolationKind::ActorInstance => "actor_instance",
            IsolationKind::Nonisolated => "nonisolated",
            IsolationKind::NonisolatedUnsafe => "nonisolated_unsafe",
            IsolationKind::GlobalActor => "global_actor",
        }
    }

    pub fn is_actor_isolated(self) -> bool {
        match self {
            IsolationKind::ActorInstance | IsolationKind::GlobalActor => true,
            IsolationKind::Unspecified
            | IsolationKind::Nonisolated
            | IsolationKind::NonisolatedUnsafe => false,
        }
    }

    pub fn is_nonisolated(self) -> bool {
        match self {
            IsolationKind::Nonisolated | IsolationKind::NonisolatedUnsafe => true,
            IsolationKind::Unspecified
            | IsolationKind::ActorInstance
            | IsolationKind::GlobalActor => false,
        }
    }
}

impl fmt::Display for IsolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// The entity an actor-instance isolation is anchored to.
///
/// Handles compare by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRef {
    /// The actor type itself; `self` inside its members.
    Nominal(NominalDeclId),
    /// A captured variable or `isolated` parameter declaration.
    Capture(ValueDeclId),
    /// A captured expression.
    Expr(ExprId),
}

impl From<NominalDeclId> for ActorRef {
    fn from(id: NominalDeclId) -> Self {
        ActorRef::Nominal(id)
    }
}

impl From<ValueDeclId> for ActorRef {
    fn from(id: ValueDeclId) -> Self {
        ActorRef::Capture(id)
    }
}

impl From<ExprId> for ActorRef {
    fn from(id: ExprId) -> Self {
        ActorRef::Expr(id)
    }
}

/// Which parameter carries the isolated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IsolatedParam {
    /// The receiver (`self`), or a capture standing in for it.
    Receiver,
    /// Declared parameter at this zero-based position.
    Positional(u32),
}

impl IsolatedParam {
    /// Legacy numbering: `0` is the receiver, `n + 1` is parameter `n`.
    pub fn encoded(self) -> u64 {
        match self {
            IsolatedParam::Receiver => 0,
            IsolatedParam::Positional(index) => u64::from(index) + 1,
        }
    }

    /// Inverse of [`IsolatedParam::encoded`].
    pub fn from_encoded(encoded: u64) -> Option<Self> {
        match encoded {
            0 => Some(IsolatedParam::Receiver),
            n => u32::try_from(n - 1).ok().map(IsolatedParam::Positional),
        }
    }
}

/// Kind plus payload.
///
/// `None` payloads occur only in values decoded from text, where the actor
/// cannot be recovered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Isolation {
    Unspecified,
    ActorInstance {
        actor: Option<ActorRef>,
        param: IsolatedParam,
    },
    Nonisolated,
    NonisolatedUnsafe,
    GlobalActor {
        actor: Option<Type>,
    },
}

impl Isolation {
    pub fn kind(&self) -> IsolationKind {
        match self {
            Isolation::Unspecified => IsolationKind::Unspecified,
            Isolation::ActorInstance { .. } => IsolationKind::ActorInstance,
            Isolation::Nonisolated => IsolationKind::Nonisolated,
            Isolation::NonisolatedUnsafe => IsolationKind::NonisolatedUnsafe,
            Isolation::GlobalActor { .. } => IsolationKind::GlobalActor,
        }
    }
}

// ---------------------------------------------------------------------------
// Isolation value
// ---------------------------------------------------------------------------

/// The actor isolation of a declaration or scope.
///
/// Equality and hashing consider the kind and payload only; whether the value
/// was established under preconcurrency rules, or decoded from text, is
/// provenance and does not distinguish two isolations.
#[derive(Debug, Clone)]
pub struct ActorIsolation {
    isolation: Isolation,
    preconcurrency: bool,
    degraded: bool,
}

impl ActorIsolation {
    fn from_isolation(isolation: Isolation) -> Self {
        Self {
            isolation,
            preconcurrency: false,
            degraded: false,
        }
    }

    pub fn unspecified() -> Self {
        Self::from_isolation(Isolation::Unspecified)
    }

    pub fn nonisolated(unsafe_: bool) -> Self {
        Self::from_isolation(if unsafe_ {
            Isolation::NonisolatedUnsafe
        } else {
            Isolation::Nonisolated
        })
    }

    /// Isolation of a member accessed through `self` of the given actor.
    pub fn actor_instance_self(actor: NominalDeclId) -> Self {
        Self::from_isolation(Isolation::ActorInstance {
            actor: Some(ActorRef::Nominal(actor)),
            param: IsolatedParam::Receiver,
        })
    }

    /// Isolation to the actor passed as declared parameter `index`.
    pub fn actor_instance_parameter(actor: impl Into<ActorRef>, index: u32) -> Self {
        Self::from_isolation(Isolation::ActorInstance {
            actor: Some(actor.into()),
            param: IsolatedParam::Positional(index),
        })
    }

    /// Isolation to an actor captured by a closure.
    pub fn actor_instance_capture(captured: ValueDeclId) -> Self {
        Self::from_isolation(Isolation::ActorInstance {
            actor: Some(ActorRef::Capture(captured)),
            param: IsolatedParam::Receiver,
        })
    }

    pub fn global_actor(actor: Type) -> Self {
        Self::from_isolation(Isolation::GlobalActor { actor: Some(actor) })
    }

    /// A payload-free value of the given kind, as recovered from text.
    pub(crate) fn degraded(kind: IsolationKind) -> Self {
        let isolation = match kind {
            IsolationKind::Unspecified => Isolation::Unspecified,
            IsolationKind::ActorInstance => Isolation::ActorInstance {
                actor: None,
                param: IsolatedParam::Receiver,
            },
            IsolationKind::Nonisolated => Isolation::Nonisolated,
            IsolationKind::NonisolatedUnsafe => Isolation::NonisolatedUnsafe,
            IsolationKind::GlobalActor => Isolation::GlobalActor { actor: None },
        };
        Self {
            isolation,
            preconcurrency: false,
            degraded: true,
        }
    }

    pub fn kind(&self) -> IsolationKind {
        self.isolation.kind()
    }

    /// Kind and payload, for exhaustive matching.
    pub fn isolation(&self) -> &Isolation {
        &self.isolation
    }

    pub fn is_unspecified(&self) -> bool {
        self.kind() == IsolationKind::Unspecified
    }

    pub fn is_nonisolated(&self) -> bool {
        self.kind().is_nonisolated()
    }

    pub fn is_actor_isolated(&self) -> bool {
        self.kind().is_actor_isolated()
    }

    pub fn is_global_actor(&self) -> bool {
        self.kind() == IsolationKind::GlobalActor
    }

    /// Whether this isolation was established under preconcurrency rules.
    pub fn preconcurrency(&self) -> bool {
        self.preconcurrency
    }

    /// Whether this value was decoded from text and lacks its payload.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Copy with the preconcurrency flag replaced.
    pub fn with_preconcurrency(&self, value: bool) -> Self {
        Self {
            preconcurrency: value,
            ..self.clone()
        }
    }

    // -- Payload accessors. Calling one on the wrong kind is a bug in the caller.

    /// The parameter carrying the isolated actor.
    ///
    /// # Panics
    /// If this is not an actor-instance isolation.
    pub fn isolated_param(&self) -> IsolatedParam {
        match &self.isolation {
            Isolation::ActorInstance { param, .. } => *param,
            Isolation::Unspecified
            | Isolation::Nonisolated
            | Isolation::NonisolatedUnsafe
            | Isolation::GlobalActor { .. } => self.wrong_kind("isolated_param"),
        }
    }

    /// The anchor of an actor-instance isolation; `None` when degraded.
    ///
    /// # Panics
    /// If this is not an actor-instance isolation.
    pub fn actor_ref(&self) -> Option<ActorRef> {
        match &self.isolation {
            Isolation::ActorInstance { actor, .. } => *actor,
            Isolation::Unspecified
            | Isolation::Nonisolated
            | Isolation::NonisolatedUnsafe
            | Isolation::GlobalActor { .. } => self.wrong_kind("actor_ref"),
        }
    }

    /// The captured variable, if the anchor is one.
    ///
    /// # Panics
    /// If this is not an actor-instance isolation.
    pub fn captured_var(&self) -> Option<ValueDeclId> {
        match self.actor_ref() {
            Some(ActorRef::Capture(var)) => Some(var),
            Some(ActorRef::Nominal(_) | ActorRef::Expr(_)) | None => None,
        }
    }

    /// The captured expression, if the anchor is one.
    ///
    /// # Panics
    /// If this is not an actor-instance isolation.
    pub fn captured_expr(&self) -> Option<ExprId> {
        match self.actor_ref() {
            Some(ActorRef::Expr(expr)) => Some(expr),
            Some(ActorRef::Nominal(_) | ActorRef::Capture(_)) | None => None,
        }
    }

    /// The global actor type. `None` means the type is unavailable because
    /// the value was decoded from text.
    ///
    /// # Panics
    /// If this is not a global-actor isolation.
    pub fn global_actor_type(&self) -> Option<&Type> {
        match &self.isolation {
            Isolation::GlobalActor { actor } => actor.as_ref(),
            Isolation::Unspecified
            | Isolation::ActorInstance { .. }
            | Isolation::Nonisolated
            | Isolation::NonisolatedUnsafe => self.wrong_kind("global_actor_type"),
        }
    }

    /// The actor type behind an actor-instance or global-actor isolation.
    ///
    /// Captures and expressions are resolved through their declared type.
    ///
    /// # Panics
    /// If this isolation is not actor-isolated.
    pub fn actor(&self, decls: &DeclArena) -> Option<NominalDeclId> {
        match &self.isolation {
            Isolation::ActorInstance { actor, .. } => match (*actor)? {
                ActorRef::Nominal(id) => Some(id),
                ActorRef::Capture(var) => decls.value(var).ty.nominal_decl(),
                ActorRef::Expr(expr) => decls.expr(expr).ty.nominal_decl(),
            },
            Isolation::GlobalActor { actor } => actor.as_ref()?.nominal_decl(),
            Isolation::Unspecified | Isolation::Nonisolated | Isolation::NonisolatedUnsafe => {
                self.wrong_kind("actor")
            }
        }
    }

    /// Whether this is isolation to the main actor.
    pub fn is_main_actor(&self, decls: &DeclArena) -> bool {
        self.is_global_actor()
            && self
                .actor(decls)
                .is_some_and(|id| decls.nominal(id).is_main_actor())
    }

    /// Whether this isolation resolves to a distributed actor.
    pub fn is_distributed_actor(&self, decls: &DeclArena) -> bool {
        self.is_actor_isolated()
            && self
                .actor(decls)
                .is_some_and(|id| decls.nominal(id).is_distributed_actor())
    }

    fn wrong_kind(&self, accessor: &str) -> ! {
        panic!("{accessor}() called on {} isolation", self.kind())
    }
}

impl Default for ActorIsolation {
    fn default() -> Self {
        Self::unspecified()
    }
}

impl PartialEq for ActorIsolation {
    fn eq(&self, other: &Self) -> bool {
        self.isolation == other.isolation
    }
}

impl Eq for ActorIsolation {}

impl Hash for ActorIsolation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.isolation.hash(state);
    }
}

impl fmt::Display for ActorIsolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind(), f)
    }
}


#[cfg(test)]
mod prop_tests;
