//! Querying the isolation of declarations and scopes.
//!
//! The inference pass computes isolation and commits it to an
//! [`IsolationTable`]; everything downstream reads it back through
//! [`IsolationQueries`]. Closure isolation is always obtained through an
//! explicit [`ClosureIsolationLookup`], so analyses that must not touch
//! committed state (code completion, what-if exploration) can supply their
//! own answers via [`SpeculativeClosures`].

use std::collections::HashMap;

use isola_ast::{ClosureId, DeclArena, DeclContext, FunctionKind, ValueDeclId, ValueDeclKind};
use tracing::{debug, trace};

use crate::config::{IsolationConfig, TopLevelIsolation};
use crate::{ActorIsolation, IsolationKind};

// ---------------------------------------------------------------------------
// Closure lookup capability
// ---------------------------------------------------------------------------

/// Maps a closure to its isolation.
pub trait ClosureIsolationLookup {
    fn closure_isolation(&self, closure: ClosureId) -> ActorIsolation;
}

impl<F> ClosureIsolationLookup for F
where
    F: Fn(ClosureId) -> ActorIsolation,
{
    fn closure_isolation(&self, closure: ClosureId) -> ActorIsolation {
        self(closure)
    }
}

/// Closure isolation already committed by the inference pass.
#[derive(Debug, Clone, Default)]
pub struct CommittedClosures {
    entries: HashMap<ClosureId, ActorIsolation>,
}

impl ClosureIsolationLookup for CommittedClosures {
    fn closure_isolation(&self, closure: ClosureId) -> ActorIsolation {
        self.entries.get(&closure).cloned().unwrap_or_default()
    }
}

/// Overlay of not-yet-committed closure isolation on top of another lookup.
pub struct SpeculativeClosures<'a> {
    overrides: HashMap<ClosureId, ActorIsolation>,
    fallback: &'a dyn ClosureIsolationLookup,
}

impl<'a> SpeculativeClosures<'a> {
    pub fn new(fallback: &'a dyn ClosureIsolationLookup) -> Self {
        Self {
            overrides: HashMap::new(),
            fallback,
        }
    }

    pub fn assume(&mut self, closure: ClosureId, isolation: ActorIsolation) {
        self.overrides.insert(closure, isolation);
    }

    pub fn with(mut self, closure: ClosureId, isolation: ActorIsolation) -> Self {
        self.assume(closure, isolation);
        self
    }
}

impl ClosureIsolationLookup for SpeculativeClosures<'_> {
    fn closure_isolation(&self, closure: ClosureId) -> ActorIsolation {
        match self.overrides.get(&closure) {
            Some(isolation) => isolation.clone(),
            None => self.fallback.closure_isolation(closure),
        }
    }
}

// ---------------------------------------------------------------------------
// Query surface
// ---------------------------------------------------------------------------

/// Isolation queries consumed by diagnostics, lowering and flow-sensitive
/// checking.
pub trait IsolationQueries {
    /// Isolation of a declaration. `Unspecified` when nothing is known.
    fn isolation_of(&self, decl: ValueDeclId) -> ActorIsolation;

    /// Lookup over closure isolation that has already been committed.
    fn committed_closures(&self) -> &dyn ClosureIsolationLookup;

    /// Isolation of a lexical scope, resolving closures through `closures`.
    fn isolation_of_context(
        &self,
        context: DeclContext,
        closures: &dyn ClosureIsolationLookup,
    ) -> ActorIsolation;

    /// Whether a function body may observe its isolation change mid-execution.
    fn uses_flow_sensitive_isolation(&self, function: ValueDeclId) -> bool;

    /// Whether `decl` and `context` are isolated to the same actor.
    fn same_actor_isolated(&self, decl: ValueDeclId, context: DeclContext) -> bool {
        let value = self.isolation_of(decl);
        if !value.is_actor_isolated() {
            return false;
        }
        let scope = self.isolation_of_context(context, self.committed_closures());
        value.kind() == scope.kind() && value == scope
    }
}

// ---------------------------------------------------------------------------
// Committed results
// ---------------------------------------------------------------------------

/// Isolation results committed by the inference pass for one session.
#[derive(Debug, Clone)]
pub struct IsolationTable<'a> {
    decls: &'a DeclArena,
    config: IsolationConfig,
    values: HashMap<ValueDeclId, ActorIsolation>,
    closures: CommittedClosures,
}

impl<'a> IsolationTable<'a> {
    pub fn new(decls: &'a DeclArena) -> Self {
        Self::with_config(decls, IsolationConfig::default())
    }

    pub fn with_config(decls: &'a DeclArena, config: IsolationConfig) -> Self {
        Self {
            decls,
            config,
            values: HashMap::new(),
            closures: CommittedClosures::default(),
        }
    }

    /// Commit the isolation of a declaration, returning any previous value.
    pub fn record_decl(
        &mut self,
        decl: ValueDeclId,
        isolation: ActorIsolation,
    ) -> Option<ActorIsolation> {
        trace!(?decl, %isolation, "committing declaration isolation");
        self.values.insert(decl, isolation)
    }

    /// Commit the isolation of a closure, returning any previous value.
    pub fn record_closure(
        &mut self,
        closure: ClosureId,
        isolation: ActorIsolation,
    ) -> Option<ActorIsolation> {
        trace!(?closure, %isolation, "committing closure isolation");
        self.closures.entries.insert(closure, isolation)
    }

    fn top_level_isolation(&self) -> ActorIsolation {
        match self.config.top_level {
            TopLevelIsolation::Unspecified => ActorIsolation::unspecified(),
            TopLevelIsolation::MainActor => match self.decls.main_actor() {
                Some(main) => ActorIsolation::global_actor(self.decls.declared_type(main)),
                None => {
                    debug!("top-level code configured for the main actor, but none is declared");
                    ActorIsolation::unspecified()
                }
            },
        }
    }
}

impl IsolationQueries for IsolationTable<'_> {
    fn isolation_of(&self, decl: ValueDeclId) -> ActorIsolation {
        self.values.get(&decl).cloned().unwrap_or_default()
    }

    fn committed_closures(&self) -> &dyn ClosureIsolationLookup {
        &self.closures
    }

    fn isolation_of_context(
        &self,
        context: DeclContext,
        closures: &dyn ClosureIsolationLookup,
    ) -> ActorIsolation {
        let isolation = match context {
            DeclContext::Value(decl) | DeclContext::Initializer(decl) => self.isolation_of(decl),
            DeclContext::Closure(closure) => closures.closure_isolation(closure),
            DeclContext::TopLevelCode(_) => self.top_level_isolation(),
            DeclContext::Nominal(_) | DeclContext::Module => ActorIsolation::unspecified(),
        };
        trace!(?context, %isolation, "resolved context isolation");
        isolation
    }

    /// Designated initializers and deinitializers of actors start out able
    /// to touch stored properties directly and lose isolation once `self`
    /// escapes. That applies unless they are pinned to a global actor.
    fn uses_flow_sensitive_isolation(&self, function: ValueDeclId) -> bool {
        let decl = self.decls.value(function);
        let kind = match decl.kind {
            ValueDeclKind::Function(kind) => kind,
            ValueDeclKind::Var | ValueDeclKind::Let | ValueDeclKind::Param => return false,
        };
        match kind {
            FunctionKind::DesignatedInit | FunctionKind::Deinit => {}
            FunctionKind::Plain | FunctionKind::ConvenienceInit => return false,
        }

        let Some(self_type) = self.decls.self_nominal(decl.parent) else {
            return false;
        };
        if !self.decls.nominal(self_type).is_any_actor() {
            return false;
        }

        match self.isolation_of(function).kind() {
            IsolationKind::GlobalActor => false,
            IsolationKind::Unspecified
            | IsolationKind::ActorInstance
            | IsolationKind::Nonisolated
            | IsolationKind::NonisolatedUnsafe => true,
        }
    }
}
