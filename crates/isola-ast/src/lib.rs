//! Declarations and declaration contexts for isolation analysis.
//!
//! Isolation payloads refer to declarations and expressions by handle. The
//! handles index into a [`DeclArena`] owned by the compilation session, so two
//! handles denote the same entity iff they are equal.

use isola_types::{NominalDeclId, Type, TypeVarId};

/// Name of the global actor that owns the main thread.
pub const MAIN_ACTOR_NAME: &str = "MainActor";

/// Identifies a source file in the compilation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// Handle to a value declaration: a variable, parameter or function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueDeclId(pub u32);

/// Handle to an expression captured as an isolation anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

/// Handle to a closure expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClosureId(pub u32);

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

/// What sort of nominal type a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalKind {
    Actor,
    DistributedActor,
    /// A type usable as a global actor annotation.
    GlobalActor,
    Class,
    Struct,
    Enum,
}

/// A nominal type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NominalDecl {
    pub name: String,
    pub kind: NominalKind,
    pub generic_params: Vec<TypeVarId>,
}

impl NominalDecl {
    pub fn new(name: impl Into<String>, kind: NominalKind) -> Self {
        Self {
            name: name.into(),
            kind,
            generic_params: Vec::new(),
        }
    }

    pub fn with_generic_params(mut self, params: Vec<TypeVarId>) -> Self {
        self.generic_params = params;
        self
    }

    /// Actors and distributed actors have per-instance isolated state.
    pub fn is_any_actor(&self) -> bool {
        matches!(self.kind, NominalKind::Actor | NominalKind::DistributedActor)
    }

    pub fn is_distributed_actor(&self) -> bool {
        self.kind == NominalKind::DistributedActor
    }

    pub fn is_main_actor(&self) -> bool {
        self.kind == NominalKind::GlobalActor && self.name == MAIN_ACTOR_NAME
    }

    pub fn is_generic(&self) -> bool {
        !self.generic_params.is_empty()
    }
}

/// Shape of a function declaration, as far as isolation cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Plain,
    /// Initializer that fully initializes `self` itself.
    DesignatedInit,
    /// Initializer that delegates to another initializer.
    ConvenienceInit,
    Deinit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDeclKind {
    Var,
    Let,
    Param,
    Function(FunctionKind),
}

/// A value declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDecl {
    pub name: String,
    pub kind: ValueDeclKind,
    /// Interface type; for functions, the function type.
    pub ty: Type,
    pub parent: DeclContext,
}

/// An expression that anchors actor-instance isolation, e.g. the argument of
/// an `isolated` parameter at a call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedExpr {
    pub ty: Type,
    pub parent: DeclContext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureExpr {
    pub parent: DeclContext,
}

// ---------------------------------------------------------------------------
// Declaration contexts
// ---------------------------------------------------------------------------

/// A lexical scope whose isolation can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclContext {
    Module,
    TopLevelCode(FileId),
    Nominal(NominalDeclId),
    /// Body of a function, or the accessor scope of a variable.
    Value(ValueDeclId),
    Closure(ClosureId),
    /// Initial-value expression of a stored variable.
    Initializer(ValueDeclId),
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Owns every declaration referenced from isolation payloads.
///
/// Handles are plain indices; passing a handle from another arena is a
/// programming error and panics on lookup.
#[derive(Debug, Clone, Default)]
pub struct DeclArena {
    nominals: Vec<NominalDecl>,
    values: Vec<ValueDecl>,
    exprs: Vec<CapturedExpr>,
    closures: Vec<ClosureExpr>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_nominal(&mut self, decl: NominalDecl) -> NominalDeclId {
        let id = NominalDeclId(next_index(self.nominals.len()));
        self.nominals.push(decl);
        id
    }

    pub fn add_value(&mut self, decl: ValueDecl) -> ValueDeclId {
        let id = ValueDeclId(next_index(self.values.len()));
        self.values.push(decl);
        id
    }

    pub fn add_expr(&mut self, expr: CapturedExpr) -> ExprId {
        let id = ExprId(next_index(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    pub fn add_closure(&mut self, closure: ClosureExpr) -> ClosureId {
        let id = ClosureId(next_index(self.closures.len()));
        self.closures.push(closure);
        id
    }

    pub fn nominal(&self, id: NominalDeclId) -> &NominalDecl {
        &self.nominals[id.0 as usize]
    }

    pub fn value(&self, id: ValueDeclId) -> &ValueDecl {
        &self.values[id.0 as usize]
    }

    pub fn expr(&self, id: ExprId) -> &CapturedExpr {
        &self.exprs[id.0 as usize]
    }

    pub fn closure(&self, id: ClosureId) -> &ClosureExpr {
        &self.closures[id.0 as usize]
    }

    /// The declared type of a nominal, with its own generic parameters as
    /// arguments.
    pub fn declared_type(&self, id: NominalDeclId) -> Type {
        let decl = self.nominal(id);
        Type::generic(
            id,
            decl.name.clone(),
            decl.generic_params.iter().copied().map(Type::Var).collect(),
        )
    }

    /// The main actor, if this session declares one.
    pub fn main_actor(&self) -> Option<NominalDeclId> {
        self.nominals
            .iter()
            .position(NominalDecl::is_main_actor)
            .map(|idx| NominalDeclId(idx as u32))
    }

    /// The enclosing context of `context`, or `None` at the module root.
    pub fn parent(&self, context: DeclContext) -> Option<DeclContext> {
        match context {
            DeclContext::Module => None,
            DeclContext::TopLevelCode(_) | DeclContext::Nominal(_) => Some(DeclContext::Module),
            DeclContext::Value(id) | DeclContext::Initializer(id) => Some(self.value(id).parent),
            DeclContext::Closure(id) => Some(self.closure(id).parent),
        }
    }

    /// The nominal type that `self` refers to inside `context`, if any.
    pub fn self_nominal(&self, context: DeclContext) -> Option<NominalDeclId> {
        let mut current = Some(context);
        while let Some(ctx) = current {
            if let DeclContext::Nominal(id) = ctx {
                return Some(id);
            }
            current = self.parent(ctx);
        }
        None
    }
}

fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("declaration arena overflow at {len} entries"))
}
