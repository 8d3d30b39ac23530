//! Semantic types referenced by actor isolation.
//!
//! Isolation payloads mention types in two places: a global actor is named by
//! a type, and an actor instance is reached through the type of a captured
//! variable or expression. This crate defines those types together with the
//! [`Substitution`] used to instantiate generic definitions.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identifier for a generic type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(pub u32);

/// Identifier for a nominal type declaration (actor, class, struct, ...).
///
/// Two nominal types refer to the same declaration iff their ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NominalDeclId(pub u32);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A semantic type.
///
/// Types are kept canonical by construction, so structural equality is
/// canonical type equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Bool,
    String,
    Unit,
    Never,
    Tuple(Vec<Type>),
    Optional(Box<Type>),
    Function(FunctionType),
    /// Reference to a nominal declaration, possibly applied to generic arguments.
    Nominal(NominalType),
    /// Generic type parameter, replaced during instantiation.
    Var(TypeVarId),
}

/// Function type: `(params) [async] -> ret`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub params: Vec<Type>,
    pub ret: Box<Type>,
    pub is_async: bool,
}

impl FunctionType {
    pub fn sync(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret: Box::new(ret),
            is_async: false,
        }
    }

    pub fn asynchronous(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret: Box::new(ret),
            is_async: true,
        }
    }
}

/// A nominal type: the declaration plus its generic arguments.
///
/// `name` is for display only. Equality and hashing use the declaration
/// and arguments.
#[derive(Debug, Clone)]
pub struct NominalType {
    pub decl: NominalDeclId,
    pub name: String,
    pub args: Vec<Type>,
}

impl PartialEq for NominalType {
    fn eq(&self, other: &Self) -> bool {
        self.decl == other.decl && self.args == other.args
    }
}

impl Eq for NominalType {}

impl Hash for NominalType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.decl.hash(state);
        self.args.hash(state);
    }
}

impl Type {
    /// Non-generic nominal type.
    pub fn nominal(decl: NominalDeclId, name: impl Into<String>) -> Self {
        Type::Nominal(NominalType {
            decl,
            name: name.into(),
            args: Vec::new(),
        })
    }

    /// Nominal type applied to generic arguments.
    pub fn generic(decl: NominalDeclId, name: impl Into<String>, args: Vec<Type>) -> Self {
        Type::Nominal(NominalType {
            decl,
            name: name.into(),
            args,
        })
    }

    /// The nominal declaration this type refers to, looking through optionals.
    pub fn nominal_decl(&self) -> Option<NominalDeclId> {
        match self {
            Type::Nominal(nominal) => Some(nominal.decl),
            Type::Optional(inner) => inner.nominal_decl(),
            _ => None,
        }
    }

    /// Whether any generic parameter occurs in this type.
    pub fn has_type_params(&self) -> bool {
        match self {
            Type::Var(_) => true,
            Type::Int
            | Type::Float
            | Type::Bool
            | Type::String
            | Type::Unit
            | Type::Never => false,
            Type::Tuple(elems) => elems.iter().any(Type::has_type_params),
            Type::Optional(inner) => inner.has_type_params(),
            Type::Function(ft) => {
                ft.params.iter().any(Type::has_type_params) || ft.ret.has_type_params()
            }
            Type::Nominal(nominal) => nominal.args.iter().any(Type::has_type_params),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "Int"),
            Type::Float => write!(f, "Float"),
            Type::Bool => write!(f, "Bool"),
            Type::String => write!(f, "String"),
            Type::Unit => write!(f, "()"),
            Type::Never => write!(f, "Never"),
            Type::Tuple(elems) => {
                write!(f, "(")?;
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            Type::Optional(inner) => write!(f, "{inner}?"),
            Type::Function(ft) => {
                write!(f, "(")?;
                for (i, p) in ft.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                if ft.is_async {
                    write!(f, ") async -> {}", ft.ret)
                } else {
                    write!(f, ") -> {}", ft.ret)
                }
            }
            Type::Nominal(nominal) => {
                write!(f, "{}", nominal.name)?;
                if !nominal.args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in nominal.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            Type::Var(id) => write!(f, "t{}", id.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Free variable computation
// ---------------------------------------------------------------------------

/// Collect all generic parameters occurring in a type.
pub fn free_type_vars(ty: &Type) -> BTreeSet<TypeVarId> {
    let mut vars = BTreeSet::new();
    collect_free_type_vars(ty, &mut vars);
    vars
}

fn collect_free_type_vars(ty: &Type, vars: &mut BTreeSet<TypeVarId>) {
    match ty {
        Type::Var(v) => {
            vars.insert(*v);
        }
        Type::Tuple(elems) => {
            for t in elems {
                collect_free_type_vars(t, vars);
            }
        }
        Type::Optional(inner) => collect_free_type_vars(inner, vars),
        Type::Function(ft) => {
            for t in &ft.params {
                collect_free_type_vars(t, vars);
            }
            collect_free_type_vars(&ft.ret, vars);
        }
        Type::Nominal(nominal) => {
            for arg in &nominal.args {
                collect_free_type_vars(arg, vars);
            }
        }
        Type::Int | Type::Float | Type::Bool | Type::String | Type::Unit | Type::Never => {}
    }
}

// ---------------------------------------------------------------------------
// Substitution
// ---------------------------------------------------------------------------

/// Maps generic parameters to the types they are instantiated with.
///
/// Built by the instantiation engine for one use site and applied to every
/// type that was written inside the generic definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    type_map: BTreeMap<TypeVarId, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_type(&mut self, var: TypeVarId, ty: Type) {
        self.type_map.insert(var, ty);
    }

    pub fn lookup_type(&self, var: TypeVarId) -> Option<&Type> {
        self.type_map.get(&var)
    }

    pub fn type_bindings(&self) -> &BTreeMap<TypeVarId, Type> {
        &self.type_map
    }

    pub fn is_empty(&self) -> bool {
        self.type_map.is_empty()
    }

    /// Apply this substitution to a type, replacing all bound parameters.
    ///
    /// Replacement is simultaneous: a bound type is inserted as written and
    /// never substituted again.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Var(v) => match self.lookup_type(*v) {
                Some(resolved) => resolved.clone(),
                None => ty.clone(),
            },
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|t| self.apply(t)).collect()),
            Type::Optional(inner) => Type::Optional(Box::new(self.apply(inner))),
            Type::Function(ft) => Type::Function(FunctionType {
                params: ft.params.iter().map(|t| self.apply(t)).collect(),
                ret: Box::new(self.apply(&ft.ret)),
                is_async: ft.is_async,
            }),
            Type::Nominal(nominal) => Type::Nominal(NominalType {
                decl: nominal.decl,
                name: nominal.name.clone(),
                args: nominal.args.iter().map(|arg| self.apply(arg)).collect(),
            }),
            Type::Int | Type::Float | Type::Bool | Type::String | Type::Unit | Type::Never => {
                ty.clone()
            }
        }
    }
}

impl FromIterator<(TypeVarId, Type)> for Substitution {
    fn from_iter<I: IntoIterator<Item = (TypeVarId, Type)>>(iter: I) -> Self {
        Self {
            type_map: iter.into_iter().collect(),
        }
    }
}
