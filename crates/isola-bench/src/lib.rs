//! Workloads shared by the isolation benchmarks.

use isola_ast::{
    DeclArena, DeclContext, FunctionKind, MAIN_ACTOR_NAME, NominalDecl, NominalKind, ValueDecl,
    ValueDeclId, ValueDeclKind,
};
use isola_core::{ActorIsolation, IsolationTable};
use isola_types::{FunctionType, NominalDeclId, Substitution, Type, TypeVarId};

pub const KEYWORDS: [&str; 6] = [
    "unspecified",
    "actor_instance",
    "nonisolated",
    "nonisolated_unsafe",
    "global_actor",
    "global_actor_unsafe",
];

/// A declaration arena with a main actor, one generic global actor and a
/// family of actor types, plus `size` isolation values drawn from them.
pub struct Workload {
    pub decls: DeclArena,
    pub values: Vec<ActorIsolation>,
    pub functions: Vec<ValueDeclId>,
    pub subs: Substitution,
}

impl Workload {
    pub fn new(size: usize) -> Self {
        let mut decls = DeclArena::new();
        let main = decls.add_nominal(NominalDecl::new(MAIN_ACTOR_NAME, NominalKind::GlobalActor));
        let pool = decls.add_nominal(
            NominalDecl::new("Pool", NominalKind::GlobalActor)
                .with_generic_params(vec![TypeVarId(0)]),
        );
        let actors: Vec<NominalDeclId> = (0..8)
            .map(|i| decls.add_nominal(NominalDecl::new(format!("Worker{i}"), NominalKind::Actor)))
            .collect();

        let mut values = Vec::with_capacity(size);
        let mut functions = Vec::with_capacity(size);
        for i in 0..size {
            let actor = actors[i % actors.len()];
            let isolation = match i % 5 {
                0 => ActorIsolation::unspecified(),
                1 => ActorIsolation::actor_instance_self(actor),
                2 => ActorIsolation::nonisolated(i % 2 == 0),
                3 => ActorIsolation::global_actor(decls.declared_type(main)),
                _ => ActorIsolation::global_actor(decls.declared_type(pool))
                    .with_preconcurrency(i % 3 == 0),
            };
            let function = decls.add_value(ValueDecl {
                name: format!("f{i}"),
                kind: ValueDeclKind::Function(FunctionKind::Plain),
                ty: Type::Function(FunctionType::asynchronous(vec![], Type::Unit)),
                parent: DeclContext::Nominal(actor),
            });
            values.push(isolation);
            functions.push(function);
        }

        let subs = [(TypeVarId(0), Type::Int)].into_iter().collect();
        Self {
            decls,
            values,
            functions,
            subs,
        }
    }

    /// Commits every value to the declaration created alongside it.
    pub fn table(&self) -> IsolationTable<'_> {
        let mut table = IsolationTable::new(&self.decls);
        for (function, isolation) in self.functions.iter().zip(&self.values) {
            table.record_decl(*function, isolation.clone());
        }
        table
    }
}
