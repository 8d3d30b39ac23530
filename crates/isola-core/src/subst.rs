//! Reinterpreting isolation under a generic instantiation.
//!
//! Which actor a declaration is isolated to can depend on a type parameter of
//! the enclosing generic definition, so each instantiation site substitutes
//! into the isolation before using it.

use isola_ast::DeclArena;
use isola_types::{Substitution, Type};
use tracing::trace;

use crate::{ActorIsolation, ActorRef, Isolation};

impl ActorIsolation {
    /// Whether [`ActorIsolation::subst`] can change this value's meaning.
    ///
    /// True for a global actor written in terms of type parameters, and for
    /// actor-instance isolation whose actor type is generic.
    pub fn requires_substitution(&self, decls: &DeclArena) -> bool {
        match &self.isolation {
            Isolation::Unspecified | Isolation::Nonisolated | Isolation::NonisolatedUnsafe => false,
            Isolation::ActorInstance { actor, .. } => match actor {
                Some(ActorRef::Nominal(id)) => decls.nominal(*id).is_generic(),
                Some(ActorRef::Capture(var)) => decls.value(*var).ty.has_type_params(),
                Some(ActorRef::Expr(expr)) => decls.expr(*expr).ty.has_type_params(),
                None => false,
            },
            Isolation::GlobalActor { actor } => actor.as_ref().is_some_and(Type::has_type_params),
        }
    }

    /// Substitute into the types within this isolation.
    ///
    /// Only a global actor carries a type. Actor-instance payloads are
    /// declaration identities and stay as they are; degraded values have
    /// nothing to substitute.
    pub fn subst(&self, subs: &Substitution) -> ActorIsolation {
        match &self.isolation {
            Isolation::GlobalActor { actor: Some(ty) } => {
                let substituted = subs.apply(ty);
                trace!(from = %ty, to = %substituted, "substituted global actor");
                ActorIsolation::global_actor(substituted).with_preconcurrency(self.preconcurrency)
            }
            Isolation::GlobalActor { actor: None }
            | Isolation::Unspecified
            | Isolation::ActorInstance { .. }
            | Isolation::Nonisolated
            | Isolation::NonisolatedUnsafe => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use isola_ast::{CapturedExpr, DeclContext, NominalDecl, NominalKind, ValueDecl, ValueDeclKind};
    use isola_types::{NominalDeclId, TypeVarId};

    use super::*;

    struct Fixture {
        decls: DeclArena,
        main: NominalDeclId,
        pool: NominalDeclId,
        counter: NominalDeclId,
    }

    fn fixture() -> Fixture {
        let mut decls = DeclArena::new();
        let main = decls.add_nominal(NominalDecl::new("MainActor", NominalKind::GlobalActor));
        let pool = decls.add_nominal(
            NominalDecl::new("Pool", NominalKind::Actor).with_generic_params(vec![TypeVarId(0)]),
        );
        let counter = decls.add_nominal(NominalDecl::new("Counter", NominalKind::Actor));
        Fixture {
            decls,
            main,
            pool,
            counter,
        }
    }

    fn t(n: u32) -> Type {
        Type::Var(TypeVarId(n))
    }

    #[test]
    fn global_actor_parameter_is_rewritten() {
        let fx = fixture();
        let mut subs = Substitution::new();
        subs.bind_type(TypeVarId(0), Type::nominal(fx.main, "MainActor"));

        let generic = ActorIsolation::global_actor(t(0));
        assert!(generic.requires_substitution(&fx.decls));

        let concrete = generic.subst(&subs);
        assert_eq!(
            concrete,
            ActorIsolation::global_actor(Type::nominal(fx.main, "MainActor"))
        );
        assert!(!concrete.requires_substitution(&fx.decls));
        assert!(concrete.is_main_actor(&fx.decls));
    }

    #[test]
    fn instantiation_inside_the_generic_itself_is_stable() {
        let identity: Substitution = [(TypeVarId(0), t(0))].into_iter().collect();
        let generic = ActorIsolation::global_actor(t(0));
        assert_eq!(generic.subst(&identity), generic);
    }

    #[test]
    fn bindings_are_replaced_once() {
        let fx = fixture();
        let subs: Substitution = [(TypeVarId(0), t(1)), (TypeVarId(1), Type::Int)]
            .into_iter()
            .collect();

        let substituted = ActorIsolation::global_actor(t(0)).subst(&subs);
        assert_eq!(substituted, ActorIsolation::global_actor(t(1)));
        assert!(substituted.requires_substitution(&fx.decls));
    }

    #[test]
    fn substitution_preserves_preconcurrency() {
        let fx = fixture();
        let subs: Substitution = [(TypeVarId(0), Type::nominal(fx.main, "MainActor"))]
            .into_iter()
            .collect();

        let substituted = ActorIsolation::global_actor(t(0))
            .with_preconcurrency(true)
            .subst(&subs);
        assert!(substituted.preconcurrency());
        assert!(!substituted.is_degraded());
    }

    #[test]
    fn concrete_global_actor_does_not_require_substitution() {
        let fx = fixture();
        let isolation = ActorIsolation::global_actor(Type::nominal(fx.main, "MainActor"));
        assert!(!isolation.requires_substitution(&fx.decls));
    }

    #[test]
    fn actor_instance_requires_substitution_only_for_generic_actors() {
        let mut fx = fixture();
        assert!(ActorIsolation::actor_instance_self(fx.pool).requires_substitution(&fx.decls));
        assert!(!ActorIsolation::actor_instance_self(fx.counter).requires_substitution(&fx.decls));

        let concrete_pool = fx.decls.add_value(ValueDecl {
            name: "pool".to_string(),
            kind: ValueDeclKind::Param,
            ty: Type::generic(fx.pool, "Pool", vec![Type::Int]),
            parent: DeclContext::Module,
        });
        let generic_pool = fx.decls.add_expr(CapturedExpr {
            ty: fx.decls.declared_type(fx.pool),
            parent: DeclContext::Module,
        });
        assert!(
            !ActorIsolation::actor_instance_parameter(concrete_pool, 0)
                .requires_substitution(&fx.decls)
        );
        assert!(
            ActorIsolation::actor_instance_parameter(generic_pool, 1)
                .requires_substitution(&fx.decls)
        );
    }

    #[test]
    fn actor_instance_is_unchanged_by_substitution() {
        let fx = fixture();
        let subs: Substitution = [(TypeVarId(0), Type::Int)].into_iter().collect();
        let isolation = ActorIsolation::actor_instance_self(fx.pool);
        let substituted = isolation.subst(&subs);
        assert_eq!(substituted, isolation);
        assert_eq!(substituted.actor_ref(), Some(ActorRef::Nominal(fx.pool)));
    }

    #[test]
    fn degraded_global_actor_is_unchanged_by_substitution() {
        let fx = fixture();
        let subs: Substitution = [(TypeVarId(0), Type::Int)].into_iter().collect();
        let degraded = ActorIsolation::for_textual("global_actor").unwrap();
        assert!(!degraded.requires_substitution(&fx.decls));

        let substituted = degraded.subst(&subs);
        assert!(substituted.is_degraded());
        assert_eq!(substituted.global_actor_type(), None);
    }
}
