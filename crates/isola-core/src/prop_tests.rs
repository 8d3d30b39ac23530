//! Property tests for isolation values using proptest.
//!
//! Key properties:
//!
//! 1. Equal values hash equally, whatever their provenance flags
//! 2. Printing a value and decoding it recovers the kind
//! 3. Substitution only rewrites global actor payloads
//! 4. The substitution cache agrees with direct substitution

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use isola_ast::{ExprId, ValueDeclId};
use isola_types::{NominalDeclId, Substitution, Type, TypeVarId};
use proptest::prelude::*;

use crate::*;

fn hash_of(isolation: &ActorIsolation) -> u64 {
    let mut hasher = DefaultHasher::new();
    isolation.hash(&mut hasher);
    hasher.finish()
}

fn arb_type_var_id() -> impl Strategy<Value = TypeVarId> {
    (0u32..4).prop_map(TypeVarId)
}

fn arb_actor_type() -> BoxedStrategy<Type> {
    prop_oneof![
        3 => (0u32..4).prop_map(|id| Type::nominal(NominalDeclId(id), format!("Actor{id}"))),
        2 => arb_type_var_id().prop_map(Type::Var),
        1 => (0u32..4, arb_type_var_id()).prop_map(|(id, var)| {
            Type::generic(NominalDeclId(id), format!("Actor{id}"), vec![Type::Var(var)])
        }),
    ]
    .boxed()
}

fn arb_actor_ref() -> impl Strategy<Value = ActorRef> {
    prop_oneof![
        (0u32..4).prop_map(|id| ActorRef::Nominal(NominalDeclId(id))),
        (0u32..4).prop_map(|id| ActorRef::Capture(ValueDeclId(id))),
        (0u32..4).prop_map(|id| ActorRef::Expr(ExprId(id))),
    ]
}

fn arb_isolation() -> impl Strategy<Value = ActorIsolation> {
    let base = prop_oneof![
        Just(ActorIsolation::unspecified()),
        any::<bool>().prop_map(ActorIsolation::nonisolated),
        (0u32..4).prop_map(|id| ActorIsolation::actor_instance_self(NominalDeclId(id))),
        (arb_actor_ref(), 0u32..3)
            .prop_map(|(actor, index)| ActorIsolation::actor_instance_parameter(actor, index)),
        (0u32..4).prop_map(|id| ActorIsolation::actor_instance_capture(ValueDeclId(id))),
        arb_actor_type().prop_map(ActorIsolation::global_actor),
        prop::sample::select(IsolationKind::ALL.to_vec()).prop_map(ActorIsolation::degraded),
    ];
    (base, any::<bool>()).prop_map(|(isolation, pre)| isolation.with_preconcurrency(pre))
}

fn arb_substitution() -> impl Strategy<Value = Substitution> {
    prop::collection::vec((arb_type_var_id(), arb_actor_type()), 0..4)
        .prop_map(|bindings| bindings.into_iter().collect())
}

proptest! {
    /// Equality implies equal hashes, including across generated pairs.
    #[test]
    fn equal_values_hash_equally(a in arb_isolation(), b in arb_isolation()) {
        if a == b {
            prop_assert_eq!(hash_of(&a), hash_of(&b));
        }
        prop_assert_eq!(a == b, b == a);
    }

    /// Preconcurrency never affects equality or hashing.
    #[test]
    fn preconcurrency_is_provenance(isolation in arb_isolation(), flag in any::<bool>()) {
        let toggled = isolation.with_preconcurrency(flag);
        prop_assert_eq!(&toggled, &isolation);
        prop_assert_eq!(hash_of(&toggled), hash_of(&isolation));
        prop_assert_eq!(toggled.preconcurrency(), flag);
        prop_assert_eq!(toggled.is_degraded(), isolation.is_degraded());
    }

    /// Printed keywords decode back to the same kind.
    #[test]
    fn display_decodes_to_same_kind(isolation in arb_isolation()) {
        let decoded = ActorIsolation::for_textual(&isolation.to_string());
        prop_assert_eq!(decoded.map(|d| d.kind()), Some(isolation.kind()));
    }

    /// Every value satisfies at most one of the actor-isolated and
    /// nonisolated predicates.
    #[test]
    fn isolation_predicates_are_exclusive(isolation in arb_isolation()) {
        prop_assert!(!(isolation.is_actor_isolated() && isolation.is_nonisolated()));
        prop_assert_eq!(
            isolation.is_unspecified(),
            !isolation.is_actor_isolated() && !isolation.is_nonisolated()
        );
    }

    /// Only global actor payloads are touched by substitution.
    #[test]
    fn subst_preserves_everything_but_global_payloads(
        isolation in arb_isolation(),
        subs in arb_substitution(),
    ) {
        let result = isolation.subst(&subs);
        prop_assert_eq!(result.kind(), isolation.kind());
        prop_assert_eq!(result.preconcurrency(), isolation.preconcurrency());
        prop_assert_eq!(result.is_degraded(), isolation.is_degraded());
        match isolation.isolation() {
            Isolation::GlobalActor { actor: Some(ty) } => {
                prop_assert_eq!(result.global_actor_type(), Some(&subs.apply(ty)));
            }
            Isolation::GlobalActor { actor: None }
            | Isolation::Unspecified
            | Isolation::ActorInstance { .. }
            | Isolation::Nonisolated
            | Isolation::NonisolatedUnsafe => prop_assert_eq!(&result, &isolation),
        }
    }

    /// Binding every parameter to itself changes nothing.
    #[test]
    fn identity_substitution_is_a_no_op(isolation in arb_isolation()) {
        let identity: Substitution = (0u32..4)
            .map(|n| (TypeVarId(n), Type::Var(TypeVarId(n))))
            .collect();
        let result = isolation.subst(&identity);
        prop_assert_eq!(&result, &isolation);
        prop_assert_eq!(result.preconcurrency(), isolation.preconcurrency());
    }

    /// The cache returns exactly what direct substitution would, flags included.
    #[test]
    fn cache_agrees_with_subst(
        values in prop::collection::vec(arb_isolation(), 1..8),
        subs in arb_substitution(),
    ) {
        let cache = SubstCache::new(subs.clone());
        for isolation in values.iter().chain(values.iter()) {
            let cached = cache.subst(isolation);
            let direct = isolation.subst(&subs);
            prop_assert_eq!(&cached, &direct);
            prop_assert_eq!(cached.preconcurrency(), direct.preconcurrency());
            prop_assert_eq!(cached.is_degraded(), direct.is_degraded());
        }
    }
}
