//! Identity pool property-based tests.
//!
//! ## Purpose
//! Random acquire/release sequences are replayed against the pool and a simple
//! per-role model. Lease order, exhaustion, and release idempotence must match
//! the model at every step.
// crates/fixture-lease-core/tests/proptest_pool.rs
// ============================================================================
// Module: Identity Pool Property-Based Tests
// Description: Model-based checks for leasing order and exhaustion.
// Purpose: Ensure leasing stays exclusive and deterministic for any sequence.
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use fixture_lease_core::FixtureError;
use fixture_lease_core::Identity;
use fixture_lease_core::IdentityPool;
use fixture_lease_core::Role;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Acquire(Role),
    Release(Role, usize),
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Editor), Just(Role::Viewer)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        role_strategy().prop_map(Op::Acquire),
        (role_strategy(), 0..6_usize).prop_map(|(role, index)| Op::Release(role, index)),
    ]
}

fn build_pool(sizes: [usize; 3]) -> (IdentityPool, Vec<Vec<Identity>>) {
    let members: Vec<Vec<Identity>> = Role::ALL
        .iter()
        .zip(sizes)
        .map(|(role, size)| {
            (0..size)
                .map(|index| {
                    let id = format!("{}-{index}", role.marker());
                    Identity::new(id.as_str(), format!("{id}@test.com"), "pw", *role)
                })
                .collect()
        })
        .collect();
    let pool = IdentityPool::new(members.iter().flatten().cloned()).unwrap();
    (pool, members)
}

fn role_index(role: Role) -> usize {
    Role::ALL.iter().position(|candidate| *candidate == role).unwrap()
}

proptest! {
    #[test]
    fn pool_matches_first_free_model(
        sizes in [0..4_usize, 0..4_usize, 0..4_usize],
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let (pool, members) = build_pool(sizes);
        let mut model: Vec<Vec<bool>> = sizes.iter().map(|size| vec![false; *size]).collect();

        for op in ops {
            match op {
                Op::Acquire(role) => {
                    let slots = &mut model[role_index(role)];
                    let expected = slots.iter().position(|leased| !leased);
                    let result = pool.acquire(role);
                    match expected {
                        Some(index) => {
                            slots[index] = true;
                            prop_assert_eq!(result.unwrap(), members[role_index(role)][index].clone());
                        }
                        None => {
                            prop_assert_eq!(result.unwrap_err(), FixtureError::PoolExhausted { role });
                        }
                    }
                }
                Op::Release(role, index) => {
                    let slots = &mut model[role_index(role)];
                    if let Some(identity) = members[role_index(role)].get(index) {
                        pool.release(identity);
                        slots[index] = false;
                    }
                }
            }

            for role in Role::ALL {
                let slots = &model[role_index(role)];
                let leased = slots.iter().filter(|leased| **leased).count();
                prop_assert_eq!(pool.leased_count(role), leased);
                prop_assert!(pool.leased_count(role) <= pool.pool_size(role));
            }
        }
    }
}
