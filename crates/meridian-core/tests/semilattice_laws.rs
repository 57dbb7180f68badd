//! Semilattice law property tests for the core lattice types
//!
//! Inputs are replica states from random histories of writes and partial
//! syncs, so the laws are checked on ordered, concurrent and conflicted
//! pairs alike.
//!
//! ## Properties Verified
//!
//! 1. **Join Semilattice Laws**: Idempotence, commutativity, associativity
//! 2. **Antichain Storage**: No stored branch dominates another
//! 3. **Observation**: Conflict is reported iff more than one distinct value is current

use meridian_core::{Bottom, JoinMap, JoinSemilattice, MetadataError, Tombstoned, VersionedValue};
use meridian_testkit::strategies::{arb_tombstoned_replicas, arb_versioned_replicas};
use proptest::prelude::*;

fn assert_laws<T: JoinSemilattice + PartialEq + std::fmt::Debug>(
    a: &T,
    b: &T,
    c: &T,
) -> Result<(), TestCaseError> {
    prop_assert_eq!(a.join(a), a.clone(), "join must be idempotent");
    prop_assert_eq!(a.join(b), b.join(a), "join must be commutative");
    prop_assert_eq!(
        a.join(b).join(c),
        a.join(&b.join(c)),
        "join must be associative"
    );
    let ab = a.join(b);
    prop_assert_eq!(ab.join(a), ab.clone(), "join must absorb its inputs");
    Ok(())
}

type Names = JoinMap<u8, VersionedValue<String>>;

fn names(
    replica: &[VersionedValue<String>],
    other: &[VersionedValue<String>],
    index: usize,
    mask: u8,
) -> Names {
    let mut map = JoinMap::new();
    if mask & (1 << index) != 0 {
        map.merge_entry(0, replica[index].clone());
    }
    if mask & (1 << (index + 3)) != 0 {
        map.merge_entry(1, other[index].clone());
    }
    map
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    /// Property: VersionedValue join is a semilattice
    #[test]
    fn prop_versioned_laws(replicas in arb_versioned_replicas()) {
        assert_laws(&replicas[0], &replicas[1], &replicas[2])?;
    }

    /// Property: Replicas with unrelated origins still join lawfully
    #[test]
    fn prop_versioned_laws_unrelated(
        a in arb_versioned_replicas(),
        b in arb_versioned_replicas(),
        c in arb_versioned_replicas(),
    ) {
        assert_laws(&a[0], &b[1], &c[2])?;
    }

    /// Property: Stored branches form an antichain after any join
    #[test]
    fn prop_versioned_join_keeps_antichain(replicas in arb_versioned_replicas()) {
        let joined = replicas[0].join(&replicas[1]).join(&replicas[2]);
        let branches = joined.branches();
        prop_assert!(!branches.is_empty());
        for (i, x) in branches.iter().enumerate() {
            for (j, y) in branches.iter().enumerate() {
                if i != j {
                    prop_assert!(
                        !x.clock.dominates(&y.clock),
                        "branch {:?} dominates {:?}", x, y
                    );
                }
            }
        }
    }

    /// Property: Conflict is reported iff distinct values are current
    #[test]
    fn prop_conflict_matches_heads(replicas in arb_versioned_replicas()) {
        let joined = replicas[0].join(&replicas[1]).join(&replicas[2]);
        let heads = joined.heads();
        prop_assert_eq!(joined.in_conflict(), heads.len() > 1);
        match joined.get() {
            Ok(value) => {
                prop_assert_eq!(heads.len(), 1);
                prop_assert_eq!(heads[0].value, value);
            }
            Err(err) => prop_assert_eq!(err, MetadataError::value_in_conflict(heads.len())),
        }
    }

    /// Property: A local write resolves every conflict it has seen
    #[test]
    fn prop_advance_resolves(replicas in arb_versioned_replicas()) {
        let joined = replicas[0].join(&replicas[1]).join(&replicas[2]);
        let resolved = joined.advance(meridian_testkit::test_node(0), "settled".to_string());
        prop_assert!(!resolved.in_conflict());
        prop_assert_eq!(resolved.get().unwrap().as_str(), "settled");
        prop_assert_eq!(resolved.join(&joined), resolved.clone());
    }

    /// Property: Tombstoned join is a semilattice
    #[test]
    fn prop_tombstoned_laws(replicas in arb_tombstoned_replicas()) {
        assert_laws(&replicas[0], &replicas[1], &replicas[2])?;
    }

    /// Property: Joining never loses field edits to a deletion
    #[test]
    fn prop_tombstone_keeps_contents(replicas in arb_tombstoned_replicas()) {
        let joined: Tombstoned<_> = replicas[0].join(&replicas[1]);
        prop_assert_eq!(joined.value(), &replicas[0].value().join(replicas[1].value()));
        prop_assert_eq!(joined.status(), &replicas[0].status().join(replicas[1].status()));
    }

    /// Property: JoinMap join is a semilattice with the empty map as bottom
    #[test]
    fn prop_join_map_laws(
        first in arb_versioned_replicas(),
        second in arb_versioned_replicas(),
        mask in any::<u8>(),
    ) {
        let a = names(&first, &second, 0, mask);
        let b = names(&first, &second, 1, mask);
        let c = names(&first, &second, 2, mask);
        assert_laws(&a, &b, &c)?;
        prop_assert_eq!(a.join(&Names::bottom()), a.clone());
        prop_assert_eq!(Names::bottom().join(&a), a.clone());
    }

    /// Property: JoinMap join contains exactly the union of keys
    #[test]
    fn prop_join_map_key_union(
        first in arb_versioned_replicas(),
        second in arb_versioned_replicas(),
        mask in any::<u8>(),
    ) {
        let a = names(&first, &second, 0, mask);
        let b = names(&first, &second, 1, mask);
        let joined = a.join(&b);
        for key in [0u8, 1] {
            prop_assert_eq!(
                joined.contains_key(&key),
                a.contains_key(&key) || b.contains_key(&key)
            );
        }
    }
}
