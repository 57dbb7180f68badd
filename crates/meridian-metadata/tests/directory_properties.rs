//! Directory convergence property tests
//!
//! Replica directories come from random cluster histories of creates,
//! edits, deletes, restores and partial syncs.

use meridian_core::{Bottom, JoinSemilattice};
use meridian_metadata::{ConflictKind, NameLookup, NamespaceDirectory};
use meridian_testkit::strategies::{arb_cluster, arb_directory_replicas};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    /// Property: Directory join is a semilattice with the empty directory as bottom
    #[test]
    fn prop_directory_laws(replicas in arb_directory_replicas()) {
        let (a, b, c) = (&replicas[0], &replicas[1], &replicas[2]);
        prop_assert_eq!(a.join(a), a.clone());
        prop_assert_eq!(a.join(b), b.join(a));
        prop_assert_eq!(a.join(b).join(c), a.join(&b.join(c)));
        prop_assert_eq!(a.join(&NamespaceDirectory::bottom()), a.clone());
        prop_assert_eq!(NamespaceDirectory::bottom().join(a), a.clone());
    }

    /// Property: NamespaceMetadata join is a semilattice on shared namespaces
    #[test]
    fn prop_metadata_laws(replicas in arb_directory_replicas()) {
        for (id, entry) in replicas[0].iter() {
            let (Some(b), Some(c)) = (replicas[1].get(id), replicas[2].get(id)) else {
                continue;
            };
            let (a, b, c) = (entry.value(), b.value(), c.value());
            prop_assert_eq!(a.join(a), a.clone());
            prop_assert_eq!(a.join(b), b.join(a));
            prop_assert_eq!(a.join(b).join(c), a.join(&b.join(c)));
        }
    }

    /// Property: Every sync order reaches the same directory
    #[test]
    fn prop_converge_is_order_independent(replicas in arb_directory_replicas()) {
        let forward = replicas
            .iter()
            .fold(NamespaceDirectory::new(), |acc, dir| acc.join(dir));
        let backward = replicas
            .iter()
            .rev()
            .fold(NamespaceDirectory::new(), |acc, dir| acc.join(dir));
        prop_assert_eq!(forward, backward);
    }

    /// Property: Joins never drop an entry
    #[test]
    fn prop_entries_only_grow(replicas in arb_directory_replicas()) {
        let joined = replicas[0].join(&replicas[1]);
        for (id, _) in replicas[0].iter().chain(replicas[1].iter()) {
            prop_assert!(joined.get(id).is_some());
        }
        prop_assert!(joined.len() >= replicas[0].len().max(replicas[1].len()));
    }

    /// Property: Converged replicas answer every query identically
    #[test]
    fn prop_converged_replicas_agree(mut cluster in arb_cluster()) {
        cluster.converge();
        let first = cluster.directory(0).clone();
        for replica in 1..cluster.len() {
            let dir = cluster.directory(replica);
            prop_assert_eq!(dir, &first);
            for name in ["users", "orders", "events"] {
                prop_assert_eq!(dir.get_namespace_by_name(name), first.get_namespace_by_name(name));
            }
            prop_assert_eq!(dir.conflicts(), first.conflicts());
        }
    }

    /// Property: A found namespace is live, unconflicted in name, and unique
    #[test]
    fn prop_lookup_found_is_sound(mut cluster in arb_cluster()) {
        cluster.converge();
        let dir = cluster.directory(0);
        for name in ["users", "orders", "events"] {
            if let NameLookup::Found(id, entry) = dir.get_namespace_by_name(name) {
                prop_assert_eq!(entry.is_deleted(), Ok(false));
                prop_assert_eq!(entry.value().name.get().map(String::as_str), Ok(name));
                let matches = dir
                    .live()
                    .filter(|(_, ns)| ns.name.get().map(String::as_str) == Ok(name))
                    .count();
                prop_assert_eq!(matches, 1);
                prop_assert!(dir.get(&id).is_some());
            }
        }
    }

    /// Property: Lookup is Unknown whenever some entry has a conflicted status
    #[test]
    fn prop_deletion_conflict_poisons_lookup(mut cluster in arb_cluster()) {
        cluster.converge();
        let dir = cluster.directory(0);
        let has_deletion_conflict = dir
            .conflicts()
            .iter()
            .any(|issue| issue.kind == ConflictKind::Deletion);
        if has_deletion_conflict {
            for name in ["users", "orders", "events", "missing"] {
                prop_assert_eq!(dir.get_namespace_by_name(name), NameLookup::Unknown);
            }
        }
    }
}
