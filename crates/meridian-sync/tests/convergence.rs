//! Gossip convergence tests
//!
//! Directories from random cluster histories must reach the same state
//! under any connected gossip schedule, and replicas exchanging snapshots
//! over the wire format must agree afterwards.

use meridian_core::NodeId;
use meridian_metadata::{FieldUpdate, NameLookup, NamespaceInit};
use meridian_sync::gossip::{exchange, join_all, ring_schedule, run_to_fixed_point};
use meridian_sync::{MetadataReplica, SyncConfig};
use meridian_testkit::strategies::{arb_directory_replicas, REPLICAS};
use proptest::prelude::*;
use std::io::Write;

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    /// Property: Ring gossip reaches the join of all replicas
    #[test]
    fn prop_ring_gossip_converges(
        mut replicas in arb_directory_replicas(),
        fanout in 1usize..REPLICAS,
    ) {
        let expected = join_all(&replicas);
        run_to_fixed_point(&mut replicas, &ring_schedule(REPLICAS, fanout), 16).unwrap();
        for dir in &replicas {
            prop_assert_eq!(dir, &expected);
        }
    }

    /// Property: Gossip only ever adds information
    #[test]
    fn prop_gossip_is_monotone(mut replicas in arb_directory_replicas()) {
        let before = replicas.clone();
        run_to_fixed_point(&mut replicas, &ring_schedule(REPLICAS, 1), 16).unwrap();
        for (old, new) in before.iter().zip(&replicas) {
            prop_assert_eq!(join_all([old, new]), new.clone());
        }
    }
}

fn replica(n: u128) -> MetadataReplica {
    MetadataReplica::new(SyncConfig::for_node(NodeId::from_u128(n)))
}

#[tokio::test]
async fn concurrent_writes_converge_through_exchange() {
    let a = replica(1);
    let b = replica(2);
    let id = a.create_namespace(NamespaceInit::new("users")).await;
    exchange(&a, &b).await.unwrap();

    let (rename, port) = tokio::join!(
        a.write(|dir, node| dir.update_namespace(id, node, FieldUpdate::Name("accounts".into()))),
        b.write(|dir, node| dir.update_namespace(id, node, FieldUpdate::Port(29015))),
    );
    rename.unwrap();
    port.unwrap();

    let (at_a, at_b) = exchange(&a, &b).await.unwrap();
    assert!(at_a.changed && at_b.changed);

    let (_, dir_a) = a.snapshot().await;
    let (_, dir_b) = b.snapshot().await;
    assert_eq!(dir_a, dir_b);
    assert!(dir_a.conflicts().is_empty());
    let (_, entry) = dir_a.get_namespace_by_name("accounts").found().unwrap();
    assert_eq!(*entry.value().port.get().unwrap(), 29015);

    let (at_a, at_b) = exchange(&a, &b).await.unwrap();
    assert!(!at_a.changed && !at_b.changed);
}

#[tokio::test]
async fn conflicting_renames_surface_after_exchange() {
    let a = replica(1);
    let b = replica(2);
    let id = a.create_namespace(NamespaceInit::new("users")).await;
    exchange(&a, &b).await.unwrap();

    a.write(|dir, node| dir.update_namespace(id, node, FieldUpdate::Name("x".into())))
        .await
        .unwrap();
    b.write(|dir, node| dir.update_namespace(id, node, FieldUpdate::Name("y".into())))
        .await
        .unwrap();
    exchange(&a, &b).await.unwrap();

    let (_, dir) = b.snapshot().await;
    assert_eq!(dir.get_namespace_by_name("x"), NameLookup::Unknown);
    assert_eq!(dir.conflicts().len(), 1);

    b.write(|dir, node| dir.update_namespace(id, node, FieldUpdate::Name("z".into())))
        .await
        .unwrap();
    exchange(&a, &b).await.unwrap();
    let (_, dir) = a.snapshot().await;
    assert!(dir.get_namespace_by_name("z").is_found());
}

#[test]
fn config_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "node_id = \"00000000-0000-0000-0000-000000000003\"").unwrap();
    writeln!(file, "max_snapshot_bytes = 1024").unwrap();

    let config = SyncConfig::load(file.path()).unwrap();
    assert_eq!(config.node_id, NodeId::from_u128(3));
    assert_eq!(config.max_snapshot_bytes, 1024);
}

#[tokio::test]
async fn oversized_snapshots_are_refused() {
    let mut config = SyncConfig::for_node(NodeId::from_u128(1));
    config.max_snapshot_bytes = 16;
    let small = MetadataReplica::new(config);
    small.create_namespace(NamespaceInit::new("users")).await;
    assert!(matches!(
        small.outbound().await,
        Err(meridian_sync::SyncError::SnapshotTooLarge { limit: 16, .. })
    ));
}
