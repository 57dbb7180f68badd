//! Property test strategies for Meridian types
//!
//! Lattice values are never generated field by field: arbitrary clocks and
//! values would produce states no real cluster can reach. Every strategy
//! here instead replays a random history of writes and partial syncs over a
//! small set of replicas that share one origin, and hands back the replica
//! states. Values drawn from one history are related the way real replicas
//! are: some ordered, some concurrent, some in conflict.

use crate::sim::{SimCluster, SimOp};
use crate::test_node;
use meridian_core::{JoinSemilattice, NodeId, Tombstoned, VersionedValue};
use meridian_metadata::NamespaceDirectory;
use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

/// Replicas per generated history.
pub const REPLICAS: usize = 3;

const NAMES: &[&str] = &["users", "orders", "events"];

/// Strategy for node ids drawn from a small pool, so clocks collide.
pub fn arb_node_id() -> impl Strategy<Value = NodeId> {
    (0..REPLICAS).prop_map(test_node)
}

/// Strategy for namespace names from a small pool, so names collide.
pub fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES).prop_map(str::to_string)
}

fn arb_replica() -> impl Strategy<Value = usize> {
    0..REPLICAS
}

#[derive(Debug, Clone)]
enum ValueStep {
    Write { replica: usize, value: String },
    Delete { replica: usize },
    Restore { replica: usize },
    Sync { from: usize, to: usize },
}

fn arb_value_step(with_liveness: bool) -> BoxedStrategy<ValueStep> {
    let write = (arb_replica(), arb_name())
        .prop_map(|(replica, value)| ValueStep::Write { replica, value });
    let sync = (arb_replica(), arb_replica()).prop_map(|(from, to)| ValueStep::Sync { from, to });
    if with_liveness {
        prop_oneof![
            3 => write,
            1 => arb_replica().prop_map(|replica| ValueStep::Delete { replica }),
            1 => arb_replica().prop_map(|replica| ValueStep::Restore { replica }),
            2 => sync,
        ]
        .boxed()
    } else {
        prop_oneof![3 => write, 2 => sync].boxed()
    }
}

/// Strategy for [`REPLICAS`] versioned strings sharing one origin.
pub fn arb_versioned_replicas() -> impl Strategy<Value = Vec<VersionedValue<String>>> {
    (arb_name(), prop::collection::vec(arb_value_step(false), 0..24)).prop_map(|(initial, steps)| {
        let origin = VersionedValue::new(initial, test_node(0));
        let mut replicas = vec![origin; REPLICAS];
        for step in steps {
            match step {
                ValueStep::Write { replica, value } => {
                    replicas[replica] = replicas[replica].advance(test_node(replica), value);
                }
                ValueStep::Sync { from, to } => {
                    let incoming = replicas[from].clone();
                    replicas[to].join_assign(&incoming);
                }
                ValueStep::Delete { .. } | ValueStep::Restore { .. } => {}
            }
        }
        replicas
    })
}

/// Strategy for [`REPLICAS`] tombstoned entities sharing one origin.
pub fn arb_tombstoned_replicas(
) -> impl Strategy<Value = Vec<Tombstoned<VersionedValue<String>>>> {
    (arb_name(), prop::collection::vec(arb_value_step(true), 0..24)).prop_map(|(initial, steps)| {
        let origin = Tombstoned::new(VersionedValue::new(initial, test_node(0)), test_node(0));
        let mut replicas = vec![origin; REPLICAS];
        for step in steps {
            let r = match &step {
                ValueStep::Write { replica, .. }
                | ValueStep::Delete { replica }
                | ValueStep::Restore { replica } => *replica,
                ValueStep::Sync { to, .. } => *to,
            };
            let node = test_node(r);
            replicas[r] = match step {
                ValueStep::Write { value, .. } => {
                    replicas[r].update(|contents| contents.advance(node, value))
                }
                ValueStep::Delete { .. } => replicas[r].delete(node),
                ValueStep::Restore { .. } => replicas[r].restore(node),
                ValueStep::Sync { from, .. } => replicas[r].join(&replicas[from]),
            };
        }
        replicas
    })
}

/// Strategy for one scripted cluster action.
pub fn arb_sim_op() -> impl Strategy<Value = SimOp> {
    prop_oneof![
        2 => (arb_replica(), arb_name()).prop_map(|(replica, name)| SimOp::Create { replica, name }),
        2 => (arb_replica(), any::<usize>(), arb_name())
            .prop_map(|(replica, slot, name)| SimOp::Rename { replica, slot, name }),
        1 => (arb_replica(), any::<usize>(), any::<u16>())
            .prop_map(|(replica, slot, port)| SimOp::SetPort { replica, slot, port }),
        1 => (arb_replica(), any::<usize>()).prop_map(|(replica, slot)| SimOp::Delete { replica, slot }),
        1 => (arb_replica(), any::<usize>()).prop_map(|(replica, slot)| SimOp::Restore { replica, slot }),
        3 => (arb_replica(), arb_replica()).prop_map(|(from, to)| SimOp::Sync { from, to }),
    ]
}

/// Strategy for a cluster after a random history.
pub fn arb_cluster() -> impl Strategy<Value = SimCluster> {
    prop::collection::vec(arb_sim_op(), 0..32).prop_map(|ops| {
        let mut cluster = SimCluster::new(REPLICAS);
        for op in &ops {
            cluster.apply(op);
        }
        cluster
    })
}

/// Strategy for [`REPLICAS`] directories from one cluster history.
pub fn arb_directory_replicas() -> impl Strategy<Value = Vec<NamespaceDirectory>> {
    arb_cluster().prop_map(|cluster| cluster.directories())
}
