//! Gossip helpers
//!
//! State-based gossip needs no ordering or delivery guarantees: a replica
//! that joins every snapshot it hears converges once it has (transitively)
//! heard from everyone. These helpers drive that process over in-memory
//! directories and between [`MetadataReplica`]s; they are not a transport.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::replica::{MergeOutcome, MetadataReplica};
use crate::Result;
use meridian_core::JoinSemilattice;
use meridian_metadata::NamespaceDirectory;

/// Join of every directory; the empty directory for none.
pub fn join_all<'a>(directories: impl IntoIterator<Item = &'a NamespaceDirectory>) -> NamespaceDirectory {
    directories
        .into_iter()
        .fold(NamespaceDirectory::new(), |acc, directory| acc.join(directory))
}

/// Pairs `(from, to)` sending each replica's state to the next `fanout`
/// replicas around a ring.
pub fn ring_schedule(replicas: usize, fanout: usize) -> Vec<(usize, usize)> {
    let fanout = fanout.min(replicas.saturating_sub(1));
    (0..replicas)
        .flat_map(|from| (1..=fanout).map(move |step| (from, (from + step) % replicas)))
        .collect()
}

/// Run one round of `schedule`; returns whether any directory changed.
///
/// Each pair sees the sender's state as of the start of the round.
pub fn gossip_round(directories: &mut [NamespaceDirectory], schedule: &[(usize, usize)]) -> bool {
    let sent: Vec<NamespaceDirectory> = directories.to_vec();
    let mut changed = false;
    for &(from, to) in schedule {
        let joined = directories[to].join(&sent[from]);
        if joined != directories[to] {
            directories[to] = joined;
            changed = true;
        }
    }
    changed
}

/// Repeat `schedule` until a round changes nothing.
///
/// Returns the number of rounds that changed something. Fails with
/// [`SyncError::NoFixedPoint`] if `max_rounds` rounds all made progress.
pub fn run_to_fixed_point(
    directories: &mut [NamespaceDirectory],
    schedule: &[(usize, usize)],
    max_rounds: usize,
) -> Result<usize> {
    for round in 0..max_rounds {
        if !gossip_round(directories, schedule) {
            tracing::debug!(rounds = round, replicas = directories.len(), "Gossip reached fixed point");
            return Ok(round);
        }
    }
    tracing::warn!(rounds = max_rounds, "Gossip round budget exhausted");
    Err(SyncError::NoFixedPoint { rounds: max_rounds })
}

/// [`run_to_fixed_point`] over a ring of `config.fanout` with a budget of
/// `config.max_rounds`.
pub fn run_to_fixed_point_with(
    directories: &mut [NamespaceDirectory],
    config: &SyncConfig,
) -> Result<usize> {
    let schedule = ring_schedule(directories.len(), config.fanout);
    run_to_fixed_point(directories, &schedule, config.max_rounds)
}

/// Two-way snapshot exchange between replicas.
pub async fn exchange(
    a: &MetadataReplica,
    b: &MetadataReplica,
) -> Result<(MergeOutcome, MergeOutcome)> {
    let to_b = a.outbound().await?;
    let to_a = b.outbound().await?;
    let at_b = b.receive(&to_b).await?;
    let at_a = a.receive(&to_a).await?;
    Ok((at_a, at_b))
}
