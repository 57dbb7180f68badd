//! Join-semilattice traits
//!
//! State-based replication only needs one operation: a join (`⊔`) that is
//! commutative, associative and idempotent. Types implementing
//! [`JoinSemilattice`] can be exchanged between replicas in any order and any
//! number of times.

/// A type with a least-upper-bound operation.
///
/// Implementations must satisfy the semilattice laws:
///
/// - `a.join(&b) == b.join(&a)`
/// - `a.join(&b).join(&c) == a.join(&b.join(&c))`
/// - `a.join(&a) == a`
pub trait JoinSemilattice: Clone {
    /// Least upper bound of `self` and `other`.
    fn join(&self, other: &Self) -> Self;

    /// Replace `self` with `self ⊔ other`.
    fn join_assign(&mut self, other: &Self) {
        *self = self.join(other);
    }
}

/// Identity element for join: `bottom() ⊔ x = x`.
pub trait Bottom {
    /// The least element.
    fn bottom() -> Self;
}

/// Marker for convergent replicated state (state-based CRDT).
///
/// A `CvState` can start from [`Bottom::bottom`] and absorb any remote
/// snapshot through [`JoinSemilattice::join`].
pub trait CvState: JoinSemilattice + Bottom {}
