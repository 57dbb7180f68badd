//! Core identifier types
//!
//! Every identifier is an opaque 128-bit UUID. Identifiers carry no structure
//! beyond global uniqueness; their string rendering is the hyphenated UUID so
//! operators can copy them between tools.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// The nil identifier, used as a placeholder before a real
            /// assignment exists
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Create from a UUID
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Create from a raw 128-bit value (deterministic, for tests and replay)
            pub const fn from_u128(value: u128) -> Self {
                Self(Uuid::from_u128(value))
            }

            /// Get the inner UUID
            pub fn uuid(&self) -> Uuid {
                self.0
            }

            /// Whether this is the nil placeholder
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::nil()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_uuid_id!(
    /// Identifier of a cluster node (process instance)
    ///
    /// Stable for the lifetime of the process. Vector clocks are keyed by it.
    NodeId
);

define_uuid_id!(
    /// Identifier of a namespace (table)
    ///
    /// Assigned once at creation time and never reused, even after deletion.
    NamespaceId
);

define_uuid_id!(
    /// Identifier of a datacenter
    DatacenterId
);

define_uuid_id!(
    /// Identifier of a machine that can host shard replicas
    MachineId
);

define_uuid_id!(
    /// Identifier of the database owning a namespace
    DatabaseId
);
