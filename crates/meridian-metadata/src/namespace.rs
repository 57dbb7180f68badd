//! Namespace metadata
//!
//! [`NamespaceMetadata`] is a record of independently versioned fields. Its
//! join is the field-wise join of its members; there is no coupling between
//! fields and no validation during a join.
//!
//! All fields are declared once, in the `namespace_fields!` invocation below.
//! That single list generates the record, the [`NamespaceField`] names, the
//! typed [`FieldUpdate`] writes, the join, and the conflict listing, so a new
//! field cannot be added to one without the others.

use crate::blueprint::Blueprint;
use crate::region::{Region, RegionMap};
use meridian_core::{
    Branch, DatabaseId, DatacenterId, JoinSemilattice, MachineId, MetadataError, NodeId,
    VectorClock, VersionedValue,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

type Result<T> = std::result::Result<T, MetadataError>;

macro_rules! namespace_fields {
    ($(
        $(#[$doc:meta])*
        $field:ident: $ty:ty => $variant:ident($key:literal, read_only = $read_only:literal);
    )+) => {
        /// Replicated configuration of a single namespace.
        ///
        /// Every field is a [`VersionedValue`]; concurrent edits to different
        /// fields merge cleanly, concurrent edits to the same field surface as
        /// a conflict on that field only.
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct NamespaceMetadata {
            $(
                $(#[$doc])*
                pub $field: VersionedValue<$ty>,
            )+
        }

        /// Name of a [`NamespaceMetadata`] field.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum NamespaceField {
            $(
                $(#[$doc])*
                $variant,
            )+
        }

        impl NamespaceField {
            /// Every field, in declaration order.
            pub const ALL: &'static [NamespaceField] = &[$(NamespaceField::$variant,)+];

            /// Name exposed to operators.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(NamespaceField::$variant => $key,)+
                }
            }

            /// Whether operators are barred from writing this field.
            pub fn is_read_only(&self) -> bool {
                match self {
                    $(NamespaceField::$variant => $read_only,)+
                }
            }
        }

        /// A new value for one field.
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum FieldUpdate {
            $(
                $(#[$doc])*
                $variant($ty),
            )+
        }

        impl FieldUpdate {
            /// The field this update writes.
            pub fn field(&self) -> NamespaceField {
                match self {
                    $(FieldUpdate::$variant(_) => NamespaceField::$variant,)+
                }
            }

            /// Parse a JSON value as the new value of `field`.
            pub fn from_json(field: NamespaceField, value: serde_json::Value) -> Result<Self> {
                let parsed = match field {
                    $(NamespaceField::$variant => {
                        serde_json::from_value::<$ty>(value).map(FieldUpdate::$variant)
                    })+
                };
                parsed.map_err(|e| MetadataError::invalid(format!("{}: {e}", field.as_str())))
            }
        }

        impl JoinSemilattice for NamespaceMetadata {
            fn join(&self, other: &Self) -> Self {
                Self {
                    $($field: self.$field.join(&other.$field),)+
                }
            }
        }

        impl NamespaceMetadata {
            /// Fields holding unresolved concurrent versions.
            pub fn conflicted_fields(&self) -> Vec<NamespaceField> {
                let mut fields = Vec::new();
                $(
                    if self.$field.in_conflict() {
                        fields.push(NamespaceField::$variant);
                    }
                )+
                fields
            }

            /// Every field with its concurrent heads rendered as JSON.
            pub fn field_views(&self) -> Result<Vec<FieldView>> {
                Ok(vec![$(FieldView::of(NamespaceField::$variant, &self.$field)?,)+])
            }

            fn advance_field(&self, node: NodeId, update: FieldUpdate) -> Self {
                let mut next = self.clone();
                match update {
                    $(FieldUpdate::$variant(value) => {
                        next.$field = self.$field.advance(node, value);
                    })+
                }
                next
            }
        }
    };
}

namespace_fields! {
    /// Placement computed by the reactor; written only by the placement loop
    blueprint: Blueprint => Blueprint("blueprint", read_only = true);
    /// Datacenter hosting the primary replicas
    primary_datacenter: DatacenterId => PrimaryDatacenter("primary_uuid", read_only = false);
    /// Replica count per datacenter
    replica_affinities: BTreeMap<DatacenterId, u32> => ReplicaAffinities("replica_affinities", read_only = false);
    /// Write acknowledgements expected per datacenter
    ack_expectations: BTreeMap<DatacenterId, u32> => AckExpectations("ack_expectations", read_only = false);
    /// Regions partitioning the key space
    shards: BTreeSet<Region> => Shards("shards", read_only = false);
    /// Human-readable name
    name: String => Name("name", read_only = false);
    /// Client port
    port: u16 => Port("port", read_only = false);
    /// Machine pinned as primary per region
    primary_pinnings: RegionMap<MachineId> => PrimaryPinnings("primary_pinnings", read_only = false);
    /// Machines pinned as secondaries per region
    secondary_pinnings: RegionMap<BTreeSet<MachineId>> => SecondaryPinnings("secondary_pinnings", read_only = false);
    /// Primary key column; fixed at creation
    primary_key: String => PrimaryKey("primary_key", read_only = true);
    /// Owning database
    database: DatabaseId => Database("database", read_only = false);
}

/// Initial field values for a new namespace.
///
/// Sharding and pinning fields are not part of the initial values: a new
/// namespace always starts with a single universe shard pinned to the nil
/// machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceInit {
    /// Namespace name
    pub name: String,
    /// Client port
    pub port: u16,
    /// Primary key column
    pub primary_key: String,
    /// Datacenter hosting primaries
    pub primary_datacenter: DatacenterId,
    /// Replica count per datacenter
    pub replica_affinities: BTreeMap<DatacenterId, u32>,
    /// Acks expected per datacenter
    pub ack_expectations: BTreeMap<DatacenterId, u32>,
    /// Owning database
    pub database: DatabaseId,
}

impl NamespaceInit {
    /// Defaults for a namespace called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port: 0,
            primary_key: "id".to_string(),
            primary_datacenter: DatacenterId::nil(),
            replica_affinities: BTreeMap::new(),
            ack_expectations: BTreeMap::new(),
            database: DatabaseId::nil(),
        }
    }

    /// Set the client port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the primary key column.
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Set the primary datacenter.
    pub fn with_primary_datacenter(mut self, datacenter: DatacenterId) -> Self {
        self.primary_datacenter = datacenter;
        self
    }

    /// Set the owning database.
    pub fn with_database(mut self, database: DatabaseId) -> Self {
        self.database = database;
        self
    }
}

impl NamespaceMetadata {
    /// Metadata for a new namespace, every field written once by `node`.
    pub fn new(node: NodeId, init: NamespaceInit) -> Self {
        Self {
            blueprint: VersionedValue::new(Blueprint::empty(), node),
            primary_datacenter: VersionedValue::new(init.primary_datacenter, node),
            replica_affinities: VersionedValue::new(init.replica_affinities, node),
            ack_expectations: VersionedValue::new(init.ack_expectations, node),
            shards: VersionedValue::new([Region::universe()].into_iter().collect(), node),
            name: VersionedValue::new(init.name, node),
            port: VersionedValue::new(init.port, node),
            primary_pinnings: VersionedValue::new(
                RegionMap::new(Region::universe(), MachineId::nil()),
                node,
            ),
            secondary_pinnings: VersionedValue::new(
                RegionMap::new(Region::universe(), BTreeSet::new()),
                node,
            ),
            primary_key: VersionedValue::new(init.primary_key, node),
            database: VersionedValue::new(init.database, node),
        }
    }

    /// Write one field on behalf of an operator.
    ///
    /// Read-only fields are rejected with [`MetadataError::ReadOnlyField`].
    pub fn apply(&self, node: NodeId, update: FieldUpdate) -> Result<Self> {
        let field = update.field();
        if field.is_read_only() {
            return Err(MetadataError::read_only(field.as_str()));
        }
        Ok(self.advance_field(node, update))
    }

    /// Write a field addressed by its operator-facing name with a JSON value.
    pub fn apply_named(&self, node: NodeId, field: &str, value: serde_json::Value) -> Result<Self> {
        let field: NamespaceField = field.parse()?;
        if field.is_read_only() {
            return Err(MetadataError::read_only(field.as_str()));
        }
        self.apply(node, FieldUpdate::from_json(field, value)?)
    }

    /// Record a blueprint computed by the placement loop.
    pub fn advance_blueprint(&self, node: NodeId, blueprint: Blueprint) -> Self {
        self.advance_field(node, FieldUpdate::Blueprint(blueprint))
    }

    /// Whether any field holds unresolved concurrent versions.
    pub fn in_conflict(&self) -> bool {
        !self.conflicted_fields().is_empty()
    }
}

impl fmt::Display for NamespaceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespaceField {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self> {
        NamespaceField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| MetadataError::unknown_field(s))
    }
}

/// One concurrent head of a field, rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadView {
    /// Joined clock of the branches carrying this value
    pub clock: VectorClock,
    /// The value as JSON
    pub value: serde_json::Value,
}

/// A field's versions, rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldView {
    /// Which field
    pub field: NamespaceField,
    /// Whether operators cannot write it
    pub read_only: bool,
    /// Whether more than one value is current
    pub in_conflict: bool,
    /// Current values
    pub heads: Vec<HeadView>,
}

impl FieldView {
    fn of<T: Serialize + Ord>(field: NamespaceField, value: &VersionedValue<T>) -> Result<Self> {
        let heads = value
            .heads()
            .into_iter()
            .map(|Branch { clock, value }| {
                serde_json::to_value(value)
                    .map(|value| HeadView { clock, value })
                    .map_err(|e| MetadataError::serialization(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            field,
            read_only: field.is_read_only(),
            in_conflict: heads.len() > 1,
            heads,
        })
    }
}
