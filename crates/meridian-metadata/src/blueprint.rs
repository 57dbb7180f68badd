//! Sharding blueprints
//!
//! A blueprint is the placement subsystem's answer to "which machine plays
//! which role for which region". Operators never edit it; it is recomputed
//! from the namespace's pinnings and affinities by the placement feedback
//! loop and written through [`crate::NamespaceMetadata::advance_blueprint`].

use crate::region::{Region, RegionMap};
use meridian_core::MachineId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role a machine plays for a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlueprintRole {
    /// Accepts writes for the region
    Primary,
    /// Holds a replica of the region
    Secondary,
    /// Holds nothing for the region
    #[default]
    Nothing,
}

/// Per-machine role assignment over regions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Blueprint {
    roles: BTreeMap<MachineId, RegionMap<BlueprintRole>>,
}

impl Blueprint {
    /// Blueprint with no machines.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Copy with `machine` assigned the given per-region roles.
    pub fn with_machine(mut self, machine: MachineId, roles: RegionMap<BlueprintRole>) -> Self {
        self.roles.insert(machine, roles);
        self
    }

    /// Role of `machine` for the region containing `key`.
    pub fn role_of(&self, machine: &MachineId, key: &[u8]) -> BlueprintRole {
        self.roles
            .get(machine)
            .and_then(|roles| roles.get(key))
            .copied()
            .unwrap_or_default()
    }

    /// Machines holding the given role for exactly `region`.
    pub fn machines_with_role(&self, region: &Region, role: BlueprintRole) -> Vec<MachineId> {
        self.roles
            .iter()
            .filter(|(_, roles)| roles.get_region(region) == Some(&role))
            .map(|(machine, _)| *machine)
            .collect()
    }

    /// Machines mentioned by the blueprint.
    pub fn machines(&self) -> impl Iterator<Item = &MachineId> {
        self.roles.keys()
    }

    /// Whether no machine is assigned.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
