//! Capabilities and permission masks.
//!
//! A [`Capability`] is one named bit. A [`Permissions`] value is the mask
//! of capabilities held by an actor or granted on a resource.
//!
//! ```
//! use policy::{Capability, Permissions};
//!
//! let mask = Permissions::from_mask(0b0101);
//! assert!(mask.has(Capability::RunTasks));
//! assert!(mask.has(Capability::ManageResources));
//! assert!(!mask.has(Capability::UpdateProject));
//!
//! // Bits outside the capability domain are dropped.
//! assert_eq!(Permissions::from_mask(0xF0).mask(), 0);
//! ```

use crate::Error;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// A set of held capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Permissions: u32 {
        /// Start tasks from templates.
        const RUN_TASKS        = 1 << 0;
        /// Edit project settings.
        const UPDATE_PROJECT   = 1 << 1;
        /// Create and edit templates, inventories, keys, repositories.
        const MANAGE_RESOURCES = 1 << 2;
        /// Manage the project team and invites.
        const MANAGE_USERS     = 1 << 3;
    }
}

impl Permissions {
    /// No capabilities.
    pub const NONE: Self = Self::empty();

    /// Build a mask from a raw integer, ignoring undefined bits.
    ///
    /// Dropping bits also applies to requirements: a raw `16` becomes the
    /// empty set, which every actor satisfies. Build requirements from
    /// [`Capability`] values rather than raw integers.
    pub const fn from_mask(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// The raw integer form of this mask.
    pub const fn mask(self) -> u32 {
        self.bits()
    }

    /// Whether a single capability is held.
    pub fn has(self, capability: Capability) -> bool {
        self.contains(capability.into())
    }

    /// Held capabilities, in bit order.
    pub fn capabilities(self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.has(*c))
            .collect()
    }

    /// Parse a mask written either as an integer (`"12"`, `"0xc"`) or as a
    /// comma-separated list of capability names (`"run_tasks,manage_users"`).
    pub fn parse(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::NONE);
        }
        if let Some(hex) = s.strip_prefix("0x") {
            return u32::from_str_radix(hex, 16)
                .map(Self::from_mask)
                .map_err(|e| Error::Parse(format!("invalid mask '{s}': {e}")));
        }
        if let Ok(raw) = s.parse::<u32>() {
            return Ok(Self::from_mask(raw));
        }
        let mut mask = Self::NONE;
        for name in s.split(',') {
            mask |= Permissions::from(name.trim().parse::<Capability>()?);
        }
        Ok(mask)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let caps = self.capabilities();
        if caps.is_empty() {
            return f.pad("none");
        }
        let names: Vec<&str> = caps.iter().map(|c| c.name()).collect();
        f.pad(&names.join(","))
    }
}

/// A single named capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    RunTasks,
    UpdateProject,
    ManageResources,
    ManageUsers,
}

impl Capability {
    /// Every capability, in bit order.
    pub const ALL: [Capability; 4] = [
        Capability::RunTasks,
        Capability::UpdateProject,
        Capability::ManageResources,
        Capability::ManageUsers,
    ];

    /// The bit this capability occupies.
    pub const fn bit(self) -> Permissions {
        match self {
            Capability::RunTasks => Permissions::RUN_TASKS,
            Capability::UpdateProject => Permissions::UPDATE_PROJECT,
            Capability::ManageResources => Permissions::MANAGE_RESOURCES,
            Capability::ManageUsers => Permissions::MANAGE_USERS,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Capability::RunTasks => "run_tasks",
            Capability::UpdateProject => "update_project",
            Capability::ManageResources => "manage_resources",
            Capability::ManageUsers => "manage_users",
        }
    }
}

impl From<Capability> for Permissions {
    fn from(capability: Capability) -> Self {
        capability.bit()
    }
}

impl FromIterator<Capability> for Permissions {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Permissions::NONE, |acc, c| acc | c.bit())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Capability {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Capability::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| Error::UnknownCapability(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_match_console_domain() {
        assert_eq!(Capability::RunTasks.bit().mask(), 1);
        assert_eq!(Capability::UpdateProject.bit().mask(), 2);
        assert_eq!(Capability::ManageResources.bit().mask(), 4);
        assert_eq!(Capability::ManageUsers.bit().mask(), 8);
    }

    #[test]
    fn test_from_mask_drops_high_bits() {
        let mask = Permissions::from_mask(0xFFFF_FF08);
        assert_eq!(mask, Permissions::MANAGE_USERS);
    }

    #[test]
    fn test_undefined_requirement_is_empty() {
        let required = Permissions::from_mask(16);
        assert!(required.is_empty());
        assert!(crate::can_perform(
            &crate::Actor::anonymous(),
            &crate::Resource::unscoped(),
            required
        ));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Permissions::parse("12").unwrap().mask(), 12);
        assert_eq!(Permissions::parse("0xc").unwrap().mask(), 12);
        assert_eq!(
            Permissions::parse("manage_resources, manage_users").unwrap(),
            Permissions::MANAGE_RESOURCES | Permissions::MANAGE_USERS
        );
        assert_eq!(Permissions::parse("").unwrap(), Permissions::NONE);
        assert!(matches!(
            Permissions::parse("deploy"),
            Err(Error::UnknownCapability(name)) if name == "deploy"
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Permissions::NONE.to_string(), "none");
        assert_eq!(
            (Permissions::RUN_TASKS | Permissions::MANAGE_USERS).to_string(),
            "run_tasks,manage_users"
        );
    }

    #[test]
    fn test_capability_serde_names() {
        let json = serde_json::to_string(&Capability::ManageResources).unwrap();
        assert_eq!(json, "\"manage_resources\"");
        let back: Capability = serde_json::from_str("\"run_tasks\"").unwrap();
        assert_eq!(back, Capability::RunTasks);
    }
}
