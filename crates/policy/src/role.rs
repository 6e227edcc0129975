//! Built-in project roles and custom role definitions.

use crate::{Capability, Error, Permissions, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The roles every project understands without a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    Owner,
    Manager,
    TaskRunner,
    Guest,
}

impl ProjectRole {
    pub const ALL: [ProjectRole; 4] = [
        ProjectRole::Owner,
        ProjectRole::Manager,
        ProjectRole::TaskRunner,
        ProjectRole::Guest,
    ];

    pub const fn slug(self) -> &'static str {
        match self {
            ProjectRole::Owner => "owner",
            ProjectRole::Manager => "manager",
            ProjectRole::TaskRunner => "task_runner",
            ProjectRole::Guest => "guest",
        }
    }

    pub const fn permissions(self) -> Permissions {
        match self {
            ProjectRole::Owner => Permissions::all(),
            ProjectRole::Manager => Permissions::RUN_TASKS.union(Permissions::MANAGE_RESOURCES),
            ProjectRole::TaskRunner => Permissions::RUN_TASKS,
            ProjectRole::Guest => Permissions::NONE,
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ProjectRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ProjectRole::ALL
            .into_iter()
            .find(|r| r.slug() == s)
            .ok_or_else(|| Error::InvalidRole(format!("unknown built-in role '{s}'")))
    }
}

/// A custom role, either global or owned by one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub slug: String,
    pub name: String,

    /// Granted capabilities, listed by name.
    #[serde(default)]
    pub permissions: Vec<Capability>,

    /// Owning project. Absent for global roles.
    #[serde(default)]
    pub project_id: Option<u64>,
}

impl Role {
    pub fn mask(&self) -> Permissions {
        self.permissions.iter().copied().collect()
    }

    pub fn is_global(&self) -> bool {
        self.project_id.is_none()
    }
}

/// Reject roles that cannot be referenced or displayed.
pub fn validate_role(role: &Role) -> Result<()> {
    if role.name.trim().is_empty() {
        return Err(Error::InvalidRole("role name cannot be empty".to_string()));
    }
    if role.slug.trim().is_empty() {
        return Err(Error::InvalidRole(format!(
            "role '{}' has an empty slug",
            role.name
        )));
    }
    Ok(())
}
