//! Role catalog loaded from TOML.

use crate::{Error, Permissions, ProjectRole, Result, Role, validate_role};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Custom roles, global and project-scoped.
///
/// ```toml
/// [[roles]]
/// slug = "deployer"
/// name = "Deployer"
/// permissions = ["run_tasks", "manage_resources"]
/// project_id = 3
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCatalog {
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl RoleCatalog {
    /// Load a catalog from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a catalog from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(toml).map_err(|e| Error::Parse(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Build a catalog from roles, validating each.
    pub fn new(roles: Vec<Role>) -> Result<Self> {
        let catalog = Self { roles };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for role in &self.roles {
            validate_role(role)?;
            if !seen.insert((role.slug.as_str(), role.project_id)) {
                let slug = &role.slug;
                return Err(Error::Invalid(match role.project_id {
                    Some(project) => format!("duplicate role '{slug}' in project {project}"),
                    None => format!("duplicate global role '{slug}'"),
                }));
            }
        }
        Ok(())
    }

    /// The custom role a slug names within a project, if any. A role owned
    /// by the project wins over a global role of the same slug.
    pub fn custom(&self, project_id: u64, slug: &str) -> Option<&Role> {
        let find = |scope: Option<u64>| {
            self.roles
                .iter()
                .find(|r| r.slug == slug && r.project_id == scope)
        };
        find(Some(project_id)).or_else(|| find(None))
    }

    /// Resolve a role slug to its mask within a project.
    ///
    /// Custom roles (see [`RoleCatalog::custom`]) win over the built-in
    /// role of the same slug.
    pub fn resolve(&self, project_id: u64, slug: &str) -> Option<Permissions> {
        self.custom(project_id, slug)
            .map(Role::mask)
            .or_else(|| slug.parse::<ProjectRole>().ok().map(ProjectRole::permissions))
    }

    /// Custom roles visible from a project: global ones, then its own.
    pub fn roles_for(&self, project_id: Option<u64>) -> Vec<&Role> {
        let global = self.roles.iter().filter(|r| r.is_global());
        let owned = self
            .roles
            .iter()
            .filter(move |r| project_id.is_some() && r.project_id == project_id);
        global.chain(owned).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capability;
    use std::io::Write;

    const CATALOG: &str = r#"
[[roles]]
slug = "deployer"
name = "Deployer"
permissions = ["run_tasks"]

[[roles]]
slug = "deployer"
name = "Deployer (project 3)"
permissions = ["run_tasks", "manage_resources"]
project_id = 3

[[roles]]
slug = "manager"
name = "Restricted manager"
permissions = ["run_tasks"]
project_id = 5
"#;

    #[test]
    fn test_parse_toml() {
        let catalog = RoleCatalog::parse(CATALOG).unwrap();
        assert_eq!(catalog.roles.len(), 3);
        assert_eq!(
            catalog.roles[1].permissions,
            vec![Capability::RunTasks, Capability::ManageResources]
        );
    }

    #[test]
    fn test_resolution_order() {
        let catalog = RoleCatalog::parse(CATALOG).unwrap();

        // Project role over global role.
        assert_eq!(
            catalog.resolve(3, "deployer"),
            Some(Permissions::RUN_TASKS | Permissions::MANAGE_RESOURCES)
        );
        // Global role elsewhere.
        assert_eq!(catalog.resolve(4, "deployer"), Some(Permissions::RUN_TASKS));
        // Custom role over built-in.
        assert_eq!(catalog.resolve(5, "manager"), Some(Permissions::RUN_TASKS));
        // Built-in fallback.
        assert_eq!(catalog.resolve(6, "manager"), Some(ProjectRole::Manager.permissions()));
        assert_eq!(catalog.resolve(6, "nobody"), None);
    }

    #[test]
    fn test_custom_skips_builtin() {
        let catalog = RoleCatalog::parse(CATALOG).unwrap();
        assert_eq!(
            catalog.custom(3, "deployer").map(|r| r.name.as_str()),
            Some("Deployer (project 3)")
        );
        assert_eq!(
            catalog.custom(4, "deployer").map(|r| r.name.as_str()),
            Some("Deployer")
        );
        assert!(catalog.custom(5, "manager").is_some());
        assert!(catalog.custom(6, "manager").is_none());
        assert!(catalog.custom(6, "owner").is_none());
    }

    #[test]
    fn test_duplicate_rejected() {
        let toml = r#"
[[roles]]
slug = "ops"
name = "Ops"

[[roles]]
slug = "ops"
name = "Ops again"
"#;
        assert!(matches!(RoleCatalog::parse(toml), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_empty_name_rejected() {
        let toml = r#"
[[roles]]
slug = "ops"
name = ""
"#;
        assert!(matches!(RoleCatalog::parse(toml), Err(Error::InvalidRole(_))));
    }

    #[test]
    fn test_unknown_capability_is_parse_error() {
        let toml = r#"
[[roles]]
slug = "ops"
name = "Ops"
permissions = ["deploy"]
"#;
        assert!(matches!(RoleCatalog::parse(toml), Err(Error::Parse(_))));
    }

    #[test]
    fn test_roles_for_project() {
        let catalog = RoleCatalog::parse(CATALOG).unwrap();
        let names: Vec<_> = catalog
            .roles_for(Some(3))
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["Deployer", "Deployer (project 3)"]);
        assert_eq!(catalog.roles_for(None).len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        let catalog = RoleCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.roles.len(), 3);
    }
}
