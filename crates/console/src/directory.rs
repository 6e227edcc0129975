//! Project memberships and template grants.
//!
//! The console does not store permissions itself; whatever backs the
//! session supplies them through [`PermissionSource`]. [`Directory`] is the
//! in-process source used by the CLI and tests.

use crate::route::Scope;
use crate::session::User;
use crate::{Error, Result};
use policy::{Capability, Permissions, RoleCatalog};
use serde::{Deserialize, Serialize};

/// Supplies the two masks a check needs.
pub trait PermissionSource: Send + Sync {
    /// The user's own mask within `scope`.
    fn actor_permissions(&self, user: &User, scope: &Scope) -> Permissions;

    /// The resource override for `scope`, if it carries one.
    fn resource_permissions(&self, user: &User, scope: &Scope) -> Option<Permissions>;
}

/// A user's role in one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: u64,
    pub project_id: u64,
    /// Role slug, resolved through the catalog.
    pub role: String,
}

/// Permissions a custom role holds on one template, replacing its project
/// mask. Built-in roles carry no template grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateGrant {
    pub project_id: u64,
    pub template_id: u64,
    pub role: String,
    #[serde(default)]
    pub permissions: Vec<Capability>,
}

impl TemplateGrant {
    pub fn mask(&self) -> Permissions {
        self.permissions.iter().copied().collect()
    }
}

/// In-memory membership and grant tables.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    catalog: RoleCatalog,
    memberships: Vec<Membership>,
    grants: Vec<TemplateGrant>,
}

impl Directory {
    /// Build a directory, rejecting memberships and grants whose role does
    /// not resolve in their project, and grants on built-in roles.
    pub fn new(
        catalog: RoleCatalog,
        memberships: Vec<Membership>,
        grants: Vec<TemplateGrant>,
    ) -> Result<Self> {
        let roles = memberships
            .iter()
            .map(|m| (m.project_id, m.role.as_str()))
            .chain(grants.iter().map(|g| (g.project_id, g.role.as_str())));

        for (project_id, slug) in roles {
            if catalog.resolve(project_id, slug).is_none() {
                return Err(Error::UnknownRole {
                    slug: slug.to_string(),
                    project_id,
                });
            }
        }

        if let Some(grant) = grants
            .iter()
            .find(|g| catalog.custom(g.project_id, &g.role).is_none())
        {
            return Err(Error::BuiltinGrant {
                slug: grant.role.clone(),
                project_id: grant.project_id,
            });
        }

        Ok(Self {
            catalog,
            memberships,
            grants,
        })
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn membership(&self, user_id: u64, project_id: u64) -> Option<&Membership> {
        self.memberships
            .iter()
            .find(|m| m.user_id == user_id && m.project_id == project_id)
    }
}

impl PermissionSource for Directory {
    fn actor_permissions(&self, user: &User, scope: &Scope) -> Permissions {
        scope
            .project_id()
            .and_then(|project_id| {
                let member = self.membership(user.id, project_id)?;
                self.catalog.resolve(project_id, &member.role)
            })
            .unwrap_or(Permissions::NONE)
    }

    fn resource_permissions(&self, user: &User, scope: &Scope) -> Option<Permissions> {
        let Scope::Template {
            project_id,
            template_id,
        } = *scope
        else {
            return None;
        };

        let member = self.membership(user.id, project_id)?;
        self.catalog.custom(project_id, &member.role)?;
        self.grants
            .iter()
            .find(|g| {
                g.project_id == project_id && g.template_id == template_id && g.role == member.role
            })
            .map(TemplateGrant::mask)
    }
}
