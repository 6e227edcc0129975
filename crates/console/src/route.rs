//! Resource context extracted from console paths.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The resource a check is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    Global,
    Project { project_id: u64 },
    Template { project_id: u64, template_id: u64 },
}

impl Scope {
    pub fn project_id(&self) -> Option<u64> {
        match *self {
            Scope::Global => None,
            Scope::Project { project_id } | Scope::Template { project_id, .. } => Some(project_id),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Global => f.write_str("global"),
            Scope::Project { project_id } => write!(f, "project:{project_id}"),
            Scope::Template {
                project_id,
                template_id,
            } => write!(f, "project:{project_id}/template:{template_id}"),
        }
    }
}

/// Where the user is in the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub path: String,
    pub scope: Scope,
    pub view_id: Option<u64>,
    pub integration_id: Option<u64>,
}

impl NavigationContext {
    pub fn global() -> Self {
        Self::scoped(Scope::Global)
    }

    pub fn scoped(scope: Scope) -> Self {
        Self {
            path: String::new(),
            scope,
            view_id: None,
            integration_id: None,
        }
    }

    /// Parse a console path such as `/project/3/templates/9/tasks`.
    ///
    /// Paths outside `/project/:projectId` (and `/project/new`,
    /// `/project/restore`) are global.
    pub fn parse(path: &str) -> Result<Self> {
        let clean = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = clean.split('/').filter(|s| !s.is_empty()).collect();

        let mut ctx = Self {
            path: clean.to_string(),
            ..Self::global()
        };

        let (project_id, rest) = match segments.as_slice() {
            ["project", "new" | "restore", ..] => return Ok(ctx),
            ["project", project, rest @ ..] => (id(path, "project", project)?, rest),
            _ => return Ok(ctx),
        };
        ctx.scope = Scope::Project { project_id };

        let rest = match rest {
            ["views", view, tail @ ..] => {
                ctx.view_id = Some(id(path, "view", view)?);
                tail
            }
            _ => rest,
        };

        match rest {
            ["templates", template, ..] => {
                ctx.scope = Scope::Template {
                    project_id,
                    template_id: id(path, "template", template)?,
                };
            }
            ["integrations", integration, ..] => {
                ctx.integration_id = Some(id(path, "integration", integration)?);
            }
            _ => {}
        }

        Ok(ctx)
    }
}

fn id(path: &str, what: &str, segment: &str) -> Result<u64> {
    segment.parse().map_err(|_| Error::InvalidRoute {
        path: path.to_string(),
        reason: format!("{what} id '{segment}' is not a number"),
    })
}
