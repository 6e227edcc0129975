//! Audit event types.

use chrono::{DateTime, Utc};
use policy::{Decision, Permissions, Tier};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a recorded check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Allow { tier: Tier },
    Deny { tier: Tier, missing: Permissions },
}

impl Outcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Outcome::Allow { .. })
    }

    pub fn tier(&self) -> Tier {
        match *self {
            Outcome::Allow { tier } | Outcome::Deny { tier, .. } => tier,
        }
    }
}

impl From<Decision> for Outcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allow { tier } => Outcome::Allow { tier },
            Decision::Deny { tier, missing } => Outcome::Deny { tier, missing },
        }
    }
}

/// One capability check as seen at the call site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Username of the actor, or `anonymous` while identity is resolving.
    pub actor: String,
    /// Resource scope label, e.g. `project:3/template:9`.
    pub scope: String,
    pub required: Permissions,
    pub outcome: Outcome,
}

impl AuditEvent {
    pub fn new(
        actor: impl Into<String>,
        scope: impl Into<String>,
        required: Permissions,
        decision: Decision,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: actor.into(),
            scope: scope.into(),
            required,
            outcome: decision.into(),
        }
    }
}
