//! The gate between UI affordances and the evaluator.

use crate::directory::PermissionSource;
use crate::route::{NavigationContext, Scope};
use crate::session::SessionState;
use crate::{Error, Result};
use policy::{Actor, Capability, Decision, Permissions, Resource, evaluate};
use std::sync::Mutex;
use storage::{AuditEvent, AuditStore};
use tracing::{debug, warn};

/// How a control is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Enabled,
    Disabled,
    Hidden,
}

/// What a denied control turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    #[default]
    Disable,
    Hide,
}

/// Resolves the actor and resource for each check and evaluates it.
pub struct Gate<S> {
    session: SessionState,
    source: S,
    audit: Option<Mutex<AuditStore>>,
}

impl<S: PermissionSource> Gate<S> {
    pub fn new(session: SessionState, source: S) -> Self {
        Self {
            session,
            source,
            audit: None,
        }
    }

    /// Record every check in `store`.
    pub fn with_audit(mut self, store: AuditStore) -> Self {
        self.audit = Some(Mutex::new(store));
        self
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn set_session(&mut self, session: SessionState) {
        self.session = session;
    }

    /// The actor for a scope. Anonymous until the session is authenticated.
    pub fn actor(&self, scope: &Scope) -> Actor {
        match self.session.user() {
            Some(user) => Actor {
                is_admin: user.admin,
                permissions: self.source.actor_permissions(user, scope),
            },
            None => Actor::anonymous(),
        }
    }

    pub fn resource(&self, scope: &Scope) -> Resource {
        match self.session.user() {
            Some(user) => Resource::from(self.source.resource_permissions(user, scope)),
            None => Resource::unscoped(),
        }
    }

    /// Evaluate a check and record it. An empty set is rejected instead
    /// of passing.
    pub fn decide(&self, ctx: &NavigationContext, required: Permissions) -> Result<Decision> {
        if required.is_empty() {
            return Err(Error::EmptyRequirement);
        }
        Ok(self.check(ctx, required))
    }

    pub fn can(&self, ctx: &NavigationContext, capability: Capability) -> bool {
        self.check(ctx, capability.bit()).is_allowed()
    }

    /// Check a composite set. An empty set is rejected instead of passing.
    pub fn can_all(&self, ctx: &NavigationContext, required: Permissions) -> Result<bool> {
        self.decide(ctx, required).map(|d| d.is_allowed())
    }

    pub fn affordance(
        &self,
        ctx: &NavigationContext,
        capability: Capability,
        fallback: Fallback,
    ) -> Affordance {
        match (self.can(ctx, capability), fallback) {
            (true, _) => Affordance::Enabled,
            (false, Fallback::Disable) => Affordance::Disabled,
            (false, Fallback::Hide) => Affordance::Hidden,
        }
    }

    fn check(&self, ctx: &NavigationContext, required: Permissions) -> Decision {
        let actor = self.actor(&ctx.scope);
        let resource = self.resource(&ctx.scope);
        let decision = evaluate(&actor, &resource, required);

        debug!(
            actor = self.session.label(),
            scope = %ctx.scope,
            required = %required,
            allowed = decision.is_allowed(),
            tier = %decision.tier(),
            "capability check"
        );

        self.record(ctx, required, decision);
        decision
    }

    fn record(&self, ctx: &NavigationContext, required: Permissions, decision: Decision) {
        let Some(audit) = &self.audit else {
            return;
        };

        let event = AuditEvent::new(
            self.session.label(),
            ctx.scope.to_string(),
            required,
            decision,
        );
        match audit.lock() {
            Ok(store) => {
                if let Err(e) = store.append(&event) {
                    warn!(error = %e, "failed to record capability check");
                }
            }
            Err(_) => warn!("audit store lock poisoned; check not recorded"),
        }
    }
}
