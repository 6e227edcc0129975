//! Capability checks for the project console.
//!
//! Core principle: **a check is one bitmask test over already-resolved
//! inputs.** Administrators pass, a resource's own mask shadows the actor's,
//! and the actor's mask is the fallback.

mod capability;
mod catalog;
mod error;
mod evaluator;
mod role;

pub use capability::{Capability, Permissions};
pub use catalog::RoleCatalog;
pub use error::{Error, Result};
pub use evaluator::{Actor, Decision, Resource, Tier, can_perform, evaluate};
pub use role::{ProjectRole, Role, validate_role};
