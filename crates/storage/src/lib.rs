//! SQLite-backed audit trail for capability checks.
//!
//! The evaluator in the `policy` crate is pure and has no observable output.
//! This crate records checks made at the call site so that "why was this
//! button disabled?" can be answered after the fact.
//!
//! # Core Concepts
//!
//! ## AuditStore
//!
//! The [`AuditStore`] wraps a SQLite database. It appends checks and answers
//! queries over recent checks, one actor's checks, and per-actor totals.
//!
//! ## AuditEvent
//!
//! An [`AuditEvent`] captures one check:
//! - A unique ID and a timestamp
//! - The actor's username and the scope label of the resource
//! - The required capabilities
//! - The [`Outcome`], including the deciding tier and any missing bits
//!
//! # Example
//!
//! ```no_run
//! use policy::{Actor, Capability, Resource, evaluate};
//! use storage::{AuditEvent, AuditStore};
//!
//! let store = AuditStore::open("audit.db")?;
//!
//! let actor = Actor::anonymous();
//! let decision = evaluate(&actor, &Resource::unscoped(), Capability::RunTasks);
//! store.append(&AuditEvent::new("anonymous", "global", Capability::RunTasks.bit(), decision))?;
//!
//! for event in store.recent(20, true)? {
//!     println!("{} {} {:?}", event.timestamp, event.actor, event.outcome);
//! }
//! # Ok::<(), storage::Error>(())
//! ```

mod error;
mod event;
mod store;

pub use error::{Error, Result};
pub use event::{AuditEvent, Outcome};
pub use store::{ActorSummary, AuditStore};
