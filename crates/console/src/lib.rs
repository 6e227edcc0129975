//! Context adapter between the console UI and the capability evaluator.
//!
//! Each UI affordance that depends on a permission asks the [`Gate`]. The
//! gate reads two things, the session's user and the resource scope of the
//! current path, turns them into an actor and a resource through a
//! [`PermissionSource`], and calls [`policy::evaluate`].
//!
//! # Example
//!
//! ```
//! use console::{Directory, Gate, Membership, NavigationContext, SessionState, User};
//! use policy::{Capability, RoleCatalog};
//!
//! let directory = Directory::new(
//!     RoleCatalog::default(),
//!     vec![Membership { user_id: 1, project_id: 3, role: "task_runner".into() }],
//!     vec![],
//! )?;
//!
//! let user = User { id: 1, username: "alice".into(), admin: false };
//! let gate = Gate::new(SessionState::Authenticated(user), directory);
//!
//! let ctx = NavigationContext::parse("/project/3/templates/9/tasks")?;
//! assert!(gate.can(&ctx, Capability::RunTasks));
//! assert!(!gate.can(&ctx, Capability::ManageResources));
//! # Ok::<(), console::Error>(())
//! ```

mod directory;
mod error;
mod gate;
mod route;
mod session;

pub use directory::{Directory, Membership, PermissionSource, TemplateGrant};
pub use error::{Error, Result};
pub use gate::{Affordance, Fallback, Gate};
pub use route::{NavigationContext, Scope};
pub use session::{SessionState, User};
