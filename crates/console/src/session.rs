//! Session state: who is looking at the console.

use serde::{Deserialize, Serialize};

/// A signed-in console user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub admin: bool,
}

/// Identity as currently known to the console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Identity resolution has not completed. Checks fail closed.
    #[default]
    Resolving,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Resolving => None,
            SessionState::Authenticated(user) => Some(user),
        }
    }

    /// Name recorded in logs and audit rows.
    pub fn label(&self) -> &str {
        self.user().map_or("anonymous", |u| u.username.as_str())
    }
}

impl From<User> for SessionState {
    fn from(user: User) -> Self {
        SessionState::Authenticated(user)
    }
}
