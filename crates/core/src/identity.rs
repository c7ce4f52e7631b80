//! Identity lookup for the acting user.

use crate::models::User;

/// Supplies users by username.
pub trait IdentityProvider: Send + Sync {
    /// Find the user signing in as `username`.
    fn find_by_username(&self, username: &str) -> Option<User>;
}

/// Fixed user directory. There is no credential check.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    users: Vec<User>,
}

impl StaticDirectory {
    /// Directory over `users`.
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Every known user.
    pub fn users(&self) -> &[User] {
        &self.users
    }
}

impl IdentityProvider for StaticDirectory {
    fn find_by_username(&self, username: &str) -> Option<User> {
        let username = username.trim();
        self.users
            .iter()
            .find(|user| user.username == username)
            .cloned()
    }
}
