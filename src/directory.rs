//! The in-memory user directory.
//!
//! Records keep insertion order. Every mutation follows the same lifecycle:
//! look the record up, validate the input, mutate in place, hand the record
//! back. Nothing is persisted; the directory lives as long as the process.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::validation::{ValidationError, validate_name};

/// Numeric user identifier.
pub type UserId = u32;

/// A directory shared between request handlers.
pub type SharedDirectory = Arc<RwLock<UserDirectory>>;

/// One user record, serialized as `{"id": 1, "name": "Juan"}`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
}

/// Failures of the directory operations.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum UserError {
    #[error("user `{0}` not found")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no user ids left to assign")]
    IdsExhausted,
}

/// Ordered collection of users with a monotonic id counter.
#[derive(Debug)]
pub struct UserDirectory {
    users: Vec<User>,
    /// `None` once `UserId::MAX` has been handed out.
    next_id: Option<UserId>,
}

impl UserDirectory {
    /// An empty directory. The first created user gets id 1.
    pub fn new() -> Self {
        Self { users: Vec::new(), next_id: Some(1) }
    }

    /// The four users every process starts with.
    pub fn seeded() -> Self {
        Self::from_users(
            [(1, "Juan"), (2, "Pedro"), (3, "Ana"), (4, "Lucía")]
                .into_iter()
                .map(|(id, name)| User { id, name: name.to_owned() }),
        )
    }

    /// Builds a directory from existing records. New ids continue after the
    /// largest one present; if that is `UserId::MAX`, creation fails with
    /// [`UserError::IdsExhausted`].
    pub fn from_users(users: impl IntoIterator<Item = User>) -> Self {
        let users: Vec<User> = users.into_iter().collect();
        let next_id = users.iter().map(|u| u.id).max().map_or(Some(1), |max| max.checked_add(1));
        Self { users, next_id }
    }

    /// Wraps the directory for sharing across handlers.
    pub fn shared(self) -> SharedDirectory {
        Arc::new(RwLock::new(self))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// All users in insertion order.
    pub fn list(&self) -> &[User] {
        &self.users
    }

    /// Looks a user up by its textual id. Text that is not a valid id simply
    /// does not match.
    pub fn find(&self, id: &str) -> Option<&User> {
        let id = parse_id(id)?;
        self.users.iter().find(|u| u.id == id)
    }

    /// Validates `name` and appends a new user with a fresh id.
    ///
    /// Fails with [`UserError::IdsExhausted`] once every id has been used.
    pub fn create(&mut self, name: &str) -> Result<User, UserError> {
        let name = validate_name(name)?;
        let id = self.next_id.ok_or(UserError::IdsExhausted)?;
        let user = User { id, name };
        self.next_id = id.checked_add(1);
        self.users.push(user.clone());
        debug!(id = user.id, "user created");
        Ok(user)
    }

    /// Replaces the name of an existing user. On a validation failure the
    /// record is left untouched.
    pub fn update(&mut self, id: &str, name: &str) -> Result<User, UserError> {
        let pos = self.position(id)?;
        let name = validate_name(name)?;
        let user = &mut self.users[pos];
        user.name = name;
        debug!(id = user.id, "user updated");
        Ok(user.clone())
    }

    /// Removes the first user with `id` and returns it.
    pub fn remove(&mut self, id: &str) -> Result<User, UserError> {
        let pos = self.position(id)?;
        let user = self.users.remove(pos);
        debug!(id = user.id, "user removed");
        Ok(user)
    }

    fn position(&self, id: &str) -> Result<usize, UserError> {
        parse_id(id)
            .and_then(|n| self.users.iter().position(|u| u.id == n))
            .ok_or_else(|| UserError::NotFound(id.to_owned()))
    }
}

impl Default for UserDirectory {
    fn default() -> Self { Self::new() }
}

fn parse_id(id: &str) -> Option<UserId> {
    id.trim().parse().ok()
}
