//! Permission backend for forumbridge.
//!
//! The backend answers a single question: does this user hold this
//! capability? [`RoleBackend`] answers it from a user -> role table.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::user::{Role, UserId};
use crate::content::{
    EDIT_FORUMS, EDIT_REPLIES, EDIT_TOPICS, PUBLISH_REPLIES, PUBLISH_TOPICS, READ,
    READ_HIDDEN_FORUMS, READ_PRIVATE_FORUMS,
};
use crate::{BridgeError, Result};

/// Capability-check primitive.
pub trait PermissionBackend {
    /// Check whether `user` holds `capability`, optionally against a
    /// specific object.
    fn user_can(&self, user: UserId, capability: &str, object_id: Option<i64>) -> bool;
}

/// Minimum role holding a capability, or `None` for unknown capabilities.
pub fn required_role(capability: &str) -> Option<Role> {
    match capability {
        READ => Some(Role::Guest),
        READ_PRIVATE_FORUMS | PUBLISH_TOPICS | PUBLISH_REPLIES => Some(Role::Participant),
        READ_HIDDEN_FORUMS | EDIT_TOPICS | EDIT_REPLIES => Some(Role::Moderator),
        EDIT_FORUMS => Some(Role::Keymaster),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: i64,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct UserFile {
    #[serde(default)]
    users: Vec<UserEntry>,
}

/// Role-based permission backend.
///
/// Users missing from the table, and the anonymous sentinel, are guests.
#[derive(Debug, Clone, Default)]
pub struct RoleBackend {
    roles: HashMap<UserId, Role>,
}

impl RoleBackend {
    /// Create a backend with no registered users.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load user roles from a TOML fixture file (`[[users]]` tables).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse user roles from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        let file: UserFile = toml::from_str(s)
            .map_err(|e| BridgeError::Fixture(format!("user parse error: {e}")))?;

        let mut backend = Self::new();
        for entry in file.users {
            backend.set_role(UserId(entry.id), entry.role);
        }
        debug!("Loaded {} user roles", backend.roles.len());
        Ok(backend)
    }

    /// Assign a role to a user. The anonymous sentinel always stays a guest.
    pub fn set_role(&mut self, user: UserId, role: Role) {
        if !user.is_anonymous() {
            self.roles.insert(user, role);
        }
    }

    /// Builder-style role assignment.
    pub fn with_role(mut self, user: UserId, role: Role) -> Self {
        self.set_role(user, role);
        self
    }

    /// Effective role of a user.
    pub fn role(&self, user: UserId) -> Role {
        self.roles.get(&user).copied().unwrap_or(Role::Guest)
    }
}

impl PermissionBackend for RoleBackend {
    fn user_can(&self, user: UserId, capability: &str, _object_id: Option<i64>) -> bool {
        match required_role(capability) {
            Some(required) => self.role(user).can_access(required),
            None => false,
        }
    }
}
