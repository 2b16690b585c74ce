//! User identity and forum roles for forumbridge.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// User identity as seen by the host.
///
/// `0` is reserved for anonymous/guest callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
    /// The anonymous sentinel.
    pub const ANONYMOUS: UserId = UserId(0);

    /// Check if this is the anonymous sentinel.
    pub fn is_anonymous(&self) -> bool {
        *self == Self::ANONYMOUS
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Forum role for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Not logged in, or logged in without forum access.
    Guest = 0,
    /// Regular forum participant.
    #[default]
    Participant = 1,
    /// Forum moderator.
    Moderator = 2,
    /// Forum administrator.
    Keymaster = 3,
}

impl Role {
    /// Convert role to its string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Guest => "guest",
            Role::Participant => "participant",
            Role::Moderator => "moderator",
            Role::Keymaster => "keymaster",
        }
    }

    /// Check if this role has at least the required level.
    ///
    /// # Examples
    ///
    /// ```
    /// use forumbridge::access::Role;
    ///
    /// assert!(Role::Keymaster.can_access(Role::Participant));
    /// assert!(Role::Participant.can_access(Role::Participant));
    /// assert!(!Role::Guest.can_access(Role::Participant));
    /// ```
    pub fn can_access(&self, required: Role) -> bool {
        *self >= required
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "guest" => Ok(Role::Guest),
            "participant" => Ok(Role::Participant),
            "moderator" => Ok(Role::Moderator),
            "keymaster" => Ok(Role::Keymaster),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}
