//! Access control for forumbridge.
//!
//! This module provides:
//! - User identities, with `0` reserved for anonymous callers
//! - Forum roles and the role-based permission backend
//! - The permission evaluator deciding view/post/edit/comment access

mod backend;
mod evaluator;
mod user;

pub use backend::{required_role, PermissionBackend, RoleBackend};
pub use evaluator::{PermissionEvaluator, Rule, Verdict};
pub use user::{Role, UserId};
