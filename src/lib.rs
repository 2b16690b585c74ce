//! forumbridge - Forum content-source adapter
//!
//! Exposes forums, topics and replies to a generic REST layer as sections,
//! posts and comments, with forum permission rules and batch reference
//! validation.

pub mod access;
pub mod adapter;
pub mod batch;
pub mod config;
pub mod content;
pub mod error;
pub mod host;
pub mod logging;
pub mod resolver;
pub mod routing;

pub use access::{PermissionBackend, PermissionEvaluator, Role, RoleBackend, Rule, UserId, Verdict};
pub use adapter::ForumAdapter;
pub use batch::{BatchValidator, RequestMeta, ResponseMeta};
pub use config::{Config, ForumConfig};
pub use content::{
    CapabilityTable, ContentRecord, ContentRepository, ContentType, Intent, MemoryContentStore,
    PostStatus, SubType, TypeMap,
};
pub use error::{BridgeError, Result};
pub use host::{ContentRef, ContentSource, HookPoint, HookRegistry, OptionStore};
pub use resolver::IdentityResolver;
pub use routing::{PermalinkRouter, UrlRouter};
