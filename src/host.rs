//! Host contract for forumbridge.
//!
//! The generic REST layer consumes content sources through
//! [`ContentSource`] and lets them hook into its request lifecycle through a
//! [`HookRegistry`].

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::access::{PermissionBackend, UserId};
use crate::content::{CapabilityTable, ContentRecord, ContentType, Intent};
use crate::Result;

/// Priority of ordinary hooks.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Named configuration values read at call time.
pub trait OptionStore {
    /// Read an option. `Ok(None)` when unset.
    fn option(&self, name: &str) -> Result<Option<String>>;
}

/// Host-level identity of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentRef {
    pub content_type: ContentType,
    pub id: i64,
}

/// Generic permission rule shared by all content sources.
///
/// Looks up the capability for `(content_type, intent)`; when one is mapped
/// the backend decides against the content ID, otherwise only `view` is
/// allowed.
pub fn base_user_can(
    capabilities: &CapabilityTable,
    backend: &dyn PermissionBackend,
    user: UserId,
    intent: Intent,
    content_type: ContentType,
    content_id: i64,
) -> bool {
    match capabilities.capability(content_type, intent) {
        Some(capability) => backend.user_can(user, capability, Some(content_id)),
        None => intent == Intent::View,
    }
}

/// Contract a content source satisfies toward the host.
pub trait ContentSource {
    /// Fetch the record of `content_type` with `id`.
    fn get_content(&self, content_type: &str, id: i64) -> Result<Option<ContentRecord>>;

    /// Host content type of a record.
    fn get_content_type(&self, record: &ContentRecord) -> Result<ContentType>;

    /// Public permalink, or an empty string when none can be produced.
    fn get_link(&self, content_type: &str, id: i64) -> String;

    /// Map a public URL back to a content identity.
    fn resolve_incoming_url(&self, url: &str) -> Result<Option<ContentRef>>;

    /// Decide whether `user` may perform `intent` on the given content.
    fn user_can(&self, user: UserId, intent: &str, content_type: &str, content_id: i64) -> bool;

    /// Declare lifecycle hooks.
    fn register(&self, hooks: &mut HookRegistry);

    /// Capability table of this source.
    fn capabilities(&self) -> &CapabilityTable;

    /// Capability-check primitive of this source.
    fn permission_backend(&self) -> &dyn PermissionBackend;

    /// The generic permission rule, see [`base_user_can`].
    fn base_user_can(
        &self,
        user: UserId,
        intent: Intent,
        content_type: ContentType,
        content_id: i64,
    ) -> bool {
        base_user_can(
            self.capabilities(),
            self.permission_backend(),
            user,
            intent,
            content_type,
            content_id,
        )
    }
}

/// Lifecycle point a hook attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Item schema construction for a content type.
    SchemaExtension(ContentType),
    /// Per-item response preparation for a content type.
    PrepareItem(ContentType),
    /// Final pass over the outbound response.
    ResponseDispatch,
}

/// A declared hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hook {
    pub point: HookPoint,
    pub name: &'static str,
    /// Lower runs first.
    pub priority: i32,
}

/// Hooks declared by content sources.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    hooks: Vec<Hook>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a hook.
    pub fn add(&mut self, point: HookPoint, name: &'static str, priority: i32) {
        self.hooks.push(Hook {
            point,
            name,
            priority,
        });
    }

    /// Hooks attached to `point`, in run order. Equal priorities keep
    /// declaration order.
    pub fn hooks_for(&self, point: HookPoint) -> Vec<&Hook> {
        let mut hooks: Vec<&Hook> = self.hooks.iter().filter(|h| h.point == point).collect();
        hooks.sort_by_key(|h| h.priority);
        hooks
    }

    /// Total number of declared hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Check if no hooks are declared.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Item schema of a content type, as JSON-schema property fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: BTreeMap<String, Value>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field.
    pub fn add_field(&mut self, name: impl Into<String>, definition: Value) {
        self.fields.insert(name.into(), definition);
    }

    /// Get a field definition.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Check if a field is defined.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// Outbound representation of one content item.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedItem {
    pub id: i64,
    pub data: Map<String, Value>,
}

impl PreparedItem {
    /// Create an item with no fields.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            data: Map::new(),
        }
    }

    /// Set a field.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}
