//! Forum content-source adapter.
//!
//! [`ForumAdapter`] composes the identity resolver, the permission
//! evaluator and the batch validator behind the host's [`ContentSource`]
//! contract.

use std::str::FromStr;

use serde_json::{json, Value};
use tracing::{info, warn};

use crate::access::{PermissionBackend, PermissionEvaluator, UserId, Verdict};
use crate::batch::{BatchValidator, RequestMeta, ResponseMeta};
use crate::config::{
    option_flag, ForumConfig, OPTION_ALLOW_ANONYMOUS, OPTION_ROOT_SECTION_ID,
    OPTION_ROOT_SECTION_PARENT_ID,
};
use crate::content::{
    CapabilityTable, ContentRecord, ContentRepository, ContentType, Intent, TypeMap,
};
use crate::host::{
    ContentRef, ContentSource, HookPoint, HookRegistry, OptionStore, PreparedItem, Schema,
    DEFAULT_PRIORITY,
};
use crate::resolver::IdentityResolver;
use crate::routing::UrlRouter;
use crate::Result;

/// Returned by the root-section accessors when the option is unset or
/// unreadable.
pub const UNSET_ID: i64 = -1;

/// Priority of the batch validation pass; runs after ordinary hooks.
pub const BATCH_VALIDATION_PRIORITY: i32 = DEFAULT_PRIORITY + 10;

/// Schema field describing an anonymous author.
pub const GUEST_IDENTITY_FIELD: &str = "guest_identity";

/// Hook names declared by [`ForumAdapter::register`].
pub const SCHEMA_HOOK: &str = "forum_guest_identity_schema";
pub const PREPARE_HOOK: &str = "forum_prepare_item";
pub const BATCH_HOOK: &str = "forum_batch_validation";

/// Adapter exposing forums, topics and replies as sections, posts and
/// comments.
pub struct ForumAdapter<'a> {
    repo: &'a dyn ContentRepository,
    backend: &'a dyn PermissionBackend,
    router: &'a dyn UrlRouter,
    options: &'a dyn OptionStore,
    types: TypeMap,
    capabilities: CapabilityTable,
    batch_namespace: String,
}

impl<'a> ForumAdapter<'a> {
    /// Create an adapter with the default type mapping and capability table.
    pub fn new(
        repo: &'a dyn ContentRepository,
        backend: &'a dyn PermissionBackend,
        router: &'a dyn UrlRouter,
        options: &'a dyn OptionStore,
    ) -> Self {
        Self {
            repo,
            backend,
            router,
            options,
            types: TypeMap::default(),
            capabilities: CapabilityTable::default(),
            batch_namespace: "/batch/v1".to_string(),
        }
    }

    /// Create an adapter using the type mapping and batch namespace of
    /// `config`. Options are still read through `options` at call time.
    pub fn from_config(
        repo: &'a dyn ContentRepository,
        backend: &'a dyn PermissionBackend,
        router: &'a dyn UrlRouter,
        options: &'a dyn OptionStore,
        config: &ForumConfig,
    ) -> Self {
        Self::new(repo, backend, router, options)
            .with_types(config.types.clone())
            .with_batch_namespace(config.batch_namespace.clone())
    }

    /// Replace the native type mapping.
    pub fn with_types(mut self, types: TypeMap) -> Self {
        self.types = types;
        self
    }

    /// Replace the capability table.
    pub fn with_capabilities(mut self, capabilities: CapabilityTable) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replace the batch-execution route prefix.
    pub fn with_batch_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.batch_namespace = namespace.into();
        self
    }

    fn resolver(&self) -> IdentityResolver<'_> {
        IdentityResolver::new(self.repo, self.router, &self.types)
    }

    fn evaluator(&self) -> PermissionEvaluator<'_> {
        PermissionEvaluator::new(
            self.repo,
            self.backend,
            self.options,
            &self.types,
            &self.capabilities,
        )
    }

    fn batch_validator(&self) -> BatchValidator<'_> {
        BatchValidator::new(self.repo, &self.types, &self.batch_namespace)
    }

    /// Native type tags of the three content types.
    pub fn entity_types(&self) -> &TypeMap {
        &self.types
    }

    /// Capability required for an action, if any.
    pub fn capability(&self, content_type: ContentType, intent: Intent) -> Option<&'static str> {
        self.capabilities.capability(content_type, intent)
    }

    /// ID of the root section, or [`UNSET_ID`].
    pub fn root_section_id(&self) -> i64 {
        self.option_id(OPTION_ROOT_SECTION_ID)
    }

    /// Parent ID of the root section, or [`UNSET_ID`].
    pub fn root_section_parent_id(&self) -> i64 {
        self.option_id(OPTION_ROOT_SECTION_PARENT_ID)
    }

    fn option_id(&self, name: &str) -> i64 {
        match self.options.option(name) {
            Ok(Some(value)) => value.trim().parse().unwrap_or_else(|_| {
                warn!("Option {} is not an id: {}", name, value);
                UNSET_ID
            }),
            Ok(None) => UNSET_ID,
            Err(e) => {
                warn!("Failed to read option {}: {}", name, e);
                UNSET_ID
            }
        }
    }

    /// Whether `user` is an anonymous caller with guest participation on.
    pub fn is_guest_participant(&self, user: UserId) -> bool {
        user.is_anonymous() && option_flag(self.options, OPTION_ALLOW_ANONYMOUS)
    }

    /// Evaluate a permission and report the deciding rule.
    pub fn evaluate(
        &self,
        user: UserId,
        intent: Intent,
        content_type: ContentType,
        content_id: i64,
    ) -> Verdict {
        self.evaluator()
            .evaluate(user, intent, content_type, content_id)
    }

    /// Schema extension hook: adds the guest identity field to post and
    /// comment schemas for anonymous callers when guest participation is on.
    pub fn extend_schema(&self, content_type: ContentType, user: UserId, schema: &mut Schema) {
        if content_type == ContentType::Section || !self.is_guest_participant(user) {
            return;
        }
        schema.add_field(
            GUEST_IDENTITY_FIELD,
            json!({
                "description": "Identity of an anonymous author.",
                "type": "object",
                "context": ["edit"],
                "properties": {
                    "name": { "type": "string" },
                    "email": { "type": "string", "format": "email" },
                    "url": { "type": "string", "format": "uri" }
                },
                "required": ["name", "email"]
            }),
        );
    }

    /// Prepare hook: adds content type, permalink and parent to an
    /// outbound item.
    pub fn prepare_item(
        &self,
        content_type: ContentType,
        record: &ContentRecord,
        item: &mut PreparedItem,
    ) {
        item.insert("content_type", Value::from(content_type.as_str()));
        item.insert(
            "link",
            Value::from(self.router.permalink(record).unwrap_or_default()),
        );
        item.insert("parent", Value::from(record.parent));
    }

    /// Response dispatch hook: batch reference validation.
    pub fn dispatch_response(&self, request: &RequestMeta, response: &mut ResponseMeta) {
        self.batch_validator().apply(request, response);
    }
}

impl ContentSource for ForumAdapter<'_> {
    fn get_content(&self, content_type: &str, id: i64) -> Result<Option<ContentRecord>> {
        let content_type = ContentType::from_str(content_type)?;
        Ok(self.resolver().get_content(content_type, id))
    }

    fn get_content_type(&self, record: &ContentRecord) -> Result<ContentType> {
        self.resolver().get_content_type(record)
    }

    fn get_link(&self, content_type: &str, id: i64) -> String {
        match ContentType::from_str(content_type) {
            Ok(content_type) => self.resolver().get_link(content_type, id),
            Err(_) => String::new(),
        }
    }

    fn resolve_incoming_url(&self, url: &str) -> Result<Option<ContentRef>> {
        self.resolver().resolve_incoming_url(url)
    }

    fn user_can(&self, user: UserId, intent: &str, content_type: &str, content_id: i64) -> bool {
        let (intent, content_type) =
            match (Intent::from_str(intent), ContentType::from_str(content_type)) {
                (Ok(i), Ok(t)) => (i, t),
                _ => {
                    warn!(
                        "Denying user_can with unknown intent/content type: {}/{}",
                        intent, content_type
                    );
                    return false;
                }
            };
        self.evaluate(user, intent, content_type, content_id).allowed
    }

    fn register(&self, hooks: &mut HookRegistry) {
        for content_type in [ContentType::Post, ContentType::Comment] {
            hooks.add(
                HookPoint::SchemaExtension(content_type),
                SCHEMA_HOOK,
                DEFAULT_PRIORITY,
            );
        }
        for content_type in ContentType::ALL {
            hooks.add(
                HookPoint::PrepareItem(content_type),
                PREPARE_HOOK,
                DEFAULT_PRIORITY,
            );
        }
        hooks.add(
            HookPoint::ResponseDispatch,
            BATCH_HOOK,
            BATCH_VALIDATION_PRIORITY,
        );
        info!(
            "Registered forum content source ({}/{}/{})",
            self.types.section, self.types.post, self.types.comment
        );
    }

    fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    fn permission_backend(&self) -> &dyn PermissionBackend {
        self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{Role, RoleBackend, Rule};
    use crate::content::{MemoryContentStore, SubType};
    use crate::routing::PermalinkRouter;
    use crate::BridgeError;

    fn create_test_store() -> MemoryContentStore {
        MemoryContentStore::new()
            .with(ContentRecord::new(1, "forum").with_slug("general"))
            .with(ContentRecord::new(2, "topic").with_slug("hello").with_parent(1))
            .with(ContentRecord::new(3, "reply").with_parent(2))
    }

    fn forum_config(allow_anonymous: bool) -> ForumConfig {
        ForumConfig {
            site_url: "https://example.org".to_string(),
            allow_anonymous,
            ..ForumConfig::default()
        }
    }

    #[test]
    fn test_root_section_ids_unset() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        assert_eq!(adapter.root_section_id(), UNSET_ID);
        assert_eq!(adapter.root_section_parent_id(), UNSET_ID);
    }

    #[test]
    fn test_root_section_ids_set() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = ForumConfig {
            root_section_id: Some(1),
            root_section_parent_id: Some(0),
            ..forum_config(false)
        };
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        assert_eq!(adapter.root_section_id(), 1);
        assert_eq!(adapter.root_section_parent_id(), 0);
    }

    struct BrokenOptions;

    impl OptionStore for BrokenOptions {
        fn option(&self, name: &str) -> Result<Option<String>> {
            match name {
                OPTION_ROOT_SECTION_ID => Err(BridgeError::Option("table missing".to_string())),
                _ => Ok(Some("not-a-number".to_string())),
            }
        }
    }

    #[test]
    fn test_root_section_ids_error_falls_back() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &BrokenOptions);

        assert_eq!(adapter.root_section_id(), UNSET_ID);
        assert_eq!(adapter.root_section_parent_id(), UNSET_ID);
    }

    #[test]
    fn test_entity_types_and_capabilities() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        assert_eq!(adapter.entity_types().native(ContentType::Post), "topic");
        assert_eq!(
            adapter.capability(ContentType::Section, Intent::Post),
            Some("publish_topics")
        );
        assert_eq!(adapter.capability(ContentType::Section, Intent::View), None);
    }

    #[test]
    fn test_extend_schema_for_guest() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(true);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        for content_type in [ContentType::Post, ContentType::Comment] {
            let mut schema = Schema::new();
            adapter.extend_schema(content_type, UserId::ANONYMOUS, &mut schema);
            assert!(schema.has_field(GUEST_IDENTITY_FIELD));
        }

        let mut schema = Schema::new();
        adapter.extend_schema(ContentType::Section, UserId::ANONYMOUS, &mut schema);
        assert!(!schema.has_field(GUEST_IDENTITY_FIELD));

        let mut schema = Schema::new();
        adapter.extend_schema(ContentType::Post, UserId(4), &mut schema);
        assert!(!schema.has_field(GUEST_IDENTITY_FIELD));
    }

    #[test]
    fn test_extend_schema_guest_posting_disabled() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        let mut schema = Schema::new();
        adapter.extend_schema(ContentType::Comment, UserId::ANONYMOUS, &mut schema);
        assert!(!schema.has_field(GUEST_IDENTITY_FIELD));
    }

    #[test]
    fn test_prepare_item() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        let topic = store.find(2).unwrap();
        let mut item = PreparedItem::new(topic.id);
        adapter.prepare_item(ContentType::Post, &topic, &mut item);

        assert_eq!(item.get("content_type"), Some(&json!("post")));
        assert_eq!(
            item.get("link"),
            Some(&json!("https://example.org/forums/topic/hello/"))
        );
        assert_eq!(item.get("parent"), Some(&json!(1)));

        let forum = store.find(1).unwrap();
        let mut item = PreparedItem::new(forum.id);
        adapter.prepare_item(ContentType::Section, &forum, &mut item);
        assert_eq!(item.get("parent"), Some(&Value::Null));
    }

    #[test]
    fn test_register_hooks() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        let mut hooks = HookRegistry::new();
        hooks.add(HookPoint::ResponseDispatch, "envelope", DEFAULT_PRIORITY);
        adapter.register(&mut hooks);

        assert_eq!(hooks.len(), 7);
        assert!(hooks
            .hooks_for(HookPoint::SchemaExtension(ContentType::Section))
            .is_empty());
        for content_type in ContentType::ALL {
            assert_eq!(hooks.hooks_for(HookPoint::PrepareItem(content_type)).len(), 1);
        }

        let dispatch: Vec<_> = hooks
            .hooks_for(HookPoint::ResponseDispatch)
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(dispatch, vec!["envelope", BATCH_HOOK]);
    }

    #[test]
    fn test_user_can_unknown_strings_denied() {
        let store = create_test_store();
        let backend = RoleBackend::new().with_role(UserId(1), Role::Keymaster);
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        assert!(!adapter.user_can(UserId(1), "delete", "post", 2));
        assert!(!adapter.user_can(UserId(1), "view", "page", 2));
        assert!(adapter.user_can(UserId(1), "edit", "post", 2));
    }

    #[test]
    fn test_get_content_unknown_type() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(false);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        assert!(matches!(
            adapter.get_content("page", 1),
            Err(BridgeError::UnknownContentType(_))
        ));
        assert_eq!(adapter.get_link("page", 1), "");
    }

    #[test]
    fn test_custom_types_from_config() {
        let store = MemoryContentStore::new().with(ContentRecord::new(8, "bb_forum"));
        let backend = RoleBackend::new();
        let config = ForumConfig {
            types: TypeMap {
                section: "bb_forum".to_string(),
                post: "bb_topic".to_string(),
                comment: "bb_reply".to_string(),
            },
            batch_namespace: "/batch/v2".to_string(),
            ..forum_config(false)
        };
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::from_config(&store, &backend, &router, &config, &config);

        let record = adapter.get_content("section", 8).unwrap().unwrap();
        assert_eq!(adapter.get_content_type(&record).unwrap(), ContentType::Section);

        let request = RequestMeta::new("/forums")
            .with_outer_route("/batch/v2")
            .with_expected(SubType::Forum, [8, 9]);
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&request, &mut response);
        assert_eq!(response.rejected(SubType::Forum), None);

        let request = RequestMeta::new("/forums").with_expected(SubType::Forum, [8, 9]);
        adapter.dispatch_response(&request, &mut response);
        assert_eq!(response.rejected(SubType::Forum), Some(vec![9]));
    }

    #[test]
    fn test_evaluate_reports_rule() {
        let store = create_test_store();
        let backend = RoleBackend::new();
        let config = forum_config(true);
        let router = PermalinkRouter::from_config(&store, &config).unwrap();
        let adapter = ForumAdapter::new(&store, &backend, &router, &config);

        let verdict = adapter.evaluate(UserId::ANONYMOUS, Intent::Comment, ContentType::Post, 2);
        assert_eq!(verdict.rule, Rule::GuestOverride);
        assert!(verdict.allowed);
    }
}
