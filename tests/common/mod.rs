//! Test helpers for adapter integration tests.
//!
//! Provides a fixture forum and a helper that wires the adapter over it.

#![allow(dead_code)]

use forumbridge::{ForumAdapter, ForumConfig, MemoryContentStore, PermalinkRouter, RoleBackend};

/// Keymaster user ID.
pub const KEYMASTER: i64 = 1;
/// Moderator user ID.
pub const MODERATOR: i64 = 2;
/// Participant user ID.
pub const PARTICIPANT: i64 = 3;
/// Registered user with only the guest role.
pub const SPECTATOR: i64 = 4;

/// Fixture records and users.
///
/// Sections: 1 open, 2 closed, 3 hidden, 4 private.
/// Posts: 10 open, 11 closed, 12 pending.
/// Comments: 20 published, 21 pending, 22 spam.
/// Record 30 is of a foreign type.
pub const FIXTURE: &str = r#"
[[records]]
id = 1
type = "forum"
slug = "general"
title = "General"

[[records]]
id = 2
type = "forum"
slug = "archive"
title = "Archive"
closed = true

[[records]]
id = 3
type = "forum"
slug = "staff"
title = "Staff"
hidden = true

[[records]]
id = 4
type = "forum"
slug = "members"
title = "Members"
private = true

[[records]]
id = 10
type = "topic"
slug = "welcome"
title = "Welcome"
parent = 1
author = 3
created_at = "2024-03-01T12:00:00Z"

[[records]]
id = 11
type = "topic"
slug = "old-news"
title = "Old news"
parent = 2
closed = true

[[records]]
id = 12
type = "topic"
slug = "draft-topic"
status = "pending"
parent = 1

[[records]]
id = 20
type = "reply"
slug = "reply-20"
parent = 10

[[records]]
id = 21
type = "reply"
status = "pending"
parent = 10

[[records]]
id = 22
type = "reply"
status = "spam"
parent = 10

[[records]]
id = 30
type = "page"
slug = "about"

[[users]]
id = 1
role = "keymaster"

[[users]]
id = 2
role = "moderator"

[[users]]
id = 3
role = "participant"

[[users]]
id = 4
role = "guest"
"#;

/// Fixture forum with its configuration.
pub struct TestForum {
    pub store: MemoryContentStore,
    pub backend: RoleBackend,
    pub config: ForumConfig,
}

impl TestForum {
    /// Create the fixture forum with guest participation off.
    pub fn new() -> Self {
        Self {
            store: MemoryContentStore::parse(FIXTURE).unwrap(),
            backend: RoleBackend::parse(FIXTURE).unwrap(),
            config: ForumConfig {
                site_url: "https://example.org".to_string(),
                ..ForumConfig::default()
            },
        }
    }

    /// Switch guest participation on.
    pub fn with_anonymous(mut self) -> Self {
        self.config.allow_anonymous = true;
        self
    }

    /// Run `f` against an adapter wired over this forum.
    pub fn with_adapter<R>(&self, f: impl FnOnce(&ForumAdapter<'_>) -> R) -> R {
        let router = PermalinkRouter::from_config(&self.store, &self.config).unwrap();
        let adapter = ForumAdapter::from_config(
            &self.store,
            &self.backend,
            &router,
            &self.config,
            &self.config,
        );
        f(&adapter)
    }
}
