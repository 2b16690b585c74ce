//! Content model for forumbridge.
//!
//! Forums, topics and replies are exposed to the host as a fixed three-level
//! hierarchy of sections, posts and comments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::access::UserId;
use crate::{BridgeError, Result};

/// Host-facing content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContentType {
    /// Top-level container (a forum).
    Section,
    /// Discussion thread inside a section (a topic).
    Post,
    /// Reply inside a post.
    Comment,
}

impl ContentType {
    /// All content types, parent first.
    pub const ALL: [ContentType; 3] = [ContentType::Section, ContentType::Post, ContentType::Comment];

    /// Convert content type to its host string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Section => "section",
            ContentType::Post => "post",
            ContentType::Comment => "comment",
        }
    }

    /// Request label of the forum sub-type backing this content type.
    pub fn sub_type(&self) -> SubType {
        match self {
            ContentType::Section => SubType::Forum,
            ContentType::Post => SubType::Topic,
            ContentType::Comment => SubType::Reply,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "section" => Ok(ContentType::Section),
            "post" => Ok(ContentType::Post),
            "comment" => Ok(ContentType::Comment),
            _ => Err(BridgeError::UnknownContentType(s.to_string())),
        }
    }
}

/// Forum sub-type label used in batch validation annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubType {
    Forum,
    Topic,
    Reply,
}

impl SubType {
    /// All sub-types, parent first.
    pub const ALL: [SubType; 3] = [SubType::Forum, SubType::Topic, SubType::Reply];

    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubType::Forum => "forum",
            SubType::Topic => "topic",
            SubType::Reply => "reply",
        }
    }

    /// Capitalized label used inside annotation names.
    pub fn title(&self) -> &'static str {
        match self {
            SubType::Forum => "Forum",
            SubType::Topic => "Topic",
            SubType::Reply => "Reply",
        }
    }

    /// Host content type this sub-type maps onto.
    pub fn content_type(&self) -> ContentType {
        match self {
            SubType::Forum => ContentType::Section,
            SubType::Topic => ContentType::Post,
            SubType::Reply => ContentType::Comment,
        }
    }
}

impl fmt::Display for SubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "forum" => Ok(SubType::Forum),
            "topic" => Ok(SubType::Topic),
            "reply" => Ok(SubType::Reply),
            _ => Err(format!("unknown sub-type: {s}")),
        }
    }
}

/// Action a user wants to perform on a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Intent {
    View,
    Post,
    Edit,
    Comment,
}

impl Intent {
    /// All intents.
    pub const ALL: [Intent; 4] = [Intent::View, Intent::Post, Intent::Edit, Intent::Comment];

    /// Convert intent to its host string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::View => "view",
            Intent::Post => "post",
            Intent::Edit => "edit",
            Intent::Comment => "comment",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "view" => Ok(Intent::View),
            "post" => Ok(Intent::Post),
            "edit" => Ok(Intent::Edit),
            "comment" => Ok(Intent::Comment),
            _ => Err(format!("unknown intent: {s}")),
        }
    }
}

/// Publication status of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Pending,
    Draft,
    Spam,
    Trash,
}

impl PostStatus {
    /// Convert status to its storage string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Pending => "pending",
            PostStatus::Draft => "draft",
            PostStatus::Spam => "spam",
            PostStatus::Trash => "trash",
        }
    }

    /// Whether records in this status are publicly visible.
    pub fn is_published(&self) -> bool {
        *self == PostStatus::Publish
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Visibility flags carried by sections and posts.
///
/// Comments have no hidden/private concept; flags on them are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct RecordFlags {
    /// No new topics/replies accepted.
    pub closed: bool,
    /// Visible only to users who can read hidden forums.
    pub hidden: bool,
    /// Visible only to users who can read private forums.
    pub private: bool,
}

/// A stored forum, topic or reply.
///
/// Owned by the content repository; the adapter only reads it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentRecord {
    /// Unique record ID.
    pub id: i64,
    /// Native type tag (e.g. "forum", "topic", "reply").
    #[serde(rename = "type")]
    pub native_type: String,
    /// Publication status.
    #[serde(default)]
    pub status: PostStatus,
    /// Parent record ID, if any.
    #[serde(default)]
    pub parent: Option<i64>,
    /// URL slug.
    #[serde(default)]
    pub slug: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Author user ID (0 for guest-authored content).
    #[serde(default)]
    pub author: UserId,
    /// Closed/hidden/private flags.
    #[serde(flatten)]
    pub flags: RecordFlags,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContentRecord {
    /// Create a published record with minimal fields.
    pub fn new(id: i64, native_type: impl Into<String>) -> Self {
        Self {
            id,
            native_type: native_type.into(),
            status: PostStatus::Publish,
            parent: None,
            slug: String::new(),
            title: String::new(),
            author: UserId::ANONYMOUS,
            flags: RecordFlags::default(),
            created_at: None,
        }
    }

    /// Set the status.
    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the parent ID.
    pub fn with_parent(mut self, parent: i64) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: UserId) -> Self {
        self.author = author;
        self
    }

    /// Mark as closed.
    pub fn closed(mut self) -> Self {
        self.flags.closed = true;
        self
    }

    /// Mark as hidden.
    pub fn hidden(mut self) -> Self {
        self.flags.hidden = true;
        self
    }

    /// Mark as private.
    pub fn private(mut self) -> Self {
        self.flags.private = true;
        self
    }

    /// Check if the record is published.
    pub fn is_published(&self) -> bool {
        self.status.is_published()
    }
}

/// Mapping between host content types and native type tags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TypeMap {
    /// Native tag for sections.
    #[serde(default = "default_section_type")]
    pub section: String,
    /// Native tag for posts.
    #[serde(default = "default_post_type")]
    pub post: String,
    /// Native tag for comments.
    #[serde(default = "default_comment_type")]
    pub comment: String,
}

fn default_section_type() -> String {
    "forum".to_string()
}

fn default_post_type() -> String {
    "topic".to_string()
}

fn default_comment_type() -> String {
    "reply".to_string()
}

impl Default for TypeMap {
    fn default() -> Self {
        Self {
            section: default_section_type(),
            post: default_post_type(),
            comment: default_comment_type(),
        }
    }
}

impl TypeMap {
    /// Native type tag for a content type.
    pub fn native(&self, content_type: ContentType) -> &str {
        match content_type {
            ContentType::Section => &self.section,
            ContentType::Post => &self.post,
            ContentType::Comment => &self.comment,
        }
    }

    /// Content type for a native type tag (case-sensitive).
    pub fn content_type(&self, native_type: &str) -> Result<ContentType> {
        ContentType::ALL
            .into_iter()
            .find(|t| self.native(*t) == native_type)
            .ok_or_else(|| BridgeError::UnknownContentType(native_type.to_string()))
    }
}
