//! Content module for forumbridge.
//!
//! This module provides the forum content model:
//! - Content types, sub-types, intents and statuses
//! - The native type mapping (forum/topic/reply)
//! - The (content type, intent) capability table
//! - The read-only content repository seam

mod capability;
mod repository;
mod types;

pub use capability::{
    CapabilityTable, EDIT_FORUMS, EDIT_REPLIES, EDIT_TOPICS, PUBLISH_REPLIES, PUBLISH_TOPICS,
    READ, READ_HIDDEN_FORUMS, READ_PRIVATE_FORUMS,
};
pub use repository::{ContentRepository, MemoryContentStore};
pub use types::{ContentRecord, ContentType, Intent, PostStatus, RecordFlags, SubType, TypeMap};
