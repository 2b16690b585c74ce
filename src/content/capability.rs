//! Capability table for forumbridge.
//!
//! Maps each (content type, intent) pair to zero or one capability name.

use std::collections::BTreeMap;

use super::types::{ContentType, Intent};

/// Capability required to publish a topic into a forum.
pub const PUBLISH_TOPICS: &str = "publish_topics";
/// Capability required to reply to a topic.
pub const PUBLISH_REPLIES: &str = "publish_replies";
/// Capability required to read published topics and replies.
pub const READ: &str = "read";
/// Capability required to read a private forum.
pub const READ_PRIVATE_FORUMS: &str = "read_private_forums";
/// Capability required to read a hidden forum.
pub const READ_HIDDEN_FORUMS: &str = "read_hidden_forums";
/// Capability required to edit a forum.
pub const EDIT_FORUMS: &str = "edit_forums";
/// Capability required to edit a topic.
pub const EDIT_TOPICS: &str = "edit_topics";
/// Capability required to edit a reply.
pub const EDIT_REPLIES: &str = "edit_replies";

/// Immutable (content type, intent) -> capability mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityTable {
    entries: BTreeMap<(ContentType, Intent), &'static str>,
}

impl Default for CapabilityTable {
    fn default() -> Self {
        Self::new([
            ((ContentType::Section, Intent::Post), PUBLISH_TOPICS),
            ((ContentType::Section, Intent::Edit), EDIT_FORUMS),
            ((ContentType::Post, Intent::View), READ),
            ((ContentType::Post, Intent::Edit), EDIT_TOPICS),
            ((ContentType::Post, Intent::Comment), PUBLISH_REPLIES),
            ((ContentType::Comment, Intent::View), READ),
            ((ContentType::Comment, Intent::Edit), EDIT_REPLIES),
            ((ContentType::Comment, Intent::Comment), PUBLISH_REPLIES),
        ])
    }
}

impl CapabilityTable {
    /// Build a table from explicit entries.
    pub fn new(entries: impl IntoIterator<Item = ((ContentType, Intent), &'static str)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Capability required for an action, if any.
    pub fn capability(&self, content_type: ContentType, intent: Intent) -> Option<&'static str> {
        self.entries.get(&(content_type, intent)).copied()
    }

    /// Iterate over all entries, ordered by content type then intent.
    pub fn iter(&self) -> impl Iterator<Item = (ContentType, Intent, &'static str)> + '_ {
        self.entries.iter().map(|(&(t, i), &cap)| (t, i, cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_forum_actions() {
        let table = CapabilityTable::default();
        assert_eq!(
            table.capability(ContentType::Section, Intent::Post),
            Some(PUBLISH_TOPICS)
        );
        assert_eq!(
            table.capability(ContentType::Post, Intent::Comment),
            Some(PUBLISH_REPLIES)
        );
    }

    #[test]
    fn test_default_table_unmapped_pairs() {
        let table = CapabilityTable::default();
        assert_eq!(table.capability(ContentType::Section, Intent::View), None);
        assert_eq!(table.capability(ContentType::Section, Intent::Comment), None);
        assert_eq!(table.capability(ContentType::Post, Intent::Post), None);
        assert_eq!(table.capability(ContentType::Comment, Intent::Post), None);
    }

    #[test]
    fn test_table_covers_at_most_one_capability_per_pair() {
        let table = CapabilityTable::default();
        assert_eq!(table.iter().count(), 8);

        let custom = CapabilityTable::new([
            ((ContentType::Post, Intent::View), READ),
            ((ContentType::Post, Intent::View), EDIT_TOPICS),
        ]);
        assert_eq!(custom.capability(ContentType::Post, Intent::View), Some(EDIT_TOPICS));
    }
}
