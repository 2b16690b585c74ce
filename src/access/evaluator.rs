//! Permission evaluation for forumbridge.
//!
//! Every call is evaluated fresh from (user, intent, content type, content
//! id). Rules are tried in a fixed order and the first one that applies
//! decides:
//!
//! 1. posting into a section
//! 2. commenting on a post
//! 3. the guest override for 1 and 2
//! 4. viewing a section
//! 5. an anonymous caller viewing a post
//! 6. viewing a comment
//! 7. the generic capability rule of the host contract

use std::fmt;

use tracing::debug;

use super::backend::PermissionBackend;
use super::user::UserId;
use crate::config::{option_flag, OPTION_ALLOW_ANONYMOUS};
use crate::content::{
    CapabilityTable, ContentRecord, ContentRepository, ContentType, Intent, TypeMap,
    READ_HIDDEN_FORUMS, READ_PRIVATE_FORUMS,
};
use crate::host::{base_user_can, OptionStore};

/// The rule that produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    SectionPost,
    PostComment,
    GuestOverride,
    SectionView,
    GuestPostView,
    CommentView,
    Fallback,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::SectionPost => "section_post",
            Rule::PostComment => "post_comment",
            Rule::GuestOverride => "guest_override",
            Rule::SectionView => "section_view",
            Rule::GuestPostView => "guest_post_view",
            Rule::CommentView => "comment_view",
            Rule::Fallback => "fallback",
        };
        f.write_str(name)
    }
}

/// Outcome of a permission evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    pub rule: Rule,
}

impl Verdict {
    fn new(allowed: bool, rule: Rule) -> Self {
        Self { allowed, rule }
    }
}

/// Rules engine deciding view/post/edit/comment access to forum content.
pub struct PermissionEvaluator<'a> {
    repo: &'a dyn ContentRepository,
    backend: &'a dyn PermissionBackend,
    options: &'a dyn OptionStore,
    types: &'a TypeMap,
    capabilities: &'a CapabilityTable,
}

impl<'a> PermissionEvaluator<'a> {
    /// Create an evaluator over the given collaborators.
    pub fn new(
        repo: &'a dyn ContentRepository,
        backend: &'a dyn PermissionBackend,
        options: &'a dyn OptionStore,
        types: &'a TypeMap,
        capabilities: &'a CapabilityTable,
    ) -> Self {
        Self {
            repo,
            backend,
            options,
            types,
            capabilities,
        }
    }

    /// Check whether `user` may perform `intent`.
    pub fn user_can(
        &self,
        user: UserId,
        intent: Intent,
        content_type: ContentType,
        content_id: i64,
    ) -> bool {
        self.evaluate(user, intent, content_type, content_id).allowed
    }

    /// Evaluate the rules and report which one decided.
    pub fn evaluate(
        &self,
        user: UserId,
        intent: Intent,
        content_type: ContentType,
        content_id: i64,
    ) -> Verdict {
        let verdict = match (content_type, intent) {
            (ContentType::Section, Intent::Post) => {
                let closed = self
                    .record(ContentType::Section, content_id)
                    .is_some_and(|s| s.flags.closed);
                let allowed = !closed && self.has_capability(user, intent, content_type, content_id);
                self.guest_override(user, Verdict::new(allowed, Rule::SectionPost))
            }
            (ContentType::Post, Intent::Comment) => {
                let allowed = match self.record(ContentType::Post, content_id) {
                    Some(post) => {
                        !post.flags.closed
                            && self.has_capability(user, intent, content_type, content_id)
                    }
                    None => false,
                };
                self.guest_override(user, Verdict::new(allowed, Rule::PostComment))
            }
            (ContentType::Section, Intent::View) => {
                let allowed = match self.record(ContentType::Section, content_id) {
                    Some(section) if section.flags.hidden || section.flags.private => {
                        self.can_read_section(user, &section)
                    }
                    _ => true,
                };
                Verdict::new(allowed, Rule::SectionView)
            }
            (ContentType::Post, Intent::View) if user.is_anonymous() => Verdict::new(
                self.is_published(ContentType::Post, content_id),
                Rule::GuestPostView,
            ),
            // Applies to every caller, not only anonymous ones.
            (ContentType::Comment, Intent::View) => Verdict::new(
                self.is_published(ContentType::Comment, content_id),
                Rule::CommentView,
            ),
            _ => Verdict::new(
                self.has_capability(user, intent, content_type, content_id),
                Rule::Fallback,
            ),
        };

        debug!(
            user = %user,
            intent = %intent,
            content_type = %content_type,
            content_id,
            allowed = verdict.allowed,
            rule = %verdict.rule,
            "permission evaluated"
        );
        verdict
    }

    /// Whether guest participation is switched on, read at call time.
    pub fn guest_posting_enabled(&self) -> bool {
        option_flag(self.options, OPTION_ALLOW_ANONYMOUS)
    }

    // Anonymous callers skip both the capability and the closed/missing
    // target checks when guest participation is on.
    fn guest_override(&self, user: UserId, computed: Verdict) -> Verdict {
        if user.is_anonymous() && self.guest_posting_enabled() {
            return Verdict::new(true, Rule::GuestOverride);
        }
        computed
    }

    fn has_capability(
        &self,
        user: UserId,
        intent: Intent,
        content_type: ContentType,
        content_id: i64,
    ) -> bool {
        base_user_can(
            self.capabilities,
            self.backend,
            user,
            intent,
            content_type,
            content_id,
        )
    }

    fn can_read_section(&self, user: UserId, section: &ContentRecord) -> bool {
        let id = Some(section.id);
        (!section.flags.private || self.backend.user_can(user, READ_PRIVATE_FORUMS, id))
            && (!section.flags.hidden || self.backend.user_can(user, READ_HIDDEN_FORUMS, id))
    }

    fn is_published(&self, content_type: ContentType, id: i64) -> bool {
        self.record(content_type, id)
            .is_some_and(|r| r.is_published())
    }

    fn record(&self, content_type: ContentType, id: i64) -> Option<ContentRecord> {
        self.repo
            .find(id)
            .filter(|r| r.native_type == self.types.native(content_type))
    }
}
