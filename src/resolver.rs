//! Identity resolution for forumbridge.
//!
//! Maps (content type, id) pairs to stored records and public URLs back to
//! content identities.

use tracing::{debug, warn};

use crate::content::{ContentRecord, ContentRepository, ContentType, TypeMap};
use crate::host::ContentRef;
use crate::routing::UrlRouter;
use crate::Result;

/// Resolver between host identities, stored records and URLs.
pub struct IdentityResolver<'a> {
    repo: &'a dyn ContentRepository,
    router: &'a dyn UrlRouter,
    types: &'a TypeMap,
}

impl<'a> IdentityResolver<'a> {
    /// Create a resolver over the given collaborators.
    pub fn new(
        repo: &'a dyn ContentRepository,
        router: &'a dyn UrlRouter,
        types: &'a TypeMap,
    ) -> Self {
        Self {
            repo,
            router,
            types,
        }
    }

    /// Get the record with `id` if it is of `content_type`.
    pub fn get_content(&self, content_type: ContentType, id: i64) -> Option<ContentRecord> {
        self.repo
            .find(id)
            .filter(|r| r.native_type == self.types.native(content_type))
    }

    /// Content type of a record, from its native type tag.
    ///
    /// Fails with `UnknownContentType` for records of no configured type.
    pub fn get_content_type(&self, record: &ContentRecord) -> Result<ContentType> {
        self.types.content_type(&record.native_type)
    }

    /// Public permalink, or an empty string.
    pub fn get_link(&self, content_type: ContentType, id: i64) -> String {
        self.get_content(content_type, id)
            .and_then(|record| self.router.permalink(&record))
            .unwrap_or_default()
    }

    /// Resolve a public URL to a content identity.
    ///
    /// URLs outside the forums, URLs routed to no record and records of an
    /// unmapped type are all `Ok(None)`.
    pub fn resolve_incoming_url(&self, url: &str) -> Result<Option<ContentRef>> {
        if !self.router.owns(url) {
            return Ok(None);
        }

        let Some(id) = self.router.url_to_id(url)? else {
            debug!("No record routed at {}", url);
            return Ok(None);
        };
        let Some(record) = self.repo.find(id) else {
            debug!("URL {} routed to missing record {}", url, id);
            return Ok(None);
        };

        match self.get_content_type(&record) {
            Ok(content_type) => Ok(Some(ContentRef { content_type, id })),
            Err(e) => {
                warn!("URL {} routed to record {}: {}", url, id, e);
                Ok(None)
            }
        }
    }
}
