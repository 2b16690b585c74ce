//! URL routing for forumbridge.
//!
//! Forum permalinks live under `{site_url}/{forum_root}/` and take the
//! forms `/{root}/{native_type}/{slug}/` or `/{root}/?p={id}`.

use tracing::trace;
use url::Url;

use crate::config::ForumConfig;
use crate::content::{ContentRecord, ContentRepository, ContentType, TypeMap};
use crate::{BridgeError, Result};

/// Host URL-routing facility.
pub trait UrlRouter {
    /// Cheap check whether `url` can belong to this content source at all.
    fn owns(&self, url: &str) -> bool;

    /// Resolve a URL to a record ID. `Ok(None)` when nothing is routed
    /// there; `Err` only for URLs that cannot be routed at all.
    fn url_to_id(&self, url: &str) -> Result<Option<i64>>;

    /// Public permalink of a record, if one can be produced.
    fn permalink(&self, record: &ContentRecord) -> Option<String>;
}

/// Slug-based permalink router.
pub struct PermalinkRouter<'a> {
    repo: &'a dyn ContentRepository,
    types: &'a TypeMap,
    base: Url,
    prefix: Vec<String>,
}

impl<'a> PermalinkRouter<'a> {
    /// Create a router for forums under `forum_root` of `site_url`.
    pub fn new(
        repo: &'a dyn ContentRepository,
        types: &'a TypeMap,
        site_url: &str,
        forum_root: &str,
    ) -> Result<Self> {
        let base = Url::parse(site_url)
            .map_err(|e| BridgeError::Routing(format!("invalid site URL {site_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(BridgeError::Routing(format!(
                "site URL cannot be a base: {site_url}"
            )));
        }

        let prefix = base
            .path_segments()
            .into_iter()
            .flatten()
            .chain(forum_root.split('/'))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            repo,
            types,
            base,
            prefix,
        })
    }

    /// Create a router from the forum configuration.
    pub fn from_config(repo: &'a dyn ContentRepository, config: &'a ForumConfig) -> Result<Self> {
        Self::new(repo, &config.types, &config.site_url, &config.forum_root)
    }

    fn parse(&self, url: &str) -> Option<Url> {
        if url.starts_with('/') {
            self.base.join(url).ok()
        } else {
            Url::parse(url).ok()
        }
    }

    fn same_origin(&self, url: &Url) -> bool {
        url.host_str() == self.base.host_str()
            && url.port_or_known_default() == self.base.port_or_known_default()
    }

    /// Path segments below the forum prefix, or `None` outside of it.
    fn forum_segments<'u>(&self, url: &'u Url) -> Option<Vec<&'u str>> {
        let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
        if segments.len() < self.prefix.len()
            || segments.iter().zip(&self.prefix).any(|(a, b)| *a != b.as_str())
        {
            return None;
        }
        Some(segments[self.prefix.len()..].to_vec())
    }
}

impl UrlRouter for PermalinkRouter<'_> {
    fn owns(&self, url: &str) -> bool {
        self.parse(url)
            .is_some_and(|u| self.same_origin(&u) && self.forum_segments(&u).is_some())
    }

    fn url_to_id(&self, url: &str) -> Result<Option<i64>> {
        let url = self
            .parse(url)
            .ok_or_else(|| BridgeError::Routing(format!("unroutable URL: {url}")))?;

        if let Some((_, value)) = url.query_pairs().find(|(k, _)| k == "p") {
            return Ok(value.parse::<i64>().ok().filter(|id| *id > 0));
        }

        let Some(segments) = self.forum_segments(&url) else {
            return Ok(None);
        };
        let (native_type, slug) = match segments.as_slice() {
            [native_type, slug, ..] => (*native_type, *slug),
            _ => return Ok(None),
        };
        if self.types.content_type(native_type).is_err() {
            trace!("No forum type routed at /{}/", native_type);
            return Ok(None);
        }

        let slug = urlencoding::decode(slug)
            .map_err(|e| BridgeError::Routing(format!("invalid slug encoding: {e}")))?;
        Ok(self.repo.find_by_slug(native_type, &slug))
    }

    fn permalink(&self, record: &ContentRecord) -> Option<String> {
        if record.slug.is_empty() {
            return None;
        }
        let content_type: ContentType = self.types.content_type(&record.native_type).ok()?;

        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .ok()?
            .clear()
            .extend(&self.prefix)
            .push(self.types.native(content_type))
            .push(&record.slug)
            .push("");
        Some(url.to_string())
    }
}
