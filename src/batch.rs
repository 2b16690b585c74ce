//! Batch reference validation for forumbridge.
//!
//! A gateway can declare the forum, topic and reply IDs it expects to
//! exist through `X-Expected-{Forum,Topic,Reply}-Ids` request annotations.
//! After the response is prepared, every expected ID that is not a
//! published record of the matching type is reported back through
//! `X-Rejected-{Forum,Topic,Reply}-Ids`. A missing rejected annotation
//! means every requested ID of that sub-type was confirmed.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::content::{ContentRepository, PostStatus, SubType, TypeMap};

/// Name of the inbound annotation carrying expected IDs for `sub_type`.
pub fn expected_header(sub_type: SubType) -> String {
    format!("X-Expected-{}-Ids", sub_type.title())
}

/// Name of the outbound annotation carrying rejected IDs for `sub_type`.
pub fn rejected_header(sub_type: SubType) -> String {
    format!("X-Rejected-{}-Ids", sub_type.title())
}

/// Parse an ID list given as a JSON array or as comma-separated integers.
///
/// Returns `None` if any element is not an integer.
pub fn parse_id_list(value: &str) -> Option<Vec<i64>> {
    let value = value.trim();
    if value.starts_with('[') {
        return serde_json::from_str(value).ok();
    }
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<i64>().ok())
        .collect()
}

/// Inbound request metadata relevant to batch validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    /// Route of the current request.
    pub route: String,
    /// Route of the enclosing request when this one runs inside a batch
    /// envelope.
    pub outer_route: Option<String>,
    expected: BTreeMap<SubType, Vec<i64>>,
}

impl RequestMeta {
    /// Create metadata for a top-level request.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            outer_route: None,
            expected: BTreeMap::new(),
        }
    }

    /// Build metadata from request headers.
    ///
    /// Header names match case-insensitively. Malformed ID lists are
    /// ignored.
    pub fn from_headers<'h>(
        route: impl Into<String>,
        headers: impl IntoIterator<Item = (&'h str, &'h str)>,
    ) -> Self {
        let mut meta = Self::new(route);
        for (name, value) in headers {
            let Some(sub_type) = SubType::ALL
                .into_iter()
                .find(|s| expected_header(*s).eq_ignore_ascii_case(name))
            else {
                continue;
            };
            match parse_id_list(value) {
                Some(ids) => meta.expected.entry(sub_type).or_default().extend(ids),
                None => warn!("Ignoring malformed {} annotation: {}", name, value),
            }
        }
        meta
    }

    /// Mark this request as running inside an outer envelope.
    pub fn with_outer_route(mut self, route: impl Into<String>) -> Self {
        self.outer_route = Some(route.into());
        self
    }

    /// Declare expected IDs for a sub-type.
    pub fn with_expected(mut self, sub_type: SubType, ids: impl IntoIterator<Item = i64>) -> Self {
        self.expected.entry(sub_type).or_default().extend(ids);
        self
    }

    /// Expected IDs for a sub-type, if any were declared.
    pub fn expected(&self, sub_type: SubType) -> Option<&[i64]> {
        self.expected.get(&sub_type).map(Vec::as_slice)
    }
}

/// Outbound response metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMeta {
    headers: BTreeMap<String, String>,
}

impl ResponseMeta {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an annotation.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    /// Get an annotation by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// All annotations, ordered by name.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rejected IDs reported for a sub-type.
    pub fn rejected(&self, sub_type: SubType) -> Option<Vec<i64>> {
        self.header(&rejected_header(sub_type))
            .and_then(|v| serde_json::from_str(v).ok())
    }
}

/// Sub-type and required status checked for one expected-ID list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationTarget {
    pub sub_type: SubType,
    pub status: PostStatus,
}

/// Targets checked by default: published forums, topics and replies.
pub const DEFAULT_TARGETS: [ValidationTarget; 3] = [
    ValidationTarget {
        sub_type: SubType::Forum,
        status: PostStatus::Publish,
    },
    ValidationTarget {
        sub_type: SubType::Topic,
        status: PostStatus::Publish,
    },
    ValidationTarget {
        sub_type: SubType::Reply,
        status: PostStatus::Publish,
    },
];

/// Rejected IDs per sub-type. Sub-types without rejects are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchValidationResult {
    rejects: BTreeMap<SubType, Vec<i64>>,
}

impl BatchValidationResult {
    /// Rejected IDs of a sub-type, if any.
    pub fn rejects(&self, sub_type: SubType) -> Option<&[i64]> {
        self.rejects.get(&sub_type).map(Vec::as_slice)
    }

    /// Check if nothing was rejected.
    pub fn is_empty(&self) -> bool {
        self.rejects.is_empty()
    }

    /// Iterate over sub-types with rejects.
    pub fn iter(&self) -> impl Iterator<Item = (SubType, &[i64])> {
        self.rejects.iter().map(|(s, ids)| (*s, ids.as_slice()))
    }
}

/// Validator confirming expected IDs against the content repository.
pub struct BatchValidator<'a> {
    repo: &'a dyn ContentRepository,
    types: &'a TypeMap,
    namespace: &'a str,
    targets: [ValidationTarget; 3],
}

impl<'a> BatchValidator<'a> {
    /// Create a validator; `namespace` is the batch-execution route prefix.
    pub fn new(repo: &'a dyn ContentRepository, types: &'a TypeMap, namespace: &'a str) -> Self {
        Self {
            repo,
            types,
            namespace,
            targets: DEFAULT_TARGETS,
        }
    }

    /// Replace the checked targets.
    pub fn with_targets(mut self, targets: [ValidationTarget; 3]) -> Self {
        self.targets = targets;
        self
    }

    fn in_namespace(&self, route: &str) -> bool {
        let namespace = self.namespace.trim_end_matches('/');
        route
            .strip_prefix(namespace)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Whether validation is skipped for this request.
    ///
    /// A sub-request inside a batch envelope is skipped unless it targets
    /// the batch namespace itself.
    pub fn should_skip(&self, request: &RequestMeta) -> bool {
        request
            .outer_route
            .as_deref()
            .is_some_and(|outer| self.in_namespace(outer) && !self.in_namespace(&request.route))
    }

    /// IDs of `ids` that are not records of the target's type and status.
    ///
    /// Duplicates are reported once, in order of first occurrence.
    pub fn rejects(&self, target: ValidationTarget, ids: &[i64]) -> Vec<i64> {
        if ids.is_empty() {
            return Vec::new();
        }
        let native_type = self.types.native(target.sub_type.content_type());
        let found: HashSet<i64> = self
            .repo
            .filter_ids(native_type, target.status, ids)
            .into_iter()
            .collect();

        let mut reported = HashSet::new();
        ids.iter()
            .copied()
            .filter(|id| !found.contains(id) && reported.insert(*id))
            .collect()
    }

    /// Validate every declared list independently.
    pub fn validate(&self, request: &RequestMeta) -> BatchValidationResult {
        let mut result = BatchValidationResult::default();
        for target in self.targets {
            let Some(ids) = request.expected(target.sub_type) else {
                continue;
            };
            let rejects = self.rejects(target, ids);
            if !rejects.is_empty() {
                result.rejects.insert(target.sub_type, rejects);
            }
        }
        result
    }

    /// Run validation and attach rejected-ID annotations to the response.
    pub fn apply(&self, request: &RequestMeta, response: &mut ResponseMeta) {
        if self.should_skip(request) {
            debug!(
                "Skipping batch validation for {} inside {:?}",
                request.route, request.outer_route
            );
            return;
        }

        for (sub_type, rejects) in self.validate(request).iter() {
            debug!("Rejected {} ids: {:?}", sub_type, rejects);
            response.set_header(rejected_header(sub_type), Value::from(rejects).to_string());
        }
    }
}
