//! Batch reference validation through the adapter's response dispatch.

mod common;

use common::TestForum;
use forumbridge::batch::{expected_header, rejected_header};
use forumbridge::{RequestMeta, ResponseMeta, SubType};

#[test]
fn test_rejects_missing_and_unpublished_ids() {
    let forum = TestForum::new();
    let request = RequestMeta::new("/forums/topics")
        .with_expected(SubType::Forum, [1, 99])
        .with_expected(SubType::Topic, [10, 12, 10])
        .with_expected(SubType::Reply, [20, 21, 22]);

    forum.with_adapter(|adapter| {
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&request, &mut response);

        assert_eq!(response.rejected(SubType::Forum), Some(vec![99]));
        assert_eq!(response.rejected(SubType::Topic), Some(vec![12]));
        assert_eq!(response.rejected(SubType::Reply), Some(vec![21, 22]));
        assert_eq!(response.header("X-Rejected-Reply-Ids"), Some("[21,22]"));
    });
}

#[test]
fn test_type_mismatch_is_rejected() {
    let forum = TestForum::new();
    let request = RequestMeta::new("/forums").with_expected(SubType::Forum, [10, 30]);

    forum.with_adapter(|adapter| {
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&request, &mut response);
        assert_eq!(response.rejected(SubType::Forum), Some(vec![10, 30]));
    });
}

#[test]
fn test_all_valid_sets_no_header() {
    let forum = TestForum::new();
    let request = RequestMeta::new("/forums")
        .with_expected(SubType::Forum, [1, 2, 3, 4])
        .with_expected(SubType::Topic, [10, 11]);

    forum.with_adapter(|adapter| {
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&request, &mut response);
        assert_eq!(response.headers().count(), 0);
    });
}

#[test]
fn test_no_annotations_no_headers() {
    let forum = TestForum::new();
    forum.with_adapter(|adapter| {
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&RequestMeta::new("/forums"), &mut response);
        assert_eq!(response.headers().count(), 0);
    });
}

#[test]
fn test_outer_batch_request_is_skipped() {
    let forum = TestForum::new();
    let request = RequestMeta::new("/forums")
        .with_outer_route("/batch/v1")
        .with_expected(SubType::Forum, [99]);

    forum.with_adapter(|adapter| {
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&request, &mut response);
        assert_eq!(response.rejected(SubType::Forum), None);
    });
}

#[test]
fn test_inner_batch_request_is_validated() {
    let forum = TestForum::new();
    let request = RequestMeta::new("/batch/v1/forums")
        .with_outer_route("/batch/v1")
        .with_expected(SubType::Forum, [99]);

    forum.with_adapter(|adapter| {
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&request, &mut response);
        assert_eq!(response.rejected(SubType::Forum), Some(vec![99]));
    });
}

#[test]
fn test_annotations_from_headers() {
    let forum = TestForum::new();
    let forum_header = expected_header(SubType::Forum);
    let reply_header = expected_header(SubType::Reply).to_lowercase();
    let request = RequestMeta::from_headers(
        "/forums",
        [
            (forum_header.as_str(), "1, 99"),
            (reply_header.as_str(), "[20,21]"),
            ("X-Expected-Topic-Ids", "ten,eleven"),
        ],
    );

    forum.with_adapter(|adapter| {
        let mut response = ResponseMeta::new();
        adapter.dispatch_response(&request, &mut response);

        assert_eq!(
            response.header(&rejected_header(SubType::Forum)),
            Some("[99]")
        );
        assert_eq!(response.rejected(SubType::Reply), Some(vec![21]));
        assert_eq!(response.rejected(SubType::Topic), None);
    });
}
