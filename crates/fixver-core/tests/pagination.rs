//! Paging contract tests for BugPager against the in-memory tracker.

use fixver_core::fakes::MemoryBugTracker;
use fixver_core::{fetch_all_bugs, BugFilter, BugId, BugPager, PageRequest, TrackerError};
use futures::TryStreamExt;

#[tokio::test]
async fn zero_results_issue_no_follow_up_request() {
    let tracker = MemoryBugTracker::with_generated(0, 20);
    let bugs = fetch_all_bugs(&tracker, &BugFilter::default()).await.unwrap();

    assert!(bugs.is_empty());
    assert_eq!(tracker.searches(), vec![None]);
}

#[tokio::test]
async fn multi_page_concatenation_equals_total_in_order() {
    let tracker = MemoryBugTracker::with_generated(45, 20);
    let bugs = fetch_all_bugs(&tracker, &BugFilter::default()).await.unwrap();

    assert_eq!(bugs.len(), 45);
    let ids: Vec<u64> = bugs.iter().map(|b| b.id.as_u64()).collect();
    assert_eq!(ids, (1..=45).collect::<Vec<_>>());
}

#[tokio::test]
async fn follow_up_requests_use_page_size_and_running_offset() {
    let tracker = MemoryBugTracker::with_generated(45, 20);
    fetch_all_bugs(&tracker, &BugFilter::default()).await.unwrap();

    assert_eq!(
        tracker.searches(),
        vec![
            None,
            Some(PageRequest {
                limit: 20,
                offset: 20
            }),
            Some(PageRequest {
                limit: 20,
                offset: 40
            }),
        ]
    );
}

#[tokio::test]
async fn exact_multiple_probes_boundary_page_once() {
    // offset == total_matches is still requested; it comes back empty.
    let tracker = MemoryBugTracker::with_generated(40, 20);
    let bugs = fetch_all_bugs(&tracker, &BugFilter::default()).await.unwrap();

    assert_eq!(bugs.len(), 40);
    assert_eq!(tracker.searches().len(), 3);
}

#[tokio::test]
async fn stream_yields_every_record_once() {
    let tracker = MemoryBugTracker::with_generated(7, 3);
    let stream = BugPager::new(&tracker, BugFilter::default()).into_stream();
    let bugs: Vec<_> = stream.try_collect().await.unwrap();

    assert_eq!(bugs.len(), 7);
    assert_eq!(bugs.last().unwrap().id, BugId::new(7));
}

#[tokio::test]
async fn page_failure_propagates() {
    let tracker = MemoryBugTracker::with_generated(50, 20).failing_search_at(2);
    let err = fetch_all_bugs(&tracker, &BugFilter::default())
        .await
        .unwrap_err();

    assert!(matches!(err, TrackerError::Transport { .. }));
}
