//! End-to-end runs of the three stages against in-memory fakes.

use fixver_core::fakes::{AdvisoryFixture, MemoryAdvisoryService, MemoryBugTracker};
use fixver_core::{
    build_report, resolve_version, AdvisoryBugIndex, AdvisoryId, BugFilter, BugRecord, Comment,
    FixverError, Pipeline, RunConfig, VersionResult, DEFAULT_MARKER_CREATOR,
    DEFAULT_MARKER_PHRASE,
};
use serde_json::json;

fn pending(advisory: u64) -> Vec<Comment> {
    vec![Comment::new(
        DEFAULT_MARKER_CREATOR,
        format!(
            "{}\nhttps://errata.devel.redhat.com/advisory/{}",
            DEFAULT_MARKER_PHRASE, advisory
        ),
    )]
}

fn advisory(id: &str) -> AdvisoryId {
    AdvisoryId::new(id).unwrap()
}

#[tokio::test]
async fn shared_advisory_is_fetched_once_and_reported_for_each_bug() {
    let tracker = MemoryBugTracker::new(
        vec![
            BugRecord::new(101, "gather fails on proxy"),
            BugRecord::new(102, "no comments"),
            BugRecord::new(103, "wrong archive name"),
        ],
        20,
    )
    .with_comments(101, pending(79000))
    .with_comments(103, pending(79000));
    let advisories = MemoryAdvisoryService::new().with_synopsis(
        "79000",
        "Moderate: OpenShift Container Platform 4.8.13 bug fix and security update",
    );

    let pipeline = Pipeline::new(&tracker, &advisories, RunConfig::default());
    let outcome = pipeline.run(|_| {}).await.unwrap();

    assert_eq!(advisories.fetch_count("79000"), 1);
    let lines: Vec<String> = outcome.report.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Bug 101: gather fails on proxy Version: 4.8.13",
            "Bug 103: wrong archive name Version: 4.8.13",
        ]
    );
    assert_eq!(outcome.summary.bugs_found, 3);
    assert_eq!(outcome.summary.bugs_linked, 2);
    assert_eq!(outcome.summary.advisories, 1);
    assert_eq!(outcome.summary.advisories_resolved, 1);
    assert_eq!(outcome.summary.lines, 2);
}

#[tokio::test]
async fn unauthorized_advisory_hides_its_bugs() {
    let tracker = MemoryBugTracker::new(
        vec![BugRecord::new(1, "one"), BugRecord::new(2, "two")],
        20,
    )
    .with_comments(1, pending(500))
    .with_comments(2, pending(500));
    let advisories = MemoryAdvisoryService::new().with_status("500", 401, "Unauthorized");

    let outcome = Pipeline::new(&tracker, &advisories, RunConfig::default())
        .run(|_| {})
        .await
        .unwrap();

    assert!(outcome.report.is_empty());
    assert_eq!(
        outcome.report.resolutions[0].version.to_string(),
        "<unknown version>"
    );
    assert_eq!(outcome.report.resolutions[0].bug_count, 2);
}

#[tokio::test]
async fn resolver_placeholders() {
    let advisories = MemoryAdvisoryService::new()
        .with_fixture("1", AdvisoryFixture::Record(json!({"errata": {}})))
        .with_synopsis("2", "OpenShift Container Platform 4.8 images")
        .with_status("3", 403, "Forbidden")
        .with_fixture("4", AdvisoryFixture::Unreachable)
        .with_fixture(
            "5",
            AdvisoryFixture::Record(json!({
                "errata": {"rhsa": {"synopsis": "Important: OpenShift 4.7.19 security update"}}
            })),
        );

    assert_eq!(
        resolve_version(&advisories, &advisory("1")).await.to_string(),
        "<unknown version> No synopsis in Errata 1"
    );
    assert_eq!(
        resolve_version(&advisories, &advisory("2")).await.to_string(),
        "<unknown version> No version in Errata 2 synopsis:OpenShift Container Platform 4.8 images"
    );
    assert_eq!(
        resolve_version(&advisories, &advisory("3")).await,
        VersionResult::unknown()
    );
    assert_eq!(
        resolve_version(&advisories, &advisory("4")).await,
        VersionResult::unknown()
    );
    assert_eq!(
        resolve_version(&advisories, &advisory("5")).await,
        VersionResult::Resolved("4.7.19".to_string())
    );
}

#[tokio::test]
async fn synthetic_index_emits_only_resolved_bugs_in_order() {
    let mut index = AdvisoryBugIndex::new();
    index.insert(advisory("30"), BugRecord::new(1, "a"));
    index.insert(advisory("10"), BugRecord::new(2, "b"));
    index.insert(advisory("20"), BugRecord::new(3, "c"));
    index.insert(advisory("30"), BugRecord::new(4, "d"));
    index.insert(advisory("40"), BugRecord::new(5, "e"));

    let advisories = MemoryAdvisoryService::new()
        .with_synopsis("30", "OpenShift Container Platform 4.8.2 bug fix update")
        .with_synopsis("10", "no version here")
        .with_synopsis("20", "OpenShift Container Platform 4.8.5 bug fix update");

    let report = build_report(&advisories, &index).await;

    let got: Vec<(u64, &str)> = report
        .entries
        .iter()
        .map(|e| (e.bug_id.as_u64(), e.version.as_str()))
        .collect();
    assert_eq!(got, vec![(1, "4.8.2"), (4, "4.8.2"), (3, "4.8.5")]);
    for resolution in &report.resolutions {
        let excluded = resolution.version.to_string().contains("unknown version");
        assert_eq!(excluded, !resolution.version.is_resolved());
    }
    let fetched: Vec<String> = advisories
        .fetches()
        .iter()
        .map(|a| a.as_str().to_string())
        .collect();
    assert_eq!(fetched, vec!["30", "10", "20", "40"]);
}

#[tokio::test]
async fn bug_search_failure_aborts_the_run() {
    let tracker = MemoryBugTracker::with_generated(30, 10).failing_search_at(1);
    let advisories = MemoryAdvisoryService::new();

    let err = Pipeline::new(&tracker, &advisories, RunConfig::default())
        .run(|_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, FixverError::BugSearch(_)));
    assert!(advisories.fetches().is_empty());
    assert!(tracker.comment_requests().is_empty());
}

#[tokio::test]
async fn stages_can_be_driven_individually() {
    let tracker = MemoryBugTracker::new(vec![BugRecord::new(9, "x")], 20)
        .with_comments(9, pending(77));
    let advisories =
        MemoryAdvisoryService::new().with_synopsis("77", "OpenShift Container Platform 4.6.44");
    let pipeline = Pipeline::new(
        &tracker,
        &advisories,
        RunConfig::new(BugFilter::for_version("4.6")),
    );

    let bugs = pipeline.fetch_bugs().await.unwrap();
    let index = pipeline.link(&bugs).await.unwrap();
    let report = pipeline.report(&index).await;

    assert_eq!(report.render_text(), "Bug 9: x Version: 4.6.44\n");
    assert_eq!(pipeline.config().filter.version, "4.6");
}

#[tokio::test]
async fn fetched_bugs_are_announced_before_linking() {
    let tracker = MemoryBugTracker::with_generated(3, 2).with_comments(2, pending(61));
    let advisories =
        MemoryAdvisoryService::new().with_synopsis("61", "OpenShift Container Platform 4.8.1");

    let mut seen = None;
    let outcome = Pipeline::new(&tracker, &advisories, RunConfig::default())
        .run(|bugs| seen = Some((bugs.len(), tracker.comment_requests().len())))
        .await
        .unwrap();

    assert_eq!(seen, Some((3, 0)));
    assert_eq!(outcome.report.render_text(), "Bug 2: bug 2 Version: 4.8.1\n");
}
