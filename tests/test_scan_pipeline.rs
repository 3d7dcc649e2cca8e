//! Integration tests for the `ScanPipeline` stage controller.
//!
//! Collaborators are test doubles, so no network access or scanner binary is
//! needed. The report parser is the real one.

mod common;

use std::sync::Arc;

use common::{StubFetcher, StubRunner, pipeline_with, sample_report, scratch_parent, workspace_count};
use leaksweep::application::ScanPipelineError;
use leaksweep::domain::{ScanJob, ScanStage};

// ── Successful scans ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_successful_scan_walks_stages_in_order() {
    let parent = scratch_parent();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::with_report(sample_report())),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    let findings = pipeline
        .execute(&mut job)
        .await
        .expect("scan should succeed");

    assert_eq!(findings.len(), 2);
    assert_eq!(job.stage, ScanStage::Assembled);
    assert!(job.error.is_none());

    let audit: Vec<(ScanStage, ScanStage)> = job
        .transitions
        .iter()
        .map(|t| (t.from.clone(), t.to.clone()))
        .collect();
    assert_eq!(
        audit,
        vec![
            (ScanStage::Idle, ScanStage::Fetching),
            (ScanStage::Fetching, ScanStage::Scanning),
            (ScanStage::Scanning, ScanStage::Parsing),
            (ScanStage::Parsing, ScanStage::Assembled),
        ]
    );
}

#[tokio::test]
async fn test_leak_exit_code_still_yields_findings() {
    let parent = scratch_parent();
    // Exit code 1 is how the scanner reports detected leaks. The artifact is
    // present, so the scan succeeded.
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::with_report_and_exit(sample_report(), 1)),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    let findings = pipeline
        .execute(&mut job)
        .await
        .expect("scan should succeed despite the leak exit code");

    assert_eq!(findings.len(), 2);
    assert_eq!(job.stage, ScanStage::Assembled);
}

#[tokio::test]
async fn test_zero_byte_report_yields_no_findings() {
    let parent = scratch_parent();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::with_report(Vec::new())),
    );
    let mut job = ScanJob::new("https://example.com/acme/clean.git");

    let findings = pipeline
        .execute(&mut job)
        .await
        .expect("clean scan should succeed");

    assert!(findings.is_empty());
    assert_eq!(job.stage, ScanStage::Assembled);
}

#[tokio::test]
async fn test_findings_preserve_report_order() {
    let parent = scratch_parent();
    let report = serde_json::json!([
        {"Description": "First", "Secret": "a", "File": "a.txt", "StartLine": 1, "RuleID": "rule-a"},
        {"Description": "Second", "Secret": "b", "File": "b.txt", "StartLine": 2, "RuleID": "rule-b"},
        {"Description": "Third", "Secret": "c", "File": "c.txt", "StartLine": 3, "RuleID": "rule-c"}
    ])
    .to_string();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::with_report(report)),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    let findings = pipeline
        .execute(&mut job)
        .await
        .expect("scan should succeed");

    let rule_ids: Vec<&str> = findings.iter().map(|f| f.rule_id.as_str()).collect();
    assert_eq!(rule_ids, vec!["rule-a", "rule-b", "rule-c"]);
}

#[tokio::test]
async fn test_fetcher_receives_workspace_destination() {
    let parent = scratch_parent();
    let fetcher = Arc::new(StubFetcher::new());
    let pipeline = pipeline_with(
        parent.path(),
        fetcher.clone(),
        Arc::new(StubRunner::with_report(Vec::new())),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    pipeline
        .execute(&mut job)
        .await
        .expect("scan should succeed");

    let destinations = fetcher.destinations();
    assert_eq!(destinations.len(), 1);
    assert!(destinations[0].starts_with(parent.path()));
    let dir_name = destinations[0]
        .file_name()
        .and_then(|n| n.to_str())
        .expect("workspace directory should have a UTF-8 name");
    assert!(
        dir_name.starts_with("leaksweep-scan-"),
        "unexpected workspace name: {dir_name}"
    );
}

// ── Failed scans ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_failure_marks_job_failed() {
    let parent = scratch_parent();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::failing("remote hung up unexpectedly")),
        Arc::new(StubRunner::with_report(sample_report())),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    let error = pipeline
        .execute(&mut job)
        .await
        .expect_err("fetch failure should fail the scan");

    assert!(matches!(error, ScanPipelineError::Fetch(_)));
    assert_eq!(job.stage, ScanStage::Failed);
    let recorded = job.error.as_deref().expect("failure should be recorded");
    assert!(recorded.contains("remote hung up unexpectedly"));
}

#[tokio::test]
async fn test_missing_report_marks_job_failed() {
    let parent = scratch_parent();
    // Clean exit without an artifact means the detection pass never ran.
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::without_report("leaks command failed")),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    let error = pipeline
        .execute(&mut job)
        .await
        .expect_err("missing report should fail the scan");

    assert!(matches!(error, ScanPipelineError::ScanExecution(_)));
    assert_eq!(job.stage, ScanStage::Failed);
}

#[tokio::test]
async fn test_malformed_report_marks_job_failed() {
    let parent = scratch_parent();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::with_report(&b"{not json"[..])),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    let error = pipeline
        .execute(&mut job)
        .await
        .expect_err("malformed report should fail the scan");

    assert!(matches!(error, ScanPipelineError::Report(_)));
    assert_eq!(job.stage, ScanStage::Failed);
}

// ── Workspace lifecycle ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_workspace_removed_after_successful_scan() {
    let parent = scratch_parent();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::with_report(sample_report())),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    pipeline
        .execute(&mut job)
        .await
        .expect("scan should succeed");

    assert_eq!(workspace_count(parent.path()), 0);
}

#[tokio::test]
async fn test_workspace_removed_after_fetch_failure() {
    let parent = scratch_parent();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::failing("connection reset")),
        Arc::new(StubRunner::with_report(sample_report())),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    pipeline
        .execute(&mut job)
        .await
        .expect_err("fetch failure should fail the scan");

    assert_eq!(workspace_count(parent.path()), 0);
}

#[tokio::test]
async fn test_workspace_removed_after_parse_failure() {
    let parent = scratch_parent();
    let pipeline = pipeline_with(
        parent.path(),
        Arc::new(StubFetcher::new()),
        Arc::new(StubRunner::with_report(&b"]["[..])),
    );
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    pipeline
        .execute(&mut job)
        .await
        .expect_err("parse failure should fail the scan");

    assert_eq!(workspace_count(parent.path()), 0);
}

#[tokio::test]
async fn test_sequential_scans_reuse_nothing() {
    let parent = scratch_parent();
    let fetcher = Arc::new(StubFetcher::new());
    let pipeline = pipeline_with(
        parent.path(),
        fetcher.clone(),
        Arc::new(StubRunner::with_report(Vec::new())),
    );

    for _ in 0..3 {
        let mut job = ScanJob::new("https://example.com/acme/widgets.git");
        pipeline
            .execute(&mut job)
            .await
            .expect("scan should succeed");
    }

    let destinations = fetcher.destinations();
    assert_eq!(destinations.len(), 3);
    assert_ne!(destinations[0], destinations[1]);
    assert_ne!(destinations[1], destinations[2]);
    assert_eq!(workspace_count(parent.path()), 0);
}

// ── Invalid transition tests ─────────────────────────────────────────────────

#[test]
fn test_stage_skipping_is_rejected() {
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");

    // Idle → Scanning must go through Fetching
    let err = job
        .transition(ScanStage::Scanning, None)
        .expect_err("Idle→Scanning should be invalid");

    assert_eq!(err.from, ScanStage::Idle);
    assert_eq!(err.to, ScanStage::Scanning);
    assert_eq!(job.stage, ScanStage::Idle, "stage should not change on error");
    assert!(job.transitions.is_empty());
}

#[test]
fn test_terminal_stages_reject_transitions() {
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");
    job.fail("clone timed out").expect("Idle→Failed is valid");
    assert!(job.stage.is_terminal());

    job.transition(ScanStage::Fetching, None)
        .expect_err("Failed is terminal");
    assert_eq!(job.stage, ScanStage::Failed);
}

#[test]
fn test_assembled_cannot_fail() {
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");
    job.transition(ScanStage::Fetching, None).unwrap();
    job.transition(ScanStage::Scanning, None).unwrap();
    job.transition(ScanStage::Parsing, None).unwrap();
    job.transition(ScanStage::Assembled, None).unwrap();

    // Once findings are assembled the only way out is Responded.
    job.fail("too late")
        .expect_err("Assembled→Failed should be invalid");
    assert!(
        job.error.is_none(),
        "a rejected failure must not mark the job"
    );
    job.transition(ScanStage::Responded, None)
        .expect("Assembled→Responded should be valid");
    assert!(job.stage.is_terminal());
}

#[test]
fn test_fail_records_error_and_reason() {
    let mut job = ScanJob::new("https://example.com/acme/widgets.git");
    job.transition(ScanStage::Fetching, None).unwrap();

    job.fail("remote hung up unexpectedly")
        .expect("Fetching→Failed is valid");

    assert_eq!(job.stage, ScanStage::Failed);
    assert_eq!(job.error.as_deref(), Some("remote hung up unexpectedly"));
    assert_eq!(
        job.transitions.last().and_then(|t| t.reason.as_deref()),
        Some("remote hung up unexpectedly")
    );
}
