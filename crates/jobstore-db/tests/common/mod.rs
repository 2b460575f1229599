//! Record store behavior shared by every collection backend.
//!
//! Each scenario starts by emptying the store and expects it to be built with
//! [`DEFAULT_LIMIT`].

#![allow(dead_code)]

use jobstore_core::{
    CommitInfo, FinishedJobRecord, JobQuery, JobRecord, JobResult, PullRequestInfo,
};
use jobstore_db::{Error, RecordStore, DEFAULT_LIMIT};

// 2024-01-01T00:00:00Z
const JAN_1: f64 = 1_704_067_200.0;
const DAY: f64 = 86_400.0;

fn job(sha: &str, author: &str, branch: Option<&str>, since: f64) -> JobRecord {
    let mut job = JobRecord::new(
        CommitInfo::new(sha, format!("commit {}", sha), author),
        branch.map(str::to_string),
        None,
    );
    job.since = since;
    job
}

fn finished(job: JobRecord, result: JobResult) -> FinishedJobRecord {
    let since = job.since;
    let mut finished = job.finish(result, "https://ci.example.org/output".to_string(), 60.0);
    finished.job.since = since;
    finished
}

fn pull_request(number: i64) -> PullRequestInfo {
    PullRequestInfo {
        title: format!("PR {}", number),
        number,
        merge_commit: "merge".to_string(),
        user: "carol".to_string(),
        url: format!("https://github.com/org/repo/pull/{}", number),
        base_repo: "https://github.com/org/repo".to_string(),
        base_branch: "main".to_string(),
        base_commit: "base".to_string(),
        base_full_name: "org/repo".to_string(),
        mergeable: true,
        labels: vec![],
    }
}

async fn clear(store: &RecordStore) {
    store.delete_jobs(&JobQuery::new()).await.unwrap();
}

pub async fn find_job_round_trip(store: &RecordStore) {
    clear(store).await;
    let job = job("abc", "alice", Some("main"), JAN_1);
    store.insert_job(&job).await.unwrap();

    let found = store.find_job(&job.uid).await.unwrap();
    assert_eq!(found, Some(job));
}

pub async fn find_pull_request_job(store: &RecordStore) {
    clear(store).await;
    let job = JobRecord::new(
        CommitInfo::new("def", "Add feature", "carol"),
        None,
        Some(pull_request(17)),
    );
    store.insert_job(&job).await.unwrap();

    let found = store.find_job(&job.uid).await.unwrap().unwrap();
    assert_eq!(found.prinfo.as_ref().map(|pr| pr.number), Some(17));
    assert!(found.git_ref.is_none());

    let by_prnum = store.find_jobs(&JobQuery::new().with_prnum(17)).await.unwrap();
    assert_eq!(by_prnum.len(), 1);
    assert!(store
        .find_jobs(&JobQuery::new().with_prnum(18))
        .await
        .unwrap()
        .is_empty());
}

pub async fn missing_job_is_absent(store: &RecordStore) {
    clear(store).await;
    store.insert_job(&job("abc", "alice", None, JAN_1)).await.unwrap();

    assert!(store.find_job("missing-uid").await.unwrap().is_none());
}

pub async fn find_jobs_sorted_and_limited(store: &RecordStore) {
    clear(store).await;
    for since in [1.0, 5.0, 3.0, 9.0] {
        store.insert_job(&job("abc", "alice", Some("main"), since)).await.unwrap();
    }

    let jobs = store.find_jobs(&JobQuery::new().with_limit(2)).await.unwrap();
    let order: Vec<f64> = jobs.iter().map(|j| j.job.since).collect();
    assert_eq!(order, vec![9.0, 5.0]);
}

pub async fn find_jobs_uses_default_limit(store: &RecordStore) {
    clear(store).await;
    let total = DEFAULT_LIMIT + 5;
    for i in 0..total {
        store
            .insert_job(&job("abc", "alice", Some("main"), i as f64))
            .await
            .unwrap();
    }

    let jobs = store.find_jobs(&JobQuery::new()).await.unwrap();
    assert_eq!(jobs.len() as i64, DEFAULT_LIMIT);
    assert_eq!(jobs[0].job.since, (total - 1) as f64);
}

pub async fn count_ignores_limit(store: &RecordStore) {
    clear(store).await;
    let total = DEFAULT_LIMIT + 5;
    for i in 0..total {
        store
            .insert_job(&job("abc", "alice", Some("main"), i as f64))
            .await
            .unwrap();
    }

    assert_eq!(store.count_jobs(&JobQuery::new()).await.unwrap() as i64, total);
    assert_eq!(
        store.count_jobs(&JobQuery::new().with_limit(1)).await.unwrap() as i64,
        total
    );
}

pub async fn result_filter(store: &RecordStore) {
    clear(store).await;
    let passed = finished(job("a", "alice", Some("main"), JAN_1), JobResult::Passed);
    let errored = finished(job("b", "alice", Some("main"), JAN_1 + 1.0), JobResult::Errored);
    store.insert_finished_job(&passed).await.unwrap();
    store.insert_finished_job(&errored).await.unwrap();
    store.insert_job(&job("c", "alice", Some("main"), JAN_1 + 2.0)).await.unwrap();

    let jobs = store
        .find_jobs(&JobQuery::new().with_result("errored"))
        .await
        .unwrap();
    assert_eq!(jobs, vec![errored]);

    let jobs = store
        .find_jobs(&JobQuery::new().with_result("unknown"))
        .await
        .unwrap();
    assert_eq!(jobs.len(), 3);
    assert!(!jobs[0].is_finished());
}

pub async fn field_filters(store: &RecordStore) {
    clear(store).await;
    store.insert_job(&job("a1", "alice", Some("main"), 1.0)).await.unwrap();
    store.insert_job(&job("b1", "bob", Some("main"), 2.0)).await.unwrap();
    store.insert_job(&job("b2", "bob", Some("dev"), 3.0)).await.unwrap();

    let by_author = JobQuery::new().with_author("bob");
    assert_eq!(store.count_jobs(&by_author).await.unwrap(), 2);

    let by_author_and_branch = by_author.with_branch("main");
    let jobs = store.find_jobs(&by_author_and_branch).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job.commit.sha, "b1");

    let by_sha = JobQuery::new().with_sha("b2");
    let jobs = store.find_jobs(&by_sha).await.unwrap();
    assert_eq!(jobs[0].job.git_ref.as_deref(), Some("dev"));
}

pub async fn date_range_filters(store: &RecordStore) {
    clear(store).await;
    let days = [-1.0, 0.0, 0.5, 1.0, 2.0];
    for (i, offset) in days.iter().enumerate() {
        store
            .insert_job(&job(
                &format!("sha{}", i),
                "alice",
                Some("main"),
                JAN_1 + offset * DAY,
            ))
            .await
            .unwrap();
    }

    let after = store
        .find_jobs(&JobQuery::new().with_after("2024-01-01"))
        .await
        .unwrap();
    assert_eq!(after.len(), 4);
    assert!(after.iter().all(|j| j.job.since >= JAN_1));

    let before = store
        .find_jobs(&JobQuery::new().with_before("2024-01-01"))
        .await
        .unwrap();
    assert_eq!(before.len(), 3);
    assert!(before.iter().all(|j| j.job.since <= JAN_1 + DAY - 0.001));

    let both = store
        .find_jobs(&JobQuery::new().with_after("2024-01-01").with_before("2024-01-01"))
        .await
        .unwrap();
    let shas: Vec<_> = both.iter().map(|j| j.job.commit.sha.as_str()).collect();
    assert_eq!(shas, vec!["sha2", "sha1"]);
}

pub async fn invalid_date_is_an_error(store: &RecordStore) {
    clear(store).await;

    let err = store
        .find_jobs(&JobQuery::new().with_after("not-a-date"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery(_)));

    let err = store
        .delete_jobs(&JobQuery::new().with_before("2024-02-30"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery(_)));
}

pub async fn delete_by_branch(store: &RecordStore) {
    clear(store).await;
    store.insert_job(&job("a", "alice", Some("main"), 1.0)).await.unwrap();
    store.insert_job(&job("b", "alice", Some("main"), 2.0)).await.unwrap();
    store.insert_job(&job("c", "alice", Some("dev"), 3.0)).await.unwrap();
    store.insert_job(&job("d", "alice", None, 4.0)).await.unwrap();

    let removed = store
        .delete_jobs(&JobQuery::new().with_branch("main"))
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let remaining = store.find_jobs(&JobQuery::new()).await.unwrap();
    let shas: Vec<_> = remaining.iter().map(|j| j.job.commit.sha.as_str()).collect();
    assert_eq!(shas, vec!["d", "c"]);
}

pub async fn duplicate_uids_are_appended(store: &RecordStore) {
    clear(store).await;
    let job = job("abc", "alice", Some("main"), 1.0);
    store.insert_job(&job).await.unwrap();
    store.insert_job(&job).await.unwrap();

    let query = JobQuery::new().with_uid(job.uid.clone());
    assert_eq!(store.count_jobs(&query).await.unwrap(), 2);
}

pub async fn find_job_returns_first_inserted(store: &RecordStore) {
    clear(store).await;
    let mut first = job("abc", "alice", Some("main"), 2.0);
    first.output = "first".to_string();
    let mut second = first.clone();
    second.since = 1.0;
    second.output = "second".to_string();
    store.insert_job(&first).await.unwrap();
    store.insert_job(&second).await.unwrap();

    let found = store.find_job(&first.uid).await.unwrap().unwrap();
    assert_eq!(found.output, "first");
}

pub async fn zero_limit_returns_nothing(store: &RecordStore) {
    clear(store).await;
    store.insert_job(&job("abc", "alice", Some("main"), 1.0)).await.unwrap();

    let jobs = store.find_jobs(&JobQuery::new().with_limit(0)).await.unwrap();
    assert!(jobs.is_empty());

    let err = store
        .find_jobs(&JobQuery::new().with_limit(-1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidQuery(_)));
}

pub async fn non_finite_timestamp_is_rejected(store: &RecordStore) {
    clear(store).await;
    let mut job = job("abc", "alice", Some("main"), 1.0);
    job.since = f64::INFINITY;

    let err = store.insert_job(&job).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(_)));

    let mut finished = finished(job.clone(), JobResult::Passed);
    finished.job.since = 1.0;
    finished.runtime = Some(f64::NAN);
    let err = store.insert_finished_job(&finished).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRecord(_)));

    assert_eq!(store.count_jobs(&JobQuery::new()).await.unwrap(), 0);
}
