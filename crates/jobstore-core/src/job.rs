use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::Error;

/// Final outcome of a finished job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobResult {
    Passed,
    Errored,
}

impl JobResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobResult::Passed => "passed",
            JobResult::Errored => "errored",
        }
    }
}

impl std::fmt::Display for JobResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "passed" => Ok(JobResult::Passed),
            "errored" => Ok(JobResult::Errored),
            _ => Err(Error::InvalidResult(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
    pub author: String,
}

impl CommitInfo {
    pub fn new(
        sha: impl Into<String>,
        message: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            sha: sha.into(),
            message: message.into(),
            author: author.into(),
        }
    }
}

/// Pull request details attached to jobs triggered by a pull request.
///
/// Only `number` is ever used for filtering; the rest is carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequestInfo {
    pub title: String,
    pub number: i64,
    pub merge_commit: String,
    pub user: String,
    pub url: String,
    pub base_repo: String,
    pub base_branch: String,
    pub base_commit: String,
    pub base_full_name: String,
    pub mergeable: bool,
    pub labels: Vec<String>,
}

/// One CI run at any stage of its lifecycle (queued, building, finished).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Hex-encoded unique identifier
    pub uid: String,
    pub commit: CommitInfo,
    /// Branch or tag name, set when the job was not triggered by a pull request
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub prinfo: Option<PullRequestInfo>,
    /// Time of last update, in seconds since the Unix epoch
    pub since: f64,
    pub fasttracked: Option<bool>,
    pub status: Option<Map<String, Value>>,
    pub output: String,
}

impl JobRecord {
    pub fn new(
        commit: CommitInfo,
        git_ref: Option<String>,
        prinfo: Option<PullRequestInfo>,
    ) -> Self {
        Self {
            uid: Uuid::new_v4().simple().to_string(),
            commit,
            git_ref,
            prinfo,
            since: now_timestamp(),
            fasttracked: None,
            status: None,
            output: String::new(),
        }
    }

    pub fn is_pull_request(&self) -> bool {
        self.prinfo.is_some()
    }

    /// Refresh the recency marker
    pub fn touch(&mut self) {
        self.since = now_timestamp();
    }

    pub fn finish(
        mut self,
        result: JobResult,
        output_url: String,
        runtime: f64,
    ) -> FinishedJobRecord {
        self.touch();
        FinishedJobRecord {
            job: self,
            result: Some(result),
            output_url: Some(output_url),
            runtime: Some(runtime),
        }
    }
}

/// A job record carrying its terminal fields.
///
/// The terminal fields stay optional because list queries return every
/// matching record, including those still queued or building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinishedJobRecord {
    #[serde(flatten)]
    pub job: JobRecord,
    pub result: Option<JobResult>,
    pub output_url: Option<String>,
    /// Runtime in seconds
    pub runtime: Option<f64>,
}

impl FinishedJobRecord {
    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }
}

fn now_timestamp() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
