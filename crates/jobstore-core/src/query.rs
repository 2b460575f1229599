use serde::{Deserialize, Serialize};

use crate::job::JobResult;

/// Optional filters used to select job records.
///
/// Every field left as `None` places no constraint on the selection.
/// `after` and `before` are calendar dates in `YYYY-MM-DD` form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    /// Maximum number of records returned; falls back to the configured default
    pub limit: Option<i64>,
    pub uid: Option<String>,
    pub prnum: Option<i64>,
    pub branch: Option<String>,
    pub sha: Option<String>,
    pub author: Option<String>,
    pub result: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl JobQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_prnum(mut self, prnum: i64) -> Self {
        self.prnum = Some(prnum);
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    /// The result filter, if it names a known outcome. Unknown values are ignored.
    pub fn recognized_result(&self) -> Option<JobResult> {
        self.result.as_deref().and_then(|r| r.parse().ok())
    }
}
