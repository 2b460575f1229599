pub mod job;
pub mod query;
pub mod error;

// Re-exports
pub use job::{CommitInfo, FinishedJobRecord, JobRecord, JobResult, PullRequestInfo};
pub use query::JobQuery;
pub use error::{Error, Result};
