use clap::{Args, Parser, Subcommand};
use jobstore_core::JobQuery;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jobstore")]
#[command(about = "Query and maintain stored CI job records", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Settings file (defaults to ./jobstore.toml when present)
    #[arg(long, env = "JOBSTORE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Filters shared by the query commands
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Job uid
    #[arg(long)]
    pub uid: Option<String>,

    /// Pull request number
    #[arg(long)]
    pub prnum: Option<i64>,

    /// Branch or tag name
    #[arg(long)]
    pub branch: Option<String>,

    /// Commit SHA
    #[arg(long)]
    pub sha: Option<String>,

    /// Commit author
    #[arg(long)]
    pub author: Option<String>,

    /// Job result (passed or errored; other values are ignored)
    #[arg(long)]
    pub result: Option<String>,

    /// Only jobs updated on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub after: Option<String>,

    /// Only jobs updated on or before this date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    pub before: Option<String>,
}

impl QueryArgs {
    pub fn into_query(self, limit: Option<i64>) -> JobQuery {
        JobQuery {
            limit,
            uid: self.uid,
            prnum: self.prnum,
            branch: self.branch,
            sha: self.sha,
            author: self.author,
            result: self.result,
            after: self.after,
            before: self.before,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the jobs table and indexes
    InitDb,

    /// Show a single job
    Show {
        /// Job uid
        uid: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List matching jobs, most recent first
    List {
        #[command(flatten)]
        filters: QueryArgs,

        /// Limit number of results
        #[arg(long)]
        limit: Option<i64>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Count matching jobs
    Count {
        #[command(flatten)]
        filters: QueryArgs,
    },

    /// Permanently delete matching jobs
    Delete {
        #[command(flatten)]
        filters: QueryArgs,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}
