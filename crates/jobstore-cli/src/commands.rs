use anyhow::Result;

use crate::cli::Commands;
use jobstore_core::{FinishedJobRecord, JobQuery, JobRecord};
use jobstore_db::{ConnectionManager, RecordStore};

pub async fn execute(
    command: Commands,
    connection: &ConnectionManager,
    store: &RecordStore,
) -> Result<()> {
    match command {
        Commands::InitDb => {
            println!("Initializing database schema...");
            connection.init_schema().await?;
            println!("✓ Database initialized successfully");
        }

        Commands::Show { uid, json } => match store.find_job(&uid).await? {
            Some(job) if json => println!("{}", serde_json::to_string_pretty(&job)?),
            Some(job) => print_job(&job),
            None => println!("Job not found: {}", uid),
        },

        Commands::List {
            filters,
            limit,
            json,
        } => {
            let jobs = store.find_jobs(&filters.into_query(limit)).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&jobs)?);
            } else {
                println!("Jobs: {}", jobs.len());
                println!();
                for job in &jobs {
                    print_finished_job(job);
                    println!();
                }
            }
        }

        Commands::Count { filters } => {
            let total = store.count_jobs(&filters.into_query(None)).await?;
            println!("{}", total);
        }

        Commands::Delete { filters, yes } => {
            let query = filters.into_query(None);
            if !yes {
                let matching = store.count_jobs(&query).await?;
                anyhow::bail!(
                    "Refusing to delete {} job(s) without --yes{}",
                    matching,
                    if query == JobQuery::default() {
                        " (no filters given: this would delete every job)"
                    } else {
                        ""
                    }
                );
            }

            let removed = store.delete_jobs(&query).await?;
            println!("✓ Deleted {} job(s)", removed);
        }
    }

    Ok(())
}

fn print_job(job: &JobRecord) {
    println!("Job: {}", job.uid);
    println!("  Commit: {} ({})", job.commit.sha, job.commit.author);
    println!("  Message: {}", job.commit.message.lines().next().unwrap_or(""));

    match (&job.prinfo, &job.git_ref) {
        (Some(pr), _) => println!("  PR: #{} {} ({})", pr.number, pr.title, pr.url),
        (None, Some(git_ref)) => println!("  Ref: {}", git_ref),
        (None, None) => {}
    }

    println!("  Updated: {}", format_timestamp(job.since));

    if job.fasttracked == Some(true) {
        println!("  Fasttracked: yes");
    }

    if let Some(status) = &job.status {
        if let Ok(status) = serde_json::to_string(status) {
            println!("  Status: {}", status);
        }
    }
}

fn print_finished_job(job: &FinishedJobRecord) {
    print_job(&job.job);

    if let Some(result) = job.result {
        println!("  Result: {}", result);
    }
    if let Some(runtime) = job.runtime {
        println!("  Runtime: {:.1}s", runtime);
    }
    if let Some(output_url) = &job.output_url {
        println!("  Output: {}", output_url);
    }
}

fn format_timestamp(since: f64) -> String {
    chrono::DateTime::from_timestamp(since.trunc() as i64, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| since.to_string())
}
