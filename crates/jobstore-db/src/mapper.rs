//! Conversion between job records and their stored document form.
//!
//! Field names written here are the storage contract: `ref` is stored as
//! `branch`, and multi-word fields use snake_case (`output_url`,
//! `merge_commit`, ...). Reading back checks required fields explicitly and
//! reports anything missing or mistyped as [`Error::MalformedRecord`].
//! Timestamps and runtimes must be finite to be written.

use jobstore_core::{CommitInfo, FinishedJobRecord, JobRecord, JobResult, PullRequestInfo};
use serde_json::{json, Map, Number, Value};

use crate::{Error, Result};

/// A stored job document
pub type Document = Map<String, Value>;

pub fn job_to_document(job: &JobRecord) -> Result<Document> {
    let mut doc = Document::new();
    doc.insert("uid".into(), Value::String(job.uid.clone()));
    doc.insert(
        "commit".into(),
        json!({
            "sha": job.commit.sha,
            "message": job.commit.message,
            "author": job.commit.author,
        }),
    );
    doc.insert("branch".into(), optional(job.git_ref.clone().map(Value::String)));
    doc.insert("prinfo".into(), optional(job.prinfo.as_ref().map(prinfo_to_value)));
    doc.insert("since".into(), finite("since", job.since)?);
    doc.insert("fasttracked".into(), optional(job.fasttracked.map(Value::Bool)));
    doc.insert("status".into(), optional(job.status.clone().map(Value::Object)));
    doc.insert("output".into(), Value::String(job.output.clone()));
    Ok(doc)
}

pub fn finished_job_to_document(job: &FinishedJobRecord) -> Result<Document> {
    let mut doc = job_to_document(&job.job)?;
    doc.insert(
        "result".into(),
        optional(job.result.map(|r| Value::String(r.as_str().to_string()))),
    );
    doc.insert("output_url".into(), optional(job.output_url.clone().map(Value::String)));
    let runtime = job.runtime.map(|r| finite("runtime", r)).transpose()?;
    doc.insert("runtime".into(), optional(runtime));
    Ok(doc)
}

pub fn job_from_document(doc: &Document) -> Result<JobRecord> {
    let commit = match doc.get("commit") {
        Some(Value::Object(commit)) => CommitInfo {
            sha: required_str(commit, "commit.sha", "sha")?,
            message: required_str(commit, "commit.message", "message")?,
            author: required_str(commit, "commit.author", "author")?,
        },
        Some(Value::Null) | None => return Err(malformed("missing field 'commit'")),
        Some(_) => return Err(malformed("field 'commit' is not an object")),
    };

    let prinfo = match doc.get("prinfo") {
        Some(Value::Object(prinfo)) => Some(prinfo_from_map(prinfo)?),
        Some(Value::Null) | None => None,
        Some(_) => return Err(malformed("field 'prinfo' is not an object")),
    };

    let status = match doc.get("status") {
        Some(Value::Object(status)) => Some(status.clone()),
        Some(Value::Null) | None => None,
        Some(_) => return Err(malformed("field 'status' is not an object")),
    };

    Ok(JobRecord {
        uid: required_str(doc, "uid", "uid")?,
        commit,
        git_ref: optional_str(doc, "branch")?,
        prinfo,
        since: required_f64(doc, "since")?,
        fasttracked: optional_bool(doc, "fasttracked")?,
        status,
        output: optional_str(doc, "output")?.unwrap_or_default(),
    })
}

pub fn finished_job_from_document(doc: &Document) -> Result<FinishedJobRecord> {
    let job = job_from_document(doc)?;

    let result = optional_str(doc, "result")?
        .map(|r| {
            r.parse::<JobResult>()
                .map_err(|e| malformed(&format!("field 'result': {}", e)))
        })
        .transpose()?;

    Ok(FinishedJobRecord {
        job,
        result,
        output_url: optional_str(doc, "output_url")?,
        runtime: optional_f64(doc, "runtime")?,
    })
}

fn prinfo_to_value(pr: &PullRequestInfo) -> Value {
    json!({
        "title": pr.title,
        "number": pr.number,
        "merge_commit": pr.merge_commit,
        "user": pr.user,
        "url": pr.url,
        "base_repo": pr.base_repo,
        "base_branch": pr.base_branch,
        "base_commit": pr.base_commit,
        "base_full_name": pr.base_full_name,
        "mergeable": pr.mergeable,
        "labels": pr.labels,
    })
}

fn prinfo_from_map(map: &Document) -> Result<PullRequestInfo> {
    let number = map
        .get("number")
        .and_then(Value::as_i64)
        .ok_or_else(|| malformed("missing or non-integer field 'prinfo.number'"))?;

    let mergeable = map
        .get("mergeable")
        .and_then(Value::as_bool)
        .ok_or_else(|| malformed("missing or non-boolean field 'prinfo.mergeable'"))?;

    let labels = match map.get("labels") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| malformed("non-string entry in 'prinfo.labels'"))
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(malformed("field 'prinfo.labels' is not an array")),
    };

    Ok(PullRequestInfo {
        title: required_str(map, "prinfo.title", "title")?,
        number,
        merge_commit: required_str(map, "prinfo.merge_commit", "merge_commit")?,
        user: required_str(map, "prinfo.user", "user")?,
        url: required_str(map, "prinfo.url", "url")?,
        base_repo: required_str(map, "prinfo.base_repo", "base_repo")?,
        base_branch: required_str(map, "prinfo.base_branch", "base_branch")?,
        base_commit: required_str(map, "prinfo.base_commit", "base_commit")?,
        base_full_name: required_str(map, "prinfo.base_full_name", "base_full_name")?,
        mergeable,
        labels,
    })
}

fn finite(name: &str, value: f64) -> Result<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| Error::InvalidRecord(format!("'{}' must be finite, got {}", name, value)))
}

fn optional(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}

fn malformed(message: &str) -> Error {
    Error::MalformedRecord(message.to_string())
}

fn required_str(map: &Document, path: &str, key: &str) -> Result<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| malformed(&format!("missing or non-string field '{}'", path)))
}

fn required_f64(map: &Document, key: &str) -> Result<f64> {
    map.get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed(&format!("missing or non-numeric field '{}'", key)))
}

fn optional_str(map: &Document, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(malformed(&format!("field '{}' is not a string", key))),
    }
}

fn optional_f64(map: &Document, key: &str) -> Result<Option<f64>> {
    match map.get(key) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| malformed(&format!("field '{}' is not a number", key))),
    }
}

fn optional_bool(map: &Document, key: &str) -> Result<Option<bool>> {
    match map.get(key) {
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(malformed(&format!("field '{}' is not a boolean", key))),
    }
}
