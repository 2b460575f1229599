//! Translation of [`JobQuery`] values into store-independent filters.

use chrono::NaiveDate;
use jobstore_core::JobQuery;
use serde_json::Value;

use crate::mapper::Document;
use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Document fields a filter can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Uid,
    PrNumber,
    Branch,
    CommitSha,
    CommitAuthor,
    Result,
    Since,
}

impl Field {
    /// Location of the field inside a stored document
    pub fn path(&self) -> &'static [&'static str] {
        match self {
            Field::Uid => &["uid"],
            Field::PrNumber => &["prinfo", "number"],
            Field::Branch => &["branch"],
            Field::CommitSha => &["commit", "sha"],
            Field::CommitAuthor => &["commit", "author"],
            Field::Result => &["result"],
            Field::Since => &["since"],
        }
    }

    /// The field's value in `doc`, if present
    pub fn lookup<'a>(&self, doc: &'a Document) -> Option<&'a Value> {
        lookup(doc, self.path())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals { field: Field, value: FilterValue },
    /// Inclusive bounds; a missing bound is unconstrained
    Range {
        field: Field,
        gte: Option<f64>,
        lte: Option<f64>,
    },
}

impl Predicate {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Predicate::Equals { field, value } => {
                let found = field.lookup(doc);
                match value {
                    FilterValue::Text(expected) => {
                        found.and_then(Value::as_str) == Some(expected.as_str())
                    }
                    FilterValue::Integer(expected) => {
                        found.and_then(Value::as_i64) == Some(*expected)
                    }
                }
            }
            Predicate::Range { field, gte, lte } => {
                match field.lookup(doc).and_then(Value::as_f64) {
                    Some(v) => gte.map_or(true, |lo| v >= lo) && lte.map_or(true, |hi| v <= hi),
                    None => false,
                }
            }
        }
    }
}

/// Conjunction of predicates. An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_uid(uid: &str) -> Self {
        Self::all().and(Predicate::Equals {
            field: Field::Uid,
            value: FilterValue::Text(uid.to_string()),
        })
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.predicates.iter().all(|p| p.matches(doc))
    }
}

/// A filter together with the resolved result limit
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    pub filter: Filter,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryTranslator {
    default_limit: i64,
}

impl QueryTranslator {
    pub fn new(default_limit: i64) -> Self {
        Self { default_limit }
    }

    pub fn translate(&self, query: &JobQuery) -> Result<TranslatedQuery> {
        let limit = query.limit.unwrap_or(self.default_limit);
        if limit < 0 {
            return Err(Error::InvalidQuery(format!("negative limit {}", limit)));
        }

        let mut filter = Filter::all();

        if let Some(uid) = &query.uid {
            filter = filter.and(text_equals(Field::Uid, uid));
        }
        if let Some(prnum) = query.prnum {
            filter = filter.and(Predicate::Equals {
                field: Field::PrNumber,
                value: FilterValue::Integer(prnum),
            });
        }
        if let Some(branch) = &query.branch {
            filter = filter.and(text_equals(Field::Branch, branch));
        }
        if let Some(sha) = &query.sha {
            filter = filter.and(text_equals(Field::CommitSha, sha));
        }
        if let Some(author) = &query.author {
            filter = filter.and(text_equals(Field::CommitAuthor, author));
        }
        if let Some(result) = query.recognized_result() {
            filter = filter.and(text_equals(Field::Result, result.as_str()));
        }

        let gte = query
            .after
            .as_deref()
            .map(|after| parse_date("after", after).map(start_of_day))
            .transpose()?;
        let lte = query
            .before
            .as_deref()
            .map(|before| parse_date("before", before).and_then(end_of_day))
            .transpose()?;
        if gte.is_some() || lte.is_some() {
            filter = filter.and(Predicate::Range {
                field: Field::Since,
                gte,
                lte,
            });
        }

        Ok(TranslatedQuery { filter, limit })
    }
}

fn text_equals(field: Field, value: &str) -> Predicate {
    Predicate::Equals {
        field,
        value: FilterValue::Text(value.to_string()),
    }
}

fn lookup<'a>(doc: &'a Document, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter().try_fold(doc.get(*first)?, |value, key| value.get(key))
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| {
        Error::InvalidQuery(format!(
            "'{}' must be a YYYY-MM-DD date, got '{}': {}",
            name, value, e
        ))
    })
}

// Calendar dates are taken as UTC days.
fn start_of_day(date: NaiveDate) -> f64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp() as f64
}

fn end_of_day(date: NaiveDate) -> Result<f64> {
    let end = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| Error::InvalidQuery(format!("no end of day for {}", date)))?;
    Ok(end.and_utc().timestamp_millis() as f64 / 1000.0)
}
