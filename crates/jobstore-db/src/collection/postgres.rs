//! Job documents stored as JSONB rows of the `jobs` table.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Postgres, Row};

use super::{DocumentCollection, SORT_FIELD};
use crate::connection::ConnectionManager;
use crate::filter::{Field, Filter, FilterValue, Predicate};
use crate::mapper::Document;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
enum SqlArg {
    Text(String),
    Integer(i64),
    Float(f64),
}

/// A rendered `WHERE` clause and the arguments bound to its placeholders
#[derive(Debug, Clone, PartialEq)]
struct WhereClause {
    sql: String,
    args: Vec<SqlArg>,
}

impl WhereClause {
    fn next_placeholder(&self) -> String {
        format!("${}", self.args.len() + 1)
    }
}

/// Text extraction of a document field. Paths come from [`Field::path`] and
/// never from user input.
fn field_text(field: Field) -> String {
    match field.path() {
        [single] => format!("document->>'{}'", single),
        path => format!("document #>> '{{{}}}'", path.join(",")),
    }
}

/// First match in insertion order
fn select_one_sql(clause: &WhereClause) -> String {
    format!(
        "SELECT document FROM jobs WHERE {} ORDER BY id LIMIT 1",
        clause.sql
    )
}

/// Most recent matches first, ties in insertion order, the limit bound last
fn select_recent_sql(clause: &WhereClause) -> String {
    format!(
        "SELECT document FROM jobs WHERE {} \
         ORDER BY ({})::double precision DESC NULLS LAST, id \
         LIMIT {}",
        clause.sql,
        field_text(SORT_FIELD),
        clause.next_placeholder()
    )
}

fn render_filter(filter: &Filter) -> WhereClause {
    let mut clause = WhereClause {
        sql: String::new(),
        args: Vec::new(),
    };
    let mut conditions = Vec::new();

    for predicate in filter.predicates() {
        match predicate {
            Predicate::Equals { field, value } => {
                let placeholder = clause.next_placeholder();
                match value {
                    FilterValue::Text(text) => {
                        conditions.push(format!("{} = {}", field_text(*field), placeholder));
                        clause.args.push(SqlArg::Text(text.clone()));
                    }
                    FilterValue::Integer(n) => {
                        conditions.push(format!(
                            "({})::bigint = {}",
                            field_text(*field),
                            placeholder
                        ));
                        clause.args.push(SqlArg::Integer(*n));
                    }
                }
            }
            Predicate::Range { field, gte, lte } => {
                if let Some(lo) = gte {
                    let placeholder = clause.next_placeholder();
                    conditions.push(format!(
                        "({})::double precision >= {}",
                        field_text(*field),
                        placeholder
                    ));
                    clause.args.push(SqlArg::Float(*lo));
                }
                if let Some(hi) = lte {
                    let placeholder = clause.next_placeholder();
                    conditions.push(format!(
                        "({})::double precision <= {}",
                        field_text(*field),
                        placeholder
                    ));
                    clause.args.push(SqlArg::Float(*hi));
                }
            }
        }
    }

    clause.sql = if conditions.is_empty() {
        "TRUE".to_string()
    } else {
        conditions.join(" AND ")
    };
    clause
}

fn bind_args<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    args: &[SqlArg],
) -> Query<'q, Postgres, PgArguments> {
    for arg in args {
        query = match arg {
            SqlArg::Text(text) => query.bind(text.clone()),
            SqlArg::Integer(n) => query.bind(*n),
            SqlArg::Float(f) => query.bind(*f),
        };
    }
    query
}

fn into_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(Error::MalformedRecord(format!(
            "stored document is not an object: {}",
            other
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct PgCollection {
    pool: PgPool,
}

impl PgCollection {
    pub fn new(connection: &ConnectionManager) -> Self {
        Self {
            pool: connection.pool().clone(),
        }
    }
}

#[async_trait]
impl DocumentCollection for PgCollection {
    async fn insert_one(&self, doc: Document) -> Result<()> {
        sqlx::query("INSERT INTO jobs (document) VALUES ($1)")
            .bind(Json(Value::Object(doc)))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let clause = render_filter(filter);
        let sql = select_one_sql(&clause);

        let row = bind_args(sqlx::query(&sql), &clause.args)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(value) = row.try_get::<Json<Value>, _>("document")?;
                Ok(Some(into_document(value)?))
            }
            None => Ok(None),
        }
    }

    async fn find_recent(&self, filter: &Filter, limit: i64) -> Result<Vec<Document>> {
        let clause = render_filter(filter);
        let sql = select_recent_sql(&clause);

        let rows = bind_args(sqlx::query(&sql), &clause.args)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let Json(value) = row.try_get::<Json<Value>, _>("document")?;
                into_document(value)
            })
            .collect()
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        let clause = render_filter(filter);
        let sql = format!("SELECT COUNT(*) AS total FROM jobs WHERE {}", clause.sql);

        let row = bind_args(sqlx::query(&sql), &clause.args)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;

        Ok(total as u64)
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64> {
        let clause = render_filter(filter);
        let sql = format!("DELETE FROM jobs WHERE {}", clause.sql);

        let result = bind_args(sqlx::query(&sql), &clause.args)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
