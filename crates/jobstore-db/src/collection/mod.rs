pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::filter::{Field, Filter};
use crate::mapper::Document;
use crate::Result;

pub use memory::MemoryCollection;
pub use postgres::PgCollection;

/// The field list queries sort on, most recent first
pub const SORT_FIELD: Field = Field::Since;

/// A store of job documents that can be selected with a [`Filter`].
///
/// Each call is atomic as seen by the store; calls issued concurrently may
/// complete in any order.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn insert_one(&self, doc: Document) -> Result<()>;

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>>;

    /// Matching documents ordered by `since` descending, at most `limit` of them
    async fn find_recent(&self, filter: &Filter, limit: i64) -> Result<Vec<Document>>;

    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Remove every matching document, returning how many were removed
    async fn delete_many(&self, filter: &Filter) -> Result<u64>;
}
