use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{DocumentCollection, SORT_FIELD};
use crate::filter::Filter;
use crate::mapper::Document;
use crate::Result;

/// Process-local document collection, used for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryCollection {
    documents: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_key(doc: &Document) -> f64 {
    SORT_FIELD
        .lookup(doc)
        .and_then(Value::as_f64)
        .unwrap_or(f64::NEG_INFINITY)
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert_one(&self, doc: Document) -> Result<()> {
        self.documents.write().await.push(doc);
        Ok(())
    }

    async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|doc| filter.matches(doc)).cloned())
    }

    async fn find_recent(&self, filter: &Filter, limit: i64) -> Result<Vec<Document>> {
        let mut matching: Vec<Document> = {
            let documents = self.documents.read().await;
            documents
                .iter()
                .filter(|doc| filter.matches(doc))
                .cloned()
                .collect()
        };

        matching.sort_by(|a, b| sort_key(b).total_cmp(&sort_key(a)));
        matching.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(matching)
    }

    async fn count(&self, filter: &Filter) -> Result<u64> {
        let documents = self.documents.read().await;
        Ok(documents.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    async fn delete_many(&self, filter: &Filter) -> Result<u64> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|doc| !filter.matches(doc));
        Ok((before - documents.len()) as u64)
    }
}
