use std::sync::Arc;

use jobstore_core::{FinishedJobRecord, JobQuery, JobRecord};
use tracing::{debug, instrument, warn};

use crate::collection::{DocumentCollection, MemoryCollection, PgCollection};
use crate::connection::ConnectionManager;
use crate::filter::{Filter, QueryTranslator};
use crate::mapper;
use crate::Result;

/// Fallback page size when neither the query nor configuration sets one
pub const DEFAULT_LIMIT: i64 = 25;

/// Reads and writes job records.
///
/// Inserts are append-only: no uniqueness check is made on `uid` and no
/// update operation exists.
#[derive(Clone)]
pub struct RecordStore {
    collection: Arc<dyn DocumentCollection>,
    translator: QueryTranslator,
}

impl RecordStore {
    pub fn new(collection: Arc<dyn DocumentCollection>, default_limit: i64) -> Self {
        Self {
            collection,
            translator: QueryTranslator::new(default_limit),
        }
    }

    /// Store backed by the `jobs` table of an opened connection
    pub fn postgres(connection: &ConnectionManager, default_limit: i64) -> Self {
        Self::new(Arc::new(PgCollection::new(connection)), default_limit)
    }

    pub fn in_memory(default_limit: i64) -> Self {
        Self::new(Arc::new(MemoryCollection::new()), default_limit)
    }

    #[instrument(skip(self, job), fields(uid = %job.uid))]
    pub async fn insert_job(&self, job: &JobRecord) -> Result<()> {
        debug!("Inserting job to database");
        self.collection
            .insert_one(mapper::job_to_document(job)?)
            .await
    }

    #[instrument(skip(self, job), fields(uid = %job.job.uid))]
    pub async fn insert_finished_job(&self, job: &FinishedJobRecord) -> Result<()> {
        debug!("Inserting finished job to database");
        self.collection
            .insert_one(mapper::finished_job_to_document(job)?)
            .await
    }

    /// Look up one job. A missing job is logged and reported as `None`.
    #[instrument(skip(self))]
    pub async fn find_job(&self, uid: &str) -> Result<Option<JobRecord>> {
        match self.collection.find_one(&Filter::by_uid(uid)).await? {
            Some(doc) => Ok(Some(mapper::job_from_document(&doc)?)),
            None => {
                warn!("Cannot find job matching uid '{}'", uid);
                Ok(None)
            }
        }
    }

    /// Matching jobs, most recently updated first
    #[instrument(skip(self))]
    pub async fn find_jobs(&self, query: &JobQuery) -> Result<Vec<FinishedJobRecord>> {
        let translated = self.translator.translate(query)?;
        let docs = self
            .collection
            .find_recent(&translated.filter, translated.limit)
            .await?;

        debug!(count = docs.len(), "Found jobs matching query");
        docs.iter().map(mapper::finished_job_from_document).collect()
    }

    /// Number of matching jobs; `limit` is ignored
    #[instrument(skip(self))]
    pub async fn count_jobs(&self, query: &JobQuery) -> Result<u64> {
        let translated = self.translator.translate(query)?;
        self.collection.count(&translated.filter).await
    }

    /// Permanently remove every matching job, returning how many were removed.
    /// `limit` is ignored.
    #[instrument(skip(self))]
    pub async fn delete_jobs(&self, query: &JobQuery) -> Result<u64> {
        let translated = self.translator.translate(query)?;
        let removed = self.collection.delete_many(&translated.filter).await?;

        debug!(removed, "Deleted jobs matching query");
        Ok(removed)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("translator", &self.translator)
            .finish_non_exhaustive()
    }
}
