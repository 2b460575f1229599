pub mod collection;
pub mod connection;
pub mod error;
pub mod filter;
pub mod mapper;
pub mod store;

// Re-exports
pub use collection::{DocumentCollection, MemoryCollection, PgCollection};
pub use connection::{ConnectionConfig, ConnectionManager, MAX_POOL_SIZE};
pub use error::{Error, Result};
pub use filter::{Filter, QueryTranslator, TranslatedQuery};
pub use mapper::Document;
pub use store::{RecordStore, DEFAULT_LIMIT};
