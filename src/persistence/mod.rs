// * Persistence Layer
// * Typed records, the SQLite storage session and the durable work-list.

pub mod schema;
pub mod store;
pub mod worklist;

// * Re-exports for convenient access
pub use schema::{
    ExternalId, Field, IdError, MediaRecord, MovieRecord, Record, RecordKind, SeriesRecord,
    MOVIE_TABLE, SERIES_TABLE,
};
pub use store::{Store, StoreError};
pub use worklist::{WorkList, WorkListError, WorkQueue};
