// * Storage session: one SQLite connection scoped to a harvest run
// * Insert-only. A duplicate id in either table is a non-fatal per-item failure.

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::persistence::schema::{
    ExternalId, Record, RecordKind, CREATE_MOVIE_TABLE, CREATE_SERIES_TABLE, INSERT_MOVIE,
    INSERT_SERIES,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} is already stored")]
    DuplicateKey(ExternalId),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Location {
    File(PathBuf),
    Memory,
}

pub struct Store {
    conn: Connection,
    location: Location,
}

impl Store {
    /// Opens (creating if needed) the database file and both tables
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let location = Location::File(path);
        let conn = Self::connect(&location)?;
        let store = Self { conn, location };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens a private in-memory database; `recycle` keeps the same connection
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let location = Location::Memory;
        let conn = Self::connect(&location)?;
        let store = Self { conn, location };
        store.init_schema()?;
        Ok(store)
    }

    fn connect(location: &Location) -> Result<Connection, StoreError> {
        let conn = match location {
            Location::File(path) => {
                let conn = Connection::open(path)?;
                conn.execute_batch("PRAGMA journal_mode=WAL;")?;
                conn
            }
            Location::Memory => Connection::open_in_memory()?,
        };
        Ok(conn)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(CREATE_MOVIE_TABLE)?;
        self.conn.execute_batch(CREATE_SERIES_TABLE)?;
        Ok(())
    }

    /// Closes the connection and opens a fresh one on the same file
    pub fn recycle(&mut self) -> Result<(), StoreError> {
        if self.location == Location::Memory {
            debug!("In-memory store, recycle skipped");
            return Ok(());
        }

        let fresh = Self::connect(&self.location)?;
        let stale = std::mem::replace(&mut self.conn, fresh);
        stale.close().map_err(|(_, e)| StoreError::Sqlite(e))?;
        debug!("Storage connection recycled");
        Ok(())
    }

    /// Returns the stored title when the id exists in either table
    pub fn exists(&self, id: &ExternalId) -> Result<Option<String>, StoreError> {
        for kind in [RecordKind::Movie, RecordKind::Series] {
            let sql = format!("SELECT title FROM {} WHERE id = ?1", kind.table());
            let title: Option<Option<String>> = self
                .conn
                .query_row(&sql, params![id], |row| row.get(0))
                .optional()?;

            if let Some(title) = title {
                return Ok(Some(title.unwrap_or_default()));
            }
        }
        Ok(None)
    }

    /// Inserts a new record. Never updates an existing row.
    pub fn insert(&self, record: &Record) -> Result<(), StoreError> {
        let id = record.id();

        // * Ids are unique across both tables, the primary key only guards one
        if self.exists(id)?.is_some() {
            return Err(StoreError::DuplicateKey(id.clone()));
        }

        let result = match record {
            Record::Movie(movie) => {
                let m = &movie.media;
                self.conn.execute(
                    INSERT_MOVIE,
                    params![
                        m.id,
                        m.title,
                        m.original_title,
                        m.score,
                        m.voters,
                        m.plot,
                        m.poster,
                        m.rated,
                        m.genre,
                        m.kind,
                        m.release_date,
                        m.countries,
                        m.actors,
                        movie.director,
                        movie.runtime,
                    ],
                )
            }
            Record::Series(series) => {
                let m = &series.media;
                self.conn.execute(
                    INSERT_SERIES,
                    params![
                        m.id,
                        m.title,
                        m.original_title,
                        m.score,
                        m.voters,
                        m.plot,
                        m.poster,
                        m.rated,
                        m.genre,
                        m.kind,
                        m.release_date,
                        m.countries,
                        m.actors,
                        series.creator,
                        series.runtime,
                        series.years,
                        series.seasons,
                    ],
                )
            }
        };

        match result {
            Ok(_) => {
                info!(id = %id, kind = record.kind().label(), title = record.title(), "Record stored");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateKey(id.clone()))
            }
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    /// Row count of one table
    pub fn count(&self, kind: RecordKind) -> Result<usize, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::schema::{Field, MediaRecord, MovieRecord, SeriesRecord};

    fn media(id: &str, title: &str, kind: RecordKind) -> MediaRecord {
        MediaRecord {
            id: ExternalId::parse(id).unwrap(),
            title: title.to_string(),
            original_title: title.to_string(),
            score: 8.1,
            voters: Field::Unknown,
            plot: "NA".to_string(),
            poster: "NA".to_string(),
            rated: "PG-13".to_string(),
            genre: "Drama".to_string(),
            kind: kind.label().to_string(),
            release_date: "1994".to_string(),
            countries: "United States".to_string(),
            actors: "NA".to_string(),
        }
    }

    fn movie(id: &str, title: &str) -> Record {
        Record::Movie(MovieRecord {
            media: media(id, title, RecordKind::Movie),
            director: "Frank Darabont".to_string(),
            runtime: "2h 22m".to_string(),
        })
    }

    fn series(id: &str, title: &str) -> Record {
        Record::Series(SeriesRecord {
            media: media(id, title, RecordKind::Series),
            creator: "Vince Gilligan".to_string(),
            runtime: "49m".to_string(),
            years: "2008-2013".to_string(),
            seasons: Field::Known(5),
        })
    }

    #[test]
    fn test_insert_and_exists() {
        let store = Store::open_in_memory().unwrap();
        let id = ExternalId::parse("tt0111161").unwrap();

        assert_eq!(store.exists(&id).unwrap(), None);
        store.insert(&movie("tt0111161", "The Shawshank Redemption")).unwrap();
        assert_eq!(
            store.exists(&id).unwrap().as_deref(),
            Some("The Shawshank Redemption")
        );
        assert_eq!(store.count(RecordKind::Movie).unwrap(), 1);
        assert_eq!(store.count(RecordKind::Series).unwrap(), 0);
    }

    #[test]
    fn test_exists_checks_series_table() {
        let store = Store::open_in_memory().unwrap();
        store.insert(&series("tt0903747", "Breaking Bad")).unwrap();

        let id = ExternalId::parse("tt0903747").unwrap();
        assert_eq!(store.exists(&id).unwrap().as_deref(), Some("Breaking Bad"));
    }

    #[test]
    fn test_duplicate_is_reported_not_overwritten() {
        let store = Store::open_in_memory().unwrap();
        store.insert(&movie("tt0111161", "First")).unwrap();

        let err = store.insert(&movie("tt0111161", "Second")).unwrap_err();
        assert!(err.is_duplicate());

        let id = ExternalId::parse("tt0111161").unwrap();
        assert_eq!(store.exists(&id).unwrap().as_deref(), Some("First"));
    }

    #[test]
    fn test_id_unique_across_tables() {
        let store = Store::open_in_memory().unwrap();
        store.insert(&movie("tt0000001", "Movie")).unwrap();

        let err = store.insert(&series("tt0000001", "Series")).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(store.count(RecordKind::Series).unwrap(), 0);
    }

    #[test]
    fn test_unknown_voters_stored_as_sentinel() {
        let store = Store::open_in_memory().unwrap();
        store.insert(&movie("tt0000002", "Quiet Film")).unwrap();

        let voters: String = store
            .conn
            .query_row(
                "SELECT voters FROM movie_details WHERE id = 'tt0000002'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(voters, "NA");
    }

    #[test]
    fn test_recycle_keeps_data_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Store::open(dir.path().join("nested/harvest.sqlite")).unwrap();
        store.insert(&series("tt0903747", "Breaking Bad")).unwrap();

        store.recycle().unwrap();

        let id = ExternalId::parse("tt0903747").unwrap();
        assert!(store.exists(&id).unwrap().is_some());
    }
}
