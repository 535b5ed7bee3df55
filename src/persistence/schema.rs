// * Relational schema and typed records for movie and series metadata
// * Every column is always populated: either an extracted value or the "NA" sentinel.

use regex::Regex;
use rusqlite::types::{ToSql, ToSqlOutput};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

use crate::config::constants::UNKNOWN;

pub const MOVIE_TABLE: &str = "movie_details";
pub const SERIES_TABLE: &str = "series_details";

pub const CREATE_MOVIE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS movie_details (
        id             TEXT NOT NULL PRIMARY KEY,
        title          TEXT,
        original_title TEXT,
        score          REAL,
        voters         INTEGER,
        plot           TEXT,
        poster         TEXT,
        rated          TEXT,
        genre          TEXT,
        kind           TEXT,
        release_date   TEXT,
        countries      TEXT,
        actors         TEXT,
        director       TEXT,
        runtime        TEXT
    );";

pub const CREATE_SERIES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS series_details (
        id             TEXT NOT NULL PRIMARY KEY,
        title          TEXT,
        original_title TEXT,
        score          REAL,
        voters         INTEGER,
        plot           TEXT,
        poster         TEXT,
        rated          TEXT,
        genre          TEXT,
        kind           TEXT,
        release_date   TEXT,
        countries      TEXT,
        actors         TEXT,
        creator        TEXT,
        runtime        TEXT,
        years          TEXT,
        seasons        INTEGER
    );";

pub const INSERT_MOVIE: &str = "
    INSERT INTO movie_details (
        id, title, original_title, score, voters, plot, poster, rated, genre, kind,
        release_date, countries, actors, director, runtime
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)";

pub const INSERT_SERIES: &str = "
    INSERT INTO series_details (
        id, title, original_title, score, voters, plot, poster, rated, genre, kind,
        release_date, countries, actors, creator, runtime, years, seasons
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)";

static TITLE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/title/([A-Za-z]{2}\d+)").expect("Invalid title path regex"));

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("External id is empty")]
    Empty,

    #[error("External id contains whitespace: {0:?}")]
    Whitespace(String),

    #[error("No title id found in {0}")]
    NoTitleInUrl(String),
}

/// Opaque source-assigned identifier, e.g. `tt0111161`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Extracts the id from a title-page link such as `https://www.imdb.com/title/tt0111161/`
    pub fn from_url(link: &str) -> Result<Self, IdError> {
        TITLE_PATH
            .captures(link)
            .and_then(|caps| caps.get(1))
            .map(|m| Self(m.as_str().to_string()))
            .ok_or_else(|| IdError::NoTitleInUrl(link.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ExternalId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl ToSql for ExternalId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.as_str()))
    }
}

/// A typed column value that may have degraded to the "NA" sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<T> {
    Known(T),
    Unknown,
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Field::Unknown, Field::Known)
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Known(v) => v.fmt(f),
            Field::Unknown => f.write_str(UNKNOWN),
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Known(v) => v.serialize(serializer),
            Field::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

// * SQLite columns are dynamically typed, so the sentinel is stored as text
impl<T: ToSql> ToSql for Field<T> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Field::Known(v) => v.to_sql(),
            Field::Unknown => Ok(ToSqlOutput::from(UNKNOWN)),
        }
    }
}

/// Which table a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    Movie,
    Series,
}

impl RecordKind {
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Movie => MOVIE_TABLE,
            RecordKind::Series => SERIES_TABLE,
        }
    }

    /// Value stored in the `kind` column
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Movie => "Movie",
            RecordKind::Series => "TV Series",
        }
    }
}

/// Attributes shared by movies and series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaRecord {
    pub id: ExternalId,
    pub title: String,
    pub original_title: String,
    /// -1.0 when unknown
    pub score: f64,
    pub voters: Field<i64>,
    pub plot: String,
    pub poster: String,
    pub rated: String,
    pub genre: String,
    pub kind: String,
    pub release_date: String,
    pub countries: String,
    pub actors: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieRecord {
    #[serde(flatten)]
    pub media: MediaRecord,
    pub director: String,
    pub runtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord {
    #[serde(flatten)]
    pub media: MediaRecord,
    pub creator: String,
    pub runtime: String,
    pub years: String,
    pub seasons: Field<u32>,
}

/// A fully built record, ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Movie(MovieRecord),
    Series(SeriesRecord),
}

impl Record {
    pub fn media(&self) -> &MediaRecord {
        match self {
            Record::Movie(m) => &m.media,
            Record::Series(s) => &s.media,
        }
    }

    pub fn id(&self) -> &ExternalId {
        &self.media().id
    }

    pub fn title(&self) -> &str {
        &self.media().title
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Movie(_) => RecordKind::Movie,
            Record::Series(_) => RecordKind::Series,
        }
    }
}
