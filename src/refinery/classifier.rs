// * Type Classifier & Record Builder
// * Dispatches on the structured-data `@type` tag and assembles a fully populated record.

use tracing::debug;

use crate::config::constants::{SCORE_UNKNOWN, UNKNOWN};
use crate::engine::normalization::{clean_or_unknown, full_size_poster, join_list, start_year};
use crate::persistence::schema::{
    ExternalId, Field, MediaRecord, MovieRecord, Record, RecordKind, SeriesRecord,
};
use crate::refinery::fields;
use crate::refinery::page::PageView;
use crate::refinery::registry::{FieldChain, Resolved};
use crate::refinery::structured_data::DecodedPage;

/// Entity variant named by the structured-data tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Movie,
    TvSeries,
    TvEpisode,
    Unsupported(String),
}

impl MediaKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("Movie") => MediaKind::Movie,
            Some("TVSeries") => MediaKind::TvSeries,
            Some("TVEpisode") => MediaKind::TvEpisode,
            Some(other) => MediaKind::Unsupported(other.to_string()),
            None => MediaKind::Unsupported("<untagged>".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Record(Record),
    /// Episodes are never persisted; skipping one is not an error
    Episode,
    Unsupported(String),
}

/// Classifies a decoded page and, for supported kinds, builds its record
pub fn classify(id: &ExternalId, page: &DecodedPage) -> Classification {
    let kind = MediaKind::from_tag(page.data.kind_tag());
    debug!(id = %id, kind = ?kind, "Page classified");

    match kind {
        MediaKind::Movie => Classification::Record(Record::Movie(build_movie(id, page))),
        MediaKind::TvSeries => Classification::Record(Record::Series(build_series(id, page))),
        MediaKind::TvEpisode => Classification::Episode,
        MediaKind::Unsupported(tag) => Classification::Unsupported(tag),
    }
}

fn text(resolved: Resolved<String>) -> String {
    resolved
        .into_option()
        .map_or_else(|| UNKNOWN.to_string(), |v| clean_or_unknown(&v))
}

fn list(resolved: Resolved<Vec<String>>) -> String {
    resolved
        .into_option()
        .map_or_else(|| UNKNOWN.to_string(), |items| join_list(&items))
}

fn build_media(
    id: &ExternalId,
    view: &PageView<'_>,
    kind: RecordKind,
    actors: &FieldChain<Vec<String>>,
) -> MediaRecord {
    MediaRecord {
        id: id.clone(),
        title: text(fields::TITLE.resolve(view)),
        original_title: text(fields::ORIGINAL_TITLE.resolve(view)),
        score: fields::SCORE.resolve(view).into_option().unwrap_or(SCORE_UNKNOWN),
        voters: Field::from(fields::VOTERS.resolve(view).into_option()),
        plot: text(fields::PLOT.resolve(view)),
        // * URLs skip text cleanup, it would strip the scheme's colon
        poster: fields::POSTER
            .resolve(view)
            .into_option()
            .map_or_else(|| UNKNOWN.to_string(), |url| full_size_poster(&url)),
        rated: text(fields::RATED.resolve(view)),
        genre: list(fields::GENRE.resolve(view)),
        kind: kind.label().to_string(),
        release_date: text(fields::RELEASE_DATE.resolve(view)),
        countries: list(fields::COUNTRIES.resolve(view)),
        actors: list(actors.resolve(view)),
    }
}

fn build_movie(id: &ExternalId, page: &DecodedPage) -> MovieRecord {
    let view = PageView::new(page);
    MovieRecord {
        media: build_media(id, &view, RecordKind::Movie, &fields::MOVIE_ACTORS),
        director: list(fields::DIRECTOR.resolve(&view)),
        runtime: text(fields::MOVIE_RUNTIME.resolve(&view)),
    }
}

fn build_series(id: &ExternalId, page: &DecodedPage) -> SeriesRecord {
    let view = PageView::new(page);
    let mut media = build_media(id, &view, RecordKind::Series, &fields::SERIES_ACTORS);
    let years = text(fields::YEARS.resolve(&view));

    if media.release_date == UNKNOWN {
        if let Some(year) = start_year(&years) {
            media.release_date = year;
        }
    }

    SeriesRecord {
        media,
        creator: list(fields::CREATOR.resolve(&view)),
        runtime: text(fields::SERIES_RUNTIME.resolve(&view)),
        years,
        seasons: Field::from(fields::SEASONS.resolve(&view).into_option()),
    }
}
