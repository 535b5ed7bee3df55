// * Shared fixtures: a scripted fetcher and synthetic title pages
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use reel_harvest::network::{Fetcher, NetworkError};
use reel_harvest::persistence::ExternalId;

#[derive(Debug, Clone)]
pub enum Response {
    Page(String),
    NotFound,
    Transient,
    /// Never completes; stands in for a run killed mid-item
    Hang,
}

type Hook = Box<dyn Fn() + Send + Sync>;

/// Answers per id from a script. The last scripted response repeats.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Response>>>,
    hooks: Mutex<HashMap<String, Hook>>,
    log: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, id: &str, responses: Vec<Response>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(id.to_string(), responses.into());
        self
    }

    /// Runs `hook` whenever `id` is fetched, before the scripted response is served
    pub fn on_fetch(self, id: &str, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks
            .lock()
            .unwrap()
            .insert(id.to_string(), Box::new(hook));
        self
    }

    /// Ids in the order they were fetched
    pub fn fetched(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn fetch_count(&self, id: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|f| *f == id).count()
    }

    fn next_response(&self, id: &str) -> Response {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or(Response::NotFound),
            None => Response::NotFound,
        }
    }
}

fn id_from_url(url: &str) -> String {
    ExternalId::from_url(url)
        .map(|id| id.to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, NetworkError> {
        let id = id_from_url(url);
        self.log.lock().unwrap().push(id.clone());
        if let Some(hook) = self.hooks.lock().unwrap().get(&id) {
            hook();
        }

        match self.next_response(&id) {
            Response::Page(body) => Ok(body),
            Response::NotFound => Err(NetworkError::NotFound(url.to_string())),
            Response::Transient => Err(NetworkError::Upstream(503)),
            Response::Hang => std::future::pending().await,
        }
    }
}

pub fn id(raw: &str) -> ExternalId {
    ExternalId::parse(raw).unwrap()
}

pub fn page(json_ld: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta property="og:title" content="Fallback Title - IMDb"><script type="application/ld+json">{json_ld}</script></head><body>{body}</body></html>"#
    )
}

pub fn movie_json(title: &str) -> String {
    format!(
        r#"{{"@context":"https://schema.org","@type":"Movie","name":"{title}","alternateName":"{title}",
            "image":"https://m.media-amazon.com/images/M/MV5BKEY@@._V1_UX182_CR0,0,182,268_AL_.jpg",
            "description":"A heist crew is hunted by a detective.","contentRating":"R",
            "genre":["Action","Crime"],"datePublished":"1995-12-15",
            "aggregateRating":{{"@type":"AggregateRating","ratingCount":712345,"ratingValue":8.3}},
            "actor":[{{"@type":"Person","name":"Al Pacino"}},{{"@type":"Person","name":"Robert De Niro"}}],
            "director":[{{"@type":"Person","name":"Michael Mann"}}],
            "duration":"PT2H50M"}}"#
    )
}

pub fn movie_page(title: &str) -> String {
    page(&movie_json(title), "")
}

pub fn series_page(title: &str) -> String {
    let json = format!(
        r#"{{"@type":"TVSeries","name":"{title}","genre":"Drama",
            "creator":[{{"@type":"Organization","url":"https://www.imdb.com/company/co0008693/"}},{{"@type":"Person","name":"Vince Gilligan"}}]}}"#
    );
    let body = r#"<ul class="TitleBlockMetaData__MetaDataList-sc-12ein40-0"><li>TV Series</li><li>2008–2013</li><li>TV-MA</li><li>49m</li></ul>
        <select id="browse-episodes-season" aria-label="5 seasons"></select>"#;
    page(&json, body)
}

pub fn episode_page() -> String {
    page(r#"{"@type":"TVEpisode","name":"Pilot"}"#, "")
}

/// A structured-data block cut off mid-object
pub fn truncated_page() -> String {
    page(r#"{"@type":"Movie","name":"Heat","aggregateRating":{"ratingVal"#, "")
}
