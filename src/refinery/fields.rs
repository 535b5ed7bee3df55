// * Extraction strategies and the per-field chains built from them
// * Order inside every chain: structured data, then DOM layouts newest first, then raw scans.
// * Strategies return raw values. Text cleanup happens when the record is built.

use regex::Regex;
use scraper::Selector;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::config::constants::{GENRE_MAX_LEN, ORGANIZATION_CREDIT};
use crate::engine::normalization::{collapse_doubled, iso_duration_to_runtime, parse_count};
use crate::refinery::page::PageView;
use crate::refinery::registry::{FieldChain, Probe, Strategy};
use crate::refinery::structured_data::Credit;

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("Invalid field selector")
}

// * Current hero layout, then the styled-components generation
static SELECTOR_HERO_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    css(r#"h1[data-testid="hero__pageTitle"], h1[data-testid="hero-title-block__title"]"#)
});
static SELECTOR_LEGACY_TITLE: LazyLock<Selector> =
    LazyLock::new(|| css(".TitleHeader__TitleText-sc-1wu6n3d-0"));

static SELECTOR_PLOT: LazyLock<Selector> =
    LazyLock::new(|| css(r#"span[data-testid="plot-xl"], span[data-testid="plot-l"]"#));

static SELECTOR_VOTERS: LazyLock<Selector> =
    LazyLock::new(|| css("ul.ipc-metadata-list:nth-child(4) > li:nth-child(2) > div:nth-child(2)"));

static SELECTOR_RATED: LazyLock<Selector> = LazyLock::new(|| {
    css("ul.ipc-inline-list--show-dividers:nth-child(2) > li:nth-child(3) > a:nth-child(1)")
});

static SELECTOR_GENRE_CHIPS: LazyLock<Selector> =
    LazyLock::new(|| css(r#"div[data-testid="genres"]"#));
static SELECTOR_CHIP_TEXT: LazyLock<Selector> = LazyLock::new(|| css(".ipc-chip__text"));
static SELECTOR_GENRE_PRIMARY: LazyLock<Selector> =
    LazyLock::new(|| css("ul.ipc-metadata-list:nth-child(4) > li:nth-child(1) > div:nth-child(2)"));
static SELECTOR_GENRE_SECONDARY: LazyLock<Selector> =
    LazyLock::new(|| css("ul.ipc-metadata-list:nth-child(4) > li:nth-child(2) > div:nth-child(2)"));

// * Title-block metadata row: kind, years, rating, runtime
static SELECTOR_RELEASE_DATE: LazyLock<Selector> = LazyLock::new(|| {
    css(".TitleBlockMetaData__MetaDataList-sc-12ein40-0 > li:nth-child(1) > a:nth-child(1)")
});
static SELECTOR_YEARS: LazyLock<Selector> =
    LazyLock::new(|| css(".TitleBlockMetaData__MetaDataList-sc-12ein40-0 > li:nth-child(2)"));
static SELECTOR_RUNTIME_FOURTH: LazyLock<Selector> =
    LazyLock::new(|| css(".TitleBlockMetaData__MetaDataList-sc-12ein40-0 > li:nth-child(4)"));
static SELECTOR_RUNTIME_THIRD: LazyLock<Selector> =
    LazyLock::new(|| css(".TitleBlockMetaData__MetaDataList-sc-12ein40-0 > li:nth-child(3)"));

static SELECTOR_SEASONS_SELECT: LazyLock<Selector> =
    LazyLock::new(|| css("#browse-episodes-season"));
static SELECTOR_SEASONS_LINK: LazyLock<Selector> = LazyLock::new(|| {
    css(".BrowseEpisodes__BrowseLinksContainer-sc-1a626ql-4 > a:nth-child(2) > div:nth-child(1)")
});

static SELECTOR_ORIGIN: LazyLock<Selector> =
    LazyLock::new(|| css(r#"li[data-testid="title-details-origin"] ul"#));

// * The details section moved around between page generations; each position was observed live
const LEGACY_DETAILS_POSITIONS: [u32; 12] = [28, 32, 33, 34, 35, 36, 37, 40, 41, 44, 45, 46];

static SELECTOR_LEGACY_COUNTRIES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    LEGACY_DETAILS_POSITIONS
        .iter()
        .map(|n| {
            css(&format!(
                "section.ipc-page-section:nth-child({n}) > div:nth-child(2) > ul:nth-child(1) > li:nth-child(2) > div:nth-child(2) > ul:nth-child(1)"
            ))
        })
        .collect()
});

// * Principal-credits panel; the class hash changed once ("-sc-hdn81t-0" vs "-hdn81t-0")
static SELECTOR_CREDITS_FIRST_ROW: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        css(".PrincipalCredits__PrincipalCreditsPanelWideScreen-sc-hdn81t-0 > ul:nth-child(1) > li:nth-child(1) > div:nth-child(2) > ul:nth-child(1)"),
        css(".PrincipalCredits__PrincipalCreditsPanelWideScreen-hdn81t-0 > ul:nth-child(1) > li:nth-child(1) > div:nth-child(2) > ul:nth-child(1)"),
    ]
});

static SELECTOR_MOVIE_CAST: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        css(".PrincipalCredits__PrincipalCreditsPanelWideScreen-hdn81t-0 > ul:nth-child(1) > li:nth-child(1) > div:nth-child(2) > ul:nth-child(1)"),
        css(".PrincipalCredits__PrincipalCreditsPanelWideScreen-hdn81t-0 > ul:nth-child(1) > li:nth-child(3) > div:nth-child(2) > ul:nth-child(1)"),
        css(".PrincipalCredits__PrincipalCreditsPanelWideScreen-sc-hdn81t-0 > ul:nth-child(1) > li:nth-child(3) > div:nth-child(2) > ul:nth-child(1)"),
        css(".PrincipalCredits__PrincipalCreditsPanelWideScreen-sc-hdn81t-0 > ul:nth-child(1) > li:nth-child(2) > div:nth-child(2) > ul:nth-child(1)"),
    ]
});

static SELECTOR_SERIES_CAST: LazyLock<Selector> = LazyLock::new(|| {
    css(".PrincipalCredits__PrincipalCreditsPanelWideScreen-hdn81t-0 > ul:nth-child(1) > li:nth-child(2) > div:nth-child(2) > ul:nth-child(1)")
});

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("Invalid number regex"));

// * Inline countries fragment, three generations of truncation
const COUNTRIES_ANCHOR: &str = r#""countriesOfOrigin":{"countries":"#;

static FRAGMENT_WELL_FORMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^(\[.*?\]),"__typename":"CountriesOfOrigin""#)
        .expect("Invalid fragment regex")
});
static FRAGMENT_OPEN_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^(\[.*),"__typename":"CountryOfOrigin""#).expect("Invalid fragment regex")
});
static FRAGMENT_OPEN_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\[.*\})").expect("Invalid fragment regex"));

/// How much bracket repair the inline countries fragment needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repair {
    Intact,
    ClosedEntry,
    ClosedList,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FragmentScan {
    Recovered { countries: Vec<String>, repair: Repair },
    /// The anchor is present but no repair level produced a usable list
    Malformed,
    Absent,
}

#[derive(Deserialize)]
struct CountryEntry {
    text: String,
}

/// Recovers the country list from the inline page-state fragment
pub fn scan_countries_fragment(raw: &str) -> FragmentScan {
    let Some(start) = raw.find(COUNTRIES_ANCHOR) else {
        return FragmentScan::Absent;
    };
    let tail = &raw[start + COUNTRIES_ANCHOR.len()..];
    let tail = tail.find("</script>").map_or(tail, |end| &tail[..end]);

    let attempts: [(&Regex, &str, Repair); 3] = [
        (&*FRAGMENT_WELL_FORMED, "", Repair::Intact),
        (&*FRAGMENT_OPEN_ENTRY, "}]", Repair::ClosedEntry),
        (&*FRAGMENT_OPEN_LIST, "]", Repair::ClosedList),
    ];

    for (pattern, closing, repair) in attempts {
        let Some(candidate) = pattern.captures(tail).and_then(|caps| caps.get(1)) else {
            continue;
        };
        let repaired = format!("{}{}", candidate.as_str(), closing);
        if let Ok(entries) = serde_json::from_str::<Vec<CountryEntry>>(&repaired) {
            let countries: Vec<String> = entries
                .into_iter()
                .map(|e| e.text.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if !countries.is_empty() {
                return FragmentScan::Recovered { countries, repair };
            }
        }
    }

    FragmentScan::Malformed
}

/// A matched list that is really the color, box-office or sound section
fn implausible_listing(items: &[String]) -> Option<&'static str> {
    if items.iter().any(|i| i == "Color" || i == "Black and White") {
        return Some("color section matched");
    }
    // * Any item with a currency symbol disqualifies the list, not only the first one
    if items.iter().any(|i| i.contains(['$', '€', '£'])) {
        return Some("box-office section matched");
    }
    None
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

fn person_names(credits: Option<Vec<Credit>>) -> Probe<Vec<String>> {
    let Some(credits) = credits.filter(|c| !c.is_empty()) else {
        return Probe::NotApplicable;
    };
    let persons: Vec<String> = credits
        .iter()
        .filter_map(Credit::person_name)
        .map(str::to_string)
        .collect();

    if persons.is_empty() {
        Probe::Found(vec![ORGANIZATION_CREDIT.to_string()])
    } else {
        Probe::Found(persons)
    }
}

fn first_anchor_list(page: &PageView<'_>, selectors: &[Selector]) -> Probe<Vec<String>> {
    selectors
        .iter()
        .find_map(|s| page.anchor_items(s).and_then(non_empty))
        .into()
}

// * title

fn hero_title(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_HERO_TITLE).into()
}

fn legacy_title_header(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_LEGACY_TITLE).into()
}

fn structured_name(page: &PageView<'_>) -> Probe<String> {
    page.data().text("name").into()
}

fn og_title(page: &PageView<'_>) -> Probe<String> {
    page.meta_content("og:title")
        .map(|t| t.trim_end_matches(" - IMDb").trim().to_string())
        .filter(|t| !t.is_empty())
        .into()
}

// * rating

fn structured_rating_value(page: &PageView<'_>) -> Probe<f64> {
    page.data().number("aggregateRating.ratingValue").into()
}

fn structured_rating_count(page: &PageView<'_>) -> Probe<i64> {
    page.data().integer("aggregateRating.ratingCount").into()
}

fn metadata_list_voters(page: &PageView<'_>) -> Probe<i64> {
    match page.first_text(&SELECTOR_VOTERS) {
        None => Probe::NotApplicable,
        Some(text) => match parse_count(&text) {
            Some(count) => Probe::Found(count),
            None => Probe::Rejected("not a count"),
        },
    }
}

// * plot, poster, rated, release date

fn structured_description(page: &PageView<'_>) -> Probe<String> {
    page.data().text("description").into()
}

fn plot_span(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_PLOT).into()
}

fn structured_image(page: &PageView<'_>) -> Probe<String> {
    page.data().image_url("image").into()
}

fn og_image(page: &PageView<'_>) -> Probe<String> {
    page.meta_content("og:image").into()
}

fn structured_content_rating(page: &PageView<'_>) -> Probe<String> {
    page.data().text("contentRating").into()
}

fn inline_list_rating(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_RATED).into()
}

fn structured_date_published(page: &PageView<'_>) -> Probe<String> {
    page.data().text("datePublished").into()
}

fn title_block_release(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_RELEASE_DATE).into()
}

// * genre

fn structured_genre(page: &PageView<'_>) -> Probe<Vec<String>> {
    non_empty(page.data().string_list("genre")).into()
}

fn structured_genres(page: &PageView<'_>) -> Probe<Vec<String>> {
    non_empty(page.data().string_list("genres")).into()
}

fn genre_chips(page: &PageView<'_>) -> Probe<Vec<String>> {
    page.nested_texts(&SELECTOR_GENRE_CHIPS, &SELECTOR_CHIP_TEXT)
        .and_then(non_empty)
        .into()
}

fn overflows(items: &[String]) -> bool {
    items
        .iter()
        .any(|i| i.chars().count() > GENRE_MAX_LEN || i.contains('"'))
}

/// The first metadata row sometimes holds another section; an overflowing or
/// implausible candidate set sends the scan to the second row
fn metadata_list_genres(page: &PageView<'_>) -> Probe<Vec<String>> {
    let Some(primary) = page.list_items(&SELECTOR_GENRE_PRIMARY).and_then(non_empty) else {
        return Probe::NotApplicable;
    };
    if !overflows(&primary) && implausible_listing(&primary).is_none() {
        return Probe::Found(primary);
    }

    match page.list_items(&SELECTOR_GENRE_SECONDARY).and_then(non_empty) {
        Some(secondary) => match implausible_listing(&secondary) {
            Some(reason) => Probe::Rejected(reason),
            None => Probe::Found(secondary),
        },
        None => Probe::Rejected("genre candidates overflowed"),
    }
}

// * countries

fn details_origin(page: &PageView<'_>) -> Probe<Vec<String>> {
    match page.anchor_items(&SELECTOR_ORIGIN).and_then(non_empty) {
        None => Probe::NotApplicable,
        Some(items) => match implausible_listing(&items) {
            Some(reason) => Probe::Rejected(reason),
            None => Probe::Found(items),
        },
    }
}

/// First plausible match among the known details-section positions
fn legacy_details_sections(page: &PageView<'_>) -> Probe<Vec<String>> {
    let mut rejection = None;
    for selector in SELECTOR_LEGACY_COUNTRIES.iter() {
        let Some(items) = page.list_items(selector).and_then(non_empty) else {
            continue;
        };
        match implausible_listing(&items) {
            Some(reason) => rejection = Some(reason),
            None => return Probe::Found(items),
        }
    }
    rejection.map_or(Probe::NotApplicable, Probe::Rejected)
}

fn inline_countries_fragment(page: &PageView<'_>) -> Probe<Vec<String>> {
    match scan_countries_fragment(page.raw()) {
        FragmentScan::Recovered { countries, .. } => Probe::Found(countries),
        FragmentScan::Malformed => Probe::Rejected("countries fragment unrepairable"),
        FragmentScan::Absent => Probe::NotApplicable,
    }
}

// * credits

fn structured_actors(page: &PageView<'_>) -> Probe<Vec<String>> {
    page.data()
        .credits("actor")
        .map(|credits| credits.into_iter().filter_map(|c| c.name).collect())
        .and_then(non_empty)
        .into()
}

fn principal_credits_movie_cast(page: &PageView<'_>) -> Probe<Vec<String>> {
    first_anchor_list(page, &SELECTOR_MOVIE_CAST)
}

fn principal_credits_series_cast(page: &PageView<'_>) -> Probe<Vec<String>> {
    page.anchor_items(&SELECTOR_SERIES_CAST).and_then(non_empty).into()
}

fn structured_director(page: &PageView<'_>) -> Probe<Vec<String>> {
    person_names(page.data().credits("director"))
}

fn structured_directors(page: &PageView<'_>) -> Probe<Vec<String>> {
    person_names(page.data().credits("directors"))
}

fn structured_creator(page: &PageView<'_>) -> Probe<Vec<String>> {
    person_names(page.data().credits("creator"))
}

fn structured_creators(page: &PageView<'_>) -> Probe<Vec<String>> {
    person_names(page.data().credits("creators"))
}

fn principal_credits_first_row(page: &PageView<'_>) -> Probe<Vec<String>> {
    first_anchor_list(page, &SELECTOR_CREDITS_FIRST_ROW)
}

// * runtime, years, seasons

fn structured_duration(page: &PageView<'_>) -> Probe<String> {
    page.data()
        .text("duration")
        .map(|token| iso_duration_to_runtime(&token))
        .into()
}

fn title_block_fourth_item(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_RUNTIME_FOURTH).into()
}

fn title_block_third_item(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_RUNTIME_THIRD).into()
}

fn title_block_years(page: &PageView<'_>) -> Probe<String> {
    page.first_text(&SELECTOR_YEARS)
        .map(|text| collapse_doubled(&text))
        .into()
}

fn season_number(text: &str) -> Probe<u32> {
    match FIRST_NUMBER.find(text).and_then(|m| m.as_str().parse().ok()) {
        Some(n) => Probe::Found(n),
        None => Probe::Rejected("no season number"),
    }
}

fn season_selector_label(page: &PageView<'_>) -> Probe<u32> {
    match page.first_attr(&SELECTOR_SEASONS_SELECT, "aria-label") {
        Some(label) => season_number(&label),
        None => Probe::NotApplicable,
    }
}

fn browse_links_seasons(page: &PageView<'_>) -> Probe<u32> {
    match page.first_text(&SELECTOR_SEASONS_LINK) {
        Some(text) => season_number(&text),
        None => Probe::NotApplicable,
    }
}

// * Chains

// * Displayed title first. `alternateName` is the original-language title, so it stays out
pub static TITLE: FieldChain<String> = FieldChain {
    field: "title",
    strategies: &[
        Strategy { name: "hero_title", run: hero_title },
        Strategy { name: "legacy_title_header", run: legacy_title_header },
        Strategy { name: "structured_name", run: structured_name },
        Strategy { name: "og_title", run: og_title },
    ],
};

pub static ORIGINAL_TITLE: FieldChain<String> = FieldChain {
    field: "original_title",
    strategies: &[
        Strategy { name: "structured_name", run: structured_name },
        Strategy { name: "og_title", run: og_title },
    ],
};

pub static SCORE: FieldChain<f64> = FieldChain {
    field: "score",
    strategies: &[Strategy { name: "structured_rating_value", run: structured_rating_value }],
};

pub static VOTERS: FieldChain<i64> = FieldChain {
    field: "voters",
    strategies: &[
        Strategy { name: "structured_rating_count", run: structured_rating_count },
        Strategy { name: "metadata_list_voters", run: metadata_list_voters },
    ],
};

pub static PLOT: FieldChain<String> = FieldChain {
    field: "plot",
    strategies: &[
        Strategy { name: "structured_description", run: structured_description },
        Strategy { name: "plot_span", run: plot_span },
    ],
};

pub static POSTER: FieldChain<String> = FieldChain {
    field: "poster",
    strategies: &[
        Strategy { name: "structured_image", run: structured_image },
        Strategy { name: "og_image", run: og_image },
    ],
};

pub static RATED: FieldChain<String> = FieldChain {
    field: "rated",
    strategies: &[
        Strategy { name: "structured_content_rating", run: structured_content_rating },
        Strategy { name: "inline_list_rating", run: inline_list_rating },
    ],
};

pub static GENRE: FieldChain<Vec<String>> = FieldChain {
    field: "genre",
    strategies: &[
        Strategy { name: "structured_genre", run: structured_genre },
        Strategy { name: "structured_genres", run: structured_genres },
        Strategy { name: "genre_chips", run: genre_chips },
        Strategy { name: "metadata_list_genres", run: metadata_list_genres },
    ],
};

pub static RELEASE_DATE: FieldChain<String> = FieldChain {
    field: "release_date",
    strategies: &[
        Strategy { name: "structured_date_published", run: structured_date_published },
        Strategy { name: "title_block_release", run: title_block_release },
    ],
};

pub static COUNTRIES: FieldChain<Vec<String>> = FieldChain {
    field: "countries",
    strategies: &[
        Strategy { name: "details_origin", run: details_origin },
        Strategy { name: "legacy_details_sections", run: legacy_details_sections },
        Strategy { name: "inline_countries_fragment", run: inline_countries_fragment },
    ],
};

pub static MOVIE_ACTORS: FieldChain<Vec<String>> = FieldChain {
    field: "actors",
    strategies: &[
        Strategy { name: "structured_actors", run: structured_actors },
        Strategy { name: "principal_credits_movie_cast", run: principal_credits_movie_cast },
    ],
};

pub static SERIES_ACTORS: FieldChain<Vec<String>> = FieldChain {
    field: "actors",
    strategies: &[
        Strategy { name: "structured_actors", run: structured_actors },
        Strategy { name: "principal_credits_series_cast", run: principal_credits_series_cast },
    ],
};

pub static DIRECTOR: FieldChain<Vec<String>> = FieldChain {
    field: "director",
    strategies: &[
        Strategy { name: "structured_director", run: structured_director },
        Strategy { name: "structured_directors", run: structured_directors },
        Strategy { name: "principal_credits_first_row", run: principal_credits_first_row },
    ],
};

pub static CREATOR: FieldChain<Vec<String>> = FieldChain {
    field: "creator",
    strategies: &[
        Strategy { name: "structured_creator", run: structured_creator },
        Strategy { name: "structured_creators", run: structured_creators },
        Strategy { name: "principal_credits_first_row", run: principal_credits_first_row },
    ],
};

pub static MOVIE_RUNTIME: FieldChain<String> = FieldChain {
    field: "runtime",
    strategies: &[Strategy { name: "structured_duration", run: structured_duration }],
};

pub static SERIES_RUNTIME: FieldChain<String> = FieldChain {
    field: "runtime",
    strategies: &[
        Strategy { name: "structured_duration", run: structured_duration },
        Strategy { name: "title_block_fourth_item", run: title_block_fourth_item },
        Strategy { name: "title_block_third_item", run: title_block_third_item },
    ],
};

pub static YEARS: FieldChain<String> = FieldChain {
    field: "years",
    strategies: &[Strategy { name: "title_block_years", run: title_block_years }],
};

pub static SEASONS: FieldChain<u32> = FieldChain {
    field: "seasons",
    strategies: &[
        Strategy { name: "season_selector_label", run: season_selector_label },
        Strategy { name: "browse_links_seasons", run: browse_links_seasons },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refinery::registry::Resolved;
    use crate::refinery::structured_data::StructuredData;
    use serde_json::json;

    fn resolve<T>(chain: &FieldChain<T>, markup: &str, data: &StructuredData) -> Resolved<T> {
        chain.resolve(&PageView::from_parts(markup, data))
    }

    const WELL_FORMED: &str = r#"<script>{"props":{"countriesOfOrigin":{"countries":[{"id":"US","text":"United States","__typename":"CountryOfOrigin"},{"id":"DE","text":"Germany","__typename":"CountryOfOrigin"}],"__typename":"CountriesOfOrigin"},"detailsExternalLinks":{}}}</script>"#;

    // * Truncated mid-list: the last entry is never closed
    const OPEN_ENTRY: &str = r#"<script>{"props":{"countriesOfOrigin":{"countries":[{"id":"US","text":"United States","__typename":"CountryOfOrigin"},{"id":"DE","text":"Germany","__typename":"CountryOfOrigin"</script>"#;

    const OPEN_LIST: &str = r#"<script>{"countriesOfOrigin":{"countries":[{"id":"US","text":"United States"},{"id":"DE","text":"Germany"}</script>"#;

    #[test]
    fn test_fragment_repair_levels_agree() {
        let expected = vec!["United States".to_string(), "Germany".to_string()];

        assert_eq!(
            scan_countries_fragment(WELL_FORMED),
            FragmentScan::Recovered { countries: expected.clone(), repair: Repair::Intact }
        );
        assert_eq!(
            scan_countries_fragment(OPEN_ENTRY),
            FragmentScan::Recovered { countries: expected.clone(), repair: Repair::ClosedEntry }
        );
        assert_eq!(
            scan_countries_fragment(OPEN_LIST),
            FragmentScan::Recovered { countries: expected, repair: Repair::ClosedList }
        );
    }

    #[test]
    fn test_fragment_malformed_vs_absent() {
        let garbage = r#"<script>"countriesOfOrigin":{"countries":[{"id":</script>"#;
        assert_eq!(scan_countries_fragment(garbage), FragmentScan::Malformed);
        assert_eq!(scan_countries_fragment("<html></html>"), FragmentScan::Absent);
    }

    fn legacy_section(position: u32, items: &[&str]) -> String {
        let lis: String = items.iter().map(|i| format!("<li>{}</li>", i)).collect();
        let filler: String = (1..position).map(|_| "<section class=\"ipc-page-section\"></section>").collect();
        format!(
            r#"<html><body><div>{filler}<section class="ipc-page-section"><div></div><div><ul><li></li><li><span>Country</span><div><ul>{lis}</ul></div></li></ul></div></section></div></body></html>"#
        )
    }

    #[test]
    fn test_countries_skip_implausible_section() {
        let data = StructuredData::empty();
        let markup = legacy_section(28, &["Color", "Dolby Digital"]);

        // * The only legacy match is the color section, and no fragment exists
        assert_eq!(resolve(&COUNTRIES, &markup, &data), Resolved::Unknown);

        let markup = format!("{}{}", legacy_section(28, &["$1,000,000"]), WELL_FORMED);
        assert_eq!(
            resolve(&COUNTRIES, &markup, &data).into_option().unwrap(),
            vec!["United States".to_string(), "Germany".to_string()]
        );
    }

    #[test]
    fn test_countries_legacy_layout() {
        let data = StructuredData::empty();
        let markup = legacy_section(33, &["France", "Italy"]);

        let resolved = resolve(&COUNTRIES, &markup, &data);
        assert_eq!(resolved.strategy(), Some("legacy_details_sections"));
        assert_eq!(resolved.into_option().unwrap(), vec!["France".to_string(), "Italy".to_string()]);
    }

    fn genre_markup(primary: &[&str], secondary: &[&str]) -> String {
        let row = |items: &[&str]| -> String {
            let lis: String = items.iter().map(|i| format!("<li>{}</li>", i)).collect();
            format!("<li><span>label</span><div><ul>{}</ul></div></li>", lis)
        };
        format!(
            r#"<html><body><div><p></p><p></p><p></p><ul class="ipc-metadata-list">{}{}</ul></div></body></html>"#,
            row(primary),
            row(secondary)
        )
    }

    #[test]
    fn test_genre_overflow_switches_region() {
        let data = StructuredData::empty();

        let markup = genre_markup(&["Drama", "Crime"], &["Thriller"]);
        assert_eq!(
            resolve(&GENRE, &markup, &data).into_option().unwrap(),
            vec!["Drama".to_string(), "Crime".to_string()]
        );

        let markup = genre_markup(&["Drama", "Based on a true story"], &["Crime", "Biography"]);
        assert_eq!(
            resolve(&GENRE, &markup, &data).into_option().unwrap(),
            vec!["Crime".to_string(), "Biography".to_string()]
        );
    }

    #[test]
    fn test_structured_genre_wins() {
        let data = StructuredData::from_value(json!({"@type": "Movie", "genre": ["Action", "Crime"]}));
        let markup = genre_markup(&["Drama"], &["Thriller"]);

        let resolved = resolve(&GENRE, &markup, &data);
        assert_eq!(resolved.strategy(), Some("structured_genre"));
    }

    #[test]
    fn test_nameless_organization_credit() {
        let data = StructuredData::from_value(json!({
            "@type": "TVSeries",
            "creator": [{"@type": "Organization", "url": "https://www.imdb.com/company/co0008693/"}]
        }));
        let resolved = resolve(&CREATOR, "<html></html>", &data);
        assert_eq!(resolved.strategy(), Some("structured_creator"));
        assert_eq!(resolved.into_option().unwrap(), vec![ORGANIZATION_CREDIT.to_string()]);
    }

    #[test]
    fn test_organization_credit() {
        let data = StructuredData::from_value(json!({
            "@type": "TVSeries",
            "creator": [{"@type": "Organization", "url": "/company/co1/", "name": "HBO"}]
        }));
        let resolved = resolve(&CREATOR, "<html></html>", &data);
        assert_eq!(resolved.into_option().unwrap(), vec![ORGANIZATION_CREDIT.to_string()]);
    }

    #[test]
    fn test_title_prefers_displayed_header() {
        let data = StructuredData::from_value(json!({
            "@type": "Movie",
            "name": "Parasite",
            "alternateName": "Gisaengchung"
        }));
        let markup = r#"<html><body><h1 data-testid="hero__pageTitle">Parasite</h1></body></html>"#;

        let title = resolve(&TITLE, markup, &data);
        assert_eq!(title.strategy(), Some("hero_title"));
        assert_eq!(title.into_option().as_deref(), Some("Parasite"));

        // * Without a header the structured name is used, never the alternate name
        let title = resolve(&TITLE, "<html></html>", &data);
        assert_eq!(title.into_option().as_deref(), Some("Parasite"));
    }

    #[test]
    fn test_seasons_from_aria_label() {
        let data = StructuredData::empty();
        let markup = r#"<html><body><select id="browse-episodes-season" aria-label="5 seasons"></select></body></html>"#;
        assert_eq!(resolve(&SEASONS, markup, &data).into_option(), Some(5));
    }

    #[test]
    fn test_voters_rejects_non_numeric() {
        let data = StructuredData::empty();
        let markup = genre_markup(&["Drama"], &["Crime"]);
        // * Second metadata row holds genres, not a count
        assert_eq!(resolve(&VOTERS, &markup, &data), Resolved::Unknown);
    }
}
