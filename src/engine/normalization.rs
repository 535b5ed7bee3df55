use regex::Regex;
use std::sync::LazyLock;
use url::Url;

use crate::config::constants::{LIST_SEPARATOR, UNKNOWN};

// * Normalizer: pure cleanup applied to every extracted value before it enters a record.
// * Nothing here fails. Input that cannot be processed comes back unchanged.

// * Entities the source leaves behind in titles and plots, unescaped in this order
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&amp", "&"),
    ("&quot;", ""),
    ("&quot", ""),
    ("&apos;", "'"),
    ("&apos", "'"),
    ("&#39;", "'"),
];

// * Characters that would corrupt a hand-built storage statement
const STRIPPED_PUNCTUATION: &[char] = &['"', '\'', ';', ':'];

// * UI artifacts appended to plot text by older layouts
const TEXT_ARTIFACTS: &[&str] = &["See full summary\u{c2}\u{bb}", "See full summary\u{bb}", "See full summary »"];

static LANGUAGE_BADGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{4,}EN\b").expect("Invalid language badge regex"));

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("Invalid ISO duration regex")
});

// * Thumbnail variants carry sizing directives after the image key: <key>._V1_UX182_.jpg
static POSTER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https://[A-Za-z0-9.-]+/images/M/[^.?#]+)\.").expect("Invalid poster regex")
});

/// Trims, unescapes a fixed entity set, and strips punctuation and layout artifacts
pub fn clean_text(text: &str) -> String {
    let mut cleaned = text.replace(['\n', '\r', '\u{a0}'], " ");

    for (entity, replacement) in HTML_ENTITIES {
        cleaned = cleaned.replace(entity, replacement);
    }
    for artifact in TEXT_ARTIFACTS {
        cleaned = cleaned.replace(artifact, "");
    }
    cleaned = LANGUAGE_BADGE.replace_all(&cleaned, "").into_owned();
    cleaned.retain(|c| !STRIPPED_PUNCTUATION.contains(&c));

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cleans a text value, degrading an empty result to the sentinel
pub fn clean_or_unknown(text: &str) -> String {
    let cleaned = clean_text(text);
    if cleaned.is_empty() {
        UNKNOWN.to_string()
    } else {
        cleaned
    }
}

/// Rewrites a thumbnail poster URL to the canonical full-size image
pub fn full_size_poster(url: &str) -> String {
    let url = url.trim();
    match POSTER_KEY.captures(url).and_then(|caps| caps.get(1)) {
        Some(key) => format!("{}.jpg", key.as_str()),
        None => url.to_string(),
    }
}

/// Converts an ISO-8601 duration token ("PT2H15M") to "2h 15m"
pub fn iso_duration_to_runtime(token: &str) -> String {
    let token = token.trim();
    let Some(caps) = ISO_DURATION.captures(token) else {
        return token.to_string();
    };

    let number = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u64>().ok());
    let days = number(1);
    let hours = number(2);
    let minutes = number(3);

    if days.is_none() && hours.is_none() && minutes.is_none() {
        return token.to_string();
    }

    let mut parts = Vec::with_capacity(2);
    if days.is_some() || hours.is_some() {
        parts.push(format!("{}h", days.unwrap_or(0) * 24 + hours.unwrap_or(0)));
    }
    if let Some(m) = minutes {
        parts.push(format!("{}m", m));
    }
    parts.join(" ")
}

/// Flattens a list into one column, cleaning each item
pub fn join_list(items: &[String]) -> String {
    let cleaned: Vec<String> = items
        .iter()
        .map(|item| clean_text(item))
        .filter(|item| !item.is_empty())
        .collect();

    if cleaned.is_empty() {
        UNKNOWN.to_string()
    } else {
        cleaned.join(LIST_SEPARATOR)
    }
}

/// Parses a count such as "1,234", "2.5M" or "12K"
pub fn parse_count(raw: &str) -> Option<i64> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | ' ' | '\u{a0}'))
        .collect();

    let (digits, multiplier) = match compact.chars().last()? {
        'K' | 'k' => (&compact[..compact.len() - 1], 1_000.0),
        'M' | 'm' => (&compact[..compact.len() - 1], 1_000_000.0),
        'B' | 'b' => (&compact[..compact.len() - 1], 1_000_000_000.0),
        _ => (compact.as_str(), 1.0),
    };

    if multiplier == 1.0 {
        return digits.parse::<i64>().ok().filter(|n| *n >= 0);
    }

    let value = digits.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some((value * multiplier).round() as i64)
}

/// Older layouts render a node's text twice ("2008–20132008–2013"); keeps one copy
pub fn collapse_doubled(text: &str) -> String {
    let text = text.trim();
    let chars: Vec<char> = text.chars().collect();
    if chars.len() >= 2 && chars.len() % 2 == 0 {
        let (head, tail) = chars.split_at(chars.len() / 2);
        if head == tail {
            return head.iter().collect();
        }
    }
    text.to_string()
}

/// Start year of a year range ("2008–2013" → "2008")
pub fn start_year(years: &str) -> Option<String> {
    years
        .split(['-', '–', '—'])
        .next()
        .map(str::trim)
        .filter(|y| !y.is_empty() && *y != UNKNOWN)
        .map(str::to_string)
}

/// Builds the title-page URL for an id: <base>/title/<id>/
pub fn title_url(base_url: &str, id: &str) -> Option<String> {
    let mut base = Url::parse(base_url).ok()?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("title/{}/", id)).ok().map(String::from)
}
