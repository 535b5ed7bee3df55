// * A parsed view over one decoded page, shared by every extraction strategy

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

use crate::refinery::structured_data::{DecodedPage, StructuredData};

static SELECTOR_LI: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li").expect("Invalid li selector"));
static SELECTOR_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("Invalid anchor selector"));
static SELECTOR_META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("Invalid meta selector"));

pub struct PageView<'a> {
    document: Html,
    raw: &'a str,
    data: &'a StructuredData,
}

impl<'a> PageView<'a> {
    pub fn new(page: &'a DecodedPage) -> Self {
        Self {
            document: Html::parse_document(&page.html),
            raw: &page.html,
            data: &page.data,
        }
    }

    /// Structured data paired with arbitrary markup; used where no decode step ran
    pub fn from_parts(raw: &'a str, data: &'a StructuredData) -> Self {
        Self {
            document: Html::parse_document(raw),
            raw,
            data,
        }
    }

    pub fn data(&self) -> &StructuredData {
        self.data
    }

    /// Unparsed markup, for scans over inline script fragments
    pub fn raw(&self) -> &str {
        self.raw
    }

    pub fn select_first(&self, selector: &Selector) -> Option<ElementRef<'_>> {
        self.document.select(selector).next()
    }

    /// Trimmed text of the first match, if non-empty
    pub fn first_text(&self, selector: &Selector) -> Option<String> {
        self.select_first(selector).and_then(|el| element_text(&el))
    }

    pub fn first_attr(&self, selector: &Selector, attr: &str) -> Option<String> {
        self.select_first(selector)?
            .value()
            .attr(attr)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Texts of the `li` items under the first matching container.
    /// None when the container itself is missing.
    pub fn list_items(&self, container: &Selector) -> Option<Vec<String>> {
        self.nested_texts(container, &SELECTOR_LI)
    }

    /// Texts of `item` matches under the first matching container
    pub fn nested_texts(&self, container: &Selector, item: &Selector) -> Option<Vec<String>> {
        let el = self.select_first(container)?;
        Some(el.select(item).filter_map(|node| element_text(&node)).collect())
    }

    /// Text of the first link inside each `li` under the first matching container
    pub fn anchor_items(&self, container: &Selector) -> Option<Vec<String>> {
        let el = self.select_first(container)?;
        Some(
            el.select(&SELECTOR_LI)
                .filter_map(|li| li.select(&SELECTOR_ANCHOR).next())
                .filter_map(|a| element_text(&a))
                .collect(),
        )
    }

    /// `content` of the first `<meta property=..>` (or `name=..`) with the given key
    pub fn meta_content(&self, key: &str) -> Option<String> {
        self.document
            .select(&SELECTOR_META)
            .find(|meta| {
                let v = meta.value();
                v.attr("property") == Some(key) || v.attr("name") == Some(key)
            })
            .and_then(|meta| meta.value().attr("content"))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

fn element_text(el: &ElementRef<'_>) -> Option<String> {
    let text: String = el.text().collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
