//! Article body extraction from fetched HTML pages.

use scraper::{ElementRef, Html, Selector};
use sentinews_core::NewsSource;

/// CSS selectors tried in order; the first that yields text wins.
fn paragraph_selectors(source: NewsSource) -> &'static [&'static str] {
    match source {
        NewsSource::Nyt => &[
            "section.meteredContent p",
            "section[name=\"articleBody\"] p",
            "article p",
        ],
        NewsSource::Cnn => &[
            "div.article__content p",
            ".zn-body__paragraph",
            "article p",
        ],
        NewsSource::Fox => &["div.article-body p", "article p"],
        NewsSource::NewsApi => &["article p", "main p"],
    }
}

/// Fox pads article bodies with bylines and promos marked up with inline
/// emphasis; paragraphs carrying any are dropped.
fn keep_paragraph(source: NewsSource, paragraph: &ElementRef<'_>, inline: &Selector) -> bool {
    source != NewsSource::Fox || paragraph.select(inline).next().is_none()
}

fn paragraph_text(paragraph: &ElementRef<'_>) -> String {
    paragraph
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull readable body text out of an article page from `source`.
///
/// Returns `None` when no known layout matches or every paragraph is empty.
#[must_use]
pub fn extract_body(source: NewsSource, html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let inline = Selector::parse("em, strong, span").ok()?;

    for css in paragraph_selectors(source) {
        let Ok(selector) = Selector::parse(css) else {
            tracing::debug!(selector = *css, "skipping unparseable selector");
            continue;
        };
        let paragraphs: Vec<String> = document
            .select(&selector)
            .filter(|p| keep_paragraph(source, p, &inline))
            .map(|p| paragraph_text(&p))
            .filter(|text| !text.is_empty())
            .collect();
        if !paragraphs.is_empty() {
            return Some(paragraphs.join("\n\n"));
        }
    }
    None
}
