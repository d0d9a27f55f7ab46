//! HTML-to-tree parsing of the category index.
//!
//! The index is a nested `ul.indice` list: `li.categoria` entries carry a
//! `span.titulo-categoria` name and an inner `ul` holding `li.texto` poems
//! (with `a.titulo-texto` links whose hrefs end in `/textos/{id}`) followed
//! by nested `li.categoria` subcategories. Category paths are built by
//! slash-joining ancestor names while descending.
//!
//! Malformed entries (a category without a title span, a poem link without
//! a parsable id) are skipped with a warning rather than failing the whole
//! page; the origin's markup is not pristine.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::ScrapeError;
use crate::catalog::{Category, Poem};

/// Pre-parsed CSS selectors for the index markup.
struct Selectors {
    index: Selector,
    category_title: Selector,
    poem_link: Selector,
}

impl Selectors {
    #[allow(clippy::expect_used)]
    fn new() -> Self {
        Self {
            index: Selector::parse("ul.indice").expect("index selector"),
            category_title: Selector::parse("span.titulo-categoria").expect("title selector"),
            poem_link: Selector::parse("a.titulo-texto").expect("poem link selector"),
        }
    }
}

/// Parses the index page into the forest of top-level categories.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingIndex`] when the page carries no
/// `ul.indice` list.
pub fn parse_index(html: &str) -> Result<Vec<Category>, ScrapeError> {
    let selectors = Selectors::new();
    let document = Html::parse_document(html);

    let Some(index) = document.select(&selectors.index).next() else {
        warn!("no ul.indice list in page");
        return Err(ScrapeError::MissingIndex);
    };

    let categories: Vec<_> = child_elements(index)
        .filter(|li| has_class(*li, "categoria"))
        .filter_map(|li| parse_category(li, "", &selectors))
        .collect();

    debug!(top_level = categories.len(), "index parsed");
    Ok(categories)
}

/// Parses one `li.categoria` element, recursing into nested categories.
fn parse_category(li: ElementRef<'_>, parent_path: &str, selectors: &Selectors) -> Option<Category> {
    let Some(title_span) = li.select(&selectors.category_title).next() else {
        warn!("category entry without a title span, skipping");
        return None;
    };
    let name = element_text(title_span);
    if name.is_empty() {
        warn!("category entry with an empty title, skipping");
        return None;
    }

    let path = if parent_path.is_empty() {
        name.clone()
    } else {
        format!("{parent_path}/{name}")
    };

    let mut category = Category::new(name, path.clone());

    // The first direct child <ul> holds this category's own poems and
    // subcategories; deeper lists belong to descendants.
    if let Some(inner) = child_elements(li).find(|el| el.value().name() == "ul") {
        for child in child_elements(inner) {
            if has_class(child, "texto") {
                if let Some(poem) = parse_poem(child, &path, selectors) {
                    category.poems.push(poem);
                }
            } else if has_class(child, "categoria") {
                if let Some(sub) = parse_category(child, &path, selectors) {
                    category.subcategories.push(sub);
                }
            }
        }
    }

    Some(category)
}

/// Parses one `li.texto` element into a poem.
fn parse_poem(li: ElementRef<'_>, category_path: &str, selectors: &Selectors) -> Option<Poem> {
    let link = li.select(&selectors.poem_link).next()?;
    let href = link.value().attr("href")?;
    let title = element_text(link);

    let Some(id) = poem_id_from_href(href) else {
        warn!(href, "poem link without a parsable /textos/ id, skipping");
        return None;
    };

    Some(Poem::new(id, title, category_path))
}

/// Extracts the numeric id from an `/textos/{id}` href.
fn poem_id_from_href(href: &str) -> Option<u32> {
    let (_, tail) = href.split_once("/textos/")?;
    tail.trim_end_matches('/').parse().ok()
}

/// Direct element children of a node, skipping text and comments.
fn child_elements(element: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    element.children().filter_map(ElementRef::wrap)
}

fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

/// Concatenated, whitespace-trimmed text content of an element.
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
