//! Reading grid wrappers out of rendered HTML.

use scraper::{ElementRef, Html, Selector};

use super::{GridView, PageLink, WrapperConfig};
use crate::grid::{page_size, parse_int, DEFAULT_PER_PAGE};

/// A grid wrapper found in a document: its configuration and current view.
#[derive(Debug, Clone)]
pub struct GridWrapper {
    pub config: WrapperConfig,
    pub view: GridView,
}

/// Find the first grid wrapper in a page. `None` when the page has none.
pub fn find_wrapper(html: &str) -> Option<GridWrapper> {
    let document = Html::parse_document(html);
    let wrapper_selector = Selector::parse("[data-grid-slug]").ok()?;
    let wrapper = document.select(&wrapper_selector).next()?;
    let attr = |name: &str| wrapper.value().attr(name);

    let slug = attr("data-grid-slug")?.to_string();
    let config = WrapperConfig {
        taxonomy: attr("data-taxonomy")
            .map(str::to_string)
            .filter(|t| !t.is_empty()),
        per_page: page_size(attr("data-items-per-page"), DEFAULT_PER_PAGE),
        current_page: attr("data-current-page")
            .and_then(parse_int)
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1),
        action: attr("data-action")?.to_string(),
        ajax_url: attr("data-ajax-url")?.to_string(),
        slug,
    };

    let items_selector = Selector::parse(&format!(".{}", config.items_class())).ok()?;
    let items_html = wrapper
        .select(&items_selector)
        .next()
        .map(|items| items.inner_html())
        .unwrap_or_default();

    let link_selector = Selector::parse(&format!(".{}", config.link_class())).ok()?;
    let page_links = wrapper.select(&link_selector).filter_map(page_link).collect();

    Some(GridWrapper {
        config,
        view: GridView {
            items_html,
            page_links,
        },
    })
}

fn page_link(element: ElementRef<'_>) -> Option<PageLink> {
    let page = element.value().attr("data-page").and_then(parse_int)?;
    Some(PageLink {
        page: page.clamp(1, u32::MAX as i64) as u32,
        current: element.value().classes().any(|c| c == "current"),
    })
}

/// Term names on the cards of a fragment.
pub fn card_titles(fragment: &str, slug: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(&format!(".{}-item h3", slug)) else {
        return Vec::new();
    };
    Html::parse_fragment(fragment)
        .select(&selector)
        .map(|h3| h3.text().collect::<String>().trim().to_string())
        .collect()
}
