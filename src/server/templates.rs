//! HTML templates for grid pages and fragments.

use crate::grid::{GridDefinition, GridPage, PageResult, TermCard};
use crate::models::Taxonomy;

/// Base HTML page.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - termgrid</title>
    <style>{css}</style>
</head>
<body>
    <header id="main-header">
        <nav><a href="/" class="logo">termgrid</a></nav>
    </header>
    <main>
        <h1>{title}</h1>
        {content}
    </main>
    <script src="/static/grid.js"></script>
</body>
</html>"#,
        title = html_escape(title),
        css = CSS,
        content = content,
    )
}

/// Links from the index page to every configured grid.
pub fn index_page(grids: &[&GridDefinition], taxonomies: &[Taxonomy]) -> String {
    let mut rows = String::new();
    for grid in grids {
        if grid.is_field_driven() {
            for taxonomy in taxonomies {
                rows.push_str(&format!(
                    r#"<li><a href="/grids/{}?taxonomy={}">{}: {}</a></li>"#,
                    urlencoding::encode(&grid.slug),
                    urlencoding::encode(&taxonomy.name),
                    html_escape(&grid.title),
                    html_escape(&taxonomy.label)
                ));
            }
        } else {
            rows.push_str(&format!(
                r#"<li><a href="/grids/{}">{}</a></li>"#,
                urlencoding::encode(&grid.slug),
                html_escape(&grid.title)
            ));
        }
    }
    format!(r#"<ul class="grid-index">{}</ul>"#, rows)
}

/// Inline message shown in place of a grid.
pub fn message(text: &str) -> String {
    format!("<p>{}</p>", html_escape(text))
}

/// Term cards for one page; this is the whole body of a fragment response.
pub fn cards(grid: &GridDefinition, cards: &[TermCard]) -> String {
    let item_class = grid.item_class();
    let mut out = String::new();
    for card in cards {
        let link = esc_url(&card.link);
        out.push_str(&format!(
            r#"<div class="{item_class}" style="text-align: center;"><a href="{link}"><img src="{img}" alt="{alt}" style="width: 100%; height: auto; border-radius: 8px;"></a><h3 style="margin-top: 0.5rem;"><a href="{link}" style="text-decoration: none; color: inherit;">{name}</a></h3></div>"#,
            item_class = item_class,
            link = link,
            img = esc_url(&card.image_url),
            alt = attr_escape(&card.name),
            name = html_escape(&card.name),
        ));
    }
    out
}

/// Where page links point: the current path and query, with `page` replaced.
#[derive(Debug, Clone, Default)]
pub struct PageLinks {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl PageLinks {
    pub fn new(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    pub fn href(&self, page: u32) -> String {
        let page = page.to_string();
        let mut pairs: Vec<(&str, &str)> = self
            .query
            .iter()
            .filter(|(k, _)| k != "page")
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        pairs.push(("page", &page));

        let qs = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, qs)
    }
}

/// The page-link strip. Empty when everything fits on one page.
pub fn pagination(grid: &GridDefinition, result: &PageResult, links: &PageLinks) -> String {
    if !result.has_pagination() {
        return String::new();
    }

    let link_class = grid.page_link_class();
    let mut out = format!(
        r#"<div class="{}" style="margin-top: 2rem; text-align: center;">"#,
        grid.pagination_class()
    );
    for page in 1..=result.total_pages {
        let current_class = if page == result.page { " current" } else { "" };
        out.push_str(&format!(
            r#"<a href="{}" class="{}{}" data-page="{}">{}</a> "#,
            attr_escape(&links.href(page)),
            link_class,
            current_class,
            page,
            page
        ));
    }
    out.push_str("</div>");
    out
}

/// Initial render of a grid: wrapper with client configuration, cards and
/// page links.
pub fn grid_block(grid: &GridDefinition, page: &GridPage, links: &PageLinks, ajax_url: &str) -> String {
    let taxonomy_attr = if grid.is_field_driven() {
        format!(r#" data-taxonomy="{}""#, attr_escape(&page.page.taxonomy))
    } else {
        String::new()
    };

    format!(
        r#"<div class="{wrapper}" data-grid-slug="{slug}"{taxonomy_attr} data-current-page="{current}" data-items-per-page="{per_page}" data-action="{action}" data-ajax-url="{ajax_url}"><div class="{items}" style="display: grid; grid-template-columns: {columns}; gap: 1.5rem;">{cards}</div>{pagination}</div>"#,
        wrapper = grid.wrapper_class(),
        slug = attr_escape(&grid.slug),
        taxonomy_attr = taxonomy_attr,
        current = page.page.page,
        per_page = page.page.per_page,
        action = attr_escape(&grid.action),
        ajax_url = esc_url(ajax_url),
        items = grid.items_class(),
        columns = grid.layout.template_columns(),
        cards = cards(grid, &page.cards),
        pagination = pagination(grid, &page.page, links),
    )
}

/// Escape text content.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Escape an attribute value.
pub fn attr_escape(s: &str) -> String {
    html_escape(s).replace('\'', "&#039;")
}

/// Escape a URL for an attribute, dropping it entirely when it uses a
/// scheme other than http(s), mailto or a relative reference.
pub fn esc_url(url: &str) -> String {
    let url = url.trim();
    if let Some((scheme, _)) = url.split_once(':') {
        let is_scheme = !scheme.is_empty()
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        let allowed = ["http", "https", "mailto"]
            .iter()
            .any(|s| scheme.eq_ignore_ascii_case(s));
        if is_scheme && !allowed {
            return String::new();
        }
    }
    attr_escape(&url.replace(' ', "%20"))
}

/// Default thumbnail for terms without one.
pub const DEFAULT_IMAGE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="300" height="300" viewBox="0 0 300 300"><rect width="300" height="300" fill="#e4e4e4"/><path d="M60 220l60-80 45 55 30-35 45 60z" fill="#bdbdbd"/><circle cx="205" cy="95" r="22" fill="#bdbdbd"/></svg>"##;

/// Browser controller for every grid wrapper on the page.
///
/// Loads are numbered; a response is applied only if it belongs to the most
/// recent load. Failures keep the current cards and show a retry button.
pub const GRID_JS: &str = r#"document.addEventListener('DOMContentLoaded', () => {
    document.querySelectorAll('[data-grid-slug]').forEach(initGrid);
});

function initGrid(wrapper) {
    const slug = wrapper.dataset.gridSlug;
    const taxonomy = wrapper.dataset.taxonomy;
    const perPage = parseInt(wrapper.dataset.itemsPerPage || '6', 10) || 6;
    const items = wrapper.querySelector('.' + slug + '-grid-items');
    const linkClass = slug + '-page-link';
    if (!items) return;

    let latest = 0;

    function setCurrent(page) {
        wrapper.querySelectorAll('.' + linkClass).forEach(link => {
            link.classList.toggle('current', parseInt(link.dataset.page, 10) === page);
        });
    }

    function clearRetry() {
        const old = wrapper.querySelector('.grid-retry');
        if (old) old.remove();
    }

    function showRetry(page, push) {
        clearRetry();
        const box = document.createElement('p');
        box.className = 'grid-retry';
        box.textContent = 'Could not load page ' + page + '. ';
        const button = document.createElement('button');
        button.type = 'button';
        button.textContent = 'Retry';
        button.addEventListener('click', () => loadPage(page, push));
        box.appendChild(button);
        items.after(box);
    }

    async function loadPage(page, push) {
        const seq = ++latest;
        const body = new URLSearchParams();
        body.append('action', wrapper.dataset.action);
        if (taxonomy) body.append('taxonomy', taxonomy);
        body.append('page', String(page));
        body.append('per_page', String(perPage));

        try {
            const res = await fetch(wrapper.dataset.ajaxUrl, { method: 'POST', body });
            if (!res.ok) throw new Error('HTTP ' + res.status);
            const html = await res.text();
            if (seq !== latest) return;
            clearRetry();
            items.innerHTML = html;
            setCurrent(page);
            wrapper.dataset.currentPage = String(page);
            if (push) {
                const url = new URL(location.href);
                url.searchParams.set('page', String(page));
                history.pushState({ page }, '', url.toString());
            }
        } catch (err) {
            if (seq !== latest) return;
            console.error('Grid page load failed:', err);
            showRetry(page, push);
        }
    }

    wrapper.addEventListener('click', (e) => {
        const link = e.target.closest('.' + linkClass);
        if (!link || !wrapper.contains(link)) return;
        e.preventDefault();
        loadPage(parseInt(link.dataset.page, 10) || 1, true);
    });

    window.addEventListener('popstate', (e) => {
        const page = (e.state && e.state.page) || 1;
        loadPage(page, false);
    });
}
"#;

/// Page styles.
pub const CSS: &str = r#"
* { box-sizing: border-box; }
body { font-family: system-ui, sans-serif; margin: 0; color: #222; background: #fff; }
#main-header { border-bottom: 1px solid #ccc; padding: 0.5rem 1rem; }
#main-header .logo { font-weight: bold; color: inherit; text-decoration: none; }
main { max-width: 1100px; margin: 0 auto; padding: 1rem; }
a[class$="-page-link"] { padding: 0.25rem 0.6rem; border: 1px solid #ccc; border-radius: 4px; text-decoration: none; }
a[class$="-page-link"].current, a.current { background: #0066cc; color: #fff; border-color: #0066cc; }
.grid-retry { text-align: center; color: #a33; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{PageRequest, PageResult};

    fn card(id: i64, name: &str) -> TermCard {
        TermCard {
            id,
            name: name.to_string(),
            link: format!("https://example.com/issues/{id}/"),
            image_url: "/static/default-term.svg".to_string(),
        }
    }

    fn grid_page(taxonomy: &str, cards: Vec<TermCard>, page: u32, total: usize) -> GridPage {
        let request = PageRequest::new(None, page, 6);
        GridPage {
            page: PageResult {
                taxonomy: taxonomy.to_string(),
                terms: Vec::new(),
                page: request.page,
                per_page: request.per_page,
                total_terms: total,
                total_pages: crate::grid::total_pages(total, 6),
            },
            cards,
        }
    }

    #[test]
    fn test_cards_escape_names() {
        let html = cards(&GridDefinition::issue(), &[card(1, r#"Fish & "Chips""#)]);
        assert!(html.contains(r#"class="issue-item""#));
        assert!(html.contains(r#"alt="Fish &amp; &quot;Chips&quot;""#));
        assert!(html.contains(">Fish &amp; &quot;Chips&quot;</a></h3>"));
        assert_eq!(html.matches("https://example.com/issues/1/").count(), 2);
    }

    #[test]
    fn test_page_links_replace_page() {
        let links = PageLinks::new(
            "/grids/taxonomy",
            vec![
                ("taxonomy".to_string(), "genre".to_string()),
                ("page".to_string(), "7".to_string()),
            ],
        );
        assert_eq!(links.href(2), "/grids/taxonomy?taxonomy=genre&page=2");
        assert_eq!(PageLinks::new("/x", Vec::new()).href(1), "/x?page=1");
    }

    #[test]
    fn test_pagination_marks_one_current() {
        let links = PageLinks::new("/grids/issue", Vec::new());
        let page = grid_page("issues", Vec::new(), 2, 14);
        let html = pagination(&GridDefinition::issue(), &page.page, &links);
        assert_eq!(html.matches(r#"class="issue-page-link""#).count(), 2);
        assert_eq!(html.matches(r#"class="issue-page-link current""#).count(), 1);
        assert!(html.contains(r#"href="/grids/issue?page=2" class="issue-page-link current" data-page="2""#));
    }

    #[test]
    fn test_single_page_has_no_strip() {
        let links = PageLinks::default();
        for total in [6, 0] {
            let page = grid_page("issues", Vec::new(), 1, total);
            assert!(pagination(&GridDefinition::issue(), &page.page, &links).is_empty());
        }
    }

    #[test]
    fn test_grid_block_attributes() {
        let links = PageLinks::new("/grids/taxonomy", Vec::new());
        let page = grid_page("genre", vec![card(1, "Jazz")], 1, 8);
        let html = grid_block(&GridDefinition::taxonomy(), &page, &links, "/ajax");
        assert!(html.starts_with(r#"<div class="wp-block-taxonomy-grid" data-grid-slug="taxonomy" data-taxonomy="genre" data-current-page="1" data-items-per-page="6" data-action="taxonomy_grid_ajax" data-ajax-url="/ajax">"#));
        assert!(html.contains("grid-template-columns: repeat(3, 1fr)"));
        assert!(html.contains(r#"class="taxonomy-pagination""#));

        let html = grid_block(&GridDefinition::issue(), &page, &links, "/ajax");
        assert!(!html.contains("data-taxonomy"));
        assert!(html.contains("repeat(auto-fit, minmax(180px, 1fr))"));
    }

    #[test]
    fn test_esc_url() {
        assert_eq!(esc_url("javascript:alert(1)"), "");
        assert_eq!(esc_url("/a b?x=1&y=2"), "/a%20b?x=1&amp;y=2");
        assert_eq!(esc_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn test_message_escapes() {
        assert_eq!(message("Invalid taxonomy: <b>"), "<p>Invalid taxonomy: &lt;b&gt;</p>");
    }
}
