//! Client-side pagination controller.
//!
//! The controller owns an explicit view of one grid wrapper (the cards markup
//! and the page-link strip) and reacts to two kinds of events: clicks on page
//! links and history navigation. Each page change becomes a numbered load:
//! [`PaginationController::begin_load`] issues it and
//! [`PaginationController::complete`] applies its response. Only the most
//! recently issued load may change the view; older responses are dropped.

pub mod document;
mod history;
mod transport;

pub use document::{card_titles, find_wrapper, GridWrapper};
pub use history::{page_url, History, HistoryState, MemoryHistory};
pub use transport::{FetchError, FragmentRequest, FragmentTransport, HttpTransport};

use crate::grid::parse_int;

/// Configuration read from the wrapper's data attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperConfig {
    pub slug: String,
    pub taxonomy: Option<String>,
    pub per_page: u32,
    pub current_page: u32,
    pub action: String,
    pub ajax_url: String,
}

impl WrapperConfig {
    pub fn items_class(&self) -> String {
        format!("{}-grid-items", self.slug)
    }

    pub fn link_class(&self) -> String {
        format!("{}-page-link", self.slug)
    }
}

/// One entry of the page-link strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLink {
    pub page: u32,
    pub current: bool,
}

/// What the user currently sees of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridView {
    pub items_html: String,
    pub page_links: Vec<PageLink>,
}

impl GridView {
    /// Mark exactly the links for `page` as current.
    pub fn set_current(&mut self, page: u32) {
        for link in &mut self.page_links {
            link.current = link.page == page;
        }
    }

    pub fn current_links(&self) -> Vec<u32> {
        self.page_links
            .iter()
            .filter(|l| l.current)
            .map(|l| l.page)
            .collect()
    }
}

/// The element a click landed on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
    pub classes: Vec<String>,
    pub data_page: Option<String>,
}

impl ClickTarget {
    /// Build a target from a class attribute value and a `data-page` value.
    pub fn new(class_attr: &str, data_page: Option<&str>) -> Self {
        Self {
            classes: class_attr.split_whitespace().map(str::to_string).collect(),
            data_page: data_page.map(str::to_string),
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// How a completed load treats session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
    /// User navigation: push `{page}` with the current URL's `page`
    /// parameter set to `<n>`.
    Push,
    /// Restoring an entry the browser already moved to: push nothing.
    Restore,
}

/// Handle for an issued load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub page: u32,
    pub mode: HistoryMode,
}

/// Result of applying a load's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The view now shows `page`.
    Applied { page: u32 },
    /// A newer load was issued since; the response was dropped.
    Stale { page: u32 },
    /// The fetch failed; the view is unchanged and a retry is offered.
    Failed { page: u32, error: String },
}

/// A failed load that can be retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPrompt {
    pub page: u32,
    pub mode: HistoryMode,
    pub error: String,
}

/// Pagination controller for one grid wrapper.
#[derive(Debug, Clone)]
pub struct PaginationController {
    config: WrapperConfig,
    view: GridView,
    current_page: u32,
    last_issued: u64,
    retry: Option<RetryPrompt>,
}

impl PaginationController {
    /// Take over a wrapper. Without one there is nothing to control.
    pub fn attach(wrapper: Option<GridWrapper>) -> Option<Self> {
        let wrapper = wrapper?;
        Some(Self {
            current_page: wrapper.config.current_page,
            config: wrapper.config,
            view: wrapper.view,
            last_issued: 0,
            retry: None,
        })
    }

    pub fn config(&self) -> &WrapperConfig {
        &self.config
    }

    /// Point fragment requests at a different endpoint URL.
    pub fn set_ajax_url(&mut self, url: impl Into<String>) {
        self.config.ajax_url = url.into();
    }

    pub fn view(&self) -> &GridView {
        &self.view
    }

    /// Page whose cards are currently shown.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Pending retry after a failed load, if any.
    pub fn retry_prompt(&self) -> Option<&RetryPrompt> {
        self.retry.as_ref()
    }

    /// Handle a click inside the wrapper.
    ///
    /// Returns a load when the target is a page link (its default navigation
    /// is then suppressed), `None` for any other click.
    pub fn on_click(&mut self, target: &ClickTarget) -> Option<LoadTicket> {
        if !target.has_class(&self.config.link_class()) {
            return None;
        }
        let page = target
            .data_page
            .as_deref()
            .and_then(parse_int)
            .map(|p| p.clamp(1, u32::MAX as i64) as u32)
            .unwrap_or(1);
        Some(self.begin_load(page, HistoryMode::Push))
    }

    /// Handle back/forward navigation to an entry with `state`.
    pub fn on_popstate(&mut self, state: Option<HistoryState>) -> LoadTicket {
        let page = state.map(|s| s.page).filter(|&p| p > 0).unwrap_or(1);
        self.begin_load(page, HistoryMode::Restore)
    }

    /// Issue a load for `page`. Any earlier load still in flight becomes stale.
    pub fn begin_load(&mut self, page: u32, mode: HistoryMode) -> LoadTicket {
        self.last_issued += 1;
        tracing::debug!("Grid {} load #{} page={}", self.config.slug, self.last_issued, page);
        LoadTicket {
            seq: self.last_issued,
            page: page.max(1),
            mode,
        }
    }

    /// Re-issue the last failed load.
    pub fn retry(&mut self) -> Option<LoadTicket> {
        let prompt = self.retry.clone()?;
        Some(self.begin_load(prompt.page, prompt.mode))
    }

    /// The fragment request for a load.
    pub fn request(&self, ticket: &LoadTicket) -> FragmentRequest {
        FragmentRequest {
            url: self.config.ajax_url.clone(),
            action: self.config.action.clone(),
            taxonomy: self.config.taxonomy.clone(),
            page: ticket.page,
            per_page: self.config.per_page,
        }
    }

    /// Apply the response of a load.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        response: Result<String, FetchError>,
        history: &mut dyn History,
    ) -> LoadOutcome {
        if ticket.seq != self.last_issued {
            tracing::debug!(
                "Dropping stale response #{} (latest #{})",
                ticket.seq,
                self.last_issued
            );
            return LoadOutcome::Stale { page: ticket.page };
        }

        match response {
            Ok(html) => {
                self.view.items_html = html;
                self.view.set_current(ticket.page);
                self.current_page = ticket.page;
                self.retry = None;
                if ticket.mode == HistoryMode::Push {
                    let url = page_url(history.current_url(), ticket.page);
                    history.push(HistoryState { page: ticket.page }, url);
                }
                LoadOutcome::Applied { page: ticket.page }
            }
            Err(e) => {
                tracing::warn!("Grid {} failed to load page {}: {}", self.config.slug, ticket.page, e);
                let error = e.to_string();
                self.retry = Some(RetryPrompt {
                    page: ticket.page,
                    mode: ticket.mode,
                    error: error.clone(),
                });
                LoadOutcome::Failed {
                    page: ticket.page,
                    error,
                }
            }
        }
    }

    /// Fetch and apply a load in one step.
    pub async fn run(
        &mut self,
        ticket: LoadTicket,
        transport: &dyn FragmentTransport,
        history: &mut dyn History,
    ) -> LoadOutcome {
        let request = self.request(&ticket);
        let response = transport.fetch(&request).await;
        self.complete(ticket, response, history)
    }

    /// Navigate to `page` as if its link had been clicked.
    pub async fn load_page(
        &mut self,
        page: u32,
        transport: &dyn FragmentTransport,
        history: &mut dyn History,
    ) -> LoadOutcome {
        let ticket = self.begin_load(page, HistoryMode::Push);
        self.run(ticket, transport, history).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    /// Serves `page-<n>` as the fragment for page n, failing while `down` is set.
    #[derive(Default)]
    struct FakeTransport {
        down: Mutex<bool>,
        requests: Mutex<Vec<FragmentRequest>>,
    }

    #[async_trait]
    impl FragmentTransport for FakeTransport {
        async fn fetch(&self, request: &FragmentRequest) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(request.clone());
            if *self.down.lock().unwrap() {
                return Err(FetchError::Status {
                    status: 503,
                    body: String::new(),
                });
            }
            Ok(format!("page-{}", request.page))
        }
    }

    fn controller(taxonomy: Option<&str>) -> PaginationController {
        let wrapper = GridWrapper {
            config: WrapperConfig {
                slug: "issue".to_string(),
                taxonomy: taxonomy.map(str::to_string),
                per_page: 6,
                current_page: 1,
                action: "issue_grid_ajax".to_string(),
                ajax_url: "http://localhost/ajax".to_string(),
            },
            view: GridView {
                items_html: "page-1".to_string(),
                page_links: (1..=3)
                    .map(|page| PageLink {
                        page,
                        current: page == 1,
                    })
                    .collect(),
            },
        };
        PaginationController::attach(Some(wrapper)).unwrap()
    }

    fn link(page: &str) -> ClickTarget {
        ClickTarget::new("issue-page-link", Some(page))
    }

    #[test]
    fn test_attach_without_wrapper() {
        assert!(PaginationController::attach(None).is_none());
    }

    #[tokio::test]
    async fn test_click_loads_page_and_pushes_history() {
        let transport = FakeTransport::default();
        let mut history = MemoryHistory::new("/grids/issue");
        let mut ctl = controller(None);

        let ticket = ctl.on_click(&link("2")).unwrap();
        let outcome = ctl.run(ticket, &transport, &mut history).await;

        assert_eq!(outcome, LoadOutcome::Applied { page: 2 });
        assert_eq!(ctl.view().items_html, "page-2");
        assert_eq!(ctl.view().current_links(), vec![2]);
        assert_eq!(history.current_url(), "/grids/issue?page=2");
        assert_eq!(history.current_state(), Some(HistoryState { page: 2 }));

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests[0].action, "issue_grid_ajax");
        assert_eq!(requests[0].per_page, 6);
        assert_eq!(requests[0].taxonomy, None);
    }

    #[test]
    fn test_request_carries_taxonomy() {
        let ctl = controller(Some("genre"));
        let request = ctl.request(&LoadTicket {
            seq: 1,
            page: 3,
            mode: HistoryMode::Push,
        });
        assert_eq!(request.taxonomy.as_deref(), Some("genre"));
        assert_eq!(request.page, 3);
    }

    #[tokio::test]
    async fn test_pushed_url_keeps_taxonomy() {
        let transport = FakeTransport::default();
        let mut history = MemoryHistory::new("/grids/taxonomy?taxonomy=genre");
        let mut ctl = controller(Some("genre"));

        ctl.load_page(2, &transport, &mut history).await;
        assert_eq!(history.current_url(), "/grids/taxonomy?taxonomy=genre&page=2");

        ctl.load_page(3, &transport, &mut history).await;
        assert_eq!(history.current_url(), "/grids/taxonomy?taxonomy=genre&page=3");
    }

    #[test]
    fn test_other_clicks_ignored() {
        let mut ctl = controller(None);
        assert!(ctl.on_click(&ClickTarget::new("issue-item", None)).is_none());
        assert!(ctl.on_click(&ClickTarget::new("taxonomy-page-link", Some("2"))).is_none());
        assert_eq!(
            ctl.on_click(&ClickTarget::new("issue-page-link current", Some("x")))
                .map(|t| t.page),
            Some(1)
        );
    }

    #[tokio::test]
    async fn test_back_restores_without_push() {
        let transport = FakeTransport::default();
        let mut history = MemoryHistory::new("/grids/issue");
        let mut ctl = controller(None);

        for page in ["2", "3"] {
            let ticket = ctl.on_click(&link(page)).unwrap();
            ctl.run(ticket, &transport, &mut history).await;
        }
        assert_eq!(history.push_count(), 2);

        let state = history.back().unwrap();
        let ticket = ctl.on_popstate(state);
        let outcome = ctl.run(ticket, &transport, &mut history).await;

        assert_eq!(outcome, LoadOutcome::Applied { page: 2 });
        assert_eq!(ctl.view().items_html, "page-2");
        assert_eq!(ctl.view().current_links(), vec![2]);
        assert_eq!(history.push_count(), 2);
        assert_eq!(history.current_url(), "/grids/issue?page=2");

        // Back to the server-rendered entry, which has no state
        let state = history.back().unwrap();
        assert_eq!(ctl.on_popstate(state).page, 1);
    }

    #[test]
    fn test_stale_response_dropped() {
        let mut history = MemoryHistory::new("/grids/issue");
        let mut ctl = controller(None);

        let slow = ctl.on_click(&link("2")).unwrap();
        let fast = ctl.on_click(&link("3")).unwrap();

        assert_eq!(
            ctl.complete(fast, Ok("page-3".to_string()), &mut history),
            LoadOutcome::Applied { page: 3 }
        );
        assert_eq!(
            ctl.complete(slow, Ok("page-2".to_string()), &mut history),
            LoadOutcome::Stale { page: 2 }
        );
        assert_eq!(ctl.view().items_html, "page-3");
        assert_eq!(ctl.current_page(), 3);
        assert_eq!(history.push_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_view_and_offers_retry() {
        let transport = FakeTransport::default();
        let mut history = MemoryHistory::new("/grids/issue");
        let mut ctl = controller(None);

        *transport.down.lock().unwrap() = true;
        let outcome = ctl.load_page(2, &transport, &mut history).await;
        assert!(matches!(outcome, LoadOutcome::Failed { page: 2, .. }));
        assert_eq!(ctl.view().items_html, "page-1");
        assert_eq!(ctl.view().current_links(), vec![1]);
        assert_eq!(history.push_count(), 0);
        assert_eq!(ctl.retry_prompt().map(|r| r.page), Some(2));

        *transport.down.lock().unwrap() = false;
        let ticket = ctl.retry().unwrap();
        assert_eq!(ticket.mode, HistoryMode::Push);
        let outcome = ctl.run(ticket, &transport, &mut history).await;
        assert_eq!(outcome, LoadOutcome::Applied { page: 2 });
        assert!(ctl.retry_prompt().is_none());
        assert_eq!(history.push_count(), 1);
    }

    #[test]
    fn test_stale_failure_ignored() {
        let mut history = MemoryHistory::new("/");
        let mut ctl = controller(None);
        let old = ctl.begin_load(2, HistoryMode::Push);
        let _new = ctl.begin_load(3, HistoryMode::Push);
        let outcome = ctl.complete(
            old,
            Err(FetchError::Status {
                status: 500,
                body: String::new(),
            }),
            &mut history,
        );
        assert_eq!(outcome, LoadOutcome::Stale { page: 2 });
        assert!(ctl.retry_prompt().is_none());
    }
}
