//! Session history as seen by the pagination controller.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// State stored with each history entry the controller pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    pub page: u32,
}

/// Destination for history entries.
pub trait History {
    /// URL of the current entry.
    fn current_url(&self) -> &str;

    /// Add an entry after the current one, discarding any forward entries.
    fn push(&mut self, state: HistoryState, url: String);
}

/// `current` with its `page` query parameter set to `page`. Other parameters
/// and the fragment are kept.
pub fn page_url(current: &str, page: u32) -> String {
    let (rest, fragment) = match current.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (current, None),
    };
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key != "page" {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.append_pair("page", &page.to_string());

    let mut url = format!("{}?{}", path, serializer.finish());
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    state: Option<HistoryState>,
    url: String,
}

/// Browser-like history kept in memory.
///
/// The initial entry carries no state, like a freshly loaded page.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<Entry>,
    index: usize,
    pushes: usize,
}

impl MemoryHistory {
    pub fn new(initial_url: impl Into<String>) -> Self {
        Self {
            entries: vec![Entry {
                state: None,
                url: initial_url.into(),
            }],
            index: 0,
            pushes: 0,
        }
    }

    /// Step back one entry, returning the restored state as a popstate event
    /// would carry it. `None` when already at the first entry.
    pub fn back(&mut self) -> Option<Option<HistoryState>> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].state)
    }

    /// Step forward one entry. `None` when already at the last entry.
    pub fn forward(&mut self) -> Option<Option<HistoryState>> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].state)
    }

    pub fn current_state(&self) -> Option<HistoryState> {
        self.entries[self.index].state
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries pushed since creation.
    pub fn push_count(&self) -> usize {
        self.pushes
    }
}

impl History for MemoryHistory {
    fn current_url(&self) -> &str {
        &self.entries[self.index].url
    }

    fn push(&mut self, state: HistoryState, url: String) {
        self.entries.truncate(self.index + 1);
        self.entries.push(Entry {
            state: Some(state),
            url,
        });
        self.index = self.entries.len() - 1;
        self.pushes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_back_and_forward() {
        let mut history = MemoryHistory::new("/grids/issue");
        history.push(HistoryState { page: 2 }, "?page=2".to_string());
        history.push(HistoryState { page: 3 }, "?page=3".to_string());

        assert_eq!(history.back(), Some(Some(HistoryState { page: 2 })));
        assert_eq!(history.back(), Some(None));
        assert_eq!(history.back(), None);
        assert_eq!(history.current_url(), "/grids/issue");
        assert_eq!(history.forward(), Some(Some(HistoryState { page: 2 })));
        assert_eq!(history.current_url(), "?page=2");
    }

    #[test]
    fn test_page_url_keeps_other_parameters() {
        assert_eq!(page_url("/grids/issue", 2), "/grids/issue?page=2");
        assert_eq!(
            page_url("/grids/taxonomy?taxonomy=genre", 2),
            "/grids/taxonomy?taxonomy=genre&page=2"
        );
        assert_eq!(
            page_url("http://h/grids/taxonomy?page=4&taxonomy=rock+%26+roll#top", 5),
            "http://h/grids/taxonomy?taxonomy=rock+%26+roll&page=5#top"
        );
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let mut history = MemoryHistory::new("/");
        history.push(HistoryState { page: 2 }, "?page=2".to_string());
        history.push(HistoryState { page: 3 }, "?page=3".to_string());
        history.back();
        history.push(HistoryState { page: 5 }, "?page=5".to_string());

        assert_eq!(history.len(), 3);
        assert_eq!(history.forward(), None);
        assert_eq!(history.current_state(), Some(HistoryState { page: 5 }));
        assert_eq!(history.push_count(), 3);
    }
}
