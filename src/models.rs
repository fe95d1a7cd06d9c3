//! Domain models shared by the store, the grid renderer and the controller.

use serde::{Deserialize, Serialize};

/// A node in a classification taxonomy.
///
/// Terms are owned by the term store; the grid only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    /// Canonical link to the term's archive page.
    pub link: String,
    /// Number of items filed under the term. Zero means the term is empty.
    pub count: i64,
    /// Raw thumbnail field value (an attachment id), if set.
    pub thumbnail: Option<String>,
    /// Raw date field value, used only for ordering.
    pub date: Option<String>,
}

impl Term {
    pub fn is_empty(&self) -> bool {
        self.count <= 0
    }
}

/// Canonical archive link for a term.
pub fn term_link(site_url: &str, taxonomy: &str, slug: &str) -> String {
    format!("{}/{}/{}/", site_url.trim_end_matches('/'), taxonomy, slug)
}

/// A named classification scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub name: String,
    /// Singular human-readable label.
    pub label: String,
    pub public: bool,
}

/// An uploaded media item referenced by thumbnail fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    pub url: String,
    /// Downscaled rendition, preferred for grid cards.
    pub medium_url: Option<String>,
}

impl Attachment {
    /// URL of the rendition used on grid cards.
    pub fn card_url(&self) -> &str {
        self.medium_url.as_deref().unwrap_or(&self.url)
    }
}

/// Metadata field names read for one taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldNames {
    pub date: String,
    pub thumbnail: String,
}

impl FieldNames {
    /// Field names follow the `<prefix>_date` / `<prefix>_thumbnail` convention.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            date: format!("{prefix}_date"),
            thumbnail: format!("{prefix}_thumbnail"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_from_prefix() {
        let fields = FieldNames::with_prefix("issue");
        assert_eq!(fields.date, "issue_date");
        assert_eq!(fields.thumbnail, "issue_thumbnail");
    }

    #[test]
    fn test_attachment_prefers_medium() {
        let mut attachment = Attachment {
            id: 1,
            url: "/uploads/full.jpg".to_string(),
            medium_url: Some("/uploads/medium.jpg".to_string()),
        };
        assert_eq!(attachment.card_url(), "/uploads/medium.jpg");
        attachment.medium_url = None;
        assert_eq!(attachment.card_url(), "/uploads/full.jpg");
    }
}
