//! TOML fixture files for seeding a term store.
//!
//! ```toml
//! [[taxonomies]]
//! name = "issues"
//! label = "Issue"
//!
//! [[terms]]
//! id = 1
//! taxonomy = "issues"
//! name = "Spring 2024"
//! count = 4
//! fields = { issue_date = "20240301", issue_thumbnail = "10" }
//!
//! [[attachments]]
//! id = 10
//! url = "/uploads/spring.jpg"
//! medium_url = "/uploads/spring-300x300.jpg"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::StoreError;
use crate::models::{term_link, Attachment, Taxonomy, Term};

/// Contents of a fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub taxonomies: Vec<TaxonomyFixture>,
    #[serde(default)]
    pub terms: Vec<TermFixture>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

fn default_true() -> bool {
    true
}

fn default_count() -> i64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaxonomyFixture {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub public: bool,
}

impl TaxonomyFixture {
    pub fn to_taxonomy(&self) -> Taxonomy {
        Taxonomy {
            name: self.name.clone(),
            label: self.label.clone().unwrap_or_else(|| self.name.clone()),
            public: self.public,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TermFixture {
    pub id: i64,
    pub taxonomy: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default = "default_count")]
    pub count: i64,
    /// Custom field values keyed by field name.
    #[serde(default)]
    pub fields: HashMap<String, String>,
}

impl TermFixture {
    pub fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }

    /// The term without metadata fields resolved.
    pub fn to_term(&self, site_url: &str) -> Term {
        let slug = self.slug();
        Term {
            id: self.id,
            taxonomy: self.taxonomy.clone(),
            name: self.name.clone(),
            link: term_link(site_url, &self.taxonomy, &slug),
            slug,
            count: self.count,
            thumbnail: None,
            date: None,
        }
    }
}

impl Fixture {
    pub fn parse(content: &str) -> Result<Self, StoreError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Lowercase a name and join its alphanumeric runs with hyphens.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Spring 2024"), "spring-2024");
        assert_eq!(slugify("  Rock & Roll!! "), "rock-roll");
    }

    #[test]
    fn test_parse_fixture() {
        let fixture = Fixture::parse(
            r#"
            [[taxonomies]]
            name = "issues"
            label = "Issue"

            [[terms]]
            id = 1
            taxonomy = "issues"
            name = "Spring 2024"
            fields = { issue_date = "20240301" }

            [[attachments]]
            id = 10
            url = "/uploads/spring.jpg"
            "#,
        )
        .unwrap();

        assert!(fixture.taxonomies[0].public);
        let term = fixture.terms[0].to_term("https://example.com/");
        assert_eq!(term.slug, "spring-2024");
        assert_eq!(term.count, 1);
        assert_eq!(term.link, "https://example.com/issues/spring-2024/");
        assert_eq!(fixture.terms[0].fields["issue_date"], "20240301");
        assert_eq!(fixture.attachments[0].medium_url, None);
    }

    #[test]
    fn test_parse_fixture_rejects_bad_toml() {
        assert!(matches!(
            Fixture::parse("[[terms]]\nid = \"x\""),
            Err(StoreError::Fixture(_))
        ));
    }
}
