//! Term storage.
//!
//! The grid reads taxonomies, terms, term metadata and attachments through the
//! [`TermStore`] trait. [`DieselTermRepository`] keeps them in SQLite;
//! [`MemoryTermStore`] holds them in memory for tests and fixtures.

pub mod diesel_models;
pub mod diesel_pool;
pub mod diesel_terms;
pub mod fixtures;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Attachment, FieldNames, Taxonomy, Term};

pub use diesel_pool::{create_diesel_pool, create_diesel_pool_from_url, SqlitePool};
pub use diesel_terms::DieselTermRepository;
pub use fixtures::Fixture;

/// Errors raised by term stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to read fixture: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid fixture: {0}")]
    Fixture(#[from] toml::de::Error),
}

/// Read access to taxonomies and their terms.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Whether a taxonomy with this name is registered.
    async fn taxonomy_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Public taxonomies, ordered by name.
    async fn public_taxonomies(&self) -> Result<Vec<Taxonomy>, StoreError>;

    /// All terms of a taxonomy with the named date and thumbnail fields filled
    /// in. Terms with no items are skipped when `hide_empty` is set.
    async fn terms(
        &self,
        taxonomy: &str,
        fields: &FieldNames,
        hide_empty: bool,
    ) -> Result<Vec<Term>, StoreError>;

    async fn attachment(&self, id: i64) -> Result<Option<Attachment>, StoreError>;
}

#[derive(Default)]
struct MemoryState {
    taxonomies: Vec<Taxonomy>,
    /// Terms with their metadata fields.
    terms: Vec<(Term, HashMap<String, String>)>,
    attachments: HashMap<i64, Attachment>,
}

/// In-memory term store.
#[derive(Default)]
pub struct MemoryTermStore {
    state: RwLock<MemoryState>,
}

impl MemoryTermStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding everything in a fixture.
    pub fn from_fixture(fixture: &Fixture, site_url: &str) -> Self {
        let state = MemoryState {
            taxonomies: fixture.taxonomies.iter().map(|t| t.to_taxonomy()).collect(),
            terms: fixture
                .terms
                .iter()
                .map(|t| (t.to_term(site_url), t.fields.clone()))
                .collect(),
            attachments: fixture
                .attachments
                .iter()
                .map(|a| (a.id, a.clone()))
                .collect(),
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn add_taxonomy(&self, taxonomy: Taxonomy) {
        let mut state = self.state.write().await;
        state.taxonomies.retain(|t| t.name != taxonomy.name);
        state.taxonomies.push(taxonomy);
    }

    /// Add a term. `term.date` and `term.thumbnail` are ignored; metadata is
    /// read from `fields` according to the requested field names.
    pub async fn add_term(&self, term: Term, fields: HashMap<String, String>) {
        let mut state = self.state.write().await;
        state.terms.retain(|(t, _)| t.id != term.id);
        state.terms.push((term, fields));
    }

    pub async fn add_attachment(&self, attachment: Attachment) {
        self.state
            .write()
            .await
            .attachments
            .insert(attachment.id, attachment);
    }
}

#[async_trait]
impl TermStore for MemoryTermStore {
    async fn taxonomy_exists(&self, name: &str) -> Result<bool, StoreError> {
        let state = self.state.read().await;
        Ok(state.taxonomies.iter().any(|t| t.name == name))
    }

    async fn public_taxonomies(&self) -> Result<Vec<Taxonomy>, StoreError> {
        let state = self.state.read().await;
        let mut taxonomies: Vec<Taxonomy> =
            state.taxonomies.iter().filter(|t| t.public).cloned().collect();
        taxonomies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(taxonomies)
    }

    async fn terms(
        &self,
        taxonomy: &str,
        fields: &FieldNames,
        hide_empty: bool,
    ) -> Result<Vec<Term>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .terms
            .iter()
            .filter(|(t, _)| t.taxonomy == taxonomy)
            .filter(|(t, _)| !hide_empty || !t.is_empty())
            .map(|(t, meta)| Term {
                date: meta.get(&fields.date).cloned(),
                thumbnail: meta.get(&fields.thumbnail).cloned(),
                ..t.clone()
            })
            .collect())
    }

    async fn attachment(&self, id: i64) -> Result<Option<Attachment>, StoreError> {
        Ok(self.state.read().await.attachments.get(&id).cloned())
    }
}
