//! Loading one page of a grid from a term store.

use std::sync::Arc;

use serde::Serialize;

use super::ordering::sort_terms;
use super::paginate::{paginate, PageRequest, PageResult};
use super::GridDefinition;
use crate::models::Term;
use crate::repository::{StoreError, TermStore};

/// Reasons a grid page cannot be produced.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Invalid taxonomy: {0}")]
    InvalidTaxonomy(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Display data for one term card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCard {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub image_url: String,
}

/// A page of a grid with thumbnails resolved.
#[derive(Debug, Clone, Serialize)]
pub struct GridPage {
    pub page: PageResult,
    pub cards: Vec<TermCard>,
}

impl GridPage {
    /// The taxonomy has no terms at all (as opposed to a page past the end).
    pub fn is_empty(&self) -> bool {
        self.page.total_terms == 0
    }
}

/// Runs the validate/fetch/sort/slice pipeline for grid definitions.
#[derive(Clone)]
pub struct GridService {
    store: Arc<dyn TermStore>,
    default_image_url: String,
}

impl GridService {
    pub fn new(store: Arc<dyn TermStore>, default_image_url: impl Into<String>) -> Self {
        Self {
            store,
            default_image_url: default_image_url.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn TermStore> {
        &self.store
    }

    /// Load one page of `grid` for `request`.
    ///
    /// Terms are re-fetched and re-sorted on every call.
    pub async fn load(
        &self,
        grid: &GridDefinition,
        request: &PageRequest,
    ) -> Result<GridPage, GridError> {
        let taxonomy = grid.resolve_taxonomy(request.taxonomy.as_deref());
        if !self.store.taxonomy_exists(&taxonomy).await? {
            tracing::warn!("Grid {} requested unknown taxonomy {:?}", grid.slug, taxonomy);
            return Err(GridError::InvalidTaxonomy(taxonomy));
        }

        let fields = grid.fields(&taxonomy);
        let mut terms = self
            .store
            .terms(&taxonomy, &fields, !grid.include_empty)
            .await?;
        sort_terms(&mut terms);

        let page = paginate(&taxonomy, terms, request);
        let mut cards = Vec::with_capacity(page.terms.len());
        for term in &page.terms {
            cards.push(self.card(term).await?);
        }

        tracing::debug!(
            "Grid {} taxonomy={} page={}/{} items={}",
            grid.slug,
            taxonomy,
            page.page,
            page.total_pages,
            cards.len()
        );
        Ok(GridPage { page, cards })
    }

    async fn card(&self, term: &Term) -> Result<TermCard, StoreError> {
        Ok(TermCard {
            id: term.id,
            name: term.name.clone(),
            link: term.link.clone(),
            image_url: self.thumbnail_url(term.thumbnail.as_deref()).await?,
        })
    }

    /// Resolve a raw thumbnail field value to an image URL.
    ///
    /// Numeric values are attachment ids; other non-empty values are taken
    /// as URLs. Anything unresolvable falls back to the default image.
    pub async fn thumbnail_url(&self, raw: Option<&str>) -> Result<String, StoreError> {
        let raw = match raw.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(self.default_image_url.clone()),
        };

        match raw.parse::<i64>() {
            Ok(0) => Ok(self.default_image_url.clone()),
            Ok(id) => Ok(self
                .store
                .attachment(id)
                .await?
                .map(|a| a.card_url().to_string())
                .unwrap_or_else(|| self.default_image_url.clone())),
            Err(_) => Ok(raw.to_string()),
        }
    }
}
