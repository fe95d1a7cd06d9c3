//! Diesel-based term repository for SQLite.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;

use super::diesel_models::{AttachmentRecord, TaxonomyRecord, TermMetaRecord, TermRecord};
use super::diesel_pool::{create_diesel_pool, run_blocking, SqlitePool};
use super::fixtures::Fixture;
use super::{StoreError, TermStore};
use crate::models::{Attachment, FieldNames, Taxonomy, Term};
use crate::schema::{attachments, taxonomies, term_meta, terms};

/// Tables backing the term store.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS taxonomies (
    name TEXT PRIMARY KEY NOT NULL,
    label TEXT NOT NULL,
    public BOOLEAN NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS terms (
    id INTEGER PRIMARY KEY NOT NULL,
    taxonomy TEXT NOT NULL,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_terms_taxonomy ON terms(taxonomy);
CREATE TABLE IF NOT EXISTS term_meta (
    term_id INTEGER NOT NULL REFERENCES terms(id) ON DELETE CASCADE,
    meta_key TEXT NOT NULL,
    meta_value TEXT NOT NULL,
    PRIMARY KEY (term_id, meta_key)
);
CREATE TABLE IF NOT EXISTS attachments (
    id INTEGER PRIMARY KEY NOT NULL,
    url TEXT NOT NULL,
    medium_url TEXT
);
"#;

/// Counts of rows written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub taxonomies: usize,
    pub terms: usize,
    pub fields: usize,
    pub attachments: usize,
}

/// Diesel-based term repository.
#[derive(Clone)]
pub struct DieselTermRepository {
    pool: SqlitePool,
    site_url: String,
}

impl DieselTermRepository {
    /// Create a repository over an existing pool. Term links are built
    /// relative to `site_url`.
    pub fn new(pool: SqlitePool, site_url: impl Into<String>) -> Self {
        Self {
            pool,
            site_url: site_url.into(),
        }
    }

    /// Open (creating if needed) the database at `db_path` and ensure the
    /// schema exists.
    pub async fn open(db_path: &Path, site_url: impl Into<String>) -> Result<Self, StoreError> {
        let pool = create_diesel_pool(db_path)?;
        let repo = Self::new(pool, site_url);
        repo.init_schema().await?;
        Ok(repo)
    }

    /// Create the tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        run_blocking(self.pool.clone(), |conn| conn.batch_execute(SCHEMA_SQL)).await?;
        Ok(())
    }

    /// Upsert everything in a fixture in one transaction.
    pub async fn import(&self, fixture: &Fixture) -> Result<ImportSummary, StoreError> {
        let taxonomy_rows: Vec<TaxonomyRecord> = fixture
            .taxonomies
            .iter()
            .map(|t| {
                let taxonomy = t.to_taxonomy();
                TaxonomyRecord {
                    name: taxonomy.name,
                    label: taxonomy.label,
                    public: taxonomy.public,
                }
            })
            .collect();
        let term_rows: Vec<TermRecord> = fixture
            .terms
            .iter()
            .map(|t| TermRecord {
                id: t.id,
                taxonomy: t.taxonomy.clone(),
                name: t.name.clone(),
                slug: t.slug(),
                count: t.count,
            })
            .collect();
        let meta_rows: Vec<TermMetaRecord> = fixture
            .terms
            .iter()
            .flat_map(|t| {
                t.fields.iter().map(move |(key, value)| TermMetaRecord {
                    term_id: t.id,
                    meta_key: key.clone(),
                    meta_value: value.clone(),
                })
            })
            .collect();
        let attachment_rows: Vec<AttachmentRecord> =
            fixture.attachments.iter().map(AttachmentRecord::from).collect();

        let summary = run_blocking(self.pool.clone(), move |conn| {
            conn.transaction(|conn| {
                let mut summary = ImportSummary::default();
                // SQLite caps bound parameters per statement, so rows go one by one
                for row in &taxonomy_rows {
                    summary.taxonomies +=
                        diesel::replace_into(taxonomies::table).values(row).execute(conn)?;
                }
                for row in &term_rows {
                    summary.terms += diesel::replace_into(terms::table).values(row).execute(conn)?;
                }
                for row in &meta_rows {
                    summary.fields +=
                        diesel::replace_into(term_meta::table).values(row).execute(conn)?;
                }
                for row in &attachment_rows {
                    summary.attachments +=
                        diesel::replace_into(attachments::table).values(row).execute(conn)?;
                }
                Ok(summary)
            })
        })
        .await?;

        tracing::info!(
            "Imported {} taxonomies, {} terms, {} fields, {} attachments",
            summary.taxonomies,
            summary.terms,
            summary.fields,
            summary.attachments
        );
        Ok(summary)
    }
}

#[async_trait]
impl TermStore for DieselTermRepository {
    async fn taxonomy_exists(&self, name: &str) -> Result<bool, StoreError> {
        let name = name.to_string();
        let exists = run_blocking(self.pool.clone(), move |conn| {
            use diesel::dsl::count_star;
            let count: i64 = taxonomies::table
                .filter(taxonomies::name.eq(&name))
                .select(count_star())
                .first(conn)?;
            Ok(count > 0)
        })
        .await?;
        Ok(exists)
    }

    async fn public_taxonomies(&self) -> Result<Vec<Taxonomy>, StoreError> {
        let records = run_blocking(self.pool.clone(), |conn| {
            taxonomies::table
                .filter(taxonomies::public.eq(true))
                .order(taxonomies::name.asc())
                .select(TaxonomyRecord::as_select())
                .load(conn)
        })
        .await?;
        Ok(records.into_iter().map(Taxonomy::from).collect())
    }

    async fn terms(
        &self,
        taxonomy: &str,
        fields: &FieldNames,
        hide_empty: bool,
    ) -> Result<Vec<Term>, StoreError> {
        let taxonomy = taxonomy.to_string();
        let keys = vec![fields.date.clone(), fields.thumbnail.clone()];

        let (records, meta) = run_blocking(self.pool.clone(), move |conn| {
            let mut query = terms::table
                .filter(terms::taxonomy.eq(&taxonomy))
                .into_boxed();
            if hide_empty {
                query = query.filter(terms::count.gt(0));
            }
            let records: Vec<TermRecord> = query
                .order(terms::id.asc())
                .select(TermRecord::as_select())
                .load(conn)?;

            let meta: Vec<TermMetaRecord> = term_meta::table
                .inner_join(terms::table)
                .filter(terms::taxonomy.eq(&taxonomy))
                .filter(term_meta::meta_key.eq_any(&keys))
                .select(TermMetaRecord::as_select())
                .load(conn)?;

            Ok((records, meta))
        })
        .await?;

        let mut values: HashMap<(i64, String), String> = meta
            .into_iter()
            .map(|m| ((m.term_id, m.meta_key), m.meta_value))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| {
                let id = record.id;
                let mut term = record.into_term(&self.site_url);
                term.date = values.remove(&(id, fields.date.clone()));
                term.thumbnail = values.remove(&(id, fields.thumbnail.clone()));
                term
            })
            .collect())
    }

    async fn attachment(&self, id: i64) -> Result<Option<Attachment>, StoreError> {
        let record = run_blocking(self.pool.clone(), move |conn| {
            attachments::table
                .find(id)
                .select(AttachmentRecord::as_select())
                .first(conn)
                .optional()
        })
        .await?;
        Ok(record.map(Attachment::from))
    }
}
