//! Diesel ORM models for database tables.
//!
//! SQLite operations run on sync Diesel connections wrapped in spawn_blocking.

use diesel::prelude::*;

use crate::models::{term_link, Attachment, Taxonomy, Term};
use crate::schema;

/// Taxonomy record from the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::taxonomies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaxonomyRecord {
    pub name: String,
    pub label: String,
    pub public: bool,
}

impl From<TaxonomyRecord> for Taxonomy {
    fn from(record: TaxonomyRecord) -> Self {
        Taxonomy {
            name: record.name,
            label: record.label,
            public: record.public,
        }
    }
}

/// Term record from the database.
#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::terms)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TermRecord {
    pub id: i64,
    pub taxonomy: String,
    pub name: String,
    pub slug: String,
    pub count: i64,
}

impl TermRecord {
    /// Convert to a domain term; metadata fields are filled in by the caller.
    pub fn into_term(self, site_url: &str) -> Term {
        Term {
            link: term_link(site_url, &self.taxonomy, &self.slug),
            id: self.id,
            taxonomy: self.taxonomy,
            name: self.name,
            slug: self.slug,
            count: self.count,
            thumbnail: None,
            date: None,
        }
    }
}

/// Custom field value attached to a term.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::term_meta)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TermMetaRecord {
    pub term_id: i64,
    pub meta_key: String,
    pub meta_value: String,
}

/// Attachment record from the database.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = schema::attachments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AttachmentRecord {
    pub id: i64,
    pub url: String,
    pub medium_url: Option<String>,
}

impl From<AttachmentRecord> for Attachment {
    fn from(record: AttachmentRecord) -> Self {
        Attachment {
            id: record.id,
            url: record.url,
            medium_url: record.medium_url,
        }
    }
}

impl From<&Attachment> for AttachmentRecord {
    fn from(attachment: &Attachment) -> Self {
        AttachmentRecord {
            id: attachment.id,
            url: attachment.url.clone(),
            medium_url: attachment.medium_url.clone(),
        }
    }
}
