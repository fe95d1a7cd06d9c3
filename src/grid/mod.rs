//! Paginated term grids.
//!
//! A grid is described by a [`GridDefinition`]: where its taxonomy comes from,
//! how its metadata fields are named, whether empty terms are shown and how
//! the cards are laid out. The same sort/slice/render pipeline serves every
//! definition, for the initial page render and for fragment requests alike.

mod ordering;
mod paginate;
mod service;

pub use ordering::{parse_date, sort_terms, sort_timestamp};
pub use paginate::{
    page_number, page_size, paginate, parse_int, total_pages, PageRequest, PageResult,
    DEFAULT_PER_PAGE,
};
pub use service::{GridError, GridPage, GridService, TermCard};

use serde::{Deserialize, Serialize};

use crate::models::FieldNames;

/// Where a grid gets its taxonomy from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, prefer::FromValue)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[prefer(tag = "kind")]
pub enum TaxonomySource {
    /// Always the same taxonomy; requested taxonomies are ignored.
    #[prefer(rename = "fixed")]
    Fixed { taxonomy: String },
    /// Taxonomy chosen per block/request, with a default.
    #[prefer(rename = "field_driven")]
    FieldDriven { default: String },
}

/// CSS grid layout for the card container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, prefer::FromValue)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[prefer(tag = "kind")]
pub enum GridLayout {
    /// As many columns as fit, each at least `min_width_px` wide.
    #[prefer(rename = "auto_fit")]
    AutoFit { min_width_px: u32 },
    /// A fixed number of equal columns.
    #[prefer(rename = "columns")]
    Columns { count: u32 },
}

impl Default for GridLayout {
    fn default() -> Self {
        GridLayout::Columns { count: 3 }
    }
}

impl GridLayout {
    /// Value for the `grid-template-columns` property.
    pub fn template_columns(&self) -> String {
        match self {
            GridLayout::AutoFit { min_width_px } => {
                format!("repeat(auto-fit, minmax({}px, 1fr))", min_width_px)
            }
            GridLayout::Columns { count } => format!("repeat({}, 1fr)", (*count).max(1)),
        }
    }
}

fn default_items_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

/// Configuration of one grid variant.
///
/// Read both from config files (through `prefer`) and from TOML directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, prefer::FromValue)]
pub struct GridDefinition {
    /// Short name, used in URLs and CSS class names.
    pub slug: String,
    /// Human-readable title.
    pub title: String,
    /// Name of the asynchronous action that serves fragments for this grid.
    pub action: String,
    pub source: TaxonomySource,
    /// Prefix for `<prefix>_date` / `<prefix>_thumbnail`. Defaults to the
    /// taxonomy name.
    #[serde(default)]
    pub field_prefix: Option<String>,
    /// Show terms with no items.
    #[serde(default)]
    #[prefer(default)]
    pub include_empty: bool,
    #[serde(default = "default_items_per_page")]
    #[prefer(default = "6")]
    pub items_per_page: u32,
    #[serde(default)]
    #[prefer(default)]
    pub layout: GridLayout,
    /// Message shown when the taxonomy has no terms.
    #[serde(default)]
    pub empty_message: Option<String>,
}

impl GridDefinition {
    /// The fixed-taxonomy "issue" grid.
    pub fn issue() -> Self {
        Self {
            slug: "issue".to_string(),
            title: "Issue Grid".to_string(),
            action: "issue_grid_ajax".to_string(),
            source: TaxonomySource::Fixed {
                taxonomy: "issues".to_string(),
            },
            field_prefix: Some("issue".to_string()),
            include_empty: true,
            items_per_page: DEFAULT_PER_PAGE,
            layout: GridLayout::AutoFit { min_width_px: 180 },
            empty_message: Some("No issues found.".to_string()),
        }
    }

    /// The generic grid over any public taxonomy.
    pub fn taxonomy() -> Self {
        Self {
            slug: "taxonomy".to_string(),
            title: "Taxonomy Grid".to_string(),
            action: "taxonomy_grid_ajax".to_string(),
            source: TaxonomySource::FieldDriven {
                default: "category".to_string(),
            },
            field_prefix: None,
            include_empty: false,
            items_per_page: DEFAULT_PER_PAGE,
            layout: GridLayout::Columns { count: 3 },
            empty_message: None,
        }
    }

    /// Pick the taxonomy to render for a requested one.
    pub fn resolve_taxonomy(&self, requested: Option<&str>) -> String {
        match &self.source {
            TaxonomySource::Fixed { taxonomy } => taxonomy.clone(),
            TaxonomySource::FieldDriven { default } => requested
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .unwrap_or(default)
                .to_string(),
        }
    }

    /// Whether the taxonomy travels with client requests.
    pub fn is_field_driven(&self) -> bool {
        matches!(self.source, TaxonomySource::FieldDriven { .. })
    }

    pub fn fields(&self, taxonomy: &str) -> FieldNames {
        FieldNames::with_prefix(self.field_prefix.as_deref().unwrap_or(taxonomy))
    }

    pub fn empty_message(&self, taxonomy: &str) -> String {
        match &self.empty_message {
            Some(message) => message.clone(),
            None => format!("No terms found for taxonomy: {}", taxonomy),
        }
    }

    pub fn wrapper_class(&self) -> String {
        format!("wp-block-{}-grid", self.slug)
    }

    pub fn items_class(&self) -> String {
        format!("{}-grid-items", self.slug)
    }

    pub fn item_class(&self) -> String {
        format!("{}-item", self.slug)
    }

    pub fn pagination_class(&self) -> String {
        format!("{}-pagination", self.slug)
    }

    pub fn page_link_class(&self) -> String {
        format!("{}-page-link", self.slug)
    }
}

/// The built-in grids.
pub fn default_grids() -> Vec<GridDefinition> {
    vec![GridDefinition::issue(), GridDefinition::taxonomy()]
}

/// Lookup of configured grids by slug or action name.
#[derive(Debug, Clone, Default)]
pub struct GridRegistry {
    grids: Vec<GridDefinition>,
}

impl GridRegistry {
    pub fn new(grids: Vec<GridDefinition>) -> Self {
        Self { grids }
    }

    pub fn by_slug(&self, slug: &str) -> Option<&GridDefinition> {
        self.grids.iter().find(|g| g.slug == slug)
    }

    pub fn by_action(&self, action: &str) -> Option<&GridDefinition> {
        self.grids.iter().find(|g| g.action == action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GridDefinition> {
        self.grids.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_source_ignores_request() {
        let grid = GridDefinition::issue();
        assert_eq!(grid.resolve_taxonomy(Some("genre")), "issues");
        assert_eq!(grid.resolve_taxonomy(None), "issues");
        assert!(!grid.is_field_driven());
    }

    #[test]
    fn test_field_driven_source_defaults() {
        let grid = GridDefinition::taxonomy();
        assert_eq!(grid.resolve_taxonomy(Some("genre")), "genre");
        assert_eq!(grid.resolve_taxonomy(Some("  ")), "category");
        assert_eq!(grid.resolve_taxonomy(None), "category");
        assert!(grid.is_field_driven());
    }

    #[test]
    fn test_field_names_follow_prefix() {
        assert_eq!(GridDefinition::issue().fields("issues").date, "issue_date");
        assert_eq!(
            GridDefinition::taxonomy().fields("genre").thumbnail,
            "genre_thumbnail"
        );
    }

    #[test]
    fn test_empty_messages() {
        assert_eq!(GridDefinition::issue().empty_message("issues"), "No issues found.");
        assert_eq!(
            GridDefinition::taxonomy().empty_message("genre"),
            "No terms found for taxonomy: genre"
        );
    }

    #[test]
    fn test_layout_template_columns() {
        assert_eq!(
            GridLayout::AutoFit { min_width_px: 180 }.template_columns(),
            "repeat(auto-fit, minmax(180px, 1fr))"
        );
        assert_eq!(GridLayout::Columns { count: 0 }.template_columns(), "repeat(1, 1fr)");
    }

    #[test]
    fn test_registry_lookup() {
        let registry = GridRegistry::new(default_grids());
        assert_eq!(registry.by_slug("issue").map(|g| g.action.as_str()), Some("issue_grid_ajax"));
        assert_eq!(
            registry.by_action("taxonomy_grid_ajax").map(|g| g.slug.as_str()),
            Some("taxonomy")
        );
        assert!(registry.by_action("nope").is_none());
    }

    #[test]
    fn test_definition_from_toml() {
        let grid: GridDefinition = toml::from_str(
            r#"
            slug = "genre"
            title = "Genres"
            action = "genre_grid_ajax"
            source = { kind = "fixed", taxonomy = "genre" }
            layout = { kind = "columns", count = 4 }
            "#,
        )
        .unwrap();
        assert_eq!(grid.items_per_page, DEFAULT_PER_PAGE);
        assert!(!grid.include_empty);
        assert_eq!(grid.resolve_taxonomy(Some("other")), "genre");
        assert_eq!(grid.layout, GridLayout::Columns { count: 4 });
    }
}
