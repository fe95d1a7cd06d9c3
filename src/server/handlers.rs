//! HTTP request handlers.

use axum::extract::{Path, RawQuery, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;

use super::templates::{self, PageLinks};
use super::AppState;
use crate::grid::{GridDefinition, GridError, GridService, PageRequest};

/// Render the initial (server-side) view of a grid: the wrapper with cards
/// and page links, or an inline message when there is nothing to show.
pub async fn render_grid(
    service: &GridService,
    grid: &GridDefinition,
    request: &PageRequest,
    links: &PageLinks,
    ajax_url: &str,
) -> String {
    match service.load(grid, request).await {
        Ok(page) if page.is_empty() => templates::message(&grid.empty_message(&page.page.taxonomy)),
        Ok(page) => templates::grid_block(grid, &page, links, ajax_url),
        Err(GridError::InvalidTaxonomy(taxonomy)) => {
            templates::message(&format!("Invalid taxonomy: {}", taxonomy))
        }
        Err(GridError::Store(e)) => {
            tracing::error!("Failed to load grid {}: {}", grid.slug, e);
            let taxonomy = grid.resolve_taxonomy(request.taxonomy.as_deref());
            templates::message(&grid.empty_message(&taxonomy))
        }
    }
}

fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(serde_json::json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// Index of configured grids.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let taxonomies = match state.service.store().public_taxonomies().await {
        Ok(taxonomies) => taxonomies,
        Err(e) => {
            tracing::error!("Failed to list taxonomies: {}", e);
            Vec::new()
        }
    };
    let grids: Vec<&GridDefinition> = state.grids.iter().collect();
    Html(templates::base_template(
        "Grids",
        &templates::index_page(&grids, &taxonomies),
    ))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

/// GET /grids/:slug: a page embedding the grid's initial render.
pub async fn grid_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    RawQuery(raw): RawQuery,
) -> Response {
    let Some(grid) = state.grids.by_slug(&slug) else {
        return (
            StatusCode::NOT_FOUND,
            Html(templates::base_template(
                "Not found",
                &templates::message(&format!("No grid named {}", slug)),
            )),
        )
            .into_response();
    };

    let pairs = query_pairs(raw.as_deref());
    let taxonomy = if grid.is_field_driven() {
        query_value(&pairs, "taxonomy")
    } else {
        None
    };
    let request = PageRequest::from_params(
        taxonomy,
        query_value(&pairs, "page"),
        None,
        grid.items_per_page,
    );
    let links = PageLinks::new(format!("/grids/{}", slug), pairs.clone());

    let content = render_grid(&state.service, grid, &request, &links, &state.ajax_path).await;
    Html(templates::base_template(&grid.title, &content)).into_response()
}

/// Form fields posted by the browser controller.
#[derive(Debug, Default, Deserialize)]
pub struct FragmentForm {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    taxonomy: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default)]
    per_page: Option<String>,
}

/// POST to the fragment endpoint. Returns the cards for one page, dispatched by action.
pub async fn fragment(State(state): State<AppState>, Form(form): Form<FragmentForm>) -> Response {
    let action = form.action.as_deref().unwrap_or_default();
    let Some(grid) = state.grids.by_action(action) else {
        tracing::warn!("Fragment request for unknown action {:?}", action);
        return json_error(StatusCode::BAD_REQUEST, "Unknown action");
    };

    let request = PageRequest::from_params(
        form.taxonomy.as_deref(),
        form.page.as_deref(),
        form.per_page.as_deref(),
        crate::grid::DEFAULT_PER_PAGE,
    );

    match state.service.load(grid, &request).await {
        Ok(page) => Html(templates::cards(grid, &page.cards)).into_response(),
        Err(GridError::InvalidTaxonomy(_)) => {
            json_error(StatusCode::BAD_REQUEST, "Invalid taxonomy")
        }
        Err(GridError::Store(e)) => {
            tracing::error!("Failed to load fragment for {}: {}", grid.slug, e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// Public taxonomies offered as choices for field-driven grids.
pub async fn list_taxonomies(State(state): State<AppState>) -> Response {
    match state.service.store().public_taxonomies().await {
        Ok(taxonomies) => {
            let choices: Vec<serde_json::Value> = taxonomies
                .into_iter()
                .map(|t| serde_json::json!({ "name": t.name, "label": t.label }))
                .collect();
            Json(choices).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list taxonomies: {}", e);
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

pub async fn grid_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        templates::GRID_JS,
    )
}

pub async fn default_image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], templates::DEFAULT_IMAGE_SVG)
}
