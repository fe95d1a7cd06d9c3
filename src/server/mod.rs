//! Web server for term grids.
//!
//! Serves:
//! - Full pages embedding the initial render of each configured grid
//! - The fragment endpoint the browser controller posts page changes to
//! - The controller script and default thumbnail

mod handlers;
mod routes;
pub mod templates;

pub use handlers::render_grid;
pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::grid::{GridRegistry, GridService};
use crate::repository::{DieselTermRepository, TermStore};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub grids: Arc<GridRegistry>,
    pub service: GridService,
    /// Path of the fragment endpoint, as advertised to the browser.
    pub ajax_path: String,
}

impl AppState {
    /// Build state over an already opened term store.
    pub fn with_store(settings: &Settings, store: Arc<dyn TermStore>) -> Self {
        Self {
            grids: Arc::new(GridRegistry::new(settings.grids.clone())),
            service: GridService::new(store, settings.default_image_url.clone()),
            ajax_path: settings.ajax_path.clone(),
        }
    }

    /// Open the configured SQLite database and build state over it.
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let repo = DieselTermRepository::open(&settings.database_path(), &settings.site_url).await?;
        Ok(Self::with_store(settings, Arc::new(repo)))
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
