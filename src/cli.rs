//! Command-line interface.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::{load_settings, Settings};
use crate::controller::{
    card_titles, find_wrapper, HttpTransport, LoadOutcome, MemoryHistory, PaginationController,
};
use crate::grid::{page_number, GridService, PageRequest};
use crate::repository::{DieselTermRepository, Fixture};
use crate::server::{self, render_grid, templates::PageLinks};

#[derive(Parser)]
#[command(name = "termgrid", version, about = "Paginated grids of taxonomy terms")]
pub struct Cli {
    /// Data directory (overrides config)
    #[arg(long, global = true, env = "TERMGRID_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and its tables
    Init,

    /// Load taxonomies, terms and attachments from a TOML fixture file
    Import {
        /// Fixture file
        file: PathBuf,
    },

    /// Print the initial render of a grid
    Render {
        /// Grid slug
        slug: String,
        /// Taxonomy for field-driven grids
        #[arg(long)]
        taxonomy: Option<String>,
        /// Page number
        #[arg(long, allow_hyphen_values = true)]
        page: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1", env = "TERMGRID_HOST")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3030, env = "TERMGRID_PORT")]
        port: u16,
    },

    /// Page through a grid on a running server
    Fetch {
        /// Server base URL, e.g. http://127.0.0.1:3030
        server: String,
        /// Grid slug
        slug: String,
        /// Taxonomy for field-driven grids
        #[arg(long)]
        taxonomy: Option<String>,
        /// Pages to visit, in order
        #[arg(long = "page", num_args = 1.., allow_hyphen_values = true)]
        pages: Vec<String>,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "termgrid=debug,tower_http=debug"
    } else {
        "termgrid=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut settings = load_settings().await;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = dir;
    }

    match cli.command {
        Commands::Init => cmd_init(&settings).await,
        Commands::Import { file } => cmd_import(&settings, &file).await,
        Commands::Render {
            slug,
            taxonomy,
            page,
        } => cmd_render(&settings, &slug, taxonomy.as_deref(), page.as_deref()).await,
        Commands::Serve { host, port } => {
            settings.ensure_directories()?;
            server::serve(&settings, &host, port).await
        }
        Commands::Fetch {
            server,
            slug,
            taxonomy,
            pages,
            timeout,
        } => cmd_fetch(&server, &slug, taxonomy.as_deref(), &pages, timeout).await,
    }
}

async fn open_repository(settings: &Settings) -> anyhow::Result<DieselTermRepository> {
    settings.ensure_directories()?;
    let path = settings.database_path();
    DieselTermRepository::open(&path, &settings.site_url)
        .await
        .with_context(|| format!("failed to open database {}", path.display()))
}

async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    open_repository(settings).await?;
    println!("Initialized {}", settings.database_path().display());
    Ok(())
}

async fn cmd_import(settings: &Settings, file: &std::path::Path) -> anyhow::Result<()> {
    let fixture =
        Fixture::load(file).with_context(|| format!("failed to load {}", file.display()))?;
    let repo = open_repository(settings).await?;
    let summary = repo.import(&fixture).await?;
    println!(
        "Imported {} taxonomies, {} terms, {} fields, {} attachments",
        summary.taxonomies, summary.terms, summary.fields, summary.attachments
    );
    Ok(())
}

async fn cmd_render(
    settings: &Settings,
    slug: &str,
    taxonomy: Option<&str>,
    page: Option<&str>,
) -> anyhow::Result<()> {
    let grid = settings
        .grids
        .iter()
        .find(|g| g.slug == slug)
        .with_context(|| format!("no grid named {}", slug))?;

    let repo = open_repository(settings).await?;
    let service = GridService::new(Arc::new(repo), settings.default_image_url.clone());
    let request = PageRequest::from_params(taxonomy, page, None, grid.items_per_page);

    let query = taxonomy
        .filter(|_| grid.is_field_driven())
        .map(|t| vec![("taxonomy".to_string(), t.to_string())])
        .unwrap_or_default();
    let links = PageLinks::new(format!("/grids/{}", slug), query);

    println!(
        "{}",
        render_grid(&service, grid, &request, &links, &settings.ajax_path).await
    );
    Ok(())
}

fn print_view(controller: &PaginationController) {
    let titles = card_titles(&controller.view().items_html, &controller.config().slug);
    println!("Page {} ({} items)", controller.current_page(), titles.len());
    for title in titles {
        println!("  {}", title);
    }
}

async fn cmd_fetch(
    server: &str,
    slug: &str,
    taxonomy: Option<&str>,
    pages: &[String],
    timeout: u64,
) -> anyhow::Result<()> {
    let transport = HttpTransport::new(Duration::from_secs(timeout))?;
    let base = Url::parse(server).with_context(|| format!("invalid server URL {}", server))?;
    let mut page_url = base.join(&format!("/grids/{}", slug))?;
    if let Some(taxonomy) = taxonomy {
        page_url.query_pairs_mut().append_pair("taxonomy", taxonomy);
    }

    let html = transport.get_page(page_url.as_str()).await?;
    let Some(mut controller) = PaginationController::attach(find_wrapper(&html)) else {
        println!("No grid found at {}", page_url);
        return Ok(());
    };
    let ajax_url = page_url.join(&controller.config().ajax_url)?;
    controller.set_ajax_url(ajax_url.to_string());

    let mut history = MemoryHistory::new(page_url.to_string());
    print_view(&controller);

    for raw in pages {
        let page = page_number(Some(raw));
        match controller.load_page(page, &transport, &mut history).await {
            LoadOutcome::Applied { .. } => print_view(&controller),
            LoadOutcome::Failed { page, error } => {
                eprintln!("Page {} failed: {}", page, error);
            }
            LoadOutcome::Stale { .. } => {}
        }
    }
    Ok(())
}
