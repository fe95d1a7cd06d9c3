//! termgrid CLI entry point.

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    termgrid::cli::run().await
}
