use clap::Parser;
use wizard_store::cli::{self, Cli};
use wizard_store::config::AppConfig;
use wizard_store::infrastructure::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let cli = Cli::parse();
    cli::run(cli, &config).await
}
