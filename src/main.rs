// src/main.rs
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use contact_scraper::config::{load_config, AppConfig};
use contact_scraper::models::Result;
use contact_scraper::server::build_rocket;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let (config, config_error) = match load_config("config.yml").await {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = AppConfig::default();
            config.apply_env_overrides();
            (config, Some(e))
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("contact_scraper={}", config.logging.level))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(e) = config_error {
        warn!("Could not read config.yml ({}), using defaults", e);
    }

    tokio::fs::create_dir_all(&config.output.directory).await?;
    info!("📁 Exports go to {}/", config.output.directory);

    let _ = build_rocket(config).launch().await?;
    Ok(())
}
