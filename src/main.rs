//! Site server binary
//!
//! Configuration comes from the YAML file named by `SIWA_PALM_CONFIG`
//! (built-in defaults otherwise); `SIWA_PALM_ADDR` overrides the bind
//! address. Log filtering follows `RUST_LOG`.

use siwa_palm::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match std::env::var("SIWA_PALM_CONFIG") {
        Ok(path) => {
            tracing::info!(%path, "loading site configuration");
            SiteConfig::from_yaml_file(&path)?
        }
        Err(_) => SiteConfig::default_config(),
    };

    if let Ok(addr) = std::env::var("SIWA_PALM_ADDR") {
        config.bind = addr;
    }

    SiteBuilder::new().with_config(config).serve().await
}
