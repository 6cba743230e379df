//! SiteBuilder for fluent API to build the site server

use super::host::SiteHost;
use super::router::build_site_router;
use crate::config::SiteConfig;
use crate::core::messages::Catalogs;
use crate::core::order::{LoggingOrderIntake, OrderIntake};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the site server
///
/// # Example
///
/// ```ignore
/// let app = SiteBuilder::new()
///     .with_config(SiteConfig::from_yaml_file("config/site.yaml")?)
///     .with_order_intake(MyCrmIntake::new())
///     .build()?;
/// ```
pub struct SiteBuilder {
    config: SiteConfig,
    catalogs: Option<Catalogs>,
    intake: Option<Arc<dyn OrderIntake>>,
    custom_routes: Vec<Router>,
}

impl SiteBuilder {
    /// Create a new SiteBuilder with the default configuration
    pub fn new() -> Self {
        Self {
            config: SiteConfig::default_config(),
            catalogs: None,
            intake: None,
            custom_routes: Vec::new(),
        }
    }

    /// Replace the site configuration
    pub fn with_config(mut self, config: SiteConfig) -> Self {
        self.config = config;
        self
    }

    /// Use these catalogs instead of loading them from the configuration
    pub fn with_catalogs(mut self, catalogs: Catalogs) -> Self {
        self.catalogs = Some(catalogs);
        self
    }

    /// Send orders to `intake` instead of the log
    pub fn with_order_intake(mut self, intake: impl OrderIntake + 'static) -> Self {
        self.intake = Some(Arc::new(intake));
        self
    }

    /// Add custom routes to the server
    ///
    /// Custom routes are matched before locale resolution, like the health
    /// checks, and are never localized.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the host
    ///
    /// Loads every catalog (from `messages_dir` when configured, otherwise
    /// the built-in ones) and compiles the templates. Any missing catalog
    /// fails here rather than on the first request.
    pub fn build_host(&mut self) -> Result<SiteHost> {
        let registry = self.config.registry()?;

        let catalogs = match self.catalogs.take() {
            Some(catalogs) => catalogs,
            None => match &self.config.messages_dir {
                Some(dir) => Catalogs::load_dir(dir, &registry)?,
                None => Catalogs::embedded(&registry)?,
            },
        };

        let intake = self
            .intake
            .take()
            .unwrap_or_else(|| Arc::new(LoggingOrderIntake));

        let host = SiteHost::from_builder_components(self.config.clone(), catalogs, intake)?;

        tracing::info!(
            locales = ?registry.locales(),
            default = %registry.default_locale(),
            prefix = ?self.config.locales.prefix,
            "site host ready"
        );

        Ok(host)
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Ok(build_site_router(host, custom_routes).layer(TraceLayer::new_for_http()))
    }

    /// Serve the site with graceful shutdown
    ///
    /// This will:
    /// - Bind to the configured address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
