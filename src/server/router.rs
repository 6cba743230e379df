//! Route tables

use super::host::SiteHost;
use super::{api, handlers, middleware};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower::Layer;
use tower_http::services::ServeDir;

/// Page routes, relative to the locale prefix
///
/// - GET /                        - Home
/// - GET /products                - Product listing (`?q=` search)
/// - GET /products/{slug}         - Product detail
/// - POST /products/{slug}/order  - Order form submission
/// - GET /gallery                 - Gallery (`?category=` filter)
pub fn build_page_routes(host: Arc<SiteHost>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/products", get(handlers::products))
        .route("/products/{slug}", get(handlers::product))
        .route("/products/{slug}/order", post(handlers::order))
        .route("/gallery", get(handlers::gallery))
        .fallback(handlers::not_found)
        .with_state(host)
}

/// Health checks and the JSON order endpoint
pub fn build_api_routes(host: Arc<SiteHost>) -> Router {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/healthz", get(api::health_check))
        .route("/api/orders", post(api::create_order))
        .with_state(host)
}

/// Complete site router
///
/// Page routes sit behind the locale middleware as the fallback service, so
/// the middleware can rewrite the URI before the page router matches it.
pub fn build_site_router(host: Arc<SiteHost>, custom_routes: Vec<Router>) -> Router {
    let pages = build_page_routes(host.clone());
    let localized = axum::middleware::from_fn_with_state(host.clone(), middleware::resolve_locale)
        .layer(pages);

    let mut app = build_api_routes(host.clone());

    if let Some(dir) = &host.config.static_dir {
        app = app.nest_service("/static", ServeDir::new(dir));
    }

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    app.fallback_service(localized)
}
