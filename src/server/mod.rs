//! Server module for the site
//!
//! `SiteBuilder` assembles configuration, catalogs, templates and the order
//! intake into a `SiteHost`, and exposes it as an axum `Router`:
//! - localized HTML pages behind the locale resolution middleware
//! - health checks and the JSON order endpoint
//! - static assets under `/static`

pub mod api;
pub mod builder;
pub mod handlers;
pub mod host;
pub mod middleware;
pub mod render;
pub mod router;

pub use builder::SiteBuilder;
pub use host::SiteHost;
pub use middleware::RequestLocale;
