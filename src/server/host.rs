//! Server host holding all site state
//!
//! A `SiteHost` is built once at startup and shared by every handler behind
//! an `Arc`. Nothing in it changes while the server runs.

use super::render::{self, build_templates, page_context};
use crate::config::SiteConfig;
use crate::core::error::{ConfigError, SiteError, SiteResult};
use crate::core::locale::{Locale, LocaleRegistry};
use crate::core::messages::{Catalogs, MessageCatalog};
use crate::core::order::OrderIntake;
use crate::core::resolver::LocaleResolver;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::sync::Arc;
use tera::{Context, Tera};

/// Host context containing all site state
pub struct SiteHost {
    /// Configuration the host was built from
    pub config: Arc<SiteConfig>,

    /// Locale resolution for incoming paths
    pub resolver: LocaleResolver,

    /// Message catalog of every enabled locale
    pub catalogs: Arc<Catalogs>,

    /// Compiled page templates
    pub templates: Tera,

    /// Where validated orders are sent
    pub intake: Arc<dyn OrderIntake>,
}

impl SiteHost {
    /// Build the host from builder components
    ///
    /// Fails if any enabled locale has no catalog, so a broken deployment is
    /// caught before it serves traffic.
    pub fn from_builder_components(
        config: SiteConfig,
        catalogs: Catalogs,
        intake: Arc<dyn OrderIntake>,
    ) -> SiteResult<Self> {
        let registry = config.registry()?;
        for locale in registry.locales() {
            catalogs.get(*locale).map_err(|_| {
                SiteError::Config(ConfigError::FileNotFound {
                    path: format!("{}.json", locale.code()),
                })
            })?;
        }

        let resolver = LocaleResolver::new(registry, config.locales.prefix);
        let catalogs = Arc::new(catalogs);
        let templates = build_templates(catalogs.clone())?;

        Ok(Self {
            config: Arc::new(config),
            resolver,
            catalogs,
            templates,
            intake,
        })
    }

    pub fn registry(&self) -> &LocaleRegistry {
        self.resolver.registry()
    }

    /// Catalog for `locale`
    pub fn catalog(&self, locale: Locale) -> SiteResult<&MessageCatalog> {
        self.catalogs.get(locale)
    }

    /// Base template context for a page at `path` in `locale`
    pub fn context(&self, locale: Locale, path: &str) -> Context {
        page_context(self.registry(), locale, path)
    }

    /// Render a page, falling back to the error page on failure
    pub fn page(&self, locale: Locale, template: &str, context: &Context) -> Response {
        self.page_with_status(locale, StatusCode::OK, template, context)
    }

    /// Render a page with an explicit status
    pub fn page_with_status(
        &self,
        locale: Locale,
        status: StatusCode,
        template: &str,
        context: &Context,
    ) -> Response {
        if let Err(e) = self.catalog(locale) {
            return self.error_page(locale, &e);
        }
        match render::render(&self.templates, template, context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => self.error_page(locale, &e.into()),
        }
    }

    /// Localized error page for `error`
    ///
    /// Uses the default locale if `locale` itself has no catalog, and plain
    /// text if rendering is impossible altogether.
    pub fn error_page(&self, locale: Locale, error: &SiteError) -> Response {
        let status = error.status_code();
        if status.is_server_error() {
            tracing::error!(%locale, error = %error, "request failed");
        } else {
            tracing::debug!(%locale, error = %error, "request failed");
        }

        let locale = if self.catalog(locale).is_ok() {
            locale
        } else {
            self.registry().default_locale()
        };

        let mut context = self.context(locale, "/");
        context.insert("status", &status.as_u16());
        context.insert("code", error.error_code());
        context.insert("not_found", &(status == StatusCode::NOT_FOUND));

        match render::render(&self.templates, "error.html", &context) {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "error page failed to render");
                (status, error.to_string()).into_response()
            }
        }
    }
}
