//! # Siwa Palm
//!
//! Site server for a date-exporting company, in English and Arabic.
//!
//! ## Features
//!
//! - **Locale Routing**: `/en/...` and `/ar/...` prefixes, default locale
//!   reachable without a prefix, cookie and `Accept-Language` negotiation
//! - **Right-to-Left Layout**: Arabic pages render with `dir="rtl"`
//! - **Message Catalogs**: one JSON catalog per locale, checked at startup
//! - **Product Catalog**: three date varieties with search
//! - **Gallery**: nine photos filtered by category
//! - **Order Form**: field validation and a pluggable order intake
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use siwa_palm::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     SiteBuilder::new()
//!         .with_config(SiteConfig::from_yaml_file("config/site.yaml")?)
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        content::{
            Carousel, GalleryCategory, GalleryImage, LocalizedProduct, Product, UnknownSelection,
            search_products, select_gallery_images, select_product,
        },
        error::{
            ConfigError, ErrorResponse, FieldValidationError, NotFoundError, RenderError,
            SiteError, SiteResult, ValidationError,
        },
        locale::{Direction, Locale, LocaleRegistry},
        messages::{Catalogs, MessageCatalog},
        order::{
            FieldErrors, FormState, LoggingOrderIntake, OrderField, OrderFields, OrderIntake,
            OrderIntakeError, OrderReceipt, OrderRequest, OrderSession, validate,
        },
        resolver::{
            LOCALE_COOKIE, LocaleResolver, Preference, PrefixPolicy, Resolution, prefixed_path,
            switch_locale_path,
        },
    };

    // === Config ===
    pub use crate::config::{LocaleConfig, SiteConfig};

    // === Server ===
    pub use crate::server::{RequestLocale, SiteBuilder, SiteHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
