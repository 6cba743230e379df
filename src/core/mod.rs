//! Core module: locales, catalogs, content and orders

pub mod content;
pub mod error;
pub mod locale;
pub mod messages;
pub mod order;
pub mod resolver;

pub use content::{GalleryCategory, GalleryImage, LocalizedProduct, Product, UnknownSelection};
pub use error::{SiteError, SiteResult};
pub use locale::{Direction, Locale, LocaleRegistry};
pub use messages::{Catalogs, MessageCatalog};
pub use order::{FormState, OrderIntake, OrderRequest, OrderSession};
pub use resolver::{LocaleResolver, PrefixPolicy, Resolution};
