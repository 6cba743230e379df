//! Page rendering with Tera
//!
//! Templates are compiled into the binary. Every template receives the
//! page locale as `lang`, its direction as `dir` and translates strings
//! through the registered `t` function:
//!
//! ```text
//! {{ t(key="Products.title", lang=lang) }}
//! {{ t(key="OrderForm.success.message", lang=lang, product=product.name) }}
//! ```
//!
//! Extra arguments to `t` are interpolated into `{name}` placeholders. A key
//! missing from the catalog renders as the key itself.

use crate::core::error::RenderError;
use crate::core::locale::{Direction, Locale, LocaleRegistry};
use crate::core::messages::{Catalogs, interpolate};
use crate::core::resolver::{prefixed_path, switch_locale_path};
use chrono::{Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tera::{Context, Tera, Value};

const TEMPLATES: [(&str, &str); 7] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("products.html", include_str!("../../templates/products.html")),
    ("product.html", include_str!("../../templates/product.html")),
    ("gallery.html", include_str!("../../templates/gallery.html")),
    ("order_success.html", include_str!("../../templates/order_success.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

/// Build the template set with the `t` function bound to `catalogs`
pub fn build_templates(catalogs: Arc<Catalogs>) -> Result<Tera, RenderError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.to_vec())
        .map_err(|e| RenderError {
            template: "<templates>".to_string(),
            message: describe(&e),
        })?;
    tera.register_function("t", Translate { catalogs });
    tera.set_escape_fn(escape_html);
    Ok(tera)
}

/// Like Tera's default escaping, but leaves `/` alone so URLs stay readable
fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(c),
        }
    }
    output
}

/// Render one template
pub fn render(tera: &Tera, template: &str, context: &Context) -> Result<String, RenderError> {
    tera.render(template, context).map_err(|e| RenderError {
        template: template.to_string(),
        message: describe(&e),
    })
}

/// Tera errors keep the useful part in the source chain
fn describe(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// The `t(key, lang, ..args)` template function
struct Translate {
    catalogs: Arc<Catalogs>,
}

impl tera::Function for Translate {
    fn call(&self, args: &HashMap<String, Value>) -> tera::Result<Value> {
        let key = args
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("t() needs a string `key` argument"))?;

        let catalog = args
            .get("lang")
            .and_then(Value::as_str)
            .and_then(Locale::from_code)
            .and_then(|locale| self.catalogs.get(locale).ok());

        let Some(catalog) = catalog else {
            return Ok(Value::String(key.to_string()));
        };

        let params: Vec<(&str, String)> = args
            .iter()
            .filter(|(name, _)| name.as_str() != "key" && name.as_str() != "lang")
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.as_str(), text)
            })
            .collect();
        let params: Vec<(&str, &str)> = params.iter().map(|(n, v)| (*n, v.as_str())).collect();

        Ok(Value::String(interpolate(&catalog.lookup(key), &params)))
    }
}

/// Entry of the language switcher
#[derive(Debug, Clone, Serialize)]
pub struct LocaleLink {
    pub code: &'static str,
    pub name: &'static str,
    pub href: String,
    pub active: bool,
}

/// Shared template context for a page in `locale`
///
/// `path` is the page path without locale prefix (`/products/siwa`).
pub fn page_context(registry: &LocaleRegistry, locale: Locale, path: &str) -> Context {
    let current = prefixed_path(locale, path);
    let switcher: Vec<LocaleLink> = registry
        .locales()
        .iter()
        .map(|other| LocaleLink {
            code: other.code(),
            name: other.native_name(),
            href: switch_locale_path(&current, locale, *other),
            active: *other == locale,
        })
        .collect();

    let mut context = Context::new();
    context.insert("lang", locale.code());
    context.insert("dir", locale.direction().as_str());
    context.insert("rtl", &(locale.direction() == Direction::Rtl));
    context.insert("base", &prefixed_path(locale, "/"));
    context.insert("current_path", &current);
    context.insert("locales", &switcher);
    context.insert("year", &Utc::now().year());
    context
}
