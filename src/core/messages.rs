//! Message catalogs
//!
//! One JSON document per locale, nested objects addressed by dotted path
//! (`"ProductDetail.medjool.name"`). All catalogs are loaded and checked
//! when the site starts; nothing is read from disk per request.

use super::error::{ConfigError, NotFoundError, SiteError, SiteResult};
use super::locale::{Locale, LocaleRegistry};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Catalogs compiled into the binary
const EMBEDDED: [(Locale, &str); 2] = [
    (Locale::En, include_str!("../../messages/en.json")),
    (Locale::Ar, include_str!("../../messages/ar.json")),
];

/// Translated strings for one locale
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    locale: Locale,
    messages: BTreeMap<String, String>,
}

impl MessageCatalog {
    /// Parse a catalog document
    ///
    /// The root must be an object; leaves must be strings.
    pub fn from_json_str(locale: Locale, json: &str) -> Result<Self, ConfigError> {
        let root: Value = serde_json::from_str(json).map_err(|e| ConfigError::ParseError {
            file: Some(format!("{}.json", locale.code())),
            message: e.to_string(),
        })?;

        let root = match root {
            Value::Object(root) => root,
            other => {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}.json", locale.code()),
                    value: type_name(&other).to_string(),
                    message: "catalog root must be an object".to_string(),
                });
            }
        };

        let mut messages = BTreeMap::new();
        flatten(locale, "", &root, &mut messages)?;

        Ok(Self { locale, messages })
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Look up a message, `None` if the key is absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Look up a message, rendering the key itself when it is missing
    pub fn lookup(&self, key: &str) -> String {
        match self.get(key) {
            Some(message) => message.to_string(),
            None => {
                tracing::warn!(locale = %self.locale, key, "missing catalog key");
                key.to_string()
            }
        }
    }

    /// Look up a message and replace `{name}` placeholders from `args`
    ///
    /// Placeholders without a matching argument are left as written.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.lookup(key), args)
    }

    /// All dotted keys in this catalog
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Replace `{name}` placeholders in `template`
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// The loaded catalog of every enabled locale
#[derive(Debug, Clone)]
pub struct Catalogs {
    catalogs: BTreeMap<Locale, MessageCatalog>,
}

impl Catalogs {
    /// Use the catalogs compiled into the binary
    pub fn embedded(registry: &LocaleRegistry) -> Result<Self, ConfigError> {
        let mut catalogs = BTreeMap::new();
        for locale in registry.locales() {
            let (_, raw) = EMBEDDED
                .iter()
                .find(|(l, _)| l == locale)
                .ok_or_else(|| ConfigError::FileNotFound {
                    path: format!("messages/{}.json", locale.code()),
                })?;
            catalogs.insert(*locale, MessageCatalog::from_json_str(*locale, raw)?);
        }
        Ok(Self::checked(catalogs))
    }

    /// Load `<dir>/<code>.json` for every enabled locale
    ///
    /// A missing or unparsable file fails the whole load.
    pub fn load_dir(dir: impl AsRef<Path>, registry: &LocaleRegistry) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let mut catalogs = BTreeMap::new();

        for locale in registry.locales() {
            let path = dir.join(format!("{}.json", locale.code()));
            let raw = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                    path: path.display().to_string(),
                },
                _ => ConfigError::IoError {
                    message: format!("{}: {}", path.display(), e),
                },
            })?;
            let catalog =
                MessageCatalog::from_json_str(*locale, &raw).map_err(|e| match e {
                    ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                        file: Some(path.display().to_string()),
                        message,
                    },
                    other => other,
                })?;

            tracing::debug!(locale = %locale, keys = catalog.len(), path = %path.display(), "loaded catalog");
            catalogs.insert(*locale, catalog);
        }

        Ok(Self::checked(catalogs))
    }

    /// Build from already parsed catalogs, without checks
    pub fn from_catalogs(catalogs: impl IntoIterator<Item = MessageCatalog>) -> Self {
        Self {
            catalogs: catalogs.into_iter().map(|c| (c.locale(), c)).collect(),
        }
    }

    /// Catalog for a locale
    pub fn get(&self, locale: Locale) -> SiteResult<&MessageCatalog> {
        self.catalogs.get(&locale).ok_or_else(|| {
            SiteError::NotFound(NotFoundError::MissingCatalog {
                locale: locale.code().to_string(),
            })
        })
    }

    pub fn locales(&self) -> impl Iterator<Item = Locale> + '_ {
        self.catalogs.keys().copied()
    }

    /// Keys present in some catalog but missing from `locale`'s
    pub fn missing_keys(&self, locale: Locale) -> Vec<String> {
        let Some(catalog) = self.catalogs.get(&locale) else {
            return Vec::new();
        };
        let all: BTreeSet<&str> = self.catalogs.values().flat_map(|c| c.keys()).collect();
        all.into_iter()
            .filter(|key| catalog.get(key).is_none())
            .map(str::to_string)
            .collect()
    }

    fn checked(catalogs: BTreeMap<Locale, MessageCatalog>) -> Self {
        let catalogs = Self { catalogs };
        for locale in catalogs.locales() {
            let missing = catalogs.missing_keys(locale);
            if !missing.is_empty() {
                tracing::warn!(
                    locale = %locale,
                    count = missing.len(),
                    keys = ?missing,
                    "catalog is missing keys present in other locales"
                );
            }
        }
        catalogs
    }
}

fn flatten(
    locale: Locale,
    prefix: &str,
    object: &Map<String, Value>,
    out: &mut BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    for (name, value) in object {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", prefix, name)
        };

        match value {
            Value::String(message) => {
                out.insert(key, message.clone());
            }
            Value::Object(nested) => flatten(locale, &key, nested, out)?,
            other => {
                return Err(ConfigError::InvalidValue {
                    field: format!("{}:{}", locale.code(), key),
                    value: type_name(other).to_string(),
                    message: "catalog values must be strings or objects".to_string(),
                });
            }
        }
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
