//! Supported locales and the registry that orders them
//!
//! The set of locales is closed: the site ships English and Arabic only.
//! Which of the two is the default is a configuration concern, see
//! [`LocaleRegistry::new`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Text and layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    /// Value for the HTML `dir` attribute
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

/// A supported locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ar,
}

impl Locale {
    /// Every locale the site knows about, in registry order
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];

    /// Locale code as used in URL prefixes and catalog file names
    pub const fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    /// Layout direction; Arabic is the only right-to-left locale
    pub const fn direction(self) -> Direction {
        match self {
            Locale::Ar => Direction::Rtl,
            Locale::En => Direction::Ltr,
        }
    }

    /// Name of the locale written in itself, for the language switcher
    pub const fn native_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Ar => "العربية",
        }
    }

    /// Match a locale code exactly (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.code().eq_ignore_ascii_case(code))
    }

    /// Match a BCP 47 language tag on its primary subtag (`ar-EG` → `ar`)
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next().unwrap_or(tag).trim();
        Self::from_code(primary)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| format!("unsupported locale '{}'", s))
    }
}

/// Ordered set of enabled locales with exactly one default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    default: Locale,
}

impl LocaleRegistry {
    /// Build a registry
    ///
    /// Duplicates are dropped (first occurrence wins). Returns `None` if the
    /// list is empty or the default is not part of it.
    pub fn new(locales: impl IntoIterator<Item = Locale>, default: Locale) -> Option<Self> {
        let mut ordered = Vec::new();
        for locale in locales {
            if !ordered.contains(&locale) {
                ordered.push(locale);
            }
        }

        if !ordered.contains(&default) {
            return None;
        }

        Some(Self {
            locales: ordered,
            default,
        })
    }

    /// The default locale
    pub fn default_locale(&self) -> Locale {
        self.default
    }

    /// Enabled locales in registry order
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn contains(&self, locale: Locale) -> bool {
        self.locales.contains(&locale)
    }

    /// Find an enabled locale by its exact code
    pub fn find(&self, code: &str) -> Option<Locale> {
        Locale::from_code(code).filter(|locale| self.contains(*locale))
    }

    pub fn is_default(&self, locale: Locale) -> bool {
        self.default == locale
    }
}

impl Default for LocaleRegistry {
    /// English and Arabic, English by default
    fn default() -> Self {
        Self {
            locales: Locale::ALL.to_vec(),
            default: Locale::En,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arabic_is_the_only_rtl_locale() {
        assert_eq!(Locale::Ar.direction(), Direction::Rtl);
        assert_eq!(Locale::En.direction(), Direction::Ltr);
        assert_eq!(Locale::Ar.direction().as_str(), "rtl");
    }

    #[test]
    fn test_from_code_is_exact() {
        assert_eq!(Locale::from_code("ar"), Some(Locale::Ar));
        assert_eq!(Locale::from_code("EN"), Some(Locale::En));
        assert_eq!(Locale::from_code("ar-EG"), None);
        assert_eq!(Locale::from_code("fr"), None);
    }

    #[test]
    fn test_from_tag_uses_primary_subtag() {
        assert_eq!(Locale::from_tag("ar-EG"), Some(Locale::Ar));
        assert_eq!(Locale::from_tag("en_US"), Some(Locale::En));
        assert_eq!(Locale::from_tag("de-DE"), None);
    }

    #[test]
    fn test_registry_requires_default_member() {
        assert!(LocaleRegistry::new([Locale::En], Locale::Ar).is_none());
        assert!(LocaleRegistry::new([], Locale::En).is_none());
    }

    #[test]
    fn test_registry_drops_duplicates() {
        let registry =
            LocaleRegistry::new([Locale::Ar, Locale::En, Locale::Ar], Locale::Ar).unwrap();
        assert_eq!(registry.locales(), &[Locale::Ar, Locale::En]);
        assert!(registry.is_default(Locale::Ar));
        assert!(!registry.is_default(Locale::En));
    }

    #[test]
    fn test_registry_find_ignores_disabled_locales() {
        let registry = LocaleRegistry::new([Locale::En], Locale::En).unwrap();
        assert_eq!(registry.find("en"), Some(Locale::En));
        assert_eq!(registry.find("ar"), None);
    }
}
