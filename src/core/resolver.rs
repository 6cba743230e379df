//! Locale resolution for incoming request paths
//!
//! Resolution never fails: a path either passes through untouched (assets,
//! health checks, the JSON API), is served under an explicit or default
//! locale, or is redirected to an explicit locale prefix.

use super::locale::{Locale, LocaleRegistry};
use serde::{Deserialize, Serialize};

/// Cookie remembering the visitor's last explicit locale
pub const LOCALE_COOKIE: &str = "NEXT_LOCALE";

/// Path prefixes that are never localized
const PASSTHROUGH_PREFIXES: [&str; 4] = ["/static", "/api", "/health", "/healthz"];

/// Whether the default locale is reachable without a `/<code>` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrefixPolicy {
    /// Unprefixed paths are served at the default locale, never redirected
    #[default]
    AsNeeded,
    /// Every page needs a prefix; unprefixed paths redirect to the negotiated locale
    Always,
}

/// Outcome of resolving a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Not a page path; hand it to the router unchanged
    PassThrough,
    /// Serve `path` (prefix stripped, always starts with `/`) in `locale`
    Serve {
        locale: Locale,
        path: String,
        prefixed: bool,
    },
    /// Send the client to `location`
    Redirect { locale: Locale, location: String },
}

impl Resolution {
    /// Locale the request ends up in, if it is a page request
    pub fn locale(&self) -> Option<Locale> {
        match self {
            Resolution::PassThrough => None,
            Resolution::Serve { locale, .. } | Resolution::Redirect { locale, .. } => {
                Some(*locale)
            }
        }
    }
}

/// Preference signals carried by the request
#[derive(Debug, Clone, Copy, Default)]
pub struct Preference<'a> {
    /// Value of the [`LOCALE_COOKIE`] cookie
    pub cookie: Option<&'a str>,
    /// Raw `Accept-Language` header
    pub accept_language: Option<&'a str>,
}

/// Resolves request paths against a locale registry
#[derive(Debug, Clone)]
pub struct LocaleResolver {
    registry: LocaleRegistry,
    policy: PrefixPolicy,
}

impl LocaleResolver {
    pub fn new(registry: LocaleRegistry, policy: PrefixPolicy) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    pub fn policy(&self) -> PrefixPolicy {
        self.policy
    }

    /// Resolve a request path
    pub fn resolve(&self, path: &str, preference: Preference<'_>) -> Resolution {
        if is_passthrough(path) {
            return Resolution::PassThrough;
        }

        if let Some((locale, rest)) = self.split_prefix(path) {
            return Resolution::Serve {
                locale,
                path: rest.to_string(),
                prefixed: true,
            };
        }

        let path = if path.is_empty() { "/" } else { path };

        match self.policy {
            PrefixPolicy::AsNeeded => Resolution::Serve {
                locale: self.registry.default_locale(),
                path: path.to_string(),
                prefixed: false,
            },
            PrefixPolicy::Always => {
                let locale = self.negotiate(preference);
                Resolution::Redirect {
                    locale,
                    location: prefixed_path(locale, path),
                }
            }
        }
    }

    /// Pick a locale from the preference signals, falling back to the default
    ///
    /// The cookie wins over `Accept-Language`.
    pub fn negotiate(&self, preference: Preference<'_>) -> Locale {
        preference
            .cookie
            .and_then(|code| self.registry.find(code.trim()))
            .or_else(|| {
                preference
                    .accept_language
                    .and_then(|header| self.parse_accept_language(header))
            })
            .unwrap_or(self.registry.default_locale())
    }

    /// First enabled locale in an `Accept-Language` header, by q-weight
    pub fn parse_accept_language(&self, header: &str) -> Option<Locale> {
        let mut candidates: Vec<(f32, usize, Locale)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.trim().split(';');
                let tag = parts.next()?.trim();
                let quality = parts
                    .find_map(|param| param.trim().strip_prefix("q="))
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                let locale = Locale::from_tag(tag).filter(|l| self.registry.contains(*l))?;
                (quality > 0.0).then_some((quality, position, locale))
            })
            .collect();

        candidates.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        candidates.first().map(|(_, _, locale)| *locale)
    }

    /// Split a leading `/<code>` segment off the path
    fn split_prefix<'p>(&self, path: &'p str) -> Option<(Locale, &'p str)> {
        let trimmed = path.strip_prefix('/')?;
        let (segment, rest) = match trimmed.find('/') {
            Some(index) => (&trimmed[..index], &trimmed[index..]),
            None => (trimmed, "/"),
        };
        let locale = self.registry.find(segment)?;
        // `/EN/...` is not a prefix: codes match exactly
        if segment != locale.code() {
            return None;
        }
        Some((locale, rest))
    }
}

/// `/<code><path>`, without a trailing slash for the root
pub fn prefixed_path(locale: Locale, path: &str) -> String {
    if path.is_empty() || path == "/" {
        format!("/{}", locale.code())
    } else {
        format!("/{}{}", locale.code(), path)
    }
}

/// Link target for the language switcher
///
/// Replaces the leading `/<from>` segment with `/<to>`; a path without that
/// prefix gets `/<to>` prepended.
pub fn switch_locale_path(path: &str, from: Locale, to: Locale) -> String {
    let prefix = format!("/{}", from.code());
    match path.strip_prefix(&prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => prefixed_path(to, rest),
        _ => prefixed_path(to, path),
    }
}

fn is_passthrough(path: &str) -> bool {
    let is_internal = PASSTHROUGH_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    });

    // Anything that looks like a file (`/favicon.ico`)
    let is_file = path
        .rsplit('/')
        .next()
        .is_some_and(|segment| segment.contains('.'));

    is_internal || is_file
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(policy: PrefixPolicy) -> LocaleResolver {
        LocaleResolver::new(LocaleRegistry::default(), policy)
    }

    #[test]
    fn test_prefixed_path_resolves_to_prefix_locale() {
        let resolver = resolver(PrefixPolicy::AsNeeded);
        for locale in Locale::ALL {
            let path = format!("/{}/products/siwa", locale.code());
            assert_eq!(
                resolver.resolve(&path, Preference::default()),
                Resolution::Serve {
                    locale,
                    path: "/products/siwa".to_string(),
                    prefixed: true,
                }
            );
        }
    }

    #[test]
    fn test_bare_prefix_maps_to_root() {
        let resolution = resolver(PrefixPolicy::AsNeeded).resolve("/ar", Preference::default());
        assert_eq!(
            resolution,
            Resolution::Serve {
                locale: Locale::Ar,
                path: "/".to_string(),
                prefixed: true,
            }
        );
    }

    #[test]
    fn test_unprefixed_path_serves_default_locale() {
        let resolver = resolver(PrefixPolicy::AsNeeded);
        let preference = Preference {
            cookie: Some("ar"),
            accept_language: Some("ar-EG"),
        };
        for path in ["/", "", "/products", "/fr/products", "/english"] {
            assert_eq!(resolver.resolve(path, preference).locale(), Some(Locale::En));
        }
    }

    #[test]
    fn test_uppercase_code_is_not_a_prefix() {
        let resolution = resolver(PrefixPolicy::AsNeeded).resolve("/AR/gallery", Preference::default());
        assert_eq!(
            resolution,
            Resolution::Serve {
                locale: Locale::En,
                path: "/AR/gallery".to_string(),
                prefixed: false,
            }
        );
    }

    #[test]
    fn test_always_policy_redirects_to_negotiated_locale() {
        let resolver = resolver(PrefixPolicy::Always);
        let resolution = resolver.resolve(
            "/gallery",
            Preference {
                cookie: None,
                accept_language: Some("fr-FR,ar;q=0.8,en;q=0.5"),
            },
        );
        assert_eq!(
            resolution,
            Resolution::Redirect {
                locale: Locale::Ar,
                location: "/ar/gallery".to_string(),
            }
        );

        let root = resolver.resolve("/", Preference::default());
        assert_eq!(
            root,
            Resolution::Redirect {
                locale: Locale::En,
                location: "/en".to_string(),
            }
        );
    }

    #[test]
    fn test_cookie_wins_over_accept_language() {
        let resolver = resolver(PrefixPolicy::Always);
        let locale = resolver.negotiate(Preference {
            cookie: Some("ar"),
            accept_language: Some("en-US"),
        });
        assert_eq!(locale, Locale::Ar);
    }

    #[test]
    fn test_unknown_preference_falls_back_to_default() {
        let registry = LocaleRegistry::new(Locale::ALL, Locale::Ar).unwrap();
        let resolver = LocaleResolver::new(registry, PrefixPolicy::Always);
        let locale = resolver.negotiate(Preference {
            cookie: Some("de"),
            accept_language: Some("fr, de;q=0.9"),
        });
        assert_eq!(locale, Locale::Ar);
    }

    #[test]
    fn test_accept_language_respects_quality() {
        let resolver = resolver(PrefixPolicy::Always);
        assert_eq!(
            resolver.parse_accept_language("en;q=0.2, ar;q=0.9"),
            Some(Locale::Ar)
        );
        assert_eq!(resolver.parse_accept_language("ar;q=0, en"), Some(Locale::En));
        assert_eq!(resolver.parse_accept_language(""), None);
    }

    #[test]
    fn test_assets_and_internal_paths_pass_through() {
        let resolver = resolver(PrefixPolicy::Always);
        for path in [
            "/static/logo.png",
            "/favicon.ico",
            "/en/placeholder.svg",
            "/api/orders",
            "/health",
            "/healthz",
        ] {
            assert_eq!(resolver.resolve(path, Preference::default()), Resolution::PassThrough);
        }
        // Prefix match is per segment
        assert_ne!(
            resolver.resolve("/apiary", Preference::default()),
            Resolution::PassThrough
        );
    }

    #[test]
    fn test_switch_locale_path() {
        assert_eq!(
            switch_locale_path("/en/products/siwa", Locale::En, Locale::Ar),
            "/ar/products/siwa"
        );
        assert_eq!(switch_locale_path("/ar", Locale::Ar, Locale::En), "/en");
        assert_eq!(switch_locale_path("/gallery", Locale::En, Locale::Ar), "/ar/gallery");
        assert_eq!(switch_locale_path("/english", Locale::En, Locale::Ar), "/ar/english");
    }
}
