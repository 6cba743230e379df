//! Locale resolution middleware
//!
//! Runs before page routing. Strips the locale prefix from the URI so the
//! page router only sees locale-free paths, and records the resolved locale
//! as a [`RequestLocale`] request extension.

use super::host::SiteHost;
use crate::core::error::SiteError;
use crate::core::locale::Locale;
use crate::core::resolver::{LOCALE_COOKIE, Preference, Resolution};
use axum::extract::{Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;

/// Locale a page request resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLocale {
    pub locale: Locale,
    /// Whether the URL carried an explicit `/<code>` prefix
    pub prefixed: bool,
    /// Page path with the prefix removed
    pub path: String,
}

pub async fn resolve_locale(
    State(host): State<Arc<SiteHost>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let resolution = {
        let headers = req.headers();
        let cookie = cookie_value(headers, LOCALE_COOKIE);
        let preference = Preference {
            cookie: cookie.as_deref(),
            accept_language: headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()),
        };
        host.resolver.resolve(&path, preference)
    };

    match resolution {
        Resolution::PassThrough => next.run(req).await,

        Resolution::Redirect { locale, location } => {
            let location = match req.uri().query() {
                Some(query) => format!("{}?{}", location, query),
                None => location,
            };
            tracing::debug!(%locale, from = %path, to = %location, "redirecting to locale prefix");
            Redirect::temporary(&location).into_response()
        }

        Resolution::Serve {
            locale,
            path: stripped,
            prefixed,
        } => {
            if prefixed {
                let target = match req.uri().query() {
                    Some(query) => format!("{}?{}", stripped, query),
                    None => stripped.clone(),
                };
                match target.parse::<Uri>() {
                    Ok(uri) => *req.uri_mut() = uri,
                    Err(e) => {
                        let err = SiteError::Internal(format!("rewriting '{}': {}", path, e));
                        return host.error_page(locale, &err);
                    }
                }
            }

            req.extensions_mut().insert(RequestLocale {
                locale,
                prefixed,
                path: stripped,
            });

            let mut response = next.run(req).await;
            if prefixed {
                remember_locale(&mut response, locale);
            }
            response
        }
    }
}

/// Set the locale cookie so later unprefixed visits can negotiate it
fn remember_locale(response: &mut Response, locale: Locale) {
    let cookie = format!("{}={}; Path=/; SameSite=Lax", LOCALE_COOKIE, locale.code());
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}

/// Value of cookie `name` across all `Cookie` headers
pub(super) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
}
