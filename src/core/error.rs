//! Typed error handling for the site
//!
//! Every failure a request can run into is one of these variants. Each one
//! knows its HTTP status and a stable error code, so the JSON API and the
//! HTML error page can both be derived from the same value.
//!
//! # Error Categories
//!
//! - [`NotFoundError`]: missing catalog, unknown route (including unsupported locale prefixes)
//! - [`ValidationError`]: order form field errors
//! - [`ConfigError`]: configuration and catalog loading (startup)
//! - [`RenderError`]: template rendering
//! - [`OrderIntakeError`]: failures reported by the order-intake collaborator
//!
//! # Example
//!
//! ```rust,ignore
//! use siwa_palm::prelude::*;
//!
//! match host.catalogs.get(locale) {
//!     Ok(catalog) => render(catalog),
//!     Err(SiteError::NotFound(NotFoundError::MissingCatalog { locale })) => {
//!         tracing::warn!(%locale, "no catalog");
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use crate::core::order::OrderIntakeError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type for the site
#[derive(Debug)]
pub enum SiteError {
    /// Resource not found (terminal for the request)
    NotFound(NotFoundError),

    /// Order form validation errors
    Validation(ValidationError),

    /// Configuration errors
    Config(ConfigError),

    /// Template rendering errors
    Render(RenderError),

    /// The order-intake collaborator rejected or failed the order
    OrderIntake(OrderIntakeError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for SiteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteError::NotFound(e) => write!(f, "{}", e),
            SiteError::Validation(e) => write!(f, "{}", e),
            SiteError::Config(e) => write!(f, "{}", e),
            SiteError::Render(e) => write!(f, "{}", e),
            SiteError::OrderIntake(e) => write!(f, "{}", e),
            SiteError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for SiteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SiteError::NotFound(e) => Some(e),
            SiteError::Validation(e) => Some(e),
            SiteError::Config(e) => Some(e),
            SiteError::Render(e) => Some(e),
            SiteError::OrderIntake(e) => Some(e),
            SiteError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SiteError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            SiteError::NotFound(_) => StatusCode::NOT_FOUND,
            SiteError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SiteError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiteError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SiteError::OrderIntake(_) => StatusCode::BAD_GATEWAY,
            SiteError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SiteError::NotFound(e) => e.error_code(),
            SiteError::Validation(_) => "VALIDATION_ERROR",
            SiteError::Config(_) => "CONFIG_ERROR",
            SiteError::Render(_) => "RENDER_ERROR",
            SiteError::OrderIntake(_) => "ORDER_INTAKE_FAILED",
            SiteError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            SiteError::NotFound(NotFoundError::MissingCatalog { locale }) => {
                Some(serde_json::json!({ "locale": locale }))
            }
            SiteError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for SiteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Not Found Errors
// =============================================================================

/// Errors that end a request with a not-found page
#[derive(Debug)]
pub enum NotFoundError {
    /// Locale is registered but has no catalog loaded
    MissingCatalog { locale: String },

    /// No page lives at this path
    UnknownRoute { path: String },
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundError::MissingCatalog { locale } => {
                write!(f, "No message catalog loaded for locale '{}'", locale)
            }
            NotFoundError::UnknownRoute { path } => write!(f, "No page at '{}'", path),
        }
    }
}

impl std::error::Error for NotFoundError {}

impl NotFoundError {
    pub fn error_code(&self) -> &'static str {
        match self {
            NotFoundError::MissingCatalog { .. } => "CATALOG_NOT_FOUND",
            NotFoundError::UnknownRoute { .. } => "NOT_FOUND",
        }
    }
}

impl From<NotFoundError> for SiteError {
    fn from(err: NotFoundError) -> Self {
        SiteError::NotFound(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse a configuration or catalog file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration or catalog file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "File not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for SiteError {
    fn from(err: ConfigError) -> Self {
        SiteError::Config(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// One or more form fields failed validation
    FieldErrors(Vec<FieldValidationError>),

    /// Request body could not be decoded
    InvalidBody { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for SiteError {
    fn from(err: ValidationError) -> Self {
        SiteError::Validation(err)
    }
}

// =============================================================================
// Render Errors
// =============================================================================

/// Template rendering failure
#[derive(Debug)]
pub struct RenderError {
    pub template: String,
    pub message: String,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to render '{}': {}", self.template, self.message)
    }
}

impl std::error::Error for RenderError {}

impl From<RenderError> for SiteError {
    fn from(err: RenderError) -> Self {
        SiteError::Render(err)
    }
}

impl From<OrderIntakeError> for SiteError {
    fn from(err: OrderIntakeError) -> Self {
        SiteError::OrderIntake(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<std::io::Error> for SiteError {
    fn from(err: std::io::Error) -> Self {
        SiteError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for SiteError {
    fn from(err: serde_yaml::Error) -> Self {
        SiteError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for SiteError {
    fn from(err: anyhow::Error) -> Self {
        SiteError::Internal(err.to_string())
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for site operations
pub type SiteResult<T> = Result<T, SiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status_code() {
        let err: SiteError = NotFoundError::UnknownRoute {
            path: "/fr/products".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_missing_catalog_details() {
        let err: SiteError = NotFoundError::MissingCatalog {
            locale: "ar".to_string(),
        }
        .into();
        let response = err.to_response();
        assert_eq!(response.code, "CATALOG_NOT_FOUND");
        assert_eq!(response.details.unwrap()["locale"], "ar");
    }

    #[test]
    fn test_validation_error_multiple_fields() {
        let err = ValidationError::FieldErrors(vec![
            FieldValidationError {
                field: "name".to_string(),
                message: "required".to_string(),
            },
            FieldValidationError {
                field: "phone".to_string(),
                message: "invalid format".to_string(),
            },
        ]);
        let display = err.to_string();
        assert!(display.contains("name"));
        assert!(display.contains("phone"));

        let site_err: SiteError = err.into();
        assert_eq!(site_err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(site_err.to_response().details.is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::FileNotFound {
            path: "messages/ar.json".to_string(),
        };
        assert!(err.to_string().contains("messages/ar.json"));

        let err = ConfigError::ParseError {
            file: Some("site.yaml".to_string()),
            message: "bad indent".to_string(),
        };
        assert!(err.to_string().contains("site.yaml"));
    }

    #[test]
    fn test_order_intake_maps_to_bad_gateway() {
        let err: SiteError = OrderIntakeError::Unavailable {
            message: "smtp down".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.error_code(), "ORDER_INTAKE_FAILED");
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yaml::from_str::<u32>("[not, a, number]").unwrap_err();
        let err: SiteError = yaml_err.into();
        assert!(matches!(err, SiteError::Config(ConfigError::ParseError { .. })));
    }
}
