//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses are properly formatted
//! - Broken deployments fail at build time, not on the first request

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_test::TestServer;
use siwa_palm::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_unknown_route_returns_404() {
        let err = SiteError::NotFound(NotFoundError::UnknownRoute {
            path: "/fr/products".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_missing_catalog_returns_404() {
        let err: SiteError = NotFoundError::MissingCatalog {
            locale: "ar".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), "CATALOG_NOT_FOUND");
    }

    #[test]
    fn test_validation_error_returns_422() {
        let err: SiteError = ValidationError::InvalidBody {
            message: "expected value".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_order_intake_error_returns_502() {
        let err: SiteError = OrderIntakeError::Rejected {
            reason: "duplicate order".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().contains("duplicate order"));
    }

    #[test]
    fn test_render_error_returns_500() {
        let err: SiteError = RenderError {
            template: "home.html".to_string(),
            message: "Variable `products` not found".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "RENDER_ERROR");
    }
}

// =============================================================================
// Error Response Format Tests
// =============================================================================

mod response_format_tests {
    use super::*;

    #[test]
    fn test_field_errors_are_listed_in_details() {
        let err: SiteError = ValidationError::FieldErrors(vec![FieldValidationError {
            field: "phone".to_string(),
            message: "Phone number is required".to_string(),
        }])
        .into();

        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.expect("details");
        assert_eq!(details["fields"][0]["field"], "phone");
        assert_eq!(details["fields"][0]["message"], "Phone number is required");
    }

    #[test]
    fn test_into_response_sets_status() {
        let err = SiteError::Internal("boom".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_field_errors_translate_through_catalog() {
        let fields = OrderFields {
            name: "Ahmed".to_string(),
            company: "Nile Imports".to_string(),
            location: "Cairo".to_string(),
            phone: "12345".to_string(),
            amount: "3".to_string(),
            ..Default::default()
        };
        let catalogs = Catalogs::embedded(&LocaleRegistry::default()).unwrap();
        let catalog = catalogs.get(Locale::Ar).unwrap();

        let err = validate(&fields).into_validation_error(|key| catalog.lookup(key));
        match err {
            ValidationError::FieldErrors(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "phone");
                assert!(errors[0].message.contains("+20"));
            }
            other => panic!("unexpected error {other}"),
        }
    }
}

// =============================================================================
// Startup Failure Tests
// =============================================================================

mod startup_tests {
    use super::*;

    #[test]
    fn test_default_locale_must_be_enabled() {
        let config = SiteConfig::from_yaml_str(
            r#"
locales:
  enabled: [ar]
  default: en
"#,
        )
        .unwrap();

        let result = SiteBuilder::new().with_config(config).build();
        let err = result.err().expect("build should fail");
        assert!(err.to_string().contains("locales.default"));
    }

    #[test]
    fn test_broken_catalog_file_fails_build() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("en.json"), r#"{"Home": {"#).unwrap();
        std::fs::write(dir.path().join("ar.json"), "{}").unwrap();

        let mut config = SiteConfig::default_config();
        config.messages_dir = Some(dir.path().to_path_buf());

        let err = SiteBuilder::new()
            .with_config(config)
            .build()
            .err()
            .expect("build should fail");
        assert!(err.to_string().contains("en.json"));
    }

    #[tokio::test]
    async fn test_catalog_dir_replaces_builtin_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("en.json"),
            r#"{"Errors": {"notFound": {"title": "Lost in the oasis"}}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("ar.json"), "{}").unwrap();

        let mut config = SiteConfig::default_config();
        config.messages_dir = Some(dir.path().to_path_buf());
        let app = SiteBuilder::new()
            .with_config(config)
            .build()
            .expect("Failed to build app");
        let server = TestServer::new(app).expect("Failed to create test server");

        let response = server.get("/en/nowhere").await;
        response.assert_status(StatusCode::NOT_FOUND);

        let html = response.text();
        assert!(html.contains("Lost in the oasis"));
        // Keys missing from the catalog render as the key
        assert!(html.contains("Errors.backToHome"));
    }

    #[tokio::test]
    async fn test_static_files_pass_through_locale_routing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("site.css"), "body { margin: 0 }").unwrap();

        let mut config = SiteConfig::default_config();
        config.static_dir = Some(dir.path().to_path_buf());
        let app = SiteBuilder::new()
            .with_config(config)
            .build()
            .expect("Failed to build app");
        let server = TestServer::new(app).expect("Failed to create test server");

        let response = server.get("/static/site.css").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "body { margin: 0 }");

        let missing = server.get("/favicon.ico").await;
        missing.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_api_route_is_not_localized() {
        let app = SiteBuilder::new().build().expect("Failed to build app");
        let server = TestServer::new(app).expect("Failed to create test server");

        let response = server.get("/api/unknown").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.headers().get("set-cookie").is_none());
    }
}
