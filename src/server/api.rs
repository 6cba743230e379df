//! JSON endpoints: health checks and order intake
//!
//! These routes sit outside locale resolution. Error messages in order
//! responses are translated into the locale negotiated from the request.

use super::host::SiteHost;
use super::middleware::cookie_value;
use crate::core::content::select_product;
use crate::core::error::{SiteError, ValidationError};
use crate::core::order::{FormState, OrderField, OrderFields, OrderSession, validate};
use crate::core::resolver::{LOCALE_COOKIE, Preference};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{Number, Value, json};
use std::sync::Arc;

/// Body of `POST /api/orders`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderPayload {
    pub name: String,
    pub company: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub amount: Option<AmountValue>,
    /// Product slug (`medjool`, `siwa`, `mazaq`)
    pub product: String,
}

/// `amount` as a JSON number or as text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountValue {
    Number(Number),
    Text(String),
}

impl OrderPayload {
    /// Form fields for an order of `product_name`
    fn into_fields(self, product_name: String) -> OrderFields {
        let amount = match self.amount {
            Some(AmountValue::Number(n)) => n.to_string(),
            Some(AmountValue::Text(text)) => text,
            None => String::new(),
        };
        OrderFields {
            name: self.name,
            company: self.company,
            location: self.location,
            email: self.email,
            phone: self.phone,
            amount,
            product_name,
        }
    }
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "siwa-palm"
    }))
}

/// `POST /api/orders`
///
/// 201 with the receipt, 422 with per-field errors, 502 when the order
/// intake fails.
pub async fn create_order(
    State(host): State<Arc<SiteHost>>,
    headers: HeaderMap,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Result<Response, SiteError> {
    let Json(payload) = payload.map_err(|e| ValidationError::InvalidBody {
        message: e.body_text(),
    })?;

    let cookie = cookie_value(&headers, LOCALE_COOKIE);
    let locale = host.resolver.negotiate(Preference {
        cookie: cookie.as_deref(),
        accept_language: headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()),
    });
    let catalog = host.catalog(locale)?;

    let product = select_product(payload.product.trim())
        .ok()
        .map(|product| product.localize(catalog));
    let product_name = product.as_ref().map(|p| p.name.clone()).unwrap_or_default();
    let fields = payload.into_fields(product_name.clone());

    let Some(product) = product else {
        let mut errors = validate(&fields);
        errors.insert(OrderField::Product, "OrderForm.errors.productUnknown");
        tracing::debug!(%locale, errors = errors.len(), "order names no known product");
        return Err(errors.into_validation_error(|key| catalog.lookup(key)).into());
    };

    let mut session = OrderSession::new(product_name.clone(), 1);
    session.fill(fields);
    session.submit(host.intake.as_ref()).await;

    match session.state() {
        FormState::Success { receipt } => Ok((
            StatusCode::CREATED,
            Json(json!({
                "state": "success",
                "reference": receipt.reference,
                "received_at": receipt.received_at,
                "product": product.slug,
                "product_name": product_name,
                "amount": session.quantity(),
            })),
        )
            .into_response()),
        FormState::Failed { error } => Err(error.clone().into()),
        FormState::Idle | FormState::Submitting => Err(session
            .errors()
            .clone()
            .into_validation_error(|key| catalog.lookup(key))
            .into()),
    }
}
