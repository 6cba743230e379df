//! Order form: validation, submission state and the order-intake seam
//!
//! An [`OrderSession`] lives for one interaction with the order form. It
//! validates the raw fields, hands a clean [`OrderRequest`] to an
//! [`OrderIntake`] and records every state it passes through.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;
use uuid::Uuid;

use super::error::{FieldValidationError, ValidationError};

/// `+20` followed by exactly ten digits
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+20\d{10}$").expect("phone pattern is valid"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Fields of the order form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderField {
    Name,
    Company,
    Location,
    Email,
    Phone,
    Amount,
    /// Only reported by the JSON endpoint, where the product is named in the body
    Product,
}

impl OrderField {
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderField::Name => "name",
            OrderField::Company => "company",
            OrderField::Location => "location",
            OrderField::Email => "email",
            OrderField::Phone => "phone",
            OrderField::Amount => "amount",
            OrderField::Product => "product",
        }
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field errors keyed by field; values are `OrderForm.errors.*` catalog keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<OrderField, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: OrderField) -> bool {
        self.0.contains_key(&field)
    }

    /// Catalog key of the error on `field`
    pub fn get(&self, field: OrderField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OrderField, &'static str)> + '_ {
        self.0.iter().map(|(field, key)| (*field, *key))
    }

    pub(crate) fn insert(&mut self, field: OrderField, key: &'static str) {
        self.0.insert(field, key);
    }

    /// Convert into a typed validation error, translating keys with `translate`
    pub fn into_validation_error(self, translate: impl Fn(&str) -> String) -> ValidationError {
        ValidationError::FieldErrors(
            self.iter()
                .map(|(field, key)| FieldValidationError {
                    field: field.to_string(),
                    message: translate(key),
                })
                .collect(),
        )
    }
}

/// Raw order form input, as typed by the visitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderFields {
    pub name: String,
    pub company: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    /// Kept as text so a non-numeric entry reports a field error
    pub amount: String,
    pub product_name: String,
}

/// Check the form fields
///
/// Required: name, company, location, phone. Phone must be `+20` plus ten
/// digits, email (when given) must look like an address, amount must be an
/// integer of at least 1.
pub fn validate(fields: &OrderFields) -> FieldErrors {
    check(fields).err().unwrap_or_default()
}

/// The parsed amount when every field is valid
fn check(fields: &OrderFields) -> Result<u32, FieldErrors> {
    let mut errors = FieldErrors::default();

    if fields.name.trim().is_empty() {
        errors.insert(OrderField::Name, "OrderForm.errors.nameRequired");
    }
    if fields.company.trim().is_empty() {
        errors.insert(OrderField::Company, "OrderForm.errors.companyRequired");
    }
    if fields.location.trim().is_empty() {
        errors.insert(OrderField::Location, "OrderForm.errors.locationRequired");
    }

    if fields.phone.trim().is_empty() {
        errors.insert(OrderField::Phone, "OrderForm.errors.phoneRequired");
    } else if !PHONE_PATTERN.is_match(&fields.phone) {
        errors.insert(OrderField::Phone, "OrderForm.errors.phoneInvalid");
    }

    if !fields.email.is_empty() && !EMAIL_PATTERN.is_match(&fields.email) {
        errors.insert(OrderField::Email, "OrderForm.errors.emailInvalid");
    }

    let amount = parse_amount(&fields.amount);
    if amount.is_none() {
        errors.insert(OrderField::Amount, "OrderForm.errors.amountRequired");
    }

    match amount {
        Some(amount) if errors.is_empty() => Ok(amount),
        _ => Err(errors),
    }
}

fn parse_amount(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|amount| *amount >= 1)
}

/// A validated order, as handed to the order-intake collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub name: String,
    pub company: String,
    pub location: String,
    pub email: Option<String>,
    pub phone: String,
    /// Kilograms
    pub amount: u32,
    pub product_name: String,
}

impl OrderRequest {
    /// Validate raw fields into a request
    pub fn try_from_fields(fields: &OrderFields) -> Result<Self, FieldErrors> {
        let amount = check(fields)?;
        let email = Some(fields.email.trim())
            .filter(|email| !email.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: fields.name.trim().to_string(),
            company: fields.company.trim().to_string(),
            location: fields.location.trim().to_string(),
            email,
            phone: fields.phone.clone(),
            amount,
            product_name: fields.product_name.trim().to_string(),
        })
    }
}

/// Acknowledgement from the order-intake collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReceipt {
    pub reference: Uuid,
    pub received_at: DateTime<Utc>,
}

impl OrderReceipt {
    pub fn new() -> Self {
        Self {
            reference: Uuid::new_v4(),
            received_at: Utc::now(),
        }
    }
}

impl Default for OrderReceipt {
    fn default() -> Self {
        Self::new()
    }
}

/// Why the order-intake collaborator did not accept an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum OrderIntakeError {
    #[error("order intake unavailable: {message}")]
    Unavailable { message: String },

    #[error("order rejected: {reason}")]
    Rejected { reason: String },
}

/// Where validated orders go (email, CRM, order processing...)
#[async_trait]
pub trait OrderIntake: Send + Sync {
    async fn submit(&self, order: OrderRequest) -> Result<OrderReceipt, OrderIntakeError>;
}

/// Accepts every order and writes it to the log
#[derive(Debug, Clone, Default)]
pub struct LoggingOrderIntake;

#[async_trait]
impl OrderIntake for LoggingOrderIntake {
    async fn submit(&self, order: OrderRequest) -> Result<OrderReceipt, OrderIntakeError> {
        let receipt = OrderReceipt::new();
        tracing::info!(
            reference = %receipt.reference,
            product = %order.product_name,
            amount_kg = order.amount,
            company = %order.company,
            location = %order.location,
            has_email = order.email.is_some(),
            "order received"
        );
        Ok(receipt)
    }
}

/// Where an order form session stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FormState {
    Idle,
    Submitting,
    Success { receipt: OrderReceipt },
    Failed { error: OrderIntakeError },
}

impl FormState {
    pub fn name(&self) -> &'static str {
        match self {
            FormState::Idle => "idle",
            FormState::Submitting => "submitting",
            FormState::Success { .. } => "success",
            FormState::Failed { .. } => "failed",
        }
    }
}

/// One visitor's interaction with the order form for a product
#[derive(Debug, Clone)]
pub struct OrderSession {
    fields: OrderFields,
    quantity: u32,
    state: FormState,
    errors: FieldErrors,
    history: Vec<FormState>,
}

impl OrderSession {
    /// Open the form for `product_name` with the quantity chosen on the product page
    pub fn new(product_name: impl Into<String>, quantity: u32) -> Self {
        let quantity = quantity.max(1);
        Self {
            fields: OrderFields {
                amount: quantity.to_string(),
                product_name: product_name.into(),
                ..OrderFields::default()
            },
            quantity,
            state: FormState::Idle,
            errors: FieldErrors::default(),
            history: vec![FormState::Idle],
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Every state entered so far, starting with `Idle`
    pub fn history(&self) -> &[FormState] {
        &self.history
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn fields(&self) -> &OrderFields {
        &self.fields
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn increase_quantity(&mut self) {
        self.set_quantity(self.quantity.saturating_add(1));
    }

    /// Never goes below 1
    pub fn decrease_quantity(&mut self) {
        self.set_quantity(self.quantity.saturating_sub(1));
    }

    fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.max(1);
        self.fields.amount = self.quantity.to_string();
    }

    /// Replace the visitor-editable fields; the product name is kept
    pub fn fill(&mut self, fields: OrderFields) {
        let product_name = std::mem::take(&mut self.fields.product_name);
        self.fields = OrderFields {
            product_name,
            ..fields
        };
        if let Some(amount) = parse_amount(&self.fields.amount) {
            self.quantity = amount;
        }
    }

    /// Validate and, when clean, hand the order to `intake`
    ///
    /// Validation errors keep the session idle. A submission that is
    /// already finished or in flight is not sent again.
    pub async fn submit(&mut self, intake: &dyn OrderIntake) -> &FormState {
        if !matches!(self.state, FormState::Idle | FormState::Failed { .. }) {
            return &self.state;
        }

        let order = match OrderRequest::try_from_fields(&self.fields) {
            Ok(order) => order,
            Err(errors) => {
                tracing::debug!(errors = errors.len(), "order form rejected by validation");
                self.errors = errors;
                return &self.state;
            }
        };

        self.errors = FieldErrors::default();
        self.transition(FormState::Submitting);

        let next = match intake.submit(order).await {
            Ok(receipt) => FormState::Success { receipt },
            Err(error) => {
                tracing::warn!(error = %error, "order submission failed");
                FormState::Failed { error }
            }
        };
        self.transition(next);

        &self.state
    }

    /// Close the form, discarding everything typed
    pub fn cancel(self) {
        tracing::debug!(state = self.state.name(), "order form closed");
    }

    fn transition(&mut self, next: FormState) {
        self.history.push(next.clone());
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_fields() -> OrderFields {
        OrderFields {
            name: "Amina Saleh".to_string(),
            company: "Oasis Trading".to_string(),
            location: "Alexandria".to_string(),
            email: String::new(),
            phone: "+201234567890".to_string(),
            amount: "3".to_string(),
            product_name: "Siwa Dates".to_string(),
        }
    }

    struct FailingIntake;

    #[async_trait]
    impl OrderIntake for FailingIntake {
        async fn submit(&self, _order: OrderRequest) -> Result<OrderReceipt, OrderIntakeError> {
            Err(OrderIntakeError::Unavailable {
                message: "mail relay down".to_string(),
            })
        }
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let errors = validate(&OrderFields::default());
        assert!(errors.len() >= 4);
        for field in [
            OrderField::Name,
            OrderField::Company,
            OrderField::Location,
            OrderField::Phone,
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert_eq!(
            errors.get(OrderField::Phone),
            Some("OrderForm.errors.phoneRequired")
        );
        assert!(!errors.contains(OrderField::Email));
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let fields = OrderFields {
            name: "   ".to_string(),
            ..valid_fields()
        };
        assert!(validate(&fields).contains(OrderField::Name));
    }

    #[test]
    fn test_phone_with_ten_digits_is_valid() {
        assert!(validate(&valid_fields()).is_empty());
    }

    #[test]
    fn test_short_phone_is_invalid() {
        let fields = OrderFields {
            phone: "+2012345".to_string(),
            ..valid_fields()
        };
        assert_eq!(
            validate(&fields).get(OrderField::Phone),
            Some("OrderForm.errors.phoneInvalid")
        );
    }

    #[test]
    fn test_phone_pattern_is_anchored() {
        for phone in ["+2012345678901", "201234567890", "+20123456789a", " +201234567890"] {
            let fields = OrderFields {
                phone: phone.to_string(),
                ..valid_fields()
            };
            assert!(validate(&fields).contains(OrderField::Phone), "{phone}");
        }
    }

    #[test]
    fn test_email_is_optional_but_checked() {
        let fields = OrderFields {
            email: "buyer@example.com".to_string(),
            ..valid_fields()
        };
        assert!(validate(&fields).is_empty());

        let fields = OrderFields {
            email: "buyer@example".to_string(),
            ..valid_fields()
        };
        assert_eq!(
            validate(&fields).get(OrderField::Email),
            Some("OrderForm.errors.emailInvalid")
        );
    }

    #[test]
    fn test_amount_must_be_positive_integer() {
        for amount in ["0", "", "-2", "1.5", "ten"] {
            let fields = OrderFields {
                amount: amount.to_string(),
                ..valid_fields()
            };
            assert!(validate(&fields).contains(OrderField::Amount), "{amount:?}");
        }
    }

    #[test]
    fn test_request_carries_the_amount_error() {
        let fields = OrderFields {
            amount: "0".to_string(),
            ..valid_fields()
        };
        let errors = OrderRequest::try_from_fields(&fields).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(OrderField::Amount),
            Some("OrderForm.errors.amountRequired")
        );
    }

    #[test]
    fn test_request_trims_and_drops_blank_email() {
        let fields = OrderFields {
            name: "  Amina Saleh ".to_string(),
            ..valid_fields()
        };
        let order = OrderRequest::try_from_fields(&fields).unwrap();
        assert_eq!(order.name, "Amina Saleh");
        assert_eq!(order.email, None);
        assert_eq!(order.amount, 3);
    }

    #[test]
    fn test_quantity_never_below_one() {
        let mut session = OrderSession::new("Siwa Dates", 0);
        assert_eq!(session.quantity(), 1);
        session.decrease_quantity();
        assert_eq!(session.quantity(), 1);
        session.increase_quantity();
        session.increase_quantity();
        assert_eq!(session.quantity(), 3);
        assert_eq!(session.fields().amount, "3");
    }

    #[tokio::test]
    async fn test_valid_submission_goes_idle_submitting_success() {
        let mut session = OrderSession::new("Siwa Dates", 3);
        session.fill(valid_fields());

        let state = session.submit(&LoggingOrderIntake).await;
        assert!(matches!(state, FormState::Success { .. }));

        let names: Vec<_> = session.history().iter().map(FormState::name).collect();
        assert_eq!(names, vec!["idle", "submitting", "success"]);
        assert!(session.errors().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_submission_stays_idle() {
        let mut session = OrderSession::new("Siwa Dates", 1);
        let state = session.submit(&LoggingOrderIntake).await;

        assert_eq!(state, &FormState::Idle);
        assert_eq!(session.history(), &[FormState::Idle]);
        assert!(session.errors().contains(OrderField::Phone));
    }

    #[tokio::test]
    async fn test_fill_keeps_product_name() {
        let mut session = OrderSession::new("Medjool Dates", 2);
        session.fill(OrderFields {
            product_name: "Something Else".to_string(),
            ..valid_fields()
        });
        assert_eq!(session.fields().product_name, "Medjool Dates");
        assert_eq!(session.quantity(), 3);
    }

    #[tokio::test]
    async fn test_intake_failure_is_reported_and_retryable() {
        let mut session = OrderSession::new("Siwa Dates", 3);
        session.fill(valid_fields());

        let state = session.submit(&FailingIntake).await.clone();
        match state {
            FormState::Failed { error } => {
                assert!(error.to_string().contains("mail relay down"))
            }
            other => panic!("unexpected state {other:?}"),
        }

        let state = session.submit(&LoggingOrderIntake).await;
        assert!(matches!(state, FormState::Success { .. }));
        assert_eq!(session.history().len(), 5);
    }

    #[tokio::test]
    async fn test_success_is_not_resubmitted() {
        let mut session = OrderSession::new("Siwa Dates", 3);
        session.fill(valid_fields());
        session.submit(&LoggingOrderIntake).await;
        session.submit(&FailingIntake).await;
        assert!(matches!(session.state(), FormState::Success { .. }));
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn test_field_errors_translate_into_validation_error() {
        let errors = validate(&OrderFields::default());
        let err = errors.into_validation_error(|key| format!("<{key}>"));
        match err {
            ValidationError::FieldErrors(fields) => {
                assert!(fields.iter().any(|f| f.field == "phone"
                    && f.message == "<OrderForm.errors.phoneRequired>"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
