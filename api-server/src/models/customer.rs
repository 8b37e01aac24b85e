//! Customer request payloads
//!
//! Schema check at the HTTP boundary: ranges for numerics, closed
//! vocabularies for categoricals. Passes → converted to a `CustomerRecord`.

use std::borrow::Cow;

use churn_core::CustomerRecord;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

// ============================================================================
// Allowed values
// ============================================================================

pub const GENDER: &[&str] = &["Male", "Female"];
pub const YES_NO: &[&str] = &["Yes", "No"];
pub const MULTIPLE_LINES: &[&str] = &["Yes", "No", "No phone service"];
pub const INTERNET_SERVICE: &[&str] = &["DSL", "Fiber optic", "No"];
pub const INTERNET_ADDON: &[&str] = &["Yes", "No", "No internet service"];
pub const CONTRACT: &[&str] = &["Month-to-month", "One year", "Two year"];
pub const PAYMENT_METHOD: &[&str] = &[
    "Electronic check",
    "Mailed check",
    "Bank transfer (automatic)",
    "Credit card (automatic)",
];

// ============================================================================
// Payloads
// ============================================================================

/// One customer, as accepted by `POST /predict`
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CustomerPayload {
    #[serde(rename = "SeniorCitizen")]
    #[validate(range(min = 0, max = 1))]
    pub senior_citizen: i64,

    #[validate(range(min = 0.0))]
    pub tenure: f64,

    #[serde(rename = "MonthlyCharges")]
    #[validate(range(min = 0.0))]
    pub monthly_charges: f64,

    #[serde(rename = "TotalCharges")]
    #[validate(range(min = 0.0))]
    pub total_charges: f64,

    #[validate(custom(function = "validate_gender"))]
    pub gender: String,

    #[serde(rename = "Partner")]
    #[validate(custom(function = "validate_yes_no"))]
    pub partner: String,

    #[serde(rename = "Dependents")]
    #[validate(custom(function = "validate_yes_no"))]
    pub dependents: String,

    #[serde(rename = "PhoneService")]
    #[validate(custom(function = "validate_yes_no"))]
    pub phone_service: String,

    #[serde(rename = "MultipleLines")]
    #[validate(custom(function = "validate_multiple_lines"))]
    pub multiple_lines: String,

    #[serde(rename = "InternetService")]
    #[validate(custom(function = "validate_internet_service"))]
    pub internet_service: String,

    #[serde(rename = "OnlineSecurity")]
    #[validate(custom(function = "validate_internet_addon"))]
    pub online_security: String,

    #[serde(rename = "OnlineBackup")]
    #[validate(custom(function = "validate_internet_addon"))]
    pub online_backup: String,

    #[serde(rename = "DeviceProtection")]
    #[validate(custom(function = "validate_internet_addon"))]
    pub device_protection: String,

    #[serde(rename = "TechSupport")]
    #[validate(custom(function = "validate_internet_addon"))]
    pub tech_support: String,

    #[serde(rename = "StreamingTV")]
    #[validate(custom(function = "validate_internet_addon"))]
    pub streaming_tv: String,

    #[serde(rename = "StreamingMovies")]
    #[validate(custom(function = "validate_internet_addon"))]
    pub streaming_movies: String,

    #[serde(rename = "Contract")]
    #[validate(custom(function = "validate_contract"))]
    pub contract: String,

    #[serde(rename = "PaperlessBilling")]
    #[validate(custom(function = "validate_yes_no"))]
    pub paperless_billing: String,

    #[serde(rename = "PaymentMethod")]
    #[validate(custom(function = "validate_payment_method"))]
    pub payment_method: String,
}

/// Body of `POST /predict/batch`
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BatchPayload {
    #[validate(length(min = 1, message = "at least one customer is required"), nested)]
    pub customers: Vec<CustomerPayload>,
}

impl From<CustomerPayload> for CustomerRecord {
    fn from(p: CustomerPayload) -> Self {
        CustomerRecord::new()
            .with("SeniorCitizen", p.senior_citizen)
            .with("tenure", p.tenure)
            .with("MonthlyCharges", p.monthly_charges)
            .with("TotalCharges", p.total_charges)
            .with("gender", p.gender)
            .with("Partner", p.partner)
            .with("Dependents", p.dependents)
            .with("PhoneService", p.phone_service)
            .with("MultipleLines", p.multiple_lines)
            .with("InternetService", p.internet_service)
            .with("OnlineSecurity", p.online_security)
            .with("OnlineBackup", p.online_backup)
            .with("DeviceProtection", p.device_protection)
            .with("TechSupport", p.tech_support)
            .with("StreamingTV", p.streaming_tv)
            .with("StreamingMovies", p.streaming_movies)
            .with("Contract", p.contract)
            .with("PaperlessBilling", p.paperless_billing)
            .with("PaymentMethod", p.payment_method)
    }
}

impl BatchPayload {
    pub fn into_records(self) -> Vec<CustomerRecord> {
        self.customers.into_iter().map(CustomerRecord::from).collect()
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

fn one_of(value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_choice");
    error.message = Some(Cow::Owned(format!(
        "'{}' is not one of {}",
        value,
        allowed.join(", ")
    )));
    Err(error)
}

fn validate_gender(value: &str) -> Result<(), ValidationError> {
    one_of(value, GENDER)
}

fn validate_yes_no(value: &str) -> Result<(), ValidationError> {
    one_of(value, YES_NO)
}

fn validate_multiple_lines(value: &str) -> Result<(), ValidationError> {
    one_of(value, MULTIPLE_LINES)
}

fn validate_internet_service(value: &str) -> Result<(), ValidationError> {
    one_of(value, INTERNET_SERVICE)
}

fn validate_internet_addon(value: &str) -> Result<(), ValidationError> {
    one_of(value, INTERNET_ADDON)
}

fn validate_contract(value: &str) -> Result<(), ValidationError> {
    one_of(value, CONTRACT)
}

fn validate_payment_method(value: &str) -> Result<(), ValidationError> {
    one_of(value, PAYMENT_METHOD)
}
