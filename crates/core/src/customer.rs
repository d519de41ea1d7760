//! Customer record and client-side validation

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Customer record as exchanged with the `/customers/` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub last_name: String,
    pub first_name: String,
    pub email: String,
    pub phone_number: String,
    pub street: String,
    pub zip_code: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<bool>,
    /// Assigned by the server, never sent
    #[serde(default, skip_serializing)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// Value of a required field
    pub fn field(&self, field: CustomerField) -> &str {
        match field {
            CustomerField::LastName => &self.last_name,
            CustomerField::FirstName => &self.first_name,
            CustomerField::Email => &self.email,
            CustomerField::PhoneNumber => &self.phone_number,
            CustomerField::Street => &self.street,
            CustomerField::ZipCode => &self.zip_code,
            CustomerField::City => &self.city,
        }
    }
}

/// Fields a customer cannot be created without
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    LastName,
    FirstName,
    Email,
    PhoneNumber,
    Street,
    ZipCode,
    City,
}

impl CustomerField {
    pub const REQUIRED: [CustomerField; 7] = [
        Self::LastName,
        Self::FirstName,
        Self::Email,
        Self::PhoneNumber,
        Self::Street,
        Self::ZipCode,
        Self::City,
    ];

    /// Wire name of the field
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LastName => "lastName",
            Self::FirstName => "firstName",
            Self::Email => "email",
            Self::PhoneNumber => "phoneNumber",
            Self::Street => "street",
            Self::ZipCode => "zipCode",
            Self::City => "city",
        }
    }
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format rule a non-empty field failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    EmailFormat,
    PhoneFormat,
}

impl FormatError {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailFormat => "email_format",
            Self::PhoneFormat => "phone_format",
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`validate_customer`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub missing_fields: Vec<CustomerField>,
    pub errors: Vec<FormatError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.missing_fields.is_empty() && self.errors.is_empty()
    }
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

// French numbers: 0X or +33/0033 prefix followed by four digit pairs
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:\+|00)33|0)\s*[1-9](?:[\s.-]*\d{2}){4}$").expect("valid phone regex")
});

/// Check required fields and email/phone formats
pub fn validate_customer(customer: &Customer) -> ValidationResult {
    let missing_fields = CustomerField::REQUIRED
        .into_iter()
        .filter(|field| customer.field(*field).trim().is_empty())
        .collect();

    let mut errors = Vec::new();
    if !customer.email.is_empty() && !EMAIL_RE.is_match(&customer.email) {
        errors.push(FormatError::EmailFormat);
    }
    if !customer.phone_number.is_empty() && !PHONE_RE.is_match(&customer.phone_number) {
        errors.push(FormatError::PhoneFormat);
    }

    ValidationResult {
        missing_fields,
        errors,
    }
}
