//! Login and customer-creation forms

use std::fmt;
use tracing::{error, info};
use vetogest_core::{Customer, LoginCredentials, ValidationResult, validate_customer};
use vetogest_http::AuthSession;

pub const LOGIN_EMPTY_MESSAGE: &str = "Veuillez remplir tous les champs.";
pub const LOGIN_FALLBACK_MESSAGE: &str = "Identifiants incorrects. Veuillez réessayer.";
pub const LOGIN_SUCCESS_MESSAGE: &str = "Connexion réussie.";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Veuillez remplir tous les champs obligatoires (*).";
pub const CREATE_FALLBACK_MESSAGE: &str = "Impossible de créer le client. Vérifiez la connexion.";
pub const SESSION_EXPIRED_MESSAGE: &str = "Votre session a expiré. Veuillez vous reconnecter.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Feedback shown after a form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    /// Per-field problems, if any
    pub details: Vec<String>,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == BannerKind::Success
    }

    fn with_validation(mut self, validation: &ValidationResult) -> Self {
        self.details.extend(
            validation
                .missing_fields
                .iter()
                .map(|field| format!("champ manquant: {field}")),
        );
        self.details.extend(
            validation
                .errors
                .iter()
                .map(|error| format!("format invalide: {error}")),
        );
        self
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for detail in &self.details {
            write!(f, "\n  - {detail}")?;
        }
        Ok(())
    }
}

/// Email/password form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub async fn submit(&self, session: &AuthSession) -> Banner {
        if self.email.is_empty() || self.password.is_empty() {
            return Banner::error(LOGIN_EMPTY_MESSAGE);
        }

        let credentials = LoginCredentials::new(self.email.as_str(), self.password.as_str());
        match session.login(&credentials).await {
            Ok(()) => Banner::success(LOGIN_SUCCESS_MESSAGE),
            Err(e) => {
                error!(error = %e, "Login failed");
                Banner::error(e.user_message(LOGIN_FALLBACK_MESSAGE))
            }
        }
    }
}

/// Customer creation form
///
/// The form is reset after a successful submission and kept as entered
/// otherwise.
#[derive(Debug, Clone, Default)]
pub struct CustomerForm {
    data: Customer,
}

impl CustomerForm {
    pub fn new(data: Customer) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Customer {
        &self.data
    }

    pub fn validate(&self) -> ValidationResult {
        validate_customer(&self.data)
    }

    /// Validate, then create the customer; no request is sent when invalid
    pub async fn submit(&mut self, session: &AuthSession) -> Banner {
        let validation = self.validate();
        if !validation.is_valid() {
            return Banner::error(REQUIRED_FIELDS_MESSAGE).with_validation(&validation);
        }

        match session.client().create_customer(&self.data).await {
            Ok(created) => {
                info!(id = created.id, "Customer form submitted");
                self.data = Customer::default();
                Banner::success(format!(
                    "Le client {} {} a été créé !",
                    created.first_name, created.last_name
                ))
            }
            Err(e) if e.is_session_expired() => Banner::error(SESSION_EXPIRED_MESSAGE),
            Err(e) => {
                error!(error = %e, "Customer submission failed");
                Banner::error(e.user_message(CREATE_FALLBACK_MESSAGE))
            }
        }
    }
}
