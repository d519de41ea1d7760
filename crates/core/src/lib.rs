//! VetoGest core types and utilities

pub mod customer;
pub mod error;
#[cfg(feature = "tracing")]
pub mod tracing;
pub mod types;
pub mod validation;

pub use customer::{Customer, CustomerField, FormatError, ValidationResult, validate_customer};
pub use error::{CoreError, CoreResult};
pub use types::{AccessTokenResponse, ApiErrorBody, LoginCredentials, RefreshRequest, TokenPair};
pub use validation::{ValidateConfig, validators};
