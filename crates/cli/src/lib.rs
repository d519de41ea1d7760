//! VetoGest command-line shell
//!
//! Login and customer forms on top of [`vetogest_http::AuthSession`], plus
//! layered settings.

pub mod forms;
pub mod settings;

pub use forms::{Banner, BannerKind, CustomerForm, LoginForm};
pub use settings::{Settings, StorageConfig};
