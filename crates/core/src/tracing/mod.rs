//! Tracing setup shared by VetoGest binaries

pub mod config;
pub mod init;

pub use self::config::InstrumentationConfig;
pub use self::init::init_tracing;
