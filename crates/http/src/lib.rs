//! VetoGest HTTP client
//!
//! An authenticated client for the VetoGest API. Bearer credentials come from
//! a [`TokenStore`]; an expired access token is refreshed once per request
//! and the request replayed. When the refresh itself is rejected the stored
//! tokens are discarded and the configured [`SessionObserver`] is notified.

pub mod client;
pub mod session;
pub mod storage;

pub use client::config::{ApiConfig, ApiMode};
pub use client::error::{ClientError, ErrorKind};
pub use client::observer::SessionObserver;
pub use client::request::{ApiResponse, RequestDescriptor};
pub use client::{VetoClient, VetoClientBuilder};
pub use session::AuthSession;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError, TokenStore};
