// Public modules
pub mod chat;
pub mod client;
pub mod credentials;
pub mod error;
pub mod history;
pub mod menu;
pub mod observability;
pub mod spinner;
pub mod types;

// Re-exports
pub use client::{OpenRouter, Transport};
pub use credentials::{Credential, resolve_credential};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use types::*;
