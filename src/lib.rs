//! Credential storage and session core.
//!
//! Provides:
//! - SHA-256, HMAC-SHA256 and PBKDF2-HMAC-SHA256 implemented from scratch
//! - A fixed-width user table mirrored to an append-only file
//! - Registration, login, logout and session resolution over that table
//!
//! The request layer owns one [`UserStore`] (wrapped in an `Arc`) and one
//! [`AuthService`], and maps every [`AuthError`] to a redirect carrying
//! [`AuthError::code`].

pub mod auth;
pub mod config;
pub mod crypto;
pub mod entropy;
pub mod error;
pub mod logging;
pub mod store;

pub use auth::{AuthService, AuthSettings, LoginSuccess, SessionCookie, Visitor};
pub use config::AuthConfig;
pub use entropy::{EntropySource, OsEntropy};
pub use error::{AuthError, Result};
pub use store::{FileBacking, LoadStatus, RecordBacking, UserAccount, UserStore};
