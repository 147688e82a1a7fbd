//! Error taxonomy for the credential core.
//!
//! Every variant is a recoverable outcome. The surrounding request layer maps
//! them to a redirect carrying [`AuthError::code`]; nothing here terminates the
//! process.

use std::path::PathBuf;
use thiserror::Error;

/// Outcome of a failed credential, store, or capability operation.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Both username and password were absent.
    #[error("username and password are required")]
    MissingCredentials,

    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("username too long ({len} bytes, max {max})")]
    UsernameTooLong { len: usize, max: usize },

    #[error("password too long ({len} bytes, max {max})")]
    PasswordTooLong { len: usize, max: usize },

    /// Username contains NUL or control bytes and cannot be stored in a record.
    #[error("username contains unprintable characters")]
    InvalidUsername,

    #[error("no account exists with that username")]
    AccountNotFound,

    #[error("username is already taken")]
    AccountExists,

    #[error("password does not match")]
    WrongPassword,

    /// The user table reached its configured capacity; the write was rejected.
    #[error("user table is full ({capacity} rows)")]
    TableFull { capacity: usize },

    /// Backing file size is not a whole number of records.
    #[error("user table {path} is corrupt: {size} bytes is not a multiple of the record size")]
    CorruptDatabase { path: PathBuf, size: u64 },

    #[error("user table I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("random byte source failed: {0}")]
    Entropy(String),
}

impl AuthError {
    /// Stable machine-readable code carried in redirect URLs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "missing_credentials",
            Self::EmptyUsername => "empty_username",
            Self::EmptyPassword => "empty_password",
            Self::UsernameTooLong { .. } => "username_too_long",
            Self::PasswordTooLong { .. } => "password_too_long",
            Self::InvalidUsername => "invalid_username",
            Self::AccountNotFound => "account_not_found",
            Self::AccountExists => "account_exists",
            Self::WrongPassword => "wrong_password",
            Self::TableFull { .. } => "table_full",
            Self::CorruptDatabase { .. } => "corrupt_database",
            Self::Io(_) => "storage_error",
            Self::Entropy(_) => "entropy_error",
        }
    }

    /// Whether the user can fix this by editing the submitted form.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::EmptyUsername
                | Self::EmptyPassword
                | Self::UsernameTooLong { .. }
                | Self::PasswordTooLong { .. }
                | Self::InvalidUsername
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            AuthError::MissingCredentials,
            AuthError::EmptyUsername,
            AuthError::EmptyPassword,
            AuthError::UsernameTooLong { len: 40, max: 31 },
            AuthError::PasswordTooLong { len: 600, max: 512 },
            AuthError::InvalidUsername,
            AuthError::AccountNotFound,
            AuthError::AccountExists,
            AuthError::WrongPassword,
            AuthError::TableFull { capacity: 1 },
            AuthError::CorruptDatabase {
                path: PathBuf::from("users.dbsp"),
                size: 7,
            },
            AuthError::Io(std::io::Error::other("disk")),
            AuthError::Entropy("no entropy".into()),
        ];

        let mut codes: Vec<_> = errors.iter().map(AuthError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn validation_family() {
        assert!(AuthError::EmptyUsername.is_validation());
        assert!(AuthError::PasswordTooLong { len: 513, max: 512 }.is_validation());
        assert!(!AuthError::WrongPassword.is_validation());
        assert!(!AuthError::TableFull { capacity: 10 }.is_validation());
    }

    #[test]
    fn corrupt_message_names_file() {
        let err = AuthError::CorruptDatabase {
            path: PathBuf::from("/var/lib/users.dbsp"),
            size: 150,
        };
        let msg = err.to_string();
        assert!(msg.contains("/var/lib/users.dbsp"));
        assert!(msg.contains("150"));
    }
}
