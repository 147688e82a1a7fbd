//! Fixed-width user account record.
//!
//! On-disk layout (packed, 149 bytes, no header or checksum):
//!
//! | field             | bytes | encoding                         |
//! |-------------------|-------|----------------------------------|
//! | `username`        | 32    | up to 31 bytes, NUL-padded       |
//! | `salt`            | 16    | raw                              |
//! | `password_hash`   | 32    | raw                              |
//! | `iteration_count` | 4     | native-endian `u32`              |
//! | `session_id`      | 65    | up to 64 bytes, NUL-padded       |

use crate::error::{AuthError, Result};

/// Width of the NUL-padded username field.
pub const USERNAME_FIELD: usize = 32;

/// Longest storable username (one byte is reserved for the terminator).
pub const MAX_USERNAME_LEN: usize = USERNAME_FIELD - 1;

/// Longest accepted password in bytes.
pub const MAX_PASSWORD_LEN: usize = 512;

/// Salt byte length for password hashing.
pub const SALT_LEN: usize = 16;

/// PBKDF2 output length stored per account.
pub const HASH_LEN: usize = 32;

/// Width of the NUL-padded session id field.
pub const SESSION_FIELD: usize = 65;

/// Length of an issued session id (hex SHA-256).
pub const SESSION_ID_LEN: usize = SESSION_FIELD - 1;

/// Serialized size of one record.
pub const RECORD_SIZE: usize = USERNAME_FIELD + SALT_LEN + HASH_LEN + 4 + SESSION_FIELD;

const SALT_OFFSET: usize = USERNAME_FIELD;
const HASH_OFFSET: usize = SALT_OFFSET + SALT_LEN;
const ITER_OFFSET: usize = HASH_OFFSET + HASH_LEN;
const SESSION_OFFSET: usize = ITER_OFFSET + 4;

/// One row of the user table.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub username: String,
    pub salt: [u8; SALT_LEN],
    pub password_hash: [u8; HASH_LEN],
    pub iteration_count: u32,
    /// Empty means no active session.
    pub session_id: String,
}

// Secrets stay out of logs even when an account is printed with `{:?}`.
impl std::fmt::Debug for UserAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserAccount")
            .field("username", &self.username)
            .field("iteration_count", &self.iteration_count)
            .field("has_session", &self.has_session())
            .finish_non_exhaustive()
    }
}

impl UserAccount {
    pub fn new(
        username: &str,
        salt: [u8; SALT_LEN],
        password_hash: [u8; HASH_LEN],
        iteration_count: u32,
    ) -> Self {
        Self {
            username: username.to_string(),
            salt,
            password_hash,
            iteration_count,
            session_id: String::new(),
        }
    }

    pub fn has_session(&self) -> bool {
        !self.session_id.is_empty()
    }

    /// Serialize into the fixed on-disk layout.
    ///
    /// Callers validate field widths first; oversized text is cut at the
    /// field boundary so the terminator byte always survives.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        put_padded(&mut out[..SALT_OFFSET], self.username.as_bytes());
        out[SALT_OFFSET..HASH_OFFSET].copy_from_slice(&self.salt);
        out[HASH_OFFSET..ITER_OFFSET].copy_from_slice(&self.password_hash);
        out[ITER_OFFSET..SESSION_OFFSET].copy_from_slice(&self.iteration_count.to_ne_bytes());
        put_padded(&mut out[SESSION_OFFSET..], self.session_id.as_bytes());
        out
    }

    /// Parse one record. `bytes` must be exactly [`RECORD_SIZE`] long.
    ///
    /// A username that is not valid UTF-8 makes the record unreadable; it is
    /// never decoded lossily, since distinct raw names would collide. A
    /// session id that is not valid UTF-8 decodes as no session.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != RECORD_SIZE {
            return None;
        }

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&bytes[SALT_OFFSET..HASH_OFFSET]);
        let mut password_hash = [0u8; HASH_LEN];
        password_hash.copy_from_slice(&bytes[HASH_OFFSET..ITER_OFFSET]);
        let mut iter = [0u8; 4];
        iter.copy_from_slice(&bytes[ITER_OFFSET..SESSION_OFFSET]);

        let username = take_padded(&bytes[..SALT_OFFSET])?;

        Some(Self {
            username,
            salt,
            password_hash,
            iteration_count: u32::from_ne_bytes(iter),
            session_id: take_padded(&bytes[SESSION_OFFSET..]).unwrap_or_default(),
        })
    }
}

/// Check that `username` fits the record and contains only printable bytes.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(AuthError::EmptyUsername);
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(AuthError::UsernameTooLong {
            len: username.len(),
            max: MAX_USERNAME_LEN,
        });
    }
    if username.chars().any(char::is_control) {
        return Err(AuthError::InvalidUsername);
    }
    Ok(())
}

fn put_padded(field: &mut [u8], text: &[u8]) {
    let n = text.len().min(field.len() - 1);
    field[..n].copy_from_slice(&text[..n]);
}

fn take_padded(field: &[u8]) -> Option<String> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8(field[..end].to_vec()).ok()
}
