//! Login, registration, and session handling over the user table.
//!
//! ## Design
//! - Passwords are stretched with PBKDF2-HMAC-SHA256 using a per-account
//!   16-byte salt and the iteration count stored in the account record
//! - Key derivation runs outside the table lock; only lookups and writes
//!   take it
//! - Hash comparison is constant-time over the fixed 32-byte width
//! - A session id is the hex SHA-256 of a block of fresh random bytes
//! - Logout clears the stored session id, so an old cookie stops working
//!   immediately

pub mod session;

pub use session::{issue_session_id, LoginSuccess, SessionCookie, Visitor};

use crate::config::AuthConfig;
use crate::crypto::{constant_time_eq, derive_password_hash};
use crate::entropy::EntropySource;
use crate::error::{AuthError, Result};
use crate::store::{validate_username, UserStore, HASH_LEN, MAX_PASSWORD_LEN, SALT_LEN};
use std::sync::Arc;
use std::time::Instant;

/// PBKDF2 cost for new registrations.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Default session cookie name.
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// Salt used for the throwaway derivation on unknown usernames.
const DUMMY_SALT: [u8; SALT_LEN] = [0u8; SALT_LEN];

/// Tunables for [`AuthService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub iterations: u32,
    pub session_entropy_bytes: usize,
    pub cookie_name: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            session_entropy_bytes: session::DEFAULT_SESSION_ENTROPY_BYTES,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }
}

impl From<&AuthConfig> for AuthSettings {
    fn from(config: &AuthConfig) -> Self {
        Self {
            iterations: config.iterations,
            session_entropy_bytes: config.session_entropy_bytes,
            cookie_name: config.cookie_name.clone(),
        }
    }
}

/// Credential checks and session issuance for request handlers.
pub struct AuthService {
    store: Arc<UserStore>,
    entropy: Box<dyn EntropySource>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new<E: EntropySource + 'static>(
        store: Arc<UserStore>,
        entropy: E,
        settings: AuthSettings,
    ) -> Self {
        Self {
            store,
            entropy: Box::new(entropy),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }

    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    // ── Registration ────────────────────────────────────────────────

    /// Create an account, then log it in.
    pub fn register(&self, username: &str, password: &str) -> Result<LoginSuccess> {
        if username.is_empty() && password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        validate_username(username)?;
        if password.is_empty() {
            return Err(AuthError::EmptyPassword);
        }
        if password.len() > MAX_PASSWORD_LEN {
            return Err(AuthError::PasswordTooLong {
                len: password.len(),
                max: MAX_PASSWORD_LEN,
            });
        }

        if self.store.find_by_username(username).is_some() {
            tracing::info!(username, "Registration rejected: username taken");
            return Err(AuthError::AccountExists);
        }

        let mut salt = [0u8; SALT_LEN];
        self.entropy.fill(&mut salt)?;
        let password_hash = self.derive(password, &salt, self.settings.iterations);

        self.store
            .insert(username, salt, password_hash, self.settings.iterations)?;
        tracing::info!(username, iterations = self.settings.iterations, "User registered");

        self.login(username, password)
    }

    // ── Login ───────────────────────────────────────────────────────

    /// Verify a password and issue a new session id for the account.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginSuccess> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(account) = self.store.find_by_username(username) else {
            // Spend the same derivation cost as a real check.
            let _ = self.derive(password, &DUMMY_SALT, self.settings.iterations);
            tracing::info!(username, "Login failed: unknown account");
            return Err(AuthError::AccountNotFound);
        };

        let candidate = self.derive(password, &account.salt, account.iteration_count);
        if !constant_time_eq(&candidate, &account.password_hash) {
            tracing::info!(username, "Login failed: wrong password");
            return Err(AuthError::WrongPassword);
        }

        let session_id =
            issue_session_id(self.entropy.as_ref(), self.settings.session_entropy_bytes)?;
        if !self.store.update_session_id(username, &session_id) {
            return Err(AuthError::AccountNotFound);
        }

        tracing::info!(username, "Login succeeded");
        Ok(LoginSuccess {
            username: account.username,
            session_id,
            cookie_name: self.settings.cookie_name.clone(),
        })
    }

    // ── Sessions ────────────────────────────────────────────────────

    /// Build the request's view of the user from its session cookie.
    pub fn resolve(&self, cookie: Option<&str>) -> Visitor {
        match cookie.and_then(|sid| self.store.find_by_session_id(sid)) {
            Some(account) => Visitor::signed_in(account.username),
            None => Visitor::anonymous(),
        }
    }

    /// Whether the cookie lookup at request start found an account.
    pub fn is_authenticated(&self, visitor: &Visitor) -> bool {
        visitor.username().is_some()
    }

    /// End the visitor's session: clear the stored id, reset the view, and
    /// tell the client to drop its cookie.
    pub fn logout(&self, visitor: &mut Visitor) -> SessionCookie {
        if let Some(username) = visitor.sign_out() {
            if self.store.update_session_id(&username, "") {
                tracing::info!(username = %username, "Logged out");
            }
        }
        SessionCookie::Clear {
            name: self.settings.cookie_name.clone(),
        }
    }

    fn derive(&self, password: &str, salt: &[u8], iterations: u32) -> [u8; HASH_LEN] {
        let started = Instant::now();
        let hash = derive_password_hash(password.as_bytes(), salt, iterations);
        tracing::debug!(
            iterations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Password key derivation finished"
        );
        hash
    }
}
