//! Session ids, the per-request visitor view, and cookie directives.

use crate::crypto::sha256;
use crate::entropy::EntropySource;
use crate::error::Result;
use crate::store::SESSION_ID_LEN;

/// Default number of random bytes hashed into one session id.
pub const DEFAULT_SESSION_ENTROPY_BYTES: usize = 4096;

/// Hash `entropy_bytes` fresh random bytes into a 64-character hex session id.
pub fn issue_session_id(entropy: &dyn EntropySource, entropy_bytes: usize) -> Result<String> {
    let mut seed = vec![0u8; entropy_bytes];
    entropy.fill(&mut seed)?;
    let mut id = sha256::hash(&seed).to_hex();
    id.truncate(SESSION_ID_LEN);
    Ok(id)
}

/// Successful login: the account and its freshly issued session.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub username: String,
    pub session_id: String,
    pub(crate) cookie_name: String,
}

impl std::fmt::Debug for LoginSuccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginSuccess")
            .field("username", &self.username)
            .field("cookie_name", &self.cookie_name)
            .finish_non_exhaustive()
    }
}

impl LoginSuccess {
    /// Directive for the response: store the session id client-side.
    pub fn cookie(&self) -> SessionCookie {
        SessionCookie::Set {
            name: self.cookie_name.clone(),
            value: self.session_id.clone(),
        }
    }
}

/// What the response layer should do with the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCookie {
    Set { name: String, value: String },
    Clear { name: String },
}

impl SessionCookie {
    /// Render as a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        match self {
            Self::Set { name, value } => {
                format!("{name}={value}; Path=/; HttpOnly; SameSite=Strict")
            }
            Self::Clear { name } => {
                format!("{name}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
            }
        }
    }
}

/// The user as seen by one request, resolved from its session cookie at
/// request start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Visitor {
    username: Option<String>,
}

impl Visitor {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn signed_in(username: String) -> Self {
        Self {
            username: Some(username),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub(crate) fn sign_out(&mut self) -> Option<String> {
        self.username.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::OsEntropy;
    use crate::error::AuthError;

    struct Constant(u8);

    impl EntropySource for Constant {
        fn fill(&self, buf: &mut [u8]) -> Result<()> {
            buf.fill(self.0);
            Ok(())
        }
    }

    struct Exhausted;

    impl EntropySource for Exhausted {
        fn fill(&self, _buf: &mut [u8]) -> Result<()> {
            Err(AuthError::Entropy("exhausted".into()))
        }
    }

    #[test]
    fn session_id_is_64_lowercase_hex() {
        let id = issue_session_id(&OsEntropy, DEFAULT_SESSION_ENTROPY_BYTES).unwrap();
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn session_id_is_hash_of_entropy() {
        let id = issue_session_id(&Constant(0xab), 4096).unwrap();
        assert_eq!(id, sha256::hash(&[0xab; 4096]).to_hex());
    }

    #[test]
    fn session_ids_differ() {
        let a = issue_session_id(&OsEntropy, 64).unwrap();
        let b = issue_session_id(&OsEntropy, 64).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn entropy_failure_propagates() {
        let err = issue_session_id(&Exhausted, 16).unwrap_err();
        assert_eq!(err.code(), "entropy_error");
    }

    #[test]
    fn cookie_headers() {
        let set = SessionCookie::Set {
            name: "session".into(),
            value: "abc".into(),
        };
        assert_eq!(
            set.header_value(),
            "session=abc; Path=/; HttpOnly; SameSite=Strict"
        );

        let clear = SessionCookie::Clear {
            name: "session".into(),
        };
        assert!(clear.header_value().starts_with("session=;"));
        assert!(clear.header_value().ends_with("Max-Age=0"));
    }

    #[test]
    fn login_success_debug_hides_session() {
        let success = LoginSuccess {
            username: "alice".into(),
            session_id: "deadbeef".into(),
            cookie_name: "session".into(),
        };
        assert!(!format!("{success:?}").contains("deadbeef"));
        assert_eq!(
            success.cookie(),
            SessionCookie::Set {
                name: "session".into(),
                value: "deadbeef".into()
            }
        );
    }

    #[test]
    fn visitor_sign_out() {
        let mut visitor = Visitor::signed_in("alice".into());
        assert_eq!(visitor.username(), Some("alice"));
        assert_eq!(visitor.sign_out().as_deref(), Some("alice"));
        assert_eq!(visitor, Visitor::anonymous());
    }
}
