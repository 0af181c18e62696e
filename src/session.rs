use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dispatcher::HeaderVec;

/// Name of the session cookie holding the signed participant name.
pub const SESSION_COOKIE: &str = "tally_session";

/// Binds a browser to a participant name via a signed, stateless cookie.
///
/// The token is `base64url(name) + "." + base64url(sha256(secret || payload))`.
/// Nothing is stored server-side; a session exists exactly as long as the
/// browser presents a cookie whose signature verifies. A session starts on
/// join and lasts until the cookie expires; there is no logout.
///
/// The secret is random per process by default, so restarting the server
/// invalidates all outstanding sessions. Callers trim and validate names
/// before binding; the manager signs whatever it is given.
pub struct SessionManager {
    secret: String,
}

impl SessionManager {
    /// Create a manager with a fresh random secret.
    pub fn new() -> Self {
        Self {
            secret: format!("{}{}", ulid::Ulid::new(), ulid::Ulid::new()),
        }
    }

    /// Create a manager with a fixed secret (tests, multi-instance setups).
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn sign(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(hasher.finalize())
    }

    /// Produce the signed token binding `name`.
    pub fn issue(&self, name: &str) -> String {
        let payload = URL_SAFE_NO_PAD.encode(name.as_bytes());
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    /// Produce a full `Set-Cookie` header value binding `name`.
    pub fn cookie_for(&self, name: &str) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.issue(name)
        )
    }

    /// Verify a token and recover the bound name.
    ///
    /// Tampered payloads, bad signatures, and malformed tokens all read as
    /// no session.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (payload, signature) = token.split_once('.')?;
        if self.sign(payload) != signature {
            debug!("Session cookie signature mismatch");
            return None;
        }
        let raw = URL_SAFE_NO_PAD.decode(payload).ok()?;
        String::from_utf8(raw).ok()
    }

    /// Read the bound name from a request's cookies, if any verifies.
    pub fn current_name(&self, cookies: &HeaderVec) -> Option<String> {
        let (_, token) = cookies.iter().find(|(k, _)| k.as_ref() == SESSION_COOKIE)?;
        self.verify(token)
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn cookies_with(token: &str) -> HeaderVec {
        let mut cookies = HeaderVec::new();
        cookies.push((Arc::from(SESSION_COOKIE), token.to_string()));
        cookies
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let sessions = SessionManager::with_secret("s3cret");
        let token = sessions.issue("alice");
        assert_eq!(sessions.verify(&token), Some("alice".to_string()));
    }

    #[test]
    fn test_unicode_names_roundtrip() {
        let sessions = SessionManager::with_secret("s3cret");
        let token = sessions.issue("Zoë 🍺");
        assert_eq!(sessions.verify(&token), Some("Zoë 🍺".to_string()));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let sessions = SessionManager::with_secret("s3cret");
        let token = sessions.issue("alice");
        let (_, signature) = token.split_once('.').unwrap();
        let forged = format!(
            "{}.{}",
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("mallory"),
            signature
        );
        assert_eq!(sessions.verify(&forged), None);
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        let sessions = SessionManager::with_secret("s3cret");
        assert_eq!(sessions.verify("no-dot-here"), None);
        assert_eq!(sessions.verify(""), None);
        assert_eq!(sessions.verify("a.b.c"), None);
        assert_eq!(sessions.verify("!!!.???"), None);
    }

    #[test]
    fn test_secret_mismatch_rejected() {
        let issued = SessionManager::with_secret("one").issue("alice");
        assert_eq!(SessionManager::with_secret("two").verify(&issued), None);
    }

    #[test]
    fn test_current_name_from_cookies() {
        let sessions = SessionManager::with_secret("s3cret");
        let token = sessions.issue("bob");
        assert_eq!(
            sessions.current_name(&cookies_with(&token)),
            Some("bob".to_string())
        );
        assert_eq!(sessions.current_name(&HeaderVec::new()), None);
        assert_eq!(sessions.current_name(&cookies_with("abc.def")), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let sessions = SessionManager::with_secret("s3cret");
        let cookie = sessions.cookie_for("alice");
        assert!(cookie.starts_with("tally_session="));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }
}
