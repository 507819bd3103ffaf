//! Anti-forgery tokens for the subscription form.
//!
//! Tokens are stateless: a token is a truncated HMAC over the action name and
//! the current "tick", where a tick is half of the configured lifetime. A
//! token issued in the current tick or the one before it is accepted, so a
//! rendered form stays usable for between half and all of the lifetime.
//!
//! Since nothing is stored, a token can be replayed within its window; it
//! only proves that the request came from a page this server rendered.

use chrono::DateTime;
use chrono::Utc;
use hmac::Hmac;
use hmac::Mac;
use secrecy::ExposeSecret;
use secrecy::Secret;
use sha2::Sha256;

/// Bytes of the HMAC tag kept in the token (hex-encoded, so 20 characters)
const TOKEN_BYTES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceAge {
    /// Issued during the current tick
    Fresh,
    /// Issued during the previous tick
    Stale,
}

#[derive(Clone)]
pub struct NonceIssuer {
    secret: Secret<String>,
    /// Length of one tick, i.e. half the lifetime
    tick_seconds: i64,
}

impl NonceIssuer {
    pub fn new(
        secret: Secret<String>,
        lifetime_seconds: i64,
    ) -> Self {
        Self {
            secret,
            tick_seconds: (lifetime_seconds / 2).max(1),
        }
    }

    pub fn create(
        &self,
        action: &str,
    ) -> Result<String, anyhow::Error> {
        self.create_at(action, Utc::now())
    }

    pub fn create_at(
        &self,
        action: &str,
        now: DateTime<Utc>,
    ) -> Result<String, anyhow::Error> {
        let tag = self.mac(action, self.tick(now))?.finalize().into_bytes();
        Ok(hex::encode(&tag[..TOKEN_BYTES]))
    }

    pub fn verify(
        &self,
        action: &str,
        nonce: &str,
    ) -> Option<NonceAge> {
        self.verify_at(action, nonce, Utc::now())
    }

    /// `None` for anything that is not a token issued for `action` within the
    /// last two ticks, including malformed input
    pub fn verify_at(
        &self,
        action: &str,
        nonce: &str,
        now: DateTime<Utc>,
    ) -> Option<NonceAge> {
        let supplied = hex::decode(nonce).ok()?;
        if supplied.len() != TOKEN_BYTES {
            return None;
        }
        let tick = self.tick(now);
        [(tick, NonceAge::Fresh), (tick - 1, NonceAge::Stale)]
            .into_iter()
            .find(|(tick, _)| {
                // constant-time comparison against the left part of the tag
                self.mac(action, *tick)
                    .is_ok_and(|mac| mac.verify_truncated_left(&supplied).is_ok())
            })
            .map(|(_, age)| age)
    }

    fn tick(
        &self,
        now: DateTime<Utc>,
    ) -> i64 {
        // ceil(now / tick_seconds)
        (now.timestamp() + self.tick_seconds - 1).div_euclid(self.tick_seconds)
    }

    fn mac(
        &self,
        action: &str,
        tick: i64,
    ) -> Result<Hmac<Sha256>, anyhow::Error> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())?;
        mac.update(format!("{tick}|{action}").as_bytes());
        Ok(mac)
    }
}
