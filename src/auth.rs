/// Dashboard credentials
///
/// A single username plus a bcrypt password hash, read from
/// `BASIC_AUTH_USERNAME` / `BASIC_AUTH_PASSWORD_HASH`. The username is
/// compared in constant time and both checks always run.
use crate::errors::{CoinOpsError, CoinOpsResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use std::fmt;
use subtle::ConstantTimeEq;

pub const USERNAME_ENV: &str = "BASIC_AUTH_USERNAME";
pub const PASSWORD_HASH_ENV: &str = "BASIC_AUTH_PASSWORD_HASH";

const GENERATED_USERNAME_LEN: usize = 12;
const GENERATED_PASSWORD_LEN: usize = 24;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password_hash: String,
}

// keeps the hash out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: &str, password_hash: &str) -> Self {
        Self {
            username: username.to_string(),
            password_hash: password_hash.trim().to_string(),
        }
    }

    pub fn from_password(username: &str, password: &str) -> CoinOpsResult<Self> {
        Ok(Self::new(username, &hash_password(password)?))
    }

    /// Both variables must be set and non-empty
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_ENV).filter(|v| !v.is_empty())?;
        let hash = lookup(PASSWORD_HASH_ENV).filter(|v| !v.is_empty())?;
        Some(Self::new(&username, &hash))
    }

    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = bool::from(self.username.as_bytes().ct_eq(username.as_bytes()));
        // a malformed stored hash never matches
        let password_ok = bcrypt::verify(password, &self.password_hash).unwrap_or(false);
        user_ok & password_ok
    }

    /// `.env` lines for these credentials
    pub fn to_env_lines(&self) -> String {
        format!(
            "{}={}\n{}={}\n",
            USERNAME_ENV, self.username, PASSWORD_HASH_ENV, self.password_hash
        )
    }
}

/// Freshly generated credentials; the plaintext exists only here
pub struct GeneratedCredentials {
    pub credentials: Credentials,
    pub password: String,
}

pub fn generate_credentials() -> CoinOpsResult<GeneratedCredentials> {
    let username = generate_secure_string(GENERATED_USERNAME_LEN);
    let password = generate_secure_string(GENERATED_PASSWORD_LEN);
    Ok(GeneratedCredentials {
        credentials: Credentials::from_password(&username, &password)?,
        password,
    })
}

/// Salted bcrypt hash in `$2b$` form
pub fn hash_password(password: &str) -> CoinOpsResult<String> {
    bcrypt::hash(password, HASH_COST)
        .map_err(|e| CoinOpsError::Auth(format!("failed to hash password: {}", e)))
}

/// Random alphanumeric string from the OS RNG
pub fn generate_secure_string(len: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Decode an `Authorization: Basic ...` header value into (user, password)
pub fn parse_basic_auth(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}
