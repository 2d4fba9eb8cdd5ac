//! Session and asset identity.
//!
//! Every file a session asks the services to produce is named under the
//! session token, so concurrent sessions writing into the same dated output
//! directory do not collide.

use std::fmt;

use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Prefix of every session token.
pub const SESSION_PREFIX: &str = "Gen";

/// Length of the random salt mixed into derived filenames.
pub const SALT_LEN: usize = 6;

const SALT_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Process-lifetime session token (e.g. `Gen48213`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Mint a new random session token.
    pub fn generate() -> Self {
        let n: u32 = rand::rng().random_range(10_000..=99_999);
        Self(format!("{}{}", SESSION_PREFIX, n))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Random lowercase base-36 salt.
pub fn random_salt() -> String {
    let mut rng = rand::rng();
    (0..SALT_LEN)
        .map(|_| SALT_ALPHABET[rng.random_range(0..SALT_ALPHABET.len())] as char)
        .collect()
}

/// Filename base of one asset slot: `{session}_{salt}_{slot_number}`.
///
/// The slot number is 1-based so downstream services can sort a session's
/// images by the trailing sequence. The value is assigned once per slot and
/// reused by every regeneration of that slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FilenameBase(String);

impl FilenameBase {
    /// Derive a filename base for the 0-based `slot_index`.
    pub fn new(session: &SessionId, slot_index: usize) -> Self {
        Self::with_salt(session, &random_salt(), slot_index)
    }

    /// Derive a filename base with an explicit salt.
    pub fn with_salt(session: &SessionId, salt: &str, slot_index: usize) -> Self {
        Self(format!("{}_{}_{}", session, salt, slot_index + 1))
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// 1-based slot number encoded at the end of the name.
    pub fn slot_number(&self) -> Option<usize> {
        self.0.rsplit('_').next()?.parse().ok()
    }

    /// Whether this name belongs to `session`.
    pub fn belongs_to(&self, session: &SessionId) -> bool {
        self.0
            .strip_prefix(session.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilenameBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Save name handed to the voiceover service: `{session}_{salt}`.
pub fn voiceover_save_name(session: &SessionId) -> String {
    format!("{}_{}", session, random_salt())
}
