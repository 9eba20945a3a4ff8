use std::fmt;

const NONCE_LEN: usize = 32;

/// Opaque single-use value binding an outbound login redirect to its callback.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct StateNonce(pub String);

impl StateNonce {
    pub fn generate() -> Self {
        StateNonce(nanoid::nanoid!(NONCE_LEN))
    }

    /// Cheap shape check run before any store round trip.
    pub fn is_well_formed(raw: &str) -> bool {
        raw.len() == NONCE_LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StateNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
