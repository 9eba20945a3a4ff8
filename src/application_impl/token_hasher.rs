use crate::application_port::AuthError;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Keyed hash of refresh tokens as they are recorded in the store.
///
/// The key is distinct from the signing secrets, so a dump of the store alone
/// neither reveals usable tokens nor lets anyone mint matching records.
#[derive(Clone)]
pub struct TokenHasher {
    key: Vec<u8>,
}

impl TokenHasher {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        TokenHasher { key: key.into() }
    }

    pub fn hmac_hex(&self, token: &str) -> Result<String, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        mac.update(token.as_bytes());
        let out = mac.finalize().into_bytes();
        Ok(hex::encode(out))
    }

    /// Recomputes the hash of `token` and compares it to `stored_hex` in constant time.
    pub fn matches(&self, token: &str, stored_hex: &str) -> Result<bool, AuthError> {
        let computed = self.hmac_hex(token)?;
        Ok(constant_time_eq(computed.as_bytes(), stored_hex.as_bytes()))
    }
}

/// Equal-length inputs are compared without early exit.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hint::black_box;
    use std::time::{Duration, Instant};

    #[test]
    fn hash_depends_on_key_and_token() {
        let hasher = TokenHasher::new("k1");
        let a = hasher.hmac_hex("token").unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, hasher.hmac_hex("token").unwrap());
        assert_ne!(a, hasher.hmac_hex("token2").unwrap());
        assert_ne!(a, TokenHasher::new("k2").hmac_hex("token").unwrap());
    }

    #[test]
    fn matches_only_the_recorded_token() {
        let hasher = TokenHasher::new("k1");
        let stored = hasher.hmac_hex("token").unwrap();
        assert!(hasher.matches("token", &stored).unwrap());
        assert!(!hasher.matches("other", &stored).unwrap());
        assert!(!hasher.matches("token", &stored[..63]).unwrap());
        assert!(!hasher.matches("token", "").unwrap());
    }

    #[test]
    fn first_and_last_byte_mismatches_are_both_detected() {
        let a = [7u8; 64];
        let mut first = a;
        first[0] ^= 1;
        let mut last = a;
        last[63] ^= 1;
        assert!(constant_time_eq(&a, &a));
        assert!(!constant_time_eq(&a, &first));
        assert!(!constant_time_eq(&a, &last));
    }

    fn time_comparisons(a: &[u8], b: &[u8], rounds: u32) -> Duration {
        let start = Instant::now();
        for _ in 0..rounds {
            black_box(constant_time_eq(black_box(a), black_box(b)));
        }
        start.elapsed()
    }

    #[test]
    #[ignore = "timing spot check, run manually on a quiet machine"]
    fn match_and_mismatch_take_similar_time() {
        let hasher = TokenHasher::new("k1");
        let stored = hasher.hmac_hex("token").unwrap();
        let mut early = stored.clone().into_bytes();
        early[0] = if early[0] == b'0' { b'1' } else { b'0' };

        let rounds = 200_000;
        // warm up
        time_comparisons(stored.as_bytes(), stored.as_bytes(), rounds);
        let equal = time_comparisons(stored.as_bytes(), stored.as_bytes(), rounds);
        let differ = time_comparisons(stored.as_bytes(), &early, rounds);

        let ratio = equal.as_secs_f64() / differ.as_secs_f64();
        assert!(
            (0.5..2.0).contains(&ratio),
            "equal={equal:?} differ={differ:?} ratio={ratio}"
        );
    }
}
