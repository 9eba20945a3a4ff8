use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::fmt;
use std::time::Duration;

/// Signing secret and expiry window of one token class.
#[derive(Clone)]
pub struct ClassKey {
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl ClassKey {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        ClassKey {
            secret: secret.into(),
            ttl,
        }
    }
}

impl fmt::Debug for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassKey")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access: ClassKey,
    pub refresh: ClassKey,
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }

    fn key(&self, class: TokenClass) -> &ClassKey {
        match class {
            TokenClass::Access => &self.cfg.access,
            TokenClass::Refresh => &self.cfg.refresh,
        }
    }

    fn window(&self, class: TokenClass) -> Result<(DateTime<Utc>, DateTime<Utc>), CodecError> {
        let iat_dt = Utc::now();
        let exp_dt = chrono::Duration::from_std(self.key(class).ttl)
            .ok()
            .and_then(|ttl| iat_dt.checked_add_signed(ttl))
            .ok_or_else(|| CodecError::Encode(format!("{} ttl out of range", class)))?;
        Ok((iat_dt, exp_dt))
    }

    fn sign_claims(&self, claims: &TokenClaims) -> Result<String, CodecError> {
        let key = self.key(claims.class());
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(&key.secret),
        )
        .map_err(|e| CodecError::Encode(e.to_string()))
    }
}

impl TokenCodec for JwtHs256Codec {
    fn sign_access(&self, user: UserRef) -> Result<Issued<AccessToken, AccessClaims>, CodecError> {
        let (iat_dt, exp_dt) = self.window(TokenClass::Access)?;
        let claims = AccessClaims {
            sub: user.id,
            v: user.token_version,
            iat: iat_dt.timestamp(),
            exp: exp_dt.timestamp(),
        };
        let token = self.sign_claims(&TokenClaims::Access(claims.clone()))?;
        Ok(Issued {
            token: AccessToken(token),
            claims,
            expires_at: exp_dt,
        })
    }

    fn sign_refresh(
        &self,
        user: UserRef,
        jti: Jti,
    ) -> Result<Issued<RefreshToken, RefreshClaims>, CodecError> {
        let (iat_dt, exp_dt) = self.window(TokenClass::Refresh)?;
        let claims = RefreshClaims {
            sub: user.id,
            v: user.token_version,
            jti,
            iat: iat_dt.timestamp(),
            exp: exp_dt.timestamp(),
        };
        let token = self.sign_claims(&TokenClaims::Refresh(claims.clone()))?;
        Ok(Issued {
            token: RefreshToken(token),
            claims,
            expires_at: exp_dt,
        })
    }

    fn verify(&self, token: &str, expected: TokenClass) -> Result<TokenClaims, CodecError> {
        let key = self.key(expected);
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = true;
        v.leeway = 0;
        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&key.secret), &v)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => CodecError::Expired,
                ErrorKind::InvalidSignature => CodecError::SignatureInvalid,
                _ => CodecError::Malformed(e.to_string()),
            })?;

        match (expected, data.claims) {
            (TokenClass::Access, claims @ TokenClaims::Access(_))
            | (TokenClass::Refresh, claims @ TokenClaims::Refresh(_)) => Ok(claims),
            (expected, claims) => Err(CodecError::WrongType {
                expected,
                found: claims.class(),
            }),
        }
    }

    fn ttl(&self, class: TokenClass) -> Duration {
        self.key(class).ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS_SECRET: &[u8] = b"test-access-secret";
    const REFRESH_SECRET: &[u8] = b"test-refresh-secret";

    fn codec() -> JwtHs256Codec {
        JwtHs256Codec::new(JwtConfig {
            access: ClassKey::new(ACCESS_SECRET, Duration::from_secs(15 * 60)),
            refresh: ClassKey::new(REFRESH_SECRET, Duration::from_secs(7 * 24 * 60 * 60)),
        })
    }

    fn user(id: i64, version: u32) -> UserRef {
        UserRef::new(UserId(id), TokenVersion(version))
    }

    fn forge(claims: &serde_json::Value, secret: &[u8]) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    #[test]
    fn access_token_carries_subject_version_and_ttl() {
        let codec = codec();
        let issued = codec.sign_access(user(1, 0)).unwrap();
        assert_eq!(issued.claims.exp - issued.claims.iat, 15 * 60);

        match codec.verify(&issued.token.0, TokenClass::Access).unwrap() {
            TokenClaims::Access(claims) => {
                assert_eq!(claims.sub, UserId(1));
                assert_eq!(claims.v, TokenVersion(0));
                assert_eq!(claims, issued.claims);
            }
            other => panic!("unexpected claims: {other:?}"),
        }
    }

    #[test]
    fn refresh_token_round_trips_jti() {
        let codec = codec();
        let jti = Jti::new_v4();
        let issued = codec.sign_refresh(user(7, 3), jti).unwrap();
        let claims = codec.verify(&issued.token.0, TokenClass::Refresh).unwrap();
        assert_eq!(claims, TokenClaims::Refresh(issued.claims));
        assert_eq!(claims.subject(), UserId(7));
        assert_eq!(claims.version(), TokenVersion(3));
    }

    #[test]
    fn class_secrets_are_not_interchangeable() {
        let codec = codec();
        let access = codec.sign_access(user(1, 0)).unwrap();
        assert!(matches!(
            codec.verify(&access.token.0, TokenClass::Refresh),
            Err(CodecError::SignatureInvalid)
        ));
    }

    #[test]
    fn type_tag_is_checked_even_when_signature_verifies() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let forged = forge(
            &serde_json::json!({
                "sub": "1", "v": 0, "typ": "access", "iat": now, "exp": now + 600
            }),
            REFRESH_SECRET,
        );
        assert!(matches!(
            codec.verify(&forged, TokenClass::Refresh),
            Err(CodecError::WrongType {
                expected: TokenClass::Refresh,
                found: TokenClass::Access
            })
        ));
    }

    #[test]
    fn missing_type_tag_is_malformed() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let untagged = forge(
            &serde_json::json!({ "sub": "1", "v": 0, "iat": now, "exp": now + 600 }),
            ACCESS_SECRET,
        );
        assert!(matches!(
            codec.verify(&untagged, TokenClass::Access),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let codec = codec();
        let now = Utc::now().timestamp();
        let stale = forge(
            &serde_json::json!({
                "sub": "1", "v": 0, "typ": "access", "iat": now - 1000, "exp": now - 100
            }),
            ACCESS_SECRET,
        );
        assert!(matches!(
            codec.verify(&stale, TokenClass::Access),
            Err(CodecError::Expired)
        ));
    }

    #[test]
    fn garbage_and_tampering_are_rejected() {
        let codec = codec();
        assert!(codec.verify("not-a-token", TokenClass::Access).is_err());

        let issued = codec.sign_access(user(1, 0)).unwrap();
        let mut parts: Vec<&str> = issued.token.0.split('.').collect();
        let other = codec.sign_access(user(2, 0)).unwrap();
        let other_payload = other.token.0.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;
        let spliced = parts.join(".");
        assert!(matches!(
            codec.verify(&spliced, TokenClass::Access),
            Err(CodecError::SignatureInvalid)
        ));
    }
}
