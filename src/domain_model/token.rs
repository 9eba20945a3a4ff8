use crate::domain_model::{TokenVersion, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique id of one refresh token; second half of its store key.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jti(pub uuid::Uuid);

impl Jti {
    pub fn new_v4() -> Self {
        Jti(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for Jti {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Jti {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(Jti)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenClass::Access => f.write_str("access"),
            TokenClass::Refresh => f.write_str("refresh"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: UserId,
    pub v: TokenVersion,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: UserId,
    pub v: TokenVersion,
    pub jti: Jti,
    pub iat: i64,
    pub exp: i64,
}

/// Claim set of either token class, discriminated by the `typ` claim.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "lowercase")]
pub enum TokenClaims {
    Access(AccessClaims),
    Refresh(RefreshClaims),
}

impl TokenClaims {
    pub fn class(&self) -> TokenClass {
        match self {
            TokenClaims::Access(_) => TokenClass::Access,
            TokenClaims::Refresh(_) => TokenClass::Refresh,
        }
    }

    pub fn subject(&self) -> UserId {
        match self {
            TokenClaims::Access(c) => c.sub,
            TokenClaims::Refresh(c) => c.sub,
        }
    }

    pub fn version(&self) -> TokenVersion {
        match self {
            TokenClaims::Access(c) => c.v,
            TokenClaims::Refresh(c) => c.v,
        }
    }
}
