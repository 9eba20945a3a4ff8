use crate::logger::*;
use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_ACCESS_SECRET: &str = "access_secret";
pub const DEFAULT_REFRESH_SECRET: &str = "refresh_secret";
pub const DEFAULT_HASH_SECRET: &str = "token_hash_secret";
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub http: Http,
    pub log: Log,
    pub store: Store,
    #[serde(default)]
    pub token: Token,
    pub oauth: OAuth,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "redis" or "memory"
    pub url: Option<String>,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Token {
    pub access_secret: String,
    pub access_ttl: String,
    pub refresh_secret: String,
    pub refresh_ttl: String,
    pub hash_secret: String,
    pub check_access_version: bool,
}

impl Default for Token {
    fn default() -> Self {
        Token {
            access_secret: DEFAULT_ACCESS_SECRET.to_string(),
            access_ttl: "15m".to_string(),
            refresh_secret: DEFAULT_REFRESH_SECRET.to_string(),
            refresh_ttl: "7d".to_string(),
            hash_secret: DEFAULT_HASH_SECRET.to_string(),
            check_access_version: false,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_secret", &"<redacted>")
            .field("refresh_ttl", &self.refresh_ttl)
            .field("hash_secret", &"<redacted>")
            .field("check_access_version", &self.check_access_version)
            .finish()
    }
}

impl Token {
    pub fn access_ttl(&self) -> Duration {
        parse_ttl("token.access_ttl", &self.access_ttl, DEFAULT_ACCESS_TTL)
    }

    pub fn refresh_ttl(&self) -> Duration {
        parse_ttl("token.refresh_ttl", &self.refresh_ttl, DEFAULT_REFRESH_TTL)
    }

    /// Names of the secrets still at their built-in, publicly known values.
    pub fn default_secrets(&self) -> Vec<&'static str> {
        let mut found = Vec::new();
        if self.access_secret == DEFAULT_ACCESS_SECRET {
            found.push("token.access_secret");
        }
        if self.refresh_secret == DEFAULT_REFRESH_SECRET {
            found.push("token.refresh_secret");
        }
        if self.hash_secret == DEFAULT_HASH_SECRET {
            found.push("token.hash_secret");
        }
        found
    }
}

#[derive(Debug, Deserialize)]
pub struct OAuth {
    pub backend: String, // "fake" or "disabled"
    /// The fake backend lets any caller choose the user; development only.
    #[serde(default)]
    pub allow_fake_login: bool,
    pub authorize_url: String,
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
}

/// Parses `15m`, `7d`, `1h 30m` and the like. Anything unparseable or zero
/// falls back, with a warning.
pub fn parse_ttl(name: &str, raw: &str, fallback: Duration) -> Duration {
    match humantime::parse_duration(raw.trim()) {
        Ok(ttl) if !ttl.is_zero() => ttl,
        _ => {
            warn!(
                setting = name,
                value = raw,
                fallback = %humantime::format_duration(fallback),
                "invalid duration, using fallback"
            );
            fallback
        }
    }
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Loads the TOML file, then lets `KEYWARD__SECTION__KEY` variables override it.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(
            Environment::with_prefix("KEYWARD")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_strings_parse() {
        assert_eq!(parse_ttl("t", "15m", DEFAULT_ACCESS_TTL), Duration::from_secs(900));
        assert_eq!(parse_ttl("t", "7d", DEFAULT_ACCESS_TTL), Duration::from_secs(604_800));
        assert_eq!(parse_ttl("t", " 1h 30m ", DEFAULT_ACCESS_TTL), Duration::from_secs(5400));
    }

    #[test]
    fn bad_ttl_strings_fall_back() {
        assert_eq!(parse_ttl("t", "seven days", DEFAULT_REFRESH_TTL), DEFAULT_REFRESH_TTL);
        assert_eq!(parse_ttl("t", "", DEFAULT_REFRESH_TTL), DEFAULT_REFRESH_TTL);
        assert_eq!(parse_ttl("t", "0s", DEFAULT_ACCESS_TTL), DEFAULT_ACCESS_TTL);
    }

    #[test]
    fn unconfigured_token_section_uses_documented_defaults() {
        let token = Token::default();
        assert_eq!(token.access_ttl(), DEFAULT_ACCESS_TTL);
        assert_eq!(token.refresh_ttl(), DEFAULT_REFRESH_TTL);
        assert_eq!(token.default_secrets().len(), 3);
        assert!(!format!("{:?}", token).contains(DEFAULT_HASH_SECRET));
    }

    #[test]
    fn dev_settings_load() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.oauth.backend, "fake");
        assert!(settings.oauth.allow_fake_login);
    }

    #[test]
    fn release_settings_keep_fake_login_off() {
        let settings = parse_settings(Some("settings/release.toml")).unwrap();
        assert_eq!(settings.oauth.backend, "disabled");
        assert!(!settings.oauth.allow_fake_login);
        assert_eq!(settings.store.backend, "redis");
    }
}
