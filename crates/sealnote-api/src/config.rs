use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use sealnote_crypto::EnvelopeKey;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Process-wide settings, built once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub envelope_key: EnvelopeKey,
    pub jwt_secret: String,
    /// Skip the ownership check on by-id note routes. Reproduces an
    /// object-level authorization flaw on purpose; off unless set explicitly.
    pub allow_idor: bool,
    pub token_ttl: Duration,
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Settings {
    /// Read settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_key = lookup("SEALNOTE_ENVELOPE_KEY")
            .filter(|v| !v.is_empty())
            .context("SEALNOTE_ENVELOPE_KEY is not set")?;
        let envelope_key = EnvelopeKey::parse(&raw_key)
            .context("SEALNOTE_ENVELOPE_KEY must be 32 bytes of text or base64 of 32 bytes")?;

        let jwt_secret = lookup("SEALNOTE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("SEALNOTE_JWT_SECRET is unset or still a placeholder");
        }

        let allow_idor = match lookup("SEALNOTE_ALLOW_IDOR").as_deref() {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => bail!("SEALNOTE_ALLOW_IDOR must be true or false, got {:?}", other),
        };

        let token_ttl = match lookup("SEALNOTE_TOKEN_TTL_SECS") {
            Some(v) => {
                let secs: u64 = v.parse().context("SEALNOTE_TOKEN_TTL_SECS must be an integer")?;
                if secs == 0 {
                    bail!("SEALNOTE_TOKEN_TTL_SECS must be positive");
                }
                let ttl = Duration::from_secs(secs);
                // Every token expiry must stay a representable timestamp.
                let expiry = chrono::Duration::from_std(ttl)
                    .ok()
                    .and_then(|d| chrono::Utc::now().checked_add_signed(d));
                if expiry.is_none() {
                    bail!("SEALNOTE_TOKEN_TTL_SECS is too large: {}", secs);
                }
                ttl
            }
            None => Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
        };

        let host = lookup("SEALNOTE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("SEALNOTE_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("SEALNOTE_PORT must be a port number")?;
        let db_path: PathBuf = lookup("SEALNOTE_DB_PATH")
            .unwrap_or_else(|| "sealnote.db".into())
            .into();

        Ok(Self {
            envelope_key,
            jwt_secret,
            allow_idor,
            token_ttl,
            host,
            port,
            db_path,
        })
    }
}
