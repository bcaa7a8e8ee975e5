//! JWT settings loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_parse_or, env_required};

pub const MIN_SECRET_LEN: usize = 32;

/// 30 days
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 30 * 24 * 60 * 60;

/// JWT signing configuration.
///
/// Environment variables:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_EXPIRES_IN_SECS` (default: 2592000, i.e. 30 days)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in_secs: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            expires_in_secs: DEFAULT_EXPIRES_IN_SECS,
        })
    }

    pub fn with_expires_in_secs(mut self, secs: i64) -> Self {
        self.expires_in_secs = secs;
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        let expires_in_secs = env_parse_or("JWT_EXPIRES_IN_SECS", DEFAULT_EXPIRES_IN_SECS)?;
        if expires_in_secs <= 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_EXPIRES_IN_SECS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            secret,
            expires_in_secs,
        })
    }
}
