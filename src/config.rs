use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Minimum length of the token signing secret in bytes.
pub const MIN_JWT_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime, one year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database. `None` selects the in-memory store.
    pub database_url: Option<String>,
    /// The HMAC key used to sign bearer tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// The lifetime of an issued token in hours.
    pub token_ttl_hours: i64,
    /// The address the server listens on.
    pub bind_addr: SocketAddr,
    /// Where uploaded images are written.
    pub upload_dir: PathBuf,
    /// The built single-page client.
    pub static_dir: PathBuf,
    /// The body limit for image uploads.
    pub max_upload_bytes: usize,
    /// Burst size of the per-IP limiter on register and login. Zero disables it.
    pub auth_rate_limit_burst: u32,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Creates a new `Config` from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .context("JWT_SECRET must be set (generate with: openssl rand -hex 32)")?;

        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_JWT_SECRET_BYTES);
        }

        let token_ttl_hours: i64 = lookup("TOKEN_TTL_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse()
            .context("Invalid TOKEN_TTL_HOURS")?;

        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&token_ttl_hours) {
            anyhow::bail!("TOKEN_TTL_HOURS must be between 1 and {}", MAX_TOKEN_TTL_HOURS);
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            jwt_secret: Zeroizing::new(jwt_secret.into_bytes()),
            token_ttl_hours,
            bind_addr: lookup("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:5000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            upload_dir: PathBuf::from(lookup("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
            static_dir: PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| "dist".to_string())),
            max_upload_bytes: lookup("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|| "10485760".to_string())
                .parse()
                .context("Invalid MAX_UPLOAD_BYTES")?,
            auth_rate_limit_burst: lookup("AUTH_RATE_LIMIT_BURST")
                .unwrap_or_else(|| "20".to_string())
                .parse()
                .context("Invalid AUTH_RATE_LIMIT_BURST")?,
            cors_origins: lookup("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_secret_is_set() {
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.bind_addr, "127.0.0.1:5000".parse().unwrap());
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.static_dir, PathBuf::from("dist"));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.auth_rate_limit_burst, 20);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn missing_secret_is_rejected() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", "short")])).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("DATABASE_URL", "postgres://u:p@localhost/travels"),
            ("TOKEN_TTL_HOURS", "2"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("CORS_ORIGINS", "http://localhost:5173, http://example.test ,"),
            ("AUTH_RATE_LIMIT_BURST", "0"),
        ]))
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://u:p@localhost/travels")
        );
        assert_eq!(config.token_ttl_hours, 2);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:5173", "http://example.test"]
        );
        assert_eq!(config.auth_rate_limit_burst, 0);
    }

    #[test]
    fn blank_database_url_selects_memory_store() {
        let config =
            Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("DATABASE_URL", "  ")])).unwrap();
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_ttl_is_rejected() {
        assert!(
            Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("TOKEN_TTL_HOURS", "0")]))
                .is_err()
        );
        assert!(
            Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("TOKEN_TTL_HOURS", "abc")]))
                .is_err()
        );
    }

    #[test]
    fn ttl_is_capped_at_one_year() {
        let config =
            Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("TOKEN_TTL_HOURS", "8760")]))
                .unwrap();
        assert_eq!(config.token_ttl_hours, MAX_TOKEN_TTL_HOURS);

        for ttl in ["8761", "99999999999"] {
            let err =
                Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("TOKEN_TTL_HOURS", ttl)]))
                    .err()
                    .unwrap();
            assert!(err.to_string().contains("between 1 and 8760"));
        }
    }
}
