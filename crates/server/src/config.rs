use std::{env, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env` when present)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub oidc_issuer_url: String,
    pub bind_address: String,
    pub upload_root: PathBuf,
    /// Checkout is unavailable without it
    pub stripe_secret_key: Option<String>,
    /// Payment confirmations are rejected without it
    pub stripe_webhook_secret: Option<String>,
    pub public_base_url: String,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the real environment still applies
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let run_migrations = match get("RUN_MIGRATIONS") {
            None => true,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "RUN_MIGRATIONS",
                        value,
                    });
                }
            },
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            oidc_issuer_url: required("OIDC_ISSUER_URL")?,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            upload_root: get("UPLOAD_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./uploads")),
            stripe_secret_key: get("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: get("STRIPE_WEBHOOK_SECRET"),
            public_base_url: get("PUBLIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            run_migrations,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/lms"),
            ("OIDC_ISSUER_URL", "https://idp.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3000");
        assert_eq!(config.upload_root, PathBuf::from("./uploads"));
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert!(config.run_migrations);
        assert_eq!(config.stripe_secret_key, None);
    }

    #[test]
    fn test_missing_required_key() {
        let err = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/lms")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("OIDC_ISSUER_URL"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/lms"),
            ("OIDC_ISSUER_URL", "https://idp.example.com"),
            ("PUBLIC_BASE_URL", "https://lms.example.com/"),
            ("RUN_MIGRATIONS", "false"),
            ("STRIPE_SECRET_KEY", "sk_test_123"),
        ]))
        .unwrap();

        assert_eq!(config.public_base_url, "https://lms.example.com");
        assert!(!config.run_migrations);
        assert_eq!(config.stripe_secret_key.as_deref(), Some("sk_test_123"));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/lms"),
            ("OIDC_ISSUER_URL", "https://idp.example.com"),
            ("RUN_MIGRATIONS", "maybe"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RUN_MIGRATIONS", .. }));
    }
}
