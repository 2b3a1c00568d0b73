use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use market::Thresholds;

use crate::error::ConfigError;
use crate::mail::Mailbox;

/// A credential that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(v: impl Into<String>) -> Self {
        Self(v.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Everything the monitor needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // =========================
    // Market data
    // =========================
    /// Sent as `x-api-key` on every OpenSea request.
    pub opensea_api_key: Secret,
    pub opensea_base_url: String,

    /// Collection being watched (OpenSea slug).
    pub collection_slug: String,

    /// Per-request timeout for every outbound HTTP call.
    pub http_timeout: Duration,

    // =========================
    // Mail
    // =========================
    pub mailjet_api_key: Secret,
    pub mailjet_secret_key: Secret,
    pub mailjet_base_url: String,
    pub mail_from: Mailbox,
    pub mail_to: Mailbox,

    // =========================
    // Storage
    // =========================
    /// Database connection string; doubles as the storage credential.
    pub database_url: Secret,

    /// Table holding the snapshot record. Validated as a plain SQL identifier
    /// because it is spliced into statements.
    pub table_name: String,
    pub partition_key: String,

    // =========================
    // Monitor
    // =========================
    pub poll_interval: Duration,

    /// Send a "first data" notice when no snapshot was stored yet.
    pub notify_on_bootstrap: bool,

    pub thresholds: Thresholds,

    /// JSON log output (production) instead of pretty output.
    pub json_logs: bool,
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        env_file_loaded(dotenvy::dotenv().map(|_| ()))?;

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let table_name = vars.required("TABLE_NAME")?;
        validate_identifier("TABLE_NAME", &table_name)?;

        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            significant_offer_delta: vars
                .delta("OFFER_ALERT_DELTA", defaults.significant_offer_delta)?,
            minor_offer_delta: vars.delta("OFFER_NOISE_DELTA", defaults.minor_offer_delta)?,
        };
        if thresholds.minor_offer_delta >= thresholds.significant_offer_delta {
            return Err(ConfigError::InvalidValue {
                name: "OFFER_NOISE_DELTA",
                reason: "must be smaller than OFFER_ALERT_DELTA".into(),
            });
        }

        let poll_secs: u64 = vars.parsed("POLL_INTERVAL_SECS", 10)?;
        if poll_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "POLL_INTERVAL_SECS",
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            opensea_api_key: Secret::new(vars.required("OPENSEA_API_KEY")?),
            opensea_base_url: vars.or("OPENSEA_BASE_URL", "https://api.opensea.io"),
            collection_slug: vars.or("COLLECTION_SLUG", "99originals"),
            http_timeout: Duration::from_secs(vars.parsed("HTTP_TIMEOUT_SECS", 10)?),

            mailjet_api_key: Secret::new(vars.required("MAILJET_API_KEY")?),
            mailjet_secret_key: Secret::new(vars.required("MAILJET_SECRET_KEY")?),
            mailjet_base_url: vars.or("MAILJET_BASE_URL", "https://api.mailjet.com"),
            mail_from: Mailbox {
                email: vars.required("MAIL_FROM")?,
                name: vars.required("MAIL_FROM_NAME")?,
            },
            mail_to: Mailbox {
                email: vars.required("MAIL_TO")?,
                name: vars.required("MAIL_TO_NAME")?,
            },

            database_url: Secret::new(vars.required("DATABASE_URL")?),
            table_name,
            partition_key: vars.required("PARTITION_KEY")?,

            poll_interval: Duration::from_secs(poll_secs),
            notify_on_bootstrap: vars.parsed("NOTIFY_ON_BOOTSTRAP", false)?,
            thresholds,
            json_logs: vars.or("APP_ENV", "development") == "production",
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue {
                    name,
                    reason: format!("{raw:?}: {e}"),
                }),
        }
    }

    /// Offer threshold: a finite, non-negative number.
    fn delta(&self, name: &'static str, default: f64) -> Result<f64, ConfigError> {
        let v: f64 = self.parsed(name, default)?;
        if v.is_finite() && v >= 0.0 {
            Ok(v)
        } else {
            Err(ConfigError::InvalidValue {
                name,
                reason: format!("{v} is not a finite non-negative number"),
            })
        }
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn env_file_loaded(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Err(e) if !e.not_found() => Err(ConfigError::EnvFile(e)),
        _ => Ok(()),
    }
}

fn validate_identifier(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid_head = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_tail = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_head && valid_tail {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            name,
            reason: format!("{value:?} is not a valid table identifier"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("OPENSEA_API_KEY", "os-key"),
            ("MAILJET_API_KEY", "mj-key"),
            ("MAILJET_SECRET_KEY", "mj-secret"),
            ("MAIL_FROM", "bot@example.com"),
            ("MAIL_FROM_NAME", "Lighthouse production"),
            ("MAIL_TO", "me@example.com"),
            ("MAIL_TO_NAME", "Me"),
            ("DATABASE_URL", "sqlite://lighthouse.db"),
            ("TABLE_NAME", "lighthouse"),
            ("PARTITION_KEY", "99originals"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_applied() {
        let cfg = load(&base()).unwrap();

        assert_eq!(cfg.collection_slug, "99originals");
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert_eq!(cfg.thresholds, Thresholds::default());
        assert!(!cfg.notify_on_bootstrap);
        assert!(!cfg.json_logs);
        assert_eq!(cfg.mail_to.name, "Me");
    }

    #[test]
    fn missing_required_variable_is_named() {
        let mut vars = base();
        vars.remove("MAIL_TO_NAME");

        let err = load(&vars).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MAIL_TO_NAME")));
        assert!(err.to_string().contains("MAIL_TO_NAME"));
    }

    #[test]
    fn blank_required_variable_counts_as_missing() {
        let mut vars = base();
        vars.insert("OPENSEA_API_KEY", "  ");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("OPENSEA_API_KEY")
        ));
    }

    #[test]
    fn table_name_must_be_identifier() {
        let mut vars = base();
        vars.insert("TABLE_NAME", "snapshots; DROP TABLE x");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidValue { name: "TABLE_NAME", .. }
        ));
    }

    #[test]
    fn malformed_optional_value_is_rejected() {
        let mut vars = base();
        vars.insert("POLL_INTERVAL_SECS", "often");
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidValue { name: "POLL_INTERVAL_SECS", .. }
        ));
    }

    #[test]
    fn thresholds_must_be_ordered() {
        let mut vars = base();
        vars.insert("OFFER_ALERT_DELTA", "0.01");
        vars.insert("OFFER_NOISE_DELTA", "0.1");
        assert!(load(&vars).is_err());
    }

    #[test]
    fn thresholds_reject_nan_infinite_and_negative() {
        for (name, raw) in [
            ("OFFER_ALERT_DELTA", "NaN"),
            ("OFFER_ALERT_DELTA", "inf"),
            ("OFFER_NOISE_DELTA", "-0.1"),
            ("OFFER_NOISE_DELTA", "nan"),
        ] {
            let mut vars = base();
            vars.insert(name, raw);
            match load(&vars) {
                Err(ConfigError::InvalidValue { name: got, .. }) => assert_eq!(got, name),
                other => panic!("{name}={raw} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn custom_thresholds_are_read() {
        let mut vars = base();
        vars.insert("OFFER_ALERT_DELTA", "0.25");
        vars.insert("OFFER_NOISE_DELTA", "0");

        let cfg = load(&vars).unwrap();
        assert_eq!(cfg.thresholds.significant_offer_delta, 0.25);
        assert_eq!(cfg.thresholds.minor_offer_delta, 0.0);
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(env_file_loaded(Err(missing)).is_ok());
        assert!(env_file_loaded(Ok(())).is_ok());
    }

    #[test]
    fn malformed_env_file_fails_startup() {
        let bad = dotenvy::Error::LineParse("KEY VALUE".into(), 3);
        let err = env_file_loaded(Err(bad)).unwrap_err();
        assert!(matches!(err, ConfigError::EnvFile(_)));
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn overrides_are_read() {
        let mut vars = base();
        vars.insert("NOTIFY_ON_BOOTSTRAP", "true");
        vars.insert("APP_ENV", "production");
        vars.insert("COLLECTION_SLUG", "other");

        let cfg = load(&vars).unwrap();
        assert!(cfg.notify_on_bootstrap);
        assert!(cfg.json_logs);
        assert_eq!(cfg.collection_slug, "other");
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let cfg = load(&base()).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("mj-secret"));
        assert!(dbg.contains("Secret(***)"));
    }
}
