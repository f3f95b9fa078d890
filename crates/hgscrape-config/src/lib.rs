//! Configuration for the hgscrape exporter.
//!
//! Layered with figment: built-in defaults, then an optional TOML file,
//! then environment variables (`ROUTER_HOST`, `POLLING_INTERVAL_SECONDS`,
//! ...). Keys in the file use the same names in lowercase. The result is
//! validated and translated into `hgscrape_core::ExporterConfig` plus the
//! metrics listen address.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize, de};
use thiserror::Error;
use tracing::warn;
use url::Url;

use hgscrape_core::{ExporterConfig, RouterConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{env} is not set (or `{key}` in the config file)")]
    Missing { key: &'static str, env: &'static str },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Config struct ───────────────────────────────────────────────────

/// Environment variables read into the config, in key form.
const ENV_KEYS: &[&str] = &[
    "router_host",
    "router_scheme",
    "router_username",
    "router_password",
    "polling_interval_seconds",
    "exporter_port",
    "exporter_address",
    "wan_multiplier_enabled",
    "metric_prefix",
    "request_timeout_seconds",
    "accept_invalid_certs",
];

/// Poll intervals below this are allowed but hammer the router's login page.
const MIN_RECOMMENDED_INTERVAL_SECS: u64 = 30;

/// Raw configuration as merged from all layers, before validation.
#[derive(Deserialize, Serialize)]
pub struct Config {
    /// Router host, optionally with `:port`.
    #[serde(default, deserialize_with = "scalar_string")]
    pub router_host: Option<String>,

    /// `http` or `https`.
    pub router_scheme: String,

    #[serde(default, deserialize_with = "scalar_string")]
    pub router_username: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub router_password: Option<String>,

    pub polling_interval_seconds: u64,

    pub exporter_port: u16,

    pub exporter_address: IpAddr,

    #[serde(deserialize_with = "flexible_bool")]
    pub wan_multiplier_enabled: bool,

    pub metric_prefix: String,

    pub request_timeout_seconds: u64,

    #[serde(deserialize_with = "flexible_bool")]
    pub accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            router_host: None,
            router_scheme: "http".into(),
            router_username: None,
            router_password: None,
            polling_interval_seconds: 60,
            exporter_port: 8081,
            exporter_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            wan_multiplier_enabled: true,
            metric_prefix: hgscrape_core::config::DEFAULT_METRIC_PREFIX.into(),
            request_timeout_seconds: 30,
            accept_invalid_certs: false,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("router_host", &self.router_host)
            .field("router_scheme", &self.router_scheme)
            .field("router_username", &self.router_username)
            .field(
                "router_password",
                &self.router_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("polling_interval_seconds", &self.polling_interval_seconds)
            .field("exporter_port", &self.exporter_port)
            .field("exporter_address", &self.exporter_address)
            .field("wan_multiplier_enabled", &self.wan_multiplier_enabled)
            .field("metric_prefix", &self.metric_prefix)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// Validated settings, ready for the binary.
#[derive(Debug, Clone)]
pub struct Settings {
    pub exporter: ExporterConfig,
    /// Address the metrics endpoint binds to.
    pub listen: SocketAddr,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the default config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "hgscrape").map_or_else(
        || PathBuf::from("hgscrape.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

impl Config {
    /// Figment with every layer: defaults, `path` (if it exists), environment.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::raw().only(ENV_KEYS))
    }

    /// Extract a config from any figment.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }

    /// Load from `path` and the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(path))
    }

    /// Validate and translate into runtime settings.
    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let host = self
            .router_host
            .filter(|h| !h.trim().is_empty())
            .ok_or(ConfigError::Missing {
                key: "router_host",
                env: "ROUTER_HOST",
            })?;
        let username = self.router_username.ok_or(ConfigError::Missing {
            key: "router_username",
            env: "ROUTER_USERNAME",
        })?;
        let password = self.router_password.ok_or(ConfigError::Missing {
            key: "router_password",
            env: "ROUTER_PASSWORD",
        })?;

        let url = router_url(&self.router_scheme, host.trim())?;

        if self.polling_interval_seconds == 0 {
            return Err(invalid("polling_interval_seconds", "must be greater than zero"));
        }
        if self.polling_interval_seconds < MIN_RECOMMENDED_INTERVAL_SECS {
            warn!(
                interval_secs = self.polling_interval_seconds,
                "polling more often than every {MIN_RECOMMENDED_INTERVAL_SECS}s may overload the router"
            );
        }
        if self.request_timeout_seconds == 0 {
            return Err(invalid("request_timeout_seconds", "must be greater than zero"));
        }
        if self.exporter_port == 0 {
            return Err(invalid("exporter_port", "must be between 1 and 65535"));
        }
        validate_metric_prefix(&self.metric_prefix)?;

        let router = RouterConfig {
            url,
            username,
            password: SecretString::from(password),
            timeout: Duration::from_secs(self.request_timeout_seconds),
            accept_invalid_certs: self.accept_invalid_certs,
        };

        Ok(Settings {
            exporter: ExporterConfig {
                router,
                poll_interval: Duration::from_secs(self.polling_interval_seconds),
                wan_multiplier: self.wan_multiplier_enabled,
                metric_prefix: self.metric_prefix,
            },
            listen: SocketAddr::new(self.exporter_address, self.exporter_port),
        })
    }
}

/// Load from `path` and the environment, then validate.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    Config::load(path)?.into_settings()
}

// ── Validation helpers ──────────────────────────────────────────────

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn router_url(scheme: &str, host: &str) -> Result<Url, ConfigError> {
    let scheme = scheme.to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(invalid(
            "router_scheme",
            format!("expected 'http' or 'https', got '{scheme}'"),
        ));
    }

    let url = Url::parse(&format!("{scheme}://{host}/"))
        .map_err(|e| invalid("router_host", format!("'{host}' is not a valid host: {e}")))?;
    if url.path() != "/" || url.query().is_some() {
        return Err(invalid(
            "router_host",
            format!("expected host[:port], got '{host}'"),
        ));
    }
    Ok(url)
}

fn validate_metric_prefix(prefix: &str) -> Result<(), ConfigError> {
    let mut chars = prefix.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(invalid(
            "metric_prefix",
            format!("'{prefix}' must match [a-zA-Z_][a-zA-Z0-9_]*"),
        ))
    }
}

// ── Deserializers ───────────────────────────────────────────────────

/// Accepts true/false, yes/no, on/off and 1/0 (strings case-insensitive).
/// Any other value is an error rather than a silent `false`.
fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct FlexibleBool;

    impl de::Visitor<'_> for FlexibleBool {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("one of true/false, yes/no, on/off, 1/0")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Unsigned(v), &self)),
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            match v {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(E::invalid_value(de::Unexpected::Signed(v), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<bool, E> {
            match v.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            }
        }
    }

    deserializer.deserialize_any(FlexibleBool)
}

/// Environment values are parsed eagerly, so a numeric password arrives as
/// a number. Take any scalar back as its string form.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    struct ScalarString;

    impl<'de> de::Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_owned()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
    }

    deserializer.deserialize_any(ScalarString)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const MINIMAL: &str = r#"
        router_host = "192.168.1.1"
        router_username = "admin"
        router_password = "s3cret"
    "#;

    fn from_toml(extra: &str) -> Result<Config, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(MINIMAL))
            .merge(Toml::string(extra));
        Config::from_figment(&figment)
    }

    fn settings(extra: &str) -> Result<Settings, ConfigError> {
        from_toml(extra)?.into_settings()
    }

    #[test]
    fn defaults_match_documented_values() {
        let settings = settings("").unwrap();
        let exporter = &settings.exporter;

        assert_eq!(exporter.router.url.as_str(), "http://192.168.1.1/");
        assert_eq!(exporter.router.username, "admin");
        assert_eq!(exporter.router.password.expose_secret(), "s3cret");
        assert_eq!(exporter.router.timeout, Duration::from_secs(30));
        assert!(!exporter.router.accept_invalid_certs);
        assert_eq!(exporter.poll_interval, Duration::from_secs(60));
        assert!(exporter.wan_multiplier);
        assert_eq!(exporter.metric_prefix, "vodafone");
        assert_eq!(settings.listen, "0.0.0.0:8081".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn accepts_flexible_booleans() {
        for (value, expected) in [
            ("true", true),
            ("\"yes\"", true),
            ("\"On\"", true),
            ("1", true),
            ("\"1\"", true),
            ("false", false),
            ("\"NO\"", false),
            ("\"off\"", false),
            ("0", false),
        ] {
            let config = from_toml(&format!("wan_multiplier_enabled = {value}")).unwrap();
            assert_eq!(config.wan_multiplier_enabled, expected, "value {value}");
        }
    }

    #[test]
    fn rejects_unknown_boolean_spelling() {
        let err = from_toml(r#"wan_multiplier_enabled = "maybe""#).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)), "{err}");
        assert!(from_toml("accept_invalid_certs = 2").is_err());
    }

    #[test]
    fn rejects_zero_interval() {
        let err = settings("polling_interval_seconds = 0").unwrap_err();
        assert!(
            matches!(&err, ConfigError::Validation { field, .. } if field == "polling_interval_seconds"),
            "{err}"
        );
    }

    #[test]
    fn short_interval_is_allowed() {
        let settings = settings("polling_interval_seconds = 5").unwrap();
        assert_eq!(settings.exporter.poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn missing_credentials_name_the_variable() {
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(r#"router_host = "10.0.0.1""#));
        let err = Config::from_figment(&figment)
            .unwrap()
            .into_settings()
            .unwrap_err();
        assert_eq!(err.to_string(), "ROUTER_USERNAME is not set (or `router_username` in the config file)");
    }

    #[test]
    fn numeric_password_is_kept_as_text() {
        let settings = settings("router_password = 12345").unwrap();
        assert_eq!(settings.exporter.router.password.expose_secret(), "12345");
    }

    #[test]
    fn https_scheme_and_port_build_the_router_url() {
        let settings = settings(
            r#"
            router_host = "router.lan:8443"
            router_scheme = "HTTPS"
            accept_invalid_certs = "yes"
            "#,
        )
        .unwrap();
        assert_eq!(settings.exporter.router.url.as_str(), "https://router.lan:8443/");
        assert!(settings.exporter.router.accept_invalid_certs);
    }

    #[test]
    fn rejects_bad_scheme_and_host() {
        assert!(settings(r#"router_scheme = "ftp""#).is_err());
        assert!(settings(r#"router_host = "192.168.1.1/admin""#).is_err());
        assert!(settings(r#"router_host = "  ""#).is_err());
    }

    #[test]
    fn validates_metric_prefix() {
        assert!(settings(r#"metric_prefix = "home_router""#).is_ok());
        assert!(settings(r#"metric_prefix = "_x9""#).is_ok());
        assert!(settings(r#"metric_prefix = "9lives""#).is_err());
        assert!(settings(r#"metric_prefix = "my-router""#).is_err());
        assert!(settings(r#"metric_prefix = """#).is_err());
    }

    #[test]
    fn custom_listen_address() {
        let settings = settings(
            r#"
            exporter_address = "127.0.0.1"
            exporter_port = 9100
            "#,
        )
        .unwrap();
        assert_eq!(settings.listen, "127.0.0.1:9100".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn loads_values_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{MINIMAL}").unwrap();
        writeln!(file, "polling_interval_seconds = 120").unwrap();

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(file.path()));
        let config = Config::from_figment(&figment).unwrap();

        assert_eq!(config.polling_interval_seconds, 120);
        assert_eq!(config.router_host.as_deref(), Some("192.168.1.1"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(dir.path().join("absent.toml")));
        let config = Config::from_figment(&figment).unwrap();

        assert_eq!(config.exporter_port, 8081);
        assert!(config.router_host.is_none());
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = from_toml("").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("s3cret"), "{debug}");
        assert!(debug.contains("[REDACTED]"));
    }
}
