use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::bail;
use chrono::TimeDelta;
use serde::Deserialize;

use crate::domain::ActivationPolicy;
use crate::infrastructure::ntfy_notifier::DEFAULT_NTFY_BASE_URL;

const MAX_ACTIVATION_DELAY_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Runtime settings, read once at startup.
///
/// An empty `ntfy_topic` disables notifications, an empty `redis_url` runs the
/// service in stateless pixel-only mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    pub ntfy_topic: String,
    pub ntfy_base_url: String,
    pub redis_url: String,
    pub activation_delay_seconds: u64,
    pub notify_threshold: u32,
    pub notify_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            ntfy_topic: String::new(),
            ntfy_base_url: DEFAULT_NTFY_BASE_URL.to_string(),
            redis_url: String::new(),
            activation_delay_seconds: 30,
            notify_threshold: 3,
            notify_timeout_seconds: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any `NAME -> value` source; unset or empty names keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let cfg = Self {
            listen_addr: lookup("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            ntfy_topic: lookup("NTFY_TOPIC").unwrap_or(defaults.ntfy_topic),
            ntfy_base_url: lookup("NTFY_BASE_URL").unwrap_or(defaults.ntfy_base_url),
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            activation_delay_seconds: parse_var(
                lookup("ACTIVATION_DELAY_SECONDS"),
                "ACTIVATION_DELAY_SECONDS",
                defaults.activation_delay_seconds,
            )?,
            notify_threshold: parse_var(
                lookup("NOTIFY_THRESHOLD"),
                "NOTIFY_THRESHOLD",
                defaults.notify_threshold,
            )?,
            notify_timeout_seconds: parse_var(
                lookup("NOTIFY_TIMEOUT_SECONDS"),
                "NOTIFY_TIMEOUT_SECONDS",
                defaults.notify_timeout_seconds,
            )?,
        };
        cfg.validate()
    }

    /// YAML with the same field names; `${VAR}` references are expanded first.
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let raw = expand_env(&raw);
        let cfg: Config = serde_yaml::from_str(&raw)?;
        cfg.validate()
    }

    pub fn activation_policy(&self) -> ActivationPolicy {
        ActivationPolicy {
            activation_delay: TimeDelta::seconds(self.activation_delay_seconds as i64),
            notify_threshold: self.notify_threshold,
        }
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_seconds)
    }

    fn validate(self) -> anyhow::Result<Self> {
        if self.activation_delay_seconds > MAX_ACTIVATION_DELAY_SECONDS {
            bail!(
                "activation_delay_seconds must be at most {MAX_ACTIVATION_DELAY_SECONDS}, got {}",
                self.activation_delay_seconds
            );
        }
        if self.notify_timeout_seconds == 0 {
            bail!("notify_timeout_seconds must be positive");
        }
        Ok(self)
    }
}

fn parse_var<T>(raw: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}={v}: {e}")),
        None => Ok(default),
    }
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str) -> String {
    let mut out = s.to_string();
    for (k, v) in std::env::vars() {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = Config::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.activation_policy().activation_delay, TimeDelta::seconds(30));
        assert_eq!(cfg.activation_policy().notify_threshold, 3);
        assert_eq!(cfg.notify_timeout(), Duration::from_secs(3));
        assert!(cfg.ntfy_topic.is_empty());
        assert!(cfg.redis_url.is_empty());
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("NTFY_TOPIC", "mail-opens"),
            ("REDIS_URL", "redis://127.0.0.1:6379"),
            ("ACTIVATION_DELAY_SECONDS", " 5 "),
            ("NOTIFY_THRESHOLD", "10"),
            ("LISTEN_ADDR", ""),
        ]))
        .unwrap();

        assert_eq!(cfg.ntfy_topic, "mail-opens");
        assert_eq!(cfg.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(cfg.activation_delay_seconds, 5);
        assert_eq!(cfg.notify_threshold, 10);
        assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
    }

    #[test]
    fn rejects_bad_numbers() {
        let err = Config::from_lookup(lookup_from(&[("NOTIFY_THRESHOLD", "lots")])).unwrap_err();
        assert!(err.to_string().contains("NOTIFY_THRESHOLD"));

        assert!(Config::from_lookup(lookup_from(&[("NOTIFY_TIMEOUT_SECONDS", "0")])).is_err());
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let cfg: Config = serde_yaml::from_str("ntfy_topic: team-mail\nnotify_threshold: 5\n").unwrap();

        assert_eq!(cfg.ntfy_topic, "team-mail");
        assert_eq!(cfg.notify_threshold, 5);
        assert_eq!(cfg.activation_delay_seconds, 30);
        assert_eq!(cfg.ntfy_base_url, "https://ntfy.sh");
    }
}
