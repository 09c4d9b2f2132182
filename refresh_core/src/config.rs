use std::time::Duration;

/// Default suspension between `enter` and `leave`.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Default operation label used as the status prefix.
pub const DEFAULT_OPERATION: &str = "refresh_action";

/// Placeholder status a fresh holder starts with.
pub const DEFAULT_INITIAL_STATUS: &str = "initial";

pub const ENV_DELAY_MS: &str = "REFRESH_DELAY_MS";
pub const ENV_OPERATION: &str = "REFRESH_OPERATION";
pub const ENV_INITIAL_STATUS: &str = "REFRESH_INITIAL_STATUS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number of milliseconds, got {value:?}")]
    InvalidDelay { var: &'static str, value: String },
    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

/// Settings shared by the status holder and the refresh action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    pub operation: String,
    pub delay: Duration,
    pub initial_status: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            operation: DEFAULT_OPERATION.to_string(),
            delay: DEFAULT_DELAY,
            initial_status: DEFAULT_INITIAL_STATUS.to_string(),
        }
    }
}

impl RefreshConfig {
    /// Defaults overridden by `REFRESH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RefreshConfig::from_env`] but reads through `lookup`, so
    /// callers (and tests) don't have to touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DELAY_MS) {
            let ms = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidDelay {
                var: ENV_DELAY_MS,
                value: raw.clone(),
            })?;
            config.delay = Duration::from_millis(ms);
        }

        if let Some(op) = lookup(ENV_OPERATION) {
            let op = op.trim();
            if op.is_empty() {
                return Err(ConfigError::Empty { var: ENV_OPERATION });
            }
            config.operation = op.to_string();
        }

        if let Some(initial) = lookup(ENV_INITIAL_STATUS) {
            config.initial_status = initial;
        }

        Ok(config)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_operation<S: Into<String>>(mut self, operation: S) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn with_initial_status<S: Into<String>>(mut self, initial_status: S) -> Self {
        self.initial_status = initial_status.into();
        self
    }

    /// `"<operation>: <detail>"`, the shape of every status the action writes.
    pub fn format_status(&self, detail: impl std::fmt::Display) -> String {
        format!("{}: {}", self.operation, detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_reference_behavior() {
        let config = RefreshConfig::default();
        assert_eq!(config.delay, Duration::from_secs(2));
        assert_eq!(config.operation, "refresh_action");
        assert_eq!(config.initial_status, "initial");
    }

    #[test]
    fn test_lookup_without_vars_is_default() {
        let config = RefreshConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, RefreshConfig::default());
    }

    #[test]
    fn test_lookup_overrides() {
        let config = RefreshConfig::from_lookup(lookup_from(&[
            (ENV_DELAY_MS, "250"),
            (ENV_OPERATION, "reload"),
            (ENV_INITIAL_STATUS, "idle"),
        ]))
        .unwrap();
        assert_eq!(config.delay, Duration::from_millis(250));
        assert_eq!(config.operation, "reload");
        assert_eq!(config.initial_status, "idle");
    }

    #[test]
    fn test_invalid_delay_rejected() {
        let err = RefreshConfig::from_lookup(lookup_from(&[(ENV_DELAY_MS, "2s")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidDelay {
                var: ENV_DELAY_MS,
                value: "2s".to_string()
            }
        );
    }

    #[test]
    fn test_empty_operation_rejected() {
        let err = RefreshConfig::from_lookup(lookup_from(&[(ENV_OPERATION, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Empty { var: ENV_OPERATION });
    }

    #[test]
    fn test_format_status() {
        let config = RefreshConfig::default().with_operation("pull");
        assert_eq!(config.format_status("enter"), "pull: enter");
    }
}
