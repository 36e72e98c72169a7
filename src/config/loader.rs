//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming the trace agent host.
pub const JAEGER_HOST_ENV: &str = "JAEGER_HOST";
/// Environment variable naming the trace agent port.
pub const JAEGER_PORT_ENV: &str = "JAEGER_PORT";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{name}={value:?} is not a valid port")]
    Env { name: &'static str, value: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ServiceConfig {
    /// Apply environment overrides using the given lookup.
    ///
    /// Taking the lookup as a parameter keeps tests away from the process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(JAEGER_HOST_ENV) {
            self.tracing.exporter_host = host;
        }
        if let Some(port) = lookup(JAEGER_PORT_ENV) {
            self.tracing.exporter_port = port.trim().parse().map_err(|_| ConfigError::Env {
                name: JAEGER_PORT_ENV,
                value: port.clone(),
            })?;
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Apply command-line overrides and validate the result again.
    pub fn apply_overrides(
        &mut self,
        bind: Option<String>,
        database: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(bind) = bind {
            self.listener.bind_address = bind;
        }
        if let Some(database) = database {
            self.database.path = database;
        }
        validate_config(self).map_err(ConfigError::Validation)
    }
}

/// Load, override and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: ServiceConfig = toml::from_str(&content)?;

    config.apply_process_env()?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, for running without a config file.
pub fn default_config() -> Result<ServiceConfig, ConfigError> {
    let mut config = ServiceConfig::default();
    config.apply_process_env()?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_env_overrides_exporter() {
        let env: HashMap<&str, &str> = [(JAEGER_HOST_ENV, "jaeger"), (JAEGER_PORT_ENV, "6832")]
            .into_iter()
            .collect();

        let mut config = ServiceConfig::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.tracing.exporter_host, "jaeger");
        assert_eq!(config.tracing.exporter_port, 6832);
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_env(|name| (name == JAEGER_PORT_ENV).then(|| "abc".to_string()))
            .unwrap_err();

        assert!(matches!(err, ConfigError::Env { name: JAEGER_PORT_ENV, .. }));
        assert_eq!(config.tracing.exporter_port, 4318);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nbind_address = \"nowhere\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::BindAddress("nowhere".into())]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overrides_are_validated() {
        let mut config = ServiceConfig::default();
        let err = config
            .apply_overrides(Some("not-an-address".into()), Some(" ".into()))
            .unwrap_err();

        match err {
            ConfigError::Validation(errors) => assert_eq!(
                errors,
                vec![
                    ValidationError::BindAddress("not-an-address".into()),
                    ValidationError::EmptyDatabasePath,
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_overrides_win_over_defaults() {
        let mut config = ServiceConfig::default();
        config
            .apply_overrides(Some("127.0.0.1:9000".into()), None)
            .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.database.path, "ecommerce.db");
    }
}
