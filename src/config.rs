//! Run configuration.

use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_LOGS_DIR: &str = "logs";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_DURATION_SECS: u32 = 120;

/// A container to chart: the label shown on figures and the `NAME` it has in the logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub display_name: String,
    pub name: String,
}

/// Everything one run needs, validated.
#[derive(Debug, Clone)]
pub struct Config {
    /// Row order of every figure follows this order.
    pub containers: Vec<Container>,
    pub logs_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Experiment duration in seconds, used as the x-axis upper bound.
    pub duration_secs: u32,
}

impl Config {
    pub fn new(
        containers: Vec<Container>,
        logs_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        duration_secs: u32,
    ) -> Result<Self, ConfigError> {
        if containers.is_empty() {
            return Err(ConfigError::EmptyMapping);
        }
        if duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(Self {
            containers,
            logs_dir: logs_dir.into(),
            output_dir: output_dir.into(),
            duration_secs,
        })
    }

    /// The `NAME` values to look up in the logs.
    pub fn container_names(&self) -> Vec<&str> {
        self.containers.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Parse a `{"Display name": "container NAME"}` JSON object, keeping key order.
pub fn parse_container_mapping(json: &str) -> Result<Vec<Container>, ConfigError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let map = value.as_object().ok_or(ConfigError::NotAnObject)?;
    if map.is_empty() {
        return Err(ConfigError::EmptyMapping);
    }

    map.iter()
        .map(|(display_name, name)| match name.as_str() {
            Some(name) => Ok(Container {
                display_name: display_name.clone(),
                name: name.to_string(),
            }),
            None => Err(ConfigError::NonStringValue(display_name.clone())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_keeps_key_order() {
        let containers =
            parse_container_mapping(r#"{"Web": "web", "DB": "db", "Cache": "redis"}"#)
                .expect("valid mapping");
        let names: Vec<_> = containers.iter().map(|c| c.display_name.as_str()).collect();
        assert_eq!(names, ["Web", "DB", "Cache"]);
        assert_eq!(containers[2].name, "redis");
    }

    #[test]
    fn test_mapping_rejects_invalid_json() {
        let err = parse_container_mapping("{web: db}").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
    }

    #[test]
    fn test_mapping_rejects_non_object() {
        let err = parse_container_mapping(r#"["web", "db"]"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnObject));
    }

    #[test]
    fn test_mapping_rejects_empty_object() {
        let err = parse_container_mapping("{}").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyMapping));
    }

    #[test]
    fn test_mapping_rejects_non_string_value() {
        let err = parse_container_mapping(r#"{"Web": 3}"#).unwrap_err();
        assert!(err.to_string().contains("Web"));
    }

    #[test]
    fn test_config_rejects_zero_duration() {
        let containers = parse_container_mapping(r#"{"Web": "web"}"#).unwrap();
        let err = Config::new(containers, "logs", "output", 0).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDuration));
    }

    #[test]
    fn test_config_container_names() {
        let containers = parse_container_mapping(r#"{"Web": "web", "DB": "db"}"#).unwrap();
        let config = Config::new(containers, "logs", "output", DEFAULT_DURATION_SECS).unwrap();
        assert_eq!(config.container_names(), ["web", "db"]);
        assert_eq!(config.duration_secs, 120);
    }
}
