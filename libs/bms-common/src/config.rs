//! Layered configuration loader
//!
//! Merge order, lowest to highest priority:
//! 1. struct defaults
//! 2. environment variables (prefixed)
//! 3. YAML file

use crate::error::{CommonError, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use serde_yaml::Value as YamlValue;
use std::collections::HashMap;
use std::env;
use std::path::Path;
use tracing::{debug, info};

/// Layered configuration loader
pub struct ConfigLoader<T>
where
    T: Default + DeserializeOwned + Serialize,
{
    defaults: T,
    env_prefix: Option<String>,
    yaml_path: Option<String>,
}

impl<T> Default for ConfigLoader<T>
where
    T: Default + DeserializeOwned + Serialize,
{
    fn default() -> Self {
        Self {
            defaults: T::default(),
            env_prefix: None,
            yaml_path: None,
        }
    }
}

impl<T> ConfigLoader<T>
where
    T: Default + DeserializeOwned + Serialize,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the default configuration used as the base layer
    pub fn with_defaults(mut self, defaults: T) -> Self {
        self.defaults = defaults;
        self
    }

    /// Apply environment variables starting with `prefix`
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Merge a YAML file on top, if it exists
    pub fn with_yaml_file(mut self, path: &str) -> Self {
        self.yaml_path = Some(path.to_string());
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<T> {
        let mut config_json = serde_json::to_value(&self.defaults)?;
        debug!("Starting from default configuration");

        if let Some(prefix) = &self.env_prefix {
            debug!("Applying environment variables, prefix: {}", prefix);
            self.apply_env_vars(&mut config_json, prefix);
        }

        if let Some(yaml_path) = &self.yaml_path {
            if Path::new(yaml_path).exists() {
                info!("Loading YAML config file: {}", yaml_path);
                let yaml_content = std::fs::read_to_string(yaml_path)?;
                let yaml_value: YamlValue = serde_yaml::from_str(&yaml_content)?;
                let yaml_as_json: JsonValue =
                    serde_yaml::from_str(&serde_yaml::to_string(&yaml_value)?)?;
                Self::merge_json_values(&mut config_json, &yaml_as_json);
            } else {
                debug!("YAML config file not found, skipping: {}", yaml_path);
            }
        }

        let config: T = serde_json::from_value(config_json)?;
        Ok(config)
    }

    fn apply_env_vars(&self, config: &mut JsonValue, prefix: &str) {
        let env_vars: HashMap<String, String> =
            env::vars().filter(|(k, _)| k.starts_with(prefix)).collect();

        for (key, value) in env_vars {
            // WARNSRV_REDIS_URL -> redis.url
            let path = key
                .strip_prefix(prefix)
                .unwrap_or(&key)
                .trim_start_matches('_')
                .to_lowercase()
                .replace('_', ".");

            if !path.is_empty() {
                debug!("Applying environment variable {} to path {}", key, path);
                Self::set_value_by_path(config, &path, &value);
            }
        }
    }

    fn merge_json_values(base: &mut JsonValue, overlay: &JsonValue) {
        match (base, overlay) {
            (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
                for (key, overlay_value) in overlay_map {
                    match base_map.get_mut(key) {
                        Some(base_value) => {
                            Self::merge_json_values(base_value, overlay_value);
                        },
                        None => {
                            base_map.insert(key.clone(), overlay_value.clone());
                        },
                    }
                }
            },
            (base, overlay) => {
                *base = overlay.clone();
            },
        }
    }

    fn set_value_by_path(config: &mut JsonValue, path: &str, value: &str) {
        let parts: Vec<&str> = path.split('.').collect();
        let mut current = config;

        for (i, part) in parts.iter().enumerate() {
            if i == parts.len() - 1 {
                if let JsonValue::Object(map) = current {
                    map.insert(part.to_string(), Self::parse_env_value(value));
                }
            } else if let JsonValue::Object(map) = current {
                current = map
                    .entry(part.to_string())
                    .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
            }
        }
    }

    fn parse_env_value(value: &str) -> JsonValue {
        if let Ok(bool_val) = value.parse::<bool>() {
            return JsonValue::Bool(bool_val);
        }

        if let Ok(int_val) = value.parse::<i64>() {
            return JsonValue::Number(serde_json::Number::from(int_val));
        }

        if let Ok(float_val) = value.parse::<f64>() {
            if let Some(num) = serde_json::Number::from_f64(float_val) {
                return JsonValue::Number(num);
            }
        }

        JsonValue::String(value.to_string())
    }
}

/// Load `config/<service>.yaml` with `<SERVICE>_*` env overrides
pub fn load_config<T>(service_name: &str) -> Result<T>
where
    T: Default + DeserializeOwned + Serialize,
{
    let config_file = format!("config/{}.yaml", service_name.to_lowercase());
    let env_prefix = service_name.to_uppercase();

    ConfigLoader::new()
        .with_env_prefix(&env_prefix)
        .with_yaml_file(&config_file)
        .build()
        .map_err(|e| CommonError::Config(format!("{}: {}", service_name, e)))
}
