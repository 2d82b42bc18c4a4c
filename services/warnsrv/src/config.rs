//! Service configuration
//!
//! Loaded through the layered loader: struct defaults, then `WARNSRV_*`
//! environment variables, then `config/warnsrv.yaml`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WarnsrvConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub mq: MqConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MqConfig {
    /// When disabled, ingestion invokes the warning generator inline instead
    /// of publishing to the transport
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_mq_channel")]
    pub channel: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Warning query cache TTL; bounds staleness when an invalidation is
    /// missed
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_service_name() -> String {
    "warnsrv".to_string()
}

fn default_port() -> u16 {
    6005
}

fn default_database_path() -> String {
    "data/warnsrv.db".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_mq_channel() -> String {
    "warnsrv:signals".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

impl Default for MqConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel: default_mq_channel(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}
