//! ==============================================================================
//! config.rs - runtime configuration loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `hub.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - DeviceConfig:  which device this hub fronts.
//!     - BrokerConfig:  mqtt endpoint and session parameters.
//!     - TopicsConfig:  sensor (inbound) and control (outbound) topics.
//!     - HttpConfig:    api bind address.
//!     - HistoryConfig: retention bound for the telemetry ring.
//!     - LoggingConfig: log level.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub topics: TopicsConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    pub id: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TopicsConfig {
    pub sensors: String,
    pub control: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// number of telemetry frames retained before oldest-eviction
    pub retention: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl HubConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        let config: HubConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;

        Ok(config)
    }

    /// Load with default fallback.
    /// Runs before the logger is initialized (the log level lives in the
    /// config itself), so these lines go straight to stdout.
    pub fn load_or_default() -> Self {
        let paths = [
            std::path::PathBuf::from("config").join("hub.toml"),
            std::path::PathBuf::from("..").join("config").join("hub.toml"),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        println!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        println!("[CONFIG] Warning: Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        println!("[CONFIG] Warning: No config file found - using defaults");
        Self::default()
    }

    /// Log a configuration summary at startup
    pub fn log_summary(&self) {
        log::info!("device id: {}", self.device.id);
        log::info!(
            "broker: mqtt://{}:{} (client {})",
            self.broker.host,
            self.broker.port,
            self.broker.client_id
        );
        log::info!(
            "topics: {} (in) / {} (out)",
            self.topics.sensors,
            self.topics.control
        );
        log::info!("api bind: {}", self.http.bind);
        log::info!("history retention: {} frames", self.history.retention);
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            broker: BrokerConfig::default(),
            topics: TopicsConfig::default(),
            http: HttpConfig::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { id: "hydro_001".to_string() }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "broker.hivemq.com".to_string(),
            port: 1883,
            client_id: "hydro-hub".to_string(),
            keep_alive_seconds: 30,
        }
    }
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            sensors: "hydroponic/sensors".to_string(),
            control: "hydroponic/control".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { bind: "0.0.0.0:3000".to_string() }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        // 10 minutes of 5-second frames
        Self { retention: 120 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.device.id, "hydro_001");
        assert_eq!(config.broker.host, "broker.hivemq.com");
        assert_eq!(config.broker.port, 1883);
        assert_eq!(config.topics.sensors, "hydroponic/sensors");
        assert_eq!(config.topics.control, "hydroponic/control");
        assert_eq!(config.http.bind, "0.0.0.0:3000");
        assert_eq!(config.history.retention, 120);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let config_content = "[device]\nid = \"hydro_042\"\n\n[broker]\nhost = \"localhost\"\nport = 1884\nclient_id = \"test-hub\"\nkeep_alive_seconds = 10\n\n[topics]\nsensors = \"greenhouse/sensors\"\ncontrol = \"greenhouse/control\"\n\n[http]\nbind = \"127.0.0.1:8080\"\n\n[history]\nretention = 12\n\n[logging]\nlevel = \"debug\"\n";

        temp_file.write_all(config_content.as_bytes()).unwrap();
        let config = HubConfig::load(temp_file.path()).unwrap();

        assert_eq!(config.device.id, "hydro_042");
        assert_eq!(config.broker.host, "localhost");
        assert_eq!(config.broker.port, 1884);
        assert_eq!(config.topics.sensors, "greenhouse/sensors");
        assert_eq!(config.http.bind, "127.0.0.1:8080");
        assert_eq!(config.history.retention, 12);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[broker]\nhost = \"10.0.0.5\"\nport = 1883\nclient_id = \"edge\"\nkeep_alive_seconds = 30\n")
            .unwrap();

        let config = HubConfig::load(temp_file.path()).unwrap();
        assert_eq!(config.broker.host, "10.0.0.5");
        // unlisted sections fall back to defaults
        assert_eq!(config.device.id, "hydro_001");
        assert_eq!(config.history.retention, 120);
    }
}
