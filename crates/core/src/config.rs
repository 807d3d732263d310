use std::path::Path;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::errors::{SchedulerError, SchedulerResult};
use crate::models::NodeKind;

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub registry: RegistryConfig,
    pub dispatcher: DispatcherConfig,
    pub api: ApiConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Name this scheduler registers under.
    pub name: String,
    /// Device kind this scheduler dispatches blocks to.
    pub device_kind: NodeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub register_max_attempts: u32,
    pub register_retry_delay_seconds: u64,
    pub deregister_max_attempts: u32,
    /// Millisecond granularity: the deregistration cadence is
    /// sub-second.
    pub deregister_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Fixed cadence of the distribution loop.
    pub dispatch_interval_seconds: u64,
    /// Retry budget for scheduler-state broadcasts.
    pub state_publish_attempts: u32,
    pub state_publish_delay_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enabled: bool,
    pub bind_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Optional workflow file loaded as an initial batch at startup.
    pub path: Option<String>,
}

impl AppConfig {
    /// Load configuration from config file and environment variables.
    ///
    /// Load order:
    /// 1. Built-in defaults
    /// 2. Config file (TOML), if present
    /// 3. Environment variable overrides (prefix: WORKCELL_)
    pub fn load(config_path: Option<&str>) -> SchedulerResult<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("scheduler.name", "workcell-scheduler")?
            .set_default("scheduler.device_kind", "OT_2")?
            .set_default("registry.base_url", "http://localhost:8070")?
            .set_default("registry.request_timeout_seconds", 10)?
            .set_default("registry.register_max_attempts", 1000)?
            .set_default("registry.register_retry_delay_seconds", 1)?
            .set_default("registry.deregister_max_attempts", 10)?
            .set_default("registry.deregister_retry_delay_ms", 1500)?
            .set_default("dispatcher.dispatch_interval_seconds", 5)?
            .set_default("dispatcher.state_publish_attempts", 10)?
            .set_default("dispatcher.state_publish_delay_seconds", 2)?
            .set_default("api.enabled", true)?
            .set_default("api.bind_address", "0.0.0.0:8080")?;

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(SchedulerError::Configuration(format!(
                    "config file not found: {path}"
                )));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else {
            // Conventional locations, first match wins.
            for path in ["config/workcell.toml", "workcell.toml"] {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix("WORKCELL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> SchedulerResult<()> {
        if self.scheduler.name.trim().is_empty() {
            return Err(SchedulerError::Configuration(
                "scheduler.name must not be empty".to_string(),
            ));
        }
        if self.registry.base_url.trim().is_empty() {
            return Err(SchedulerError::Configuration(
                "registry.base_url must not be empty".to_string(),
            ));
        }
        if self.dispatcher.dispatch_interval_seconds == 0 {
            return Err(SchedulerError::Configuration(
                "dispatcher.dispatch_interval_seconds must be at least 1".to_string(),
            ));
        }
        if self.registry.register_max_attempts == 0 || self.dispatcher.state_publish_attempts == 0 {
            return Err(SchedulerError::Configuration(
                "retry attempt counts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        // Defaults mirror AppConfig::load with no file and no env.
        Self {
            scheduler: SchedulerConfig {
                name: "workcell-scheduler".to_string(),
                device_kind: NodeKind::Ot2,
            },
            registry: RegistryConfig {
                base_url: "http://localhost:8070".to_string(),
                request_timeout_seconds: 10,
                register_max_attempts: 1000,
                register_retry_delay_seconds: 1,
                deregister_max_attempts: 10,
                deregister_retry_delay_ms: 1500,
            },
            dispatcher: DispatcherConfig {
                dispatch_interval_seconds: 5,
                state_publish_attempts: 10,
                state_publish_delay_seconds: 2,
            },
            api: ApiConfig {
                enabled: true,
                bind_address: "0.0.0.0:8080".to_string(),
            },
            workflow: WorkflowConfig { path: None },
        }
    }
}
