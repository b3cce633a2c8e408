use crate::engagement::EngagementConfig;
use crate::error::{GuardError, Result};
use crate::health::HealthThresholds;
use crate::pacing::PacingConfig;
use crate::spam::ContentRules;
use crate::warmup::WarmupConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variables with this prefix override file values,
/// e.g. `GUARD__HEALTH__PAUSE_BOUNCE_RATE=1.5`
pub const ENV_PREFIX: &str = "GUARD";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GuardConfig {
    pub logging: LoggingConfig,
    pub content: ContentRules,
    pub warmup: WarmupConfig,
    pub health: HealthThresholds,
    pub engagement: EngagementConfig,
    pub pacing: PacingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl GuardConfig {
    /// Parse a TOML file; missing sections keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GuardError::Config(format!("{}: {}", path.as_ref().display(), e)))?;

        let config: GuardConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer an optional TOML file and `GUARD__*` environment variables over the defaults
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path.as_ref() {
            builder = builder.add_source(config::File::from(path.as_ref()).required(true));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: GuardConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.content.validate()?;
        self.warmup.validate()?;
        self.health.validate()?;
        self.engagement.validate()?;
        self.pacing.validate()?;

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(GuardError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                other
            ))),
        }
    }
}
