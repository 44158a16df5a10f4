//! CLI configuration
//!
//! Sources, lowest precedence first: built-in defaults, `helix.toml` in the
//! working directory (or the file given with `--config`), then environment
//! variables such as `HELIX__OUTPUT__INDENT=4`. A `.env` file is loaded
//! before the environment is read. Command-line flags override the result.

use helix_format::EncodeOptions;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: EncodeOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit one JSON object per event instead of human-readable lines
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("helix").required(false),
        };
        Self::build(config::Config::builder().add_source(file))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> anyhow::Result<Self> {
        let defaults = EncodeOptions::default();
        let config = builder
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            .set_default("output.pretty", defaults.pretty)?
            .set_default("output.indent", defaults.indent as i64)?
            // HELIX__LOGGING__LEVEL=debug -> logging.level
            .add_source(
                config::Environment::with_prefix("HELIX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), String> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(format!(
                "logging.level must be one of {}, got '{}'",
                LEVELS.join(", "),
                self.logging.level
            ));
        }
        if self.output.indent > 16 {
            return Err(format!("output.indent must be at most 16, got {}", self.output.indent));
        }
        Ok(())
    }
}
