pub mod toml_config;

use crate::core::requester::DEFAULT_TIMEOUT;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{CarPredictError, Result};
use crate::utils::validation::{validate_url, Validate};
use std::collections::HashMap;
use std::time::Duration;
use toml_config::TomlConfig;

pub use crate::adapters::placeholder::DEFAULT_PLACEHOLDER_DELAY;

#[cfg(feature = "cli")]
use crate::core::form::FormState;
#[cfg(feature = "cli")]
use crate::domain::model::FormField;
#[cfg(feature = "cli")]
use crate::utils::validation::validate_positive_number;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "carpredict")]
#[command(about = "Estimate a used car's price from its attributes")]
pub struct CliConfig {
    #[arg(long)]
    pub make: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub year: Option<String>,

    #[arg(long)]
    pub mileage: Option<String>,

    #[arg(long)]
    pub fuel_type: Option<String>,

    #[arg(long)]
    pub transmission: Option<String>,

    #[arg(long)]
    pub body_type: Option<String>,

    #[arg(long)]
    pub engine_size: Option<String>,

    #[arg(long)]
    pub horsepower: Option<String>,

    #[arg(long = "field", value_name = "NAME=VALUE", help = "Set any form field by name")]
    pub fields: Vec<String>,

    #[arg(long, help = "Start from the sample vehicle (Toyota Camry 2018)")]
    pub sample: bool,

    #[arg(long, help = "Estimation service URL")]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Use the random placeholder estimator instead of a real service")]
    pub demo: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Fill `form` from the flags: sample first, then named flags, then `--field` pairs.
    pub fn apply_to(&self, form: &mut FormState) -> Result<()> {
        if self.sample {
            form.load_sample();
        }

        let flags = [
            (FormField::Make, &self.make),
            (FormField::Model, &self.model),
            (FormField::Year, &self.year),
            (FormField::Mileage, &self.mileage),
            (FormField::FuelType, &self.fuel_type),
            (FormField::Transmission, &self.transmission),
            (FormField::BodyType, &self.body_type),
            (FormField::EngineSize, &self.engine_size),
            (FormField::Horsepower, &self.horsepower),
        ];
        for (field, value) in flags {
            if let Some(value) = value {
                form.set_field(field, value.as_str());
            }
        }

        for pair in &self.fields {
            let (name, value) = pair.split_once('=').ok_or_else(|| {
                CarPredictError::InvalidConfigValueError {
                    field: "--field".to_string(),
                    value: pair.clone(),
                    reason: "expected NAME=VALUE".to_string(),
                }
            })?;
            form.set_field_by_name(name.trim(), value.trim())?;
        }

        Ok(())
    }
}

/// Effective estimator settings after merging the config file and flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: Option<String>,
    pub timeout: Duration,
    pub headers: HashMap<String, String>,
    pub placeholder_delay: Duration,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
            headers: HashMap::new(),
            placeholder_delay: DEFAULT_PLACEHOLDER_DELAY,
            verbose: false,
            json_logs: false,
        }
    }
}

impl From<&TomlConfig> for Settings {
    fn from(file: &TomlConfig) -> Self {
        let defaults = Settings::default();
        Self {
            endpoint: file.estimator.endpoint.clone(),
            timeout: file
                .estimator
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            headers: file.estimator.headers.clone().unwrap_or_default(),
            placeholder_delay: file
                .placeholder
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.placeholder_delay),
            verbose: file.logging.verbose.unwrap_or(false),
            json_logs: file.logging.json.unwrap_or(false),
        }
    }
}

impl Settings {
    /// Load the config file named on the command line, if any, and let flags override it.
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut settings = match &cli.config {
            Some(path) => {
                let file = TomlConfig::from_file(path)?;
                file.validate()?;
                Settings::from(&file)
            }
            None => Settings::default(),
        };

        if let Some(endpoint) = &cli.endpoint {
            settings.endpoint = Some(endpoint.clone());
        }
        if let Some(secs) = cli.timeout_secs {
            validate_positive_number("--timeout-secs", secs, 1)?;
            settings.timeout = Duration::from_secs(secs);
        }
        settings.verbose |= cli.verbose;
        settings.json_logs |= cli.json_logs;

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.endpoint {
            validate_url("endpoint", endpoint)?;
        }
        if self.timeout.is_zero() {
            return Err(CarPredictError::InvalidConfigValueError {
                field: "timeout".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    fn placeholder_delay(&self) -> Duration {
        self.placeholder_delay
    }
}
