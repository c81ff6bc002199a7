//! Run configuration: a RON file with command-line overrides on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use harvester_core::{HarvestPolicy, StallPolicy, NO_PROGRESS_THRESHOLD, SAFETY_CEILING};
use harvester_engine::{ChromeSettings, HarvestSettings, WizardStep};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::cli::CliOptions;
use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "harvester.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("no target URL; set target_url in the config, pass --url or set TARGET_URL")]
    MissingUrl,
    #[error("invalid target URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// How a round that could not scroll affects the exhaustion counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StallSetting {
    #[default]
    Continue,
    Reset,
}

impl From<StallSetting> for StallPolicy {
    fn from(setting: StallSetting) -> Self {
        match setting {
            StallSetting::Continue => StallPolicy::Continue,
            StallSetting::Reset => StallPolicy::Reset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    pub label: String,
    pub options: Vec<String>,
    /// Click the first non-navigation button when no option matches.
    pub fallback_to_first: bool,
    pub advance: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub target_url: String,
    pub output: PathBuf,
    pub write_manifest: bool,
    /// Defaults to the output path with a `.manifest.json` extension.
    pub manifest: Option<PathBuf>,
    pub headless: bool,
    pub user_data_dir: Option<PathBuf>,
    pub settle_delay_ms: u64,
    pub safety_ceiling: u64,
    pub no_progress_threshold: u32,
    pub stall_policy: StallSetting,
    pub progress_interval: u64,
    /// Used for progress percentages when the page shows no total.
    pub default_count_hint: Option<u64>,
    pub table_selector: Option<String>,
    pub wizard: Vec<StepConfig>,
    pub log: LogDestination,
    pub log_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let defaults = HarvestSettings::default();
        Self {
            target_url: String::new(),
            output: PathBuf::from("products.json"),
            write_manifest: true,
            manifest: None,
            headless: true,
            user_data_dir: None,
            settle_delay_ms: defaults.settle_delay.as_millis() as u64,
            safety_ceiling: SAFETY_CEILING,
            no_progress_threshold: NO_PROGRESS_THRESHOLD,
            stall_policy: StallSetting::default(),
            progress_interval: defaults.policy.progress_interval,
            default_count_hint: None,
            table_selector: None,
            wizard: default_wizard(),
            log: LogDestination::default(),
            log_file: PathBuf::from("harvester.log"),
        }
    }
}

/// Launch screen, data source, three default picks, then open the table.
/// Only the choice screens guess a button when nothing matches.
fn default_wizard() -> Vec<StepConfig> {
    let strings = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
    let click = |label: &str, options: &[&str]| StepConfig {
        label: label.to_string(),
        options: strings(options),
        ..StepConfig::default()
    };
    let choose = |label: &str, options: &[&str]| StepConfig {
        label: label.to_string(),
        options: strings(options),
        fallback_to_first: true,
        advance: strings(&["Next", "Continue", "View Products"]),
    };
    vec![
        click("Launch", &["Launch Challenge", "Start Challenge"]),
        choose("Data source", &["Local Database", "Local DB"]),
        choose("Category", &[]),
        choose("View type", &[]),
        choose("Load", &[]),
        click("Open table", &["View Products", "Finish", "Open"]),
    ]
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the explicit config, else `harvester.ron` if present, else defaults;
    /// then apply flags and validate.
    pub fn resolve(opts: &CliOptions) -> Result<Self, ConfigError> {
        let mut config = match &opts.config {
            Some(path) => Self::load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::load(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply(opts);
        config.validate()?;
        Ok(config)
    }

    pub fn apply(&mut self, opts: &CliOptions) {
        if let Some(url) = &opts.url {
            self.target_url = url.clone();
        }
        if let Some(output) = &opts.output {
            self.output = output.clone();
        }
        if let Some(manifest) = &opts.manifest {
            self.manifest = Some(manifest.clone());
            self.write_manifest = true;
        }
        if opts.no_manifest {
            self.write_manifest = false;
        }
        if opts.headed {
            self.headless = false;
        }
        if let Some(dir) = &opts.profile_dir {
            self.user_data_dir = Some(dir.clone());
        }
        if let Some(ms) = opts.settle_ms {
            self.settle_delay_ms = ms;
        }
        if let Some(ceiling) = opts.safety_ceiling {
            self.safety_ceiling = ceiling;
        }
        if let Some(threshold) = opts.no_progress_threshold {
            self.no_progress_threshold = threshold;
        }
        if let Some(stall_policy) = opts.stall_policy {
            self.stall_policy = stall_policy;
        }
        if let Some(hint) = opts.count_hint {
            self.default_count_hint = Some(hint);
        }
        if let Some(selector) = &opts.table_selector {
            self.table_selector = Some(selector.clone());
        }
        if opts.skip_wizard {
            self.wizard.clear();
        }
        if let Some(log) = opts.log {
            self.log = log;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: self.target_url.clone(),
            reason,
        };
        let url = Url::parse(&self.target_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https" | "file") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if self.safety_ceiling == 0 {
            return Err(ConfigError::Zero("safety_ceiling"));
        }
        if self.no_progress_threshold == 0 {
            return Err(ConfigError::Zero("no_progress_threshold"));
        }
        Ok(())
    }

    pub fn manifest_path(&self) -> Option<PathBuf> {
        if !self.write_manifest {
            return None;
        }
        Some(
            self.manifest
                .clone()
                .unwrap_or_else(|| self.output.with_extension("manifest.json")),
        )
    }

    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            policy: HarvestPolicy {
                safety_ceiling: self.safety_ceiling,
                no_progress_threshold: self.no_progress_threshold,
                stall_policy: self.stall_policy.into(),
                progress_interval: self.progress_interval,
            },
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }

    pub fn chrome_settings(&self) -> ChromeSettings {
        ChromeSettings {
            headless: self.headless,
            user_data_dir: self.user_data_dir.clone(),
            ..ChromeSettings::default()
        }
    }

    pub fn wizard_steps(&self) -> Vec<WizardStep> {
        self.wizard
            .iter()
            .map(|step| WizardStep {
                label: step.label.clone(),
                options: step.options.clone(),
                fallback_to_first: step.fallback_to_first,
                advance: step.advance.clone(),
            })
            .collect()
    }
}
