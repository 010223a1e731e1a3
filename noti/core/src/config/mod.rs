//! TOML Configuration File Support
//!
//! Centralized configuration loading for the toast manager, supporting a TOML
//! configuration file at `~/.config/opennoti/noti.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (via [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - `$XDG_CONFIG_HOME/opennoti/noti.toml` (typically `~/.config/opennoti/noti.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [timing]
//! promotion_interval_ms = 500
//! tick_resolution_ms = 30
//!
//! [layout]
//! padding = 5
//! base_offset = 15
//! capacity_fraction = 0.5
//! viewport_height = 1080
//!
//! [backlog]
//! capacity = 500
//! overflow = "drop_oldest"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backlog::BacklogPolicy;
use crate::visible::StackLayout;

/// Viewport height assumed when neither config nor surface provides one
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 1080;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Timing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Interval between promotion attempts in milliseconds
    pub promotion_interval_ms: Option<u64>,

    /// Progress tick resolution in milliseconds
    pub tick_resolution_ms: Option<u64>,
}

/// Layout section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutToml {
    /// Gap between stacked toasts
    pub padding: Option<u32>,

    /// Distance of the stack from the viewport bottom (before padding)
    pub base_offset: Option<u32>,

    /// Fraction of the viewport toasts may occupy
    pub capacity_fraction: Option<f32>,

    /// Fixed viewport height (otherwise asked from the surface)
    pub viewport_height: Option<u32>,
}

/// How a bounded backlog overflows
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowToml {
    /// Evict the oldest waiting toast
    DropOldest,
    /// Refuse the incoming toast
    RejectNewest,
}

/// Backlog section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BacklogToml {
    /// Maximum waiting toasts (absent = unbounded)
    pub capacity: Option<usize>,

    /// Overflow behaviour when `capacity` is set (default: drop oldest)
    pub overflow: Option<OverflowToml>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotiToml {
    /// Timing configuration section
    pub timing: TimingToml,

    /// Layout configuration section
    pub layout: LayoutToml,

    /// Backlog configuration section
    pub backlog: BacklogToml,
}

fn policy_for(capacity: Option<usize>, overflow: Option<OverflowToml>) -> BacklogPolicy {
    match (capacity, overflow) {
        (None, _) => BacklogPolicy::Unbounded,
        (Some(capacity), Some(OverflowToml::RejectNewest)) => {
            BacklogPolicy::RejectNewest { capacity }
        }
        (Some(capacity), _) => BacklogPolicy::DropOldest { capacity },
    }
}

/// Layer a capacity and/or overflow kind over `current`
///
/// Whichever half is not given keeps its current value, so a capacity set
/// by itself never changes how a bounded backlog overflows.
fn layer_policy(
    current: BacklogPolicy,
    capacity: Option<usize>,
    overflow: Option<OverflowToml>,
) -> BacklogPolicy {
    let current_overflow = match current {
        BacklogPolicy::Unbounded => None,
        BacklogPolicy::DropOldest { .. } => Some(OverflowToml::DropOldest),
        BacklogPolicy::RejectNewest { .. } => Some(OverflowToml::RejectNewest),
    };
    policy_for(capacity.or(current.capacity()), overflow.or(current_overflow))
}

fn parse_overflow(s: &str) -> Option<OverflowToml> {
    match s.trim().to_lowercase().replace('-', "_").as_str() {
        "drop_oldest" => Some(OverflowToml::DropOldest),
        "reject_newest" | "reject" => Some(OverflowToml::RejectNewest),
        _ => None,
    }
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Runtime configuration for the toast manager
///
/// Use [`load_config`] to load with proper priority handling, or
/// [`ToastConfig::default`] for the stock behaviour.
#[derive(Clone, Debug)]
pub struct ToastConfig {
    /// Interval between promotion attempts (one toast per tick)
    pub promotion_interval: Duration,

    /// Progress tick resolution for visible toasts
    pub tick_resolution: Duration,

    /// Gap between stacked toasts
    pub padding: u32,

    /// Starting value of the running stack height
    pub base_offset: u32,

    /// Fraction of the viewport toasts may occupy
    pub capacity_fraction: f32,

    /// Fixed viewport height; `None` asks the surface, then falls back to
    /// [`DEFAULT_VIEWPORT_HEIGHT`]
    pub viewport_height: Option<u32>,

    /// Backlog overflow behaviour
    pub backlog_policy: BacklogPolicy,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            promotion_interval: Duration::from_millis(500),
            tick_resolution: Duration::from_millis(30),
            padding: 5,
            base_offset: 15,
            capacity_fraction: 0.5,
            viewport_height: None,
            backlog_policy: BacklogPolicy::Unbounded,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ToastConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Admission threshold for a viewport of `viewport_height`
    #[must_use]
    pub fn capacity_for(&self, viewport_height: u32) -> u32 {
        let capacity = (f64::from(viewport_height) * f64::from(self.capacity_fraction)).floor();
        // Fraction is validated into (0, 1], so this stays within u32
        capacity as u32
    }

    /// Stack geometry for a viewport of `viewport_height`
    #[must_use]
    pub fn stack_layout(&self, viewport_height: u32) -> StackLayout {
        StackLayout {
            capacity: self.capacity_for(viewport_height),
            padding: self.padding,
            base_offset: self.base_offset,
        }
    }

    /// Check values the runtime cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.promotion_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "promotion interval must be greater than zero".to_string(),
            ));
        }
        if self.tick_resolution.is_zero() {
            return Err(ConfigError::ValidationError(
                "tick resolution must be greater than zero".to_string(),
            ));
        }
        if !(self.capacity_fraction > 0.0 && self.capacity_fraction <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "capacity fraction must be in (0, 1], got {}",
                self.capacity_fraction
            )));
        }
        if self.base_offset < self.padding {
            // Admission counts from base_offset, so a smaller base lets the
            // first padding spill past the capacity
            return Err(ConfigError::ValidationError(format!(
                "base offset ({}) must be at least the padding ({})",
                self.base_offset, self.padding
            )));
        }
        if self.viewport_height == Some(0) {
            return Err(ConfigError::ValidationError(
                "viewport height must be greater than zero".to_string(),
            ));
        }
        if self.backlog_policy.capacity() == Some(0) {
            return Err(ConfigError::ValidationError(
                "backlog capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/opennoti/noti.toml` or
/// `~/.config/opennoti/noti.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("opennoti").join("noti.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// merged result fails validation. A missing config file is not an error.
pub fn load_config() -> Result<ToastConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or the merged result fails validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ToastConfig, ConfigError> {
    load_config_over(ToastConfig::default(), path)
}

/// Load configuration on top of surface-specific defaults
///
/// Like [`load_config_from_path`], but starts from `base` instead of
/// [`ToastConfig::default`]. Surfaces that measure in other units (terminal
/// rows rather than pixels) use this to ship their own layout defaults while
/// still honouring the config file and environment.
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_over(
    base: ToastConfig,
    path: Option<PathBuf>,
) -> Result<ToastConfig, ConfigError> {
    load_with_env(base, path, |key| std::env::var(key).ok())
}

fn load_with_env(
    base: ToastConfig,
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ToastConfig, ConfigError> {
    let mut config = base;

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: NotiToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ToastConfig, toml: &NotiToml) {
    if let Some(ms) = toml.timing.promotion_interval_ms {
        config.promotion_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.tick_resolution_ms {
        config.tick_resolution = Duration::from_millis(ms);
    }

    if let Some(padding) = toml.layout.padding {
        config.padding = padding;
    }
    if let Some(offset) = toml.layout.base_offset {
        config.base_offset = offset;
    }
    if let Some(fraction) = toml.layout.capacity_fraction {
        config.capacity_fraction = fraction;
    }
    if toml.layout.viewport_height.is_some() {
        config.viewport_height = toml.layout.viewport_height;
    }

    if toml.backlog.capacity.is_some() || toml.backlog.overflow.is_some() {
        config.backlog_policy = layer_policy(
            config.backlog_policy,
            toml.backlog.capacity,
            toml.backlog.overflow,
        );
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut ToastConfig, env: impl Fn(&str) -> Option<String>) {
    if let Some(ms) = env("NOTI_PROMOTION_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.promotion_interval = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = env("NOTI_TICK_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.tick_resolution = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(padding) = env("NOTI_PADDING").and_then(|v| v.parse::<u32>().ok()) {
        config.padding = padding;
        config.source = ConfigSource::Env;
    }
    if let Some(offset) = env("NOTI_BASE_OFFSET").and_then(|v| v.parse::<u32>().ok()) {
        config.base_offset = offset;
        config.source = ConfigSource::Env;
    }
    if let Some(fraction) = env("NOTI_CAPACITY_FRACTION").and_then(|v| v.parse::<f32>().ok()) {
        config.capacity_fraction = fraction;
        config.source = ConfigSource::Env;
    }
    if let Some(height) = env("NOTI_VIEWPORT_HEIGHT").and_then(|v| v.parse::<u32>().ok()) {
        config.viewport_height = Some(height);
        config.source = ConfigSource::Env;
    }

    let capacity = env("NOTI_BACKLOG_CAPACITY").and_then(|v| v.parse::<usize>().ok());
    let overflow = env("NOTI_BACKLOG_OVERFLOW").and_then(|v| parse_overflow(&v));
    if capacity.is_some() || overflow.is_some() {
        config.backlog_policy = layer_policy(config.backlog_policy, capacity, overflow);
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides,
/// then call [`ToastConfig::validate`] again.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Promotion interval override (milliseconds)
    pub promotion_interval_ms: Option<u64>,

    /// Tick resolution override (milliseconds)
    pub tick_resolution_ms: Option<u64>,

    /// Padding override
    pub padding: Option<u32>,

    /// Base offset override
    pub base_offset: Option<u32>,

    /// Capacity fraction override
    pub capacity_fraction: Option<f32>,

    /// Backlog capacity override (drop-oldest)
    pub backlog_capacity: Option<usize>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set promotion interval override
    #[must_use]
    pub fn with_promotion_interval_ms(mut self, ms: u64) -> Self {
        self.promotion_interval_ms = Some(ms);
        self
    }

    /// Set tick resolution override
    #[must_use]
    pub fn with_tick_resolution_ms(mut self, ms: u64) -> Self {
        self.tick_resolution_ms = Some(ms);
        self
    }

    /// Set padding override
    #[must_use]
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = Some(padding);
        self
    }

    /// Set base offset override
    #[must_use]
    pub fn with_base_offset(mut self, offset: u32) -> Self {
        self.base_offset = Some(offset);
        self
    }

    /// Set capacity fraction override
    #[must_use]
    pub fn with_capacity_fraction(mut self, fraction: f32) -> Self {
        self.capacity_fraction = Some(fraction);
        self
    }

    /// Set backlog capacity override
    #[must_use]
    pub fn with_backlog_capacity(mut self, capacity: usize) -> Self {
        self.backlog_capacity = Some(capacity);
        self
    }

    fn is_empty(&self) -> bool {
        self.promotion_interval_ms.is_none()
            && self.tick_resolution_ms.is_none()
            && self.padding.is_none()
            && self.base_offset.is_none()
            && self.capacity_fraction.is_none()
            && self.backlog_capacity.is_none()
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ToastConfig) {
        if !self.is_empty() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ms) = self.promotion_interval_ms {
            config.promotion_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.tick_resolution_ms {
            config.tick_resolution = Duration::from_millis(ms);
        }
        if let Some(padding) = self.padding {
            config.padding = padding;
        }
        if let Some(offset) = self.base_offset {
            config.base_offset = offset;
        }
        if let Some(fraction) = self.capacity_fraction {
            config.capacity_fraction = fraction;
        }
        if self.backlog_capacity.is_some() {
            config.backlog_policy =
                layer_policy(config.backlog_policy, self.backlog_capacity, None);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
