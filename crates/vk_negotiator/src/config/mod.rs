//! Configuration system
//!
//! [`NegotiatorConfig`] collects everything an application decides up front:
//! instance metadata, validation, required device extensions and swapchain
//! preferences. It can be loaded from or saved to TOML and RON files.

use ash::vk;
use std::path::Path;

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        // Try different formats
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Configuration values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Present mode the application would like, falling back to FIFO when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentModePreference {
    /// Low-latency triple buffering
    Mailbox,
    /// No synchronization with vertical blank, may tear
    Immediate,
    /// Vsync, but late frames are presented immediately
    FifoRelaxed,
    /// Strict vsync, always available
    Fifo,
}

impl PresentModePreference {
    /// Map onto the Vulkan enum
    pub const fn to_vk(self) -> vk::PresentModeKHR {
        match self {
            Self::Mailbox => vk::PresentModeKHR::MAILBOX,
            Self::Immediate => vk::PresentModeKHR::IMMEDIATE,
            Self::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
            Self::Fifo => vk::PresentModeKHR::FIFO,
        }
    }
}

impl Default for PresentModePreference {
    fn default() -> Self {
        Self::Mailbox
    }
}

/// Requested surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtentConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl From<ExtentConfig> for vk::Extent2D {
    fn from(extent: ExtentConfig) -> Self {
        Self { width: extent.width, height: extent.height }
    }
}

/// # Negotiator Configuration
///
/// Application metadata, validation settings, device requirements and
/// swapchain preferences. Every field has a default so partial files load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiatorConfig {
    /// Application name for Vulkan instance creation
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Engine name for Vulkan instance creation
    pub engine_name: String,
    /// Whether to enable Vulkan validation layers (`None` = debug builds only)
    pub enable_validation: Option<bool>,
    /// Device extensions a candidate GPU must expose
    pub required_device_extensions: Vec<String>,
    /// Preferred present mode
    pub present_mode: PresentModePreference,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Extent requested when the surface leaves the size to the application
    pub preferred_extent: ExtentConfig,
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl NegotiatorConfig {
    /// Create a new configuration with defaults for everything but the name
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            application_name: app_name.into(),
            application_version: (1, 0, 0),
            engine_name: "VkNegotiator".to_string(),
            enable_validation: None, // Auto-detect based on build type
            required_device_extensions: vec!["VK_KHR_swapchain".to_string()],
            present_mode: PresentModePreference::default(),
            log_level: "info".to_string(),
            preferred_extent: ExtentConfig { width: 800, height: 600 },
        }
    }

    /// Set application version
    #[must_use]
    pub fn with_version(mut self, major: u32, minor: u32, patch: u32) -> Self {
        self.application_version = (major, minor, patch);
        self
    }

    /// Require an additional device extension
    #[must_use]
    pub fn with_device_extension(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required_device_extensions.contains(&name) {
            self.required_device_extensions.push(name);
        }
        self
    }

    /// Set the preferred extent
    #[must_use]
    pub fn with_extent(mut self, width: u32, height: u32) -> Self {
        self.preferred_extent = ExtentConfig { width, height };
        self
    }

    /// Set the preferred present mode
    #[must_use]
    pub fn with_present_mode(mut self, mode: PresentModePreference) -> Self {
        self.present_mode = mode;
        self
    }

    /// Enable or disable validation layers
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = Some(enabled);
        self
    }

    /// Validation setting after applying the build-type default
    pub const fn validation_enabled(&self) -> bool {
        match self.enable_validation {
            Some(enabled) => enabled,
            None => cfg!(debug_assertions),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.is_empty() {
            return Err(ConfigError::Invalid("Application name cannot be empty".to_string()));
        }

        if self.preferred_extent.width == 0 || self.preferred_extent.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "Preferred extent must be non-zero, got {}x{}",
                self.preferred_extent.width, self.preferred_extent.height
            )));
        }

        if let Some(blank) = self.required_device_extensions.iter().position(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("Required device extension #{blank} is blank")));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!("Unknown log level: {}", self.log_level)));
        }

        Ok(())
    }
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self::new("Vk Negotiator Application")
    }
}

impl Config for NegotiatorConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = NegotiatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.required_device_extensions, vec!["VK_KHR_swapchain".to_string()]);
        assert_eq!(config.present_mode, PresentModePreference::Mailbox);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: NegotiatorConfig = toml::from_str(
            r#"
            application_name = "probe"
            present_mode = "fifo_relaxed"
            required_device_extensions = ["VK_KHR_swapchain", "ext.compute"]

            [preferred_extent]
            width = 1280
            height = 720
            "#,
        )
        .unwrap();

        assert_eq!(config.application_name, "probe");
        assert_eq!(config.present_mode.to_vk(), vk::PresentModeKHR::FIFO_RELAXED);
        assert_eq!(config.required_device_extensions.len(), 2);
        assert_eq!(config.preferred_extent, ExtentConfig { width: 1280, height: 720 });
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_ron_parses() {
        let config: NegotiatorConfig =
            ron::from_str(r#"(application_name: "ron-app", present_mode: immediate)"#).unwrap();
        assert_eq!(config.application_name, "ron-app");
        assert_eq!(config.present_mode, PresentModePreference::Immediate);
    }

    #[test]
    fn test_with_device_extension_deduplicates() {
        let config = NegotiatorConfig::new("dedupe")
            .with_device_extension("VK_KHR_swapchain")
            .with_device_extension("ext.compute")
            .with_device_extension("ext.compute");
        assert_eq!(config.required_device_extensions, vec!["VK_KHR_swapchain", "ext.compute"]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(NegotiatorConfig::new("").validate().is_err());
        assert!(NegotiatorConfig::new("zero").with_extent(0, 600).validate().is_err());

        let mut blank = NegotiatorConfig::new("blank");
        blank.required_device_extensions.push("  ".to_string());
        assert!(matches!(blank.validate(), Err(ConfigError::Invalid(_))));

        let mut level = NegotiatorConfig::new("level");
        level.log_level = "verbose".to_string();
        assert!(level.validate().is_err());
    }

    #[test]
    fn test_validation_override() {
        assert!(NegotiatorConfig::new("v").with_validation(true).validation_enabled());
        assert!(!NegotiatorConfig::new("v").with_validation(false).validation_enabled());
    }

    #[test]
    fn test_save_and_load_toml_file() {
        let path = std::env::temp_dir().join(format!("vk_negotiator_config_{}.toml", std::process::id()));
        let config = NegotiatorConfig::new("saved").with_extent(640, 480).with_version(2, 1, 0);
        config.save_to_file(&path).unwrap();

        let loaded = NegotiatorConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.application_name, "saved");
        assert_eq!(loaded.application_version, (2, 1, 0));
        assert_eq!(loaded.preferred_extent, ExtentConfig { width: 640, height: 480 });
    }

    #[test]
    fn test_unsupported_extension() {
        let result = NegotiatorConfig::default().save_to_file("config.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
