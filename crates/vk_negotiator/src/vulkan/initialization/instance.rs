//! Vulkan instance creation
//!
//! Loads the Vulkan entry point and creates an instance with the requested
//! extensions. With validation enabled, the validation layers and the debug
//! utils extension are added, and a debug messenger forwards every message to
//! `log` at a level matching its severity. The same messenger description is
//! chained into instance creation so instance creation and destruction are
//! covered as well.

use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use crate::config::NegotiatorConfig;
use crate::vulkan::error::{VulkanError, VulkanResult};

/// Khronos validation layer name
pub const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

/// Parameters for [`VulkanInstance::new`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Application name reported to the driver
    pub application_name: String,
    /// Application version, packed with `vk::make_api_version`
    pub application_version: u32,
    /// Engine name reported to the driver
    pub engine_name: String,
    /// Engine version, packed with `vk::make_api_version`
    pub engine_version: u32,
    /// Highest Vulkan API version the application uses
    pub api_version: u32,
    /// Instance extensions, typically the ones the windowing system needs
    pub extensions: Vec<String>,
    /// Layers enabled when validation is on
    pub validation_layers: Vec<String>,
    /// Whether to enable validation and the debug messenger
    pub enable_validation: bool,
}

impl InstanceInfo {
    /// Create instance parameters with no extensions and validation off
    pub fn new(application_name: impl Into<String>) -> Self {
        Self {
            application_name: application_name.into(),
            application_version: vk::make_api_version(0, 1, 0, 0),
            engine_name: "VkNegotiator".to_string(),
            engine_version: vk::make_api_version(0, 1, 0, 0),
            api_version: vk::API_VERSION_1_0,
            extensions: Vec::new(),
            validation_layers: vec![VALIDATION_LAYER.to_string()],
            enable_validation: false,
        }
    }

    /// Build instance parameters from configuration
    pub fn from_config(config: &NegotiatorConfig) -> Self {
        let (major, minor, patch) = config.application_version;
        Self {
            application_version: vk::make_api_version(0, major, minor, patch),
            engine_name: config.engine_name.clone(),
            enable_validation: config.validation_enabled(),
            ..Self::new(config.application_name.clone())
        }
    }

    /// Add instance extensions; duplicates are skipped
    #[must_use]
    pub fn with_extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.extensions.contains(&name) {
                self.extensions.push(name);
            }
        }
        self
    }

    /// Enable or disable validation
    #[must_use]
    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.enable_validation = enabled;
        self
    }

    /// Extensions actually requested at creation, including debug utils when validating
    pub fn enabled_extensions(&self) -> Vec<String> {
        let mut extensions = self.extensions.clone();
        if self.enable_validation {
            let debug_utils = DebugUtils::name().to_string_lossy().into_owned();
            if !extensions.contains(&debug_utils) {
                extensions.push(debug_utils);
            }
        }
        extensions
    }

    /// Layers actually requested at creation
    pub fn enabled_layers(&self) -> &[String] {
        if self.enable_validation {
            &self.validation_layers
        } else {
            &[]
        }
    }
}

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    entry: Entry,
    instance: Instance,
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl VulkanInstance {
    /// Create a new Vulkan instance
    pub fn new(info: &InstanceInfo) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::InitializationFailed(format!("Failed to load Vulkan: {e}")))?;

        let app_name = to_c_string(&info.application_name)?;
        let engine_name = to_c_string(&info.engine_name)?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(info.application_version)
            .engine_name(&engine_name)
            .engine_version(info.engine_version)
            .api_version(info.api_version);

        let extensions = to_c_strings(&info.enabled_extensions())?;
        let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|name| name.as_ptr()).collect();
        let layers = to_c_strings(info.enabled_layers())?;
        let layer_ptrs: Vec<*const c_char> = layers.iter().map(|name| name.as_ptr()).collect();

        log::debug!("Instance extensions: {:?}", info.enabled_extensions());
        if info.enable_validation {
            log::info!("Validation enabled with layers {:?}", info.validation_layers);
        }

        let mut messenger_info = debug_messenger_info();
        let mut create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);
        if info.enable_validation {
            create_info = create_info.push_next(&mut messenger_info);
        }

        let instance = unsafe { entry.create_instance(&create_info, None)? };

        let debug_utils = if info.enable_validation {
            let debug_utils = DebugUtils::new(&entry, &instance);
            match unsafe { debug_utils.create_debug_utils_messenger(&debug_messenger_info(), None) } {
                Ok(messenger) => Some((debug_utils, messenger)),
                Err(result) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(VulkanError::Api(result));
                }
            }
        } else {
            None
        };

        log::info!("Created Vulkan instance for '{}'", info.application_name);

        Ok(Self {
            entry,
            instance,
            debug_utils,
        })
    }

    /// Get a reference to the Vulkan entry
    pub const fn entry(&self) -> &Entry {
        &self.entry
    }

    /// Get a reference to the Vulkan instance
    pub const fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Whether a debug messenger is installed
    pub const fn has_debug_messenger(&self) -> bool {
        self.debug_utils.is_some()
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

fn to_c_string(value: &str) -> VulkanResult<CString> {
    CString::new(value)
        .map_err(|_| VulkanError::InitializationFailed(format!("Name contains a NUL byte: {value:?}")))
}

fn to_c_strings(values: &[String]) -> VulkanResult<Vec<CString>> {
    values.iter().map(|value| to_c_string(value)).collect()
}

fn debug_messenger_info() -> vk::DebugUtilsMessengerCreateInfoEXT {
    vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback))
        .build()
}

/// Log level for a validation message of the given severity
pub fn message_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> log::Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        log::Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        log::Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        log::Level::Debug
    } else {
        log::Level::Trace
    }
}

/// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    if callback_data.is_null() || (*callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*callback_data).p_message).to_string_lossy();

    log::log!(message_level(message_severity), "[Vulkan] {message_type:?} - {message}");

    vk::FALSE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_from_config() {
        let config = NegotiatorConfig::new("probe").with_version(2, 3, 4).with_validation(true);
        let info = InstanceInfo::from_config(&config);

        assert_eq!(info.application_name, "probe");
        assert_eq!(info.application_version, vk::make_api_version(0, 2, 3, 4));
        assert_eq!(info.engine_name, "VkNegotiator");
        assert!(info.enable_validation);
    }

    #[test]
    fn test_debug_utils_added_only_with_validation() {
        let info = InstanceInfo::new("probe").with_extensions(["VK_KHR_surface", "VK_KHR_surface"]);
        assert_eq!(info.enabled_extensions(), vec!["VK_KHR_surface"]);
        assert!(info.enabled_layers().is_empty());

        let info = info.with_validation(true);
        assert_eq!(info.enabled_extensions(), vec!["VK_KHR_surface", "VK_EXT_debug_utils"]);
        assert_eq!(info.enabled_layers().to_vec(), vec![VALIDATION_LAYER.to_string()]);
    }

    #[test]
    fn test_debug_utils_not_duplicated() {
        let info = InstanceInfo::new("probe")
            .with_extensions(["VK_EXT_debug_utils"])
            .with_validation(true);
        assert_eq!(info.enabled_extensions(), vec!["VK_EXT_debug_utils"]);
    }

    #[test]
    fn test_message_level_by_severity() {
        type Severity = vk::DebugUtilsMessageSeverityFlagsEXT;

        assert_eq!(message_level(Severity::ERROR), log::Level::Error);
        assert_eq!(message_level(Severity::WARNING), log::Level::Warn);
        assert_eq!(message_level(Severity::INFO), log::Level::Debug);
        assert_eq!(message_level(Severity::VERBOSE), log::Level::Trace);
    }

    #[test]
    fn test_nul_byte_in_name_is_rejected() {
        assert!(matches!(to_c_string("bad\0name"), Err(VulkanError::InitializationFailed(_))));
        assert_eq!(to_c_strings(&["a".to_string(), "b".to_string()]).unwrap().len(), 2);
    }
}
