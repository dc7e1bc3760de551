//! Physical device selection
//!
//! Candidates are evaluated in enumeration order and the first one that can
//! present to the surface and exposes every required extension wins. This is a
//! first-fit policy: later candidates are never inspected once a match is found.

use ash::extensions::khr::Swapchain as SwapchainLoader;
use ash::vk;
use std::collections::{BTreeSet, HashSet};

use crate::config::NegotiatorConfig;
use crate::vulkan::capabilities::CapabilityLister;
use crate::vulkan::error::{DeviceRejection, VulkanError, VulkanResult};

/// What a physical device must offer to be selected
#[derive(Debug, Clone)]
pub struct DeviceRequirements {
    required_extensions: BTreeSet<String>,
    surface: vk::SurfaceKHR,
}

impl DeviceRequirements {
    /// Require presentation support for `surface` and no extensions yet
    pub fn new(surface: vk::SurfaceKHR) -> Self {
        Self {
            required_extensions: BTreeSet::new(),
            surface,
        }
    }

    /// Build requirements from the configured extension list
    pub fn from_config(config: &NegotiatorConfig, surface: vk::SurfaceKHR) -> Self {
        Self::new(surface).with_extensions(config.required_device_extensions.iter().cloned())
    }

    /// Require a device extension; duplicates collapse
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.required_extensions.insert(name.into());
        self
    }

    /// Require several device extensions
    #[must_use]
    pub fn with_extensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_extensions.extend(names.into_iter().map(Into::into));
        self
    }

    /// Require `VK_KHR_swapchain`
    #[must_use]
    pub fn with_swapchain_extension(self) -> Self {
        let name = SwapchainLoader::name().to_string_lossy().into_owned();
        self.with_extension(name)
    }

    /// Distinct required extension names
    pub const fn required_extensions(&self) -> &BTreeSet<String> {
        &self.required_extensions
    }

    /// Surface the device must be able to present to
    pub const fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }
}

/// The device chosen by [`DeviceSelector`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDevice {
    /// Physical device handle
    pub handle: vk::PhysicalDevice,
    /// Position in the candidate list
    pub index: usize,
    /// Device name
    pub name: String,
}

/// First-fit physical device selection
pub struct DeviceSelector;

impl DeviceSelector {
    /// Enumerate devices through `lister` and select among them
    pub fn select_from<L: CapabilityLister + ?Sized>(
        lister: &L,
        requirements: &DeviceRequirements,
    ) -> VulkanResult<SelectedDevice> {
        let candidates = lister.enumerate_devices()?;
        Self::select(lister, &candidates, requirements)
    }

    /// Select the first candidate satisfying every requirement
    pub fn select<L: CapabilityLister + ?Sized>(
        lister: &L,
        candidates: &[vk::PhysicalDevice],
        requirements: &DeviceRequirements,
    ) -> VulkanResult<SelectedDevice> {
        if candidates.is_empty() {
            log::error!("Vulkan reported no physical devices");
            return Err(VulkanError::EnumerationEmpty);
        }

        log::debug!("Evaluating {} physical device(s)", candidates.len());

        let mut rejections = Vec::with_capacity(candidates.len());
        for (index, &device) in candidates.iter().enumerate() {
            let name = lister.device_name(device);
            let present_supported = Self::supports_present(lister, device, requirements.surface)?;
            let missing_extensions = Self::missing_extensions(lister, device, requirements)?;

            if present_supported && missing_extensions.is_empty() {
                log::info!("Selected GPU: {name} (candidate {index})");
                return Ok(SelectedDevice { handle: device, index, name });
            }

            let rejection = DeviceRejection { index, name, present_supported, missing_extensions };
            log::debug!("Rejected {rejection}");
            rejections.push(rejection);
        }

        log::error!("No suitable GPU found among {} candidate(s)", candidates.len());
        Err(VulkanError::NoCapableDevice { rejections })
    }

    /// Whether any queue family of `device` can present to `surface`
    ///
    /// Stops at the first family that reports support.
    pub fn supports_present<L: CapabilityLister + ?Sized>(
        lister: &L,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<bool> {
        let family_count = u32::try_from(lister.queue_families(device).len()).unwrap_or(u32::MAX);
        for family_index in 0..family_count {
            if lister.present_support(device, family_index, surface)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Required extensions `device` does not expose, in name order
    pub fn missing_extensions<L: CapabilityLister + ?Sized>(
        lister: &L,
        device: vk::PhysicalDevice,
        requirements: &DeviceRequirements,
    ) -> VulkanResult<Vec<String>> {
        let available: HashSet<String> = lister.extensions(device)?.into_iter().collect();
        Ok(requirements
            .required_extensions
            .iter()
            .filter(|required| !available.contains(required.as_str()))
            .cloned()
            .collect())
    }
}
