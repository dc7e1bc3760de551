//! Physical device capability queries
//!
//! [`CapabilityLister`] is the read-only seam between the negotiation logic and
//! the Vulkan API. Every method returns an owned, ordered collection; nothing is
//! cached, so each selection pass sees the device as it is right now.

use ash::extensions::khr::Surface as SurfaceLoader;
use ash::{vk, Instance};
use std::collections::BTreeSet;
use std::ffi::CStr;

use crate::vulkan::error::{VulkanError, VulkanResult};

/// Read-only queries against physical devices and a presentation surface
pub trait CapabilityLister {
    /// Enumerate physical devices in platform order
    fn enumerate_devices(&self) -> VulkanResult<Vec<vk::PhysicalDevice>>;

    /// Human readable device name, used for logging and error context
    fn device_name(&self, device: vk::PhysicalDevice) -> String;

    /// Queue family properties, indexed by family index
    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties>;

    /// Whether `queue_family_index` can present to `surface`
    fn present_support(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<bool>;

    /// Names of every device extension the device exposes
    fn extensions(&self, device: vk::PhysicalDevice) -> VulkanResult<Vec<String>>;

    /// Surface formats supported for `surface`
    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Vec<vk::SurfaceFormatKHR>>;

    /// Present modes supported for `surface`
    fn present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Vec<vk::PresentModeKHR>>;

    /// Image count, extent and transform limits for `surface`
    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<vk::SurfaceCapabilitiesKHR>;
}

/// [`CapabilityLister`] backed by a live ash instance
#[derive(Clone)]
pub struct AshCapabilityLister {
    instance: Instance,
    surface_loader: SurfaceLoader,
}

impl AshCapabilityLister {
    /// Create a lister for `instance`, using `surface_loader` for surface queries
    pub fn new(instance: &Instance, surface_loader: &SurfaceLoader) -> Self {
        Self {
            instance: instance.clone(),
            surface_loader: surface_loader.clone(),
        }
    }

    /// Raw device properties and limits
    pub fn properties(&self, device: vk::PhysicalDevice) -> vk::PhysicalDeviceProperties {
        unsafe { self.instance.get_physical_device_properties(device) }
    }
}

impl CapabilityLister for AshCapabilityLister {
    fn enumerate_devices(&self) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices().map_err(VulkanError::Api) }
    }

    fn device_name(&self, device: vk::PhysicalDevice) -> String {
        let properties = self.properties(device);
        unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        unsafe { self.instance.get_physical_device_queue_family_properties(device) }
    }

    fn present_support(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<bool> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_support(device, queue_family_index, surface)
                .map_err(VulkanError::Api)
        }
    }

    fn extensions(&self, device: vk::PhysicalDevice) -> VulkanResult<Vec<String>> {
        let properties = unsafe {
            self.instance
                .enumerate_device_extension_properties(device)
                .map_err(VulkanError::Api)?
        };

        Ok(properties
            .iter()
            .map(|extension| {
                unsafe { CStr::from_ptr(extension.extension_name.as_ptr()) }
                    .to_string_lossy()
                    .into_owned()
            })
            .collect())
    }

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Vec<vk::SurfaceFormatKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(device, surface)
                .map_err(VulkanError::Api)
        }
    }

    fn present_modes(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Vec<vk::PresentModeKHR>> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(device, surface)
                .map_err(VulkanError::Api)
        }
    }

    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(device, surface)
                .map_err(VulkanError::Api)
        }
    }
}

/// One queue family as seen from a particular surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamily {
    /// Family index on the device
    pub index: u32,
    /// Supported operations
    pub flags: vk::QueueFlags,
    /// Number of queues in the family
    pub queue_count: u32,
    /// Whether the family can present to the surface the snapshot was taken for
    pub present_support: bool,
}

/// Surface limits relevant to swapchain negotiation
#[derive(Debug, Clone, Copy)]
pub struct SurfaceLimits {
    /// Minimum number of swapchain images
    pub min_image_count: u32,
    /// Maximum number of swapchain images, 0 means unbounded
    pub max_image_count: u32,
    /// Current surface size, or `u32::MAX` wide when the application decides
    pub current_extent: vk::Extent2D,
    /// Smallest allowed extent
    pub min_image_extent: vk::Extent2D,
    /// Largest allowed extent
    pub max_image_extent: vk::Extent2D,
    /// Transforms the surface supports
    pub supported_transforms: vk::SurfaceTransformFlagsKHR,
    /// Transform currently applied by the presentation engine
    pub current_transform: vk::SurfaceTransformFlagsKHR,
    /// Alpha compositing modes the surface accepts
    pub supported_composite_alpha: vk::CompositeAlphaFlagsKHR,
}

impl SurfaceLimits {
    /// Sentinel width meaning the surface size is set by the swapchain
    pub const UNDEFINED_EXTENT: u32 = u32::MAX;

    /// Whether the presentation engine dictates the extent
    pub const fn has_fixed_extent(&self) -> bool {
        self.current_extent.width != Self::UNDEFINED_EXTENT
    }

    /// Whether `max_image_count` places an upper bound
    pub const fn has_max_image_count(&self) -> bool {
        self.max_image_count > 0
    }
}

impl From<vk::SurfaceCapabilitiesKHR> for SurfaceLimits {
    fn from(caps: vk::SurfaceCapabilitiesKHR) -> Self {
        Self {
            min_image_count: caps.min_image_count,
            max_image_count: caps.max_image_count,
            current_extent: caps.current_extent,
            min_image_extent: caps.min_image_extent,
            max_image_extent: caps.max_image_extent,
            supported_transforms: caps.supported_transforms,
            current_transform: caps.current_transform,
            supported_composite_alpha: caps.supported_composite_alpha,
        }
    }
}

/// Snapshot of everything negotiation needs to know about one device
#[derive(Debug, Clone)]
pub struct DeviceCapabilities {
    /// Device handle the snapshot was taken from
    pub device: vk::PhysicalDevice,
    /// Device name
    pub name: String,
    /// Queue families in index order
    pub queue_families: Vec<QueueFamily>,
    /// Supported device extension names
    pub extensions: BTreeSet<String>,
    /// Supported surface formats, in driver order
    pub surface_formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported present modes, in driver order
    pub present_modes: Vec<vk::PresentModeKHR>,
    /// Surface limits
    pub surface_limits: SurfaceLimits,
}

impl DeviceCapabilities {
    /// Query a fresh snapshot of `device` relative to `surface`
    pub fn query<L: CapabilityLister + ?Sized>(
        lister: &L,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Self> {
        let families = lister.queue_families(device);
        let mut queue_families = Vec::with_capacity(families.len());
        for (index, family) in (0u32..).zip(families.iter()) {
            queue_families.push(QueueFamily {
                index,
                flags: family.queue_flags,
                queue_count: family.queue_count,
                present_support: lister.present_support(device, index, surface)?,
            });
        }

        Ok(Self {
            device,
            name: lister.device_name(device),
            queue_families,
            extensions: lister.extensions(device)?.into_iter().collect(),
            surface_formats: lister.surface_formats(device, surface)?,
            present_modes: lister.present_modes(device, surface)?,
            surface_limits: lister.surface_capabilities(device, surface)?.into(),
        })
    }
}
