//! Swapchain parameter derivation
//!
//! Pure functions from surface capabilities plus application wishes to the
//! concrete values passed to `vkCreateSwapchainKHR`. Nothing here touches the
//! device, which keeps every fallback rule testable in isolation.

use ash::vk;
use std::collections::BTreeSet;

use crate::config::NegotiatorConfig;
use crate::foundation::logging::PrettyList;
use crate::vulkan::capabilities::{CapabilityLister, SurfaceLimits};
use crate::vulkan::error::{VulkanError, VulkanResult};
use crate::vulkan::queue_family::QueueFamilyIndices;

/// What the application asks of the swapchain
#[derive(Debug, Clone)]
pub struct SwapchainRequest {
    /// Desired extent, used only when the surface leaves the size open
    pub extent: vk::Extent2D,
    /// Exclusive or concurrent image ownership
    pub sharing_mode: vk::SharingMode,
    /// Families sharing the images, used only with `CONCURRENT`
    pub queue_family_indices: Vec<u32>,
    /// How the images will be used
    pub image_usage: vk::ImageUsageFlags,
    /// Preferred alpha compositing mode
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
    /// Swapchain being replaced, or null
    pub old_swapchain: vk::SwapchainKHR,
}

impl SwapchainRequest {
    /// Exclusive color-attachment swapchain of the given extent
    pub fn new(extent: vk::Extent2D) -> Self {
        Self {
            extent,
            sharing_mode: vk::SharingMode::EXCLUSIVE,
            queue_family_indices: Vec::new(),
            image_usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
            old_swapchain: vk::SwapchainKHR::null(),
        }
    }

    /// Images shared concurrently between `queue_family_indices`
    pub fn concurrent(extent: vk::Extent2D, queue_family_indices: Vec<u32>) -> Self {
        Self {
            sharing_mode: vk::SharingMode::CONCURRENT,
            queue_family_indices,
            ..Self::new(extent)
        }
    }

    /// Exclusive when graphics and present share a family, concurrent otherwise
    pub fn for_queue_families(extent: vk::Extent2D, indices: &QueueFamilyIndices) -> Self {
        if indices.is_shared() {
            Self::new(extent)
        } else {
            Self::concurrent(extent, indices.unique())
        }
    }

    /// Replace `old_swapchain` when creating the new one
    #[must_use]
    pub fn with_old_swapchain(mut self, old_swapchain: vk::SwapchainKHR) -> Self {
        self.old_swapchain = old_swapchain;
        self
    }

    /// Override the image usage flags
    #[must_use]
    pub fn with_image_usage(mut self, image_usage: vk::ImageUsageFlags) -> Self {
        self.image_usage = image_usage;
        self
    }
}

/// Preferred format and present mode, each with a fixed fallback
#[derive(Debug, Clone, Copy)]
pub struct SwapchainPreferences {
    /// Format chosen when the surface offers it exactly
    pub surface_format: vk::SurfaceFormatKHR,
    /// Present mode chosen when available, FIFO otherwise
    pub present_mode: vk::PresentModeKHR,
}

impl SwapchainPreferences {
    /// Preferences from configuration
    pub fn from_config(config: &NegotiatorConfig) -> Self {
        Self {
            present_mode: config.present_mode.to_vk(),
            ..Self::default()
        }
    }
}

impl Default for SwapchainPreferences {
    fn default() -> Self {
        Self {
            surface_format: vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            },
            present_mode: vk::PresentModeKHR::MAILBOX,
        }
    }
}

/// Surface support details for one device
#[derive(Debug, Clone)]
pub struct SwapchainSupport {
    /// Supported formats in driver order
    pub formats: Vec<vk::SurfaceFormatKHR>,
    /// Supported present modes in driver order
    pub present_modes: Vec<vk::PresentModeKHR>,
    /// Image count, extent and transform limits
    pub limits: SurfaceLimits,
}

impl SwapchainSupport {
    /// Query surface support for `device`
    pub fn query<L: CapabilityLister + ?Sized>(
        lister: &L,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Self> {
        Ok(Self {
            formats: lister.surface_formats(device, surface)?,
            present_modes: lister.present_modes(device, surface)?,
            limits: lister.surface_capabilities(device, surface)?.into(),
        })
    }
}

/// Fully resolved swapchain parameters
#[derive(Debug, Clone, Copy)]
pub struct SwapchainParameters {
    /// Image format and color space
    pub format: vk::SurfaceFormatKHR,
    /// Present mode
    pub present_mode: vk::PresentModeKHR,
    /// Image extent
    pub extent: vk::Extent2D,
    /// Minimum image count passed at creation
    pub image_count: u32,
    /// Transform applied before presentation
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    /// Alpha compositing mode
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
}

impl SwapchainParameters {
    /// Derive parameters from surface support and the application's request
    pub fn resolve(
        support: &SwapchainSupport,
        request: &SwapchainRequest,
        preferences: &SwapchainPreferences,
    ) -> VulkanResult<Self> {
        let format = choose_surface_format(&support.formats, preferences.surface_format).ok_or_else(|| {
            VulkanError::SwapchainCreation {
                reason: "surface reports no supported formats".to_string(),
            }
        })?;

        let distinct: BTreeSet<u32> = request.queue_family_indices.iter().copied().collect();
        if request.sharing_mode == vk::SharingMode::CONCURRENT
            && (distinct.len() < 2 || distinct.len() != request.queue_family_indices.len())
        {
            return Err(VulkanError::SwapchainCreation {
                reason: format!(
                    "concurrent sharing needs at least two distinct queue families, got {:?}",
                    request.queue_family_indices
                ),
            });
        }

        Ok(Self {
            format,
            present_mode: choose_present_mode(&support.present_modes, preferences.present_mode),
            extent: choose_extent(&support.limits, request.extent),
            image_count: choose_image_count(&support.limits),
            pre_transform: support.limits.current_transform,
            composite_alpha: choose_composite_alpha(&support.limits, request.composite_alpha),
        })
    }
}

/// Exact match of `preferred`, otherwise the first available format
pub fn choose_surface_format(
    formats: &[vk::SurfaceFormatKHR],
    preferred: vk::SurfaceFormatKHR,
) -> Option<vk::SurfaceFormatKHR> {
    log::debug!("Available surface formats: {:?}", PrettyList(formats));

    let format = formats
        .iter()
        .find(|sf| sf.format == preferred.format && sf.color_space == preferred.color_space)
        .or_else(|| formats.first())
        .copied()?;

    if format.format != preferred.format || format.color_space != preferred.color_space {
        log::warn!(
            "Preferred surface format {:?}/{:?} unavailable, using {:?}/{:?}",
            preferred.format, preferred.color_space, format.format, format.color_space
        );
    }
    Some(format)
}

/// `preferred` if offered anywhere in `modes`, otherwise FIFO
pub fn choose_present_mode(modes: &[vk::PresentModeKHR], preferred: vk::PresentModeKHR) -> vk::PresentModeKHR {
    log::debug!("Available present modes: {:?}", PrettyList(modes));

    let found: Option<vk::PresentModeKHR> = modes.iter().copied().find(|&mode| mode == preferred);
    match found {
        Some(mode) => mode,
        None => {
            log::warn!("Present mode {preferred:?} unavailable, falling back to FIFO");
            vk::PresentModeKHR::FIFO
        }
    }
}

/// The surface's fixed extent, or `requested` clamped per axis to the limits
pub fn choose_extent(limits: &SurfaceLimits, requested: vk::Extent2D) -> vk::Extent2D {
    if limits.has_fixed_extent() {
        log::debug!("Using surface extent {:?}", limits.current_extent);
        return limits.current_extent;
    }

    let extent = vk::Extent2D {
        width: clamp_axis(requested.width, limits.min_image_extent.width, limits.max_image_extent.width),
        height: clamp_axis(requested.height, limits.min_image_extent.height, limits.max_image_extent.height),
    };
    log::debug!("Using computed extent {extent:?} for requested {requested:?}");
    extent
}

/// One image beyond the minimum, capped by a nonzero maximum
pub fn choose_image_count(limits: &SurfaceLimits) -> u32 {
    let proposed = limits.min_image_count.saturating_add(1);
    if limits.has_max_image_count() {
        proposed.min(limits.max_image_count)
    } else {
        proposed
    }
}

/// `preferred` if the surface supports it, otherwise the first supported mode
///
/// Falls back to `preferred` when the surface reports no modes at all.
pub fn choose_composite_alpha(
    limits: &SurfaceLimits,
    preferred: vk::CompositeAlphaFlagsKHR,
) -> vk::CompositeAlphaFlagsKHR {
    const ORDER: [vk::CompositeAlphaFlagsKHR; 4] = [
        vk::CompositeAlphaFlagsKHR::OPAQUE,
        vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
        vk::CompositeAlphaFlagsKHR::INHERIT,
    ];

    if limits.supported_composite_alpha.contains(preferred) {
        return preferred;
    }

    match ORDER.into_iter().find(|&mode| limits.supported_composite_alpha.contains(mode)) {
        Some(mode) => {
            log::warn!("Composite alpha {preferred:?} unsupported, using {mode:?}");
            mode
        }
        None => preferred,
    }
}

// Tolerates min > max, unlike u32::clamp
fn clamp_axis(value: u32, min: u32, max: u32) -> u32 {
    value.max(min).min(max)
}
