//! Vulkan swapchain negotiation
//!
//! Handles swapchain creation and recreation following RAII principles.
//! [`negotiate`] derives the parameters from the device's surface support,
//! creates the swapchain and one view per image, and hands back an owned
//! [`SwapchainConfig`]. Either everything is created or nothing is left behind.

mod backend;
mod parameters;

pub use backend::{AshSwapchainBackend, SwapchainBackend};
pub use parameters::{
    choose_composite_alpha, choose_extent, choose_image_count, choose_present_mode, choose_surface_format, SwapchainParameters,
    SwapchainPreferences, SwapchainRequest, SwapchainSupport,
};

use ash::vk;

use crate::vulkan::capabilities::CapabilityLister;
use crate::vulkan::error::{VulkanError, VulkanResult};

/// A created swapchain and its per-image views
///
/// The caller owns every handle in here and must release them with
/// [`SwapchainConfig::destroy`] (or wrap them in [`Swapchain`]) once the GPU
/// no longer uses them. The images belong to the swapchain and are released
/// with it.
#[derive(Debug)]
pub struct SwapchainConfig {
    /// Image format and color space
    pub format: vk::SurfaceFormatKHR,
    /// Present mode
    pub present_mode: vk::PresentModeKHR,
    /// Image extent
    pub extent: vk::Extent2D,
    /// Minimum image count requested at creation
    pub image_count: u32,
    /// Swapchain handle
    pub swapchain: vk::SwapchainKHR,
    /// Images owned by the swapchain; may outnumber `image_count`
    pub images: Vec<vk::Image>,
    /// One color view per entry in `images`
    pub image_views: Vec<vk::ImageView>,
}

impl SwapchainConfig {
    /// Destroy the image views, then the swapchain
    pub fn destroy<B: SwapchainBackend + ?Sized>(self, backend: &B) {
        self.release(backend);
    }

    fn release<B: SwapchainBackend + ?Sized>(&self, backend: &B) {
        for &view in &self.image_views {
            backend.destroy_image_view(view);
        }
        backend.destroy_swapchain(self.swapchain);
    }
}

/// Negotiate and create a swapchain for `device` presenting to `surface`
pub fn negotiate<B, L>(
    backend: &B,
    lister: &L,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    request: &SwapchainRequest,
    preferences: &SwapchainPreferences,
) -> VulkanResult<SwapchainConfig>
where
    B: SwapchainBackend + ?Sized,
    L: CapabilityLister + ?Sized,
{
    let support = SwapchainSupport::query(lister, device, surface)?;
    let parameters = SwapchainParameters::resolve(&support, request, preferences)?;
    create_swapchain(backend, surface, &parameters, request)
}

/// Create a swapchain and its image views from resolved parameters
pub fn create_swapchain<B: SwapchainBackend + ?Sized>(
    backend: &B,
    surface: vk::SurfaceKHR,
    parameters: &SwapchainParameters,
    request: &SwapchainRequest,
) -> VulkanResult<SwapchainConfig> {
    let mut create_info = vk::SwapchainCreateInfoKHR::builder()
        .surface(surface)
        .min_image_count(parameters.image_count)
        .image_format(parameters.format.format)
        .image_color_space(parameters.format.color_space)
        .image_extent(parameters.extent)
        .image_array_layers(1)
        .image_usage(request.image_usage)
        .image_sharing_mode(request.sharing_mode)
        .pre_transform(parameters.pre_transform)
        .composite_alpha(parameters.composite_alpha)
        .present_mode(parameters.present_mode)
        .clipped(true)
        .old_swapchain(request.old_swapchain);

    if request.sharing_mode == vk::SharingMode::CONCURRENT {
        create_info = create_info.queue_family_indices(&request.queue_family_indices);
    }

    let swapchain = backend
        .create_swapchain(&create_info)
        .map_err(|result| VulkanError::SwapchainCreation {
            reason: format!("vkCreateSwapchainKHR returned {result:?}"),
        })?;

    let images = match backend.swapchain_images(swapchain) {
        Ok(images) => images,
        Err(result) => {
            backend.destroy_swapchain(swapchain);
            return Err(VulkanError::SwapchainCreation {
                reason: format!("vkGetSwapchainImagesKHR returned {result:?}"),
            });
        }
    };

    let image_views = match create_image_views(backend, &images, parameters.format.format) {
        Ok(views) => views,
        Err(error) => {
            backend.destroy_swapchain(swapchain);
            return Err(error);
        }
    };

    log::info!(
        "Created swapchain: {}x{} {:?}/{:?} {:?}, {} image(s) (requested {})",
        parameters.extent.width,
        parameters.extent.height,
        parameters.format.format,
        parameters.format.color_space,
        parameters.present_mode,
        images.len(),
        parameters.image_count
    );

    Ok(SwapchainConfig {
        format: parameters.format,
        present_mode: parameters.present_mode,
        extent: parameters.extent,
        image_count: parameters.image_count,
        swapchain,
        images,
        image_views,
    })
}

/// Create one 2D color view per image
///
/// On failure the views created so far are destroyed before returning.
pub fn create_image_views<B: SwapchainBackend + ?Sized>(
    backend: &B,
    images: &[vk::Image],
    format: vk::Format,
) -> VulkanResult<Vec<vk::ImageView>> {
    let mut image_views = Vec::with_capacity(images.len());

    for (image_index, &image) in images.iter().enumerate() {
        let create_info = vk::ImageViewCreateInfo::builder()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        match backend.create_image_view(&create_info) {
            Ok(view) => image_views.push(view),
            Err(result) => {
                log::error!("Image view {image_index} failed ({result:?}), releasing {} view(s)", image_views.len());
                for view in image_views {
                    backend.destroy_image_view(view);
                }
                return Err(VulkanError::ImageViewCreation { image_index, result });
            }
        }
    }

    Ok(image_views)
}

/// Swapchain management wrapper with RAII cleanup
pub struct Swapchain {
    backend: AshSwapchainBackend,
    config: SwapchainConfig,
}

impl Swapchain {
    /// Negotiate and create a new swapchain
    pub fn new<L: CapabilityLister + ?Sized>(
        backend: AshSwapchainBackend,
        lister: &L,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        request: &SwapchainRequest,
        preferences: &SwapchainPreferences,
    ) -> VulkanResult<Self> {
        let config = negotiate(&backend, lister, device, surface, request, preferences)?;
        Ok(Self { backend, config })
    }

    /// Negotiate a replacement, passing this swapchain as `old_swapchain`
    ///
    /// The caller must make sure the GPU is done with this swapchain and drop
    /// it once the replacement exists.
    pub fn recreate<L: CapabilityLister + ?Sized>(
        &self,
        lister: &L,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        request: &SwapchainRequest,
        preferences: &SwapchainPreferences,
    ) -> VulkanResult<Self> {
        let request = request.clone().with_old_swapchain(self.handle());
        Self::new(self.backend.clone(), lister, device, surface, &request, preferences)
    }

    /// Negotiated configuration
    pub const fn config(&self) -> &SwapchainConfig {
        &self.config
    }

    /// Get swapchain extent
    pub const fn extent(&self) -> vk::Extent2D {
        self.config.extent
    }

    /// Get surface format
    pub const fn format(&self) -> vk::SurfaceFormatKHR {
        self.config.format
    }

    /// Get present mode
    pub const fn present_mode(&self) -> vk::PresentModeKHR {
        self.config.present_mode
    }

    /// Get image views
    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.config.image_views
    }

    /// Get swapchain handle
    pub const fn handle(&self) -> vk::SwapchainKHR {
        self.config.swapchain
    }

    /// Number of images actually created by the driver
    pub fn image_count(&self) -> usize {
        self.config.images.len()
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        self.config.release(&self.backend);
    }
}
