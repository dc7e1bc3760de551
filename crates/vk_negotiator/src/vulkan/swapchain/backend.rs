//! Swapchain resource creation seam

use ash::extensions::khr::Swapchain as SwapchainLoader;
use ash::prelude::VkResult;
use ash::{vk, Device, Instance};

/// Device-side creation and destruction of swapchains and image views
///
/// Every handle returned by a `create_*` method must eventually be passed to
/// the matching `destroy_*` method by its owner.
pub trait SwapchainBackend {
    /// `vkCreateSwapchainKHR`
    fn create_swapchain(&self, create_info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR>;

    /// `vkGetSwapchainImagesKHR`; the count may differ from the requested minimum
    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>>;

    /// `vkCreateImageView`
    fn create_image_view(&self, create_info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView>;

    /// `vkDestroyImageView`
    fn destroy_image_view(&self, view: vk::ImageView);

    /// `vkDestroySwapchainKHR`; also releases the images it owns
    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR);
}

/// [`SwapchainBackend`] backed by a logical device
#[derive(Clone)]
pub struct AshSwapchainBackend {
    device: Device,
    swapchain_loader: SwapchainLoader,
}

impl AshSwapchainBackend {
    /// Load the swapchain extension for `device`
    pub fn new(instance: &Instance, device: &Device) -> Self {
        Self {
            device: device.clone(),
            swapchain_loader: SwapchainLoader::new(instance, device),
        }
    }
}

impl SwapchainBackend for AshSwapchainBackend {
    fn create_swapchain(&self, create_info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
        unsafe { self.swapchain_loader.create_swapchain(create_info, None) }
    }

    fn swapchain_images(&self, swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        unsafe { self.swapchain_loader.get_swapchain_images(swapchain) }
    }

    fn create_image_view(&self, create_info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        unsafe { self.device.create_image_view(create_info, None) }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        unsafe { self.swapchain_loader.destroy_swapchain(swapchain, None) }
    }
}
