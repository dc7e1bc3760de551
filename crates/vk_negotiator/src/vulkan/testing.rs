//! In-memory fakes for driving negotiation without a GPU

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::{Cell, RefCell};

use crate::vulkan::capabilities::CapabilityLister;
use crate::vulkan::error::{VulkanError, VulkanResult};
use crate::vulkan::swapchain::SwapchainBackend;

/// Scripted physical device
#[derive(Clone)]
pub struct FakeDevice {
    pub name: String,
    pub families: Vec<(vk::QueueFlags, bool)>,
    pub extensions: Vec<String>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub capabilities: vk::SurfaceCapabilitiesKHR,
}

impl FakeDevice {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            families: Vec::new(),
            extensions: Vec::new(),
            formats: vec![srgb_format()],
            present_modes: vec![vk::PresentModeKHR::FIFO],
            capabilities: vk::SurfaceCapabilitiesKHR {
                min_image_count: 2,
                max_image_count: 0,
                current_extent: vk::Extent2D { width: 800, height: 600 },
                min_image_extent: vk::Extent2D { width: 1, height: 1 },
                max_image_extent: vk::Extent2D { width: 4096, height: 4096 },
                max_image_array_layers: 1,
                supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
                current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
                supported_composite_alpha: vk::CompositeAlphaFlagsKHR::OPAQUE,
                supported_usage_flags: vk::ImageUsageFlags::COLOR_ATTACHMENT,
            },
        }
    }

    pub fn with_family(mut self, flags: vk::QueueFlags, present: bool) -> Self {
        self.families.push((flags, present));
        self
    }

    pub fn with_extensions(mut self, names: &[&str]) -> Self {
        self.extensions.extend(names.iter().map(|name| (*name).to_string()));
        self
    }

    pub fn with_formats(mut self, formats: &[vk::SurfaceFormatKHR]) -> Self {
        self.formats = formats.to_vec();
        self
    }

    pub fn with_present_modes(mut self, modes: &[vk::PresentModeKHR]) -> Self {
        self.present_modes = modes.to_vec();
        self
    }

    pub fn with_capabilities(mut self, capabilities: vk::SurfaceCapabilitiesKHR) -> Self {
        self.capabilities = capabilities;
        self
    }
}

pub fn srgb_format() -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

/// Scripted [`CapabilityLister`] that records which devices were inspected
pub struct FakeLister {
    devices: Vec<FakeDevice>,
    surface: vk::SurfaceKHR,
    inspected: RefCell<Vec<usize>>,
    present_queries: Cell<usize>,
}

impl FakeLister {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            surface: vk::SurfaceKHR::from_raw(0x5u64),
            inspected: RefCell::new(Vec::new()),
            present_queries: Cell::new(0),
        }
    }

    pub fn handle(&self, index: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(index as u64 + 1)
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }

    pub fn handles(&self) -> Vec<vk::PhysicalDevice> {
        (0..self.devices.len()).map(|index| self.handle(index)).collect()
    }

    /// Distinct device indices whose queue families were queried, in order
    pub fn inspected(&self) -> Vec<usize> {
        let mut seen = Vec::new();
        for &index in self.inspected.borrow().iter() {
            if !seen.contains(&index) {
                seen.push(index);
            }
        }
        seen
    }

    pub fn present_queries(&self) -> usize {
        self.present_queries.get()
    }

    fn device(&self, device: vk::PhysicalDevice) -> &FakeDevice {
        &self.devices[(device.as_raw() - 1) as usize]
    }
}

impl CapabilityLister for FakeLister {
    fn enumerate_devices(&self) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        Ok(self.handles())
    }

    fn device_name(&self, device: vk::PhysicalDevice) -> String {
        self.device(device).name.clone()
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<vk::QueueFamilyProperties> {
        self.inspected.borrow_mut().push((device.as_raw() - 1) as usize);
        self.device(device)
            .families
            .iter()
            .map(|(flags, _)| vk::QueueFamilyProperties {
                queue_flags: *flags,
                queue_count: 1,
                ..Default::default()
            })
            .collect()
    }

    fn present_support(
        &self,
        device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<bool> {
        self.present_queries.set(self.present_queries.get() + 1);
        if surface != self.surface {
            return Err(VulkanError::Api(vk::Result::ERROR_SURFACE_LOST_KHR));
        }
        Ok(self.device(device).families[queue_family_index as usize].1)
    }

    fn extensions(&self, device: vk::PhysicalDevice) -> VulkanResult<Vec<String>> {
        Ok(self.device(device).extensions.clone())
    }

    fn surface_formats(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VulkanResult<Vec<vk::SurfaceFormatKHR>> {
        Ok(self.device(device).formats.clone())
    }

    fn present_modes(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VulkanResult<Vec<vk::PresentModeKHR>> {
        Ok(self.device(device).present_modes.clone())
    }

    fn surface_capabilities(
        &self,
        device: vk::PhysicalDevice,
        _surface: vk::SurfaceKHR,
    ) -> VulkanResult<vk::SurfaceCapabilitiesKHR> {
        Ok(self.device(device).capabilities)
    }
}

/// Fields copied out of the last `vkCreateSwapchainKHR` call
#[derive(Debug, Clone)]
pub struct RecordedSwapchain {
    pub min_image_count: u32,
    pub format: vk::Format,
    pub color_space: vk::ColorSpaceKHR,
    pub extent: vk::Extent2D,
    pub present_mode: vk::PresentModeKHR,
    pub sharing_mode: vk::SharingMode,
    pub queue_family_indices: Vec<u32>,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
    pub image_usage: vk::ImageUsageFlags,
    pub composite_alpha: vk::CompositeAlphaFlagsKHR,
    pub old_swapchain: vk::SwapchainKHR,
}

/// Fields copied out of the last `vkCreateImageView` call
#[derive(Debug, Clone, Copy)]
pub struct RecordedView {
    pub image: vk::Image,
    pub view_type: vk::ImageViewType,
    pub format: vk::Format,
    pub components: vk::ComponentMapping,
    pub subresource_range: vk::ImageSubresourceRange,
}

/// Scripted [`SwapchainBackend`] that tracks live handles
pub struct FakeBackend {
    pub image_count: usize,
    pub fail_swapchain: Option<vk::Result>,
    pub fail_images: Option<vk::Result>,
    pub fail_view_at: Option<usize>,
    pub created: RefCell<Option<RecordedSwapchain>>,
    pub views: RefCell<Vec<RecordedView>>,
    pub live_views: RefCell<Vec<vk::ImageView>>,
    pub live_swapchains: RefCell<Vec<vk::SwapchainKHR>>,
    next_handle: Cell<u64>,
}

impl FakeBackend {
    pub fn new(image_count: usize) -> Self {
        Self {
            image_count,
            fail_swapchain: None,
            fail_images: None,
            fail_view_at: None,
            created: RefCell::new(None),
            views: RefCell::new(Vec::new()),
            live_views: RefCell::new(Vec::new()),
            live_swapchains: RefCell::new(Vec::new()),
            next_handle: Cell::new(0x100),
        }
    }

    fn next(&self) -> u64 {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        handle
    }
}

impl SwapchainBackend for FakeBackend {
    fn create_swapchain(&self, create_info: &vk::SwapchainCreateInfoKHR) -> VkResult<vk::SwapchainKHR> {
        if let Some(result) = self.fail_swapchain {
            return Err(result);
        }

        let queue_family_indices = if create_info.queue_family_index_count == 0 {
            Vec::new()
        } else {
            unsafe {
                std::slice::from_raw_parts(
                    create_info.p_queue_family_indices,
                    create_info.queue_family_index_count as usize,
                )
            }
            .to_vec()
        };

        *self.created.borrow_mut() = Some(RecordedSwapchain {
            min_image_count: create_info.min_image_count,
            format: create_info.image_format,
            color_space: create_info.image_color_space,
            extent: create_info.image_extent,
            present_mode: create_info.present_mode,
            sharing_mode: create_info.image_sharing_mode,
            queue_family_indices,
            pre_transform: create_info.pre_transform,
            image_usage: create_info.image_usage,
            composite_alpha: create_info.composite_alpha,
            old_swapchain: create_info.old_swapchain,
        });

        let swapchain = vk::SwapchainKHR::from_raw(self.next());
        self.live_swapchains.borrow_mut().push(swapchain);
        Ok(swapchain)
    }

    fn swapchain_images(&self, _swapchain: vk::SwapchainKHR) -> VkResult<Vec<vk::Image>> {
        if let Some(result) = self.fail_images {
            return Err(result);
        }
        Ok((0..self.image_count).map(|_| vk::Image::from_raw(self.next())).collect())
    }

    fn create_image_view(&self, create_info: &vk::ImageViewCreateInfo) -> VkResult<vk::ImageView> {
        if self.fail_view_at == Some(self.views.borrow().len()) {
            return Err(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY);
        }

        self.views.borrow_mut().push(RecordedView {
            image: create_info.image,
            view_type: create_info.view_type,
            format: create_info.format,
            components: create_info.components,
            subresource_range: create_info.subresource_range,
        });

        let view = vk::ImageView::from_raw(self.next());
        self.live_views.borrow_mut().push(view);
        Ok(view)
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        self.live_views.borrow_mut().retain(|&live| live != view);
    }

    fn destroy_swapchain(&self, swapchain: vk::SwapchainKHR) {
        self.live_swapchains.borrow_mut().retain(|&live| live != swapchain);
    }
}
