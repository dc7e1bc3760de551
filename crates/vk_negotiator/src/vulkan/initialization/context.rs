//! Negotiation context
//!
//! Owns everything between a surface and a ready swapchain: the selected
//! physical device, its queue families, the logical device and the swapchain.
//! Fields are declared in reverse creation order so they drop in the right
//! sequence.

use ash::vk;

use crate::config::NegotiatorConfig;
use crate::vulkan::capabilities::{AshCapabilityLister, DeviceCapabilities};
use crate::vulkan::error::VulkanResult;
use crate::vulkan::initialization::{LogicalDevice, Surface, VulkanInstance};
use crate::vulkan::queue_family::QueueFamilyIndices;
use crate::vulkan::selection::{DeviceRequirements, DeviceSelector, SelectedDevice};
use crate::vulkan::swapchain::{AshSwapchainBackend, Swapchain, SwapchainPreferences, SwapchainRequest};

/// Selected device, logical device and swapchain for one surface
pub struct NegotiationContext {
    swapchain: Swapchain,
    device: LogicalDevice,
    lister: AshCapabilityLister,
    selected: SelectedDevice,
    requirements: DeviceRequirements,
    preferences: SwapchainPreferences,
    surface: Surface,
    instance: VulkanInstance,
}

impl NegotiationContext {
    /// Select a device for `surface` and create a swapchain of `extent`
    ///
    /// `extent` is only used when the surface leaves the size to the
    /// application; pass the window's framebuffer size.
    pub fn new(
        instance: VulkanInstance,
        surface: Surface,
        config: &NegotiatorConfig,
        extent: vk::Extent2D,
    ) -> VulkanResult<Self> {
        let lister = AshCapabilityLister::new(instance.instance(), surface.loader());
        let requirements = DeviceRequirements::from_config(config, surface.handle());
        let preferences = SwapchainPreferences::from_config(config);

        let selected = DeviceSelector::select_from(&lister, &requirements)?;
        let queue_families = QueueFamilyIndices::resolve(&lister, selected.handle, surface.handle())?;
        let device = LogicalDevice::new(instance.instance(), selected.handle, queue_families, &requirements)?;

        let backend = AshSwapchainBackend::new(instance.instance(), device.device());
        let request = SwapchainRequest::for_queue_families(extent, &queue_families);
        let swapchain = Swapchain::new(backend, &lister, selected.handle, surface.handle(), &request, &preferences)?;

        Ok(Self {
            swapchain,
            device,
            lister,
            selected,
            requirements,
            preferences,
            surface,
            instance,
        })
    }

    /// Replace the swapchain, e.g. after a resize
    ///
    /// Waits for the device to go idle, negotiates against fresh surface
    /// capabilities with the current swapchain as `old_swapchain`, then
    /// destroys the old one.
    pub fn recreate_swapchain(&mut self, extent: vk::Extent2D) -> VulkanResult<()> {
        self.device.wait_idle()?;

        let request = SwapchainRequest::for_queue_families(extent, &self.device.queue_families());
        let swapchain = self.swapchain.recreate(
            &self.lister,
            self.selected.handle,
            self.surface.handle(),
            &request,
            &self.preferences,
        )?;
        self.swapchain = swapchain;

        log::info!(
            "Swapchain recreated at {}x{}",
            self.swapchain.extent().width,
            self.swapchain.extent().height
        );
        Ok(())
    }

    /// Capability snapshot of the selected device
    pub fn capabilities(&self) -> VulkanResult<DeviceCapabilities> {
        DeviceCapabilities::query(&self.lister, self.selected.handle, self.surface.handle())
    }

    /// Device chosen by selection
    pub const fn selected_device(&self) -> &SelectedDevice {
        &self.selected
    }

    /// Requirements the device was selected against
    pub const fn requirements(&self) -> &DeviceRequirements {
        &self.requirements
    }

    /// Logical device
    pub const fn device(&self) -> &LogicalDevice {
        &self.device
    }

    /// Current swapchain
    pub const fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }
}

impl Drop for NegotiationContext {
    fn drop(&mut self) {
        if let Err(e) = self.device.wait_idle() {
            log::warn!("Device wait idle failed during teardown: {e}");
        }
    }
}
