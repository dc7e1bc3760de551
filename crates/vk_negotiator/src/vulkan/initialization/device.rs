//! Logical device creation

use ash::{vk, Device, Instance};
use std::ffi::CString;
use std::os::raw::c_char;

use crate::vulkan::error::{VulkanError, VulkanResult};
use crate::vulkan::queue_family::QueueFamilyIndices;
use crate::vulkan::selection::DeviceRequirements;

/// Queue creation descriptions, one per distinct family
pub fn queue_create_infos(indices: &QueueFamilyIndices, priorities: &[f32]) -> Vec<vk::DeviceQueueCreateInfo> {
    indices
        .unique()
        .into_iter()
        .map(|family| {
            vk::DeviceQueueCreateInfo::builder()
                .queue_family_index(family)
                .queue_priorities(priorities)
                .build()
        })
        .collect()
}

/// Logical device wrapper with RAII cleanup
pub struct LogicalDevice {
    device: Device,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    queue_families: QueueFamilyIndices,
}

impl LogicalDevice {
    /// Create a logical device with one queue per distinct family and the required extensions
    pub fn new(
        instance: &Instance,
        physical_device: vk::PhysicalDevice,
        queue_families: QueueFamilyIndices,
        requirements: &DeviceRequirements,
    ) -> VulkanResult<Self> {
        let priorities = [1.0_f32];
        let queue_infos = queue_create_infos(&queue_families, &priorities);

        let extensions = requirements
            .required_extensions()
            .iter()
            .map(|name| {
                CString::new(name.as_str()).map_err(|_| {
                    VulkanError::InitializationFailed(format!("Extension name contains a NUL byte: {name:?}"))
                })
            })
            .collect::<VulkanResult<Vec<_>>>()?;
        let extension_ptrs: Vec<*const c_char> = extensions.iter().map(|name| name.as_ptr()).collect();

        let features = vk::PhysicalDeviceFeatures::default();
        let create_info = vk::DeviceCreateInfo::builder()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extension_ptrs)
            .enabled_features(&features);

        let device = unsafe { instance.create_device(physical_device, &create_info, None)? };

        let graphics_queue = unsafe { device.get_device_queue(queue_families.graphics, 0) };
        let present_queue = unsafe { device.get_device_queue(queue_families.present, 0) };

        log::info!(
            "Created logical device with {} queue(s), extensions {:?}",
            queue_infos.len(),
            requirements.required_extensions()
        );

        Ok(Self {
            device,
            graphics_queue,
            present_queue,
            queue_families,
        })
    }

    /// Get the logical device
    pub const fn device(&self) -> &Device {
        &self.device
    }

    /// Graphics operations queue
    pub const fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Surface presentation queue
    pub const fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    /// Families the queues were taken from
    pub const fn queue_families(&self) -> QueueFamilyIndices {
        self.queue_families
    }

    /// Block until the device has finished all submitted work
    pub fn wait_idle(&self) -> VulkanResult<()> {
        unsafe { self.device.device_wait_idle()? };
        Ok(())
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        unsafe {
            let _ = self.device.device_wait_idle();
            self.device.destroy_device(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_queue_info_for_shared_family() {
        let priorities = [1.0];
        let infos = queue_create_infos(&QueueFamilyIndices { graphics: 2, present: 2 }, &priorities);

        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].queue_family_index, 2);
        assert_eq!(infos[0].queue_count, 1);
    }

    #[test]
    fn test_queue_info_per_distinct_family() {
        let priorities = [1.0];
        let infos = queue_create_infos(&QueueFamilyIndices { graphics: 0, present: 1 }, &priorities);

        let families: Vec<u32> = infos.iter().map(|info| info.queue_family_index).collect();
        assert_eq!(families, vec![0, 1]);
    }
}
