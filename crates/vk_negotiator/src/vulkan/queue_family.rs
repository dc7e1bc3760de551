//! Queue family resolution
//!
//! A family can support several operations at once, so the same index may be
//! returned for different requests. Results are in ascending index order and
//! never contain duplicates.

use ash::vk;

use crate::vulkan::capabilities::CapabilityLister;
use crate::vulkan::error::{QueueRequest, VulkanError, VulkanResult};

/// Indices of every queue family whose flags intersect `flags`
pub fn resolve_by_flag<L: CapabilityLister + ?Sized>(
    lister: &L,
    device: vk::PhysicalDevice,
    flags: vk::QueueFlags,
) -> VulkanResult<Vec<u32>> {
    let families = lister.queue_families(device);
    let mut matches = Vec::with_capacity(families.len());

    for (index, family) in (0u32..).zip(families.iter()) {
        if family.queue_flags.intersects(flags) {
            matches.push(index);
        }
    }

    if matches.is_empty() {
        return Err(VulkanError::NoMatchingQueueFamily {
            device,
            request: QueueRequest::Flags(flags),
        });
    }

    log::debug!("Queue families supporting {flags:?}: {matches:?}");
    Ok(matches)
}

/// Indices of every queue family that can present to `surface`
pub fn resolve_by_present_support<L: CapabilityLister + ?Sized>(
    lister: &L,
    device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> VulkanResult<Vec<u32>> {
    let family_count = lister.queue_families(device).len();
    let mut matches = Vec::with_capacity(family_count);

    for index in (0u32..).take(family_count) {
        if lister.present_support(device, index, surface)? {
            matches.push(index);
        }
    }

    if matches.is_empty() {
        return Err(VulkanError::NoMatchingQueueFamily {
            device,
            request: QueueRequest::Present(surface),
        });
    }

    log::debug!("Queue families presenting to {surface:?}: {matches:?}");
    Ok(matches)
}

/// Graphics and present queue families chosen for one device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Family used for graphics submission
    pub graphics: u32,
    /// Family used for presentation
    pub present: u32,
}

impl QueueFamilyIndices {
    /// Pick graphics and present families, preferring one family that does both
    pub fn resolve<L: CapabilityLister + ?Sized>(
        lister: &L,
        device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Self> {
        let graphics = resolve_by_flag(lister, device, vk::QueueFlags::GRAPHICS)?;
        let present = resolve_by_present_support(lister, device, surface)?;

        let indices = graphics
            .iter()
            .find(|index| present.contains(*index))
            .map_or(
                Self { graphics: graphics[0], present: present[0] },
                |&shared| Self { graphics: shared, present: shared },
            );

        log::debug!(
            "Using graphics family {} and present family {}",
            indices.graphics, indices.present
        );
        Ok(indices)
    }

    /// Whether graphics and present share a family
    pub const fn is_shared(&self) -> bool {
        self.graphics == self.present
    }

    /// Distinct family indices, graphics first
    pub fn unique(&self) -> Vec<u32> {
        if self.is_shared() {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }

    /// Sharing mode for images accessed from both families
    pub const fn sharing_mode(&self) -> vk::SharingMode {
        if self.is_shared() {
            vk::SharingMode::EXCLUSIVE
        } else {
            vk::SharingMode::CONCURRENT
        }
    }
}
