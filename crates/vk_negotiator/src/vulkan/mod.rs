//! Vulkan negotiation layer
//!
//! Organized leaves first: capability listing, device selection, queue family
//! resolution and swapchain negotiation, plus the initialization wrappers that
//! drive them against a real instance.

/// Error taxonomy shared by every negotiation step
pub mod error;

/// Read-only capability queries over a physical device
pub mod capabilities;

/// First-fit physical device selection
pub mod selection;

/// Queue family lookup by capability flag or present support
pub mod queue_family;

/// Swapchain parameter derivation and creation
pub mod swapchain;

/// Vulkan initialization types (instance, surface, logical device, context)
pub mod initialization;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the types most callers need
pub use capabilities::{AshCapabilityLister, CapabilityLister, DeviceCapabilities, QueueFamily, SurfaceLimits};
pub use error::{DeviceRejection, QueueRequest, VulkanError, VulkanResult};
pub use initialization::{InstanceInfo, LogicalDevice, NegotiationContext, Surface, VulkanInstance};
pub use queue_family::QueueFamilyIndices;
pub use selection::{DeviceRequirements, DeviceSelector, SelectedDevice};
pub use swapchain::{Swapchain, SwapchainConfig, SwapchainPreferences, SwapchainRequest};
