//! Vulkan initialization components

/// Device selection through swapchain creation for one surface
pub mod context;
/// Logical device and queues
pub mod device;
/// Instance creation and validation messages
pub mod instance;
/// Presentation surface ownership
pub mod surface;

pub use context::NegotiationContext;
pub use device::LogicalDevice;
pub use instance::{InstanceInfo, VulkanInstance};
pub use surface::{required_surface_extensions, Surface};
