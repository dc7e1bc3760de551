//! # Vk Negotiator
//!
//! Physical-device selection and swapchain negotiation for Vulkan renderers.
//!
//! ## Features
//!
//! - **Device Selection**: First-fit selection of a GPU that can present to a
//!   surface and exposes every required device extension
//! - **Queue Family Resolution**: Graphics/compute/transfer and present-capable
//!   queue family lookup
//! - **Swapchain Negotiation**: Surface format, present mode, extent and image
//!   count derived from the device's surface capabilities
//! - **Bootstrap Helpers**: Instance, surface and logical device wrappers with
//!   RAII cleanup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vk_negotiator::prelude::*;
//!
//! fn setup(surface: ash::vk::SurfaceKHR, lister: &AshCapabilityLister) -> VulkanResult<()> {
//!     let requirements = DeviceRequirements::new(surface).with_swapchain_extension();
//!     let selected = DeviceSelector::select_from(lister, &requirements)?;
//!     let indices = QueueFamilyIndices::resolve(lister, selected.handle, surface)?;
//!     log::info!("graphics={} present={}", indices.graphics, indices.present);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod vulkan;

/// Common imports for negotiator users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, NegotiatorConfig, PresentModePreference},
        vulkan::{
            capabilities::{AshCapabilityLister, CapabilityLister, DeviceCapabilities, SurfaceLimits},
            error::{VulkanError, VulkanResult},
            initialization::{InstanceInfo, LogicalDevice, NegotiationContext, Surface, VulkanInstance},
            queue_family::{resolve_by_flag, resolve_by_present_support, QueueFamilyIndices},
            selection::{DeviceRequirements, DeviceSelector, SelectedDevice},
            swapchain::{
                negotiate, AshSwapchainBackend, Swapchain, SwapchainBackend, SwapchainConfig,
                SwapchainParameters, SwapchainPreferences, SwapchainRequest,
            },
        },
    };
}
