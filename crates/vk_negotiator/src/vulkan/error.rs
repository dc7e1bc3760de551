//! Vulkan negotiation errors
//!
//! Every failure is terminal for the current negotiation attempt. Variants carry
//! enough context (which constraint failed, for which device) to log or abort.

use ash::vk;
use std::fmt;
use thiserror::Error;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// Vulkan loader, instance or device initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// The platform reported zero physical devices
    #[error("No physical devices found")]
    EnumerationEmpty,

    /// Physical devices exist but none satisfies the requirements
    #[error("No capable device among {} candidate(s): {}", .rejections.len(), DisplayRejections(.rejections))]
    NoCapableDevice {
        /// One entry per evaluated candidate, in enumeration order
        rejections: Vec<DeviceRejection>,
    },

    /// No queue family on the device matches the request
    #[error("No queue family on device {device:?} supports {request}")]
    NoMatchingQueueFamily {
        /// Device that was scanned
        device: vk::PhysicalDevice,
        /// What the caller asked for
        request: QueueRequest,
    },

    /// Swapchain parameters could not be derived or the swapchain could not be created
    #[error("Swapchain creation failed: {reason}")]
    SwapchainCreation {
        /// Description of the failing step
        reason: String,
    },

    /// Creating the view for one swapchain image failed
    #[error("Image view creation failed for swapchain image {image_index}: {result:?}")]
    ImageViewCreation {
        /// Index of the image whose view failed
        image_index: usize,
        /// Result code returned by the driver
        result: vk::Result,
    },
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;

impl From<vk::Result> for VulkanError {
    fn from(result: vk::Result) -> Self {
        Self::Api(result)
    }
}

/// Why a candidate device was not selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRejection {
    /// Position of the device in the candidate list
    pub index: usize,
    /// Human readable device name
    pub name: String,
    /// Whether any queue family could present to the surface
    pub present_supported: bool,
    /// Required extensions the device does not expose
    pub missing_extensions: Vec<String>,
}

impl fmt::Display for DeviceRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device {} ({})", self.index, self.name)?;
        if !self.present_supported {
            write!(f, " has no present-capable queue family")?;
            if !self.missing_extensions.is_empty() {
                write!(f, " and")?;
            }
        }
        if !self.missing_extensions.is_empty() {
            write!(f, " is missing [{}]", self.missing_extensions.join(", "))?;
        }
        Ok(())
    }
}

struct DisplayRejections<'a>(&'a [DeviceRejection]);

impl fmt::Display for DisplayRejections<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rejection) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{rejection}")?;
        }
        Ok(())
    }
}

/// Queue family capability a caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueRequest {
    /// Families whose operation flags intersect these flags
    Flags(vk::QueueFlags),
    /// Families that can present to this surface
    Present(vk::SurfaceKHR),
}

impl fmt::Display for QueueRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags(flags) => write!(f, "{flags:?}"),
            Self::Present(surface) => write!(f, "presentation to surface {surface:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_display() {
        let both = DeviceRejection {
            index: 1,
            name: "llvmpipe".to_string(),
            present_supported: false,
            missing_extensions: vec!["VK_KHR_swapchain".to_string()],
        };
        assert_eq!(
            both.to_string(),
            "device 1 (llvmpipe) has no present-capable queue family and is missing [VK_KHR_swapchain]"
        );

        let present_only = DeviceRejection { missing_extensions: Vec::new(), ..both };
        assert_eq!(present_only.to_string(), "device 1 (llvmpipe) has no present-capable queue family");
    }

    #[test]
    fn test_no_capable_device_lists_every_rejection() {
        let error = VulkanError::NoCapableDevice {
            rejections: vec![
                DeviceRejection {
                    index: 0,
                    name: "a".to_string(),
                    present_supported: false,
                    missing_extensions: Vec::new(),
                },
                DeviceRejection {
                    index: 1,
                    name: "b".to_string(),
                    present_supported: true,
                    missing_extensions: vec!["ext.compute".to_string()],
                },
            ],
        };
        let message = error.to_string();
        assert!(message.starts_with("No capable device among 2 candidate(s)"));
        assert!(message.contains("device 1 (b) is missing [ext.compute]"));
    }

    #[test]
    fn test_vk_result_converts_to_api_error() {
        let error: VulkanError = vk::Result::ERROR_DEVICE_LOST.into();
        assert!(matches!(error, VulkanError::Api(vk::Result::ERROR_DEVICE_LOST)));
    }
}
