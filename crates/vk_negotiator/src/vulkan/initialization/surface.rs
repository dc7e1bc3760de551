//! Vulkan surface management
//!
//! Handles window surface creation and management for presentation

use ash::{extensions::khr, vk};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::ffi::CStr;

use crate::vulkan::error::{VulkanError, VulkanResult};
use crate::vulkan::initialization::VulkanInstance;

/// Instance extensions needed to create a surface on the display `window` lives on
pub fn required_surface_extensions<W: HasRawDisplayHandle + ?Sized>(window: &W) -> VulkanResult<Vec<String>> {
    let names = ash_window::enumerate_required_extensions(window.raw_display_handle())?;
    Ok(names
        .iter()
        .map(|&name| unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
        .collect())
}

/// Vulkan surface wrapper for presentation
pub struct Surface {
    surface_loader: khr::Surface,
    surface: vk::SurfaceKHR,
}

impl Surface {
    /// Create a new surface from a window
    pub fn from_window<W>(instance: &VulkanInstance, window: &W) -> VulkanResult<Self>
    where
        W: HasRawWindowHandle + HasRawDisplayHandle,
    {
        let surface = unsafe {
            ash_window::create_surface(
                instance.entry(),
                instance.instance(),
                window.raw_display_handle(),
                window.raw_window_handle(),
                None,
            )
            .map_err(|e| VulkanError::InitializationFailed(format!("Failed to create surface: {e:?}")))?
        };

        Ok(Self::adopt(instance, surface))
    }

    /// Take ownership of a surface created elsewhere, e.g. by the windowing library
    pub fn adopt(instance: &VulkanInstance, surface: vk::SurfaceKHR) -> Self {
        Self {
            surface_loader: khr::Surface::new(instance.entry(), instance.instance()),
            surface,
        }
    }

    /// Get the underlying surface handle
    pub const fn handle(&self) -> vk::SurfaceKHR {
        self.surface
    }

    /// Get the surface loader
    pub const fn loader(&self) -> &khr::Surface {
        &self.surface_loader
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raw_window_handle::{RawDisplayHandle, WebDisplayHandle, XlibDisplayHandle};

    struct Display(RawDisplayHandle);

    unsafe impl HasRawDisplayHandle for Display {
        fn raw_display_handle(&self) -> RawDisplayHandle {
            self.0
        }
    }

    #[test]
    fn test_xlib_needs_surface_and_xlib_extensions() {
        let display = Display(RawDisplayHandle::Xlib(XlibDisplayHandle::empty()));
        assert_eq!(
            required_surface_extensions(&display).unwrap(),
            vec!["VK_KHR_surface", "VK_KHR_xlib_surface"]
        );
    }

    #[test]
    fn test_unsupported_display_is_an_error() {
        let display = Display(RawDisplayHandle::Web(WebDisplayHandle::empty()));
        assert!(matches!(
            required_surface_extensions(&display),
            Err(VulkanError::Api(vk::Result::ERROR_EXTENSION_NOT_PRESENT))
        ));
    }
}
