//! Vulkan negotiation probe
//!
//! Opens a window, selects a GPU that can present to it, negotiates a
//! swapchain and logs the outcome. Resizing the window renegotiates the
//! swapchain. Pass a `.toml` or `.ron` configuration path as the first
//! argument to override the defaults.

mod window;

use glfw::{Action, Key, WindowEvent};
use vk_negotiator::foundation::logging;
use vk_negotiator::prelude::*;
use vk_negotiator::vulkan::initialization::required_surface_extensions;
use window::Window;

fn load_config() -> Result<NegotiatorConfig, ConfigError> {
    let config = match std::env::args().nth(1) {
        Some(path) => NegotiatorConfig::load_from_file(&path)?,
        None => NegotiatorConfig::new("Vulkan Probe"),
    };
    config.validate()?;
    Ok(config)
}

fn report(context: &NegotiationContext) -> VulkanResult<()> {
    let selected = context.selected_device();
    let capabilities = context.capabilities()?;
    let device = context.device();
    let indices = device.queue_families();
    let swapchain = context.swapchain();

    log::info!("GPU: {} (candidate {})", selected.name, selected.index);
    log::info!("Required extensions: {:?}", context.requirements().required_extensions());
    log::info!("Queue families: graphics={} present={}", indices.graphics, indices.present);
    log::debug!("Queues: graphics={:?} present={:?}", device.graphics_queue(), device.present_queue());
    for family in &capabilities.queue_families {
        log::debug!(
            "  family {}: {:?} x{} present={}",
            family.index,
            family.flags,
            family.queue_count,
            family.present_support
        );
    }
    log::info!(
        "Swapchain: {}x{} {:?} {:?}, {} image(s) for a requested minimum of {}",
        swapchain.extent().width,
        swapchain.extent().height,
        swapchain.format().format,
        swapchain.present_mode(),
        swapchain.image_count(),
        swapchain.config().image_count
    );
    log::debug!("Image views: {:?}", swapchain.image_views());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.log_level);

    log::info!("Starting {}", config.application_name);

    let mut window = Window::new(
        &config.application_name,
        config.preferred_extent.width,
        config.preferred_extent.height,
    )?;

    let info = InstanceInfo::from_config(&config).with_extensions(required_surface_extensions(window.handle())?);
    let instance = VulkanInstance::new(&info)?;
    log::info!("Debug messenger installed: {}", instance.has_debug_messenger());

    let surface = Surface::from_window(&instance, window.handle())?;

    let mut context = NegotiationContext::new(instance, surface, &config, window.framebuffer_extent())?;
    report(&context)?;

    while !window.should_close() {
        window.wait_events();

        let events: Vec<_> = window.flush_events().collect();
        let mut resized = None;
        for (_, event) in events {
            match event {
                WindowEvent::Key(Key::Escape, _, Action::Press, _) | WindowEvent::Close => {
                    window.set_should_close(true);
                }
                WindowEvent::FramebufferSize(width, height) => resized = Some((width, height)),
                _ => {}
            }
        }

        if window.should_close() {
            break;
        }

        if let Some((width, height)) = resized {
            if width <= 0 || height <= 0 {
                log::debug!("Window minimized, keeping the current swapchain");
                continue;
            }
            context.recreate_swapchain(window.framebuffer_extent())?;
            report(&context)?;
        }
    }

    log::info!("Probe finished");
    Ok(())
}
