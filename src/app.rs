// app.rs
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use crate::demo_scene::DemoScene;
use crate::error::RenderError;
use crate::renderer::Renderer;
use crate::settings::RenderSettings;
use crate::time::FrameTimer;

/// Window shell around the renderer: owns the demo scene and maps keys to
/// renderer toggles.
pub struct App {
    settings: RenderSettings,
    renderer: Option<Renderer>,
    window: Option<Arc<Window>>,
    scene: Option<DemoScene>,
    timer: FrameTimer,
}

impl App {
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            renderer: None,
            window: None,
            scene: None,
            timer: FrameTimer::new(),
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) else {
            return;
        };

        scene.update(self.timer.tick());
        scene.submit(renderer);

        match renderer.render() {
            Ok(()) => {}
            Err(RenderError::Frame(err)) => {
                log::warn!("Skipping frame: {}", err);
            }
            Err(err) => {
                log::error!("Render error: {}", err);
                event_loop.exit();
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_settings = &self.settings.window;
        let attributes = Window::default_attributes()
            .with_title(window_settings.title.as_str())
            .with_inner_size(PhysicalSize::new(window_settings.width, window_settings.height));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        let mut renderer = match pollster::block_on(Renderer::new(window.clone(), self.settings.clone())) {
            Ok(renderer) => renderer,
            Err(err) => {
                log::error!("Failed to initialise renderer: {}", err);
                event_loop.exit();
                return;
            }
        };

        self.scene = Some(DemoScene::new(&mut renderer));
        self.renderer = Some(renderer);
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|window| window.id()) != Some(id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                NamedKey::Escape => {
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.shutdown();
                    }
                    event_loop.exit();
                }
                NamedKey::F1 => {
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.toggle_deferred();
                    }
                }
                NamedKey::F2 => {
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.toggle_debug_graphics();
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}
