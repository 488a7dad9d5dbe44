pub mod app;
pub mod asset;
pub mod demo_scene;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod time;

use app::App;
use settings::RenderSettings;
use winit::event_loop::EventLoop;

pub use error::{LoadError, RenderError, RenderResult};
pub use renderer::Renderer;

/// Installs `env_logger` at `Info` unless `RUST_LOG` says otherwise. Safe to
/// call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}

pub fn run() -> Result<(), winit::error::EventLoopError> {
    init_logging();

    log::info!("Starting deferred renderer demo");

    let settings = RenderSettings::load();
    let event_loop = EventLoop::new()?;
    let mut app = App::new(settings);

    let result = event_loop.run_app(&mut app);

    if let Err(ref err) = result {
        log::error!("Application error: {}", err);
    }

    log::info!("Application shutdown complete");

    result
}
