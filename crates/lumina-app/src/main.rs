mod app;
mod events;
mod gfx;
mod state;
mod ui;

use std::error::Error;
use tracing_subscriber::EnvFilter;
use winit::event_loop::{ControlFlow, EventLoop};
use lumina_core::StudioConfig;
use crate::events::LuminaEvent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = StudioConfig::load()?;
    if config.api_key.is_none() {
        tracing::warn!("No GEMINI_API_KEY set, generation will fail until one is provided");
    }

    let event_loop: EventLoop<LuminaEvent> = EventLoop::with_user_event().build()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = app::App::new(&event_loop, config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
