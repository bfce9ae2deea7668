mod top_panel;
mod side_panel;
mod central_panel;
mod log_panel;

pub use top_panel::TopPanel;
pub use side_panel::SidePanel;
pub use central_panel::CentralPanel;
pub use log_panel::LogPanel;

use std::path::PathBuf;
use std::sync::Arc;
use egui::Context;
use tracing::warn;
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use lumina_core::{AppStatus, GenerationSettings, LogEntry, MediaKind, SessionEvent};
use crate::events::LuminaEvent;
use crate::gfx::GfxState;

#[derive(Debug, Clone)]
pub enum UiEvent {
    PickMedia(MediaKind),
    SettingsChanged(GenerationSettings),
    ConsentChanged(bool),
    Generate,
    Cancel,
    PlayVideo,
    SaveVideo,
    Reset,
}

/// What the panels render. Updated from session events, never written by
/// the panels themselves.
pub struct UiContext {
    pub status: AppStatus,
    pub log: Vec<LogEntry>,
    pub photo: Option<String>,
    pub photo_preview: Option<egui::TextureHandle>,
    pub voice: Option<String>,
    pub video: Option<PathBuf>,
    pub model: String,
    pub has_key: bool,
    event_loop_proxy: Arc<EventLoopProxy<LuminaEvent>>,
}

impl UiContext {
    pub fn new(event_loop_proxy: Arc<EventLoopProxy<LuminaEvent>>, model: String, has_key: bool) -> Self {
        Self {
            status: AppStatus::Idle,
            log: Vec::new(),
            photo: None,
            photo_preview: None,
            voice: None,
            video: None,
            model,
            has_key,
            event_loop_proxy,
        }
    }

    pub fn send_event(&self, event: UiEvent) {
        if self.event_loop_proxy.send_event(LuminaEvent::Ui(event)).is_err() {
            warn!("Event loop closed, dropping UI event");
        }
    }

    fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::StatusChanged { to, .. } => self.status = *to,
            SessionEvent::LogAppended(entry) => self.log.insert(0, entry.clone()),
            SessionEvent::LogCleared => self.log.clear(),
        }
    }
}

pub struct UiState {
    pub(crate) egui_state: egui_winit::State,
    pub(crate) egui_ctx: egui::Context,
    pub(crate) egui_renderer: egui_wgpu::Renderer,

    components: Vec<Box<dyn UiComponent>>,
    pub(crate) ui_ctx: UiContext,
}

impl UiState {
    pub fn new(gfx: &GfxState, window: Arc<Window>, ui_ctx: UiContext) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gfx.device, gfx.config.format, egui_wgpu::RendererOptions::default());

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            components: Vec::new(),
            ui_ctx,
        }
    }

    pub fn draw(&mut self, window: &Window) -> egui::FullOutput {
        let raw_input = self.egui_state.take_egui_input(window);

        self.egui_ctx.run(raw_input, |ctx| {
            for component in self.components.iter_mut() {
                component.show(ctx, &self.ui_ctx);
            }
        })
    }

    pub fn add_component(&mut self, component: Box<dyn UiComponent>) {
        self.components.push(component);
    }

    pub fn on_session_event(&mut self, event: SessionEvent) {
        self.ui_ctx.apply(&event);
        for component in self.components.iter_mut() {
            component.on_session_event(&event);
        }
    }
}

pub trait UiComponent {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext);

    fn on_session_event(&mut self, _event: &SessionEvent) {}
}
