use std::sync::Arc;
use std::sync::mpsc::Receiver;
use egui_wgpu::wgpu;
use egui_wgpu::wgpu::StoreOp;
use tokio::runtime::Handle;
use tracing::{info, warn};
use winit::event_loop::EventLoopProxy;
use winit::window::Window;
use lumina_core::{
    ApiKey, CancelToken, GeminiClient, LocalAsset, LuminaError, MediaFile, MediaKind, Session,
    SessionEvent, Studio, StudioConfig, Submission,
};
use crate::events::{LuminaEvent, StudioEvent};
use crate::gfx::GfxState;
use crate::ui;
use crate::ui::{UiContext, UiEvent, UiState};

const PREVIEW_SIZE: u32 = 256;

pub struct AppState {
    pub(crate) window: Arc<Window>,
    event_loop_proxy: Arc<EventLoopProxy<LuminaEvent>>,
    runtime: Handle,

    pub gfx: GfxState,
    pub ui: UiState,

    studio: Arc<Studio<GeminiClient>>,
    api_key: Option<ApiKey>,

    session: Session,
    session_rx: Receiver<SessionEvent>,
    submission: Submission,

    // Owned here so the file lives exactly as long as it is shown
    result: Option<LocalAsset>,
    cancel: Option<CancelToken>,
}

impl AppState {
    pub async fn new(
        window: Arc<Window>,
        event_loop_proxy: Arc<EventLoopProxy<LuminaEvent>>,
        config: &StudioConfig,
    ) -> anyhow::Result<Self> {
        let client = GeminiClient::from_config(config)?;
        let studio = Arc::new(Studio::from_config(client, config));

        let gfx = GfxState::new(window.clone()).await?;

        let ui_ctx = UiContext::new(event_loop_proxy.clone(), studio.model().to_string(), config.api_key.is_some());
        let mut ui_state = UiState::new(&gfx, window.clone(), ui_ctx);

        ui_state.add_component(Box::new(ui::TopPanel::default()));
        ui_state.add_component(Box::new(ui::SidePanel::default()));
        ui_state.add_component(Box::new(ui::LogPanel::default()));
        ui_state.add_component(Box::new(ui::CentralPanel::default()));

        let mut session = Session::new();
        let session_rx = session.subscribe();

        Ok(Self {
            window,
            event_loop_proxy,
            runtime: Handle::current(),
            gfx,
            ui: ui_state,
            studio,
            api_key: config.api_key.clone(),
            session,
            session_rx,
            submission: Submission::default(),
            result: None,
            cancel: None,
        })
    }

    fn push_event(proxy: &EventLoopProxy<LuminaEvent>, event: StudioEvent) {
        if proxy.send_event(LuminaEvent::Studio(event)).is_err() {
            warn!("Event loop closed before studio event was delivered");
        }
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.gfx.resize(new_size);
    }

    pub fn on_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::PickMedia(kind) => self.pick_media(kind),
            UiEvent::SettingsChanged(settings) => {
                self.submission.settings = settings;
                self.session.configure();
            }
            UiEvent::ConsentChanged(consent) => {
                self.submission.consent = consent;
            }
            UiEvent::Generate => self.start_generation(),
            UiEvent::Cancel => {
                if let Some(cancel) = &self.cancel {
                    info!("Cancelling generation");
                    cancel.cancel();
                }
            }
            UiEvent::PlayVideo => self.play_video(),
            UiEvent::SaveVideo => self.save_video(),
            UiEvent::Reset => {
                if self.session.reset().is_ok() {
                    self.set_result(None);
                }
            }
        }
        self.sync_ui();
    }

    pub fn on_studio_event(&mut self, event: StudioEvent) {
        match event {
            StudioEvent::MediaLoaded { file, preview } => {
                self.session.media_loaded(file.kind, &file.name);
                match file.kind {
                    MediaKind::Photo => {
                        let texture = preview.map(|image| {
                            self.ui.egui_ctx.load_texture("portrait_preview", image, egui::TextureOptions::LINEAR)
                        });
                        self.ui.ui_ctx.photo_preview = texture;
                        self.ui.ui_ctx.photo = Some(file.name.clone());
                        self.submission.photo = Some(file);
                    }
                    MediaKind::Voice => {
                        self.ui.ui_ctx.voice = Some(file.name.clone());
                        self.submission.voice = Some(file);
                    }
                }
            }
            StudioEvent::MediaFailed { kind, error } => {
                warn!("Could not load {}: {}", kind.name(), error);
                self.session.note_error(&error);
            }
            StudioEvent::Progress(progress) => self.session.record(progress),
            StudioEvent::Finished(result) => {
                self.cancel = None;
                self.session.finish(&result);
                if let Ok(asset) = result {
                    self.set_result(Some(asset));
                }
            }
        }
        self.sync_ui();
    }

    fn pick_media(&mut self, kind: MediaKind) {
        let Some(path) = rfd::FileDialog::new()
            .set_title(format!("Choose {}", kind.name().to_lowercase()))
            .add_filter(kind.name(), kind.extensions())
            .pick_file()
        else {
            return;
        };

        let proxy = self.event_loop_proxy.clone();
        self.runtime.spawn(async move {
            let event = match MediaFile::load(kind, &path).await {
                Ok(file) => {
                    let preview = (kind == MediaKind::Photo).then(|| Self::preview(&file)).flatten();
                    StudioEvent::MediaLoaded { file, preview }
                }
                Err(error) => StudioEvent::MediaFailed { kind, error },
            };
            Self::push_event(&proxy, event);
        });
    }

    fn preview(file: &MediaFile) -> Option<egui::ColorImage> {
        match file.preview(PREVIEW_SIZE) {
            Ok(thumb) => {
                let size = [thumb.width() as usize, thumb.height() as usize];
                Some(egui::ColorImage::from_rgba_unmultiplied(size, thumb.as_raw()))
            }
            Err(e) => {
                warn!("No preview for {}: {}", file.name, e);
                None
            }
        }
    }

    fn start_generation(&mut self) {
        let request = match self.session.begin(&self.submission, self.studio.model()) {
            Ok(request) => request,
            Err(e) => {
                warn!("Generation not started: {}", e);
                return;
            }
        };

        // The previous video is no longer displayed once a new run starts
        self.set_result(None);

        let Some(key) = self.api_key.clone() else {
            self.session.fail(&LuminaError::Auth("no API key configured".into()));
            return;
        };

        let cancel = CancelToken::new();
        self.cancel = Some(cancel.clone());

        let studio = self.studio.clone();
        let proxy = self.event_loop_proxy.clone();
        self.runtime.spawn(async move {
            let result = studio
                .execute(&request, &key, &cancel, |progress| {
                    Self::push_event(&proxy, StudioEvent::Progress(progress));
                })
                .await;
            Self::push_event(&proxy, StudioEvent::Finished(result));
        });
    }

    /// Hand the downloaded file to the system video player.
    fn play_video(&mut self) {
        let Some(asset) = &self.result else {
            return;
        };

        info!("Opening {} in the system player", asset.path().display());
        if let Err(e) = opener::open(asset.path()) {
            warn!("Could not open video player: {}", e);
            self.session.note_error(&LuminaError::Io(std::io::Error::other(e)));
        }
    }

    fn save_video(&mut self) {
        let Some(asset) = &self.result else {
            return;
        };

        let Some(dest) = rfd::FileDialog::new()
            .set_file_name("lumina_output.mp4")
            .add_filter("MP4 video", &["mp4"])
            .save_file()
        else {
            return;
        };

        if let Err(e) = pollster::block_on(asset.save_as(&dest)) {
            self.session.note_error(&e);
        }
    }

    fn set_result(&mut self, asset: Option<LocalAsset>) {
        self.ui.ui_ctx.video = asset.as_ref().map(|a| a.path().to_path_buf());
        // Dropping the old asset deletes its file
        self.result = asset;
    }

    /// Forward session changes to the panels.
    fn sync_ui(&mut self) {
        while let Ok(event) = self.session_rx.try_recv() {
            self.ui.on_session_event(event);
        }
        self.window.request_redraw();
    }

    pub fn render(&mut self) -> anyhow::Result<()> {
        let size = self.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let output = match self.gfx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.gfx.reconfigure();
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self.gfx.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder")
        });

        let full_output = self.ui.draw(&self.window);

        let platform_output = full_output.platform_output.clone();
        self.ui.egui_state.handle_platform_output(&self.window, platform_output);

        let paint_jobs = self.ui.egui_ctx.tessellate(full_output.shapes.clone(), full_output.pixels_per_point);

        let screen_desc = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        for (id, delta) in &full_output.textures_delta.set {
            self.ui.egui_renderer.update_texture(&self.gfx.device, &self.gfx.queue, *id, delta);
        }

        let user_buffers = self.ui.egui_renderer.update_buffers(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            &paint_jobs,
            &screen_desc,
        );

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r: 0.04, g: 0.04, b: 0.05, a: 1.0 }),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });

            self.ui.egui_renderer.render(&mut rpass.forget_lifetime(), &paint_jobs, &screen_desc);
        }

        for id in &full_output.textures_delta.free {
            self.ui.egui_renderer.free_texture(id);
        }

        self.gfx.queue.submit(user_buffers.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        // Spinners ask for continuous repaints while a job runs
        let repaint_now = full_output
            .viewport_output
            .get(&egui::ViewportId::ROOT)
            .is_some_and(|viewport| viewport.repaint_delay.is_zero());
        if repaint_now {
            self.window.request_redraw();
        }

        Ok(())
    }
}
