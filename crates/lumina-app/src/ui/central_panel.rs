use egui::{Color32, Context, RichText};
use lumina_core::AppStatus;
use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct CentralPanel {}

impl UiComponent for CentralPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.25);

                if let Some(path) = &ui_ctx.video {
                    ui.heading(RichText::new("✅ Video ready").color(Color32::GREEN));
                    ui.add_space(5.0);
                    ui.label(RichText::new(path.display().to_string()).monospace().small());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button(RichText::new("▶ Play").size(14.0)).clicked() {
                            ui_ctx.send_event(UiEvent::PlayVideo);
                        }
                        if ui.button("💾 Download 1080p").clicked() {
                            ui_ctx.send_event(UiEvent::SaveVideo);
                        }
                    });
                } else if ui_ctx.status == AppStatus::Processing {
                    ui.spinner();
                    ui.add_space(10.0);
                    ui.heading("Synthesizing Lumina Frame");
                    ui.label(RichText::new("Polling the generation job, this usually takes a few minutes.").color(Color32::GRAY));
                } else {
                    ui.heading(RichText::new("Cinematic Preview").color(Color32::LIGHT_GRAY));
                    ui.label(
                        RichText::new("Your generated high-resolution talking head video will appear here.")
                            .color(Color32::GRAY)
                    );
                }
            });
        });
    }
}
