use egui::{Color32, Context, RichText};
use lumina_core::AppStatus;
use crate::ui::{UiComponent, UiContext};

#[derive(Default)]
pub struct TopPanel {}

pub fn status_color(status: AppStatus) -> Color32 {
    match status {
        AppStatus::Idle => Color32::GRAY,
        AppStatus::Configuring => Color32::LIGHT_BLUE,
        AppStatus::Processing => Color32::from_rgb(245, 158, 11),
        AppStatus::Completed => Color32::GREEN,
        AppStatus::Error => Color32::RED,
    }
}

impl UiComponent for TopPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("LUMINA STUDIO").strong().color(Color32::from_rgb(251, 191, 36)));
                ui.separator();
                ui.label(RichText::new("Status:").color(Color32::LIGHT_BLUE));
                ui.label(RichText::new(ui_ctx.status.label()).color(status_color(ui_ctx.status)));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.hyperlink_to("Billing Info", "https://ai.google.dev/gemini-api/docs/billing");
                    ui.separator();
                    ui.label(RichText::new(&ui_ctx.model).small().color(Color32::GRAY));
                    if !ui_ctx.has_key {
                        ui.label(RichText::new("⚠ No API key").color(Color32::RED));
                    }
                });
            });
        });
    }
}
