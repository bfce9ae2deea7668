use egui::{Color32, Context, RichText};
use lumina_core::{AppStatus, LogLevel, SessionEvent};
use crate::ui::{UiComponent, UiContext};

#[derive(Default)]
pub struct LogPanel {
    scroll_to_top: bool,
}

impl UiComponent for LogPanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::TopBottomPanel::bottom("log_panel")
            .resizable(true)
            .min_height(120.0)
            .default_height(200.0)
            .show(ctx, |ui| {
                ui.heading(RichText::new("Processing Pipeline").size(14.0));
                ui.separator();

                let mut scroll = egui::ScrollArea::vertical().auto_shrink([false; 2]);
                if std::mem::take(&mut self.scroll_to_top) {
                    scroll = scroll.vertical_scroll_offset(0.0);
                }

                scroll.show(ui, |ui| {
                    if ui_ctx.log.is_empty() {
                        ui.label(RichText::new("No activity detected. Awaiting source data...").italics().color(Color32::DARK_GRAY));
                        return;
                    }

                    for (i, entry) in ui_ctx.log.iter().enumerate() {
                        let color = match entry.level {
                            LogLevel::Critical => Color32::RED,
                            _ if i == 0 && ui_ctx.status == AppStatus::Processing => Color32::from_rgb(245, 158, 11),
                            _ => Color32::LIGHT_GRAY,
                        };
                        let marker = if entry.is_critical() { "CRITICAL: " } else { "" };

                        ui.horizontal(|ui| {
                            ui.label(RichText::new(format!("[{}]", entry.timestamp)).monospace().small().color(Color32::GRAY));
                            ui.label(RichText::new(format!("{}{}", marker, entry.message)).monospace().small().color(color));
                        });
                    }
                });
            });
    }

    fn on_session_event(&mut self, event: &SessionEvent) {
        if matches!(event, SessionEvent::LogAppended(_) | SessionEvent::LogCleared) {
            self.scroll_to_top = true;
        }
    }
}
