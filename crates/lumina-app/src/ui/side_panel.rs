use egui::{Color32, Context, RichText};
use lumina_core::{
    AppStatus, BackgroundStyle, FacialExpressiveness, GenerationSettings, GestureIntensity, MediaKind,
};
use crate::ui::{UiComponent, UiContext, UiEvent};

#[derive(Default)]
pub struct SidePanel {
    settings: GenerationSettings,
    consent: bool,
}

impl SidePanel {
    fn media_slot(ui: &mut egui::Ui, ui_ctx: &UiContext, kind: MediaKind, loaded: Option<&String>, hint: &str) {
        let text = match loaded {
            Some(name) => RichText::new(format!("✅ {}", name)).color(Color32::from_rgb(251, 191, 36)),
            None => RichText::new(hint).color(Color32::GRAY),
        };

        let button = egui::Button::new(text).min_size(egui::vec2(ui.available_width(), 40.0));
        if ui.add_enabled(!ui_ctx.status.is_busy(), button).clicked() {
            ui_ctx.send_event(UiEvent::PickMedia(kind));
        }
    }
}

impl UiComponent for SidePanel {
    fn show(&mut self, ctx: &Context, ui_ctx: &UiContext) {
        egui::SidePanel::left("side_panel")
            .default_width(320.0)
            .show(ctx, |ui| {
                let before = self.settings;

                // === Identity Source ===
                ui.heading(RichText::new("Identity Source").size(16.0));
                ui.add_space(5.0);

                ui.label(RichText::new("PORTRAIT PHOTO").small().strong());
                Self::media_slot(ui, ui_ctx, MediaKind::Photo, ui_ctx.photo.as_ref(), "Choose a high-res portrait...");
                if let Some(texture) = &ui_ctx.photo_preview {
                    ui.add_space(4.0);
                    ui.vertical_centered(|ui| {
                        ui.add(egui::Image::new(texture).max_height(180.0).corner_radius(6.0));
                    });
                }
                ui.add_space(5.0);

                ui.label(RichText::new("VOICE FILE").small().strong());
                Self::media_slot(ui, ui_ctx, MediaKind::Voice, ui_ctx.voice.as_ref(), "Upload professional narration...");
                ui.label(RichText::new("MP3, WAV, M4A up to 50MB").small().color(Color32::GRAY));

                ui.separator();

                // === Refinement Controls ===
                ui.heading(RichText::new("Refinement Controls").size(16.0));
                ui.add_space(5.0);

                ui.label(RichText::new("GESTURE INTENSITY").small().strong());
                ui.horizontal(|ui| {
                    for option in GestureIntensity::all() {
                        ui.selectable_value(&mut self.settings.gesture_intensity, option, option.label());
                    }
                });

                ui.label(RichText::new("EXPRESSIVENESS").small().strong());
                ui.horizontal(|ui| {
                    for option in FacialExpressiveness::all() {
                        ui.selectable_value(&mut self.settings.facial_expressiveness, option, option.label());
                    }
                });

                ui.label(RichText::new("ENVIRONMENT STYLE").small().strong());
                egui::ComboBox::from_id_salt("background_style")
                    .selected_text(self.settings.background_style.label())
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for option in BackgroundStyle::all() {
                            ui.selectable_value(&mut self.settings.background_style, option, option.label());
                        }
                    });

                if self.settings != before {
                    ui_ctx.send_event(UiEvent::SettingsChanged(self.settings));
                }

                ui.separator();

                // === Consent ===
                let consent = ui.checkbox(
                    &mut self.consent,
                    RichText::new(
                        "I explicitly consent to using the uploaded image and audio for AI-generated \
                         synthetic media. I verify that I have the legal right to use this identity."
                    ).small(),
                );
                if consent.changed() {
                    ui_ctx.send_event(UiEvent::ConsentChanged(self.consent));
                }

                ui.add_space(8.0);

                // === Generate ===
                let busy = ui_ctx.status == AppStatus::Processing;
                let ready = !busy && ui_ctx.photo.is_some() && ui_ctx.voice.is_some();
                let label = if busy { "Generating Sequence..." } else { "🎬 Generate 1080p Video" };

                let generate_button = ui.add_enabled(
                    ready,
                    egui::Button::new(RichText::new(label).size(14.0))
                        .min_size(egui::vec2(ui.available_width(), 34.0)),
                );
                if generate_button.clicked() {
                    ui_ctx.send_event(UiEvent::Generate);
                }

                if busy {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        if ui.button("Cancel").clicked() {
                            ui_ctx.send_event(UiEvent::Cancel);
                        }
                    });
                } else if ui_ctx.status.is_terminal() && ui.button("🔄 Reset").clicked() {
                    ui_ctx.send_event(UiEvent::Reset);
                }
            });
    }
}
