use lumina_core::{LocalAsset, MediaFile, MediaKind, Progress};
use crate::ui::UiEvent;

#[derive(Debug)]
pub enum LuminaEvent {
    Ui(UiEvent),
    Studio(StudioEvent),
}

/// Messages coming back from work running on the tokio runtime.
#[derive(Debug)]
pub enum StudioEvent {
    MediaLoaded {
        file: MediaFile,
        preview: Option<egui::ColorImage>,
    },
    MediaFailed {
        kind: MediaKind,
        error: lumina_core::LuminaError,
    },
    Progress(Progress),
    Finished(lumina_core::Result<LocalAsset>),
}
