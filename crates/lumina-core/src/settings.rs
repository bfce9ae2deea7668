use serde::{Deserialize, Serialize};

pub const DEFAULT_CONTEXT: &str = "The person is delivering a high-end corporate presentation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureIntensity {
    #[default]
    Low,
    Medium,
}

impl GestureIntensity {
    /// Token used in the generation prompt
    pub fn prompt_token(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
        }
    }

    /// Label for display in UI
    pub fn label(&self) -> &str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
        }
    }

    pub fn all() -> [GestureIntensity; 2] {
        [Self::Low, Self::Medium]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacialExpressiveness {
    #[default]
    Natural,
    Expressive,
}

impl FacialExpressiveness {
    pub fn prompt_token(&self) -> &str {
        match self {
            Self::Natural => "natural",
            Self::Expressive => "expressive",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Natural => "Natural",
            Self::Expressive => "Expressive",
        }
    }

    pub fn all() -> [FacialExpressiveness; 2] {
        [Self::Natural, Self::Expressive]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundStyle {
    #[default]
    Cinematic,
    Neutral,
    Office,
}

impl BackgroundStyle {
    pub fn prompt_token(&self) -> &str {
        match self {
            Self::Cinematic => "cinematic",
            Self::Neutral => "neutral",
            Self::Office => "office",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Cinematic => "Cinematic Studio",
            Self::Neutral => "Neutral Gradient",
            Self::Office => "Executive Office",
        }
    }

    pub fn all() -> [BackgroundStyle; 3] {
        [Self::Cinematic, Self::Neutral, Self::Office]
    }
}

/// Style choices captured from the form. Copied into the request on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub gesture_intensity: GestureIntensity,
    pub facial_expressiveness: FacialExpressiveness,
    pub background_style: BackgroundStyle,
}

impl GenerationSettings {
    /// Compose the full talking-head prompt for the given scene context.
    pub fn compose_prompt(&self, context: &str) -> String {
        let lines = [
            "A cinematic, ultra-realistic 1080p close-up talking head video.".to_string(),
            "Subject is the person in the provided photo.".to_string(),
            "Mood: Professional and elegant.".to_string(),
            format!("Motion: {} facial expressions,", self.facial_expressiveness.prompt_token()),
            format!("{} hand gestures and head movement,", self.gesture_intensity.prompt_token()),
            "natural blinking and gaze.".to_string(),
            format!("Context: {}.", context.trim().trim_end_matches('.')),
            format!("Background: {} setting with soft bokeh.", self.background_style.prompt_token()),
            "The animation must look fluid and lifelike, suitable for a high-end personal brand presentation.".to_string(),
        ];

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.gesture_intensity, GestureIntensity::Low);
        assert_eq!(settings.facial_expressiveness, FacialExpressiveness::Natural);
        assert_eq!(settings.background_style, BackgroundStyle::Cinematic);
    }

    #[test]
    fn test_prompt_contains_choices() {
        let settings = GenerationSettings {
            gesture_intensity: GestureIntensity::Medium,
            facial_expressiveness: FacialExpressiveness::Expressive,
            background_style: BackgroundStyle::Office,
        };
        let prompt = settings.compose_prompt(DEFAULT_CONTEXT);

        assert!(prompt.contains("expressive facial expressions"));
        assert!(prompt.contains("medium hand gestures"));
        assert!(prompt.contains("office setting"));
        assert!(prompt.contains("Context: The person is delivering a high-end corporate presentation."));
        assert!(!prompt.contains(".."));
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&BackgroundStyle::Neutral).unwrap();
        assert_eq!(json, "\"neutral\"");
    }

    #[test]
    fn test_all_options() {
        assert_eq!(BackgroundStyle::all().len(), 3);
        assert_eq!(GestureIntensity::all().len(), 2);
        assert_eq!(FacialExpressiveness::all().len(), 2);
    }
}
