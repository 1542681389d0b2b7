pub mod color_ops;
pub mod engine;
pub mod source;

use serde::Serialize;

pub use engine::{apply_style, EnhanceError, StyleEnhancer};

pub const DEFAULT_STYLE: &str = "cinematic";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StyleConfig {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub sharpness: f32,
    pub temperature: f32,
    pub vignette: f32,
}

impl StyleConfig {
    pub const NEUTRAL: Self = Self {
        brightness: 1.0,
        contrast: 1.0,
        saturation: 1.0,
        sharpness: 1.0,
        temperature: 0.0,
        vignette: 0.0,
    };

    /// Blends every parameter from neutral toward this preset.
    pub fn at_intensity(&self, intensity: f32) -> Self {
        let t = if intensity.is_finite() {
            intensity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let lerp = |neutral: f32, target: f32| neutral + (target - neutral) * t;
        Self {
            brightness: lerp(Self::NEUTRAL.brightness, self.brightness),
            contrast: lerp(Self::NEUTRAL.contrast, self.contrast),
            saturation: lerp(Self::NEUTRAL.saturation, self.saturation),
            sharpness: lerp(Self::NEUTRAL.sharpness, self.sharpness),
            temperature: lerp(Self::NEUTRAL.temperature, self.temperature),
            vignette: lerp(Self::NEUTRAL.vignette, self.vignette),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StylePreset {
    pub name: &'static str,
    pub config: StyleConfig,
    pub description: &'static str,
}

pub static STYLE_PRESETS: [StylePreset; 8] = [
    StylePreset {
        name: "cinematic",
        config: StyleConfig {
            brightness: 0.95,
            contrast: 1.15,
            saturation: 0.9,
            sharpness: 1.1,
            temperature: -0.2,
            vignette: 0.25,
        },
        description: "Hollywood-grade color grading with enhanced shadows and muted highlights for a film-like aesthetic.",
    },
    StylePreset {
        name: "vibrant",
        config: StyleConfig {
            brightness: 1.05,
            contrast: 1.1,
            saturation: 1.4,
            sharpness: 1.15,
            temperature: 0.1,
            vignette: 0.0,
        },
        description: "Boosted colors and contrast for eye-catching, high-energy visuals that pop.",
    },
    StylePreset {
        name: "minimal",
        config: StyleConfig {
            brightness: 1.1,
            contrast: 0.95,
            saturation: 0.7,
            sharpness: 1.0,
            temperature: 0.0,
            vignette: 0.0,
        },
        description: "Clean, bright aesthetics with reduced saturation for a modern, editorial look.",
    },
    StylePreset {
        name: "vintage",
        config: StyleConfig {
            brightness: 1.0,
            contrast: 1.05,
            saturation: 0.75,
            sharpness: 0.9,
            temperature: 0.3,
            vignette: 0.35,
        },
        description: "Warm tones and subtle vignette for a nostalgic, film photography feel.",
    },
    StylePreset {
        name: "moody",
        config: StyleConfig {
            brightness: 0.85,
            contrast: 1.2,
            saturation: 0.85,
            sharpness: 1.05,
            temperature: -0.3,
            vignette: 0.4,
        },
        description: "Deep shadows and cool tones for dramatic, atmospheric imagery.",
    },
    StylePreset {
        name: "warm",
        config: StyleConfig {
            brightness: 1.05,
            contrast: 1.05,
            saturation: 1.1,
            sharpness: 1.0,
            temperature: 0.4,
            vignette: 0.1,
        },
        description: "Golden, sun-kissed tones that add warmth and comfort to any image.",
    },
    StylePreset {
        name: "cool",
        config: StyleConfig {
            brightness: 1.0,
            contrast: 1.1,
            saturation: 0.95,
            sharpness: 1.05,
            temperature: -0.4,
            vignette: 0.15,
        },
        description: "Blue-tinted adjustments for a crisp, professional, tech-forward look.",
    },
    StylePreset {
        name: "bright",
        config: StyleConfig {
            brightness: 1.2,
            contrast: 1.0,
            saturation: 1.15,
            sharpness: 1.1,
            temperature: 0.15,
            vignette: 0.0,
        },
        description: "High brightness and clarity for fresh, airy, light-filled photos.",
    },
];

/// Exact (case-insensitive) preset lookup.
pub fn find_style_preset(name: &str) -> Option<&'static StylePreset> {
    let wanted = name.trim();
    STYLE_PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(wanted))
}

/// Preset lookup that silently falls back to the cinematic preset.
pub fn resolve_style_preset(name: &str) -> &'static StylePreset {
    find_style_preset(name).unwrap_or(&STYLE_PRESETS[0])
}

pub fn style_config(name: &str) -> StyleConfig {
    resolve_style_preset(name).config
}

pub fn style_description(name: &str) -> &'static str {
    find_style_preset(name)
        .map(|preset| preset.description)
        .unwrap_or("Custom style preset")
}

pub fn available_styles() -> Vec<&'static str> {
    STYLE_PRESETS.iter().map(|preset| preset.name).collect()
}

pub fn style_label(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
