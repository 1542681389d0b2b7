use image::{DynamicImage, RgbImage};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::color_ops::{
    apply_brightness_in_place, apply_contrast_in_place, apply_saturation_in_place,
    apply_sharpness, apply_temperature_in_place, apply_vignette_in_place, normalize_to_rgb,
};
use super::source::{
    fit_within, jpeg_data_url, ImageFetchError, SharedImageSource, DEFAULT_JPEG_QUALITY,
    MAX_IMAGE_DIMENSION,
};
use super::{resolve_style_preset, StyleConfig};

pub const PREVIEW_DIMENSION: u32 = 400;
pub const PREVIEW_INTENSITY: f32 = 0.8;
pub const PREVIEW_JPEG_QUALITY: u8 = 75;

/// Applies a named preset at `intensity` in the fixed stage order.
pub fn apply_style(image: &DynamicImage, style_name: &str, intensity: f32) -> RgbImage {
    let preset = resolve_style_preset(style_name);
    debug!(style = preset.name, intensity, "applying style preset");
    apply_style_config(image, &preset.config, intensity)
}

pub fn apply_style_config(image: &DynamicImage, preset: &StyleConfig, intensity: f32) -> RgbImage {
    let effective = preset.at_intensity(intensity);
    let mut out = normalize_to_rgb(image);

    apply_brightness_in_place(&mut out, effective.brightness);
    apply_contrast_in_place(&mut out, effective.contrast);
    apply_saturation_in_place(&mut out, effective.saturation);
    out = apply_sharpness(&out, effective.sharpness);
    if preset.temperature != 0.0 {
        apply_temperature_in_place(&mut out, effective.temperature);
    }
    if preset.vignette > 0.0 {
        apply_vignette_in_place(&mut out, effective.vignette);
    }
    out
}

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error(transparent)]
    Fetch(#[from] ImageFetchError),
    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),
    #[error("enhancement task failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnhancedImage {
    pub original_url: String,
    pub enhanced_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BatchOutcome {
    pub enhanced: Vec<EnhancedImage>,
    pub failed: Vec<String>,
}

impl BatchOutcome {
    pub fn total(&self) -> usize {
        self.enhanced.len() + self.failed.len()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fetch, downsize and restyle remote images.
#[derive(Clone)]
pub struct StyleEnhancer {
    source: SharedImageSource,
    max_dimension: u32,
}

impl StyleEnhancer {
    pub fn new(source: SharedImageSource) -> Self {
        Self {
            source,
            max_dimension: MAX_IMAGE_DIMENSION,
        }
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension.max(1);
        self
    }

    pub async fn enhance_from_url(
        &self,
        image_url: &str,
        style_name: &str,
        intensity: f32,
    ) -> Result<RgbImage, EnhanceError> {
        info!(style = style_name, intensity, "enhancing image from url");
        let image = self.source.fetch(image_url).await?;
        let max_dimension = self.max_dimension;
        let style = style_name.to_string();
        let result = tokio::task::spawn_blocking(move || {
            let resized = fit_within(image, max_dimension);
            apply_style(&resized, style.as_str(), intensity)
        })
        .await
        .map_err(|e| EnhanceError::Join(e.to_string()))?;
        info!(
            width = result.width(),
            height = result.height(),
            "enhancement complete"
        );
        Ok(result)
    }

    /// Low-resolution JPEG data URL at the preview intensity.
    pub async fn preview(&self, image_url: &str, style_name: &str) -> Result<String, EnhanceError> {
        let image = self.source.fetch(image_url).await?;
        let style = style_name.to_string();
        tokio::task::spawn_blocking(move || {
            let thumb = image.thumbnail(PREVIEW_DIMENSION, PREVIEW_DIMENSION);
            let styled = apply_style(&thumb, style.as_str(), PREVIEW_INTENSITY);
            jpeg_data_url(&styled, PREVIEW_JPEG_QUALITY).map_err(EnhanceError::Encode)
        })
        .await
        .map_err(|e| EnhanceError::Join(e.to_string()))?
    }

    pub async fn enhance_to_data_url(
        &self,
        image_url: &str,
        style_name: &str,
        intensity: f32,
    ) -> Result<String, EnhanceError> {
        let styled = self
            .enhance_from_url(image_url, style_name, intensity)
            .await?;
        jpeg_data_url(&styled, DEFAULT_JPEG_QUALITY).map_err(EnhanceError::Encode)
    }

    /// Processes each URL in order; a failing item is recorded and skipped.
    pub async fn enhance_batch(
        &self,
        image_urls: &[String],
        style_name: &str,
        intensity: f32,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for url in image_urls {
            match self
                .enhance_to_data_url(url.as_str(), style_name, intensity)
                .await
            {
                Ok(enhanced_url) => outcome.enhanced.push(EnhancedImage {
                    original_url: url.clone(),
                    enhanced_url,
                }),
                Err(error) => {
                    warn!(url = %url, error = %error, "batch item failed");
                    outcome.failed.push(url.clone());
                }
            }
        }
        info!(
            total = outcome.total(),
            failed = outcome.failed.len(),
            "batch enhancement finished"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use image::{Rgb, Rgba, RgbaImage};

    use crate::style::source::ImageSource;

    fn photo(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (40 + x * 7 % 180) as u8,
                (60 + y * 11 % 150) as u8,
                (90 + (x + y) * 5 % 120) as u8,
            ])
        }))
    }

    #[test]
    fn unknown_style_matches_cinematic() {
        let img = photo(16, 12);
        assert_eq!(apply_style(&img, "polaroid", 0.8), apply_style(&img, "cinematic", 0.8));
        assert_eq!(apply_style(&img, "CINEMATIC", 0.8), apply_style(&img, "cinematic", 0.8));
    }

    #[test]
    fn zero_intensity_only_normalizes() {
        let img = photo(17, 9);
        let expected = img.to_rgb8();
        for style in crate::style::available_styles() {
            let out = apply_style(&img, style, 0.0);
            for (a, b) in out.pixels().zip(expected.pixels()) {
                for i in 0..3 {
                    assert!(
                        (i16::from(a[i]) - i16::from(b[i])).abs() <= 1,
                        "style {style} drifted"
                    );
                }
            }
        }
    }

    #[test]
    fn zero_intensity_flattens_alpha_onto_white() {
        let rgba = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 0]));
        let out = apply_style(&DynamicImage::ImageRgba8(rgba), "moody", 0.0);
        assert!(out.pixels().all(|p| p == &Rgb([255, 255, 255])));
    }

    #[test]
    fn full_intensity_changes_pixels() {
        let img = photo(10, 10);
        assert_ne!(apply_style(&img, "vibrant", 1.0), img.to_rgb8());
    }

    #[test]
    fn degenerate_images_survive_every_style() {
        for (w, h) in [(0, 0), (1, 1), (1, 5), (0, 3)] {
            let img = DynamicImage::ImageRgb8(RgbImage::new(w, h));
            for style in crate::style::available_styles() {
                let out = apply_style(&img, style, 1.0);
                assert_eq!(out.dimensions(), (w, h));
            }
        }
    }

    struct ScriptedSource {
        failing: Vec<String>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageSource for ScriptedSource {
        async fn fetch(&self, url: &str) -> Result<DynamicImage, ImageFetchError> {
            self.seen
                .lock()
                .expect("seen mutex poisoned")
                .push(url.to_string());
            if self.failing.iter().any(|f| f == url) {
                return Err(ImageFetchError::Other(format!("unreachable: {url}")));
            }
            Ok(photo(8, 8))
        }
    }

    #[tokio::test]
    async fn batch_isolates_failures_in_order() {
        let source = Arc::new(ScriptedSource {
            failing: vec![String::from("https://img/2.png")],
            seen: Mutex::new(Vec::new()),
        });
        let enhancer = StyleEnhancer::new(source.clone());
        let urls = vec![
            String::from("https://img/1.png"),
            String::from("https://img/2.png"),
            String::from("https://img/3.png"),
        ];

        let outcome = enhancer.enhance_batch(&urls, "warm", 0.8).await;

        assert_eq!(outcome.enhanced.len(), 2);
        assert_eq!(outcome.failed, vec![String::from("https://img/2.png")]);
        assert_eq!(outcome.enhanced[0].original_url, "https://img/1.png");
        assert_eq!(outcome.enhanced[1].original_url, "https://img/3.png");
        assert!(outcome.enhanced[0]
            .enhanced_url
            .starts_with("data:image/jpeg;base64,"));
        assert!(!outcome.all_succeeded());
        assert_eq!(
            *source.seen.lock().expect("seen mutex poisoned"),
            urls,
            "every item should be attempted"
        );
    }

    #[tokio::test]
    async fn enhance_downsizes_large_inputs() {
        let source = Arc::new(ScriptedSource {
            failing: Vec::new(),
            seen: Mutex::new(Vec::new()),
        });
        let enhancer = StyleEnhancer::new(source).with_max_dimension(4);
        let out = enhancer
            .enhance_from_url("https://img/big.png", "bright", 0.5)
            .await
            .expect("enhance should succeed");
        assert_eq!(out.dimensions(), (4, 4));
    }

    #[tokio::test]
    async fn fetch_errors_propagate_from_single_enhance() {
        let source = Arc::new(ScriptedSource {
            failing: vec![String::from("https://img/x.png")],
            seen: Mutex::new(Vec::new()),
        });
        let enhancer = StyleEnhancer::new(source);
        let err = enhancer
            .preview("https://img/x.png", "cool")
            .await
            .expect_err("fetch failure should surface");
        assert!(matches!(err, EnhanceError::Fetch(_)));
    }
}
