use image::{imageops, DynamicImage, RgbImage};

/// Flattens any alpha-carrying image onto opaque white; other modes become RGB8.
pub fn normalize_to_rgb(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = f32::from(src[3]) / 255.0;
        for i in 0..3 {
            let over = f32::from(src[i]) * alpha + 255.0 * (1.0 - alpha);
            dst[i] = clamp_u8(over);
        }
    }
    out
}

pub fn apply_brightness_in_place(image: &mut RgbImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for i in 0..3 {
            pixel[i] = clamp_u8(f32::from(pixel[i]) * factor);
        }
    }
}

/// Scales distance from the image's mean gray level.
pub fn apply_contrast_in_place(image: &mut RgbImage, factor: f32) {
    let mean = mean_luma(image);
    for pixel in image.pixels_mut() {
        for i in 0..3 {
            let centered = f32::from(pixel[i]) - mean;
            pixel[i] = clamp_u8(centered * factor + mean);
        }
    }
}

pub fn apply_saturation_in_place(image: &mut RgbImage, factor: f32) {
    for pixel in image.pixels_mut() {
        let r = f32::from(pixel[0]);
        let g = f32::from(pixel[1]);
        let b = f32::from(pixel[2]);
        let gray = luma(r, g, b);
        pixel[0] = clamp_u8(gray + (r - gray) * factor);
        pixel[1] = clamp_u8(gray + (g - gray) * factor);
        pixel[2] = clamp_u8(gray + (b - gray) * factor);
    }
}

/// Blends against a 3x3 smoothed copy: factor > 1 sharpens, factor < 1 softens.
pub fn apply_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    if (factor - 1.0).abs() <= f32::EPSILON {
        return image.clone();
    }
    let smoothed = smooth_3x3(image);
    let mut out = image.clone();
    for (dst, (orig, soft)) in out.pixels_mut().zip(image.pixels().zip(smoothed.pixels())) {
        for i in 0..3 {
            let base = f32::from(soft[i]);
            dst[i] = clamp_u8(base + (f32::from(orig[i]) - base) * factor);
        }
    }
    out
}

/// Warm shifts push red harder than they pull blue; cool shifts do the reverse.
pub fn apply_temperature_in_place(image: &mut RgbImage, temperature: f32) {
    let (r_mul, b_mul) = if temperature > 0.0 {
        (1.0 + temperature * 0.1, 1.0 - temperature * 0.05)
    } else {
        (1.0 + temperature * 0.05, 1.0 - temperature * 0.1)
    };
    for pixel in image.pixels_mut() {
        pixel[0] = clamp_u8(f32::from(pixel[0]) * r_mul);
        pixel[2] = clamp_u8(f32::from(pixel[2]) * b_mul);
    }
}

/// Gaussian falloff from the image center. The center keeps its value and the
/// multiplier never drops below `1 - strength`.
pub fn apply_vignette_in_place(image: &mut RgbImage, strength: f32) {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || strength <= 0.0 {
        return;
    }
    let strength = strength.min(1.0);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = width.max(height) as f32 * 0.5;
    let denom = (2.0 * radius * radius).max(f32::EPSILON);

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = x as f32 - cx;
        let dy = y as f32 - cy;
        let falloff = (-(dx * dx + dy * dy) / denom).exp();
        let multiplier = falloff * strength + (1.0 - strength);
        for i in 0..3 {
            pixel[i] = clamp_u8(f32::from(pixel[i]) * multiplier);
        }
    }
}

const SMOOTH_KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];

fn smooth_3x3(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    if width < 3 || height < 3 {
        return image.clone();
    }
    let mut out = imageops::filter3x3(image, &SMOOTH_KERNEL);
    // edge rows and columns keep their source pixels
    for (x, y, pixel) in image.enumerate_pixels() {
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            out.put_pixel(x, y, *pixel);
        }
    }
    out
}

fn mean_luma(image: &RgbImage) -> f32 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0.0;
    }
    let total: f64 = image
        .pixels()
        .map(|p| f64::from(luma(f32::from(p[0]), f32::from(p[1]), f32::from(p[2])).round()))
        .sum();
    (total / count as f64).round() as f32
}

fn luma(r: f32, g: f32, b: f32) -> f32 {
    0.299 * r + 0.587 * g + 0.114 * b
}

pub(crate) fn clamp_u8(value: f32) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    value.clamp(0.0, 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 20 % 256) as u8, (y * 30 % 256) as u8, ((x + y) * 10 % 256) as u8])
        })
    }

    #[test]
    fn transparent_pixels_become_white() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let out = normalize_to_rgb(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn half_transparent_pixels_blend_with_white() {
        let mut rgba = RgbaImage::new(1, 1);
        rgba.put_pixel(0, 0, Rgba([0, 0, 0, 128]));
        let out = normalize_to_rgb(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(out.get_pixel(0, 0), &Rgb([127, 127, 127]));
    }

    #[test]
    fn neutral_factors_are_identity() {
        let original = gradient(6, 5);
        let mut img = original.clone();
        apply_brightness_in_place(&mut img, 1.0);
        apply_contrast_in_place(&mut img, 1.0);
        apply_saturation_in_place(&mut img, 1.0);
        let img = apply_sharpness(&img, 1.0);
        assert_eq!(img, original);
    }

    #[test]
    fn zero_saturation_produces_gray() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([200, 100, 50]));
        apply_saturation_in_place(&mut img, 0.0);
        let p = img.get_pixel(0, 0);
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }

    #[test]
    fn contrast_pivots_on_mean_gray() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([100, 100, 100]));
        img.put_pixel(1, 0, Rgb([200, 200, 200]));
        apply_contrast_in_place(&mut img, 2.0);
        assert_eq!(img.get_pixel(0, 0), &Rgb([50, 50, 50]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([250, 250, 250]));
    }

    #[test]
    fn warm_shift_is_asymmetric() {
        let mut img = RgbImage::from_pixel(1, 1, Rgb([100, 100, 100]));
        apply_temperature_in_place(&mut img, 1.0);
        assert_eq!(img.get_pixel(0, 0), &Rgb([110, 100, 95]));

        let mut img = RgbImage::from_pixel(1, 1, Rgb([100, 100, 100]));
        apply_temperature_in_place(&mut img, -1.0);
        assert_eq!(img.get_pixel(0, 0), &Rgb([95, 100, 110]));
    }

    #[test]
    fn vignette_keeps_center_and_darkens_corners() {
        let mut img = RgbImage::from_pixel(21, 21, Rgb([200, 200, 200]));
        apply_vignette_in_place(&mut img, 0.5);
        let center = img.get_pixel(10, 10)[0];
        let corner = img.get_pixel(0, 0)[0];
        assert!(center >= 198, "center was {center}");
        assert!(corner < center);
        assert!(f32::from(corner) >= 200.0 * 0.5 - 1.0);
    }

    #[test]
    fn vignette_tolerates_degenerate_sizes() {
        let mut empty = RgbImage::new(0, 0);
        apply_vignette_in_place(&mut empty, 0.4);
        let mut single = RgbImage::from_pixel(1, 1, Rgb([80, 90, 100]));
        apply_vignette_in_place(&mut single, 0.4);
        let p = single.get_pixel(0, 0);
        assert!(p[0] > 0 && p[0] <= 80);
        let mut wide = RgbImage::from_pixel(5, 1, Rgb([80, 80, 80]));
        apply_vignette_in_place(&mut wide, 0.4);
    }

    #[test]
    fn softening_uses_the_smoothed_copy_and_keeps_edges() {
        let mut img = RgbImage::from_pixel(3, 3, Rgb([0, 0, 0]));
        img.put_pixel(1, 1, Rgb([255, 255, 255]));

        let soft = apply_sharpness(&img, 0.0);
        let center = soft.get_pixel(1, 1)[0];
        assert!((97..=99).contains(&center), "center was {center}");
        assert_eq!(soft.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(soft.get_pixel(2, 1), &Rgb([0, 0, 0]));

        let sharp = apply_sharpness(&img, 2.0);
        assert_eq!(sharp.get_pixel(1, 1), &Rgb([255, 255, 255]));

        let flat = RgbImage::from_pixel(5, 4, Rgb([90, 120, 150]));
        assert_eq!(apply_sharpness(&flat, 1.8), flat);
    }

    #[test]
    fn sharpness_on_tiny_images_is_safe() {
        let img = gradient(2, 2);
        assert_eq!(apply_sharpness(&img, 1.5), img);
        let empty = RgbImage::new(0, 0);
        assert_eq!(apply_sharpness(&empty, 0.5).dimensions(), (0, 0));
    }

    #[test]
    fn clamp_handles_non_finite_values() {
        assert_eq!(clamp_u8(f32::NAN), 0);
        assert_eq!(clamp_u8(300.0), 255);
        assert_eq!(clamp_u8(-5.0), 0);
    }
}
