//! Vinyl record composite for playlist cover art.
//!
//! The cover is center-cropped to a square, laid on a black disc with
//! concentric grooves, and its middle is kept as the record label. Everything
//! here is pure and deterministic: the same input always gives the same bytes.

use std::io::Cursor;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};

use crate::{Res, error::AppError};

/// Distance between two grooves in pixels.
pub const GROOVE_SPACING: f32 = 6.0;

/// Radius of the label (the visible cover art) relative to the disc radius.
pub const LABEL_RATIO: f32 = 0.6;

pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const GROOVE: Rgba<u8> = Rgba([48, 48, 48, 255]);

/// Builds the vinyl composite. The output is square with side `min(width, height)`.
pub fn composite(source: &DynamicImage) -> Res<RgbaImage> {
    let (width, height) = source.dimensions();
    let side = width.min(height);
    if side == 0 {
        return Err(AppError::validation("the uploaded image is empty"));
    }

    let cover = source
        .crop_imm((width - side) / 2, (height - side) / 2, side, side)
        .to_rgba8();

    let mut record = RgbaImage::from_pixel(side, side, BACKGROUND);
    let center = side as f32 / 2.0;

    draw_grooves(&mut record, center, center);
    paste_label(&mut record, &cover, center, center * LABEL_RATIO);

    Ok(record)
}

/// Decodes an uploaded image and returns the composite encoded as PNG.
pub fn render_png(bytes: &[u8]) -> Res<Vec<u8>> {
    let source = image::load_from_memory(bytes)?;
    let record = composite(&source)?;

    let mut png = Vec::new();
    record.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn distance_from_center(x: u32, y: u32, center: f32) -> f32 {
    let dx = x as f32 + 0.5 - center;
    let dy = y as f32 + 0.5 - center;
    (dx * dx + dy * dy).sqrt()
}

/// One pixel wide rings from the outer edge inward, every `GROOVE_SPACING`
/// pixels, down to the center.
fn draw_grooves(record: &mut RgbaImage, center: f32, outer_radius: f32) {
    let first_ring = outer_radius - 0.5;

    for (x, y, pixel) in record.enumerate_pixels_mut() {
        let inset = first_ring - distance_from_center(x, y, center);
        if inset < -0.5 {
            continue;
        }
        let ring = (inset / GROOVE_SPACING).round() * GROOVE_SPACING;
        if (inset - ring).abs() < 0.5 && first_ring - ring > 0.0 {
            *pixel = GROOVE;
        }
    }
}

/// Blends the cover over the record inside a circle of `radius`.
fn paste_label(record: &mut RgbaImage, cover: &RgbaImage, center: f32, radius: f32) {
    for (x, y, pixel) in record.enumerate_pixels_mut() {
        if distance_from_center(x, y, center) > radius {
            continue;
        }
        *pixel = blend(*cover.get_pixel(x, y), *pixel);
    }
}

/// Source-over blend onto an opaque destination.
fn blend(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let alpha = src[3] as u32;
    let mix = |s: u8, d: u8| ((s as u32 * alpha + d as u32 * (255 - alpha) + 127) / 255) as u8;
    Rgba([mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), 255])
}
