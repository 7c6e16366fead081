use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use playlist_analyzer::{
    AppError,
    vinyl::{BACKGROUND, GROOVE, GROOVE_SPACING, composite, render_png},
};

fn solid(width: u32, height: u32, color: Rgba<u8>) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, color))
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
    bytes
}

#[test]
fn test_output_is_square_of_shorter_side() {
    let record = composite(&solid(120, 80, Rgba([200, 10, 10, 255]))).unwrap();
    assert_eq!(record.dimensions(), (80, 80));

    let record = composite(&solid(50, 90, Rgba([200, 10, 10, 255]))).unwrap();
    assert_eq!(record.dimensions(), (50, 50));
}

#[test]
fn test_corners_are_background_and_center_is_cover() {
    let red = Rgba([200, 10, 10, 255]);
    let record = composite(&solid(100, 100, red)).unwrap();

    for (x, y) in [(0, 0), (99, 0), (0, 99), (99, 99)] {
        assert_eq!(*record.get_pixel(x, y), BACKGROUND, "corner {x},{y}");
    }
    assert_eq!(*record.get_pixel(50, 50), red);
}

#[test]
fn test_center_crop_keeps_middle_of_wide_image() {
    // left and right thirds blue, middle green
    let mut source = RgbaImage::from_pixel(90, 30, Rgba([0, 0, 255, 255]));
    for x in 30..60 {
        for y in 0..30 {
            source.put_pixel(x, y, Rgba([0, 255, 0, 255]));
        }
    }

    let record = composite(&DynamicImage::ImageRgba8(source)).unwrap();

    assert_eq!(record.dimensions(), (30, 30));
    assert_eq!(*record.get_pixel(15, 15), Rgba([0, 255, 0, 255]));
}

#[test]
fn test_render_is_deterministic() {
    let png = encode(&solid(64, 48, Rgba([20, 120, 220, 255])), ImageFormat::Png);

    let first = render_png(&png).unwrap();
    let second = render_png(&png).unwrap();

    assert_eq!(first, second);
    let decoded = image::load_from_memory(&first).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (48, 48));
}

#[test]
fn test_jpeg_input_is_accepted() {
    let jpeg = encode(
        &DynamicImage::ImageRgb8(image::RgbImage::from_pixel(40, 40, image::Rgb([90, 90, 90]))),
        ImageFormat::Jpeg,
    );

    assert!(render_png(&jpeg).is_ok());
}

#[test]
fn test_invalid_bytes_are_rejected() {
    let err = render_png(b"definitely not an image").unwrap_err();
    assert!(matches!(err, AppError::Image(_)));
}

#[test]
fn test_empty_image_is_rejected() {
    let err = composite(&solid(0, 10, Rgba([0, 0, 0, 255]))).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[test]
fn test_grooves_start_at_the_edge_and_repeat_inward() {
    let record = composite(&solid(100, 100, Rgba([200, 10, 10, 255]))).unwrap();

    // column 50 from the top edge; the label starts 20 pixels further in
    assert_eq!(*record.get_pixel(50, 0), GROOVE);
    assert_eq!(*record.get_pixel(50, GROOVE_SPACING as u32), GROOVE);
    assert_eq!(*record.get_pixel(50, 2 * GROOVE_SPACING as u32), GROOVE);
    assert_eq!(*record.get_pixel(50, 3), BACKGROUND);
    assert_eq!(*record.get_pixel(50, 9), BACKGROUND);
    assert_eq!(*record.get_pixel(0, 50), GROOVE);
}

#[test]
fn test_transparent_cover_shows_grooves_under_label() {
    let record = composite(&solid(100, 100, Rgba([0, 0, 0, 0]))).unwrap();

    assert_eq!(*record.get_pixel(50, 24), GROOVE);
    assert_eq!(*record.get_pixel(50, 50), BACKGROUND);
}
