//! Integration tests for raster decoding across container formats.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use image::ImageFormat;
use qr_scan_adapters::{DecoderLimits, ImageRasterDecoder};
use qr_scan_core::{DecodeError, RasterDecoder};
use qr_scan_test_support::{encode, SyntheticImageBuilder};

fn decode_as(format: ImageFormat) -> qr_scan_core::DecodedRaster {
    let img = SyntheticImageBuilder::checkerboard(24, 16, 4);
    let bytes = encode(&img, format).expect("fixture should encode");
    ImageRasterDecoder::new()
        .decode(&bytes)
        .unwrap_or_else(|e| panic!("{format:?} should decode: {e}"))
}

#[test]
fn test_decode_png() {
    let raster = decode_as(ImageFormat::Png);
    assert_eq!((raster.width(), raster.height()), (24, 16));
    assert_eq!(raster.format(), Some("png"));
    assert_eq!(raster.luma(0, 0), 255);
    assert_eq!(raster.luma(4, 0), 0);
}

#[test]
fn test_decode_jpeg() {
    let raster = decode_as(ImageFormat::Jpeg);
    assert_eq!((raster.width(), raster.height()), (24, 16));
    assert_eq!(raster.format(), Some("jpeg"));
}

#[test]
fn test_decode_gif() {
    let raster = decode_as(ImageFormat::Gif);
    assert_eq!((raster.width(), raster.height()), (24, 16));
    assert_eq!(raster.format(), Some("gif"));
}

#[test]
fn test_decode_bmp() {
    let raster = decode_as(ImageFormat::Bmp);
    assert_eq!((raster.width(), raster.height()), (24, 16));
    assert_eq!(raster.format(), Some("bmp"));
    assert_eq!(raster.luma(0, 0), 255);
}

#[test]
fn test_decode_webp() {
    let raster = decode_as(ImageFormat::WebP);
    assert_eq!((raster.width(), raster.height()), (24, 16));
    assert_eq!(raster.format(), Some("webp"));
}

#[test]
fn test_raster_is_single_channel() {
    let raster = decode_as(ImageFormat::Png);
    assert_eq!(raster.pixels().len(), 24 * 16);
}

#[test]
fn test_random_bytes_are_rejected() {
    let noise: Vec<u8> = (0..=250u8).cycle().step_by(31).take(512).collect();
    let err = ImageRasterDecoder::new().decode(&noise).unwrap_err();
    assert!(matches!(err, DecodeError::Unsupported(_)));
}

#[test]
fn test_truncated_png_is_corrupt() {
    let img = SyntheticImageBuilder::noise(64, 64, 3);
    let bytes = encode(&img, ImageFormat::Png).unwrap();
    let err = ImageRasterDecoder::new()
        .decode(&bytes[..bytes.len() / 3])
        .unwrap_err();
    assert!(matches!(err, DecodeError::Corrupt(_)), "got {err:?}");
}

#[test]
fn test_limits_reject_oversized_images() {
    let bytes = SyntheticImageBuilder::blank_bytes(200, 100, ImageFormat::Png).unwrap();
    let decoder = ImageRasterDecoder::with_limits(DecoderLimits {
        max_image_width: Some(100),
        ..DecoderLimits::default()
    });

    let err = decoder.decode(&bytes).unwrap_err();
    assert!(matches!(err, DecodeError::Unsupported(_)), "got {err:?}");

    assert!(ImageRasterDecoder::new().decode(&bytes).is_ok());
}
