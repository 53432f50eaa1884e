//! Synthetic image builders for testing.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use qr_scan_core::DecodedRaster;
use qrcode::{Color, QrCode};

/// Encodes a grayscale image into `format`.
///
/// GIF is written from RGBA, every other format from RGB, so each encoder
/// gets a color type it accepts.
///
/// # Errors
///
/// Returns an error if the encoder rejects the image.
pub fn encode(image: &GrayImage, format: ImageFormat) -> Result<Vec<u8>> {
    let dynamic = DynamicImage::ImageLuma8(image.clone());
    let dynamic = match format {
        ImageFormat::Gif => DynamicImage::ImageRgba8(dynamic.to_rgba8()),
        _ => DynamicImage::ImageRgb8(dynamic.to_rgb8()),
    };

    let mut buf = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut buf, format)
        .with_context(|| format!("Failed to encode {format:?}"))?;
    Ok(buf.into_inner())
}

/// Builder for images without QR content.
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    /// Creates a uniform image.
    #[must_use]
    pub fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    /// Creates a white image.
    #[must_use]
    pub fn blank(width: u32, height: u32) -> GrayImage {
        Self::uniform(width, height, u8::MAX)
    }

    /// Creates a high-contrast checkerboard pattern.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32, cell_size: u32) -> GrayImage {
        let cell = cell_size.max(1);
        GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([u8::MAX])
            } else {
                Luma([0])
            }
        })
    }

    /// Creates deterministic pseudo-random noise.
    #[must_use]
    pub fn noise(width: u32, height: u32, seed: u32) -> GrayImage {
        let mut state = seed.wrapping_mul(2_654_435_761).max(1);
        GrayImage::from_fn(width, height, |_, _| {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            Luma([state.to_le_bytes()[0]])
        })
    }

    /// Encodes a white image as `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects the image.
    pub fn blank_bytes(width: u32, height: u32, format: ImageFormat) -> Result<Vec<u8>> {
        encode(&Self::blank(width, height), format)
    }
}

/// A QR symbol painted into a scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSymbol {
    /// Encoded text.
    pub content: String,
    /// Left edge of the symbol in pixels.
    pub x: u32,
    /// Top edge of the symbol in pixels.
    pub y: u32,
    /// Side length of the symbol in pixels, quiet zone excluded.
    pub side: u32,
}

/// A rendered scene and the symbols it contains.
#[derive(Debug, Clone)]
pub struct QrScene {
    /// Rendered grayscale image.
    pub image: GrayImage,
    /// Symbols in the order they were added.
    pub symbols: Vec<PlacedSymbol>,
}

impl QrScene {
    /// Encodes the scene as `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects the image.
    pub fn encode(&self, format: ImageFormat) -> Result<Vec<u8>> {
        encode(&self.image, format)
    }

    /// Encodes the scene as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the encoder rejects the image.
    pub fn png(&self) -> Result<Vec<u8>> {
        self.encode(ImageFormat::Png)
    }

    /// The scene as an already decoded raster.
    #[must_use]
    pub fn raster(&self) -> DecodedRaster {
        DecodedRaster::new(self.image.clone())
    }

    /// Finds the placed symbol with `content`.
    #[must_use]
    pub fn symbol(&self, content: &str) -> Option<&PlacedSymbol> {
        self.symbols.iter().find(|s| s.content == content)
    }
}

struct Placement {
    content: String,
    x: u32,
    y: u32,
    module_size: u32,
}

/// Builder for scenes containing real QR symbols at known positions.
///
/// Symbols are rendered with the `qrcode` crate onto a white background.
/// Leave at least four modules of white around each symbol so detectors
/// see a quiet zone.
pub struct QrSceneBuilder {
    width: u32,
    height: u32,
    placements: Vec<Placement>,
}

impl QrSceneBuilder {
    /// Starts a white scene of the given size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            placements: Vec::new(),
        }
    }

    /// Places a symbol encoding `content` with its top-left corner at `(x, y)`.
    #[must_use]
    pub fn symbol(mut self, content: impl Into<String>, x: u32, y: u32, module_size: u32) -> Self {
        self.placements.push(Placement {
            content: content.into(),
            x,
            y,
            module_size: module_size.max(1),
        });
        self
    }

    /// Renders the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if a content string cannot be encoded or a symbol
    /// does not fit inside the scene.
    pub fn build(self) -> Result<QrScene> {
        let mut image = SyntheticImageBuilder::blank(self.width, self.height);
        let mut symbols = Vec::with_capacity(self.placements.len());

        for placement in self.placements {
            let code = QrCode::new(placement.content.as_bytes())
                .with_context(|| format!("Failed to encode {:?}", placement.content))?;
            let modules = u32::try_from(code.width()).context("QR symbol too large")?;
            let side = modules * placement.module_size;

            anyhow::ensure!(
                placement.x + side <= self.width && placement.y + side <= self.height,
                "symbol {:?} ({side}px) does not fit at ({}, {})",
                placement.content,
                placement.x,
                placement.y
            );

            let colors = code.to_colors();
            for (i, color) in colors.iter().enumerate() {
                if *color != Color::Dark {
                    continue;
                }
                let i = u32::try_from(i).context("QR symbol too large")?;
                let (mx, my) = (i % modules, i / modules);
                for dy in 0..placement.module_size {
                    for dx in 0..placement.module_size {
                        image.put_pixel(
                            placement.x + mx * placement.module_size + dx,
                            placement.y + my * placement.module_size + dy,
                            Luma([0]),
                        );
                    }
                }
            }

            symbols.push(PlacedSymbol {
                content: placement.content,
                x: placement.x,
                y: placement.y,
                side,
            });
        }

        Ok(QrScene { image, symbols })
    }
}
