//! Rasterize a display list into a PNG screenshot

use std::io::Cursor;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgba as Pixel, RgbaImage};

use super::layout::{CHAR_WIDTH, LINE_HEIGHT};
use super::paint::PaintCommand;
use super::Screenshot;
use crate::{Error, Result};

/// Glyph block drawn for each non-space character, in CSS pixels
const GLYPH_W: u32 = CHAR_WIDTH - 2;
const GLYPH_H: u32 = LINE_HEIGHT - 4;

fn blend(dst: &mut Pixel<u8>, (r, g, b, a): (u8, u8, u8, u8)) {
    if a == 255 {
        *dst = Pixel([r, g, b, 255]);
        return;
    }
    let alpha = a as f32 / 255.0;
    let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    let Pixel([dr, dg, db, da]) = *dst;
    *dst = Pixel([mix(r, dr), mix(g, dg), mix(b, db), da.max(a)]);
}

fn fill_rect(img: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64, rgba: (u8, u8, u8, u8)) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(img.width() as i64);
    let y1 = (y + h).min(img.height() as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            blend(img.get_pixel_mut(px as u32, py as u32), rgba);
        }
    }
}

/// Paint `commands` onto a `width` x `height` CSS-pixel canvas at `scale`.
///
/// Text is drawn as one solid block per character.
pub fn rasterize(
    commands: &[PaintCommand],
    width: u32,
    height: u32,
    scale: u32,
    background: (u8, u8, u8, u8),
) -> RgbaImage {
    let s = scale.max(1) as i64;
    let (r, g, b, a) = background;
    let mut img = RgbaImage::from_pixel(width * scale.max(1), height * scale.max(1), Pixel([r, g, b, a]));
    for cmd in commands {
        match cmd {
            PaintCommand::SolidRect { x, y, width, height, rgba } => {
                fill_rect(&mut img, *x as i64 * s, *y as i64 * s, *width as i64 * s, *height as i64 * s, *rgba);
            }
            PaintCommand::Text { x, y, text, rgba } => {
                for (i, ch) in text.chars().enumerate() {
                    if ch.is_whitespace() {
                        continue;
                    }
                    let gx = *x as i64 + (i as i64) * CHAR_WIDTH as i64 + 1;
                    let gy = *y as i64 + 2;
                    fill_rect(&mut img, gx * s, gy * s, GLYPH_W as i64 * s, GLYPH_H as i64 * s, *rgba);
                }
            }
        }
    }
    img
}

/// Encode as PNG. Full quality selects the strongest compression.
pub fn encode_png(img: &RgbaImage, quality: f32) -> Result<Screenshot> {
    let compression = if quality >= 1.0 {
        CompressionType::Best
    } else {
        CompressionType::Fast
    };
    let mut buf = Cursor::new(Vec::new());
    PngEncoder::new_with_quality(&mut buf, compression, FilterType::Adaptive)
        .write_image(img.as_raw(), img.width(), img.height(), ExtendedColorType::Rgba8)
        .map_err(|e| Error::RenderError(format!("PNG encoding failed: {}", e)))?;
    Ok(Screenshot {
        width: img.width(),
        height: img.height(),
        png_data: buf.into_inner(),
    })
}
