//! Single-page PDF output: page geometry, aspect-fit placement and the
//! printpdf-backed document generator.

use std::io::BufWriter;

use printpdf::{ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px};
use serde::Deserialize;

use crate::{Error, Result};

/// Standard paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    A3,
    Letter,
}

impl PageFormat {
    /// Portrait width and height in millimetres.
    pub fn portrait_mm(self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::A3 => (297.0, 420.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Page format and orientation; all geometry is in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct PageLayout {
    pub format: PageFormat,
    pub orientation: Orientation,
}

impl PageLayout {
    pub fn width_mm(&self) -> f32 {
        self.size_mm().0
    }

    pub fn height_mm(&self) -> f32 {
        self.size_mm().1
    }

    pub fn size_mm(&self) -> (f32, f32) {
        let (w, h) = self.format.portrait_mm();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

/// Image position and size on the page, measured from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scale an image uniformly to fit the page and center it.
pub fn fit_centered(page_w: f32, page_h: f32, img_w: f32, img_h: f32) -> Placement {
    let ratio = (page_w / img_w).min(page_h / img_h);
    let width = img_w * ratio;
    let height = img_h * ratio;
    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
    }
}

/// Decoded bitmap with its natural pixel size, as packed RGB
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Decode PNG bytes. Transparent pixels are composited onto white.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| Error::RenderError(format!("failed to decode PNG: {}", e)))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::RenderError("decoded image is empty".into()));
    }
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for px in img.pixels() {
        let [r, g, b, a] = px.0;
        let alpha = a as f32 / 255.0;
        for c in [r, g, b] {
            rgb.push((c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8);
        }
    }
    Ok(DecodedImage { width, height, rgb })
}

/// Assembles a one-page document embedding a single image
pub trait DocumentGenerator: Send + Sync {
    fn compose(&self, layout: &PageLayout, image: &DecodedImage, placement: Placement) -> Result<Vec<u8>>;
}

/// [`DocumentGenerator`] backed by printpdf
#[derive(Debug, Clone)]
pub struct PrintPdfGenerator {
    title: String,
}

impl PrintPdfGenerator {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

impl Default for PrintPdfGenerator {
    fn default() -> Self {
        Self::new("Juice Cafe Itinerary")
    }
}

impl DocumentGenerator for PrintPdfGenerator {
    fn compose(&self, layout: &PageLayout, image: &DecodedImage, placement: Placement) -> Result<Vec<u8>> {
        let (page_w, page_h) = layout.size_mm();
        let (doc, page, layer) = PdfDocument::new(&self.title, Mm(page_w), Mm(page_h), "Layer 1");
        let current_layer = doc.get_page(page).get_layer(layer);

        let xobject = Image::from(ImageXObject {
            width: Px(image.width as usize),
            height: Px(image.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: image.rgb.clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // printpdf measures from the bottom-left corner
        let dpi = image.width as f32 / (placement.width / 25.4);
        xobject.add_to_layer(
            current_layer,
            ImageTransform {
                translate_x: Some(Mm(placement.x)),
                translate_y: Some(Mm(page_h - placement.y - placement.height)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer)
            .map_err(|e| Error::DocumentError(e.to_string()))?;
        writer
            .into_inner()
            .map_err(|e| Error::DocumentError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landscape_a4_is_default() {
        let layout = PageLayout::default();
        assert_eq!(layout.size_mm(), (297.0, 210.0));
        let portrait = PageLayout { orientation: Orientation::Portrait, ..Default::default() };
        assert_eq!(portrait.width_mm(), 210.0);
    }

    #[test]
    fn wide_image_fits_width_and_centers_vertically() {
        let p = fit_centered(297.0, 210.0, 2560.0, 800.0);
        assert!((p.width - 297.0).abs() < 1e-3);
        assert!((p.height - 92.8125).abs() < 1e-3);
        assert!(p.x.abs() < 1e-3);
        assert!((p.y - (210.0 - 92.8125) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn tall_image_fits_height_and_centers_horizontally() {
        let p = fit_centered(297.0, 210.0, 400.0, 1000.0);
        assert!((p.height - 210.0).abs() < 1e-3);
        assert!((p.width - 84.0).abs() < 1e-3);
        assert!((p.x - 106.5).abs() < 1e-3);
        assert!(p.y.abs() < 1e-3);
    }

    #[test]
    fn decode_rejects_non_png() {
        assert!(matches!(decode_png(b"not a png"), Err(Error::RenderError(_))));
    }

    #[test]
    fn composes_a_pdf() {
        let image = DecodedImage { width: 4, height: 2, rgb: vec![255; 4 * 2 * 3] };
        let layout = PageLayout::default();
        let placement = fit_centered(layout.width_mm(), layout.height_mm(), 4.0, 2.0);
        let bytes = PrintPdfGenerator::default().compose(&layout, &image, placement).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
