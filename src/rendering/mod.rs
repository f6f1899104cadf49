//! Rasterization of a DOM subtree into a PNG bitmap.
//!
//! The [`Rasterizer`] trait is the seam the export pipeline renders through.
//! [`BoxRasterizer`] is the built-in backend: it lays the subtree out as boxes
//! and paints backgrounds, borders and text from inline styles only, so
//! anything set by stylesheet rules is invisible to it until the export
//! pipeline pins those values inline.

pub mod layout;
pub mod paint;
pub mod raster;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::dom::style::parse_color;
use crate::dom::{Document, Element, NodeId};
use crate::{Error, Result, Viewport};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Tallest subtree the built-in rasterizer will paint, in CSS pixels
pub const MAX_CANVAS_HEIGHT: u32 = 32_768;

#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    pub fn to_data_url(&self) -> String {
        format!("{}{}", PNG_DATA_URL_PREFIX, STANDARD.encode(&self.png_data))
    }
}

/// Decode the payload of a base64 PNG data URL.
pub fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let payload = data_url
        .strip_prefix(PNG_DATA_URL_PREFIX)
        .ok_or_else(|| Error::RenderError("expected a base64 PNG data URL".into()))?;
    STANDARD
        .decode(payload)
        .map_err(|e| Error::RenderError(format!("invalid data URL payload: {}", e)))
}

/// Predicate deciding whether an element (and its subtree) is rendered
pub type NodeFilter = fn(&Element) -> bool;

/// Skips inline vector graphics, which the rasterizer cannot reproduce.
pub fn exclude_svg(el: &Element) -> bool {
    el.tag != "svg"
}

/// Options handed to a [`Rasterizer`] for one capture
#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Encoder quality between 0 and 1
    pub quality: f32,
    /// Device pixel ratio of the output bitmap
    pub pixel_ratio: u32,
    /// Background fill as a CSS color
    pub background: String,
    pub filter: NodeFilter,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            quality: 1.0,
            pixel_ratio: 2,
            background: "#ffffff".to_string(),
            filter: exclude_svg,
        }
    }
}

impl From<&crate::RasterConfig> for RasterOptions {
    fn from(cfg: &crate::RasterConfig) -> Self {
        Self {
            quality: cfg.quality,
            pixel_ratio: cfg.pixel_ratio,
            background: cfg.background.clone(),
            filter: exclude_svg,
        }
    }
}

/// Turns a DOM subtree into a PNG data URL
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, doc: &Document, root: NodeId, options: &RasterOptions) -> Result<String>;
}

/// Built-in layout/paint/raster backend
#[derive(Debug, Clone, Default)]
pub struct BoxRasterizer {
    viewport: Viewport,
}

impl BoxRasterizer {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Render to a screenshot without the data URL wrapping.
    pub fn screenshot(&self, doc: &Document, root: NodeId, options: &RasterOptions) -> Result<Screenshot> {
        doc.element(root)?;
        let background = parse_color(&options.background).ok_or_else(|| {
            Error::RenderError(format!("unsupported background color {:?}", options.background))
        })?;

        let filter = options.filter;
        let layout = layout::layout_subtree(doc, root, self.viewport.width, &filter);
        let height = layout.first().map(|n| n.rect.height).unwrap_or(0);
        if height == 0 {
            return Err(Error::RenderError("subtree has no visible content".into()));
        }
        if height > MAX_CANVAS_HEIGHT {
            return Err(Error::RenderError(format!(
                "subtree is {}px tall, above the {}px canvas limit",
                height, MAX_CANVAS_HEIGHT
            )));
        }

        let commands = paint::build_display_list(doc, &layout);
        log::debug!(
            "rasterizing {} layout boxes, {} paint commands at {}x{} @{}x",
            layout.len(),
            commands.len(),
            self.viewport.width,
            height,
            options.pixel_ratio
        );
        let img = raster::rasterize(
            &commands,
            self.viewport.width,
            height,
            options.pixel_ratio,
            (background.0, background.1, background.2, background.3),
        );
        raster::encode_png(&img, options.quality)
    }
}

impl Rasterizer for BoxRasterizer {
    fn rasterize(&self, doc: &Document, root: NodeId, options: &RasterOptions) -> Result<String> {
        Ok(self.screenshot(doc, root, options)?.to_data_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_round_trips_png_bytes() {
        let shot = Screenshot { width: 1, height: 1, png_data: vec![1, 2, 3] };
        let url = shot.to_data_url();
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), vec![1, 2, 3]);
        assert!(decode_data_url("data:text/plain,hi").is_err());
    }

    #[test]
    fn box_rasterizer_renders_at_pixel_ratio() {
        let doc = Document::from_html("<div id=r style='background-color: #000'>x</div>", "");
        let root = doc.element_by_id("r").unwrap();
        let r = BoxRasterizer::new(Viewport { width: 50, height: 50 });
        let shot = r.screenshot(&doc, root, &RasterOptions::default()).unwrap();
        assert_eq!(shot.width, 100);
        assert_eq!(shot.height, 2 * (layout::LINE_HEIGHT + 2 * layout::BOX_PADDING));
    }

    #[test]
    fn empty_subtree_is_an_error() {
        let doc = Document::from_html("<div id=r></div>", "");
        let root = doc.element_by_id("r").unwrap();
        let r = BoxRasterizer::default();
        assert!(matches!(
            r.rasterize(&doc, root, &RasterOptions::default()),
            Err(Error::RenderError(_))
        ));
    }

    #[test]
    fn overly_tall_subtree_is_an_error() {
        let rows = "<p>x</p>".repeat((MAX_CANVAS_HEIGHT / layout::LINE_HEIGHT + 1) as usize);
        let doc = Document::from_html(&format!("<div id=r>{}</div>", rows), "");
        let root = doc.element_by_id("r").unwrap();
        let err = BoxRasterizer::default()
            .rasterize(&doc, root, &RasterOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::RenderError(ref m) if m.contains("canvas limit")));
    }

    #[test]
    fn svg_filter() {
        let doc = Document::from_html("<svg id=s></svg><div id=d></div>", "");
        let svg = doc.element_by_id("s").unwrap();
        let div = doc.element_by_id("d").unwrap();
        assert!(!exclude_svg(doc.element(svg).unwrap()));
        assert!(exclude_svg(doc.element(div).unwrap()));
    }
}
