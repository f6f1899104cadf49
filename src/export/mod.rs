//! Export of the rendered schedule as a PNG image or a one-page PDF.
//!
//! An export walks through a fixed set of phases:
//!
//! ```text
//! Idle -> Capturing -> Rasterizing -> Restoring -> FinalizingPng | FinalizingPdf -> Idle
//! ```
//!
//! with `Failed` reachable from any of them. During capture every element
//! below the export root gets its computed styles pinned inline, so a
//! rasterizer that only understands inline styles still reproduces the
//! cascade. The original inline values are always written back, whether or
//! not rasterization succeeded.

pub mod pdf;
pub mod snapshot;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

use crate::dom::{Document, NodeId};
use crate::rendering::{decode_data_url, BoxRasterizer, RasterOptions, Rasterizer};
use crate::{Error, ItineraryConfig, Result};
use pdf::{decode_png, fit_centered, DecodedImage, DocumentGenerator, PageLayout, PrintPdfGenerator};
use snapshot::StyleSnapshot;

pub const PNG_FILE_NAME: &str = "juice-cafe-itinerary.png";
pub const PDF_FILE_NAME: &str = "juice-cafe-itinerary.pdf";

/// Class toggled on the export root while it is being captured
pub const EXPORT_MODE_CLASS: &str = "export-mode";

/// Turns rasterized PNG bytes into the bitmap placed on the PDF page
pub type PngDecoder = fn(&[u8]) -> Result<DecodedImage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Png => PNG_FILE_NAME,
            ExportFormat::Pdf => PDF_FILE_NAME,
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "PNG"),
            ExportFormat::Pdf => write!(f, "PDF"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(Error::InvalidData(format!("unknown export format {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    Capturing,
    Rasterizing,
    Restoring,
    FinalizingPng,
    FinalizingPdf,
    Failed,
}

/// A finished export ready to be written out
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: &'static str,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format.file_name(),
            format,
            bytes,
        }
    }

    /// Lowercase hex SHA-256 of the artifact bytes.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    /// Write the artifact into `dir` under its fixed file name.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// Drives capture, rasterization, restore and finalization of one export at
/// a time.
pub struct ExportEngine {
    rasterizer: Box<dyn Rasterizer>,
    documents: Box<dyn DocumentGenerator>,
    options: RasterOptions,
    page: PageLayout,
    decode_timeout: Duration,
    decoder: PngDecoder,
    guard: Mutex<()>,
    phase: StdMutex<ExportPhase>,
}

impl ExportEngine {
    /// Engine with the built-in rasterizer and PDF generator.
    pub fn new(config: &ItineraryConfig) -> Self {
        Self::with_backends(
            config,
            Box::new(BoxRasterizer::new(config.viewport)),
            Box::new(PrintPdfGenerator::default()),
        )
    }

    pub fn with_backends(
        config: &ItineraryConfig,
        rasterizer: Box<dyn Rasterizer>,
        documents: Box<dyn DocumentGenerator>,
    ) -> Self {
        Self {
            rasterizer,
            documents,
            options: RasterOptions::from(&config.raster),
            page: config.page,
            decode_timeout: Duration::from_millis(config.decode_timeout_ms),
            decoder: decode_png,
            guard: Mutex::new(()),
            phase: StdMutex::new(ExportPhase::Idle),
        }
    }

    /// Replace the PNG decoder used before composing a PDF.
    pub fn with_png_decoder(mut self, decoder: PngDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Phase of the running export, or the outcome of the last one.
    pub fn phase(&self) -> ExportPhase {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_busy(&self) -> bool {
        self.guard.try_lock().is_err()
    }

    fn set_phase(&self, phase: ExportPhase) {
        log::debug!("export phase -> {:?}", phase);
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = phase;
    }

    /// Export the subtree under `root`.
    ///
    /// Fails with [`Error::ExportInProgress`] while another export runs on
    /// this engine. Inline styles and the class list of `root` are back to
    /// their previous state when this returns, on success and failure alike.
    pub async fn export(&self, doc: &mut Document, root: NodeId, format: ExportFormat) -> Result<ExportArtifact> {
        let _guard = self.guard.try_lock().map_err(|_| Error::ExportInProgress)?;

        match self.run(doc, root, format).await {
            Ok(artifact) => {
                self.set_phase(ExportPhase::Idle);
                log::info!(
                    "exported {} ({} bytes, sha256 {})",
                    artifact.file_name,
                    artifact.bytes.len(),
                    artifact.sha256_hex()
                );
                Ok(artifact)
            }
            Err(e) => {
                self.set_phase(ExportPhase::Failed);
                log::error!("{} export failed: {}", format, e);
                Err(e)
            }
        }
    }

    async fn run(&self, doc: &mut Document, root: NodeId, format: ExportFormat) -> Result<ExportArtifact> {
        doc.element(root)?;

        self.set_phase(ExportPhase::Capturing);
        doc.add_class(root, EXPORT_MODE_CLASS)?;
        let snapshot = match StyleSnapshot::capture(doc, root) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                doc.remove_class(root, EXPORT_MODE_CLASS)?;
                return Err(e);
            }
        };

        self.set_phase(ExportPhase::Rasterizing);
        let rendered = self.rasterizer.rasterize(doc, root, &self.options);

        self.set_phase(ExportPhase::Restoring);
        let restored = snapshot.restore(doc);
        let unmarked = doc.remove_class(root, EXPORT_MODE_CLASS);
        if rendered.is_err() {
            log::warn!("rasterization failed; inline styles were restored");
        }
        let data_url = rendered?;
        restored?;
        unmarked?;

        let png = decode_data_url(&data_url)?;
        match format {
            ExportFormat::Png => {
                self.set_phase(ExportPhase::FinalizingPng);
                Ok(ExportArtifact::new(format, png))
            }
            ExportFormat::Pdf => {
                self.set_phase(ExportPhase::FinalizingPdf);
                let bytes = self.finalize_pdf(png).await?;
                Ok(ExportArtifact::new(format, bytes))
            }
        }
    }

    async fn finalize_pdf(&self, png: Vec<u8>) -> Result<Vec<u8>> {
        let decoder = self.decoder;
        let decode = tokio::task::spawn_blocking(move || decoder(&png));
        let image = tokio::time::timeout(self.decode_timeout, decode)
            .await
            .map_err(|_| Error::Timeout(self.decode_timeout.as_millis() as u64))?
            .map_err(|e| Error::RenderError(format!("image decode task failed: {}", e)))??;

        let (page_w, page_h) = self.page.size_mm();
        let placement = fit_centered(page_w, page_h, image.width as f32, image.height as f32);
        log::debug!(
            "placing {}x{} image at ({:.1}, {:.1}) mm, {:.1}x{:.1} mm",
            image.width,
            image.height,
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
        self.documents.compose(&self.page, &image, placement)
    }
}
