use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info};
use vault_pdf::{Orientation, PageFormat, PdfBuilder, Unit};

use crate::catalog::PDF_FILE_PREFIX;
use crate::raster::{RasterError, RasterOptions, Rasterizer};
use crate::surface::{PageSurface, Rgb};

/// User-facing failure notices. The UI shell decides how to show them;
/// tests record them.
pub trait Alert {
    fn alert(&mut self, message: &str);
}

/// The two page surfaces an export consumes, staged ahead of the run.
/// `None` marks a page that was never laid out.
#[derive(Debug, Clone, Default)]
pub struct ExportStage {
    pub invoice: Option<PageSurface>,
    pub policy: Option<PageSurface>,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already running")]
    InFlight,
    #[error("source pages are missing")]
    MissingSurface,
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("PDF assembly: {0}")]
    Assembly(#[from] vault_pdf::Error),
    #[error("saving the PDF: {0}")]
    Save(#[from] std::io::Error),
}

/// Drives capture and assembly for one document at a time.
pub struct ExportPipeline {
    exporting: bool,
}

impl ExportPipeline {
    pub fn new() -> ExportPipeline {
        ExportPipeline { exporting: false }
    }

    /// True while an export runs; callers disable their download control
    /// off this.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Rasterize both staged pages at capture scale and write them into a
    /// two-page A4 PDF under `out_dir`, named `<prefix>_<unix millis>.pdf`.
    /// Failures after staging alert the user as well as returning the
    /// error; a missing stage alerts without ever marking the pipeline
    /// busy.
    pub fn export(
        &mut self,
        stage: &ExportStage,
        rasterizer: &mut Rasterizer,
        out_dir: &Path,
        notifier: &mut dyn Alert,
    ) -> Result<PathBuf, ExportError> {
        if self.exporting {
            return Err(ExportError::InFlight);
        }
        info!("starting two-page invoice export");

        let (Some(invoice), Some(policy)) = (stage.invoice.as_ref(), stage.policy.as_ref()) else {
            notifier.alert("PDF generation failed: source pages are missing.");
            return Err(ExportError::MissingSurface);
        };

        self.exporting = true;
        let result = run_export(invoice, policy, rasterizer, out_dir);
        self.exporting = false;

        match &result {
            Ok(path) => info!(path = %path.display(), "invoice export complete"),
            Err(err) => {
                error!(%err, "invoice export failed");
                notifier.alert("PDF generation failed. Please try again.");
            }
        }
        result
    }
}

impl Default for ExportPipeline {
    fn default() -> ExportPipeline {
        ExportPipeline::new()
    }
}

fn run_export(
    invoice: &PageSurface,
    policy: &PageSurface,
    rasterizer: &mut Rasterizer,
    out_dir: &Path,
) -> Result<PathBuf, ExportError> {
    // The whole document is assembled in memory; the timestamped file
    // only appears once every page has captured and the trailer is
    // written, so a failed run leaves nothing on disk.
    let mut pdf = PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4)?;
    pdf.set_info("Title", "one:64.vault Invoice");
    pdf.set_info("Creator", "one:64.vault");
    let page_w = pdf.page_width();

    place_capture(&mut pdf, rasterizer, invoice, page_w)?;
    pdf.add_page()?;
    place_capture(&mut pdf, rasterizer, policy, page_w)?;
    let document = pdf.finish()?;

    let path = out_dir.join(format!("{}_{}.pdf", PDF_FILE_PREFIX, Utc::now().timestamp_millis()));
    fs::write(&path, document)?;
    Ok(path)
}

/// Capture one surface and lay the shot across the page's full width at
/// the top-left corner, height following the capture's aspect ratio.
fn place_capture(
    pdf: &mut PdfBuilder<Vec<u8>>,
    rasterizer: &mut Rasterizer,
    surface: &PageSurface,
    page_w: f64,
) -> Result<(), ExportError> {
    let shot = rasterizer.rasterize(surface, &capture_options(surface))?;
    debug!(width = shot.width, height = shot.height, "captured page surface");
    let height = shot.height as f64 * page_w / shot.width as f64;
    let image = pdf.register_image(shot.png)?;
    pdf.add_image(image, 0.0, 0.0, page_w, height);
    Ok(())
}

/// Device capture at double density over an opaque white background.
fn capture_options(surface: &PageSurface) -> RasterOptions {
    RasterOptions { scale: 2.0, background: Rgb::WHITE, width: surface.width, height: surface.height }
}
