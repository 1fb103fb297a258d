pub mod catalog;
pub mod export;
pub mod form;
pub mod layout;
pub mod money;
pub mod raster;
pub mod state;
pub mod surface;
pub mod totals;

pub use export::{Alert, ExportError, ExportPipeline, ExportStage};
pub use form::InvoiceForm;
pub use raster::{RasterError, RasterImage, RasterOptions, Rasterizer};
pub use state::{CustomItem, CustomerDetails, InvoiceState, Logo, LogoError};
pub use surface::{DrawOp, PageSurface, Rgb};
pub use totals::{LineItem, Totals};
