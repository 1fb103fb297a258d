pub mod builder;
pub mod error;
pub mod image;
pub mod writer;

pub use builder::{ImageHandle, Orientation, PageFormat, PdfBuilder, Unit};
pub use error::{Error, Result};
