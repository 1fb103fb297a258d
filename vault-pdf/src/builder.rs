use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::Result;
use crate::image::{self, ImageFormat};
use crate::writer::{fmt_num, Obj, ObjId, PdfWriter};

const PT_PER_MM: f64 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Measurement unit for page queries and placement coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Mm,
    Pt,
}

impl Unit {
    fn to_pt(self, v: f64) -> f64 {
        match self {
            Unit::Mm => v * PT_PER_MM,
            Unit::Pt => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    A4,
    Letter,
}

impl PageFormat {
    /// Portrait dimensions in millimeters.
    fn size_mm(self) -> (f64, f64) {
        match self {
            PageFormat::A4 => (210.0, 297.0),
            PageFormat::Letter => (215.9, 279.4),
        }
    }
}

/// Handle to an image registered with a builder. Valid for the
/// lifetime of the builder that produced it; the same handle may be
/// placed any number of times on any page without re-embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle(usize);

/// High-level API for assembling image-based PDF documents.
///
/// Generic over `Write` so it works with files (`BufWriter<File>`),
/// in-memory buffers (`Vec<u8>`), or any other writer.
///
/// The document opens with page 1 already current; `add_page` closes
/// it and starts the next one. Pages and image XObjects stream out as
/// soon as they are complete, so memory stays flat regardless of how
/// many pages or rasters the document carries.
///
/// Placement coordinates use the configured unit with a top-left
/// origin (y grows downward); the conversion to PDF's bottom-left
/// point space happens internally.
pub struct PdfBuilder<W: Write> {
    writer: PdfWriter<W>,
    unit: Unit,
    page_w: f64,
    page_h: f64,
    catalog_id: ObjId,
    pages_id: ObjId,
    info: Vec<(String, String)>,
    images: Vec<ObjId>,
    page_ids: Vec<ObjId>,
    current: Page,
}

#[derive(Default)]
struct Page {
    content: Vec<u8>,
    /// Indexes into `images` referenced by this page's content.
    used: Vec<usize>,
}

impl PdfBuilder<BufWriter<File>> {
    /// Create a builder that writes straight to a file.
    pub fn create<P: AsRef<Path>>(
        path: P,
        orientation: Orientation,
        unit: Unit,
        format: PageFormat,
    ) -> Result<Self> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), orientation, unit, format)
    }
}

impl<W: Write> PdfBuilder<W> {
    /// Create a builder over the given writer. The PDF header goes
    /// out immediately and page 1 is open for placement.
    pub fn new(
        writer: W,
        orientation: Orientation,
        unit: Unit,
        format: PageFormat,
    ) -> Result<Self> {
        let (mut w_mm, mut h_mm) = format.size_mm();
        if orientation == Orientation::Landscape {
            std::mem::swap(&mut w_mm, &mut h_mm);
        }
        // Track the page box in the caller's unit so queries return
        // exact values (210.0, not a converted 209.99999...).
        let (page_w, page_h) = match unit {
            Unit::Mm => (w_mm, h_mm),
            Unit::Pt => (w_mm * PT_PER_MM, h_mm * PT_PER_MM),
        };

        let mut writer = PdfWriter::new(writer);
        writer.write_header()?;
        let catalog_id = writer.alloc();
        let pages_id = writer.alloc();

        Ok(PdfBuilder {
            writer,
            unit,
            page_w,
            page_h,
            catalog_id,
            pages_id,
            info: Vec::new(),
            images: Vec::new(),
            page_ids: Vec::new(),
            current: Page::default(),
        })
    }

    /// Page width in the configured unit.
    pub fn page_width(&self) -> f64 {
        self.page_w
    }

    /// Page height in the configured unit.
    pub fn page_height(&self) -> f64 {
        self.page_h
    }

    /// Set a document info entry (e.g. "Title", "Creator").
    pub fn set_info(&mut self, key: &str, value: &str) -> &mut Self {
        self.info.push((key.to_string(), value.to_string()));
        self
    }

    /// Decode an encoded image (PNG or JPEG) and embed it as an
    /// XObject. The object streams out immediately; the returned
    /// handle is what `add_image` places.
    pub fn register_image(&mut self, bytes: Vec<u8>) -> Result<ImageHandle> {
        let img = image::decode(bytes)?;

        let smask_id = match &img.alpha {
            Some(alpha) => {
                let id = self.writer.alloc();
                let dict = vec![
                    ("Type", Obj::name("XObject")),
                    ("Subtype", Obj::name("Image")),
                    ("Width", Obj::Int(img.width as i64)),
                    ("Height", Obj::Int(img.height as i64)),
                    ("ColorSpace", Obj::name("DeviceGray")),
                    ("BitsPerComponent", Obj::Int(8)),
                    ("Filter", Obj::name("FlateDecode")),
                ];
                self.writer.write_object(id, &Obj::stream(dict, deflate(alpha)?))?;
                Some(id)
            }
            None => None,
        };

        let id = self.writer.alloc();
        let mut dict = vec![
            ("Type", Obj::name("XObject")),
            ("Subtype", Obj::name("Image")),
            ("Width", Obj::Int(img.width as i64)),
            ("Height", Obj::Int(img.height as i64)),
            ("ColorSpace", Obj::name(img.color_space.pdf_name())),
            ("BitsPerComponent", Obj::Int(8)),
        ];
        let data = match img.format {
            // Raw samples recompress losslessly; JPEG streams are
            // already DCT-coded and embed untouched.
            ImageFormat::Png => {
                dict.push(("Filter", Obj::name("FlateDecode")));
                deflate(&img.data)?
            }
            ImageFormat::Jpeg => {
                dict.push(("Filter", Obj::name("DCTDecode")));
                img.data
            }
        };
        if let Some(smask) = smask_id {
            dict.push(("SMask", Obj::Ref(smask)));
        }
        self.writer.write_object(id, &Obj::stream(dict, data))?;

        self.images.push(id);
        Ok(ImageHandle(self.images.len() - 1))
    }

    /// Place a registered image on the current page. `x`/`y` are the
    /// top-left corner in the configured unit; the image is scaled to
    /// exactly `w` x `h`.
    pub fn add_image(&mut self, image: ImageHandle, x: f64, y: f64, w: f64, h: f64) -> &mut Self {
        let wp = self.unit.to_pt(w);
        let hp = self.unit.to_pt(h);
        let xp = self.unit.to_pt(x);
        let yp = self.unit.to_pt(self.page_h) - self.unit.to_pt(y) - hp;

        let ops = format!(
            "q\n{} 0 0 {} {} {} cm\n/Im{} Do\nQ\n",
            fmt_num(wp),
            fmt_num(hp),
            fmt_num(xp),
            fmt_num(yp),
            image.0 + 1,
        );
        self.current.content.extend_from_slice(ops.as_bytes());
        if !self.current.used.contains(&image.0) {
            self.current.used.push(image.0);
        }
        self
    }

    /// Close the current page and open a fresh blank one.
    pub fn add_page(&mut self) -> Result<()> {
        self.flush_page()
    }

    fn flush_page(&mut self) -> Result<()> {
        let page = std::mem::take(&mut self.current);

        let content_id = self.writer.alloc();
        self.writer.write_object(content_id, &Obj::stream(vec![], page.content))?;

        let mut resources = Vec::new();
        if !page.used.is_empty() {
            let xobjects = page
                .used
                .iter()
                .map(|&i| (format!("Im{}", i + 1), Obj::Ref(self.images[i])))
                .collect();
            resources.push(("XObject".to_string(), Obj::Dict(xobjects)));
        }

        let page_id = self.writer.alloc();
        let page_dict = Obj::dict(vec![
            ("Type", Obj::name("Page")),
            ("Parent", Obj::Ref(self.pages_id)),
            (
                "MediaBox",
                Obj::Array(vec![
                    Obj::Int(0),
                    Obj::Int(0),
                    Obj::Real(self.unit.to_pt(self.page_w)),
                    Obj::Real(self.unit.to_pt(self.page_h)),
                ]),
            ),
            ("Contents", Obj::Ref(content_id)),
            ("Resources", Obj::Dict(resources)),
        ]);
        self.writer.write_object(page_id, &page_dict)?;
        self.page_ids.push(page_id);
        Ok(())
    }

    /// Finish the document: flush the open page, write the page tree,
    /// catalog, info, xref, and trailer. Returns the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush_page()?;

        let info_id = if self.info.is_empty() {
            None
        } else {
            let id = self.writer.alloc();
            let entries: Vec<(&str, Obj)> = self
                .info
                .iter()
                .map(|(k, v)| (k.as_str(), Obj::text(v)))
                .collect();
            self.writer.write_object(id, &Obj::dict(entries))?;
            Some(id)
        };

        let kids: Vec<Obj> = self.page_ids.iter().map(|&id| Obj::Ref(id)).collect();
        let pages = Obj::dict(vec![
            ("Type", Obj::name("Pages")),
            ("Kids", Obj::Array(kids)),
            ("Count", Obj::Int(self.page_ids.len() as i64)),
        ]);
        self.writer.write_object(self.pages_id, &pages)?;

        let catalog = Obj::dict(vec![
            ("Type", Obj::name("Catalog")),
            ("Pages", Obj::Ref(self.pages_id)),
        ]);
        self.writer.write_object(self.catalog_id, &catalog)?;

        Ok(self.writer.finish(self.catalog_id, info_id)?)
    }
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data)?;
    enc.finish()
}
