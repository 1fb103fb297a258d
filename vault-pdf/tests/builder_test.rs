use vault_pdf::{Orientation, PageFormat, PdfBuilder, Unit};

/// Helper: check that a byte pattern exists in the buffer.
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Helper: encode an in-memory PNG so tests need no fixture files.
fn make_png(width: u32, height: u32, color: png::ColorType, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut enc = png::Encoder::new(&mut out, width, height);
        enc.set_color(color);
        enc.set_depth(png::BitDepth::Eight);
        let mut writer = enc.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }
    out
}

fn rgb_png() -> Vec<u8> {
    make_png(4, 2, png::ColorType::Rgb, &[200u8; 24])
}

fn rgba_png() -> Vec<u8> {
    make_png(2, 2, png::ColorType::Rgba, &[120u8; 16])
}

/// Helper: a minimal JPEG container (SOI + SOF0 + EOI). The builder
/// never decodes JPEG pixels, so a bare header is enough to embed.
fn make_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut v = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x11, 0x08];
    v.extend(height.to_be_bytes());
    v.extend(width.to_be_bytes());
    v.push(3);
    for c in 1..=3u8 {
        v.extend([c, 0x11, 0x00]);
    }
    v.extend([0xFF, 0xD9]);
    v
}

// -------------------------------------------------------
// Page geometry
// -------------------------------------------------------

#[test]
fn a4_portrait_reports_millimeters() {
    let doc = PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    assert_eq!(doc.page_width(), 210.0);
    assert_eq!(doc.page_height(), 297.0);
}

#[test]
fn landscape_swaps_the_page_box() {
    let doc =
        PdfBuilder::new(Vec::new(), Orientation::Landscape, Unit::Mm, PageFormat::A4).unwrap();
    assert_eq!(doc.page_width(), 297.0);
    assert_eq!(doc.page_height(), 210.0);
}

#[test]
fn letter_in_points_is_612_by_792() {
    let doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Pt, PageFormat::Letter).unwrap();
    assert!((doc.page_width() - 612.0).abs() < 1e-9);
    assert!((doc.page_height() - 792.0).abs() < 1e-9);
}

#[test]
fn a4_mediabox_is_written_in_points() {
    let doc = PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(
        output.contains("/MediaBox [0 0 595.2756 841.8898]"),
        "A4 page box should be in points, got: {}",
        output.lines().find(|l| l.contains("MediaBox")).unwrap_or("no MediaBox")
    );
}

// -------------------------------------------------------
// Page lifecycle
// -------------------------------------------------------

#[test]
fn fresh_document_finishes_with_one_blank_page() {
    let doc = PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let bytes = doc.finish().unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7\n"));
    assert!(bytes.ends_with(b"%%EOF\n"));
    assert!(contains_bytes(&bytes, b"/Type /Catalog"));
    assert!(contains_bytes(&bytes, b"/Count 1"));
    assert!(contains_bytes(&bytes, b"/Length 0"));
}

#[test]
fn add_page_grows_the_page_tree() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    doc.add_page().unwrap();
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("/Count 2"), "expected two pages");
    assert_eq!(
        output.matches("/Contents").count(),
        2,
        "each page carries its own content stream"
    );
}

#[test]
fn create_writes_straight_to_a_file() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blank.pdf");
    let doc = PdfBuilder::create(&path, Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let mut file = doc.finish().unwrap();
    file.flush().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.7\n"));
    assert!(bytes.ends_with(b"%%EOF\n"));
}

// -------------------------------------------------------
// Image embedding
// -------------------------------------------------------

#[test]
fn png_becomes_flate_compressed_xobject() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let img = doc.register_image(rgb_png()).unwrap();
    doc.add_image(img, 10.0, 10.0, 100.0, 50.0);
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("/Subtype /Image"), "should embed an Image XObject");
    assert!(output.contains("/ColorSpace /DeviceRGB"));
    assert!(output.contains("/BitsPerComponent 8"));
    assert!(output.contains("/Filter /FlateDecode"), "PNG samples are recompressed");
    assert!(output.contains("/XObject"), "page resources should list the image");
    assert!(output.contains("/Im1 Do"), "content should paint /Im1");
}

#[test]
fn rgba_png_carries_an_smask() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let img = doc.register_image(rgba_png()).unwrap();
    doc.add_image(img, 0.0, 0.0, 50.0, 50.0);
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("/SMask"), "alpha should reference an SMask image");
    assert!(
        output.contains("/ColorSpace /DeviceGray"),
        "the SMask plane is a DeviceGray image"
    );
    assert_eq!(
        output.matches("/Subtype /Image").count(),
        2,
        "color image plus its SMask"
    );
}

#[test]
fn jpeg_embeds_verbatim_under_dctdecode() {
    let jpeg = make_jpeg(640, 480);
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let img = doc.register_image(jpeg.clone()).unwrap();
    doc.add_image(img, 0.0, 0.0, 160.0, 120.0);
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes).into_owned();
    assert!(output.contains("/Filter /DCTDecode"));
    assert_eq!(output.matches("/DCTDecode").count(), 1, "no double compression");
    assert!(contains_bytes(&bytes, &jpeg), "JPEG bytes should embed untouched");
}

#[test]
fn unrecognized_bytes_are_rejected() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    assert!(doc.register_image(vec![0x00, 0x01, 0x02, 0x03]).is_err());
}

// -------------------------------------------------------
// Placement
// -------------------------------------------------------

#[test]
fn full_page_mm_placement_maps_to_point_matrix() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let img = doc.register_image(rgb_png()).unwrap();
    doc.add_image(img, 0.0, 0.0, 210.0, 297.0);
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(
        output.contains("595.2756 0 0 841.8898 0 0 cm"),
        "210x297 mm at the top-left origin spans the whole page box"
    );
}

#[test]
fn top_left_origin_flips_to_pdf_coordinates() {
    // Letter in points: placing at y=72 with h=150 lands the image's
    // bottom edge at 792 - 72 - 150 = 570 in PDF space.
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Pt, PageFormat::Letter).unwrap();
    let img = doc.register_image(rgb_png()).unwrap();
    doc.add_image(img, 72.0, 72.0, 200.0, 150.0);
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(
        output.contains("200 0 0 150 72 570 cm"),
        "got: {}",
        output.lines().find(|l| l.contains("cm")).unwrap_or("no cm op")
    );
}

// -------------------------------------------------------
// Reuse across pages
// -------------------------------------------------------

#[test]
fn same_handle_on_two_pages_embeds_once() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let img = doc.register_image(rgb_png()).unwrap();
    doc.add_image(img, 0.0, 0.0, 100.0, 50.0);
    doc.add_page().unwrap();
    doc.add_image(img, 20.0, 20.0, 100.0, 50.0);
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert_eq!(
        output.matches("/Subtype /Image").count(),
        1,
        "the XObject is written once"
    );
    assert_eq!(output.matches("/Im1 Do").count(), 2, "both pages paint it");
}

#[test]
fn second_image_gets_the_next_name() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    let first = doc.register_image(rgb_png()).unwrap();
    let second = doc.register_image(make_jpeg(8, 8)).unwrap();
    doc.add_image(first, 0.0, 0.0, 50.0, 25.0);
    doc.add_image(second, 0.0, 40.0, 50.0, 25.0);
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("/Im1 Do"));
    assert!(output.contains("/Im2 Do"));
}

// -------------------------------------------------------
// Document info
// -------------------------------------------------------

#[test]
fn info_entries_reach_the_trailer() {
    let mut doc =
        PdfBuilder::new(Vec::new(), Orientation::Portrait, Unit::Mm, PageFormat::A4).unwrap();
    doc.set_info("Title", "Builder Test").set_info("Creator", "vault-pdf");
    let bytes = doc.finish().unwrap();
    let output = String::from_utf8_lossy(&bytes);
    assert!(output.contains("(Builder Test)"));
    assert!(output.contains("(vault-pdf)"));
    assert!(output.contains("/Info"));
    assert!(output.contains("/Root 1 0 R"));
}
