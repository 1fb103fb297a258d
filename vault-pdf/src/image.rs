use crate::error::{Error, Result};

/// Formats accepted for embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Decoded to raw samples and recompressed with FlateDecode.
    Png,
    /// Embedded as-is under DCTDecode; only the header is parsed.
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRgb,
    DeviceGray,
}

impl ColorSpace {
    pub(crate) fn pdf_name(self) -> &'static str {
        match self {
            ColorSpace::DeviceRgb => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Image data decoded as far as embedding requires. All samples are
/// 8 bits per component; alpha is carried separately because PDF
/// wants it as a standalone SMask image.
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    /// Raw RGB/gray samples for PNG, untouched file bytes for JPEG.
    pub data: Vec<u8>,
    pub alpha: Option<Vec<u8>>,
}

/// Sniff the format from magic bytes and decode.
pub fn decode(bytes: Vec<u8>) -> Result<DecodedImage> {
    match sniff_format(&bytes)? {
        ImageFormat::Png => decode_png(bytes),
        ImageFormat::Jpeg => parse_jpeg(bytes),
    }
}

fn sniff_format(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.len() < 4 {
        return Err(Error::Image("image data too short to identify".into()));
    }
    if bytes[0] == 0xFF && bytes[1] == 0xD8 {
        Ok(ImageFormat::Jpeg)
    } else if bytes[..4] == [0x89, b'P', b'N', b'G'] {
        Ok(ImageFormat::Png)
    } else {
        Err(Error::Image("unrecognized image format (want PNG or JPEG)".into()))
    }
}

/// Decode a PNG into raw samples, splitting any alpha channel out
/// into the separate SMask plane.
fn decode_png(bytes: Vec<u8>) -> Result<DecodedImage> {
    let mut reader = png::Decoder::new(bytes.as_slice())
        .read_info()
        .map_err(|e| Error::Image(format!("PNG decode: {}", e)))?;
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| Error::Image(format!("PNG frame: {}", e)))?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(Error::Image(format!(
            "unsupported PNG bit depth {:?} (want 8-bit)",
            info.bit_depth
        )));
    }

    use png::ColorType::{Grayscale, GrayscaleAlpha, Rgb, Rgba};
    let (color_space, color_channels) = match info.color_type {
        Rgb | Rgba => (ColorSpace::DeviceRgb, 3),
        Grayscale | GrayscaleAlpha => (ColorSpace::DeviceGray, 1),
        other => return Err(Error::Image(format!("unsupported PNG color type: {:?}", other))),
    };
    let (data, alpha) = if matches!(info.color_type, Rgba | GrayscaleAlpha) {
        let (color, mask) = split_alpha(&buf, color_channels);
        (color, Some(mask))
    } else {
        (buf, None)
    };

    Ok(DecodedImage {
        width: info.width,
        height: info.height,
        format: ImageFormat::Png,
        color_space,
        data,
        alpha,
    })
}

/// Deinterleave `color_channels + 1` samples per pixel into a color
/// plane and an alpha plane.
fn split_alpha(buf: &[u8], color_channels: usize) -> (Vec<u8>, Vec<u8>) {
    let stride = color_channels + 1;
    let pixels = buf.len() / stride;
    let mut color = Vec::with_capacity(pixels * color_channels);
    let mut mask = Vec::with_capacity(pixels);
    for px in buf.chunks_exact(stride) {
        color.extend_from_slice(&px[..color_channels]);
        mask.push(px[color_channels]);
    }
    (color, mask)
}

/// JPEG needs no pixel decoding (DCTDecode embeds the file bytes);
/// only the frame header is read for dimensions and component count.
fn parse_jpeg(bytes: Vec<u8>) -> Result<DecodedImage> {
    let (width, height, components) = jpeg_frame_info(&bytes)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRgb,
        n => {
            return Err(Error::Image(format!(
                "unsupported JPEG component count {} (want 1 or 3)",
                n
            )))
        }
    };
    Ok(DecodedImage {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        data: bytes,
        alpha: None,
    })
}

/// Walk the marker stream until a frame header (SOF0..SOF3) turns up
/// and pull geometry out of its payload: 2-byte length, 1-byte sample
/// precision, height, width, component count.
fn jpeg_frame_info(data: &[u8]) -> Result<(u32, u32, u8)> {
    let mut pos = 0;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        // Collapse a run of fill bytes down to the marker after it.
        let mut at = pos + 1;
        while at < data.len() && data[at] == 0xFF {
            at += 1;
        }
        let Some(&marker) = data.get(at) else { break };
        match marker {
            0xC0..=0xC3 => {
                let payload = data
                    .get(at + 1..at + 9)
                    .ok_or_else(|| Error::Image("JPEG frame header truncated".into()))?;
                let height = u16::from_be_bytes([payload[3], payload[4]]) as u32;
                let width = u16::from_be_bytes([payload[5], payload[6]]) as u32;
                return Ok((width, height, payload[7]));
            }
            // SOI, EOI and restart markers stand alone; 0x00 is a
            // stuffed byte inside entropy-coded data.
            0x00 | 0xD8 | 0xD9 | 0xD0..=0xD7 => pos = at + 1,
            // Everything else opens a segment with a big-endian length.
            _ => match data.get(at + 1..at + 3) {
                Some(len) => pos = at + 1 + u16::from_be_bytes([len[0], len[1]]) as usize,
                None => break,
            },
        }
    }
    Err(Error::Image("no frame header found in JPEG data".into()))
}
