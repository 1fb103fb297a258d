use cosmic_text::{
    Attrs, Buffer, Color as TextColor, Family, FontSystem, Metrics, Shaping, Style, SwashCache,
    Weight, Wrap,
};
use thiserror::Error;
use tiny_skia::{
    FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint, PremultipliedColorU8, Rect,
    Stroke, Transform,
};
use tracing::warn;

use crate::state::Logo;
use crate::surface::{DrawOp, FontWeight, PageSurface, Rgb, TextAlign, TextStyle};

/// Capture parameters for one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Device pixels per CSS pixel.
    pub scale: f32,
    pub background: Rgb,
    pub width: u32,
    pub height: u32,
}

/// A finished capture: PNG bytes plus the device pixel size they encode.
#[derive(Debug)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot allocate a {0}x{1} pixel surface")]
    BadDimensions(u32, u32),
    #[error("PNG encode: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Paints draw ops into opaque RGBA pixels. The font system and glyph
/// cache live across captures; loading the system font database is the
/// expensive part of construction.
pub struct Rasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl Rasterizer {
    pub fn new() -> Rasterizer {
        let font_system = FontSystem::new();
        if font_system.db().len() == 0 {
            warn!("no system fonts found; text will be missing from captures");
        }
        Rasterizer { font_system, swash_cache: SwashCache::new() }
    }

    pub fn rasterize(
        &mut self,
        surface: &PageSurface,
        opts: &RasterOptions,
    ) -> Result<RasterImage, RasterError> {
        let s = opts.scale;
        let device_w = (opts.width as f32 * s).round() as u32;
        let device_h = (opts.height as f32 * s).round() as u32;
        let mut pixmap =
            Pixmap::new(device_w, device_h).ok_or(RasterError::BadDimensions(device_w, device_h))?;
        let bg = opts.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

        for op in &surface.ops {
            match op {
                DrawOp::FillRect { x, y, w, h, color } => {
                    if let Some(rect) = Rect::from_xywh(x * s, y * s, w * s, h * s) {
                        pixmap.fill_rect(rect, &solid(*color), Transform::identity(), None);
                    }
                }
                DrawOp::StrokeRect { x, y, w, h, color, width } => {
                    if let Some(rect) = Rect::from_xywh(x * s, y * s, w * s, h * s) {
                        let path = PathBuilder::from_rect(rect);
                        let stroke = Stroke { width: width * s, ..Stroke::default() };
                        pixmap.stroke_path(&path, &solid(*color), &stroke, Transform::identity(), None);
                    }
                }
                DrawOp::HLine { x0, x1, y, width, color } => {
                    // Stroke runs along the rule's vertical center.
                    let cy = (y + width / 2.0) * s;
                    let mut pb = PathBuilder::new();
                    pb.move_to(x0 * s, cy);
                    pb.line_to(x1 * s, cy);
                    if let Some(path) = pb.finish() {
                        let stroke = Stroke { width: width * s, ..Stroke::default() };
                        pixmap.stroke_path(&path, &solid(*color), &stroke, Transform::identity(), None);
                    }
                }
                DrawOp::Text { x, y, max_w, align, style, content } => {
                    self.draw_text(&mut pixmap, *x, *y, *max_w, *align, *style, content, s);
                }
                DrawOp::Image { x, y, w, h, logo } => {
                    blit_logo(&mut pixmap, *x, *y, *w, *h, logo, s);
                }
            }
        }

        Ok(RasterImage { width: device_w, height: device_h, png: pixmap.encode_png()? })
    }

    /// Shape and composite one line of text. With no fonts available the
    /// line is skipped; the capture still carries every other op.
    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        pixmap: &mut Pixmap,
        x: f32,
        y: f32,
        max_w: f32,
        align: TextAlign,
        style: TextStyle,
        content: &str,
        s: f32,
    ) {
        if content.is_empty() || self.font_system.db().len() == 0 {
            return;
        }
        let size = style.size * s;
        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(size, size * 1.2));
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_wrap(&mut self.font_system, Wrap::None);
        let attrs = Attrs::new()
            .family(Family::SansSerif)
            .weight(weight_of(style.weight))
            .style(if style.italic { Style::Italic } else { Style::Normal });
        buffer.set_text(&mut self.font_system, content, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let line_w = buffer.layout_runs().map(|run| run.line_w).fold(0.0_f32, f32::max);
        let box_w = max_w * s;
        let dx = match align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (box_w - line_w) / 2.0,
            TextAlign::Right => box_w - line_w,
        };
        let origin_x = (x * s + dx) as i32;
        let origin_y = (y * s) as i32;
        // Overflow past the box is clipped, never wrapped.
        let clip_min = (x * s) as i32;
        let clip_max = ((x + max_w) * s) as i32;

        let color = TextColor::rgb(style.color.r, style.color.g, style.color.b);
        let (fs, cache) = (&mut self.font_system, &mut self.swash_cache);
        buffer.draw(fs, cache, color, |gx, gy, gw, gh, c| {
            blend_rect(pixmap, origin_x + gx, origin_y + gy, gw, gh, c, clip_min, clip_max);
        });
    }
}

impl Default for Rasterizer {
    fn default() -> Rasterizer {
        Rasterizer::new()
    }
}

fn solid(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, 255);
    paint
}

fn weight_of(weight: FontWeight) -> Weight {
    match weight {
        FontWeight::Regular => Weight::NORMAL,
        FontWeight::Medium => Weight::MEDIUM,
        FontWeight::Bold => Weight::BOLD,
        FontWeight::Black => Weight::BLACK,
    }
}

/// Source-over one coverage rectangle from the glyph cache onto the
/// pixmap, clipped to the text box horizontally and the pixmap bounds
/// both ways. Pixels are premultiplied, so blended components are
/// capped at the blended alpha.
fn blend_rect(
    pixmap: &mut Pixmap,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    color: TextColor,
    clip_min: i32,
    clip_max: i32,
) {
    let alpha = color.a() as u32;
    if alpha == 0 {
        return;
    }
    let (pw, ph) = (pixmap.width() as i32, pixmap.height() as i32);
    let x0 = x.max(clip_min).max(0);
    let x1 = (x + w as i32).min(clip_max).min(pw);
    let y0 = y.max(0);
    let y1 = (y + h as i32).min(ph);
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let (sr, sg, sb) = (color.r() as u32, color.g() as u32, color.b() as u32);
    let inv = 255 - alpha;
    let pixels = pixmap.pixels_mut();
    for py in y0..y1 {
        let row = (py * pw) as usize;
        for px in x0..x1 {
            let dst = pixels[row + px as usize];
            let a = (255 * alpha + dst.alpha() as u32 * inv + 127) / 255;
            let r = ((sr * alpha + dst.red() as u32 * inv + 127) / 255).min(a);
            let g = ((sg * alpha + dst.green() as u32 * inv + 127) / 255).min(a);
            let b = ((sb * alpha + dst.blue() as u32 * inv + 127) / 255).min(a);
            if let Some(c) = PremultipliedColorU8::from_rgba(r as u8, g as u8, b as u8, a as u8) {
                pixels[row + px as usize] = c;
            }
        }
    }
}

/// Scale the logo's pixels into the destination box.
fn blit_logo(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, logo: &Logo, s: f32) {
    let Some(size) = IntSize::from_wh(logo.width, logo.height) else {
        return;
    };
    let mut data = logo.rgba.clone();
    // tiny-skia stores premultiplied pixels; logo bytes are straight.
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
    let Some(src) = Pixmap::from_vec(data, size) else {
        return;
    };
    let sx = w * s / logo.width as f32;
    let sy = h * s / logo.height as f32;
    let paint = PixmapPaint { quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
    pixmap.draw_pixmap(
        0,
        0,
        src.as_ref(),
        &paint,
        Transform::from_row(sx, 0.0, 0.0, sy, x * s, y * s),
        None,
    );
}
