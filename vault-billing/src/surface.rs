use crate::state::Logo;

/// Opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Medium,
    Bold,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub italic: bool,
    pub color: Rgb,
}

/// One paint instruction in CSS-pixel coordinates, origin at the
/// page's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
        width: f32,
    },
    /// Horizontal rule from `x0` to `x1`, `width` thick, growing down
    /// from `y`.
    HLine {
        x0: f32,
        x1: f32,
        y: f32,
        width: f32,
        color: Rgb,
    },
    /// Single line of text anchored inside the box starting at `x`.
    /// `y` is the top of the line box; overflow past `max_w` is
    /// clipped, not wrapped.
    Text {
        x: f32,
        y: f32,
        max_w: f32,
        align: TextAlign,
        style: TextStyle,
        content: String,
    },
    /// Logo pixels scaled into the destination box.
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        logo: Logo,
    },
}

/// An ordered list of paint instructions plus final page dimensions.
/// Layout appends ops top to bottom and fixes `height` last, once the
/// content's extent is known.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSurface {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<DrawOp>,
}

impl PageSurface {
    pub fn new(width: u32) -> PageSurface {
        PageSurface { width, height: 0, ops: Vec::new() }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.ops.push(DrawOp::FillRect { x, y, w, h, color });
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, width: f32) {
        self.ops.push(DrawOp::StrokeRect { x, y, w, h, color, width });
    }

    pub fn hline(&mut self, x0: f32, x1: f32, y: f32, width: f32, color: Rgb) {
        self.ops.push(DrawOp::HLine { x0, x1, y, width, color });
    }

    pub fn text(
        &mut self,
        x: f32,
        y: f32,
        max_w: f32,
        align: TextAlign,
        style: TextStyle,
        content: impl Into<String>,
    ) {
        self.ops.push(DrawOp::Text { x, y, max_w, align, style, content: content.into() });
    }

    pub fn image(&mut self, x: f32, y: f32, w: f32, h: f32, logo: Logo) {
        self.ops.push(DrawOp::Image { x, y, w, h, logo });
    }
}
