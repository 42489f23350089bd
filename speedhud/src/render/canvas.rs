//! Drawing primitives.
//!
//! The renderer only talks to the object-safe [`Canvas`] trait, so the same
//! layout code draws onto a terminal, a recording display list in tests, or
//! any other backend a host provides.

/// Width and height of a drawable surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A point in surface coordinates. The origin is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x000000);
    pub const WHITE: Color = Color::rgb(0xffffff);

    /// Opaque colour from a `0xRRGGBB` value.
    pub const fn rgb(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
            a: 0xff,
        }
    }

    /// Same colour with alpha scaled by `opacity` in [0, 1].
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            a: (self.a as f32 * opacity).round() as u8,
            ..self
        }
    }

    /// Blend against black by alpha, for backends without transparency.
    pub fn premultiplied(self) -> (u8, u8, u8) {
        let scale = |c: u8| ((c as u16 * self.a as u16 + 127) / 255) as u8;
        (scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Horizontal anchoring of text relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Style for a drawing call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub stroke_width: f32,
    pub text_size: f32,
    pub align: TextAlign,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            stroke_width: 1.0,
            text_size: 1.0,
            align: TextAlign::Left,
        }
    }
}

impl Paint {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = width;
        self
    }

    pub fn text_size(mut self, size: f32) -> Self {
        self.text_size = size;
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.color = self.color.with_opacity(opacity);
        self
    }
}

/// Measured extent of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextBounds {
    pub width: f32,
    pub height: f32,
}

/// A drawing target for one frame.
pub trait Canvas {
    /// Size of the drawable area.
    fn size(&self) -> SurfaceSize;

    /// Fill the whole canvas with `color`.
    fn clear(&mut self, color: Color);

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint);

    /// Draw `text` with its baseline at `origin.y`; `origin.x` is interpreted
    /// according to `paint.align`.
    fn draw_text(&mut self, text: &str, origin: Point, paint: &Paint);

    fn text_bounds(&self, text: &str, paint: &Paint) -> TextBounds;
}
