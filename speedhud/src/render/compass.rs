//! Compass band, needle, speed readout and advisory.
//!
//! Layout is defined on a 640×360 reference surface and scaled to the real
//! one. The heading scale is the exception: 90° of heading always spans the
//! full surface width, so a quarter turn pans the band by exactly one width.

use super::canvas::{Canvas, Color, Paint, Point, TextAlign};
use super::speed::format_speed;
use super::RenderError;
use crate::angle::{DEGREES_PER_HALF_WIND, DIRECTIONS};
use crate::hud::DisplaySnapshot;

/// Reference surface the layout constants are expressed against.
pub const REFERENCE_WIDTH: f32 = 640.0;
pub const REFERENCE_HEIGHT: f32 = 360.0;

/// Degrees of heading visible across the surface width.
pub const VISIBLE_DEGREES: f32 = 90.0;

/// Smallest surface the HUD can be laid out on.
pub const MIN_WIDTH: u32 = 16;
pub const MIN_HEIGHT: u32 = 4;

const NEEDLE_COLOR: Color = Color::rgb(0xcc3333);
const DIRECTION_TEXT_COLOR: Color = Color::rgb(0xffffff);
const SPEED_COLOR: Color = Color::rgb(0x99cc33);
const SPEED_UNIT_COLOR: Color = Color::rgb(0xffffff);
const TICK_LONG_COLOR: Color = Color::rgb(0xffffff);
const TICK_SHORT_COLOR: Color = Color::rgb(0x808080);
const ADVISORY_COLOR: Color = Color::rgb(0xffffff);
const BACKGROUND: Color = Color::BLACK;

const NEEDLE_HALF_WIDTH: f32 = 6.0;
const NEEDLE_HEIGHT: f32 = 44.0;
const NEEDLE_STROKE: f32 = 1.0;
const TICK_STROKE: f32 = 2.0;
const TICK_LONG_HEIGHT: f32 = 40.0;
const TICK_SHORT_TOP: f32 = 10.0;
const TICK_SHORT_HEIGHT: f32 = 20.0;
const TICK_STEP_DEGREES: usize = 15;
const LABEL_BASELINE: f32 = 70.0;
const DIRECTION_TEXT_SIZE: f32 = 36.0;
const SPEED_TEXT_SIZE: f32 = 256.0;
const UNIT_TEXT_SIZE: f32 = 72.0;
const SPEED_RIGHT_MARGIN: f32 = 218.0;
const UNIT_LEFT: f32 = 442.0;
const SPEED_BOTTOM_MARGIN: f32 = 40.0;
const ADVISORY_BASELINE: f32 = 120.0;
const ADVISORY_TEXT_SIZE: f32 = 28.0;

/// Extra half-wind labels drawn beyond each end of the circle.
const LABEL_PADDING: i32 = 2;

/// Tick range, one half-turn beyond each end of the circle.
const TICK_FIRST_DEGREE: i32 = -180;
const TICK_LAST_DEGREE: i32 = 540;

/// Draws one HUD frame from a [`DisplaySnapshot`].
///
/// Holds no per-frame state; the same renderer can be shared by any number
/// of frames or threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompassRenderer;

/// Per-frame scale factors derived from the surface size.
#[derive(Debug, Clone, Copy)]
struct Layout {
    width: f32,
    height: f32,
    sx: f32,
    sy: f32,
    pixels_per_degree: f32,
}

impl Layout {
    fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

impl CompassRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the whole HUD onto `canvas`.
    ///
    /// Lays out against the size the host last reported for the surface,
    /// or the canvas size when none has been reported.
    pub fn render(
        &self,
        canvas: &mut dyn Canvas,
        snapshot: &DisplaySnapshot,
    ) -> Result<(), RenderError> {
        let size = snapshot
            .surface_size
            .filter(|size| !size.is_empty())
            .unwrap_or_else(|| canvas.size());
        if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
            return Err(RenderError::SurfaceTooSmall {
                width: size.width,
                height: size.height,
            });
        }

        let width = size.width as f32;
        let height = size.height as f32;
        let layout = Layout {
            width,
            height,
            sx: width / REFERENCE_WIDTH,
            sy: height / REFERENCE_HEIGHT,
            pixels_per_degree: width / VISIBLE_DEGREES,
        };

        canvas.clear(BACKGROUND);

        // Nothing to point at until the first heading arrives
        if let Some(heading) = snapshot.animated_heading {
            let offset = -heading * layout.pixels_per_degree + layout.center_x();
            self.draw_directions(canvas, &layout, offset);
            self.draw_ticks(canvas, &layout, offset);
            self.draw_needle(canvas, &layout);
        }

        self.draw_speed(canvas, &layout, snapshot);
        self.draw_advisory(canvas, &layout, snapshot);
        Ok(())
    }

    fn draw_directions(&self, canvas: &mut dyn Canvas, layout: &Layout, offset: f32) {
        let paint = Paint::new(DIRECTION_TEXT_COLOR).text_size(DIRECTION_TEXT_SIZE * layout.sy);
        let count = DIRECTIONS.len() as i32;

        for i in -LABEL_PADDING..=count + LABEL_PADDING {
            // Only cardinal and ordinal points get a label
            if i.rem_euclid(2) != 0 {
                continue;
            }
            let name = DIRECTIONS[i.rem_euclid(count) as usize];
            let bounds = canvas.text_bounds(name, &paint);
            let x = offset + i as f32 * DEGREES_PER_HALF_WIND * layout.pixels_per_degree
                - bounds.width / 2.0;
            let y = LABEL_BASELINE * layout.sy + bounds.height / 2.0;
            canvas.draw_text(name, Point::new(x, y), &paint);
        }
    }

    fn draw_ticks(&self, canvas: &mut dyn Canvas, layout: &Layout, offset: f32) {
        let stroke = TICK_STROKE * layout.sx;
        let long = Paint::new(TICK_LONG_COLOR).stroke_width(stroke);
        let short = Paint::new(TICK_SHORT_COLOR).stroke_width(stroke);

        for degree in (TICK_FIRST_DEGREE..=TICK_LAST_DEGREE).step_by(TICK_STEP_DEGREES) {
            let x = offset + degree as f32 * layout.pixels_per_degree;
            if degree % 45 == 0 {
                canvas.draw_line(
                    Point::new(x, 0.0),
                    Point::new(x, TICK_LONG_HEIGHT * layout.sy),
                    &long,
                );
            } else {
                let top = TICK_SHORT_TOP * layout.sy;
                canvas.draw_line(
                    Point::new(x, top),
                    Point::new(x, top + TICK_SHORT_HEIGHT * layout.sy),
                    &short,
                );
            }
        }
    }

    fn draw_needle(&self, canvas: &mut dyn Canvas, layout: &Layout) {
        let paint = Paint::new(NEEDLE_COLOR).stroke_width(NEEDLE_STROKE * layout.sx);
        let left = layout.center_x() - NEEDLE_HALF_WIDTH * layout.sx;
        let right = layout.center_x() + NEEDLE_HALF_WIDTH * layout.sx;
        let bottom = NEEDLE_HEIGHT * layout.sy;

        canvas.draw_line(Point::new(left, 0.0), Point::new(left, bottom), &paint);
        canvas.draw_line(Point::new(left, bottom), Point::new(right, bottom), &paint);
        canvas.draw_line(Point::new(right, 0.0), Point::new(right, bottom), &paint);
    }

    fn draw_speed(&self, canvas: &mut dyn Canvas, layout: &Layout, snapshot: &DisplaySnapshot) {
        let baseline = layout.height - SPEED_BOTTOM_MARGIN * layout.sy;

        let speed = format_speed(snapshot.speed_mps, snapshot.unit);
        let speed_paint = Paint::new(SPEED_COLOR)
            .text_size(SPEED_TEXT_SIZE * layout.sy)
            .align(TextAlign::Right);
        let speed_right = layout.width - SPEED_RIGHT_MARGIN * layout.sx;
        canvas.draw_text(&speed, Point::new(speed_right, baseline), &speed_paint);

        let unit_paint = Paint::new(SPEED_UNIT_COLOR).text_size(UNIT_TEXT_SIZE * layout.sy);
        canvas.draw_text(
            snapshot.unit.label(),
            Point::new(UNIT_LEFT * layout.sx, baseline),
            &unit_paint,
        );
    }

    fn draw_advisory(&self, canvas: &mut dyn Canvas, layout: &Layout, snapshot: &DisplaySnapshot) {
        let Some(text) = snapshot.advisory_text else {
            return;
        };
        if snapshot.advisory_opacity <= 0.0 {
            return;
        }

        let paint = Paint::new(ADVISORY_COLOR)
            .text_size(ADVISORY_TEXT_SIZE * layout.sy)
            .align(TextAlign::Center)
            .opacity(snapshot.advisory_opacity);
        canvas.draw_text(
            text,
            Point::new(layout.center_x(), ADVISORY_BASELINE * layout.sy),
            &paint,
        );
    }
}
