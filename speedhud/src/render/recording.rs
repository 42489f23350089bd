//! A canvas that records drawing calls instead of rasterising them.

use super::canvas::{Canvas, Color, Paint, Point, SurfaceSize, TextBounds};

/// Fraction of the text size taken up by one character.
const CHAR_WIDTH_RATIO: f32 = 0.5;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Line { from: Point, to: Point, paint: Paint },
    Text {
        text: String,
        origin: Point,
        paint: Paint,
    },
}

/// Display-list canvas for inspecting renderer output.
///
/// Text is measured as a fixed-pitch font where every character is half as
/// wide as the text size.
#[derive(Debug, Clone)]
pub struct RecordingCanvas {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: SurfaceSize::new(width, height),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// All recorded text draws, in order.
    pub fn texts(&self) -> impl Iterator<Item = (&str, Point, &Paint)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text {
                text,
                origin,
                paint,
            } => Some((text.as_str(), *origin, paint)),
            _ => None,
        })
    }

    /// All recorded line draws, in order.
    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, &Paint)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, paint } => Some((*from, *to, paint)),
            _ => None,
        })
    }

    /// First text draw whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<(Point, &Paint)> {
        self.texts()
            .find(|(t, _, _)| *t == text)
            .map(|(_, origin, paint)| (origin, paint))
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn draw_line(&mut self, from: Point, to: Point, paint: &Paint) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            paint: *paint,
        });
    }

    fn draw_text(&mut self, text: &str, origin: Point, paint: &Paint) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin,
            paint: *paint,
        });
    }

    fn text_bounds(&self, text: &str, paint: &Paint) -> TextBounds {
        TextBounds {
            width: text.chars().count() as f32 * paint.text_size * CHAR_WIDTH_RATIO,
            height: paint.text_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut canvas = RecordingCanvas::new(10, 10);
        let paint = Paint::default();
        canvas.draw_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), &paint);
        canvas.draw_text("hi", Point::new(2.0, 3.0), &paint);

        assert_eq!(canvas.commands().len(), 2);
        assert_eq!(canvas.lines().count(), 1);
        assert_eq!(canvas.find_text("hi").map(|(p, _)| p), Some(Point::new(2.0, 3.0)));
    }

    #[test]
    fn test_clear_resets_list() {
        let mut canvas = RecordingCanvas::new(10, 10);
        canvas.draw_text("old", Point::default(), &Paint::default());
        canvas.clear(Color::BLACK);
        assert_eq!(canvas.commands(), &[DrawCommand::Clear(Color::BLACK)]);
    }

    #[test]
    fn test_text_bounds() {
        let canvas = RecordingCanvas::new(10, 10);
        let bounds = canvas.text_bounds("NNE", &Paint::default().text_size(10.0));
        assert_eq!(bounds.width, 15.0);
        assert_eq!(bounds.height, 10.0);
    }
}
