use crate::geom::Point;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CursorShape {
    Underscore,
    Line,
    Block,
}

/// A cursor placement request, surfaced by a widget's `cursor()` hook. The
/// location is relative to the widget's origin; the draw pass converts it to
/// screen space while accumulating the frame's winning request.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Cursor {
    pub location: Point,
    pub shape: CursorShape,
    pub blink: bool,
}
