//! The terminal drawing primitive the view tree is built on.
//!
//! A backend owns a set of rectangular character-cell surfaces, composites
//! them to the physical terminal on [`Backend::commit`], and sources raw
//! input. Frame requests are reconciled: asking for a frame that hangs off
//! the screen yields a clamped grant, and the granted rect is what the
//! caller must treat as real.

pub(crate) mod surface;
pub mod term;
pub mod test;

use std::time::Duration;

use crate::{
    Result,
    cursor::Cursor,
    event::EventKind,
    geom::{Point, Rect, Size},
    style::{Attr, Color, TermColor},
};

/// A handle to one backend surface.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct SurfaceId(pub(crate) u32);

/// The result of one raw input read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    Event(EventKind),
    /// The wait expired with nothing to read.
    Timeout,
    /// Something was read but decoded to nothing (unknown key, garbled mouse
    /// follow-up). The sourcing loop tries again.
    Skip,
}

pub trait Backend {
    /// Take control of the terminal. No-op for in-memory backends.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Relinquish the terminal.
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    fn screen_size(&self) -> Size;

    /// Allocate a surface at the requested frame, returning its handle.
    /// Allocation failure is fatal to the UI.
    fn alloc_surface(&mut self, frame: Rect) -> Result<SurfaceId>;

    /// Request a new frame for a surface. The grant may be shifted or
    /// shrunk to keep the surface onscreen; the granted rect is returned.
    fn move_surface(&mut self, id: SurfaceId, frame: Rect) -> Result<Rect>;

    /// The frame the surface actually occupies right now. This can change
    /// underneath the view layer on terminal resize.
    fn surface_frame(&self, id: SurfaceId) -> Result<Rect>;

    fn free_surface(&mut self, id: SurfaceId);

    /// Include or exclude a surface from compositing. Hidden surfaces keep
    /// their contents and frame.
    fn set_surface_visible(&mut self, id: SurfaceId, visible: bool) -> Result<()>;

    /// Adopt a new physical screen size. Existing surface frames are
    /// re-clamped against it.
    fn resize(&mut self, sz: Size) -> Result<()>;

    /// Set the occlusion order for the given surfaces, bottom to top.
    /// Surfaces not listed keep their relative order below the listed ones.
    fn restack(&mut self, order: &[SurfaceId]) -> Result<()>;

    /// Register a foreground/background pair, returning an opaque handle.
    fn register_color(&mut self, fg: TermColor, bg: TermColor) -> Result<Color>;

    /// Push a rendering attribute onto the surface's attribute stack. All
    /// subsequent draws to the surface use the folded stack state.
    fn push_attr(&mut self, id: SurfaceId, attr: Attr) -> Result<()>;

    fn pop_attr(&mut self, id: SurfaceId) -> Result<()>;

    /// Draw UTF-8 text at a surface-relative location, clipped to the
    /// surface bounds.
    fn text(&mut self, id: SurfaceId, loc: Point, txt: &str) -> Result<()>;

    /// Fill a surface-relative rect with a character, clipped.
    fn fill(&mut self, id: SurfaceId, rect: Rect, c: char) -> Result<()>;

    /// Place (or hide, with `None`) the terminal cursor. The location is in
    /// screen space.
    fn cursor(&mut self, c: Option<Cursor>) -> Result<()>;

    /// Composite all surfaces to the physical terminal.
    fn commit(&mut self) -> Result<()>;

    /// Block for one raw input. `None` blocks indefinitely; a zero timeout
    /// is an immediate poll.
    fn read_input(&mut self, timeout: Option<Duration>) -> Result<RawInput>;
}

/// Clamp a requested frame so it lies within a screen of the given size.
/// The size is clipped to the screen, then the origin shifted to keep the
/// whole frame visible. This is the single reconciliation rule both
/// backends apply.
pub(crate) fn clamp_frame(screen: Size, req: Rect) -> Rect {
    let w = req.size.x.clamp(0, screen.x);
    let h = req.size.y.clamp(0, screen.y);
    let x = req.origin.x.clamp(0, screen.x - w);
    let y = req.origin.y.clamp(0, screen.y - h);
    Rect::new(x, y, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp() {
        let screen = Size::new(80, 24);
        assert_eq!(
            clamp_frame(screen, Rect::new(-5, -5, 10, 10)),
            Rect::new(0, 0, 10, 10)
        );
        assert_eq!(
            clamp_frame(screen, Rect::new(75, 20, 10, 10)),
            Rect::new(70, 14, 10, 10)
        );
        assert_eq!(
            clamp_frame(screen, Rect::new(0, 0, 100, 100)),
            Rect::new(0, 0, 80, 24)
        );
        assert_eq!(
            clamp_frame(screen, Rect::new(5, 5, 10, 10)),
            Rect::new(5, 5, 10, 10)
        );
    }
}
