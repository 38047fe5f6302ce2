//! The draw context handed to widget `draw` hooks.
//!
//! A [`Draw`] is bound to one backend surface and carries the window-relative
//! origin of the node being drawn, so widgets work purely in node-local
//! coordinates. All output is clipped by the backend at the surface edge.

use std::ops::{Deref, DerefMut};

use crate::{
    Result,
    backend::{Backend, SurfaceId},
    geom::{Point, Rect, Size},
    style::{Attr, Color, Palette},
};

pub struct Draw<'a> {
    pub(crate) backend: &'a mut dyn Backend,
    pub surface: SurfaceId,
    /// Window-relative origin of the node being drawn.
    pub origin: Point,
    /// The node's size, for convenience.
    pub size: Size,
    pub palette: &'a Palette,
}

impl<'a> Draw<'a> {
    /// Print text at a node-local point.
    pub fn text(&mut self, color: Color, p: Point, txt: &str) -> Result<()> {
        self.backend.push_attr(self.surface, Attr::Color(color))?;
        let r = self.backend.text(self.surface, self.origin + p, txt);
        self.backend.pop_attr(self.surface)?;
        r
    }

    /// Fill a node-local rect with a character.
    pub fn fill(&mut self, color: Color, r: Rect, c: char) -> Result<()> {
        self.backend.push_attr(self.surface, Attr::Color(color))?;
        let res = self.backend.fill(self.surface, r.at(self.origin + r.origin), c);
        self.backend.pop_attr(self.surface)?;
        res
    }

    /// Clear the node's whole region to spaces in the normal style.
    pub fn erase(&mut self) -> Result<()> {
        let r = Rect {
            origin: Point::zero(),
            size: self.size,
        };
        self.fill(self.palette.normal, r, ' ')
    }

    pub fn hline(&mut self, color: Color, p: Point, len: i32) -> Result<()> {
        self.fill(color, Rect::new(p.x, p.y, len, 1), '─')
    }

    pub fn vline(&mut self, color: Color, p: Point, len: i32) -> Result<()> {
        self.fill(color, Rect::new(p.x, p.y, 1, len), '│')
    }

    /// Draw a box along the edges of a node-local rect. Degenerate rects
    /// draw nothing.
    pub fn box_(&mut self, color: Color, r: Rect) -> Result<()> {
        if r.size.x < 2 || r.size.y < 2 {
            return Ok(());
        }
        self.hline(color, Point::new(r.xmin() + 1, r.ymin()), r.size.x - 2)?;
        self.hline(color, Point::new(r.xmin() + 1, r.ymax() - 1), r.size.x - 2)?;
        self.vline(color, Point::new(r.xmin(), r.ymin() + 1), r.size.y - 2)?;
        self.vline(color, Point::new(r.xmax() - 1, r.ymin() + 1), r.size.y - 2)?;
        self.text(color, Point::new(r.xmin(), r.ymin()), "┌")?;
        self.text(color, Point::new(r.xmax() - 1, r.ymin()), "┐")?;
        self.text(color, Point::new(r.xmin(), r.ymax() - 1), "└")?;
        self.text(color, Point::new(r.xmax() - 1, r.ymax() - 1), "┘")?;
        Ok(())
    }

    /// Activate an attribute for a scope. The attribute is popped when the
    /// guard drops, on every exit path.
    pub fn attr(&mut self, a: Attr) -> Result<AttrGuard<'_, 'a>> {
        self.backend.push_attr(self.surface, a)?;
        Ok(AttrGuard { draw: self })
    }
}

/// Scoped activation of a rendering attribute. Dereferences to the
/// underlying [`Draw`], so drawing continues through the guard.
pub struct AttrGuard<'g, 'a> {
    draw: &'g mut Draw<'a>,
}

impl<'a> Deref for AttrGuard<'_, 'a> {
    type Target = Draw<'a>;

    fn deref(&self) -> &Draw<'a> {
        self.draw
    }
}

impl<'a> DerefMut for AttrGuard<'_, 'a> {
    fn deref_mut(&mut self) -> &mut Draw<'a> {
        self.draw
    }
}

impl Drop for AttrGuard<'_, '_> {
    fn drop(&mut self) {
        // Nothing useful to do with a pop failure during unwind.
        let _ = self.draw.backend.pop_attr(self.draw.surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Error,
        backend::test::TestBackend,
        style::{Palette, Theme},
    };

    /// Draws under an underline guard and optionally bails out early.
    fn scoped_paint(d: &mut Draw, fail: bool) -> Result<()> {
        let mut g = d.attr(Attr::Underline)?;
        let color = g.palette.normal;
        g.text(color, Point::new(0, 0), "on")?;
        if fail {
            return Err(Error::Invalid("stop".into()));
        }
        Ok(())
    }

    #[test]
    fn attr_guard_scopes_the_attribute() -> Result<()> {
        let mut be = TestBackend::new(Size::new(10, 2));
        let palette = Palette::new(&mut be, Theme::default())?;
        let surface = be.alloc_surface(Rect::new(0, 0, 10, 2))?;
        {
            let mut d = Draw {
                backend: &mut be,
                surface,
                origin: Point::zero(),
                size: Size::new(10, 2),
                palette: &palette,
            };
            scoped_paint(&mut d, false)?;
            d.text(palette.normal, Point::new(0, 1), "off")?;
        }
        assert!(be.cell(surface, Point::new(0, 0))?.underline);
        assert!(!be.cell(surface, Point::new(0, 1))?.underline);
        Ok(())
    }

    #[test]
    fn attr_guard_pops_on_early_return() -> Result<()> {
        let mut be = TestBackend::new(Size::new(10, 2));
        let palette = Palette::new(&mut be, Theme::default())?;
        let surface = be.alloc_surface(Rect::new(0, 0, 10, 2))?;
        {
            let mut d = Draw {
                backend: &mut be,
                surface,
                origin: Point::zero(),
                size: Size::new(10, 2),
                palette: &palette,
            };
            assert!(scoped_paint(&mut d, true).is_err());
            // The error path unwound the guard, so this draw is plain.
            d.text(palette.normal, Point::new(4, 1), "x")?;
        }
        assert!(!be.cell(surface, Point::new(4, 1))?.underline);
        Ok(())
    }
}
