//! An in-memory backend for tests: scripted input, inspectable output.

use std::collections::VecDeque;
use std::time::Duration;

use crate::{
    Error, Result,
    backend::{
        Backend, RawInput, SurfaceId, clamp_frame,
        surface::{Cell, Surface, composite},
    },
    cursor::Cursor,
    event::EventKind,
    geom::{Point, Rect, Size},
    style::{Attr, Color, TermColor},
};

/// One logged draw operation, for asserting on erase and repaint behaviour
/// rather than just final pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Fill {
        surface: SurfaceId,
        rect: Rect,
        ch: char,
    },
    Text {
        surface: SurfaceId,
        loc: Point,
        txt: String,
    },
    Commit,
}

pub struct TestBackend {
    screen: Size,
    surfaces: Vec<Option<Surface>>,
    /// Compositing order, bottom to top.
    order: Vec<SurfaceId>,
    colors: Vec<(TermColor, TermColor)>,
    cursor: Option<Cursor>,
    inputs: VecDeque<RawInput>,
    ops: Vec<Op>,
    commits: usize,
}

impl TestBackend {
    pub fn new(screen: Size) -> TestBackend {
        TestBackend {
            screen,
            surfaces: Vec::new(),
            order: Vec::new(),
            colors: Vec::new(),
            cursor: None,
            inputs: VecDeque::new(),
            ops: Vec::new(),
            commits: 0,
        }
    }

    /// Queue a decoded event for the next `read_input`.
    pub fn push_event(&mut self, kind: EventKind) {
        self.inputs.push_back(RawInput::Event(kind));
    }

    pub fn push_input(&mut self, raw: RawInput) {
        self.inputs.push_back(raw);
    }

    /// The composited screen as one string per row.
    pub fn contents(&self) -> Vec<String> {
        let grid = composite(
            self.screen,
            self.order
                .iter()
                .filter_map(|id| self.surfaces[id.0 as usize].as_ref()),
        );
        (0..self.screen.y)
            .map(|y| {
                (0..self.screen.x)
                    .map(|x| grid[(y * self.screen.x + x) as usize].ch)
                    .collect()
            })
            .collect()
    }

    /// Does the composited screen contain `needle` anywhere?
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().iter().any(|l| l.contains(needle))
    }

    /// Drain the operation log.
    pub fn take_ops(&mut self) -> Vec<Op> {
        std::mem::take(&mut self.ops)
    }

    /// How many fills have been issued against a surface since the log was
    /// last drained. Erase assertions count these.
    pub fn fill_count(&self, id: SurfaceId) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Fill { surface, .. } if *surface == id))
            .count()
    }

    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn current_cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// The styled cell at a surface-local point, for attribute assertions.
    pub(crate) fn cell(&self, id: SurfaceId, p: Point) -> Result<Cell> {
        Ok(self.surface(id)?.cell(p))
    }

    fn surface(&self, id: SurfaceId) -> Result<&Surface> {
        self.surfaces
            .get(id.0 as usize)
            .and_then(|s| s.as_ref())
            .ok_or_else(|| Error::Backend(format!("no such surface: {:?}", id)))
    }

    fn surface_mut(&mut self, id: SurfaceId) -> Result<&mut Surface> {
        self.surfaces
            .get_mut(id.0 as usize)
            .and_then(|s| s.as_mut())
            .ok_or_else(|| Error::Backend(format!("no such surface: {:?}", id)))
    }
}

impl Backend for TestBackend {
    fn screen_size(&self) -> Size {
        self.screen
    }

    fn alloc_surface(&mut self, frame: Rect) -> Result<SurfaceId> {
        let granted = clamp_frame(self.screen, frame);
        let id = SurfaceId(self.surfaces.len() as u32);
        self.surfaces.push(Some(Surface::new(granted)));
        self.order.push(id);
        Ok(id)
    }

    fn move_surface(&mut self, id: SurfaceId, frame: Rect) -> Result<Rect> {
        let granted = clamp_frame(self.screen, frame);
        self.surface_mut(id)?.set_frame(granted);
        Ok(granted)
    }

    fn surface_frame(&self, id: SurfaceId) -> Result<Rect> {
        Ok(self.surface(id)?.frame)
    }

    fn free_surface(&mut self, id: SurfaceId) {
        if let Some(s) = self.surfaces.get_mut(id.0 as usize) {
            *s = None;
        }
        self.order.retain(|o| *o != id);
    }

    fn set_surface_visible(&mut self, id: SurfaceId, visible: bool) -> Result<()> {
        self.surface_mut(id)?.visible = visible;
        Ok(())
    }

    fn resize(&mut self, sz: Size) -> Result<()> {
        self.screen = sz;
        for s in self.surfaces.iter_mut().flatten() {
            let clamped = clamp_frame(sz, s.frame);
            if clamped != s.frame {
                s.set_frame(clamped);
            }
        }
        Ok(())
    }

    fn restack(&mut self, order: &[SurfaceId]) -> Result<()> {
        self.order.retain(|o| !order.contains(o));
        for id in order {
            if self.surfaces.get(id.0 as usize).is_some_and(|s| s.is_some()) {
                self.order.push(*id);
            }
        }
        Ok(())
    }

    fn register_color(&mut self, fg: TermColor, bg: TermColor) -> Result<Color> {
        self.colors.push((fg, bg));
        Ok(Color((self.colors.len() - 1) as u16))
    }

    fn push_attr(&mut self, id: SurfaceId, attr: Attr) -> Result<()> {
        self.surface_mut(id)?.push_attr(attr);
        Ok(())
    }

    fn pop_attr(&mut self, id: SurfaceId) -> Result<()> {
        self.surface_mut(id)?.pop_attr();
        Ok(())
    }

    fn text(&mut self, id: SurfaceId, loc: Point, txt: &str) -> Result<()> {
        self.ops.push(Op::Text {
            surface: id,
            loc,
            txt: txt.to_string(),
        });
        self.surface_mut(id)?.text(loc, txt);
        Ok(())
    }

    fn fill(&mut self, id: SurfaceId, rect: Rect, c: char) -> Result<()> {
        self.ops.push(Op::Fill {
            surface: id,
            rect,
            ch: c,
        });
        self.surface_mut(id)?.fill(rect, c);
        Ok(())
    }

    fn cursor(&mut self, c: Option<Cursor>) -> Result<()> {
        self.cursor = c;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        self.ops.push(Op::Commit);
        Ok(())
    }

    fn read_input(&mut self, _timeout: Option<Duration>) -> Result<RawInput> {
        Ok(self.inputs.pop_front().unwrap_or(RawInput::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_are_clamped() -> Result<()> {
        let mut be = TestBackend::new(Size::new(80, 24));
        let id = be.alloc_surface(Rect::new(0, 0, 10, 5))?;
        assert_eq!(
            be.move_surface(id, Rect::new(-5, -5, 10, 5))?,
            Rect::new(0, 0, 10, 5)
        );
        assert_eq!(
            be.move_surface(id, Rect::new(0, 0, 200, 5))?,
            Rect::new(0, 0, 80, 5)
        );
        Ok(())
    }

    #[test]
    fn restack_reorders() -> Result<()> {
        let mut be = TestBackend::new(Size::new(10, 2));
        let a = be.alloc_surface(Rect::new(0, 0, 10, 1))?;
        let b = be.alloc_surface(Rect::new(0, 0, 10, 1))?;
        be.fill(a, Rect::new(0, 0, 10, 1), 'a')?;
        be.fill(b, Rect::new(0, 0, 10, 1), 'b')?;
        assert!(be.contents()[0].starts_with('b'));
        be.restack(&[b, a])?;
        assert!(be.contents()[0].starts_with('a'));
        Ok(())
    }

    #[test]
    fn hidden_surfaces_do_not_composite() -> Result<()> {
        let mut be = TestBackend::new(Size::new(4, 1));
        let a = be.alloc_surface(Rect::new(0, 0, 4, 1))?;
        be.fill(a, Rect::new(0, 0, 4, 1), 'x')?;
        assert_eq!(be.contents()[0], "xxxx");
        be.set_surface_visible(a, false)?;
        assert_eq!(be.contents()[0], "    ");
        Ok(())
    }
}
