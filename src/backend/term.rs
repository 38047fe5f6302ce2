//! The crossterm-backed terminal backend.
//!
//! Surfaces are composited into the physical terminal on commit. Damage is
//! tracked per screen row: any draw, move or restack marks the rows it
//! touches, and commit repaints only marked rows.

use std::io::{self, Write};
use std::time::Duration;

use bitvec::prelude::*;
use crossterm::{
    QueueableCommand, cursor as tcursor,
    event as cevent, execute,
    style::{Attribute as TermAttr, Colors, Print, ResetColor, SetAttribute, SetColors},
    terminal,
};
use tracing::trace;

use crate::{
    Error, Result,
    backend::{
        Backend, RawInput, SurfaceId, clamp_frame,
        surface::{Surface, composite},
    },
    cursor::{Cursor, CursorShape},
    event,
    geom::{Point, Rect, Size},
    style::{Attr, Color, TermColor},
};

pub struct TermBackend {
    out: Box<dyn Write>,
    screen: Size,
    surfaces: Vec<Option<Surface>>,
    /// Compositing order, bottom to top.
    order: Vec<SurfaceId>,
    colors: Vec<(TermColor, TermColor)>,
    cursor: Option<Cursor>,
    /// One bit per screen row.
    damage: BitVec,
}

impl TermBackend {
    /// A backend writing to stderr, sized to the current terminal.
    pub fn new() -> Result<TermBackend> {
        let (w, h) = terminal::size()?;
        Ok(TermBackend::with_output(
            Box::new(io::stderr()),
            Size::new(w as i32, h as i32),
        ))
    }

    pub fn with_output(out: Box<dyn Write>, screen: Size) -> TermBackend {
        TermBackend {
            out,
            screen,
            surfaces: Vec::new(),
            order: Vec::new(),
            colors: Vec::new(),
            cursor: None,
            damage: bitvec![1; screen.y.max(0) as usize],
        }
    }

    fn mark_rows(&mut self, r: Rect) {
        let y0 = r.ymin().max(0) as usize;
        let y1 = r.ymax().clamp(0, self.screen.y) as usize;
        for y in y0..y1 {
            self.damage.set(y, true);
        }
    }

    fn mark_all(&mut self) {
        self.damage.fill(true);
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

    /// The screen-space region a surface-local rect lands on.
    fn touched(&self, id: SurfaceId, local: Rect) -> Result<Rect> {
        let frame = self.surface(id)?.frame;
        let clipped = local.intersect(Rect {
            origin: Point::zero(),
            size: frame.size,
        });
        Ok(clipped.at(frame.origin + clipped.origin))
    }
}

impl Backend for TermBackend {
    fn start(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            cevent::EnableMouseCapture,
            tcursor::Hide
        )?;
        self.mark_all();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        execute!(
            self.out,
            terminal::LeaveAlternateScreen,
            cevent::DisableMouseCapture,
            tcursor::Show
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    fn screen_size(&self) -> Size {
        self.screen
    }

    fn alloc_surface(&mut self, frame: Rect) -> Result<SurfaceId> {
        let granted = clamp_frame(self.screen, frame);
        let id = SurfaceId(self.surfaces.len() as u32);
        self.surfaces.push(Some(Surface::new(granted)));
        self.order.push(id);
        self.mark_rows(granted);
        Ok(id)
    }

    fn move_surface(&mut self, id: SurfaceId, frame: Rect) -> Result<Rect> {
        let granted = clamp_frame(self.screen, frame);
        let old = self.surface(id)?.frame;
        if granted != old {
            self.mark_rows(old);
            self.mark_rows(granted);
            self.surface_mut(id)?.set_frame(granted);
        }
        Ok(granted)
    }

    fn surface_frame(&self, id: SurfaceId) -> Result<Rect> {
        Ok(self.surface(id)?.frame)
    }

    fn free_surface(&mut self, id: SurfaceId) {
        if let Some(Some(s)) = self.surfaces.get(id.0 as usize) {
            let frame = s.frame;
            self.mark_rows(frame);
        }
        if let Some(s) = self.surfaces.get_mut(id.0 as usize) {
            *s = None;
        }
        self.order.retain(|o| *o != id);
    }

    fn set_surface_visible(&mut self, id: SurfaceId, visible: bool) -> Result<()> {
        let frame = self.surface(id)?.frame;
        self.surface_mut(id)?.visible = visible;
        self.mark_rows(frame);
        Ok(())
    }

    fn resize(&mut self, sz: Size) -> Result<()> {
        self.screen = sz;
        self.damage = bitvec![1; sz.y.max(0) as usize];
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
        // Occlusion changed in a way row tracking can't see.
        self.mark_all();
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
        let len = txt.chars().count() as i32;
        let touched = self.touched(id, Rect::new(loc.x, loc.y, len, 1))?;
        self.surface_mut(id)?.text(loc, txt);
        self.mark_rows(touched);
        Ok(())
    }

    fn fill(&mut self, id: SurfaceId, rect: Rect, c: char) -> Result<()> {
        let touched = self.touched(id, rect)?;
        self.surface_mut(id)?.fill(rect, c);
        self.mark_rows(touched);
        Ok(())
    }

    fn cursor(&mut self, c: Option<Cursor>) -> Result<()> {
        self.cursor = c;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let grid = composite(
            self.screen,
            self.order
                .iter()
                .filter_map(|id| self.surfaces[id.0 as usize].as_ref()),
        );
        self.out.queue(tcursor::Hide)?;
        for y in 0..self.screen.y {
            if !self.damage.get(y as usize).map(|b| *b).unwrap_or(false) {
                continue;
            }
            trace!(y, "repaint row");
            self.out.queue(tcursor::MoveTo(0, y as u16))?;
            let mut x = 0;
            while x < self.screen.x {
                let first = grid[(y * self.screen.x + x) as usize];
                let mut run = String::new();
                while x < self.screen.x {
                    let cell = grid[(y * self.screen.x + x) as usize];
                    if (cell.color, cell.bold, cell.underline)
                        != (first.color, first.bold, first.underline)
                    {
                        break;
                    }
                    run.push(cell.ch);
                    x += 1;
                }
                self.out.queue(SetAttribute(TermAttr::Reset))?;
                match self.colors.get(first.color.0 as usize) {
                    Some((fg, bg)) => {
                        self.out.queue(SetColors(Colors::new(*fg, *bg)))?;
                    }
                    None => {
                        self.out.queue(ResetColor)?;
                    }
                }
                if first.bold {
                    self.out.queue(SetAttribute(TermAttr::Bold))?;
                }
                if first.underline {
                    self.out.queue(SetAttribute(TermAttr::Underlined))?;
                }
                self.out.queue(Print(run))?;
            }
        }
        self.damage.fill(false);
        match self.cursor {
            Some(c) => {
                let style = match (c.shape, c.blink) {
                    (CursorShape::Block, true) => tcursor::SetCursorStyle::BlinkingBlock,
                    (CursorShape::Block, false) => tcursor::SetCursorStyle::SteadyBlock,
                    (CursorShape::Line, true) => tcursor::SetCursorStyle::BlinkingBar,
                    (CursorShape::Line, false) => tcursor::SetCursorStyle::SteadyBar,
                    (CursorShape::Underscore, true) => {
                        tcursor::SetCursorStyle::BlinkingUnderScore
                    }
                    (CursorShape::Underscore, false) => {
                        tcursor::SetCursorStyle::SteadyUnderScore
                    }
                };
                self.out
                    .queue(tcursor::MoveTo(c.location.x as u16, c.location.y as u16))?;
                self.out.queue(style)?;
                self.out.queue(tcursor::Show)?;
            }
            None => {
                self.out.queue(tcursor::Hide)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    fn read_input(&mut self, timeout: Option<Duration>) -> Result<RawInput> {
        let ready = match timeout {
            None => true,
            Some(t) => cevent::poll(t)?,
        };
        if !ready {
            return Ok(RawInput::Timeout);
        }
        Ok(match event::decode(cevent::read()?) {
            Some(kind) => RawInput::Event(kind),
            None => RawInput::Skip,
        })
    }
}
