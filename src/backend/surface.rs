//! The in-memory cell store both backends share.
//!
//! A surface is a rectangle of styled character cells plus an attribute
//! stack. Draw calls clip at the surface edge rather than erroring, so
//! widgets can render partially offscreen content without bounds arithmetic.

use crate::geom::{Point, Rect, Size};
use crate::style::{Attr, Color};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cell {
    pub ch: char,
    pub color: Color,
    pub bold: bool,
    pub underline: bool,
}

impl Cell {
    pub fn blank() -> Cell {
        Cell {
            ch: ' ',
            color: Color(0),
            bold: false,
            underline: false,
        }
    }
}

/// The folded state of an attribute stack: the topmost color wins, boolean
/// attributes are on if any entry sets them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Style {
    pub color: Color,
    pub bold: bool,
    pub underline: bool,
}

pub(crate) struct Surface {
    pub frame: Rect,
    pub visible: bool,
    cells: Vec<Cell>,
    attrs: Vec<Attr>,
}

impl Surface {
    pub fn new(frame: Rect) -> Surface {
        let n = (frame.size.x * frame.size.y).max(0) as usize;
        Surface {
            frame,
            visible: true,
            cells: vec![Cell::blank(); n],
            attrs: Vec::new(),
        }
    }

    /// Adopt a new frame. A size change discards the cell contents; a pure
    /// move keeps them.
    pub fn set_frame(&mut self, frame: Rect) {
        if frame.size != self.frame.size {
            let n = (frame.size.x * frame.size.y).max(0) as usize;
            self.cells = vec![Cell::blank(); n];
        }
        self.frame = frame;
    }

    pub fn push_attr(&mut self, a: Attr) {
        self.attrs.push(a);
    }

    pub fn pop_attr(&mut self) {
        self.attrs.pop();
    }

    pub fn style(&self) -> Style {
        let mut s = Style {
            color: Color(0),
            bold: false,
            underline: false,
        };
        for a in &self.attrs {
            match a {
                Attr::Color(c) => s.color = *c,
                Attr::Bold => s.bold = true,
                Attr::Underline => s.underline = true,
            }
        }
        s
    }

    fn idx(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.frame.size.x || p.y >= self.frame.size.y {
            return None;
        }
        Some((p.y * self.frame.size.x + p.x) as usize)
    }

    /// The cell at a surface-local point. Out-of-bounds reads are blank.
    pub fn cell(&self, p: Point) -> Cell {
        self.idx(p).map(|i| self.cells[i]).unwrap_or(Cell::blank())
    }

    fn put(&mut self, p: Point, ch: char) {
        let style = self.style();
        if let Some(i) = self.idx(p) {
            self.cells[i] = Cell {
                ch,
                color: style.color,
                bold: style.bold,
                underline: style.underline,
            };
        }
    }

    /// Write text starting at a surface-local point, clipped.
    pub fn text(&mut self, loc: Point, txt: &str) {
        for (i, ch) in txt.chars().enumerate() {
            self.put(Point::new(loc.x + i as i32, loc.y), ch);
        }
    }

    /// Fill a surface-local rect with a character, clipped.
    pub fn fill(&mut self, rect: Rect, c: char) {
        let clip = rect.intersect(Rect {
            origin: Point::zero(),
            size: self.frame.size,
        });
        for y in clip.ymin()..clip.ymax() {
            for x in clip.xmin()..clip.xmax() {
                self.put(Point::new(x, y), c);
            }
        }
    }
}

/// Composite surfaces bottom-to-top into a screen-sized cell grid.
pub(crate) fn composite<'a>(
    screen: Size,
    stack: impl Iterator<Item = &'a Surface>,
) -> Vec<Cell> {
    let n = (screen.x * screen.y).max(0) as usize;
    let mut grid = vec![Cell::blank(); n];
    for s in stack {
        if !s.visible {
            continue;
        }
        let clip = s.frame.intersect(Rect {
            origin: Point::zero(),
            size: screen,
        });
        for y in clip.ymin()..clip.ymax() {
            for x in clip.xmin()..clip.xmax() {
                let local = Point::new(x - s.frame.origin.x, y - s.frame.origin.y);
                grid[(y * screen.x + x) as usize] = s.cell(local);
            }
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipping() {
        let mut s = Surface::new(Rect::new(0, 0, 4, 2));
        s.text(Point::new(2, 0), "abcd");
        assert_eq!(s.cell(Point::new(2, 0)).ch, 'a');
        assert_eq!(s.cell(Point::new(3, 0)).ch, 'b');
        // c and d fell off the edge.
        assert_eq!(s.cell(Point::new(4, 0)).ch, ' ');

        s.fill(Rect::new(-1, -1, 10, 10), '#');
        assert_eq!(s.cell(Point::new(0, 0)).ch, '#');
        assert_eq!(s.cell(Point::new(3, 1)).ch, '#');
    }

    #[test]
    fn attr_fold() {
        let mut s = Surface::new(Rect::new(0, 0, 2, 1));
        s.push_attr(Attr::Color(Color(3)));
        s.push_attr(Attr::Bold);
        s.push_attr(Attr::Color(Color(5)));
        let st = s.style();
        assert_eq!(st.color, Color(5));
        assert!(st.bold);
        s.pop_attr();
        assert_eq!(s.style().color, Color(3));
    }

    #[test]
    fn occlusion() {
        let bottom = {
            let mut s = Surface::new(Rect::new(0, 0, 4, 1));
            s.fill(Rect::new(0, 0, 4, 1), 'b');
            s
        };
        let top = {
            let mut s = Surface::new(Rect::new(2, 0, 2, 1));
            s.fill(Rect::new(0, 0, 2, 1), 't');
            s
        };
        let grid = composite(Size::new(4, 1), [&bottom, &top].into_iter());
        let row: String = grid.iter().map(|c| c.ch).collect();
        assert_eq!(row, "bbtt");
    }
}
