//! A single-line text input.
//!
//! The value is kept as codepoints so caret arithmetic never lands inside a
//! UTF-8 sequence. A window of `width` codepoints scrolls to keep the caret
//! visible; the terminal cursor is parked on the caret cell.

use crate::{
    Result,
    cursor::{Cursor, CursorShape},
    event::{ButtonSet, Event, Key},
    geom::{Point, Size},
    render::Draw,
    traverse::Ctx,
    tree::{ViewId, ViewState, Widget},
};

/// What the field wants done with focus, surfaced when the user tabs away,
/// commits or cancels. The owner decides what the request means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRequest {
    Next,
    Prev,
    Commit,
    Cancel,
}

pub type FocusHandler = Box<dyn FnMut(&mut Ctx, FocusRequest) -> Result<()>>;

pub struct TextField {
    value: Vec<char>,
    /// Caret position as a codepoint index, 0..=value.len().
    caret: usize,
    /// First visible codepoint.
    left: usize,
    /// Visible width in cells, refreshed from the node size at draw time.
    width: usize,
    on_focus: Option<FocusHandler>,
}

impl TextField {
    pub fn new(value: &str) -> TextField {
        let value: Vec<char> = value.chars().collect();
        TextField {
            caret: value.len(),
            left: 0,
            width: 0,
            value,
            on_focus: None,
        }
    }

    pub fn with_focus_handler(mut self, h: FocusHandler) -> TextField {
        self.on_focus = Some(h);
        self
    }

    pub fn value(&self) -> String {
        self.value.iter().collect()
    }

    pub fn set_value(&mut self, v: &str) {
        self.value = v.chars().collect();
        self.caret = self.value.len();
        self.left = 0;
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Scroll the window so the caret cell is visible. The caret may sit one
    /// past the last codepoint, so the window is one cell wider than the
    /// visible text.
    fn fix_window(&mut self) {
        if self.width == 0 {
            return;
        }
        if self.caret < self.left {
            self.left = self.caret;
        } else if self.caret >= self.left + self.width {
            self.left = self.caret + 1 - self.width;
        }
    }

    fn edit(&mut self, key: Key) -> bool {
        match key {
            Key::Char(c) => {
                self.value.insert(self.caret, c);
                self.caret += 1;
            }
            Key::Backspace => {
                if self.caret == 0 {
                    return false;
                }
                self.caret -= 1;
                self.value.remove(self.caret);
            }
            Key::Delete => {
                if self.caret >= self.value.len() {
                    return false;
                }
                self.value.remove(self.caret);
            }
            Key::Left => {
                if self.caret == 0 {
                    return false;
                }
                self.caret -= 1;
            }
            Key::Right => {
                if self.caret >= self.value.len() {
                    return false;
                }
                self.caret += 1;
            }
            _ => return false,
        }
        self.fix_window();
        true
    }

    fn focus_request(key: Key) -> Option<FocusRequest> {
        match key {
            Key::Tab => Some(FocusRequest::Next),
            Key::BackTab => Some(FocusRequest::Prev),
            Key::Return => Some(FocusRequest::Commit),
            Key::Escape => Some(FocusRequest::Cancel),
            _ => None,
        }
    }
}

impl Widget for TextField {
    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        self.width = view.size().x.max(0) as usize;
        self.fix_window();
        let end = (self.left + self.width).min(self.value.len());
        let mut visible: String = self.value[self.left..end].iter().collect();
        while visible.chars().count() < self.width {
            visible.push(' ');
        }
        d.text(d.palette.normal, Point::zero(), &visible)
    }

    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        if !ctx.tree.state(id).enabled() {
            return Ok(false);
        }
        if let Some(key) = ev.key() {
            if let Some(req) = Self::focus_request(key) {
                if let Some(mut h) = self.on_focus.take() {
                    let r = h(ctx, req);
                    self.on_focus = Some(h);
                    r?;
                    return Ok(true);
                }
                return Ok(false);
            }
            if self.edit(key) {
                ctx.tree.state_mut(id).taint();
                return Ok(true);
            }
            return Ok(matches!(
                key,
                Key::Char(_) | Key::Backspace | Key::Delete | Key::Left | Key::Right
            ));
        }
        if ev.mouse_down(ButtonSet::LEFT) {
            let (p, _) = ev.mouse().expect("mouse event");
            if ctx.tree.state(id).hit(p) {
                self.caret = (self.left + p.x.max(0) as usize).min(self.value.len());
                self.fix_window();
                ctx.tree.state_mut(id).taint();
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn size_intrinsic(&mut self, target: Size) -> Size {
        Size::new(target.x, 1)
    }

    fn cursor(&self) -> Option<Cursor> {
        Some(Cursor {
            location: Point::new((self.caret - self.left) as i32, 0),
            shape: CursorShape::Block,
            blink: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret_cell(f: &TextField) -> i32 {
        f.cursor().unwrap().location.x
    }

    #[test]
    fn editing_is_codepoint_wise() {
        let mut f = TextField::new("héllo");
        assert_eq!(f.caret(), 5);
        f.edit(Key::Backspace);
        assert_eq!(f.value(), "héll");
        f.edit(Key::Left);
        f.edit(Key::Left);
        f.edit(Key::Left);
        f.edit(Key::Delete);
        assert_eq!(f.value(), "hll");
        f.edit(Key::Char('é'));
        assert_eq!(f.value(), "héll");
        assert_eq!(f.caret(), 2);
    }

    #[test]
    fn window_follows_caret() {
        let mut f = TextField::new("abcdefghij");
        f.width = 4;
        f.fix_window();
        // Caret is at the end; window shows the tail plus the caret cell.
        assert_eq!(f.left, 7);
        assert_eq!(caret_cell(&f), 3);

        for _ in 0..10 {
            f.edit(Key::Left);
        }
        assert_eq!(f.left, 0);
        assert_eq!(caret_cell(&f), 0);

        for _ in 0..5 {
            f.edit(Key::Right);
        }
        assert_eq!(caret_cell(&f), 3);
    }

    #[test]
    fn backspace_at_start_is_inert() {
        let mut f = TextField::new("");
        assert!(!f.edit(Key::Backspace));
        assert!(!f.edit(Key::Delete));
        assert!(!f.edit(Key::Left));
        assert_eq!(f.caret(), 0);
    }
}
