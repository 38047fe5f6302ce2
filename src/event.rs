//! The input event model.
//!
//! Events are immutable values sourced by
//! [`Screen::event_next`](crate::screen::Screen::event_next) between frames.
//! The zero value is the "no event" sentinel returned when a wait times out.

use std::ops::BitOr;

use crossterm::event as cevent;

use crate::geom::{Point, Size};

/// A set of mouse buttons, composable with `|`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const NONE: ButtonSet = ButtonSet(0);
    pub const LEFT: ButtonSet = ButtonSet(1);
    pub const RIGHT: ButtonSet = ButtonSet(2);

    pub fn contains(&self, other: ButtonSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ButtonSet {
    type Output = ButtonSet;

    fn bitor(self, other: ButtonSet) -> ButtonSet {
        ButtonSet(self.0 | other.0)
    }
}

/// The button transitions carried by one mouse event: which buttons went
/// down, and which came up.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub pressed: ButtonSet,
    pub released: ButtonSet,
}

/// Key presses we recognise. Everything else decodes to no event.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Left,
    Right,
    Up,
    Down,
    Tab,
    BackTab,
    Escape,
    Return,
    CtrlC,
    CtrlD,
    Char(char),
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub enum EventKind {
    /// The falsy sentinel.
    #[default]
    None,
    Mouse {
        /// Screen-space location of the pointer.
        origin: Point,
        state: ButtonState,
    },
    Resize(Size),
    Key(Key),
}

/// An input event. `id` is strictly increasing per screen, so a tracking
/// loop can tell whether anything newer has been sourced since.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Event {
    pub id: u64,
    pub kind: EventKind,
}

impl Event {
    pub fn none() -> Event {
        Event::default()
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind, EventKind::None)
    }

    pub fn mouse(&self) -> Option<(Point, ButtonState)> {
        match self.kind {
            EventKind::Mouse { origin, state } => Some((origin, state)),
            _ => None,
        }
    }

    /// Did any button in `set` transition to pressed in this event?
    pub fn mouse_down(&self, set: ButtonSet) -> bool {
        match self.kind {
            EventKind::Mouse { state, .. } => state.pressed.contains(set),
            _ => false,
        }
    }

    /// Did any button in `set` transition to released in this event?
    pub fn mouse_up(&self, set: ButtonSet) -> bool {
        match self.kind {
            EventKind::Mouse { state, .. } => state.released.contains(set),
            _ => false,
        }
    }

    pub fn key(&self) -> Option<Key> {
        match self.kind {
            EventKind::Key(k) => Some(k),
            _ => None,
        }
    }

    /// The same event with its mouse location shifted into another coordinate
    /// space. Non-mouse events pass through unchanged.
    pub fn rebase(&self, offset: Point) -> Event {
        match self.kind {
            EventKind::Mouse { origin, state } => Event {
                id: self.id,
                kind: EventKind::Mouse {
                    origin: origin - offset,
                    state,
                },
            },
            _ => *self,
        }
    }
}

/// Decode a raw crossterm event. Returns `None` for input we ignore, which
/// the sourcing loop treats as "no event yet".
pub(crate) fn decode(e: cevent::Event) -> Option<EventKind> {
    match e {
        cevent::Event::Key(k) => decode_key(k).map(EventKind::Key),
        cevent::Event::Mouse(m) => decode_mouse(m),
        cevent::Event::Resize(w, h) => Some(EventKind::Resize(Size::new(w as i32, h as i32))),
        _ => None,
    }
}

fn decode_key(k: cevent::KeyEvent) -> Option<Key> {
    use cevent::{KeyCode, KeyModifiers};
    if k.kind == cevent::KeyEventKind::Release {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) {
        return match k.code {
            KeyCode::Char('c') => Some(Key::CtrlC),
            KeyCode::Char('d') => Some(Key::CtrlD),
            _ => None,
        };
    }
    match k.code {
        KeyCode::Delete => Some(Key::Delete),
        KeyCode::Backspace => Some(Key::Backspace),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Tab => Some(Key::Tab),
        KeyCode::BackTab => Some(Key::BackTab),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Enter => Some(Key::Return),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

fn decode_mouse(m: cevent::MouseEvent) -> Option<EventKind> {
    let button = |b: cevent::MouseButton| match b {
        cevent::MouseButton::Left => ButtonSet::LEFT,
        cevent::MouseButton::Right => ButtonSet::RIGHT,
        cevent::MouseButton::Middle => ButtonSet::NONE,
    };
    let state = match m.kind {
        cevent::MouseEventKind::Down(b) => ButtonState {
            pressed: button(b),
            released: ButtonSet::NONE,
        },
        cevent::MouseEventKind::Up(b) => ButtonState {
            pressed: ButtonSet::NONE,
            released: button(b),
        },
        _ => return None,
    };
    Some(EventKind::Mouse {
        origin: Point::new(m.column as i32, m.row as i32),
        state,
    })
}
