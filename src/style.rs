//! Colors, the semantic palette, and rendering attributes.

pub use crossterm::style::Color as TermColor;

use crate::{Result, backend::Backend};

/// An opaque handle to a foreground/background pair registered with the
/// terminal backend. Cheap to copy; the palette owns the registration
/// lifetime.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Color(pub(crate) u16);

/// A rendering attribute that can be switched on for a scoped region of
/// drawing.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Attr {
    Color(Color),
    Bold,
    Underline,
}

/// Which concrete colors the palette registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Auto,
    Dark,
    Light,
}

/// The fixed set of semantic color roles, registered once at screen
/// construction, plus an escape hatch for custom pairs.
#[derive(Debug, Clone)]
pub struct Palette {
    pub normal: Color,
    pub dimmed: Color,
    pub selection: Color,
    pub selection_similar: Color,
    pub selection_copy: Color,
    pub menu: Color,
    pub error: Color,
}

impl Palette {
    /// Register the role pairs with the backend. Registration failure is
    /// fatal: the UI cannot run without its palette.
    pub fn new(backend: &mut dyn Backend, theme: Theme) -> Result<Palette> {
        let dark = match theme {
            Theme::Dark => true,
            Theme::Light => false,
            // Without a terminal hint we assume a dark background, which is
            // what every terminal we target defaults to.
            Theme::Auto => true,
        };
        let (fg, bg) = if dark {
            (TermColor::White, TermColor::Reset)
        } else {
            (TermColor::Black, TermColor::Reset)
        };
        Ok(Palette {
            normal: backend.register_color(fg, bg)?,
            dimmed: backend.register_color(TermColor::DarkGrey, bg)?,
            selection: backend.register_color(TermColor::Black, TermColor::Yellow)?,
            selection_similar: backend.register_color(TermColor::Black, TermColor::DarkYellow)?,
            selection_copy: backend.register_color(TermColor::Black, TermColor::Green)?,
            menu: backend.register_color(TermColor::Black, TermColor::Cyan)?,
            error: backend.register_color(TermColor::White, TermColor::DarkRed)?,
        })
    }

    /// Register a custom pair outside the fixed roles.
    pub fn add(&self, backend: &mut dyn Backend, fg: TermColor, bg: TermColor) -> Result<Color> {
        backend.register_color(fg, bg)
    }
}
