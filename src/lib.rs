//! A retained-mode terminal UI for looking at and reworking git history.
//!
//! The core is a tree of views held in a generational arena. Views are
//! positioned in a layout pass, painted in a draw pass, and receive input in
//! a dispatch pass; all three thread an explicit [`GraphicsState`] rather
//! than relying on ambient globals. Views that own a backend surface are
//! windows; windows that take part in the screen-global z-order are panels.
//! Dirty flags keep all three passes incremental: nothing is re-laid-out or
//! repainted unless something actually changed.
//!
//! [`Screen`] ties it together: one call renders a frame and blocks for the
//! next input event. On top of the core sit general widgets (labels,
//! buttons, text fields, menus, alerts) and the git-facing views (commit
//! cards, revision and branch columns), which talk to a repository only
//! through the narrow [`git::Repo`] trait.

pub mod backend;
pub mod cursor;
mod error;
pub mod event;
pub mod geom;
pub mod git;
pub mod history;
pub mod render;
mod runloop;
pub mod screen;
pub mod style;
pub mod traverse;
pub mod tree;
pub mod tutils;
pub mod views;
pub mod widgets;

pub use error::{Error, Result};
pub use runloop::runloop;
pub use screen::{Deadline, Screen};
pub use traverse::{Ctx, GraphicsState};
pub use tree::{Tree, ViewId, ViewState, Widget};
