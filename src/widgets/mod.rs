//! General-purpose composite widgets.

pub mod alert;
pub mod button;
pub mod field;
pub mod label;
pub mod menu;

pub use alert::Alert;
pub use button::{Button, Trigger};
pub use field::{FocusRequest, TextField};
pub use label::Label;
pub use menu::{Menu, MenuItem};
