//! Integer geometry primitives for the view tree.

mod rect;
mod vector;

pub use rect::Rect;
pub use vector::{Point, Size, Vector};
