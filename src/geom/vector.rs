use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A 2D integer vector. Plain value type with no identity; used for both
/// positions and sizes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

/// A position in cell coordinates.
pub type Point = Vector;

/// An extent in cells. Components may go negative through subtraction; see
/// `Rect` for the consequences.
pub type Size = Vector;

impl Vector {
    pub const fn new(x: i32, y: i32) -> Self {
        Vector { x, y }
    }

    pub const fn zero() -> Self {
        Vector { x: 0, y: 0 }
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Clamp both components to be non-negative.
    pub fn max_zero(&self) -> Self {
        Vector {
            x: self.x.max(0),
            y: self.y.max(0),
        }
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, other: Vector) -> Vector {
        Vector {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, other: Vector) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, other: Vector) -> Vector {
        Vector {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, other: Vector) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl From<(i32, i32)> for Vector {
    fn from(v: (i32, i32)) -> Self {
        Vector { x: v.0, y: v.1 }
    }
}
