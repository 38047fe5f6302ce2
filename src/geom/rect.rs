use super::{Point, Size};

/// A rectangle described by its top-left origin and size.
///
/// The type deliberately does not enforce non-negative sizes: subtraction and
/// `inset` can drive a component negative, and clamping here would break the
/// inset involution (`r.inset(s).inset(-s) == r`). A rect with a negative or
/// zero size component is degenerate: it has zero area, contains no points,
/// and intersects nothing. Call sites that hand sizes to the backend clamp
/// explicitly with `Size::max_zero`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(w, h),
        }
    }

    pub fn xmin(&self) -> i32 {
        self.origin.x
    }

    /// One past the rightmost column.
    pub fn xmax(&self) -> i32 {
        self.origin.x + self.size.x
    }

    pub fn ymin(&self) -> i32 {
        self.origin.y
    }

    /// One past the bottom row.
    pub fn ymax(&self) -> i32 {
        self.origin.y + self.size.y
    }

    pub fn top_left(&self) -> Point {
        self.origin
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.xmax(), self.ymin())
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.xmin(), self.ymax())
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.xmax(), self.ymax())
    }

    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.size.x as i64 * self.size.y as i64
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    /// Shrink the rect by `s` on every side. Negative components grow it.
    /// The result may be degenerate.
    pub fn inset(&self, s: Size) -> Rect {
        Rect {
            origin: self.origin + s,
            size: self.size - s - s,
        }
    }

    /// The overlapping region of two rects. Commutative; disjoint inputs
    /// produce a rect with zero area.
    pub fn intersect(&self, other: Rect) -> Rect {
        let x0 = self.xmin().max(other.xmin());
        let y0 = self.ymin().max(other.ymin());
        let x1 = self.xmax().min(other.xmax());
        let y1 = self.ymax().min(other.ymax());
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    /// Does the point fall within the rect? Half-open on the max edges.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.xmin() && p.x < self.xmax() && p.y >= self.ymin() && p.y < self.ymax()
    }

    /// Hit test with a margin: the rect is grown by `expand` on every side
    /// before the containment check.
    pub fn hit_test(&self, p: Point, expand: Size) -> bool {
        self.inset(-expand).contains(p)
    }

    /// Rebase a screen-space point to be relative to our origin. The point
    /// need not fall within the rect.
    pub fn rebase(&self, p: Point) -> Point {
        p - self.origin
    }

    /// The same rect moved to a new origin.
    pub fn at(&self, origin: Point) -> Rect {
        Rect {
            origin,
            size: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners() {
        let r = Rect::new(2, 3, 4, 5);
        assert_eq!(r.xmin(), 2);
        assert_eq!(r.xmax(), 6);
        assert_eq!(r.ymin(), 3);
        assert_eq!(r.ymax(), 8);
        assert_eq!(r.top_right(), Point::new(6, 3));
        assert_eq!(r.bottom_left(), Point::new(2, 8));
    }

    #[test]
    fn intersect_commutes() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersect(b), b.intersect(a));
        assert_eq!(a.intersect(b), Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn intersect_disjoint() {
        let a = Rect::new(0, 0, 4, 4);
        let b = Rect::new(10, 10, 4, 4);
        assert_eq!(a.intersect(b).area(), 0);
        assert_eq!(b.intersect(a).area(), 0);
    }

    #[test]
    fn inset_involution() {
        let r = Rect::new(3, 7, 10, 12);
        let s = Size::new(2, 3);
        assert_eq!(r.inset(s).inset(-s), r);
        // Holds even when the inner rect is degenerate.
        let s = Size::new(8, 9);
        assert_eq!(r.inset(s).inset(-s), r);
    }

    #[test]
    fn hit_test_expand() {
        let r = Rect::new(5, 5, 4, 4);
        let just_outside = Point::new(4, 5);
        assert!(!r.hit_test(just_outside, Size::zero()));
        assert!(r.hit_test(just_outside, Size::new(1, 1)));
        assert!(!r.contains(just_outside));
        assert!(r.contains(Point::new(5, 5)));
        assert!(!r.contains(Point::new(9, 9)));
    }

    #[test]
    fn degenerate_contains_nothing() {
        let r = Rect::new(5, 5, 0, 3);
        assert!(r.is_empty());
        assert!(!r.contains(Point::new(5, 5)));
        let r = Rect::new(5, 5, -2, 3);
        assert!(r.is_empty());
        assert_eq!(r.area(), 0);
    }
}
