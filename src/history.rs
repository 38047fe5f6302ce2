//! Linear undo history over value snapshots.
//!
//! The model is a plain vector of states with a position: undo and redo walk
//! it, and a push while rewound truncates the redo tail. No deltas, no
//! merging; snapshots are cheap enough to clone for the data sizes involved.

/// A linear history of snapshots of `T`. There is always a current value.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    snapshots: Vec<T>,
    pos: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> History<T> {
        History {
            snapshots: vec![initial],
            pos: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.snapshots[self.pos]
    }

    /// Replace the current snapshot in place, without creating an undo step.
    pub fn set_current(&mut self, v: T) {
        self.snapshots[self.pos] = v;
    }

    /// Record a new state. Anything past the current position is discarded:
    /// history is linear, not a tree.
    pub fn push(&mut self, v: T) {
        self.snapshots.truncate(self.pos + 1);
        self.snapshots.push(v);
        self.pos += 1;
    }

    pub fn can_undo(&self) -> bool {
        self.pos > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pos + 1 < self.snapshots.len()
    }

    /// Step back, returning the new current value. `None` at the beginning.
    pub fn undo(&mut self) -> Option<&T> {
        if self.pos == 0 {
            return None;
        }
        self.pos -= 1;
        Some(&self.snapshots[self.pos])
    }

    /// Step forward, returning the new current value. `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.pos += 1;
        Some(&self.snapshots[self.pos])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk() {
        let mut h = History::new(0);
        h.push(1);
        h.push(2);
        assert_eq!(*h.current(), 2);
        assert_eq!(h.undo(), Some(&1));
        assert_eq!(h.undo(), Some(&0));
        assert_eq!(h.undo(), None);
        assert_eq!(h.redo(), Some(&1));
        assert_eq!(h.redo(), Some(&2));
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn push_truncates_redo() {
        let mut h = History::new("a");
        h.push("b");
        h.push("c");
        h.undo();
        assert_eq!(*h.current(), "b");
        assert!(h.can_redo());
        h.push("d");
        assert_eq!(*h.current(), "d");
        assert!(!h.can_redo());
        assert_eq!(h.undo(), Some(&"b"));
    }

    #[test]
    fn set_current_is_not_a_step() {
        let mut h = History::new(10);
        h.set_current(20);
        assert_eq!(*h.current(), 20);
        assert!(!h.can_undo());
    }
}
