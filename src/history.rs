//! Linear snapshot history backing undo/redo.
//!
//! Every state change pushes a full snapshot after the cursor. Pushing after an
//! undo discards the forward branch, so the history is always a single line.

/// Default number of snapshots kept before the oldest are dropped.
pub const DEFAULT_LIMIT: usize = 100;

/// Ordered snapshots plus a cursor into them.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    /// `None` until the first push.
    cursor: Option<usize>,
    /// Maximum number of snapshots, `None` for unbounded.
    limit: Option<usize>,
}

impl<T: Clone> History<T> {
    /// Creates an empty history. A limit of `Some(0)` is treated as unbounded.
    pub fn new(limit: Option<usize>) -> Self {
        History {
            snapshots: Vec::new(),
            cursor: None,
            limit: limit.filter(|l| *l > 0),
        }
    }

    /// Records `snapshot` right after the cursor and moves the cursor onto it.
    ///
    /// Anything beyond the cursor is dropped first. When the limit is exceeded
    /// the oldest snapshot goes and the cursor shifts with it.
    pub fn push(&mut self, snapshot: T) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);

        if let Some(limit) = self.limit {
            if self.snapshots.len() > limit {
                let excess = self.snapshots.len() - limit;
                self.snapshots.drain(..excess);
            }
        }
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Steps back one snapshot and returns it. No-op at position 0.
    pub fn undo(&mut self) -> Option<&T> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.snapshots.get(c - 1)
            }
            _ => None,
        }
    }

    /// Steps forward one snapshot and returns it. No-op at the newest snapshot.
    pub fn redo(&mut self) -> Option<&T> {
        match self.cursor {
            Some(c) if c + 1 < self.snapshots.len() => {
                self.cursor = Some(c + 1);
                self.snapshots.get(c + 1)
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.snapshots.len())
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|c| self.snapshots.get(c))
    }

    /// Cursor position, `None` while empty.
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = None;
    }
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        History::new(Some(DEFAULT_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_ignores_undo_and_redo() {
        let mut h: History<u32> = History::new(None);
        assert_eq!(h.position(), None);
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        assert!(h.current().is_none());
    }

    #[test]
    fn push_after_undo_discards_forward_branch() {
        let mut h = History::new(None);
        h.push(1);
        h.push(2);
        h.push(3);
        assert_eq!(h.undo(), Some(&2));
        assert_eq!(h.undo(), Some(&1));
        h.push(4);
        assert_eq!(h.len(), 2);
        assert!(!h.can_redo());
        assert!(h.redo().is_none());
        assert_eq!(h.current(), Some(&4));
    }

    #[test]
    fn limit_drops_oldest_snapshots() {
        let mut h = History::new(Some(3));
        for i in 0..5 {
            h.push(i);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.position(), Some(2));
        assert_eq!(h.undo(), Some(&3));
        assert_eq!(h.undo(), Some(&2));
        assert!(h.undo().is_none());
    }

    #[test]
    fn zero_limit_is_unbounded() {
        let mut h = History::new(Some(0));
        for i in 0..250 {
            h.push(i);
        }
        assert_eq!(h.limit(), None);
        assert_eq!(h.len(), 250);
    }
}
