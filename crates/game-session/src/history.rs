//! Read-only cursor into the move log for reviewing earlier positions.
//!
//! The cursor never touches the game itself; it is just an index that the
//! session resolves against the immutable move log by replay. Index -1 views
//! the starting position, index `i >= 0` views the position after move `i`.
//! The session owns the rule that the cursor never reaches the live tip;
//! stepping there discards the cursor instead.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryCursor {
    index: isize,
}

impl HistoryCursor {
    pub fn at(index: isize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> isize {
        self.index
    }

    /// Number of moves replayed to reach the viewed position.
    pub fn ply(&self) -> usize {
        (self.index + 1) as usize
    }

    pub fn step_back(&mut self) {
        if self.index > -1 {
            self.index -= 1;
        }
    }

    pub fn step_forward(&mut self) {
        self.index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_floors_at_start() {
        let mut cursor = HistoryCursor::at(0);
        assert_eq!(cursor.ply(), 1);
        cursor.step_back();
        assert_eq!(cursor.index(), -1);
        assert_eq!(cursor.ply(), 0);
        cursor.step_back();
        assert_eq!(cursor.index(), -1);
    }

    #[test]
    fn test_step_forward_advances() {
        let mut cursor = HistoryCursor::at(-1);
        cursor.step_forward();
        cursor.step_forward();
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.ply(), 2);
    }
}
