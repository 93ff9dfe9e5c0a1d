//! Cursor — a logical position with movement primitives.
//!
//! The cursor is a plain `(row, col)` pair in logical coordinates. It does
//! not own or reference the document; the document is passed to each
//! movement method. The visual column is never stored: it is derived from
//! the row's bytes whenever it is needed, so edits cannot leave it stale.
//!
//! `row == doc.len()` is a valid position (the empty line past the end,
//! where typing starts a new row). Its column is always 0.

use crate::document::Document;

/// Direction of a single arrow-key step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// A position in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cursor {
    pub row: usize,
    /// Logical column (byte index into the row).
    pub col: usize,
}

impl Cursor {
    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Visual column of the cursor on its row.
    #[must_use]
    pub fn visual_col(&self, doc: &Document) -> usize {
        doc.row(self.row)
            .map_or(0, |row| row.visual_col(self.col, doc.tab_stop()))
    }

    /// Take one step and clamp the column to the new row.
    ///
    /// Left at the start of a row wraps to the end of the previous one;
    /// right at the end wraps to the start of the next. Vertical steps keep
    /// the visual column where the target row allows it, so moving through
    /// tab-indented rows stays in the same screen column.
    pub fn step(&mut self, dir: Direction, doc: &Document) {
        match dir {
            Direction::Left => self.move_left(doc),
            Direction::Right => self.move_right(doc),
            Direction::Up => self.move_up(1, doc),
            Direction::Down => self.move_down(1, doc),
        }
    }

    pub fn move_left(&mut self, doc: &Document) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = doc.row_len(self.row);
        }
        self.clamp(doc);
    }

    pub fn move_right(&mut self, doc: &Document) {
        let Some(row) = doc.row(self.row) else {
            return;
        };
        if self.col < row.len() {
            self.col += 1;
        } else {
            self.row += 1;
            self.col = 0;
        }
    }

    /// Move up `count` rows, stopping at row 0.
    pub fn move_up(&mut self, count: usize, doc: &Document) {
        self.move_vertical(self.row.saturating_sub(count), doc);
    }

    /// Move down `count` rows, stopping at the past-last-row position.
    pub fn move_down(&mut self, count: usize, doc: &Document) {
        self.move_vertical(self.row.saturating_add(count).min(doc.len()), doc);
    }

    fn move_vertical(&mut self, target: usize, doc: &Document) {
        if target == self.row {
            return;
        }
        let rx = self.visual_col(doc);
        self.row = target;
        self.col = doc
            .row(target)
            .map_or(0, |row| row.logical_col(rx, doc.tab_stop()));
    }

    /// Start of the row.
    pub const fn move_home(&mut self) {
        self.col = 0;
    }

    /// End of the row.
    pub fn move_end(&mut self, doc: &Document) {
        self.col = doc.row_len(self.row);
    }

    /// Pull the cursor back inside the document.
    pub fn clamp(&mut self, doc: &Document) {
        *self = doc.clamp(*self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc(text: &str) -> Document {
        Document::from_bytes(text.as_bytes(), 4)
    }

    #[test]
    fn left_wraps_to_previous_row_end() {
        let d = doc("abc\nde");
        let mut c = Cursor::new(1, 0);
        c.move_left(&d);
        assert_eq!(c, Cursor::new(0, 3));
    }

    #[test]
    fn left_at_origin_stays() {
        let d = doc("abc");
        let mut c = Cursor::new(0, 0);
        c.move_left(&d);
        assert_eq!(c, Cursor::new(0, 0));
    }

    #[test]
    fn right_wraps_to_next_row_start() {
        let d = doc("ab\ncd");
        let mut c = Cursor::new(0, 2);
        c.move_right(&d);
        assert_eq!(c, Cursor::new(1, 0));
    }

    #[test]
    fn right_reaches_past_last_row_then_stops() {
        let d = doc("a");
        let mut c = Cursor::new(0, 1);
        c.move_right(&d);
        assert_eq!(c, Cursor::new(1, 0));
        c.move_right(&d);
        assert_eq!(c, Cursor::new(1, 0));
    }

    #[test]
    fn vertical_is_bounded() {
        let d = doc("a\nb");
        let mut c = Cursor::new(0, 0);
        c.move_up(1, &d);
        assert_eq!(c.row, 0);
        c.move_down(10, &d);
        assert_eq!(c, Cursor::new(2, 0));
    }

    #[test]
    fn vertical_clamps_column_to_shorter_row() {
        let d = doc("abcdef\nab");
        let mut c = Cursor::new(0, 5);
        c.step(Direction::Down, &d);
        assert_eq!(c, Cursor::new(1, 2));
    }

    #[test]
    fn vertical_keeps_visual_column_across_tabs() {
        let d = doc("\tx\nabcdx");
        let mut c = Cursor::new(0, 1);
        assert_eq!(c.visual_col(&d), 4);
        c.step(Direction::Down, &d);
        assert_eq!(c, Cursor::new(1, 4));
        c.step(Direction::Up, &d);
        assert_eq!(c, Cursor::new(0, 1));
    }

    #[test]
    fn home_and_end() {
        let d = doc("hello");
        let mut c = Cursor::new(0, 2);
        c.move_end(&d);
        assert_eq!(c.col, 5);
        c.move_home();
        assert_eq!(c.col, 0);
    }

    #[test]
    fn end_on_past_last_row_is_zero() {
        let d = doc("hello");
        let mut c = Cursor::new(1, 0);
        c.move_end(&d);
        assert_eq!(c.col, 0);
    }

    #[test]
    fn clamp_pulls_inside() {
        let d = doc("ab");
        let mut c = Cursor::new(7, 9);
        c.clamp(&d);
        assert_eq!(c, Cursor::new(1, 0));
    }

    #[test]
    fn visual_col_on_past_last_row() {
        let d = doc("\t");
        assert_eq!(Cursor::new(1, 0).visual_col(&d), 0);
    }
}
