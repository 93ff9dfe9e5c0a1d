//! Render projection — logical bytes to visual columns.
//!
//! A row's `chars` are what the file contains; its `render` is what the
//! screen shows. The only difference is tab expansion: a tab advances the
//! visual column to the next multiple of the tab stop. Every other byte is
//! one column wide (the editor is byte-oriented, so no Unicode widths).
//!
//! The two column mappings here are the single source of truth for cursor
//! placement. The cursor stores only a logical column; the visual column is
//! recomputed on demand, so an edit can never leave the two out of step.

/// Tab stop used when none is configured.
pub const DEFAULT_TAB_STOP: usize = 4;

/// Visual column reached after emitting `byte` starting at `rx`.
#[inline]
const fn advance(rx: usize, byte: u8, tab_stop: usize) -> usize {
    if byte == b'\t' {
        (rx / tab_stop + 1) * tab_stop
    } else {
        rx + 1
    }
}

/// Build the rendered form of `chars`: every tab becomes one to
/// `tab_stop` spaces, ending on the next tab stop.
#[must_use]
pub fn expand_tabs(chars: &[u8], tab_stop: usize) -> Vec<u8> {
    let tab_stop = tab_stop.max(1);
    let tabs = chars.iter().filter(|&&b| b == b'\t').count();
    let mut render = Vec::with_capacity(chars.len() + tabs * (tab_stop - 1));

    for &byte in chars {
        if byte == b'\t' {
            render.push(b' ');
            while render.len() % tab_stop != 0 {
                render.push(b' ');
            }
        } else {
            render.push(byte);
        }
    }

    render
}

/// Map a logical column to its visual column.
///
/// `col` past the end of the row clamps to the row length.
#[must_use]
pub fn logical_to_visual(chars: &[u8], col: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    chars
        .iter()
        .take(col)
        .fold(0, |rx, &byte| advance(rx, byte, tab_stop))
}

/// Map a visual column back to a logical column.
///
/// Returns the first logical column whose expansion reaches past `rx`. A
/// visual column in the middle of a tab resolves to that tab. Anything past
/// the rendered width clamps to the row length, which is what vertical
/// movement onto a shorter row needs.
#[must_use]
pub fn visual_to_logical(chars: &[u8], rx: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    let mut cur = 0;
    for (cx, &byte) in chars.iter().enumerate() {
        cur = advance(cur, byte, tab_stop);
        if cur > rx {
            return cx;
        }
    }
    chars.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expand_no_tabs_is_identity() {
        assert_eq!(expand_tabs(b"hello", 4), b"hello");
    }

    #[test]
    fn expand_leading_tab() {
        assert_eq!(expand_tabs(b"\tx", 4), b"    x");
    }

    #[test]
    fn expand_mid_cell_tab() {
        // "ab" occupies columns 0-1; the tab fills 2-3.
        assert_eq!(expand_tabs(b"ab\tc", 4), b"ab  c");
    }

    #[test]
    fn expand_tab_on_boundary_is_full_width() {
        assert_eq!(expand_tabs(b"abcd\te", 4), b"abcd    e");
    }

    #[test]
    fn expand_respects_tab_stop() {
        assert_eq!(expand_tabs(b"\t", 8), b"        ");
        assert_eq!(expand_tabs(b"a\t", 2), b"a ");
    }

    #[test]
    fn zero_tab_stop_behaves_as_one() {
        assert_eq!(expand_tabs(b"a\tb", 0), b"a b");
        assert_eq!(logical_to_visual(b"a\tb", 3, 0), 3);
    }

    #[test]
    fn to_visual_plain() {
        assert_eq!(logical_to_visual(b"hello", 3, 4), 3);
    }

    #[test]
    fn to_visual_after_tab() {
        assert_eq!(logical_to_visual(b"\tx", 1, 4), 4);
        assert_eq!(logical_to_visual(b"\tx", 2, 4), 5);
        assert_eq!(logical_to_visual(b"ab\tc", 3, 4), 4);
    }

    #[test]
    fn to_visual_clamps_past_end() {
        assert_eq!(logical_to_visual(b"ab", 10, 4), 2);
    }

    #[test]
    fn to_logical_plain() {
        assert_eq!(visual_to_logical(b"hello", 2, 4), 2);
    }

    #[test]
    fn to_logical_inside_tab_resolves_to_tab() {
        for rx in 0..4 {
            assert_eq!(visual_to_logical(b"\tx", rx, 4), 0, "rx={rx}");
        }
        assert_eq!(visual_to_logical(b"\tx", 4, 4), 1);
    }

    #[test]
    fn to_logical_clamps_past_render() {
        assert_eq!(visual_to_logical(b"\tx", 40, 4), 2);
        assert_eq!(visual_to_logical(b"", 3, 4), 0);
    }

    #[test]
    fn render_width_matches_visual_end() {
        let chars = b"a\tbc\t\td";
        assert_eq!(
            expand_tabs(chars, 4).len(),
            logical_to_visual(chars, chars.len(), 4)
        );
    }
}
