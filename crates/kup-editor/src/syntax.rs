//! Table-driven syntax highlighting.
//!
//! Each row is classified in one left-to-right pass over its rendered bytes,
//! producing one [`Highlight`] per byte. The pass is driven by a static
//! [`Language`] definition: comment markers, a keyword list, and flags that
//! switch number and string highlighting on.
//!
//! # Cross-row state
//!
//! Block comments can span rows. The pass takes the previous row's
//! "comment still open" flag as input and returns its own. The
//! [`Document`](crate::document::Document) owns the propagation: after a
//! row is reclassified, the next row is reclassified only while the state
//! flowing into it differs from the state it was last classified with.
//!
//! # Keyword classes
//!
//! One flat keyword list encodes two classes. Entries ending in `|` are
//! type-like words ([`Highlight::KeywordPrimary`]); all other entries are
//! control-flow words ([`Highlight::KeywordSecondary`]). The `|` is not part
//! of the matched text.

use std::ffi::OsStr;
use std::path::Path;

use bitflags::bitflags;

// ---------------------------------------------------------------------------
// Highlight classes
// ---------------------------------------------------------------------------

/// Semantic class of one rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Normal,
    /// Line comment, from the marker to the end of the row.
    Comment,
    /// Block comment, including both markers.
    BlockComment,
    /// Type-like keyword (`int`, `char`, ...).
    KeywordPrimary,
    /// Control-flow keyword (`if`, `return`, ...).
    KeywordSecondary,
    String,
    Number,
    /// Search match overlay. Never produced by classification.
    Match,
}

impl Highlight {
    /// True for both comment kinds.
    #[inline]
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::Comment | Self::BlockComment)
    }

    /// Basic ANSI color index (0–7) for this class, `None` for the
    /// terminal's default foreground.
    #[must_use]
    pub const fn color(self) -> Option<u8> {
        match self {
            Self::Normal => None,
            Self::Number => Some(1),
            Self::KeywordPrimary => Some(2),
            Self::KeywordSecondary => Some(3),
            Self::Match => Some(4),
            Self::String => Some(5),
            Self::Comment | Self::BlockComment => Some(6),
        }
    }
}

// ---------------------------------------------------------------------------
// Language definitions
// ---------------------------------------------------------------------------

bitflags! {
    /// Optional highlighting passes a language enables.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyntaxFlags: u8 {
        const NUMBERS = 0b01;
        const STRINGS = 0b10;
    }
}

/// A static language definition.
#[derive(Debug)]
pub struct Language {
    /// Display name for the status bar.
    pub name: &'static str,
    /// File-name patterns. Entries starting with `.` match as a suffix,
    /// others as a substring.
    pub file_match: &'static [&'static str],
    /// Keywords. A trailing `|` marks the primary (type-like) class.
    pub keywords: &'static [&'static str],
    pub line_comment: Option<&'static str>,
    /// Block comment start and end markers.
    pub block_comment: Option<(&'static str, &'static str)>,
    pub flags: SyntaxFlags,
}

impl Language {
    /// Whether `file_name` selects this language.
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        self.file_match.iter().any(|pattern| {
            if pattern.starts_with('.') {
                file_name.ends_with(pattern)
            } else {
                file_name.contains(pattern)
            }
        })
    }

    /// Find the built-in language for a file name or path.
    ///
    /// Only the final path component is matched, so directory names never
    /// select a language.
    #[must_use]
    pub fn for_filename(name: &str) -> Option<&'static Self> {
        let base = Path::new(name)
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(name);
        LANGUAGES.iter().find(|lang| lang.matches(base))
    }
}

const C_KEYWORDS: &[&str] = &[
    "switch", "if", "while", "for", "break", "continue", "return", "else", "struct", "union",
    "typedef", "static", "enum", "class", "case", "int|", "long|", "double|", "float|", "char|",
    "unsigned|", "signed|", "void|",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "fn", "for", "if",
    "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self",
    "Self", "static", "struct", "super", "trait", "type", "unsafe", "use", "where", "while",
    "i8|", "i16|", "i32|", "i64|", "i128|", "isize|", "u8|", "u16|", "u32|", "u64|", "u128|",
    "usize|", "f32|", "f64|", "bool|", "char|", "str|", "String|", "Vec|", "Option|", "Result|",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not",
    "or", "pass", "raise", "return", "try", "while", "with", "yield", "int|", "float|", "str|",
    "bool|", "list|", "dict|", "tuple|", "set|", "bytes|", "None|", "True|", "False|",
];

/// Built-in language table, searched in order.
pub static LANGUAGES: &[Language] = &[
    Language {
        name: "c",
        file_match: &[".c", ".h", ".cpp"],
        keywords: C_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
    Language {
        name: "rust",
        file_match: &[".rs"],
        keywords: RUST_KEYWORDS,
        line_comment: Some("//"),
        block_comment: Some(("/*", "*/")),
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
    Language {
        name: "python",
        file_match: &[".py"],
        keywords: PYTHON_KEYWORDS,
        line_comment: Some("#"),
        block_comment: None,
        flags: SyntaxFlags::NUMBERS.union(SyntaxFlags::STRINGS),
    },
];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Word-boundary bytes: ASCII whitespace, NUL, and common punctuation.
#[must_use]
pub const fn is_separator(byte: u8) -> bool {
    byte.is_ascii_whitespace()
        || byte == 0
        || matches!(
            byte,
            b',' | b'.' | b'(' | b')' | b'+' | b'-' | b'/' | b'*' | b'=' | b'~' | b'%' | b'<'
                | b'>' | b'[' | b']' | b';'
        )
}

/// Classify one rendered row.
///
/// `out` is resized to `render.len()` and overwritten. `comment_open_in` is
/// the previous row's end state (`false` for the first row). Returns whether
/// a block comment is still open at the end of this row.
///
/// Without a language every byte is [`Highlight::Normal`] and no comment
/// state is carried.
pub fn highlight_line(
    render: &[u8],
    language: Option<&Language>,
    comment_open_in: bool,
    out: &mut Vec<Highlight>,
) -> bool {
    out.clear();
    out.resize(render.len(), Highlight::Normal);

    let Some(lang) = language else {
        return false;
    };

    let line_comment = lang
        .line_comment
        .map(str::as_bytes)
        .filter(|m| !m.is_empty());
    let block_comment = lang
        .block_comment
        .map(|(start, end)| (start.as_bytes(), end.as_bytes()))
        .filter(|(start, end)| !start.is_empty() && !end.is_empty());
    let numbers = lang.flags.contains(SyntaxFlags::NUMBERS);
    let strings = lang.flags.contains(SyntaxFlags::STRINGS);

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = comment_open_in && block_comment.is_some();
    let mut i = 0;

    while i < render.len() {
        let byte = render[i];
        let rest = &render[i..];
        let prev_hl = if i > 0 { out[i - 1] } else { Highlight::Normal };

        if in_string.is_none() {
            if let Some((start, end)) = block_comment {
                if in_comment {
                    if rest.starts_with(end) {
                        out[i..i + end.len()].fill(Highlight::BlockComment);
                        i += end.len();
                        in_comment = false;
                        prev_sep = true;
                    } else {
                        out[i] = Highlight::BlockComment;
                        i += 1;
                    }
                    continue;
                }
                if rest.starts_with(start) {
                    out[i..i + start.len()].fill(Highlight::BlockComment);
                    i += start.len();
                    in_comment = true;
                    continue;
                }
            }

            if let Some(marker) = line_comment {
                if rest.starts_with(marker) {
                    out[i..].fill(Highlight::Comment);
                    break;
                }
            }
        }

        if strings {
            if let Some(delim) = in_string {
                out[i] = Highlight::String;
                if byte == b'\\' && i + 1 < render.len() {
                    out[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if byte == delim {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            }
            if byte == b'"' || byte == b'\'' {
                in_string = Some(byte);
                out[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if numbers
            && ((byte.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (byte == b'.' && prev_hl == Highlight::Number))
        {
            out[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            if let Some((len, class)) = match_keyword(lang.keywords, rest) {
                out[i..i + len].fill(class);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(byte);
        i += 1;
    }

    in_comment
}

/// Match a keyword at the start of `rest`.
///
/// The keyword must match byte-for-byte and be followed by a separator or
/// the end of the row.
fn match_keyword(keywords: &[&str], rest: &[u8]) -> Option<(usize, Highlight)> {
    keywords.iter().find_map(|entry| {
        let (word, class) = match entry.strip_suffix('|') {
            Some(word) => (word, Highlight::KeywordPrimary),
            None => (*entry, Highlight::KeywordSecondary),
        };
        let word = word.as_bytes();
        if word.is_empty() || !rest.starts_with(word) {
            return None;
        }
        let follows = rest.get(word.len()).copied().unwrap_or(0);
        is_separator(follows).then_some((word.len(), class))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use super::Highlight::{
        BlockComment as B, Comment as C, KeywordPrimary as P, KeywordSecondary as K, Normal as N,
        Number as Num, String as S,
    };

    fn c() -> &'static Language {
        Language::for_filename("main.c").unwrap()
    }

    fn classify(text: &str, open_in: bool) -> (Vec<Highlight>, bool) {
        let mut out = Vec::new();
        let open = highlight_line(text.as_bytes(), Some(c()), open_in, &mut out);
        (out, open)
    }

    // -- Language selection -------------------------------------------------

    #[test]
    fn select_by_extension() {
        assert_eq!(Language::for_filename("a.c").unwrap().name, "c");
        assert_eq!(Language::for_filename("a.h").unwrap().name, "c");
        assert_eq!(Language::for_filename("a.cpp").unwrap().name, "c");
        assert_eq!(Language::for_filename("lib.rs").unwrap().name, "rust");
        assert_eq!(Language::for_filename("x.py").unwrap().name, "python");
    }

    #[test]
    fn select_uses_final_component() {
        assert_eq!(Language::for_filename("src/dir.c/notes.txt").map(|l| l.name), None);
        assert_eq!(Language::for_filename("/tmp/x/main.c").unwrap().name, "c");
    }

    #[test]
    fn select_suffix_is_exact() {
        assert!(Language::for_filename("main.cc").is_none());
        assert!(Language::for_filename("file.sh").is_none());
        assert!(Language::for_filename("README").is_none());
    }

    #[test]
    fn substring_patterns_match_anywhere() {
        let make = Language {
            name: "make",
            file_match: &["Makefile"],
            keywords: &[],
            line_comment: Some("#"),
            block_comment: None,
            flags: SyntaxFlags::empty(),
        };
        assert!(make.matches("Makefile"));
        assert!(make.matches("GNUMakefile.local"));
        assert!(!make.matches("makefile"));
    }

    // -- Separators ---------------------------------------------------------

    #[test]
    fn separators() {
        for b in b" \t\0,.()+-/*=~%<>[];" {
            assert!(is_separator(*b), "{:?} should separate", *b as char);
        }
        for b in b"a_Z9\"'{}" {
            assert!(!is_separator(*b), "{:?} should not separate", *b as char);
        }
    }

    // -- No language --------------------------------------------------------

    #[test]
    fn no_language_is_all_normal() {
        let mut out = Vec::new();
        let open = highlight_line(b"int x; /* open", None, true, &mut out);
        assert_eq!(out, vec![N; 14]);
        assert!(!open);
    }

    // -- Keywords -----------------------------------------------------------

    #[test]
    fn keyword_classes() {
        let (hl, _) = classify("int if", false);
        assert_eq!(hl, vec![P, P, P, N, K, K]);
    }

    #[test]
    fn keyword_needs_word_boundary_before() {
        let (hl, _) = classify("xint", false);
        assert_eq!(hl, vec![N; 4]);
    }

    #[test]
    fn keyword_needs_word_boundary_after() {
        let (hl, _) = classify("integer", false);
        assert_eq!(hl, vec![N; 7]);
    }

    #[test]
    fn keyword_at_end_of_row() {
        let (hl, _) = classify("return", false);
        assert_eq!(hl, vec![K; 6]);
    }

    #[test]
    fn keyword_requires_exact_prefix() {
        // Same length as "for" but a different word.
        let (hl, _) = classify("fox;", false);
        assert_eq!(hl, vec![N; 4]);
    }

    #[test]
    fn keyword_after_punctuation() {
        let (hl, _) = classify("(char)", false);
        assert_eq!(hl, vec![N, P, P, P, P, N]);
    }

    // -- Numbers ------------------------------------------------------------

    #[test]
    fn numbers_and_decimal_point() {
        let (hl, _) = classify("x=3.14", false);
        assert_eq!(hl, vec![N, N, Num, Num, Num, Num]);
    }

    #[test]
    fn digits_inside_identifier_are_not_numbers() {
        let (hl, _) = classify("x1", false);
        assert_eq!(hl, vec![N, N]);
    }

    // -- Strings ------------------------------------------------------------

    #[test]
    fn double_quoted_string() {
        let (hl, _) = classify("\"str\"", false);
        assert_eq!(hl, vec![S; 5]);
    }

    #[test]
    fn single_quoted_string_and_after() {
        let (hl, _) = classify("'a' 1", false);
        assert_eq!(hl, vec![S, S, S, N, Num]);
    }

    #[test]
    fn escaped_quote_stays_in_string() {
        let (hl, _) = classify(r#""a\"b" x"#, false);
        assert_eq!(hl, vec![S, S, S, S, S, S, N, N]);
    }

    #[test]
    fn unterminated_string_runs_to_end_but_does_not_carry() {
        let (hl, open) = classify("\"abc", false);
        assert_eq!(hl, vec![S; 4]);
        assert!(!open);
    }

    #[test]
    fn comment_marker_inside_string_is_text() {
        let (hl, _) = classify("\"//\"", false);
        assert_eq!(hl, vec![S; 4]);
    }

    // -- Comments -----------------------------------------------------------

    #[test]
    fn line_comment_runs_to_end() {
        let (hl, open) = classify("x // hi", false);
        assert_eq!(hl, vec![N, N, C, C, C, C, C]);
        assert!(!open);
    }

    #[test]
    fn block_comment_closed_on_same_row() {
        let (hl, open) = classify("/* a */ 1", false);
        assert_eq!(hl, vec![B, B, B, B, B, B, B, N, Num]);
        assert!(!open);
    }

    #[test]
    fn block_comment_left_open() {
        let (hl, open) = classify("x /* a", false);
        assert_eq!(hl, vec![N, N, B, B, B, B]);
        assert!(open);
    }

    #[test]
    fn incoming_open_comment_until_end_marker() {
        let (hl, open) = classify("a */ int", true);
        assert_eq!(hl, vec![B, B, B, B, N, P, P, P]);
        assert!(!open);
    }

    #[test]
    fn incoming_open_comment_without_end_stays_open() {
        let (hl, open) = classify("int x;", true);
        assert_eq!(hl, vec![B; 6]);
        assert!(open);
    }

    #[test]
    fn block_start_inside_string_is_text() {
        let (hl, open) = classify("\"/*\"", false);
        assert_eq!(hl, vec![S; 4]);
        assert!(!open);
    }

    #[test]
    fn line_comment_inside_block_comment_is_block() {
        let (hl, open) = classify("/* // */", false);
        assert_eq!(hl, vec![B; 8]);
        assert!(!open);
    }

    #[test]
    fn language_without_block_comments_ignores_incoming_state() {
        let python = Language::for_filename("a.py").unwrap();
        let mut out = Vec::new();
        let open = highlight_line(b"x # y", Some(python), true, &mut out);
        assert_eq!(out, vec![N, N, C, C, C]);
        assert!(!open);
    }

    // -- Worked example -----------------------------------------------------

    #[test]
    fn c_declaration_with_trailing_comment() {
        let (hl, _) = classify("int x = 1; // hi", false);
        assert_eq!(&hl[0..3], &[P, P, P]);
        assert_eq!(hl[8], Num);
        assert!(hl[..11].iter().all(|h| !h.is_comment()));
        assert!(hl[11..].iter().all(|&h| h == C));
    }

    // -- Colors -------------------------------------------------------------

    #[test]
    fn colors_distinguish_classes() {
        assert_eq!(Highlight::Normal.color(), None);
        assert_eq!(Highlight::Comment.color(), Highlight::BlockComment.color());
        assert_ne!(Highlight::KeywordPrimary.color(), Highlight::KeywordSecondary.color());
        assert_eq!(Highlight::Match.color(), Some(4));
    }
}
