//! Text chord payload transforms
//!
//! Two literal-text rules are applied to a Text chord's value before it is
//! inserted:
//!
//! 1. **Cursor marker** `{c}`: the first live marker is removed and the
//!    cursor lands where it stood. A marker preceded by exactly one
//!    backslash is escaped: it stays as literal `{c}` and the backslash is
//!    dropped. Two (or more) backslashes leave the marker live.
//! 2. **Escaped backslash** `\\` collapses to `\`. This runs last so it
//!    cannot interfere with marker escaping.
//!
//! The cursor offset accounts for everything both rules removed.

use regex::Regex;

/// The cursor-placement marker
pub const CURSOR_MARKER: &str = "{c}";

/// Text ready for insertion plus where the cursor goes inside it
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Insertion {
    pub text: String,
    /// Cursor offset in characters from the start of `text`
    pub cursor_offset: usize,
}

impl Insertion {
    /// Inserts `text` with the cursor at its end
    pub fn at_end(text: String) -> Self {
        let cursor_offset = text.chars().count();
        Self { text, cursor_offset }
    }

    /// The part of `text` in front of the cursor
    pub fn before_cursor(&self) -> &str {
        match self.text.char_indices().nth(self.cursor_offset) {
            Some((byte, _)) => &self.text[..byte],
            None => &self.text,
        }
    }
}

/// Applies the Text chord transforms
#[derive(Debug)]
pub struct TextTransform {
    /// A cursor marker with the run of backslashes in front of it
    marker: Regex,
}

impl Default for TextTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTransform {
    pub fn new() -> Self {
        Self {
            marker: Regex::new(r"(\\*)\{c\}").expect("cursor marker pattern should be valid regex"),
        }
    }

    /// Turns a Text chord value into the text to insert
    ///
    /// # Example
    /// ```
    /// use chords::dispatch::text::TextTransform;
    ///
    /// let insertion = TextTransform::new().apply("foo{c}bar");
    /// assert_eq!(insertion.text, "foobar");
    /// assert_eq!(insertion.cursor_offset, 3);
    /// ```
    pub fn apply(&self, value: &str) -> Insertion {
        let (text, cursor) = self.place_cursor(value);
        let cursor = cursor.unwrap_or(text.len());
        let (text, cursor) = collapse_backslashes(&text, cursor);

        let cursor_offset = text[..cursor].chars().count();
        Insertion { text, cursor_offset }
    }

    /// Handles cursor markers; returns the text and the byte offset of the
    /// first live marker
    fn place_cursor(&self, value: &str) -> (String, Option<usize>) {
        let mut text = String::with_capacity(value.len());
        let mut cursor = None;
        let mut last = 0;

        for caps in self.marker.captures_iter(value) {
            let Some(whole) = caps.get(0) else { continue };
            let backslashes = caps.get(1).map(|m| m.as_str()).unwrap_or("");

            text.push_str(&value[last..whole.start()]);

            if backslashes.len() == 1 {
                // Escaped: keep the marker literally, drop the backslash
                text.push_str(CURSOR_MARKER);
            } else if cursor.is_none() {
                text.push_str(backslashes);
                cursor = Some(text.len());
            } else {
                text.push_str(whole.as_str());
            }

            last = whole.end();
        }

        text.push_str(&value[last..]);
        (text, cursor)
    }
}

/// Collapses every `\\` into `\`, moving the byte cursor left for each
/// collapse that happened in front of it
fn collapse_backslashes(text: &str, cursor: usize) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut new_cursor = cursor;
    let mut last = 0;

    for (start, pair) in text.match_indices(r"\\") {
        out.push_str(&text[last..start]);
        out.push('\\');
        last = start + pair.len();

        if last <= cursor {
            new_cursor -= 1;
        }
    }

    out.push_str(&text[last..]);
    (out, new_cursor)
}
