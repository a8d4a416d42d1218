//! Match highlighting for search results.
//!
//! Ranges are inclusive character indices, assumed sorted and
//! non-overlapping. They are not re-sorted here; ends past the text are
//! clamped so bad input never panics.

use crate::search::MatchRange;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";
const ANSI_ON: &str = "\x1b[1;7m";
const ANSI_OFF: &str = "\x1b[0m";
const ELLIPSIS: &str = "…";

/// A run of text, either matched or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub matched: bool,
}

/// Split `text` into alternating unmatched and matched segments.
#[must_use]
pub fn segments<'a>(text: &'a str, ranges: &[MatchRange]) -> Vec<Segment<'a>> {
    let offsets = CharOffsets::new(text);
    let mut out = Vec::with_capacity(ranges.len() * 2 + 1);
    let mut cursor = 0;

    for range in ranges {
        let start = offsets.byte(range.start).max(cursor);
        let end = offsets.byte(range.end.saturating_add(1));
        if start > cursor {
            out.push(Segment {
                text: &text[cursor..start],
                matched: false,
            });
        }
        if end > start {
            out.push(Segment {
                text: &text[start..end],
                matched: true,
            });
        }
        cursor = cursor.max(end);
    }

    if cursor < text.len() || out.is_empty() {
        out.push(Segment {
            text: &text[cursor..],
            matched: false,
        });
    }
    out
}

/// HTML with matched spans wrapped in `<mark>`.
///
/// Field text is user-authored, so every segment is escaped.
#[must_use]
pub fn to_markup(text: &str, ranges: &[MatchRange]) -> String {
    let mut out = String::with_capacity(text.len() + ranges.len() * 13);
    for segment in segments(text, ranges) {
        if segment.matched {
            out.push_str(MARK_OPEN);
            escape_html_into(segment.text, &mut out);
            out.push_str(MARK_CLOSE);
        } else {
            escape_html_into(segment.text, &mut out);
        }
    }
    out
}

/// Terminal rendering with matched spans in bold reverse video.
#[must_use]
pub fn to_ansi(text: &str, ranges: &[MatchRange]) -> String {
    let mut out = String::with_capacity(text.len());
    for segment in segments(text, ranges) {
        if segment.matched {
            out.push_str(ANSI_ON);
            out.push_str(segment.text);
            out.push_str(ANSI_OFF);
        } else {
            out.push_str(segment.text);
        }
    }
    out
}

/// Plain text with matched spans wrapped in `[` and `]`.
#[must_use]
pub fn to_brackets(text: &str, ranges: &[MatchRange]) -> String {
    segments(text, ranges)
        .iter()
        .map(|s| {
            if s.matched {
                format!("[{}]", s.text)
            } else {
                s.text.to_string()
            }
        })
        .collect()
}

/// Escape the five HTML-significant characters.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(text, &mut out);
    out
}

fn escape_html_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

/// A window of text around the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub text: String,
    /// Ranges shifted into `text`; ranges outside the window are dropped.
    pub ranges: Vec<MatchRange>,
}

/// Cut a window of roughly `radius` characters either side of the first
/// match, with ellipses where text was cut.
///
/// Newlines are flattened to spaces so the snippet fits on one line.
#[must_use]
pub fn snippet(text: &str, ranges: &[MatchRange], radius: usize) -> Snippet {
    let chars: Vec<char> = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let anchor = ranges.first().map_or(0, |r| r.start.min(chars.len()));

    let from = anchor.saturating_sub(radius);
    let to = anchor.saturating_add(radius).min(chars.len());

    let prefix = if from > 0 { ELLIPSIS } else { "" };
    let suffix = if to < chars.len() { ELLIPSIS } else { "" };
    let shift = prefix.chars().count();

    let body: String = chars[from..to].iter().collect();
    let shifted = ranges
        .iter()
        .filter(|r| r.start >= from && r.start < to)
        .map(|r| MatchRange::new(r.start - from + shift, r.end.min(to - 1) - from + shift))
        .collect();

    Snippet {
        text: format!("{prefix}{body}{suffix}"),
        ranges: shifted,
    }
}

/// Char index to byte offset lookup.
struct CharOffsets {
    offsets: Vec<usize>,
}

impl CharOffsets {
    fn new(text: &str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { offsets }
    }

    /// Byte offset of char `index`, clamped to the end of the text.
    fn byte(&self, index: usize) -> usize {
        self.offsets
            .get(index)
            .copied()
            .unwrap_or_else(|| self.offsets.last().copied().unwrap_or(0))
    }
}
