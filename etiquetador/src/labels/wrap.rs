//! Two-line text wrapping for label fields

use label_printer::{char_width, truncate_chars};

/// A space found at or before this index is too close to the start to be a
/// useful break; the text is cut at the width limit instead.
const MIN_BREAK_INDEX: usize = 5;

/// Appended to a second line that had to be shortened
const ELLIPSIS: &str = "...";

/// Split `text` into at most two lines of about `max_width` characters
///
/// Text that fits is returned unchanged with an empty second line.
/// Otherwise the break is the last space at or before `max_width`; when that
/// space is within the first few characters (or there is none) the text is
/// cut mid-word at `max_width`. Both lines are trimmed, and a second line
/// longer than `max_width` is shortened and marked with an ellipsis.
pub fn wrap_two_lines(text: &str, max_width: usize) -> (String, String) {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    if len <= max_width {
        return (text.to_string(), String::new());
    }

    let limit = max_width.min(len - 1);
    let mut split = limit;
    while split > 0 && chars[split] != ' ' {
        split -= 1;
    }
    if split <= MIN_BREAK_INDEX {
        split = limit;
    }

    let line1: String = chars[..split].iter().collect();
    let line2: String = chars[split..].iter().collect();
    let line1 = line1.trim().to_string();
    let mut line2 = line2.trim().to_string();

    if char_width(&line2) > max_width {
        line2 = format!("{}{}", truncate_chars(&line2, max_width), ELLIPSIS);
    }

    (line1, line2)
}
