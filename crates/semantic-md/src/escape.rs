//! Context-sensitive CommonMark escaping.
//!
//! Escaping happens in two phases. While nodes are rendered, every text byte
//! that could carry Markdown meaning is *marked* by a [`PLACEHOLDER`] byte in
//! front of it. Once the whole document has been assembled, the marks are
//! *resolved*: a mark whose character would start live Markdown syntax in its
//! final surroundings becomes a backslash, every other mark is dropped.
//!
//! Resolution has to see the complete output because the meaning of a
//! character depends on what other nodes contributed around it, e.g. whether
//! a `#` ends up at the start of a line.

use crate::options::EscapeMode;

/// The marker byte inserted in front of escapable characters (ASCII SUB).
pub const PLACEHOLDER: u8 = 0x1A;
/// [`PLACEHOLDER`] as a `char`.
pub const PLACEHOLDER_CHAR: char = '\u{1A}';

/// Returns whether the byte may need a backslash in front of it.
#[inline]
pub fn is_escapable(b: u8) -> bool {
    matches!(
        b,
        b'\\'
            | b'*'
            | b'_'
            | b'-'
            | b'+'
            | b'.'
            | b'>'
            | b'|'
            | b'$'
            | b'#'
            | b'='
            | b'['
            | b']'
            | b'('
            | b')'
            | b'!'
            | b'~'
            | b'`'
            | b'"'
            | b'\''
    )
}

/// A resolution rule. Given the buffer and the index of a marked character,
/// returns how many bytes the match consumes, or `None` if the rule does not
/// apply.
type Pattern = fn(&[u8], usize) -> Option<usize>;

/// First match wins.
const PATTERNS: [Pattern; 11] = [
    italic_or_bold,
    block_quote,
    atx_header,
    setext_header,
    divider,
    ordered_list,
    unordered_list,
    image_or_link,
    fenced_code,
    inline_code,
    backslash,
];

/// Marks and resolves escapes according to an [`EscapeMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Escaper {
    mode: EscapeMode,
}

impl Escaper {
    /// Creates an escaper for the given mode.
    pub fn new(mode: EscapeMode) -> Self {
        Self { mode }
    }

    /// The mode of this escaper.
    pub fn mode(&self) -> EscapeMode {
        self.mode
    }

    /// Phase one: marks every escapable character of a raw text run.
    ///
    /// NUL characters are replaced by U+FFFD. Stray placeholder characters in
    /// the source are removed so they cannot be mistaken for marks. In
    /// [`EscapeMode::Disabled`] the text is returned unchanged.
    pub fn mark(&self, text: &str) -> String {
        if self.mode == EscapeMode::Disabled {
            return text.to_owned();
        }

        let mut out = String::with_capacity(text.len() * 2);
        for ch in text.chars() {
            match ch {
                '\0' => out.push(char::REPLACEMENT_CHARACTER),
                PLACEHOLDER_CHAR => {}
                c if c.is_ascii() && is_escapable(c as u8) => {
                    out.push(PLACEHOLDER_CHAR);
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out
    }

    /// Phase two: resolves all marks of a fully assembled document.
    ///
    /// In [`EscapeMode::Disabled`] the content is returned unchanged.
    pub fn resolve(&self, content: &str) -> String {
        if self.mode == EscapeMode::Disabled {
            return content.to_owned();
        }

        let bytes = content.as_bytes();
        let mut escape = vec![false; bytes.len()];

        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == PLACEHOLDER {
                if i + 1 >= bytes.len() {
                    break;
                }
                if let Some(skip) = PATTERNS.iter().find_map(|pattern| pattern(bytes, i + 1)) {
                    escape[i] = true;
                    i += skip;
                    continue;
                }
            }
            i += 1;
        }

        let mut out = String::with_capacity(content.len());
        for (idx, ch) in content.char_indices() {
            if ch == PLACEHOLDER_CHAR {
                if escape[idx] {
                    out.push('\\');
                }
            } else {
                out.push(ch);
            }
        }
        out
    }
}

/// Escapes the pipes of marked table cell content as `\|`.
///
/// A mark in front of a pipe is consumed together with it, so that phase two
/// does not add a second backslash.
pub fn escape_cell_pipes(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for ch in content.chars() {
        if ch == '|' {
            if out.ends_with(PLACEHOLDER_CHAR) {
                out.pop();
            }
            out.push_str("\\|");
        } else {
            out.push(ch);
        }
    }
    out
}

/// Strips all marks without escaping anything.
pub fn strip_marks(content: &str) -> String {
    content.replace(PLACEHOLDER_CHAR, "")
}

/// Whether the bytes before `index` on its line are only marks and spaces.
fn at_line_start(chars: &[u8], index: usize) -> bool {
    chars[..index]
        .iter()
        .rev()
        .take_while(|&&b| b != b'\n')
        .all(|&b| b == PLACEHOLDER || b == b' ')
}

/// The next unmarked byte after `index`, or `0` at the end of input.
fn next_byte(chars: &[u8], index: usize) -> u8 {
    chars[index + 1..]
        .iter()
        .copied()
        .find(|&b| b != PLACEHOLDER)
        .unwrap_or(0)
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

fn followed_by_blank(chars: &[u8], index: usize) -> bool {
    matches!(chars.get(index + 1), Some(b' ' | b'\t'))
}

fn italic_or_bold(chars: &[u8], index: usize) -> Option<usize> {
    if !matches!(chars[index], b'*' | b'_') {
        return None;
    }

    let next = next_byte(chars, index);
    (next != 0 && !is_space(next)).then_some(1)
}

fn block_quote(chars: &[u8], index: usize) -> Option<usize> {
    (chars[index] == b'>' && at_line_start(chars, index)).then_some(1)
}

fn atx_header(chars: &[u8], index: usize) -> Option<usize> {
    if chars[index] != b'#' || !at_line_start(chars, index) {
        return None;
    }

    let mut count = 1;
    for (i, &b) in chars.iter().enumerate().skip(index + 1) {
        match b {
            b'#' => {
                count += 1;
                if count > 6 {
                    return None;
                }
            }
            PLACEHOLDER => {}
            b' ' | b'\t' | b'\n' | b'\r' => return Some(i - index),
            _ => return None,
        }
    }

    Some(1)
}

fn setext_header(chars: &[u8], index: usize) -> Option<usize> {
    if !matches!(chars[index], b'=' | b'-') {
        return None;
    }

    let mut newlines = 0;
    for &b in chars[..index].iter().rev() {
        match b {
            PLACEHOLDER | b' ' => {}
            b'\n' => newlines += 1,
            _ => return (newlines == 1).then_some(1),
        }
    }

    None
}

fn divider(chars: &[u8], index: usize) -> Option<usize> {
    let marker = chars[index];
    if !matches!(marker, b'-' | b'*' | b'_') || !at_line_start(chars, index) {
        return None;
    }

    let mut count = 1;
    for &b in &chars[index + 1..] {
        match b {
            b'\n' | b'\r' => break,
            PLACEHOLDER | b' ' => {}
            b if b == marker => count += 1,
            _ => return None,
        }
    }

    (count >= 3).then_some(1)
}

fn ordered_list(chars: &[u8], index: usize) -> Option<usize> {
    if chars[index] != b'.' {
        return None;
    }

    let mut has_digits = false;
    for &b in chars[..index].iter().rev() {
        match b {
            b'\n' => break,
            b'0'..=b'9' => has_digits = true,
            PLACEHOLDER | b' ' => {}
            _ => return None,
        }
    }

    (has_digits && followed_by_blank(chars, index)).then_some(1)
}

fn unordered_list(chars: &[u8], index: usize) -> Option<usize> {
    if !matches!(chars[index], b'-' | b'*' | b'+') || !at_line_start(chars, index) {
        return None;
    }

    followed_by_blank(chars, index).then_some(1)
}

fn image_or_link(chars: &[u8], index: usize) -> Option<usize> {
    match chars[index] {
        b'!' if next_byte(chars, index) == b'[' => Some(1),
        b'[' => Some(1),
        b']' if next_byte(chars, index) == b'(' => Some(1),
        b'(' => {
            let prev = chars[..index].iter().rev().find(|&&b| b != PLACEHOLDER);
            (prev == Some(&b']')).then_some(1)
        }
        _ => None,
    }
}

fn fenced_code(chars: &[u8], index: usize) -> Option<usize> {
    let fence = chars[index];
    if !matches!(fence, b'`' | b'~') || !at_line_start(chars, index) {
        return None;
    }

    let count = 1 + chars[index + 1..]
        .iter()
        .filter(|&&b| b != PLACEHOLDER)
        .take_while(|&&b| b == fence)
        .count();

    (count >= 3).then_some(1)
}

fn inline_code(chars: &[u8], index: usize) -> Option<usize> {
    (chars[index] == b'`').then_some(1)
}

fn backslash(chars: &[u8], index: usize) -> Option<usize> {
    (chars[index] == b'\\').then_some(1)
}
