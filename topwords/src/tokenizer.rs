//! Streaming word splitter.
//!
//! [`next_token`] works like a split function over a read buffer: it is handed
//! whatever bytes are currently buffered plus a flag saying whether more input
//! can follow, and answers with how many bytes to consume and, if one is
//! complete, the span of the next word. When a word runs into the end of a
//! non-final buffer it asks for more input instead of cutting the word in two.
//!
//! A word is a maximal run of characters that are not separators (see
//! [`is_separator`]). Decoding is done one UTF-8 character at a time; a
//! malformed byte sequence acts as a separator and is reported back to the
//! caller so it can be logged.
use std::ops::Range;

/// One decoded step over a byte buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoded {
    /// A full character and its width in bytes
    Char(char, usize),
    /// A malformed sequence of the given width
    Malformed(usize),
    /// The buffer ends inside a multi-byte character
    Incomplete,
}

/// Malformed input seen while producing one [`Scan`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed {
    /// Offset of the first malformed sequence, relative to the scanned buffer
    pub first_offset: usize,
    /// Number of malformed sequences
    pub count: usize,
}

/// Outcome of a single [`next_token`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scan {
    /// Bytes the caller may drop from the front of its buffer
    pub advance: usize,
    /// Span of the next word, or `None` when more input is needed
    pub token: Option<Range<usize>>,
    pub malformed: Option<Malformed>,
}

impl Scan {
    pub fn needs_more(&self) -> bool {
        self.token.is_none()
    }
}

/// Reports whether `c` separates words.
///
/// Separators are ASCII whitespace, the punctuation `, . - _ ? ! ; : = > <`,
/// NEL, NBSP and the Unicode space separators (ogham space mark, the
/// U+2000..U+200A block, line/paragraph separators, narrow NBSP, medium
/// mathematical space and ideographic space). Quotes, apostrophes, brackets
/// and everything else belong to the word.
pub fn is_separator(c: char) -> bool {
    if c <= '\u{00FF}' {
        return matches!(
            c,
            ' ' | '\t'
                | '\n'
                | '\u{000B}'
                | '\u{000C}'
                | '\r'
                | ','
                | '.'
                | '-'
                | '_'
                | '?'
                | '!'
                | ';'
                | ':'
                | '='
                | '>'
                | '<'
                | '\u{0085}'
                | '\u{00A0}'
        );
    }
    if ('\u{2000}'..='\u{200A}').contains(&c) {
        return true;
    }
    matches!(
        c,
        '\u{1680}' | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}'
    )
}

/// Decodes the character at the front of `data`.
fn decode(data: &[u8], at_eof: bool) -> Decoded {
    let Some(&lead) = data.first() else {
        return Decoded::Incomplete;
    };
    if lead.is_ascii() {
        return Decoded::Char(lead as char, 1);
    }

    let window = &data[..data.len().min(4)];
    let valid = match std::str::from_utf8(window) {
        Ok(s) => s,
        Err(e) if e.valid_up_to() > 0 => match std::str::from_utf8(&window[..e.valid_up_to()]) {
            Ok(s) => s,
            Err(_) => return Decoded::Malformed(1),
        },
        Err(e) => {
            return match e.error_len() {
                Some(width) => Decoded::Malformed(width),
                None if at_eof => Decoded::Malformed(window.len()),
                None => Decoded::Incomplete,
            };
        }
    };

    match valid.chars().next() {
        Some(c) => Decoded::Char(c, c.len_utf8()),
        None => Decoded::Malformed(1),
    }
}

fn note_malformed(malformed: &mut Option<Malformed>, offset: usize) {
    match malformed {
        Some(m) => m.count += 1,
        None => {
            *malformed = Some(Malformed {
                first_offset: offset,
                count: 1,
            })
        }
    }
}

/// Finds the next word in `data`.
///
/// Leading separators are skipped. If a word is terminated by a separator the
/// separator is consumed along with it. With `at_eof` set, a trailing word that
/// runs to the end of `data` is returned as-is; otherwise the call asks for
/// more input and only the skipped separators are consumed. Empty words are
/// never produced.
pub fn next_token(data: &[u8], at_eof: bool) -> Scan {
    let mut malformed = None;

    let mut start = 0;
    while start < data.len() {
        match decode(&data[start..], at_eof) {
            Decoded::Char(c, width) if is_separator(c) => start += width,
            Decoded::Char(..) => break,
            Decoded::Malformed(width) => {
                note_malformed(&mut malformed, start);
                start += width;
            }
            Decoded::Incomplete => {
                return Scan {
                    advance: start,
                    token: None,
                    malformed,
                }
            }
        }
    }

    let mut end = start;
    while end < data.len() {
        match decode(&data[end..], at_eof) {
            Decoded::Char(c, width) if is_separator(c) => {
                return Scan {
                    advance: end + width,
                    token: Some(start..end),
                    malformed,
                };
            }
            Decoded::Char(_, width) => end += width,
            Decoded::Malformed(width) => {
                note_malformed(&mut malformed, end);
                return Scan {
                    advance: end + width,
                    token: Some(start..end),
                    malformed,
                };
            }
            Decoded::Incomplete => break,
        }
    }

    if at_eof && data.len() > start {
        return Scan {
            advance: data.len(),
            token: Some(start..data.len()),
            malformed,
        };
    }

    Scan {
        advance: start,
        token: None,
        malformed,
    }
}

/// Lower-cases a token into the key it is counted under.
pub fn normalize(token: &[u8]) -> String {
    match std::str::from_utf8(token) {
        Ok(s) => s.to_lowercase(),
        Err(_) => String::from_utf8_lossy(token).to_lowercase(),
    }
}

/// Iterator over the words of a complete in-memory buffer.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.data.len() {
            let rest = &self.data[self.pos..];
            let scan = next_token(rest, true);
            self.pos += scan.advance;
            if let Some(span) = scan.token {
                return Some(&rest[span]);
            }
            if scan.advance == 0 {
                break;
            }
        }
        None
    }
}

/// Splits a complete buffer into normalized words.
pub fn words(data: &[u8]) -> impl Iterator<Item = String> + '_ {
    Tokens::new(data).map(normalize)
}
