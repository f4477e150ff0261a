//! IRC formatting control codes.
//!
//! <https://modern.ircdocs.horse/formatting.html>

use std::borrow::Cow;

use itertools::PeekingNext;

const BOLD: char = '\x02';
const COLOR: char = '\x03';
const HEX_COLOR: char = '\x04';
const RESET: char = '\x0F';
const MONOSPACE: char = '\x11';
const REVERSE_COLOR: char = '\x16';
const ITALICS: char = '\x1D';
const STRIKETHROUGH: char = '\x1E';
const UNDERLINE: char = '\x1F';

fn is_control(c: char) -> bool {
    matches!(
        c,
        BOLD | COLOR
            | HEX_COLOR
            | RESET
            | MONOSPACE
            | REVERSE_COLOR
            | ITALICS
            | STRIKETHROUGH
            | UNDERLINE
    )
}

/// Removes formatting codes from `text`, including the colour numbers
/// following a colour code. Text without any is returned as is.
pub fn strip(text: &str) -> Cow<'_, str> {
    if !text.contains(is_control) {
        return Cow::Borrowed(text);
    }

    let mut stripped = String::with_capacity(text.len());
    let mut iter = text.chars().peekable();

    while let Some(c) = iter.next() {
        match c {
            COLOR => {
                // 1-2 digits, then optionally a comma and 1-2 more
                if skip_color(&mut iter, 2, char::is_ascii_digit)
                    && iter.peek() == Some(&',')
                {
                    let mut lookahead = iter.clone();
                    lookahead.next();

                    if skip_color(&mut lookahead, 2, char::is_ascii_digit) {
                        iter = lookahead;
                    }
                }
            }
            HEX_COLOR => {
                // 6 hex digits, then optionally a comma and 6 more
                if skip_color(&mut iter, 6, char::is_ascii_hexdigit)
                    && iter.peek() == Some(&',')
                {
                    let mut lookahead = iter.clone();
                    lookahead.next();

                    if skip_color(&mut lookahead, 6, char::is_ascii_hexdigit) {
                        iter = lookahead;
                    }
                }
            }
            c if is_control(c) => {}
            c => stripped.push(c),
        }
    }

    Cow::Owned(stripped)
}

/// Skips up to `max` leading characters accepted by `is_digit`. Returns
/// whether any were skipped.
fn skip_color<I>(iter: &mut I, max: usize, is_digit: fn(&char) -> bool) -> bool
where
    I: PeekingNext<Item = char>,
{
    let mut skipped = 0;

    while skipped < max && iter.peeking_next(is_digit).is_some() {
        skipped += 1;
    }

    skipped > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_codes() {
        let tests = [
            ("plain text", "plain text"),
            ("\x02Avertissement\x02 : Le pseudo", "Avertissement : Le pseudo"),
            ("\x034red\x03 and \x0304,12boxed\x0f", "red and boxed"),
            ("\x03,5 comma stays", ",5 comma stays"),
            ("\x0312,x", ",x"),
            ("\x03123", "3"),
            ("\x04FF00AAhex\x04", "hex"),
            ("\x1d\x1fitalic underline\x1e\x11\x16", "italic underline"),
        ];

        for (text, expected) in tests {
            assert_eq!(strip(text), expected, "{text:?}");
        }
    }

    #[test]
    fn borrows_plain_text() {
        assert!(matches!(strip("#rust]"), Cow::Borrowed(_)));
    }
}
