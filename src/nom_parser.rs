use nom::branch::alt;
use nom::bytes::complete::take_till1;
use nom::combinator::{map, value};
use nom::IResult;

use crate::{LINE_TERMINATOR, RESET_CHARS};

type Buf = [u8];

/// One piece of an inbound byte run.
#[derive(PartialEq, Debug, Copy, Clone)]
pub(crate) enum RunToken<'a> {
    /// Ordinary bytes, up to the next control byte or the end of the run.
    Text(&'a Buf),
    Terminator,
    Reset,
    NeedData,
}

/// Returns the number of bytes consumed and the token found at the
/// start of `buf`. An empty buffer gives `(0, NeedData)`.
pub(crate) fn parse_run(buf: &Buf) -> (usize, RunToken<'_>) {
    match alt_match(buf) {
        Ok((remaining, token)) => (buf.len() - remaining.len(), token),
        Err(_) => (0, RunToken::NeedData),
    }
}

fn alt_match(buf: &Buf) -> IResult<&Buf, RunToken<'_>> {
    alt((
        value(RunToken::Terminator, ascii_char(LINE_TERMINATOR)),
        value(
            RunToken::Reset,
            alt((ascii_char(RESET_CHARS[0]), ascii_char(RESET_CHARS[1]))),
        ),
        map(take_till1(is_control), RunToken::Text),
    ))(buf)
}

fn is_control(c: u8) -> bool {
    c == LINE_TERMINATOR || RESET_CHARS.contains(&c)
}

fn ascii_char<'a>(ascii_char: u8) -> impl Fn(&'a Buf) -> IResult<&'a Buf, char> {
    nom::character::complete::char(ascii_char as char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use RunToken::*;

    #[test]
    fn test_parse_run() {
        assert_eq!(parse_run(b""), (0, NeedData));
        assert_eq!(parse_run(b"\r"), (1, Terminator));
        assert_eq!(parse_run(b"\x07abc"), (1, Reset));
        assert_eq!(parse_run(b"\x08"), (1, Reset));
        assert_eq!(parse_run(b"abc"), (3, Text(b"abc")));
        assert_eq!(parse_run(b"ab\rcd"), (2, Text(b"ab")));
    }

    #[test]
    fn test_other_control_bytes_are_text() {
        assert_eq!(parse_run(b"\n\t\x1b"), (3, Text(b"\n\t\x1b")));
    }

    #[test]
    fn test_walk_run() {
        let mut buf: &[u8] = b"set 1\x08x\r";
        let mut tokens = Vec::new();
        loop {
            match parse_run(buf) {
                (0, _) => break,
                (n, token) => {
                    tokens.push(token);
                    buf = &buf[n..];
                }
            }
        }
        assert_eq!(tokens, vec![Text(b"set 1"), Reset, Text(b"x"), Terminator]);
    }
}
