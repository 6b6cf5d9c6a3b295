// CommonMark Setext Heading Grammar
// Recognizes the underline itself (= for level 1, - for level 2).
// Content recognition is handled upstream: by the time the driver reaches
// an underline, the preceding text is already committed as an open
// paragraph token, so the only thing left to recognize here is the
// underline line.

use crate::grammar::shared::Span;
use nom::{
    IResult,
    bytes::complete::take_while,
    combinator::recognize,
    branch::alt,
    character::complete::line_ending,
};

/// Parse a single underline line on its own, with no content line attached.
/// Used by a line-stepped driver that has already committed preceding
/// content lines to an open paragraph token: by the time the driver reaches
/// the underline, the content is no longer adjacent source text to re-parse
/// together, just the previous token to rewrite. Modeled on
/// `cm_thematic_break::thematic_break`'s run-length counting.
///
/// # Returns
/// `Ok((remaining, level))` where level is 1 for `=`, 2 for `-`.
pub fn setext_underline_only(input: Span) -> IResult<Span, u8> {
    let start = input;

    let (input, leading_spaces) = take_while(|c| c == ' ')(input)?;
    if leading_spaces.fragment().len() > 3 {
        return Err(nom::Err::Error(nom::error::Error::new(
            start,
            nom::error::ErrorKind::Tag,
        )));
    }

    let (input, first_char) =
        nom::character::complete::one_of::<_, _, nom::error::Error<Span>>("=-")(input)?;
    let (input, _) = take_while(|c| c == first_char)(input)?;
    let (input, _) = take_while(|c| c == ' ' || c == '\t')(input)?;

    let (remaining, _) = alt((
        recognize(line_ending),
        recognize(nom::combinator::eof),
    ))(input)?;

    let level = if first_char == '=' { 1 } else { 2 };
    Ok((remaining, level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_setext_underline_only_equals() {
        let input = Span::new("===\n");
        let (remaining, level) = setext_underline_only(input).unwrap();
        assert_eq!(level, 1);
        assert_eq!(*remaining.fragment(), "");
    }

    #[test]
    fn smoke_test_setext_underline_only_dashes() {
        let input = Span::new("--\nmore");
        let (remaining, level) = setext_underline_only(input).unwrap();
        assert_eq!(level, 2);
        assert_eq!(*remaining.fragment(), "more");
    }

    #[test]
    fn smoke_test_setext_underline_only_rejects_mixed_chars() {
        let input = Span::new("-=-\n");
        assert!(setext_underline_only(input).is_err());
    }
}
