// Indented code block: 4+ effective spaces of leading indentation. Cannot
// interrupt an open paragraph (CommonMark requires a blank line first), so
// the matcher simply declines whenever one is open — the line falls
// through to the generic paragraph-continuation fallback in the driver,
// which has the same effect as lazy-continuing it.

use std::sync::Arc;

use crate::grammar::blocks::indented_code_block;
use crate::grammar::Span;
use crate::html_escape::escape_html;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::tab::dedent_lines;
use crate::token::Token;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    if matches!(state.last_token(), Some(tok) if tok.is_paragraph()) {
        return None;
    }
    let remaining = state.remaining();
    let (rest, content) = indented_code_block(Span::new(remaining)).ok()?;
    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::IndentCode {
        line: content.fragment().to_string(),
        end: state.cursor + consumed,
    })
}

/// Strip trailing blank lines: CommonMark doesn't count a blank line run
/// before the next non-indented construct as part of the code block's
/// content, even though the grammar function greedily swallows it to
/// decide where the block ends.
fn trim_trailing_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    while matches!(lines.last(), Some(l) if l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::IndentCode { line, end } = matched else {
        unreachable!("indent_code handler received a non-indent_code match")
    };
    let lines = state.lines_in(end);
    let raw = escape_html(&trim_trailing_blank_lines(&dedent_lines(&line, 4)));
    state.append_token(Token::BlockCode { raw, info: None });
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "indent_code",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declines_when_paragraph_open() {
        let mut state = BlockState::new("    code\n");
        state.add_paragraph("text");
        assert!(matcher(&state).is_none());
    }

    #[test]
    fn handler_dedents_and_trims_trailing_blanks() {
        let mut state = BlockState::new("    a\n    b\n\nmore\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        assert_eq!(
            state.tokens,
            vec![Token::BlockCode {
                raw: "a\nb".to_string(),
                info: None
            }]
        );
    }

    #[test]
    fn handler_html_escapes_raw_content() {
        let mut state = BlockState::new("    a & b <c>\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        assert_eq!(
            state.tokens,
            vec![Token::BlockCode {
                raw: "a &amp; b &lt;c&gt;".to_string(),
                info: None
            }]
        );
    }
}
