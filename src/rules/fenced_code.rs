// Fenced code block. Unlike indented code, a fence can interrupt an open
// paragraph (CommonMark explicitly allows this), so the matcher has no
// paragraph guard.

use std::sync::Arc;

use crate::grammar::blocks::fenced_code_block;
use crate::grammar::Span;
use crate::html_escape::escape_html;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::token::Token;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    let remaining = state.remaining();
    let (rest, (info, content)) = fenced_code_block(Span::new(remaining)).ok()?;
    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::FencedCode {
        info,
        content: content.fragment().to_string(),
        end: state.cursor + consumed,
    })
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::FencedCode { info, content, end } = matched else {
        unreachable!("fenced_code handler received a non-fenced_code match")
    };
    let lines = state.lines_in(end);
    state.append_token(Token::BlockCode {
        raw: escape_html(&content),
        info,
    });
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "fenced_code",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_and_captures_info_string() {
        let state = BlockState::new("```rust\nfn main() {}\n```\nmore\n");
        match matcher(&state).unwrap() {
            RuleMatch::FencedCode { info, content, .. } => {
                assert_eq!(info, Some("rust".to_string()));
                assert_eq!(content, "fn main() {}");
            }
            other => panic!("unexpected match {other:?}"),
        }
    }

    #[test]
    fn can_interrupt_an_open_paragraph() {
        let mut state = BlockState::new("```\ncode\n```\n");
        state.add_paragraph("text");
        assert!(matcher(&state).is_some());
    }

    #[test]
    fn handler_html_escapes_raw_content() {
        let mut state = BlockState::new("```\na & b <c>\n```\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        match &state.tokens[0] {
            Token::BlockCode { raw, .. } => assert_eq!(raw, "a &amp; b &lt;c&gt;"),
            other => panic!("expected block code, got {other:?}"),
        }
    }
}
