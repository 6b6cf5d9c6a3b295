// One or more consecutive whitespace-only lines collapse into a single
// `blank_line` token (§4.2's rule table: "one or more lines ... Emits
// blank_line"), never one token per line — that's what keeps adding extra
// leading blank lines to a document from changing its token stream (§8).
// A blank line also never interrupts anything it shouldn't: it's what ends
// an open paragraph and what separates loose list items (the list rule
// inspects the emitted token stream for these rather than re-scanning
// source).

use std::sync::Arc;

use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::token::Token;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    let line_end = state.find_line_end();
    if !state.get_text(line_end).trim().is_empty() {
        return None;
    }
    let mut end = state.current_line_end_inclusive();
    while end < state.cursor_max {
        let next_line_end = match state.source[end..].find('\n') {
            Some(rel) => end + rel,
            None => state.cursor_max,
        };
        if !state.source[end..next_line_end].trim().is_empty() {
            break;
        }
        end = state.line_ending_end(next_line_end);
    }
    Some(RuleMatch::BlankLine { end })
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::BlankLine { end } = matched else {
        unreachable!("blank_line handler received a non-blank_line match")
    };
    let lines = state.lines_in(end);
    state.append_token(Token::BlankLine);
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "blank_line",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whitespace_only_line() {
        let state = BlockState::new("   \nnext");
        assert!(matcher(&state).is_some());
    }

    #[test]
    fn does_not_match_content_line() {
        let state = BlockState::new("text\n");
        assert!(matcher(&state).is_none());
    }

    #[test]
    fn handler_advances_past_the_blank_line() {
        let mut state = BlockState::new("\nafter");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        assert_eq!(state.cursor, 1);
        assert_eq!(state.tokens, vec![Token::BlankLine]);
    }
}
