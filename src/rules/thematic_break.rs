use std::sync::Arc;

use crate::grammar::blocks::thematic_break as grammar_thematic_break;
use crate::grammar::Span;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::token::Token;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    let remaining = state.remaining();
    let (rest, _) = grammar_thematic_break(Span::new(remaining)).ok()?;
    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::ThematicBreak {
        end: state.cursor + consumed,
    })
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::ThematicBreak { end } = matched else {
        unreachable!("thematic_break handler received a non-thematic_break match")
    };
    let lines = state.lines_in(end);
    state.append_token(Token::ThematicBreak);
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "thematic_break",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_hyphen_rule() {
        let state = BlockState::new("---\nnext\n");
        assert!(matcher(&state).is_some());
    }

    #[test]
    fn handler_emits_thematic_break_token() {
        let mut state = BlockState::new("***\nnext\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        assert_eq!(state.tokens, vec![Token::ThematicBreak]);
    }
}
