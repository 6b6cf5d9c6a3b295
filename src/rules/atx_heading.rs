use std::sync::Arc;

use crate::grammar::blocks::heading;
use crate::grammar::Span;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::token::Token;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    let remaining = state.remaining();
    let (rest, (level, text)) = heading(Span::new(remaining)).ok()?;
    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::AtxHeading {
        level,
        text: text.fragment().trim().to_string(),
        end: state.cursor + consumed,
    })
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::AtxHeading { level, text, end } = matched else {
        unreachable!("atx_heading handler received a non-atx_heading match")
    };
    let lines = state.lines_in(end);
    state.append_token(Token::Heading { level, text });
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "atx_heading",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_and_trims_heading_text() {
        let state = BlockState::new("## Title ##\nbody\n");
        match matcher(&state).unwrap() {
            RuleMatch::AtxHeading { level, text, .. } => {
                assert_eq!(level, 2);
                assert_eq!(text, "Title");
            }
            other => panic!("unexpected match {other:?}"),
        }
    }

    #[test]
    fn rejects_hashtag_like_text() {
        let state = BlockState::new("#no-space\n");
        assert!(matcher(&state).is_none());
    }

    #[test]
    fn handler_emits_heading_token_and_advances() {
        let mut state = BlockState::new("# Hi\nmore\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        assert_eq!(
            state.tokens,
            vec![Token::Heading {
                level: 1,
                text: "Hi".to_string()
            }]
        );
        assert_eq!(state.get_text(state.cursor_max), "more\n");
    }
}
