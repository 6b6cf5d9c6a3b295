// Link reference definition. Produces no token: it only mutates the
// shared `Env` link table (§9 — modeled as a reference-counted,
// interior-mutable map so a definition three containers deep is visible
// at the top level). Cannot interrupt an open paragraph, same reasoning
// as `indent_code`.

use std::sync::Arc;

use crate::grammar::blocks::link_reference_definition;
use crate::grammar::Span;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    if matches!(state.last_token(), Some(tok) if tok.is_paragraph()) {
        return None;
    }
    let remaining = state.remaining();
    let (rest, (label, url, title)) = link_reference_definition(Span::new(remaining)).ok()?;
    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::RefLink {
        label,
        url,
        title,
        end: state.cursor + consumed,
    })
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::RefLink {
        label,
        url,
        title,
        end,
    } = matched
    else {
        unreachable!("ref_link handler received a non-ref_link match")
    };
    let lines = state.lines_in(end);
    state.env.define_ref_link(&label, url, title);
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "ref_link",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declines_mid_paragraph() {
        let mut state = BlockState::new("[foo]: /url\n");
        state.add_paragraph("text");
        assert!(matcher(&state).is_none());
    }

    #[test]
    fn handler_registers_definition_and_emits_no_token() {
        let mut state = BlockState::new("[foo]: /url \"t\"\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        assert!(state.tokens.is_empty());
        assert_eq!(state.env.ref_link("foo").unwrap().url, "/url");
    }
}
