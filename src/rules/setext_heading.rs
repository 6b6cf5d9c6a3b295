// Setext heading: an underline line (`===` or `---`) retroactively turns
// the immediately preceding paragraph into a heading. Unlike the other
// rules, this one only fires when `state.last_token()` is an open
// paragraph — the content was already collected line-by-line by the
// paragraph fallback, so there is nothing left to parse except the
// underline itself (`cm_setext_heading::setext_underline_only`).

use std::sync::Arc;

use crate::grammar::blocks::setext_underline_only;
use crate::grammar::Span;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    if !matches!(state.last_token(), Some(tok) if tok.is_paragraph()) {
        return None;
    }
    let remaining = state.remaining();
    let (rest, level) = setext_underline_only(Span::new(remaining)).ok()?;
    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::SetextHeading {
        level,
        end: state.cursor + consumed,
    })
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::SetextHeading { level, end } = matched else {
        unreachable!("setext_heading handler received a non-setext_heading match")
    };
    let lines = state.lines_in(end);
    match state.last_token_mut() {
        Some(tok) if tok.is_paragraph() => tok.rewrite_paragraph_to_heading(level),
        _ => unreachable!("setext_heading matcher guarantees an open paragraph"),
    }
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "setext_heading",
        matcher,
        handler,
    }
}
