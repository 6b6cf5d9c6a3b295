// Block quote. The grammar function (`cm_blockquote::blockquote`) already
// stops precisely at an interrupting construct or blank line and includes
// lazy-continuation lines verbatim, so the handler's own job is just
// stripping markers (`dequote`) and recursing a child parse over what's
// left — no `prepend_token` needed in this path, since nothing the
// grammar matched ever needs to be re-split across the container
// boundary after the fact.

use std::sync::Arc;

use crate::grammar::blocks::blockquote;
use crate::grammar::Span;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::{BlockContext, BlockState};
use crate::token::Token;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    let remaining = state.remaining();
    let (rest, _) = blockquote(Span::new(remaining)).ok()?;
    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::BlockQuote {
        end: state.cursor + consumed,
    })
}

/// Strip each quoted line's `>` marker (and the one optional space after
/// it); lazy-continuation lines, which never carry a marker, pass through
/// untouched.
fn dequote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut lines = raw.split('\n').peekable();
    while let Some(line) = lines.next() {
        let trimmed = line.trim_start_matches(' ');
        let leading = line.len() - trimmed.len();
        if leading <= 3 && trimmed.starts_with('>') {
            let after_marker = &trimmed[1..];
            let after_space = after_marker.strip_prefix(' ').unwrap_or(after_marker);
            out.push_str(after_space);
        } else {
            out.push_str(line);
        }
        if lines.peek().is_some() {
            out.push('\n');
        }
    }
    out
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, parser: &BlockParser) -> Option<usize> {
    let RuleMatch::BlockQuote { end } = matched else {
        unreachable!("block_quote handler received a non-block_quote match")
    };
    let lines = state.lines_in(end);
    let raw = state.get_text(end).to_string();
    let mut child = state.child(dequote(&raw), BlockContext::BlockQuote);
    parser.run(&mut child);
    state.append_token(Token::BlockQuote {
        children: child.tokens,
    });
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "block_quote",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequote_strips_marker_and_one_space() {
        assert_eq!(dequote("> foo\n>bar\nlazy"), "foo\nbar\nlazy");
    }

    #[test]
    fn handler_recurses_and_wraps_children() {
        let mut state = BlockState::new("> # Title\n> body\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        match &state.tokens[0] {
            Token::BlockQuote { children } => {
                assert!(matches!(children[0], Token::Heading { level: 1, .. }));
            }
            other => panic!("expected block quote, got {other:?}"),
        }
    }
}
