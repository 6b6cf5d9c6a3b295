// Raw HTML block: CommonMark's seven HTML-block start conditions, tried in
// spec order. Types 1-6 can interrupt a paragraph; type 7 (a complete,
// well-formed tag alone on its line) cannot, so it's skipped whenever a
// paragraph is open.

use std::sync::Arc;

use crate::grammar::blocks::{
    html_block_tag, html_cdata, html_comment, html_complete_tag, html_declaration,
    html_processing_instruction, html_special_tag,
};
use crate::grammar::Span;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::BlockState;
use crate::token::Token;
use crate::BlockParser;

type HtmlParser = fn(Span) -> nom::IResult<Span, Span>;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    let remaining = state.remaining();
    let in_paragraph = matches!(state.last_token(), Some(tok) if tok.is_paragraph());

    let mut parsers: Vec<HtmlParser> = vec![
        html_special_tag,
        html_comment,
        html_processing_instruction,
        html_declaration,
        html_cdata,
        html_block_tag,
    ];
    if !in_paragraph {
        parsers.push(html_complete_tag);
    }

    for parse in parsers {
        if let Ok((rest, content)) = parse(Span::new(remaining)) {
            let consumed = remaining.len() - rest.fragment().len();
            return Some(RuleMatch::BlockHtml {
                raw: content.fragment().to_string(),
                end: state.cursor + consumed,
            });
        }
    }
    None
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, _parser: &BlockParser) -> Option<usize> {
    let RuleMatch::BlockHtml { raw, end } = matched else {
        unreachable!("html_block handler received a non-html_block match")
    };
    let lines = state.lines_in(end);
    state.append_token(Token::BlockHtml { raw });
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "html_block",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_comment() {
        let state = BlockState::new("<!-- hi -->\nmore\n");
        match matcher(&state).unwrap() {
            RuleMatch::BlockHtml { raw, .. } => assert!(raw.contains("hi")),
            other => panic!("unexpected match {other:?}"),
        }
    }

    #[test]
    fn complete_tag_declines_mid_paragraph() {
        let mut state = BlockState::new("<div>\n");
        state.add_paragraph("text");
        // <div> alone still matches html_block_tag (type 6), not just type 7.
        assert!(matcher(&state).is_some());
    }

    #[test]
    fn handler_emits_block_html_token() {
        let mut state = BlockState::new("<!-- c -->\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        assert_eq!(
            state.tokens,
            vec![Token::BlockHtml {
                raw: "<!-- c -->\n".to_string()
            }]
        );
    }
}
