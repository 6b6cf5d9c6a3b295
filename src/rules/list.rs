// List. `cm_list::list` parses every item of one marker-consistent run in
// a single call (it already knows how to tell a sibling item from a lazy
// continuation line), so the handler's job is turning that flat
// `Vec<ListItemData>` into a `List` token: compute tight/loose from the
// blank-line flags the grammar already tracked, dedent each item's content
// by its own marker width, and recurse a child parse per item.

use std::sync::Arc;

use crate::grammar::blocks::{list, ListMarker};
use crate::grammar::Span;
use crate::rules::RuleMatch;
use crate::ruler::{HandlerFn, MatcherFn, RuleEntry};
use crate::state::{BlockContext, BlockState};
use crate::tab::dedent_lines;
use crate::token::Token;
use crate::BlockParser;

pub fn matcher(state: &BlockState) -> Option<RuleMatch> {
    let remaining = state.remaining();
    let (rest, items) = list(Span::new(remaining)).ok()?;

    let in_open_paragraph = matches!(state.last_token(), Some(tok) if tok.is_paragraph());
    if in_open_paragraph {
        let (marker, first_content, ..) = &items[0];
        let first_item_is_empty = first_content.fragment().trim().is_empty();
        if first_item_is_empty {
            return None;
        }
        if let ListMarker::Ordered { number, .. } = marker {
            if *number != 1 {
                return None;
            }
        }
    }

    let consumed = remaining.len() - rest.fragment().len();
    Some(RuleMatch::List {
        end: state.cursor + consumed,
    })
}

pub fn handler(matched: RuleMatch, state: &mut BlockState, parser: &BlockParser) -> Option<usize> {
    let RuleMatch::List { end } = matched else {
        unreachable!("list handler received a non-list match")
    };
    let lines = state.lines_in(end);
    let remaining = state.remaining();
    // Re-run the grammar function rather than thread its Vec through
    // RuleMatch: list items hold borrowed Spans into `remaining`, which
    // would tie RuleMatch to a lifetime every other variant is free of.
    let (_, items) = list(Span::new(remaining)).expect("matcher already proved this parses");

    let ordered = matches!(items[0].0, ListMarker::Ordered { .. });
    let start = match items[0].0 {
        ListMarker::Ordered { number, .. } => Some(number as u64),
        ListMarker::Bullet(_) => None,
    };
    let tight = !items.iter().any(|(_, _, has_blank_in, has_blank_after, _)| {
        *has_blank_in || *has_blank_after
    });

    let mut children = Vec::with_capacity(items.len());
    for (_, content, _, _, content_indent) in &items {
        let start_offset = content.location_offset();
        let end_offset = start_offset + content.fragment().len();
        let start_line = state.line + remaining[..start_offset.min(remaining.len())].matches('\n').count();
        let end_line = state.line + remaining[..end_offset.min(remaining.len())].matches('\n').count();

        let dedented = dedent_lines(content.fragment(), *content_indent);
        let mut child = state.child(dedented, BlockContext::ListItem);
        parser.run(&mut child);
        children.push(Token::ListItem {
            depth: state.depth + 1,
            tight,
            start_line,
            end_line,
            children: child.tokens,
        });
    }

    state.append_token(Token::List {
        ordered,
        start,
        depth: state.depth + 1,
        tight,
        children,
    });
    state.advance_to(end, lines);
    Some(end)
}

pub fn entry() -> RuleEntry {
    let matcher: MatcherFn = matcher;
    let handler: HandlerFn = Arc::new(handler);
    RuleEntry {
        name: "list",
        matcher,
        handler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_list_starting_above_one_does_not_interrupt_a_paragraph() {
        let mut state = BlockState::new("para\n2. item\n");
        state.add_paragraph("para");
        state.cursor = 5; // past "para\n"
        assert!(matcher(&state).is_none());
    }

    #[test]
    fn ordered_list_starting_at_one_does_interrupt_a_paragraph() {
        let mut state = BlockState::new("para\n1. item\n");
        state.add_paragraph("para");
        state.cursor = 5;
        assert!(matcher(&state).is_some());
    }

    #[test]
    fn bullet_list_always_interrupts_a_paragraph() {
        let mut state = BlockState::new("para\n- item\n");
        state.add_paragraph("para");
        state.cursor = 5;
        assert!(matcher(&state).is_some());
    }

    #[test]
    fn empty_list_item_never_interrupts_a_paragraph() {
        let mut state = BlockState::new("para\n-\nmore\n");
        state.add_paragraph("para");
        state.cursor = 5;
        assert!(matcher(&state).is_none());
    }

    #[test]
    fn handler_builds_tight_bullet_list() {
        let mut state = BlockState::new("- one\n- two\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        match &state.tokens[0] {
            Token::List {
                ordered,
                tight,
                children,
                ..
            } => {
                assert!(!ordered);
                assert!(tight);
                assert_eq!(children.len(), 2);
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn handler_detects_loose_list_from_blank_between_items() {
        let mut state = BlockState::new("- one\n\n- two\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        match &state.tokens[0] {
            Token::List { tight, .. } => assert!(!tight),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn ordered_list_captures_start_number() {
        let mut state = BlockState::new("7. seven\n8. eight\n");
        let m = matcher(&state).unwrap();
        let parser = BlockParser::default();
        handler(m, &mut state, &parser);
        match &state.tokens[0] {
            Token::List { ordered, start, .. } => {
                assert!(ordered);
                assert_eq!(*start, Some(7));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }
}
