// End-to-end scenarios over the full block parser, distinct from the
// per-rule unit tests: these exercise the driver, container recursion, and
// the link-reference table together the way a real document would.

use marco_blocks::{BlockParser, BlockParserConfig, Token};

#[test]
fn tight_list_demotes_paragraphs_via_render_bridge() {
    use marco_blocks::render::{bridge, InlineParser, Rendered};

    struct Identity;
    impl InlineParser for Identity {
        type Inline = String;
        fn parse_inline(&self, text: &str) -> String {
            text.to_string()
        }
    }

    let parser = BlockParser::default();
    let tokens = parser.parse("- a\n- b\n");
    let rendered = bridge(tokens, &Identity);

    match &rendered[0] {
        Rendered::List { tight, children, .. } => {
            assert!(*tight);
            for item in children {
                match item {
                    Rendered::ListItem { children, .. } => {
                        assert!(matches!(children[0], Rendered::BlockText { .. }));
                    }
                    other => panic!("expected list item, got {other:?}"),
                }
            }
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn loose_list_keeps_paragraphs_and_blank_line_token() {
    let parser = BlockParser::default();
    let tokens = parser.parse("- a\n\n- b\n");
    match &tokens[0] {
        Token::List { tight, children, .. } => {
            assert!(!tight);
            match &children[0] {
                Token::ListItem { children, .. } => {
                    assert_eq!(children.len(), 2);
                    assert!(matches!(children[0], Token::Paragraph { .. }));
                    assert!(matches!(children[1], Token::BlankLine));
                }
                other => panic!("expected list item, got {other:?}"),
            }
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn lazy_block_quote_continuation_merges_into_quoted_paragraph() {
    let parser = BlockParser::default();
    let tokens = parser.parse("> foo\nbar\n");
    match &tokens[0] {
        Token::BlockQuote { children } => match &children[0] {
            Token::Paragraph { text } => assert_eq!(text, "foo\nbar"),
            other => panic!("expected paragraph, got {other:?}"),
        },
        other => panic!("expected block quote, got {other:?}"),
    }
}

#[test]
fn strict_block_quote_around_indented_code_does_not_lazy_continue() {
    let parser = BlockParser::default();
    let tokens = parser.parse(">     code\n    code2\n");
    match &tokens[0] {
        Token::BlockQuote { children } => match &children[0] {
            Token::BlockCode { raw, .. } => assert_eq!(raw, "code"),
            other => panic!("expected block code, got {other:?}"),
        },
        other => panic!("expected block quote, got {other:?}"),
    }
    match &tokens[1] {
        Token::BlockCode { raw, .. } => assert_eq!(raw, "code2"),
        other => panic!("expected a second, unquoted block code, got {other:?}"),
    }
}

#[test]
fn blank_line_inside_quote_disables_lazy_continuation_for_next_line() {
    let parser = BlockParser::default();
    let tokens = parser.parse("> foo\n>\nbar\n");
    match &tokens[0] {
        Token::BlockQuote { children } => match &children[0] {
            Token::Paragraph { text } => assert_eq!(text, "foo"),
            other => panic!("expected paragraph, got {other:?}"),
        },
        other => panic!("expected block quote, got {other:?}"),
    }
    match &tokens[1] {
        Token::Paragraph { text } => assert_eq!(text, "bar"),
        other => panic!("expected a second, unquoted paragraph, got {other:?}"),
    }
}

#[test]
fn fenced_code_close_requires_at_least_the_opening_fences_length() {
    let parser = BlockParser::default();
    // A closing fence must have >= as many backticks as the opening fence;
    // a shorter run of backticks inside a longer-fenced block is just
    // content, not a close.
    let tokens = parser.parse("````\n```\ncode\n```\n````\n");
    match &tokens[0] {
        Token::BlockCode { raw, .. } => assert_eq!(raw, "```\ncode\n```"),
        other => panic!("expected block code, got {other:?}"),
    }
}

#[test]
fn ordered_list_starting_at_one_interrupts_a_paragraph_but_other_starts_do_not() {
    let parser = BlockParser::default();

    let tokens = parser.parse("para\n1. item\n");
    assert!(
        matches!(tokens.get(1), Some(Token::List { .. })),
        "expected `1.` to interrupt the paragraph, got {tokens:?}"
    );

    let tokens = parser.parse("para\n2. item\n");
    assert_eq!(tokens.len(), 1);
    match &tokens[0] {
        Token::Paragraph { text } => assert_eq!(text, "para\n2. item"),
        other => panic!("expected a single merged paragraph, got {other:?}"),
    }
}

#[test]
fn setext_underline_without_a_preceding_paragraph_is_plain_text() {
    let parser = BlockParser::default();
    let tokens = parser.parse("===\n");
    assert_eq!(
        tokens,
        vec![Token::Paragraph {
            text: "===".to_string()
        }]
    );
}

#[test]
fn max_nested_level_stops_block_quote_descent_and_leaves_paragraph_text() {
    let config = BlockParserConfig {
        max_nested_level: 2,
        ..BlockParserConfig::default()
    };
    let parser = BlockParser::new(config);
    let tokens = parser.parse("> > > x\n");

    fn quote_depth(tokens: &[Token]) -> usize {
        match tokens.first() {
            Some(Token::BlockQuote { children }) => 1 + quote_depth(children),
            _ => 0,
        }
    }
    assert_eq!(quote_depth(&tokens), 2);
}

#[test]
fn leading_blank_lines_only_add_a_single_blank_line_token() {
    let parser = BlockParser::default();
    let tokens = parser.parse("\n\n\nfoo\n");
    assert_eq!(
        tokens,
        vec![
            Token::BlankLine,
            Token::Paragraph {
                text: "foo".to_string()
            },
        ]
    );
}
