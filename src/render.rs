// Render Bridge: the seam between this crate's block tokens and whatever
// inline parser/renderer a caller plugs in (§4.7). The block parser never
// looks inside `text`/`raw` fields itself; the bridge walks the token tree
// depth-first, handing every unparsed `text` field to an `InlineParser`,
// and demotes paragraphs that live inside a tight list item to
// `BlockText` (CommonMark: a tight list renders its items' sole paragraph
// without the surrounding `<p>`).

use crate::token::Token;

/// Parses a block's unparsed inline text into whatever representation a
/// caller's inline parser produces (inline AST, a pre-rendered string,
/// anything). This crate only calls it; it never defines one.
pub trait InlineParser {
    type Inline;
    fn parse_inline(&self, text: &str) -> Self::Inline;
}

/// The block tree again, but with every `text` replaced by its parsed
/// inline representation `I`, and tight-list paragraphs already demoted.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<I> {
    BlankLine,
    ThematicBreak,
    Heading { level: u8, inline: I },
    BlockCode { raw: String, info: Option<String> },
    Paragraph { inline: I },
    BlockText { inline: I },
    BlockQuote { children: Vec<Rendered<I>> },
    List {
        ordered: bool,
        start: Option<u64>,
        tight: bool,
        children: Vec<Rendered<I>>,
    },
    ListItem {
        tight: bool,
        children: Vec<Rendered<I>>,
    },
    BlockHtml { raw: String },
}

/// Turns a finished `Rendered<I>` tree into a caller-chosen output format
/// `C` (an HTML string, a different document model, anything downstream).
pub trait Renderer<I> {
    type Output;
    fn render(&self, tree: &[Rendered<I>]) -> Self::Output;
}

/// Walk a document's top-level tokens through the render bridge.
pub fn bridge<P: InlineParser>(tokens: Vec<Token>, inline: &P) -> Vec<Rendered<P::Inline>> {
    tokens
        .into_iter()
        .map(|tok| bridge_one(tok, inline, false))
        .collect()
}

fn bridge_one<P: InlineParser>(token: Token, inline: &P, in_tight_list: bool) -> Rendered<P::Inline> {
    match token {
        Token::BlankLine => Rendered::BlankLine,
        Token::ThematicBreak => Rendered::ThematicBreak,
        Token::Heading { level, text } => Rendered::Heading {
            level,
            inline: inline.parse_inline(&text),
        },
        Token::BlockCode { raw, info } => Rendered::BlockCode { raw, info },
        Token::Paragraph { text } if in_tight_list => Rendered::BlockText {
            inline: inline.parse_inline(&text),
        },
        Token::Paragraph { text } => Rendered::Paragraph {
            inline: inline.parse_inline(&text),
        },
        Token::BlockText { text } => Rendered::BlockText {
            inline: inline.parse_inline(&text),
        },
        Token::BlockQuote { children } => Rendered::BlockQuote {
            children: children
                .into_iter()
                .map(|c| bridge_one(c, inline, false))
                .collect(),
        },
        Token::List {
            ordered,
            start,
            tight,
            children,
            ..
        } => Rendered::List {
            ordered,
            start,
            tight,
            children: children
                .into_iter()
                .map(|c| bridge_one(c, inline, tight))
                .collect(),
        },
        Token::ListItem { tight, children, .. } => Rendered::ListItem {
            tight,
            children: children
                .into_iter()
                .map(|c| bridge_one(c, inline, tight))
                .collect(),
        },
        Token::BlockHtml { raw } => Rendered::BlockHtml { raw },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Identity;
    impl InlineParser for Identity {
        type Inline = String;
        fn parse_inline(&self, text: &str) -> String {
            text.to_string()
        }
    }

    #[test]
    fn tight_list_paragraph_demotes_to_block_text() {
        let tokens = vec![Token::List {
            ordered: false,
            start: None,
            depth: 1,
            tight: true,
            children: vec![Token::ListItem {
                depth: 1,
                tight: true,
                start_line: 1,
                end_line: 1,
                children: vec![Token::Paragraph {
                    text: "item".to_string(),
                }],
            }],
        }];
        let rendered = bridge(tokens, &Identity);
        match &rendered[0] {
            Rendered::List { children, .. } => match &children[0] {
                Rendered::ListItem { children, .. } => {
                    assert!(matches!(children[0], Rendered::BlockText { .. }));
                }
                other => panic!("expected list item, got {other:?}"),
            },
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn loose_list_paragraph_stays_a_paragraph() {
        let tokens = vec![Token::List {
            ordered: false,
            start: None,
            depth: 1,
            tight: false,
            children: vec![Token::ListItem {
                depth: 1,
                tight: false,
                start_line: 1,
                end_line: 1,
                children: vec![Token::Paragraph {
                    text: "item".to_string(),
                }],
            }],
        }];
        let rendered = bridge(tokens, &Identity);
        match &rendered[0] {
            Rendered::List { children, .. } => match &children[0] {
                Rendered::ListItem { children, .. } => {
                    assert!(matches!(children[0], Rendered::Paragraph { .. }));
                }
                other => panic!("expected list item, got {other:?}"),
            },
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn top_level_paragraph_is_never_demoted() {
        let tokens = vec![Token::Paragraph {
            text: "hi".to_string(),
        }];
        let rendered = bridge(tokens, &Identity);
        assert!(matches!(rendered[0], Rendered::Paragraph { .. }));
    }
}
