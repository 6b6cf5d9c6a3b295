// The block parser's output: a closed set of block-level tokens.
//
// A `Token` is a tagged record, matching the stable external schema: every
// token carries a `type` discriminator plus the fields appropriate to its
// variant (`text` for inline-unparsed content, `raw` for verbatim
// source substrings, `children` for containers). Serialization is derived
// directly from this shape so the schema stays in lockstep with the type.

use serde::{Deserialize, Serialize};

/// A single block-level token produced by the block parser.
///
/// `text` fields are unparsed markdown, handed to the inline parser during
/// the render bridge (see `crate::render`). `raw` fields are verbatim source
/// substrings (never touched by the inline parser). `children` holds nested
/// tokens for the container variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    BlankLine,
    ThematicBreak,
    Heading {
        level: u8,
        text: String,
    },
    BlockCode {
        raw: String,
        info: Option<String>,
    },
    Paragraph {
        text: String,
    },
    /// A paragraph demoted by the render bridge because it sits inside a
    /// tight list item. Never emitted directly by the block parser.
    BlockText {
        text: String,
    },
    BlockQuote {
        children: Vec<Token>,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        depth: usize,
        tight: bool,
        children: Vec<Token>,
    },
    ListItem {
        depth: usize,
        tight: bool,
        start_line: usize,
        end_line: usize,
        children: Vec<Token>,
    },
    BlockHtml {
        raw: String,
    },
}

impl Token {
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Token::Paragraph { .. })
    }

    /// Mutable access to the `text` field, for rules that extend or rewrite
    /// the most recently emitted paragraph (`append_paragraph`, setext
    /// rewrite).
    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Token::Heading { text, .. } | Token::Paragraph { text } | Token::BlockText { text } => {
                Some(text)
            }
            _ => None,
        }
    }

    pub fn children(&self) -> Option<&[Token]> {
        match self {
            Token::BlockQuote { children }
            | Token::List { children, .. }
            | Token::ListItem { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Token>> {
        match self {
            Token::BlockQuote { children }
            | Token::List { children, .. }
            | Token::ListItem { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Rewrite this token in place into a setext heading, consuming its
    /// paragraph text. Panics if called on a non-paragraph; callers must
    /// check `is_paragraph` (or `last_token`) first.
    pub fn rewrite_paragraph_to_heading(&mut self, level: u8) {
        let text = match std::mem::replace(self, Token::BlankLine) {
            Token::Paragraph { text } => text,
            other => {
                *self = other;
                panic!("rewrite_paragraph_to_heading called on a non-paragraph token");
            }
        };
        *self = Token::Heading { level, text };
    }
}
