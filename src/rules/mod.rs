// Rule Handlers: one module per block construct. A rule is a (matcher,
// handler) pair registered under a name; `BlockParser` tries each rule in
// its configured order at the current cursor (see `crate::parser`).
//
// `RuleMatch` is the typed hand-off between the two halves: the matcher
// calls the real nom grammar function in `crate::grammar::blocks` once,
// and packages whatever it captured (plus the absolute cursor offset the
// match ends at) into a variant; the handler pattern-matches on it to
// decide what token(s) to emit and how far to advance. Keeping match and
// handle separate (rather than one big recognize-and-mutate function, as
// `parser::blocks::cm_*_parser.rs` used to do) means a rule can be replaced
// or reordered without touching the grammar it's built on.

pub mod atx_heading;
pub mod blank_line;
pub mod block_quote;
pub mod fenced_code;
pub mod html_block;
pub mod indent_code;
pub mod list;
pub mod ref_link;
pub mod setext_heading;
pub mod thematic_break;

use std::collections::HashMap;

use crate::ruler::RuleEntry;

/// What a rule's matcher found, captured once so the handler never has to
/// re-run the grammar function.
#[derive(Debug, Clone)]
pub enum RuleMatch {
    BlankLine {
        end: usize,
    },
    ThematicBreak {
        end: usize,
    },
    AtxHeading {
        level: u8,
        text: String,
        end: usize,
    },
    SetextHeading {
        level: u8,
        end: usize,
    },
    IndentCode {
        line: String,
        end: usize,
    },
    FencedCode {
        info: Option<String>,
        content: String,
        end: usize,
    },
    BlockQuote {
        end: usize,
    },
    List {
        end: usize,
    },
    RefLink {
        label: String,
        url: String,
        title: Option<String>,
        end: usize,
    },
    BlockHtml {
        raw: String,
        end: usize,
    },
}

/// Default rule order (§4.2 / §6): earlier rules get first refusal at each
/// cursor position. `setext_heading` sits ahead of `thematic_break` on
/// purpose — a lone `---` after an open paragraph is a setext underline,
/// not a horizontal rule, and ordering resolves the ambiguity without
/// either rule needing to know the other exists.
pub const DEFAULT_RULE_ORDER: &[&str] = &[
    "blank_line",
    "fenced_code",
    "indent_code",
    "atx_heading",
    "setext_heading",
    "thematic_break",
    "block_quote",
    "list",
    "ref_link",
    "html_block",
];

/// Build the registry of every built-in rule, keyed by name. `BlockParser`
/// seeds its registry from this and layers `register_rule` calls on top.
pub fn builtin_registry() -> HashMap<&'static str, RuleEntry> {
    let mut registry = HashMap::new();
    for entry in [
        blank_line::entry(),
        fenced_code::entry(),
        indent_code::entry(),
        atx_heading::entry(),
        setext_heading::entry(),
        thematic_break::entry(),
        block_quote::entry(),
        list::entry(),
        ref_link::entry(),
        html_block::entry(),
    ] {
        registry.insert(entry.name, entry);
    }
    registry
}
