// Parser Driver: steps through one `BlockState` line by line, trying the
// configured rules in order at each cursor position, falling back to
// paragraph-flush when nothing matches (§4.6, §7 — the fallback is what
// guarantees forward progress on any input, well-formed or not).
//
// Grounded in the teacher's `parser::blocks::parse_blocks_internal` driver
// loop shape (try matchers against `ParserState`, mutate, advance), adapted
// from its Node-tree accumulation to token emission plus the matcher/
// handler split described in `crate::rules`.

use std::collections::HashMap;
use std::rc::Rc;

use crate::env::Env;
use crate::ruler::{Ruler, RuleEntry};
use crate::rules::{self, DEFAULT_RULE_ORDER};
use crate::state::BlockState;
use crate::token::Token;

/// The result of parsing a complete document: its top-level tokens plus the
/// `Env` they were collected under (link reference table included). A
/// container's nested tokens already carry their own copies of the same
/// shared `Env` internally; this is only needed at the boundary where a
/// caller hands the tree off to an inline parser (§4.7, §6).
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub tokens: Vec<Token>,
    pub env: Env,
}

/// Tunables for a `BlockParser` instance.
#[derive(Debug, Clone)]
pub struct BlockParserConfig {
    pub rule_order: Vec<&'static str>,
    /// Containers (`block_quote`, `list`) stop recursing once a state's
    /// depth reaches this; deeper content is left as literal paragraph
    /// text rather than risking unbounded recursion on adversarial input
    /// (§3 invariant 6).
    pub max_nested_level: usize,
}

impl Default for BlockParserConfig {
    fn default() -> Self {
        Self {
            rule_order: DEFAULT_RULE_ORDER.to_vec(),
            max_nested_level: 6,
        }
    }
}

pub struct BlockParser {
    registry: HashMap<&'static str, RuleEntry>,
    ruler: Ruler,
    config: BlockParserConfig,
}

impl BlockParser {
    pub fn new(config: BlockParserConfig) -> Self {
        Self {
            registry: rules::builtin_registry(),
            ruler: Ruler::new(),
            config,
        }
    }

    pub fn config(&self) -> &BlockParserConfig {
        &self.config
    }

    /// Register a rule under `entry.name`, replacing any existing rule of
    /// that name. `before`, if given, moves the name to just ahead of an
    /// existing entry in the dispatch order; otherwise a new name is
    /// appended at the end and an existing name keeps its position.
    /// Always invalidates the matcher cache (§4.8), since the resolved
    /// rule set for every cached rule-set key may now differ.
    pub fn register_rule(&mut self, entry: RuleEntry, before: Option<&'static str>) {
        let name = entry.name;
        self.registry.insert(name, entry);

        self.config.rule_order.retain(|n| *n != name);
        match before.and_then(|b| self.config.rule_order.iter().position(|n| *n == b)) {
            Some(idx) => self.config.rule_order.insert(idx, name),
            None => self.config.rule_order.push(name),
        }
        self.ruler.invalidate();
    }

    pub fn remove_rule(&mut self, name: &str) {
        self.registry.remove(name);
        self.config.rule_order.retain(|n| *n != name);
        self.ruler.invalidate();
    }

    /// Parse a complete document, returning its top-level tokens.
    pub fn parse(&self, source: impl Into<Rc<str>>) -> Vec<Token> {
        self.parse_document(source).tokens
    }

    /// Parse a complete document, keeping the document's `Env` alongside its
    /// tokens. Callers feeding the result to an inline parser need this: a
    /// usage's link lookup reads `env.ref_links`, which a bare `Vec<Token>`
    /// has no way to carry (§6 — "env is the state's environment, most
    /// importantly env.ref_links").
    pub fn parse_document(&self, source: impl Into<Rc<str>>) -> ParsedDocument {
        let mut state = BlockState::new(source);
        self.run(&mut state);
        ParsedDocument {
            tokens: state.tokens,
            env: state.env,
        }
    }

    /// Drive `state` to completion: try each active rule in order at the
    /// cursor, dispatch the first one whose matcher AND handler both
    /// accept, and otherwise flush one line as paragraph text. Containers
    /// (`block_quote`, `list`) call this recursively on a child state.
    pub fn run(&self, state: &mut BlockState) {
        while !state.at_end() {
            let mut active_order = self.config.rule_order.clone();
            if state.depth() >= self.config.max_nested_level {
                active_order.retain(|n| *n != "block_quote" && *n != "list");
            }

            let resolved = self.ruler.resolve(&self.registry, &active_order);

            let mut advanced = false;
            for rule in resolved.iter() {
                if let Some(matched) = (rule.matcher)(state) {
                    if (rule.handler)(matched, state, self).is_some() {
                        advanced = true;
                        break;
                    }
                }
            }

            if !advanced {
                state.flush_line_as_paragraph();
            }
        }
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new(BlockParserConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_document_exposes_ref_link_table_alongside_tokens() {
        let parser = BlockParser::default();
        let doc = parser.parse_document("[a]: /u \"t\"\n\n[a]\n");
        let link = doc.env.ref_link("a").expect("ref link should be defined");
        assert_eq!(link.url, "/u");
        assert_eq!(link.title.as_deref(), Some("t"));
        assert_eq!(
            doc.tokens,
            vec![Token::Paragraph {
                text: "[a]".to_string()
            }]
        );
    }

    #[test]
    fn parses_heading_then_paragraph() {
        let parser = BlockParser::default();
        let tokens = parser.parse("# Title\n\nBody text.\n");
        assert_eq!(
            tokens,
            vec![
                Token::Heading {
                    level: 1,
                    text: "Title".to_string()
                },
                Token::BlankLine,
                Token::Paragraph {
                    text: "Body text.".to_string()
                },
            ]
        );
    }

    #[test]
    fn lazy_paragraph_continuation_merges_lines() {
        let parser = BlockParser::default();
        let tokens = parser.parse("line one\nline two\n");
        assert_eq!(
            tokens,
            vec![Token::Paragraph {
                text: "line one\nline two".to_string()
            }]
        );
    }

    #[test]
    fn setext_underline_rewrites_preceding_paragraph() {
        let parser = BlockParser::default();
        let tokens = parser.parse("Title\n=====\n");
        assert_eq!(
            tokens,
            vec![Token::Heading {
                level: 1,
                text: "Title".to_string()
            }]
        );
    }

    #[test]
    fn nested_block_quote_and_list_recurse() {
        let parser = BlockParser::default();
        let tokens = parser.parse("> - item one\n> - item two\n");
        match &tokens[0] {
            Token::BlockQuote { children } => match &children[0] {
                Token::List { children, .. } => assert_eq!(children.len(), 2),
                other => panic!("expected list inside quote, got {other:?}"),
            },
            other => panic!("expected block quote, got {other:?}"),
        }
    }

    #[test]
    fn max_nested_level_stops_container_recursion() {
        let config = BlockParserConfig {
            max_nested_level: 1,
            ..BlockParserConfig::default()
        };
        let parser = BlockParser::new(config);
        // Depth starts at 0 for the root; a block quote nested inside a
        // block quote would need depth 1 to recurse again, which the
        // config above forbids.
        let tokens = parser.parse("> > nested\n");
        match &tokens[0] {
            Token::BlockQuote { children } => {
                assert!(!children.iter().any(|t| matches!(t, Token::BlockQuote { .. })));
            }
            other => panic!("expected block quote, got {other:?}"),
        }
    }

    #[test]
    fn register_rule_before_changes_dispatch_order() {
        use crate::ruler::RuleEntry;
        use crate::rules::RuleMatch;
        use std::sync::Arc;

        let mut parser = BlockParser::default();
        let entry = RuleEntry {
            name: "always_blank",
            matcher: |_state| Some(RuleMatch::BlankLine { end: 0 }),
            handler: Arc::new(|_m, state, _p| {
                // Decline unless truly at a blank line, to avoid an infinite loop
                // in this synthetic test rule.
                if state.get_text(state.find_line_end()).trim().is_empty() {
                    None
                } else {
                    None
                }
            }),
        };
        parser.register_rule(entry, Some("blank_line"));
        assert_eq!(parser.config().rule_order[0], "always_blank");
    }
}
