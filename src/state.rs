// BlockState: the cursor, token accumulator, and environment a single parse
// pass over one slice of source text carries. Container rules (block quote,
// list item) create a child state over a de-indented sub-slice and graft its
// finished `tokens` on as `children` of their own token.
//
// The source is held as `Rc<str>` rather than a borrowed `&str`: container
// content is never a substring of the original buffer (quote markers and
// list-item indentation are stripped first), so a child state necessarily
// owns fresh text. `Rc<str>` keeps that ownership cheap to clone for
// grandchildren without threading a lifetime parameter through the whole
// rule/handler/ruler stack.

use std::rc::Rc;

use crate::env::Env;
use crate::token::Token;

/// What kind of container a state's tokens are being collected for. Rules
/// that change behavior near a container boundary consult this instead of
/// re-deriving it from a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockContext {
    Document,
    BlockQuote,
    ListItem,
}

pub struct BlockState {
    pub source: Rc<str>,
    pub cursor: usize,
    pub cursor_max: usize,
    pub tokens: Vec<Token>,
    pub env: Env,
    pub line: usize,
    pub line_root: usize,
    pub depth: usize,
    pub in_block: BlockContext,
    pub list_tight: bool,
}

impl BlockState {
    pub fn new(source: impl Into<Rc<str>>) -> Self {
        let source = source.into();
        let cursor_max = source.len();
        Self {
            source,
            cursor: 0,
            cursor_max,
            tokens: Vec::new(),
            env: Env::new(),
            line: 1,
            line_root: 1,
            depth: 0,
            in_block: BlockContext::Document,
            list_tight: true,
        }
    }

    /// A state for a container's own (already de-indented) content, sharing
    /// this state's `env` (link table) and one level deeper.
    pub fn child(&self, source: impl Into<Rc<str>>, in_block: BlockContext) -> Self {
        let source = source.into();
        let cursor_max = source.len();
        Self {
            source,
            cursor: 0,
            cursor_max,
            tokens: Vec::new(),
            env: self.env.clone(),
            line: self.line,
            line_root: self.line,
            depth: self.depth + 1,
            in_block,
            list_tight: true,
        }
    }

    pub fn at_end(&self) -> bool {
        self.cursor >= self.cursor_max
    }

    pub fn remaining(&self) -> &str {
        &self.source[self.cursor..]
    }

    /// Offset of the end of the current logical line (before its line
    /// ending), or `cursor_max` if the cursor is on the last, unterminated
    /// line.
    pub fn find_line_end(&self) -> usize {
        match self.remaining().find('\n') {
            Some(rel) => self.cursor + rel,
            None => self.cursor_max,
        }
    }

    /// Offset just past the line ending that follows `line_end` (handles a
    /// bare `\n`; CRLF is normalized away before the parser ever sees text,
    /// per the preprocessor contract in §1).
    pub fn line_ending_end(&self, line_end: usize) -> usize {
        if line_end < self.cursor_max && self.source.as_bytes()[line_end] == b'\n' {
            line_end + 1
        } else {
            line_end
        }
    }

    /// Offset of the cursor's current logical line including its line
    /// ending, i.e. where the cursor lands after consuming exactly one line.
    /// Rule matchers that only need to claim one line (blank line, ATX
    /// heading, thematic break) compute their match `end` from this.
    pub fn current_line_end_inclusive(&self) -> usize {
        self.line_ending_end(self.find_line_end())
    }

    /// Number of line endings within `self.get_text(end)`, used by handlers
    /// to tell `advance_to` how many source lines a multi-line match spans.
    pub fn lines_in(&self, end: usize) -> usize {
        self.get_text(end).matches('\n').count().max(1)
    }

    pub fn get_text(&self, end: usize) -> &str {
        &self.source[self.cursor..end]
    }

    pub fn append_token(&mut self, tok: Token) {
        self.tokens.push(tok);
    }

    /// Insert `tok` before `before_index` (used when a break rule already
    /// ran its own handler and appended tokens that must still come *after*
    /// the container token that logically precedes them in source order).
    pub fn prepend_token(&mut self, tok: Token, before_index: usize) {
        let idx = before_index.min(self.tokens.len());
        self.tokens.insert(idx, tok);
    }

    pub fn last_token(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub fn last_token_mut(&mut self) -> Option<&mut Token> {
        self.tokens.last_mut()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// If the last emitted token is an open paragraph, append the current
    /// logical line to it and advance the cursor past the line (and its
    /// ending). Returns the new cursor, or `None` if there is no open
    /// paragraph to extend. This is how indented code and malformed ref
    /// links "belong to the paragraph" instead of starting a new block.
    pub fn append_paragraph(&mut self) -> Option<usize> {
        let line_end = self.find_line_end();
        let line = self.get_text(line_end).to_string();
        let advance_to = self.line_ending_end(line_end);
        match self.tokens.last_mut() {
            Some(Token::Paragraph { text }) => {
                text.push('\n');
                text.push_str(&line);
                self.cursor = advance_to;
                self.line += 1;
                Some(self.cursor)
            }
            _ => None,
        }
    }

    /// Start a new paragraph token, or extend the current one if the last
    /// token is already an open paragraph (adjacent plain-text lines merge
    /// into a single paragraph).
    pub fn add_paragraph(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match self.tokens.last_mut() {
            Some(Token::Paragraph { text: existing }) => {
                existing.push('\n');
                existing.push_str(text);
            }
            _ => self.tokens.push(Token::Paragraph {
                text: text.to_string(),
            }),
        }
    }

    /// Flush exactly one logical line as paragraph text and advance past it.
    /// This is the driver's guaranteed-progress fallback (§4.6.d, §7): used
    /// whenever no rule matches, or a matched rule's handler declines.
    pub fn flush_line_as_paragraph(&mut self) {
        let line_end = self.find_line_end();
        let line = self.get_text(line_end).to_string();
        self.add_paragraph(&line);
        self.cursor = self.line_ending_end(line_end);
        self.line += 1;
    }

    /// Advance the cursor to an absolute offset produced by a rule handler.
    /// Debug-asserts progress (invariant §3.2): a handler that returns a
    /// cursor failing to advance is a bug, not malformed input.
    pub fn advance_to(&mut self, pos: usize, line_delta: usize) {
        debug_assert!(
            pos > self.cursor,
            "rule handler failed to advance the cursor"
        );
        self.cursor = pos;
        self.line += line_delta.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_paragraph_merges_lazy_continuation_line() {
        let mut state = BlockState::new("foo\nbar\n");
        state.add_paragraph("foo");
        state.cursor = 4; // past "foo\n"
        let new_cursor = state.append_paragraph();
        assert_eq!(new_cursor, Some(8));
        match state.last_token().unwrap() {
            Token::Paragraph { text } => assert_eq!(text, "foo\nbar"),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn append_paragraph_returns_none_without_open_paragraph() {
        let mut state = BlockState::new("foo\n");
        assert_eq!(state.append_paragraph(), None);
    }

    #[test]
    fn flush_line_as_paragraph_guarantees_progress() {
        let mut state = BlockState::new("a\nb\n");
        state.flush_line_as_paragraph();
        assert_eq!(state.cursor, 2);
        state.flush_line_as_paragraph();
        assert_eq!(state.cursor, 4);
        match state.last_token().unwrap() {
            Token::Paragraph { text } => assert_eq!(text, "a\nb"),
            other => panic!("expected merged paragraph, got {other:?}"),
        }
    }

    #[test]
    fn child_state_shares_env_and_increments_depth() {
        let parent = BlockState::new("> quote\n");
        parent.env.define_ref_link("a", "/a".to_string(), None);
        let child = parent.child("quote\n", BlockContext::BlockQuote);
        assert_eq!(child.depth, 1);
        assert_eq!(child.env.ref_link("a").unwrap().url, "/a");
    }
}
