// CommonMark-compatible block-level Markdown parser.
//
// Pipeline: grammar (nom recognizers) -> rules (match + emit) -> parser
// (driver loop) -> render (inline-parser/renderer bridge). The inline
// parser and the renderer themselves are external collaborators (see
// `render::InlineParser`, `render::Renderer`) this crate only calls.

pub mod env;
pub mod grammar;
pub mod html_escape;
pub mod logic;
pub mod parser;
pub mod render;
pub mod rules;
pub mod ruler;
pub mod state;
pub mod tab;
pub mod token;

// Re-export main API
pub use env::{Env, RefLink};
pub use parser::{BlockParser, BlockParserConfig, ParsedDocument};
pub use render::{bridge, InlineParser, Rendered, Renderer};
pub use rules::RuleMatch;
pub use state::{BlockContext, BlockState};
pub use token::Token;

// Re-export the one built-in ambient service consumers are expected to
// reach for directly (the rest of `logic` is wired in through `BlockParser`
// and `ruler::Ruler` already).
pub use logic::logger::{init_file_logger, safe_preview, shutdown_file_logger};
