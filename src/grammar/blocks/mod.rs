// Block-level grammar modules
//
// This module contains individual CommonMark block element parsers.
// Each parser extracts a specific block-level construct and returns nom IResult.
// These are pure recognizers: no BlockState, no token emission. The rule
// matchers in `crate::rules` wrap them and decide what to do with a match.

pub mod cm_blockquote;
pub mod cm_fenced_code_block;
pub mod cm_heading;
pub mod cm_html_blocks;
pub mod cm_indented_code_block;
pub mod cm_link_reference;
pub mod cm_list;
pub mod cm_setext_heading;
pub mod cm_thematic_break;

pub use cm_blockquote::*;
pub use cm_fenced_code_block::*;
pub use cm_heading::*;
pub use cm_html_blocks::*;
pub use cm_indented_code_block::*;
pub use cm_link_reference::*;
pub use cm_list::{detect_list_marker, list, list_item, ListItemData, ListMarker};
pub use cm_setext_heading::*;
pub use cm_thematic_break::*;
