// CommonMark block-level grammar: nom parser combinators, one module per construct.

pub mod blocks;
pub mod shared;

pub use shared::Span;
