//! Infrastructure layer: the flag tokenizer

pub mod parser;

pub use parser::{FlagParser, ParseFailure, ParseOutput, SeenFlag};
