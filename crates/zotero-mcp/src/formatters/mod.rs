//! Markdown output formatters.

mod markdown;

pub use markdown::*;
