//! Fuzzing library for zotero-mcp.
//!
//! Targets cover JSON deserialization of Zotero API objects and tool inputs, plus the note HTML
//! cleaner that runs on user-authored content.
//!
//! # Usage
//!
//! ```bash
//! cd crates/zotero-fuzz
//! cargo +nightly fuzz run fuzz_item_parse -- -max_total_time=60
//! ```

pub use zotero_mcp::models;
