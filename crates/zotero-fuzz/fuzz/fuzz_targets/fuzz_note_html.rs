#![no_main]

use libfuzzer_sys::fuzz_target;
use zotero_mcp::formatters::{clean_note_html, truncate_chars};

fuzz_target!(|data: &[u8]| {
    if let Ok(html) = std::str::from_utf8(data) {
        let text = clean_note_html(html);
        let _ = truncate_chars(&text, 500);
    }
});
