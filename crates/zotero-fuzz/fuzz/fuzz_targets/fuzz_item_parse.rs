#![no_main]

use libfuzzer_sys::fuzz_target;
use zotero_mcp::attachments::pick_attachment;
use zotero_mcp::formatters::format_item_metadata;
use zotero_mcp::models::Item;

fuzz_target!(|data: &[u8]| {
    // Items that parse must also render and rank without panicking.
    if let Ok(items) = serde_json::from_slice::<Vec<Item>>(data) {
        let _ = pick_attachment(&items);
        for item in &items {
            let _ = format_item_metadata(item, true);
        }
    }
});
