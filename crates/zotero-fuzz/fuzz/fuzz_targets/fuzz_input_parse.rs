#![no_main]

use libfuzzer_sys::fuzz_target;
use zotero_mcp::models::{AdvancedSearchInput, BatchUpdateTagsInput, Collection, CreateNoteInput};

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = serde_json::from_value::<AdvancedSearchInput>(json.clone());
        let _ = serde_json::from_value::<BatchUpdateTagsInput>(json.clone());
        let _ = serde_json::from_value::<CreateNoteInput>(json.clone());
        let _ = serde_json::from_value::<Vec<Collection>>(json);
    }
});
