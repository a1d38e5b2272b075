//! Data models for Zotero API entities and tool inputs.
//!
//! Wire models use `#[serde(default)]` for every optional field and
//! `#[serde(rename_all = "camelCase")]` to match API naming.

mod enums;
mod inputs;
mod item;
mod library;

pub use enums::{JoinMode, QueryMode, SortDirection};
pub use inputs::*;
pub use item::{ANNOTATION, ATTACHMENT, Creator, Item, ItemData, ItemMeta, NOTE, Tag};
pub use library::{
    Collection, CollectionData, FullText, SearchCondition, TagEntry, TagMeta, WriteFailure,
    WriteResponse,
};
