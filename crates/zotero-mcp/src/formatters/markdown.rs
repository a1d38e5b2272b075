//! Markdown output formatting.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Collection, Creator, Item, TagEntry};

/// Format creator names as "Last, First; Name; ...".
#[must_use]
pub fn format_creators(creators: &[Creator]) -> String {
    let names: Vec<String> = creators.iter().filter_map(Creator::display_name).collect();
    if names.is_empty() { "No authors listed".to_string() } else { names.join("; ") }
}

/// Tags as space-separated inline code spans.
#[must_use]
pub fn format_tags_inline(item: &Item) -> Option<String> {
    let tags = item.tag_names();
    if tags.is_empty() {
        return None;
    }
    Some(tags.iter().map(|t| format!("`{t}`")).collect::<Vec<_>>().join(" "))
}

/// Truncate to at most `max` characters, appending "..." when cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Format an item's bibliographic metadata.
#[must_use]
pub fn format_item_metadata(item: &Item, include_abstract: bool) -> String {
    let data = &item.data;
    let item_type = if data.item_type.is_empty() { "unknown" } else { data.item_type.as_str() };

    let mut lines = vec![
        format!("# {}", item.title_or_default()),
        format!("**Type:** {item_type}"),
        format!("**Item Key:** {}", item.key()),
    ];

    if let Some(date) = data.date.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("**Date:** {date}"));
    }

    if !data.creators.is_empty() {
        lines.push(format!("**Authors:** {}", format_creators(&data.creators)));
    }

    match item_type {
        "journalArticle" => {
            if let Some(journal) = data.publication_title.as_deref().filter(|j| !j.is_empty()) {
                let mut info = format!("**Journal:** {journal}");
                if let Some(volume) = non_empty(&data.volume) {
                    info.push_str(&format!(", Volume {volume}"));
                }
                if let Some(issue) = non_empty(&data.issue) {
                    info.push_str(&format!(", Issue {issue}"));
                }
                if let Some(pages) = non_empty(&data.pages) {
                    info.push_str(&format!(", Pages {pages}"));
                }
                lines.push(info);
            }
        }
        "book" => {
            if let Some(publisher) = non_empty(&data.publisher) {
                let mut info = format!("**Publisher:** {publisher}");
                if let Some(place) = non_empty(&data.place) {
                    info.push_str(&format!(", {place}"));
                }
                lines.push(info);
            }
        }
        _ => {}
    }

    if let Some(doi) = non_empty(&data.doi) {
        lines.push(format!("**DOI:** {doi}"));
    }
    if let Some(url) = non_empty(&data.url) {
        lines.push(format!("**URL:** {url}"));
    }

    if let Some(tags) = format_tags_inline(item) {
        lines.push(format!("**Tags:** {tags}"));
    }

    if include_abstract {
        if let Some(abs) = non_empty(&data.abstract_note) {
            // Empty entry: the abstract heading sits behind a double gap.
            lines.push(String::new());
            lines.push("## Abstract".to_string());
            lines.push(abs.to_string());
        }
    }

    if !data.collections.is_empty() {
        lines.push(format!("**Collections:** {} collections", data.collections.len()));
    }

    if item.num_children() > 0 {
        lines.push(format!("**Notes/Attachments:** {}", item.num_children()));
    }

    lines.join("\n\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Options for [`format_item_list`].
#[derive(Debug, Clone, Copy)]
pub struct ListStyle {
    /// Heading level of each entry (2 = `##`).
    pub heading_level: usize,
    /// Abstract snippet length; `None` omits abstracts.
    pub abstract_chars: Option<usize>,
    /// Include the tag line.
    pub tags: bool,
    /// Include the date-added line.
    pub date_added: bool,
}

impl ListStyle {
    /// Search results: abstract snippet and tags.
    pub const SEARCH: Self =
        Self { heading_level: 2, abstract_chars: Some(200), tags: true, date_added: false };

    /// Plain listing: key facts only.
    pub const BRIEF: Self =
        Self { heading_level: 2, abstract_chars: None, tags: false, date_added: false };
}

/// Format a numbered list of items.
#[must_use]
pub fn format_item_list(items: &[Item], style: ListStyle) -> Vec<String> {
    let hashes = "#".repeat(style.heading_level);
    let mut output = Vec::new();

    for (i, item) in items.iter().enumerate() {
        let data = &item.data;
        let item_type = if data.item_type.is_empty() { "unknown" } else { data.item_type.as_str() };

        output.push(format!("{hashes} {}. {}", i + 1, item.title_or_default()));
        output.push(format!("**Type:** {item_type}"));
        output.push(format!("**Item Key:** {}", item.key()));
        output.push(format!("**Date:** {}", non_empty(&data.date).unwrap_or("No date")));
        if style.date_added {
            output.push(format!("**Added:** {}", non_empty(&data.date_added).unwrap_or("Unknown")));
        }
        output.push(format!("**Authors:** {}", format_creators(&data.creators)));

        if let Some(max) = style.abstract_chars {
            if let Some(abs) = non_empty(&data.abstract_note) {
                output.push(format!("**Abstract:** {}", truncate_chars(abs, max)));
            }
        }

        if style.tags {
            if let Some(tags) = format_tags_inline(item) {
                output.push(format!("**Tags:** {tags}"));
            }
        }

        output.push(String::new());
    }

    output
}

/// Format collections as an indented tree.
#[must_use]
pub fn format_collections(collections: &[Collection]) -> String {
    let mut output = vec!["# Zotero Collections".to_string(), String::new()];

    let known: HashMap<&str, &Collection> = collections.iter().map(|c| (c.key.as_str(), c)).collect();
    let mut children: HashMap<Option<&str>, Vec<&Collection>> = HashMap::new();
    for collection in collections {
        // Orphans whose parent was not returned are shown at the top level.
        let parent = collection.parent().filter(|p| known.contains_key(p));
        children.entry(parent).or_default().push(collection);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| a.key.cmp(&b.key));
    }

    fn walk<'a>(
        collection: &'a Collection,
        level: usize,
        children: &HashMap<Option<&'a str>, Vec<&'a Collection>>,
        output: &mut Vec<String>,
    ) {
        let indent = "  ".repeat(level);
        output.push(format!("{indent}- **{}** (Key: {})", collection.name_or_default(), collection.key));
        if let Some(kids) = children.get(&Some(collection.key.as_str())) {
            for kid in kids {
                walk(kid, level + 1, children, output);
            }
        }
    }

    if let Some(top) = children.get(&None) {
        for collection in top {
            walk(collection, 0, &children, &mut output);
        }
    }

    output.join("\n")
}

/// Format tags sorted alphabetically under first-letter headings.
#[must_use]
pub fn format_tags(tags: &[TagEntry]) -> String {
    let mut output = vec!["# Zotero Tags".to_string(), String::new()];

    let mut sorted: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut current: Option<String> = None;
    for tag in sorted {
        let letter = tag.chars().next().map_or_else(|| "#".to_string(), |c| c.to_uppercase().collect());
        if current.as_deref() != Some(letter.as_str()) {
            output.push(format!("## {letter}"));
            current = Some(letter);
        }
        output.push(format!("- `{tag}`"));
    }

    output.join("\n")
}

static PARAGRAPH_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<p(\s[^>]*)?>").expect("valid regex"));
static BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Turn note HTML into readable text.
#[must_use]
pub fn clean_note_html(html: &str) -> String {
    let text = PARAGRAPH_OPEN.replace_all(html, "");
    let text = text.replace("</p>", "\n\n").replace("</P>", "\n\n");
    let text = BREAK.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Format an item's children grouped as attachments, notes and other items.
#[must_use]
pub fn format_children(parent_title: &str, children: &[Item]) -> String {
    let mut output = vec![format!("# Child Items for: {parent_title}"), String::new()];

    let (attachments, rest): (Vec<&Item>, Vec<&Item>) = children.iter().partition(|c| c.is_attachment());
    let (notes, others): (Vec<&Item>, Vec<&Item>) = rest.into_iter().partition(|c| c.is_note());

    if !attachments.is_empty() {
        output.push("## Attachments".to_string());
        for (i, att) in attachments.iter().enumerate() {
            let data = &att.data;
            output.push(format!("{}. **{}**", i + 1, att.title_or_default()));
            output.push(format!("   - Key: {}", att.key()));
            output.push(format!("   - Type: {}", non_empty(&data.content_type).unwrap_or("Unknown")));
            if let Some(filename) = non_empty(&data.filename) {
                output.push(format!("   - Filename: {filename}"));
            }
            output.push(String::new());
        }
    }

    if !notes.is_empty() {
        output.push("## Notes".to_string());
        for (i, note) in notes.iter().enumerate() {
            let text = clean_note_html(note.data.note.as_deref().unwrap_or_default());
            let text = if text.chars().count() > 500 {
                format!("{}\n\n(Note truncated)", truncate_chars(&text, 500))
            } else {
                text
            };
            let title = note.data.title.as_deref().unwrap_or("Untitled Note");
            output.push(format!("{}. **{title}**", i + 1));
            output.push(format!("   - Key: {}", note.key()));
            output.push(format!("   - Content:\n```\n{text}\n```"));
            output.push(String::new());
        }
    }

    if !others.is_empty() {
        output.push("## Other Items".to_string());
        for (i, other) in others.iter().enumerate() {
            output.push(format!("{}. **{}**", i + 1, other.title_or_default()));
            output.push(format!("   - Key: {}", other.key()));
            output.push(format!("   - Type: {}", other.item_type()));
            output.push(String::new());
        }
    }

    output.join("\n")
}

/// Heading suffix naming an item's parent: its title when known, else its key.
#[must_use]
pub fn parent_context(item: &Item, parent_titles: &BTreeMap<String, String>) -> String {
    item.data
        .parent_item
        .as_deref()
        .map(|parent| match parent_titles.get(parent) {
            Some(title) => format!(" (from \"{title}\")"),
            None => format!(" (parent key: {parent})"),
        })
        .unwrap_or_default()
}

/// Format notes with optional parent-title context, keyed by parent item key.
#[must_use]
pub fn format_notes(heading: &str, notes: &[Item], parent_titles: &BTreeMap<String, String>) -> String {
    let mut output = vec![heading.to_string(), String::new()];

    for (i, note) in notes.iter().enumerate() {
        let parent_info = parent_context(note, parent_titles);
        let text = clean_note_html(note.data.note.as_deref().unwrap_or_default());

        output.push(format!("## Note {}{parent_info}", i + 1));
        output.push(format!("**Key:** {}", note.key()));
        if let Some(tags) = format_tags_inline(note) {
            output.push(format!("**Tags:** {tags}"));
        }
        output.push(format!("**Content:**\n{}", truncate_chars(&text, 500)));
        output.push(String::new());
    }

    output.join("\n")
}

/// Characters of context kept before a search match.
const SNIPPET_BEFORE: usize = 100;

/// Characters of context kept from the start of a search match.
const SNIPPET_AFTER: usize = 200;

/// Case-insensitive search over chars; returns the match's char offset.
fn find_ignore_case(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    let fold = |c: &char| c.to_lowercase().collect::<String>();
    (0..=haystack.len() - needle.len())
        .find(|&start| haystack[start..start + needle.len()].iter().map(fold).eq(needle.iter().map(fold)))
}

/// Readable excerpt of a note around the first match of `query`, with the match in bold.
///
/// Falls back to the first 500 characters when the cleaned text no longer contains the query
/// (a match inside markup, for instance).
#[must_use]
pub fn note_snippet(note_html: &str, query: &str) -> String {
    let text: Vec<char> = clean_note_html(note_html).chars().collect();
    let needle: Vec<char> = query.trim().chars().collect();

    let Some(pos) = find_ignore_case(&text, &needle) else {
        let cleaned: String = text.iter().collect();
        return format!("{}...", cleaned.chars().take(500).collect::<String>());
    };

    let match_end = pos + needle.len();
    let start = pos.saturating_sub(SNIPPET_BEFORE);
    let end = (pos + SNIPPET_AFTER).min(text.len()).max(match_end);

    let before: String = text[start..pos].iter().collect();
    let hit: String = text[pos..match_end].iter().collect();
    let after: String = text[match_end..end].iter().collect();

    format!("{before}**{hit}**{after}...")
}

/// Format notes matching a search, each with an excerpt around the match.
#[must_use]
pub fn format_note_matches(query: &str, notes: &[Item], parent_titles: &BTreeMap<String, String>) -> String {
    let mut output = vec![format!("# Note Search Results for '{query}'"), String::new()];

    for (i, note) in notes.iter().enumerate() {
        output.push(format!("## Note {}{}", i + 1, parent_context(note, parent_titles)));
        output.push(format!("**Key:** {}", note.key()));
        if let Some(tags) = format_tags_inline(note) {
            output.push(format!("**Tags:** {tags}"));
        }
        let snippet = note_snippet(note.data.note.as_deref().unwrap_or_default(), query);
        output.push(format!("**Content:**\n{snippet}"));
        output.push(String::new());
    }

    output.join("\n")
}

/// Format annotations.
///
/// `context` maps an annotation key to a heading suffix such as ` (from "Title") in Full Text PDF`.
#[must_use]
pub fn format_annotations(heading: &str, annotations: &[Item], context: &BTreeMap<String, String>) -> String {
    let mut output = vec![heading.to_string(), String::new()];

    for (i, annotation) in annotations.iter().enumerate() {
        let data = &annotation.data;
        let suffix = context.get(annotation.key()).map(String::as_str).unwrap_or_default();

        output.push(format!("## Annotation {}{suffix}", i + 1));
        output.push(format!("**Type:** {}", non_empty(&data.annotation_type).unwrap_or("Unknown type")));
        output.push(format!("**Key:** {}", annotation.key()));
        if let Some(color) = non_empty(&data.annotation_color) {
            output.push(format!("**Color:** {color}"));
        }
        if let Some(page) = non_empty(&data.annotation_page_label) {
            output.push(format!("**Page:** {page}"));
        }
        if let Some(text) = non_empty(&data.annotation_text) {
            output.push(format!("**Text:** {text}"));
        }
        if let Some(comment) = non_empty(&data.annotation_comment) {
            output.push(format!("**Comment:** {comment}"));
        }
        if let Some(tags) = format_tags_inline(annotation) {
            output.push(format!("**Tags:** {tags}"));
        }
        output.push(String::new());
    }

    output.join("\n")
}
