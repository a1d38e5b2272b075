//! Full-text resolution for a single item.
//!
//! The resolver turns an item key into one markdown document: metadata first, then the best
//! attachment's text. Text comes from the library's full-text index when available, otherwise the
//! attachment file is downloaded into a scoped temporary directory and converted locally.
//!
//! Every failure is rendered into the returned text, so callers always get a string back.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use md5::{Digest, Md5};

use crate::attachments::{self, AttachmentDetails};
use crate::client::ZoteroClient;
use crate::convert::{self, DocumentConverter};
use crate::error::{ClientError, FetchError};
use crate::formatters::format_item_metadata;

/// Separator between the metadata block and what follows it.
const SEPARATOR: &str = "\n\n---\n\n";

/// Resolve the full text of an item as markdown.
pub async fn resolve_fulltext(
    client: &ZoteroClient,
    converter: Arc<dyn DocumentConverter>,
    item_key: &str,
) -> String {
    let item = match client.get_item(item_key).await {
        Ok(item) => item,
        Err(e) if e.is_not_found() => return format!("No item found with key: {item_key}"),
        Err(e) => {
            tracing::error!(item_key, error = %e, "Failed to fetch item");
            return format!("Error fetching item full text: {e}");
        }
    };

    let metadata = format_item_metadata(&item, true);

    let Some(attachment) = attachments::select_attachment(client, &item).await else {
        return format!("{metadata}{SEPARATOR}No suitable attachment found for this item.");
    };

    tracing::debug!(
        item_key,
        attachment_key = %attachment.key,
        content_type = %attachment.content_type,
        "Selected attachment"
    );

    match index_stage(client, &attachment).await {
        Ok(content) => return with_full_text(&metadata, &content),
        Err(e) => {
            tracing::debug!(attachment_key = %attachment.key, error = %e, "Falling back to download");
        }
    }

    let dir = match tempfile::TempDir::new() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create temporary directory");
            return format!("{metadata}{SEPARATOR}Error accessing attachment: {e}");
        }
    };

    let path = match download_stage(client, &attachment, dir.path()).await {
        Ok(path) => path,
        Err(FetchError::Download(e)) if !e.is_not_found() => {
            tracing::warn!(attachment_key = %attachment.key, error = %e, "Attachment download failed");
            return format!("{metadata}{SEPARATOR}Error accessing attachment: {e}");
        }
        Err(e) => {
            tracing::warn!(attachment_key = %attachment.key, error = %e, "Attachment file unavailable");
            return format!("{metadata}{SEPARATOR}File download failed.");
        }
    };

    let content = match convert::convert_file(converter, path, attachment.content_type.clone()).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(attachment_key = %attachment.key, error = %e, "Conversion failed");
            format!("Error converting file to markdown: {e}")
        }
    };

    with_full_text(&metadata, &content)
}

fn with_full_text(metadata: &str, content: &str) -> String {
    format!("{metadata}{SEPARATOR}## Full Text\n\n{content}")
}

/// Ask the library's full-text index for the attachment's text.
async fn index_stage(client: &ZoteroClient, attachment: &AttachmentDetails) -> Result<String, FetchError> {
    let fulltext = client
        .get_fulltext(&attachment.key)
        .await
        .map_err(|e| FetchError::IndexLookup(e.to_string()))?;

    fulltext
        .non_empty_content()
        .map(str::to_string)
        .ok_or_else(|| FetchError::IndexLookup("empty content".to_string()))
}

/// Download the attachment file into `dir`.
async fn download_stage(
    client: &ZoteroClient,
    attachment: &AttachmentDetails,
    dir: &Path,
) -> Result<PathBuf, FetchError> {
    let path = dir.join(download_name(attachment));

    client.download_attachment(&attachment.key, &path).await.map_err(FetchError::Download)?;

    verify_download(attachment, path).await
}

/// Confirm the downloaded file exists; an md5 mismatch is only logged.
async fn verify_download(attachment: &AttachmentDetails, path: PathBuf) -> Result<PathBuf, FetchError> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(FetchError::MissingFile(path)),
        Err(e) => return Err(FetchError::Download(ClientError::Io(e))),
    };

    if let Some(expected) = &attachment.md5 {
        let actual = format!("{:x}", Md5::digest(&bytes));
        if !actual.eq_ignore_ascii_case(expected) {
            tracing::warn!(
                attachment_key = %attachment.key,
                expected = %expected,
                actual = %actual,
                "Downloaded file does not match stored md5"
            );
        }
    }

    Ok(path)
}

/// File name inside the temporary directory: the stored file name's last component, or
/// `{key}.pdf`.
fn download_name(attachment: &AttachmentDetails) -> String {
    Path::new(&attachment.filename)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .map_or_else(|| format!("{}.pdf", attachment.key), str::to_string)
}
