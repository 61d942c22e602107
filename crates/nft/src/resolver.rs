use futures::future::try_join_all;

use crate::error::Error;
use crate::gateway::ContentGateway;
use crate::toolkit::TokenEntry;

/// Decode a hex-encoded UTF-8 pointer value: strip an optional `0x`, decode,
/// trim surrounding whitespace and drop the scheme prefix when present.
pub fn decode_pointer(raw: &str, uri_prefix: &str) -> Result<String, Error> {
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let text = String::from_utf8(hex::decode(raw)?)?;
    let text = text.trim();
    Ok(text.strip_prefix(uri_prefix).unwrap_or(text).to_string())
}

/// Extract the content pointers embedded in raw storage entries, in scan
/// order. Entries that are absent or carry no pointer are skipped, not
/// represented as holes.
pub fn extract_pointers(
    entries: &[Option<TokenEntry>],
    uri_prefix: &str,
) -> Result<Vec<String>, Error> {
    let mut pointers = Vec::new();
    for entry in entries.iter().flatten() {
        match entry.token_info.get("") {
            Some(value) if !value.is_empty() => pointers.push(decode_pointer(value, uri_prefix)?),
            _ => {}
        }
    }
    Ok(pointers)
}

/// Fan out one gateway fetch per pointer. All fetches are issued concurrently
/// and the call completes once all of them resolve or one rejects.
pub async fn resolve_documents<G: ContentGateway>(
    gateway: &G,
    base: &str,
    pointers: &[String],
) -> Result<Vec<serde_json::Value>, Error> {
    try_join_all(pointers.iter().map(|id| gateway.fetch_json(base, id)))
        .await
        .map_err(Error::Gateway)
}
