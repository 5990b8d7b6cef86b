//! Slash-separated database paths (`booths/CR1/slots/10:00`)

use crate::error::{StoreError, StoreResult};

/// Normalize a path: strip surrounding slashes, reject empty segments.
pub fn normalize(path: &str) -> StoreResult<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(|segment| segment.trim().is_empty()) {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Join a collection path and a child key
pub fn child(parent: &str, key: &str) -> StoreResult<String> {
    if key.contains('/') {
        return Err(StoreError::InvalidPath(key.to_string()));
    }
    normalize(&format!("{parent}/{key}"))
}

/// If `path` is a direct child of `parent`, return the child key.
///
/// `parent` must already be normalized.
pub fn direct_child<'a>(parent: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(parent)?.strip_prefix('/')?;
    if rest.is_empty() || rest.contains('/') {
        None
    } else {
        Some(rest)
    }
}

/// Whether `path` equals `prefix` or lives underneath it
pub fn is_within(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
