//! Object-key generation for uploads.

use uuid::Uuid;

/// Length of the random suffix appended to every generated key.
pub const KEY_SUFFIX_LEN: usize = 10;

/// Build a collision-resistant storage key.
///
/// Layout: `{context_id}/{category}/{timestamp_ms}-{suffix}.{ext}`. The
/// extension comes from `file_name` (lowercased) and is omitted when the
/// name has none.
pub fn generate_object_key(
    context_id: &str,
    category: &str,
    file_name: &str,
    timestamp_ms: u128,
) -> String {
    let suffix = random_suffix();
    let context_id = context_id.trim_matches('/');
    let category = category.trim_matches('/');
    match file_extension(file_name) {
        Some(ext) => format!("{context_id}/{category}/{timestamp_ms}-{suffix}.{ext}"),
        None => format!("{context_id}/{category}/{timestamp_ms}-{suffix}"),
    }
}

/// Lowercased extension of `file_name`, ignoring leading-dot names.
pub fn file_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(char::is_alphanumeric) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn random_suffix() -> String {
    let mut simple = Uuid::new_v4().simple().to_string();
    simple.truncate(KEY_SUFFIX_LEN);
    simple
}
