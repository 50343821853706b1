//! Filesystem-safe names for the folder and file path segments that come
//! out of the listing payload.

/// Characters never allowed in a path segment. Windows' reserved set, which
/// also covers the separators that matter on Unix.
const DISALLOWED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces each disallowed character with `_`, one for one.
///
/// Clean input comes back unchanged and the substitution is idempotent, so a
/// name that was already sanitized does not drift on a second pass.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if DISALLOWED.contains(&c) { '_' } else { c })
        .collect()
}
