/// Prefix of a file-transfer download link.
pub const DEFAULT_LINK_PREFIX: &str = "https://www.wetransfer.com/downloads/";

/// Finds the first download link in `body`.
///
/// A link starts with `prefix` and runs until the first whitespace character,
/// so trailing text, carriage returns and later lines are never included.
/// An occurrence of the bare prefix with nothing after it is skipped.
pub fn find_download_link<'a>(body: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }

    let mut offset = 0;
    while let Some(found) = body[offset..].find(prefix) {
        let start = offset + found;
        let rest = &body[start..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if end > prefix.len() {
            return Some(&rest[..end]);
        }
        offset = start + prefix.len();
    }
    None
}
