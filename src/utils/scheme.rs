//! Redirect target scheme handling.

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Returns `url` as an absolute http(s) URL.
///
/// URLs that already start with `http://` or `https://` (exact,
/// case-sensitive prefix) are returned as-is; anything else gets
/// `https://` prepended. Never fails.
///
/// # Examples
///
/// ```
/// use mini_link::utils::scheme::ensure_scheme;
///
/// assert_eq!(ensure_scheme("x.com"), "https://x.com");
/// assert_eq!(ensure_scheme("http://x.com"), "http://x.com");
/// ```
pub fn ensure_scheme(url: &str) -> String {
    if url.starts_with(HTTP_PREFIX) || url.starts_with(HTTPS_PREFIX) {
        url.to_string()
    } else {
        format!("{HTTPS_PREFIX}{url}")
    }
}
