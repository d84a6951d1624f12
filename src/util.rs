use url::Url;

/// Return true if `s` is an absolute http(s) URL with a host.
/// Used to decide whether a configured redirect URI can be trusted as-is.
pub fn is_valid_absolute_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(u) => matches!(u.scheme(), "http" | "https") && u.has_host(),
        Err(_) => false,
    }
}
