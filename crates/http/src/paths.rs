//! Backend path building
//!
//! Resource ids come from callers (and, on the proxy, from the URL), so every
//! segment is percent-encoded and dot segments are refused outright.

/// `/collection/id/...` with each segment encoded, or `None` if a segment is
/// empty or a dot segment
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> Option<String> {
    let mut path = String::new();
    for segment in segments {
        let segment = segment.as_ref();
        if segment.is_empty() || segment == "." || segment == ".." {
            return None;
        }
        path.push('/');
        path.push_str(&urlencoding::encode(segment));
    }
    Some(path)
}
