//! Parameter path helpers.

/// Normalize a base path to a single leading slash and no trailing slash.
///
/// `"foo"`, `"/foo"` and `"/foo/"` all become `/foo`. Empty input and `"/"`
/// become the root path `/`.
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// Join a normalized base path with a tag suffix.
///
/// Under the root path this yields `/Foo`, not the naive `//Foo`.
pub fn join_name(path: &str, suffix: &str) -> String {
    if path == "/" {
        format!("/{}", suffix)
    } else {
        format!("{}/{}", path, suffix)
    }
}
