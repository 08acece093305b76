//! Name server path syntax.
//!
//! Paths are `/`-separated, absolute, and never end in a separator except
//! for the root scope `/` itself. Bindings must live below a non-root scope,
//! so the shortest valid binding path is `/scope/name`.

/// Path segment separator.
pub const SEPARATOR: char = '/';

/// The root scope path.
pub const ROOT: &str = "/";

/// Split a scope or node path into its segments.
///
/// Returns `None` if the path is not well formed. The root path yields an
/// empty list.
pub fn segments(path: &str) -> Option<Vec<&str>> {
    if path == ROOT {
        return Some(Vec::new());
    }
    let rest = path.strip_prefix(SEPARATOR)?;
    let parts: Vec<&str> = rest.split(SEPARATOR).collect();
    if parts.iter().any(|p| !is_valid_name(p)) {
        return None;
    }
    Some(parts)
}

/// True if `path` is a well formed scope path (root included).
pub fn is_valid_scope_path(path: &str) -> bool {
    segments(path).is_some()
}

/// Split a binding path into its parent scope path and leaf name.
///
/// Rejects paths whose parent would be the root scope.
pub fn split_binding_path(path: &str) -> Option<(&str, &str)> {
    segments(path)?;
    let ofs = path.rfind(SEPARATOR)?;
    if ofs < 2 {
        return None;
    }
    Some((&path[..ofs], &path[ofs + 1..]))
}

/// Build a child path from its parent path and name.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("{}{}", SEPARATOR, name)
    } else {
        format!("{}{}{}", parent, SEPARATOR, name)
    }
}

/// A node name is non-empty and holds no separator or control characters.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(|c| c == SEPARATOR || c.is_control())
}
