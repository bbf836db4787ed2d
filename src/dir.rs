//! Path tokenizing and descriptor name classification.
//!
//! Everything here is a pure function over strings; no file I/O and no tree
//! knowledge. The namespace parser, the mutation operations and the
//! second-pass descriptor scans all classify names through these helpers so
//! the bracketing rules live in exactly one place.

/// Splits a path on `/` and drops empty components.
pub(crate) fn tokenize(path: &str) -> Vec<&str> {
	path.split('/').filter(|s| !s.is_empty()).collect()
}

/// `true` for any name ending in `_START`, including pathological ones like
/// `X_Y_START`. This is intentional: the original format has no escaping.
pub(crate) fn is_start(name: &str) -> bool {
	name.len() >= 6 && name.ends_with("_START")
}

/// `true` for any name ending in `_END`.
pub(crate) fn is_end(name: &str) -> bool {
	name.len() >= 4 && name.ends_with("_END")
}

/// The namespace name bracketed by a `_START` descriptor, i.e. `name` with
/// the `_START` suffix stripped. Panics if `is_start(name)` is false.
pub(crate) fn start_prefix(name: &str) -> &str {
	&name[..name.len() - 6]
}

/// The namespace name bracketed by an `_END` descriptor. Panics if
/// `is_end(name)` is false.
pub(crate) fn end_prefix(name: &str) -> &str {
	&name[..name.len() - 4]
}

/// `true` if `name` matches `^E[0-9]M[0-9]$`, the Doom map-marker convention.
pub(crate) fn is_map_marker(name: &str) -> bool {
	let b = name.as_bytes();
	b.len() == 4 && b[0] == b'E' && b[1].is_ascii_digit() && b[2] == b'M' && b[3].is_ascii_digit()
}

/// Splits `path` into its parent directory path (always `/`-terminated) and
/// its final component. Returns `None` for paths that have no parent, such as
/// `/` itself or paths not rooted at `/`.
pub(crate) fn split_parent(path: &str) -> Option<(String, String)> {
	if path.is_empty() || !path.starts_with('/') {
		return None;
	}
	let tokens = tokenize(path);
	let basename = tokens.last()?.to_string();
	let mut parent = String::from("/");
	for t in &tokens[..tokens.len() - 1] {
		parent.push_str(t);
		parent.push('/');
	}
	Some((parent, basename))
}

/// The final path segment of a canonical name, with any trailing `/` removed.
pub(crate) fn last_segment(name: &str) -> String {
	let trimmed = name.trim_end_matches('/');
	trimmed.rsplit('/').next().unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokenize_drops_empty_components() {
		assert_eq!(tokenize("/a//b/"), vec!["a", "b"]);
		assert_eq!(tokenize("/"), Vec::<&str>::new());
	}

	#[test]
	fn start_end_classification() {
		assert!(is_start("SP_START"));
		assert!(is_end("SP_END"));
		assert!(!is_start("SPRITES"));
		assert!(is_start("X_Y_START"));
		assert_eq!(start_prefix("SP_START"), "SP");
		assert_eq!(end_prefix("SP_END"), "SP");
	}

	#[test]
	fn map_marker_classification() {
		assert!(is_map_marker("E1M1"));
		assert!(is_map_marker("E9M9"));
		assert!(!is_map_marker("MAP01"));
		assert!(!is_map_marker("E1M10"));
	}

	#[test]
	fn split_parent_examples() {
		assert_eq!(split_parent("/AB"), Some(("/".to_string(), "AB".to_string())));
		assert_eq!(split_parent("/SP/A"), Some(("/SP/".to_string(), "A".to_string())));
		assert_eq!(split_parent("/"), None);
		assert_eq!(split_parent("relative"), None);
	}

	#[test]
	fn last_segment_examples() {
		assert_eq!(last_segment("/SP/"), "SP");
		assert_eq!(last_segment("/SP/A"), "A");
	}
}
