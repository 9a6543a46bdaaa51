//! Dotted field paths used for permission checks and result reporting.
//!
//! A `FieldPath` is a sequence of field keys. Its string form joins the keys
//! with `.`, which is the notation used by permission patterns, by
//! `PatchResult::fields`, and by the flattened keys of `PatchResult::map`.

use std::fmt;

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// A dotted path through nested records.
///
/// # Examples
///
/// ```
/// use tirea_patch::FieldPath;
///
/// let path = FieldPath::root().key("profile").key("motto");
/// assert_eq!(path.to_string(), "profile.motto");
/// assert_eq!(path.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted string, ignoring empty segments.
    pub fn parse(path: &str) -> Self {
        Self(
            path.split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.0.push(key.into());
        self
    }

    /// Return a new path with `key` appended, leaving `self` untouched.
    #[inline]
    pub fn child(&self, key: &str) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(key.to_owned());
        Self(segments)
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

/// Join a prefix and a key with the path separator.
///
/// An empty prefix yields the key unchanged.
#[inline]
pub fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}{SEPARATOR}{key}")
    }
}
