//! Path-scoped permission lists.
//!
//! Patterns are field keys in the patch's input naming source:
//!
//! - `email_address` permits that field.
//! - `profile.motto` permits one field of a nested record.
//! - `profile.*` permits `profile` and everything beneath it.
//! - `*` permits everything.
//!
//! An empty list permits everything.

use crate::path::SEPARATOR;

/// Pattern that matches every field.
pub const WILDCARD: &str = "*";

/// Outcome of checking one field against a permission list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The field may be patched in any way.
    Full,
    /// Only fields beneath this one are permitted; the field may be entered
    /// as a nested record but not assigned as a whole.
    Descendants,
    /// The field may not be patched.
    Denied,
}

/// Ordered allow-list of field path patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermittedFields {
    patterns: Vec<String>,
}

impl PermittedFields {
    /// Build a list from patterns. Blank patterns are dropped.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(Into::into)
                .map(|p: String| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// A list that permits everything beneath the current level.
    pub fn all() -> Self {
        Self {
            patterns: vec![WILDCARD.to_string()],
        }
    }

    /// The raw patterns.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether every field is permitted.
    pub fn is_unrestricted(&self) -> bool {
        self.patterns.is_empty() || self.patterns.iter().any(|p| p == WILDCARD)
    }

    /// Whether the field at `path` is permitted.
    pub fn permits(&self, path: &str) -> bool {
        self.is_unrestricted()
            || self
                .patterns
                .iter()
                .any(|p| p == path || is_wildcard_of(p, path))
    }

    /// Whether some pattern names a field strictly beneath `path`.
    pub fn permits_descendants(&self, path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.strip_prefix(path).is_some_and(|rest| rest.starts_with(SEPARATOR) && rest.len() > 1))
    }

    /// Combined check used by the walker.
    pub fn check(&self, path: &str) -> Access {
        if self.permits(path) {
            Access::Full
        } else if self.permits_descendants(path) {
            Access::Descendants
        } else {
            Access::Denied
        }
    }

    /// The list as seen from inside the record at `path`.
    ///
    /// `path.*` collapses to [`PermittedFields::all`]; otherwise every pattern
    /// under `path.` is kept with that prefix removed. An empty result permits
    /// everything, so a bare `path` entry opens the whole subtree.
    pub fn narrow(&self, path: &str) -> Self {
        if self.patterns.iter().any(|p| is_wildcard_of(p, path)) {
            return Self::all();
        }

        let prefix = format!("{path}{SEPARATOR}");
        Self {
            patterns: self
                .patterns
                .iter()
                .filter_map(|p| p.strip_prefix(prefix.as_str()))
                .filter(|rest| !rest.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for PermittedFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

fn is_wildcard_of(pattern: &str, path: &str) -> bool {
    pattern
        .strip_prefix(path)
        .and_then(|rest| rest.strip_prefix(SEPARATOR))
        .is_some_and(|rest| rest == WILDCARD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_permits_everything() {
        let permitted = PermittedFields::default();
        assert!(permitted.is_unrestricted());
        assert!(permitted.permits("anything"));
        assert_eq!(permitted.check("profile"), Access::Full);
    }

    #[test]
    fn test_wildcard_permits_everything() {
        let permitted = PermittedFields::new(["email_address", "*"]);
        assert!(permitted.permits("is_banned"));
    }

    #[test]
    fn test_exact_match() {
        let permitted = PermittedFields::new(["username", "email_address"]);
        assert!(permitted.permits("username"));
        assert!(!permitted.permits("is_banned"));
        assert!(!permitted.permits("user"));
    }

    #[test]
    fn test_path_wildcard_permits_field_itself() {
        let permitted = PermittedFields::new(["profile.*"]);
        assert!(permitted.permits("profile"));
        assert!(!permitted.permits("username"));
        assert!(!permitted.permits("profile_id"));
    }

    #[test]
    fn test_descendants_only() {
        let permitted = PermittedFields::new(["profile.motto"]);
        assert!(!permitted.permits("profile"));
        assert!(permitted.permits_descendants("profile"));
        assert_eq!(permitted.check("profile"), Access::Descendants);
        assert_eq!(permitted.check("prof"), Access::Denied);
    }

    #[test]
    fn test_narrow_collapses_on_wildcard() {
        let permitted = PermittedFields::new(["profile.*", "profile.motto", "username"]);
        assert_eq!(permitted.narrow("profile"), PermittedFields::all());
    }

    #[test]
    fn test_narrow_strips_prefix() {
        let permitted = PermittedFields::new(["profile.motto", "profile.links.*", "username"]);
        let child = permitted.narrow("profile");
        assert_eq!(child.patterns(), &["motto".to_string(), "links.*".to_string()]);
        assert!(child.permits("motto"));
        assert!(child.permits("links"));
        assert!(!child.permits("bio"));

        let grandchild = child.narrow("links");
        assert!(grandchild.is_unrestricted());
    }

    #[test]
    fn test_narrow_of_bare_entry_opens_subtree() {
        let permitted = PermittedFields::new(["profile"]);
        assert!(permitted.permits("profile"));
        assert!(permitted.narrow("profile").is_unrestricted());
    }

    #[test]
    fn test_blank_patterns_are_dropped() {
        let permitted: PermittedFields = ["  ", "name "].into_iter().collect();
        assert_eq!(permitted.patterns(), &["name".to_string()]);
    }
}
