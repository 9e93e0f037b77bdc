//! Directory listing entries and extension filtering

use serde::{Deserialize, Serialize};

/// One entry of a project root listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    /// Entry name, relative to the project root
    pub name: String,
    /// Whether this entry is a directory
    pub is_dir: bool,
    /// Whether the entry matched the requested extension filter
    ///
    /// Listings only return matching entries, so this is always `true`
    /// today; it is kept so callers can tell filtered results apart.
    pub matches_filter: bool,
}

impl ListingEntry {
    /// Whether the entry is an OpenSCAD source file.
    pub fn is_scad(&self) -> bool {
        !self.is_dir && has_extension(&self.name, "scad")
    }
}

/// Filter selecting entries by file extension (`*.ext`).
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extension: String,
    pattern: glob::Pattern,
}

impl ExtensionFilter {
    /// Build a filter from a caller-supplied extension.
    ///
    /// Surrounding whitespace and one leading `.` are ignored, so `"scad"`,
    /// `".scad"` and `" scad "` are equivalent. Returns `None` when nothing is
    /// left, meaning "no filter".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let extension = trimmed.strip_prefix('.').unwrap_or(trimmed);
        if extension.is_empty() {
            return None;
        }

        // Escaping keeps `*` or `[` in the extension from widening the match.
        let pattern = glob::Pattern::new(&format!("*.{}", glob::Pattern::escape(extension))).ok()?;
        Some(Self {
            extension: extension.to_string(),
            pattern,
        })
    }

    /// The normalized extension, without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Whether `name` matches `*.<extension>`.
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches_with(
            name,
            glob::MatchOptions {
                case_sensitive: true,
                require_literal_separator: true,
                require_literal_leading_dot: true,
            },
        )
    }
}

/// Whether a name is hidden from listings.
pub(crate) fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn has_extension(name: &str, extension: &str) -> bool {
    name.strip_suffix(extension)
        .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_normalization() {
        assert_eq!(ExtensionFilter::parse("scad").unwrap().extension(), "scad");
        assert_eq!(ExtensionFilter::parse(".scad").unwrap().extension(), "scad");
        assert_eq!(ExtensionFilter::parse("  stl ").unwrap().extension(), "stl");
        assert!(ExtensionFilter::parse("").is_none());
        assert!(ExtensionFilter::parse("   ").is_none());
        assert!(ExtensionFilter::parse(".").is_none());
    }

    #[test]
    fn test_filter_matching() {
        let filter = ExtensionFilter::parse("scad").unwrap();
        assert!(filter.matches("a.scad"));
        assert!(filter.matches("gear.v2.scad"));
        assert!(!filter.matches("b.txt"));
        assert!(!filter.matches("a.SCAD"));
        assert!(!filter.matches("scad"));
        assert!(!filter.matches("a.scad.bak"));
    }

    #[test]
    fn test_filter_metacharacters_are_literal() {
        let filter = ExtensionFilter::parse("*").unwrap();
        assert!(!filter.matches("a.scad"));
        assert!(filter.matches("odd.*"));
    }

    #[test]
    fn test_multi_part_extension() {
        let filter = ExtensionFilter::parse("tar.gz").unwrap();
        assert!(filter.matches("models.tar.gz"));
        assert!(!filter.matches("models.gz"));
    }

    #[test]
    fn test_is_scad() {
        let entry = |name: &str, is_dir| ListingEntry {
            name: name.into(),
            is_dir,
            matches_filter: true,
        };
        assert!(entry("box.scad", false).is_scad());
        assert!(!entry("box.scad", true).is_scad());
        assert!(!entry("scad", false).is_scad());
        assert!(!entry("box.stl", false).is_scad());
    }
}
