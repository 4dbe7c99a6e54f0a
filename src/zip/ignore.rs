use std::collections::BTreeSet;

/// Path segments that are never installed: Finder metadata files and the
/// resource fork folder macOS adds when compressing.
pub const DEFAULT_IGNORED: &[&str] = &[".DS_Store", "__MACOSX"];

/// A set of exact path-segment names that exclude an archive entry.
///
/// A rule matches any segment of the stored name, so a directory rule also
/// excludes everything nested below a directory of that name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    names: BTreeSet<String>,
}

impl IgnoreRules {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// A rule set that ignores nothing.
    pub fn none() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Whether an entry name, as stored in the archive, must be skipped.
    pub fn is_ignored(&self, entry_name: &str) -> bool {
        entry_name
            .split('/')
            .any(|segment| self.names.contains(segment))
    }
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORED.iter().copied())
    }
}
