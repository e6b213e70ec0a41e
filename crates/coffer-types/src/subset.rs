use std::collections::HashSet;

/// An allow-list of member names for load and clone operations.
///
/// An empty subset admits every member.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Subset {
    names: HashSet<String>,
}

impl Subset {
    /// The subset that admits everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// A subset admitting only the given names.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if the member named `name` should be processed.
    pub fn admits(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.contains(name)
    }

    /// Returns `true` if no filtering applies.
    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Subset {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::of(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_subset_admits_everything() {
        let s = Subset::all();
        assert!(s.is_all());
        assert!(s.admits("anything"));
        assert!(s.admits(""));
    }

    #[test]
    fn named_subset_filters() {
        let s = Subset::of(["a"]);
        assert!(!s.is_all());
        assert!(s.admits("a"));
        assert!(!s.admits("b"));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn collect_into_subset() {
        let s: Subset = vec!["a".to_string(), "b".to_string()].into_iter().collect();
        assert!(s.admits("b"));
        assert!(!s.admits("c"));
    }
}
