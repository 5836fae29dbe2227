use tagfill_document::{CopyMap, NodeId};

/// Where a tag was found.
#[derive(Debug, Clone, PartialEq)]
pub struct TagHit {
    pub leaf: NodeId,
    /// The tag carried the `!` prefix.
    pub suppress: bool,
}

/// Lowercase tag name -> the leaf that carried it.
///
/// Iterates in the order names were first seen. A later hit for the same name
/// replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagRegistry {
    entries: Vec<(String, TagHit)>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, hit: TagHit) {
        let name = name.into().to_lowercase();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = hit,
            None => self.entries.push((name, hit)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TagHit> {
        let name = name.to_lowercase();
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, hit)| hit)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagHit)> {
        self.entries.iter().map(|(n, hit)| (n.as_str(), hit))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn extend(&mut self, other: TagRegistry) {
        for (name, hit) in other.entries {
            self.insert(name, hit);
        }
    }

    /// Moves every hit over to the copy of its leaf. Hits whose leaf was not
    /// copied are dropped.
    pub fn remap(&self, copies: &CopyMap) -> TagRegistry {
        let entries = self
            .entries
            .iter()
            .filter_map(|(name, hit)| {
                copies.get(&hit.leaf).map(|leaf| {
                    let hit = TagHit {
                        leaf: leaf.clone(),
                        suppress: hit.suppress,
                    };
                    (name.clone(), hit)
                })
            })
            .collect();
        TagRegistry { entries }
    }
}
