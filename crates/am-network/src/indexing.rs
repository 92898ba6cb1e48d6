//! Tag → arena id lookup.
//!
//! Tags are resolved once, when segments and results are set up; the
//! evaluation loop works on ids only.

use std::collections::HashMap;

use am_core::{DistributorId, PropulsorId, SourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagRef {
    Distributor(DistributorId),
    Source(SourceId),
    Propulsor(PropulsorId),
}

#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    map: HashMap<String, TagRef>,
}

impl TagIndex {
    /// Insert a tag. Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, tag: &str, target: TagRef) -> bool {
        if self.map.contains_key(tag) {
            return false;
        }
        self.map.insert(tag.to_string(), target);
        true
    }

    pub fn get(&self, tag: &str) -> Option<TagRef> {
        self.map.get(tag).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut index = TagIndex::default();
        assert!(index.insert("bus", TagRef::Distributor(DistributorId::from_index(0))));
        assert!(!index.insert("bus", TagRef::Source(SourceId::from_index(0))));
        assert_eq!(
            index.get("bus"),
            Some(TagRef::Distributor(DistributorId::from_index(0)))
        );
    }
}
