//! Surrogate key registry.
//!
//! Maps identity strings to dense integer ids handed out in first-seen
//! order. Keys are kept in a vector indexed by id, with a hash map for
//! membership, so iteration order never depends on hashing.

use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::models::SurrogateId;

/// Ordered mapping from key to surrogate id.
#[derive(Debug, Clone)]
pub struct IdRegistry<I> {
    ids: HashMap<String, I>,
    /// Keys in ascending id order
    order: Vec<(I, String)>,
    next: u32,
}

impl<I: SurrogateId> Default for IdRegistry<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SurrogateId> IdRegistry<I> {
    /// Empty registry; the first key gets id 1.
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            order: Vec::new(),
            next: 1,
        }
    }

    /// Seed from rows already on disk. New ids continue from `max + 1`.
    ///
    /// Fails when a stored id is `u32::MAX`, since no id could follow it.
    pub fn from_rows(rows: impl IntoIterator<Item = (I, String)>) -> Result<Self> {
        let mut registry = Self::new();
        for (id, key) in rows {
            let after = id.raw().checked_add(1).ok_or_else(|| {
                AppError::validation(format!(
                    "{} id {} for '{}' leaves no room for new ids",
                    I::KIND,
                    id.raw(),
                    key
                ))
            })?;
            registry.next = registry.next.max(after);
            if registry.ids.contains_key(&key) {
                log::warn!("Duplicate {} key '{}' in table; keeping first id", I::KIND, key);
                continue;
            }
            registry.ids.insert(key.clone(), id);
            registry.order.push((id, key));
        }
        registry.order.sort_by_key(|(id, _)| id.raw());
        Ok(registry)
    }

    /// Look up `key`, assigning the next id when it is unknown.
    ///
    /// Returns the id and whether it was just created.
    pub fn get_or_create(&mut self, key: &str) -> (I, bool) {
        if let Some(&id) = self.ids.get(key) {
            return (id, false);
        }
        let id = I::from_raw(self.next);
        self.next += 1;
        self.ids.insert(key.to_string(), id);
        self.order.push((id, key.to_string()));
        (id, true)
    }

    pub fn get(&self, key: &str) -> Option<I> {
        self.ids.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every entry in ascending id order.
    pub fn entries(&self) -> impl Iterator<Item = (I, &str)> {
        self.order.iter().map(|(id, key)| (*id, key.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthorNum, DistId};

    #[test]
    fn test_first_seen_order() {
        let mut authors: IdRegistry<AuthorNum> = IdRegistry::new();

        assert_eq!(authors.get_or_create("a1"), (AuthorNum(1), true));
        assert_eq!(authors.get_or_create("a2"), (AuthorNum(2), true));
        assert_eq!(authors.get_or_create("a1"), (AuthorNum(1), false));

        let entries: Vec<_> = authors.entries().collect();
        assert_eq!(entries, vec![(AuthorNum(1), "a1"), (AuthorNum(2), "a2")]);
    }

    #[test]
    fn test_from_rows_continues_after_max() {
        let mut dists = IdRegistry::from_rows(vec![
            (DistId(1), "Foo".to_string()),
            (DistId(3), "Baz".to_string()),
            (DistId(2), "Bar".to_string()),
        ])
        .unwrap();

        assert_eq!(dists.len(), 3);
        assert_eq!(dists.get("Baz"), Some(DistId(3)));

        assert_eq!(dists.get_or_create("Bar"), (DistId(2), false));
        assert_eq!(dists.get_or_create("Qux"), (DistId(4), true));

        let ids: Vec<u32> = dists.entries().map(|(id, _)| id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_duplicate_rows_keep_first() {
        let mut authors = IdRegistry::from_rows(vec![
            (AuthorNum(1), "X".to_string()),
            (AuthorNum(2), "X".to_string()),
        ])
        .unwrap();
        assert_eq!(authors.get("X"), Some(AuthorNum(1)));
        assert_eq!(authors.len(), 1);
        assert_eq!(authors.get_or_create("Y"), (AuthorNum(3), true));
    }

    #[test]
    fn test_max_stored_id_is_rejected() {
        let result = IdRegistry::from_rows(vec![
            (AuthorNum(1), "X".to_string()),
            (AuthorNum(u32::MAX), "Y".to_string()),
        ]);
        assert!(matches!(result, Err(AppError::Validation(_))));

        let dists = IdRegistry::from_rows(vec![(DistId(u32::MAX - 1), "Foo".to_string())])
            .unwrap();
        assert_eq!(dists.get("Foo"), Some(DistId(u32::MAX - 1)));
    }

    #[test]
    fn test_empty_registry() {
        let mut authors: IdRegistry<AuthorNum> = IdRegistry::default();
        assert!(authors.is_empty());
        assert_eq!(authors.get("nobody"), None);
        assert_eq!(authors.get_or_create("somebody"), (AuthorNum(1), true));
    }
}
