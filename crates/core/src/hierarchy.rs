//! Parent derivation over the rank-ordered type list

use std::collections::HashMap;

use crate::types::{PortfolioItemType, TypeId};

/// Mapping from each loaded type to its single parent type.
///
/// Total over the list it was resolved from: every type has an entry, the
/// highest-ranked type maps to `None`, and every other type maps to the type
/// immediately preceding it in descending-rank order. Rebuilt wholesale on
/// every type reload, never patched in place.
#[derive(Debug, Clone, Default)]
pub struct ParentMap {
    parents: HashMap<TypeId, Option<PortfolioItemType>>,
}

impl ParentMap {
    /// Derive the parent of every type from a list already sorted by
    /// descending ordinal rank. The element preceding a type in the list is
    /// its parent; the first element has none.
    ///
    /// Sorting is the caller's responsibility; input order is taken as the
    /// ancestry order.
    pub fn resolve(types: &[PortfolioItemType]) -> Self {
        let mut parents = HashMap::with_capacity(types.len());
        for (index, ty) in types.iter().enumerate() {
            let parent = if index == 0 {
                None
            } else {
                Some(types[index - 1].clone())
            };
            parents.insert(ty.id, parent);
        }
        tracing::debug!(types = types.len(), "parent map rebuilt");
        Self { parents }
    }

    /// Parent of `id`, or `None` for the topmost type and for ids the map
    /// was not resolved from.
    pub fn parent_of(&self, id: &TypeId) -> Option<&PortfolioItemType> {
        self.parents.get(id).and_then(|parent| parent.as_ref())
    }

    /// Whether `id` was part of the resolved list.
    pub fn contains(&self, id: &TypeId) -> bool {
        self.parents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_types() -> Vec<PortfolioItemType> {
        vec![
            PortfolioItemType::new("Theme", 3),
            PortfolioItemType::new("Initiative", 2),
            PortfolioItemType::new("Feature", 1),
        ]
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        let map = ParentMap::resolve(&[]);
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_single_type_has_no_parent() {
        let types = vec![PortfolioItemType::new("Theme", 3)];
        let map = ParentMap::resolve(&types);
        assert_eq!(map.len(), 1);
        assert!(map.contains(&types[0].id));
        assert!(map.parent_of(&types[0].id).is_none());
    }

    #[test]
    fn test_each_type_maps_to_its_predecessor() {
        let types = ranked_types();
        let map = ParentMap::resolve(&types);

        assert_eq!(map.len(), 3);
        // Theme -> none, Initiative -> Theme, Feature -> Initiative
        assert!(map.parent_of(&types[0].id).is_none());
        assert_eq!(map.parent_of(&types[1].id), Some(&types[0]));
        assert_eq!(map.parent_of(&types[2].id), Some(&types[1]));
    }

    #[test]
    fn test_unknown_id_has_no_parent_and_no_entry() {
        let map = ParentMap::resolve(&ranked_types());
        let stranger = TypeId::new();
        assert!(!map.contains(&stranger));
        assert!(map.parent_of(&stranger).is_none());
    }

    #[test]
    fn test_map_size_equals_input_size() {
        for n in 0..6 {
            let types: Vec<_> = (0..n)
                .map(|i| PortfolioItemType::new(format!("T{}", i), (n - i) as i64))
                .collect();
            let map = ParentMap::resolve(&types);
            assert_eq!(map.len(), n);
        }
    }
}
