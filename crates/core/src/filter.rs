//! Board filter predicate

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, PortfolioItem, TypeId};

/// Conjunction of equality predicates applied to board items: always the
/// selected type, optionally a chosen parent item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFilter {
    pub item_type: TypeId,
    pub parent: Option<ItemId>,
}

impl BoardFilter {
    pub fn for_type(item_type: TypeId) -> Self {
        Self {
            item_type,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: ItemId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Whether `item` belongs on a board using this filter.
    pub fn matches(&self, item: &PortfolioItem) -> bool {
        if item.item_type != self.item_type {
            return false;
        }
        match self.parent {
            Some(parent) => item.parent == Some(parent),
            None => true,
        }
    }
}
