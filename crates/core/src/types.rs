//! Core domain records for the estimation board

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a portfolio item type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(pub Uuid);

impl TypeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateId(pub Uuid);

impl StateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a portfolio item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A rank-ordered classification of work items (e.g. Theme, Initiative,
/// Feature). Higher ordinal = more ancestral. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItemType {
    pub id: TypeId,
    pub name: String,
    pub ordinal: i64,
}

impl PortfolioItemType {
    pub fn new(name: impl Into<String>, ordinal: i64) -> Self {
        Self {
            id: TypeId::new(),
            name: name.into(),
            ordinal,
        }
    }
}

/// A named stage in an item's lifecycle, with an optional WIP limit and
/// policy description. Loaded per selected type; immutable snapshot per load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: StateId,
    pub name: String,
    /// Numeric ordering value; state lists are sorted ascending by it.
    pub value: i64,
    pub wip_limit: Option<u32>,
    pub policy: Option<String>,
}

impl WorkflowState {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            id: StateId::new(),
            name: name.into(),
            value,
            wip_limit: None,
            policy: None,
        }
    }

    pub fn with_wip_limit(mut self, limit: u32) -> Self {
        self.wip_limit = Some(limit);
        self
    }

    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = Some(policy.into());
        self
    }
}

/// A single work item rendered as a card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: ItemId,
    pub name: String,
    pub item_type: TypeId,
    /// Workflow state the item is in; `None` lands it in the unclassified
    /// column.
    pub state: Option<StateId>,
    /// Parent item one hierarchy level up, if any.
    pub parent: Option<ItemId>,
    /// Drag-rank position, meaningful only when ranking is enabled.
    pub rank: Option<i64>,
}

impl PortfolioItem {
    pub fn new(name: impl Into<String>, item_type: TypeId) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            item_type,
            state: None,
            parent: None,
            rank: None,
        }
    }

    pub fn in_state(mut self, state: StateId) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_parent(mut self, parent: ItemId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }
}
