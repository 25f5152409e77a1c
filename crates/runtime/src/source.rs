//! Data source contracts
//!
//! The board never talks to a backend directly; it consumes these traits.
//! Sources deliver full snapshots ("loaded" events), never incremental
//! updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use peb_core::{BoardFilter, PortfolioItem, PortfolioItemType, TypeId, WorkflowState};

/// Data source failure.
///
/// Fetch failures reach the controller instead of stalling a load forever;
/// the controller turns them into a retryable error phase.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("unknown item type: {0}")]
    UnknownType(TypeId),

    #[error("source unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Full type list, sorted by descending ordinal rank.
#[derive(Debug, Clone)]
pub struct TypeSnapshot {
    pub types: Vec<PortfolioItemType>,
    pub fetched_at: DateTime<Utc>,
}

/// Workflow states of one type, sorted ascending by ordering value.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub item_type: TypeId,
    pub states: Vec<WorkflowState>,
    pub fetched_at: DateTime<Utc>,
}

/// Source of portfolio item types.
#[async_trait]
pub trait TypeSource: Send + Sync {
    /// Load the full type list, ordered by descending ordinal rank.
    async fn load_types(&self) -> Result<TypeSnapshot>;
}

/// Source of workflow states for a selected type.
#[async_trait]
pub trait WorkflowStateSource: Send + Sync {
    /// Load the states of `item_type`, ordered ascending by value.
    async fn states_for(&self, item_type: TypeId) -> Result<StateSnapshot>;
}

/// Source of the items a board renders as cards.
///
/// Board surfaces fetch their own cards; the controller only hands them the
/// filter.
#[async_trait]
pub trait ItemSource: Send + Sync {
    async fn items_matching(&self, filter: &BoardFilter) -> Result<Vec<PortfolioItem>>;
}
