//! Dataset-backed sources
//!
//! A `Dataset` describes a whole board universe (types, per-type states,
//! items) and serves every source trait from memory. JSON file loading for
//! demo and fixture data.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use peb_core::{
    BoardFilter, PortfolioItem, PortfolioItemType, TypeId, WorkflowState,
};

use crate::source::{
    ItemSource, Result, SourceError, StateSnapshot, TypeSnapshot, TypeSource,
    WorkflowStateSource,
};

/// Workflow states belonging to one item type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeStates {
    pub item_type: TypeId,
    pub states: Vec<WorkflowState>,
}

/// A complete, immutable board dataset.
///
/// A type with no `states` entry simply has zero workflow states; that is
/// the empty-board case, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub types: Vec<PortfolioItemType>,
    #[serde(default)]
    pub states: Vec<TypeStates>,
    #[serde(default)]
    pub items: Vec<PortfolioItem>,
}

impl Dataset {
    /// Load a dataset from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let dataset: Dataset = serde_json::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            types = dataset.types.len(),
            items = dataset.items.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    /// Built-in demo dataset: a Theme > Initiative > Feature hierarchy with
    /// estimation states for the two lower levels. Themes carry no states,
    /// which demonstrates the empty-board path.
    pub fn sample() -> Self {
        let theme = PortfolioItemType::new("Theme", 3);
        let initiative = PortfolioItemType::new("Initiative", 2);
        let feature = PortfolioItemType::new("Feature", 1);

        let initiative_states = vec![
            WorkflowState::new("Small", 10),
            WorkflowState::new("Medium", 20),
            WorkflowState::new("Large", 30).with_policy("Split before committing a quarter"),
        ];
        let feature_states = vec![
            WorkflowState::new("XS", 10),
            WorkflowState::new("S", 20),
            WorkflowState::new("M", 30).with_wip_limit(4),
            WorkflowState::new("L", 40)
                .with_wip_limit(2)
                .with_policy("Needs an architecture review"),
        ];

        let retention = PortfolioItem::new("Customer Retention", theme.id);
        let modernization = PortfolioItem::new("Platform Modernization", theme.id);

        let onboarding = PortfolioItem::new("Self-serve Onboarding", initiative.id)
            .with_parent(retention.id)
            .in_state(initiative_states[1].id);
        let billing = PortfolioItem::new("Usage-based Billing", initiative.id)
            .with_parent(retention.id)
            .in_state(initiative_states[2].id);
        let migration = PortfolioItem::new("Queue Migration", initiative.id)
            .with_parent(modernization.id);

        let items = vec![
            retention.clone(),
            modernization.clone(),
            onboarding.clone(),
            billing.clone(),
            migration.clone(),
            PortfolioItem::new("Welcome Checklist", feature.id)
                .with_parent(onboarding.id)
                .in_state(feature_states[0].id)
                .with_rank(1),
            PortfolioItem::new("Trial Extension Flow", feature.id)
                .with_parent(onboarding.id)
                .in_state(feature_states[2].id)
                .with_rank(2),
            PortfolioItem::new("Metered Events API", feature.id)
                .with_parent(billing.id)
                .in_state(feature_states[3].id)
                .with_rank(3),
            PortfolioItem::new("Invoice Preview", feature.id)
                .with_parent(billing.id)
                .with_rank(4),
            PortfolioItem::new("Dead-letter Replay", feature.id)
                .with_parent(migration.id)
                .in_state(feature_states[1].id),
        ];

        Self {
            states: vec![
                TypeStates {
                    item_type: initiative.id,
                    states: initiative_states,
                },
                TypeStates {
                    item_type: feature.id,
                    states: feature_states,
                },
            ],
            types: vec![theme, initiative, feature],
            items,
        }
    }
}

/// Serves every source trait from an in-memory dataset.
#[derive(Debug, Clone)]
pub struct DatasetSource {
    dataset: Arc<Dataset>,
}

impl DatasetSource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Arc::new(dataset),
        }
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        Ok(Self::new(Dataset::load(path).await?))
    }
}

#[async_trait]
impl TypeSource for DatasetSource {
    async fn load_types(&self) -> Result<TypeSnapshot> {
        let mut types = self.dataset.types.clone();
        // Source contract: descending ordinal rank.
        types.sort_by(|a, b| b.ordinal.cmp(&a.ordinal));
        Ok(TypeSnapshot {
            types,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl WorkflowStateSource for DatasetSource {
    async fn states_for(&self, item_type: TypeId) -> Result<StateSnapshot> {
        if !self.dataset.types.iter().any(|t| t.id == item_type) {
            return Err(SourceError::UnknownType(item_type));
        }
        let mut states = self
            .dataset
            .states
            .iter()
            .find(|entry| entry.item_type == item_type)
            .map(|entry| entry.states.clone())
            .unwrap_or_default();
        // Source contract: ascending ordering value.
        states.sort_by_key(|state| state.value);
        Ok(StateSnapshot {
            item_type,
            states,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl ItemSource for DatasetSource {
    async fn items_matching(&self, filter: &BoardFilter) -> Result<Vec<PortfolioItem>> {
        let mut items: Vec<PortfolioItem> = self
            .dataset
            .items
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        // Ranked items first in rank order, the rest alphabetical.
        items.sort_by(|a, b| match (a.rank, b.rank) {
            (Some(ar), Some(br)) => ar.cmp(&br),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.name.cmp(&b.name),
        });
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_types_come_back_in_descending_rank_order() {
        let source = DatasetSource::new(Dataset::sample());
        let snapshot = source.load_types().await.unwrap();
        let ordinals: Vec<i64> = snapshot.types.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_states_come_back_ascending_by_value() {
        let dataset = Dataset::sample();
        let feature = dataset.types.iter().find(|t| t.name == "Feature").unwrap().id;
        let source = DatasetSource::new(dataset);

        let snapshot = source.states_for(feature).await.unwrap();
        let values: Vec<i64> = snapshot.states.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn test_type_without_states_entry_yields_zero_states() {
        let dataset = Dataset::sample();
        let theme = dataset.types.iter().find(|t| t.name == "Theme").unwrap().id;
        let source = DatasetSource::new(dataset);

        let snapshot = source.states_for(theme).await.unwrap();
        assert!(snapshot.states.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_type_is_an_error() {
        let source = DatasetSource::new(Dataset::sample());
        let result = source.states_for(TypeId::new()).await;
        assert!(matches!(result, Err(SourceError::UnknownType(_))));
    }

    #[tokio::test]
    async fn test_items_filtered_by_type_and_parent() {
        let dataset = Dataset::sample();
        let feature = dataset.types.iter().find(|t| t.name == "Feature").unwrap().id;
        let billing = dataset
            .items
            .iter()
            .find(|i| i.name == "Usage-based Billing")
            .unwrap()
            .id;
        let source = DatasetSource::new(dataset);

        let all = source
            .items_matching(&BoardFilter::for_type(feature))
            .await
            .unwrap();
        assert_eq!(all.len(), 5);

        let under_billing = source
            .items_matching(&BoardFilter::for_type(feature).with_parent(billing))
            .await
            .unwrap();
        let names: Vec<&str> = under_billing.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Metered Events API", "Invoice Preview"]);
    }

    #[tokio::test]
    async fn test_ranked_items_sort_before_unranked() {
        let dataset = Dataset::sample();
        let feature = dataset.types.iter().find(|t| t.name == "Feature").unwrap().id;
        let source = DatasetSource::new(dataset);

        let items = source
            .items_matching(&BoardFilter::for_type(feature))
            .await
            .unwrap();
        assert_eq!(items[0].name, "Welcome Checklist");
        assert_eq!(items.last().unwrap().name, "Dead-letter Replay");
    }

    #[tokio::test]
    async fn test_dataset_round_trips_through_a_file() {
        let dataset = Dataset::sample();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string_pretty(&dataset).unwrap().as_bytes())
            .unwrap();

        let loaded = Dataset::load(file.path()).await.unwrap();
        assert_eq!(loaded.types, dataset.types);
        assert_eq!(loaded.items, dataset.items);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let result = Dataset::load(Path::new("/definitely/not/here.json")).await;
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
