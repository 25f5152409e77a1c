//! TUI board surface
//!
//! `BoardSurface` implementation over a shared view model: the controller
//! mutates the model through this surface, the draw loop reads it. The board
//! fetches its own cards from the item source at mount time, exactly like
//! the cardboard widget it stands in for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use peb_core::{Column, PortfolioItem, PortfolioItemType, TypeId};
use peb_runtime::{BoardInstance, BoardSpec, BoardSurface, ItemSource, ParentControl, SourceError};

/// Full-screen notice shown instead of a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Empty(String),
    Error(String),
}

/// A mounted board with its cards distributed into columns.
#[derive(Debug, Clone)]
pub struct MountedBoard {
    pub id: u64,
    pub spec: BoardSpec,
    /// One card list per column, capped by the column's card limit.
    pub cards: Vec<Vec<PortfolioItem>>,
}

/// What the TUI paints. Mutated by the controller through `TuiSurface`,
/// read by the draw loop.
#[derive(Debug, Default)]
pub struct SurfaceModel {
    pub types: Vec<PortfolioItemType>,
    pub selected: Option<TypeId>,
    pub parent_control: ParentControl,
    pub board: Option<MountedBoard>,
    pub notice: Option<Notice>,
    /// Shown while no board is mounted yet.
    pub loading_label: String,
}

/// Distribute items into per-column card lists, in column order, capping
/// each list at the column's card limit.
pub fn assign_cards(columns: &[Column], items: &[PortfolioItem]) -> Vec<Vec<PortfolioItem>> {
    columns
        .iter()
        .map(|column| {
            let mut cards: Vec<PortfolioItem> = items
                .iter()
                .filter(|item| item.state == column.value)
                .cloned()
                .collect();
            if let Some(limit) = column.card_limit {
                cards.truncate(limit as usize);
            }
            cards
        })
        .collect()
}

/// Render target backed by the shared view model.
pub struct TuiSurface {
    model: Arc<Mutex<SurfaceModel>>,
    items: Arc<dyn ItemSource>,
    next_id: AtomicU64,
}

impl TuiSurface {
    pub fn new(model: Arc<Mutex<SurfaceModel>>, items: Arc<dyn ItemSource>) -> Self {
        Self {
            model,
            items,
            next_id: AtomicU64::new(1),
        }
    }
}

struct TuiBoard {
    id: u64,
    spec: BoardSpec,
    model: Arc<Mutex<SurfaceModel>>,
}

impl BoardInstance for TuiBoard {
    fn spec(&self) -> &BoardSpec {
        &self.spec
    }

    fn destroy(self: Box<Self>) {
        let mut model = self.model.lock().expect("surface model poisoned");
        // Only clear the display if this instance is still the one shown.
        if model.board.as_ref().map(|b| b.id) == Some(self.id) {
            model.board = None;
        }
    }
}

#[async_trait]
impl BoardSurface for TuiSurface {
    async fn mount(&self, spec: BoardSpec) -> Result<Box<dyn BoardInstance>, SourceError> {
        let items = self.items.items_matching(&spec.filter).await?;
        let cards = assign_cards(&spec.columns, &items);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(id, cards = items.len(), "board mounted");

        let mut model = self.model.lock().expect("surface model poisoned");
        model.notice = None;
        model.board = Some(MountedBoard {
            id,
            spec: spec.clone(),
            cards,
        });
        drop(model);

        Ok(Box::new(TuiBoard {
            id,
            spec,
            model: Arc::clone(&self.model),
        }))
    }

    fn show_empty_state(&self, message: &str) {
        let mut model = self.model.lock().expect("surface model poisoned");
        model.notice = Some(Notice::Empty(message.to_string()));
    }

    fn show_fetch_error(&self, message: &str) {
        let mut model = self.model.lock().expect("surface model poisoned");
        model.notice = Some(Notice::Error(message.to_string()));
    }

    fn set_parent_control(&self, control: ParentControl) {
        let mut model = self.model.lock().expect("surface model poisoned");
        model.parent_control = control;
    }

    fn set_type_selector(&self, types: &[PortfolioItemType], selected: Option<TypeId>) {
        let mut model = self.model.lock().expect("surface model poisoned");
        model.types = types.to_vec();
        model.selected = selected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peb_core::{build_columns, BoardFilter, ColumnSet, WorkflowState};

    struct FixedItems(Vec<PortfolioItem>);

    #[async_trait]
    impl ItemSource for FixedItems {
        async fn items_matching(
            &self,
            filter: &BoardFilter,
        ) -> Result<Vec<PortfolioItem>, SourceError> {
            Ok(self.0.iter().filter(|i| filter.matches(i)).cloned().collect())
        }
    }

    fn columns_for(states: &[WorkflowState]) -> Vec<Column> {
        match build_columns(states) {
            ColumnSet::Columns(columns) => columns,
            ColumnSet::NoStates => panic!("expected columns"),
        }
    }

    #[test]
    fn test_assign_cards_distributes_by_state() {
        let feature = TypeId::new();
        let states = vec![WorkflowState::new("XS", 10), WorkflowState::new("S", 20)];
        let columns = columns_for(&states);

        let items = vec![
            PortfolioItem::new("Unsized", feature),
            PortfolioItem::new("Small A", feature).in_state(states[1].id),
            PortfolioItem::new("Tiny", feature).in_state(states[0].id),
            PortfolioItem::new("Small B", feature).in_state(states[1].id),
        ];
        let cards = assign_cards(&columns, &items);

        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].len(), 1); // No Entry
        assert_eq!(cards[0][0].name, "Unsized");
        assert_eq!(cards[1].len(), 1); // XS
        assert_eq!(cards[2].len(), 2); // S
    }

    #[test]
    fn test_assign_cards_caps_at_card_limit() {
        let feature = TypeId::new();
        let columns = columns_for(&[WorkflowState::new("XS", 10)]);

        // 60 stateless items against the 50-card unclassified cap.
        let items: Vec<PortfolioItem> = (0..60)
            .map(|i| PortfolioItem::new(format!("Item {}", i), feature))
            .collect();
        let cards = assign_cards(&columns, &items);

        assert_eq!(cards[0].len(), 50);
        assert!(cards[1].is_empty());
    }

    #[tokio::test]
    async fn test_mount_populates_and_destroy_clears_the_model() {
        let feature = TypeId::new();
        let states = vec![WorkflowState::new("XS", 10)];
        let columns = columns_for(&states);
        let items = vec![PortfolioItem::new("Login", feature).in_state(states[0].id)];

        let model = Arc::new(Mutex::new(SurfaceModel::default()));
        let surface = TuiSurface::new(Arc::clone(&model), Arc::new(FixedItems(items)));

        let spec = BoardSpec {
            filter: BoardFilter::for_type(feature),
            columns,
            drag_group: "Feature".to_string(),
            ranking_enabled: true,
            load_description: "Board".to_string(),
        };
        let board = surface.mount(spec).await.unwrap();
        {
            let model = model.lock().unwrap();
            let mounted = model.board.as_ref().expect("mounted");
            assert_eq!(mounted.cards[1].len(), 1);
            assert!(model.notice.is_none());
        }

        board.destroy();
        assert!(model.lock().unwrap().board.is_none());
    }

    #[tokio::test]
    async fn test_stale_destroy_does_not_clobber_the_new_board() {
        let feature = TypeId::new();
        let columns = columns_for(&[WorkflowState::new("XS", 10)]);
        let model = Arc::new(Mutex::new(SurfaceModel::default()));
        let surface = TuiSurface::new(Arc::clone(&model), Arc::new(FixedItems(Vec::new())));

        let spec = BoardSpec {
            filter: BoardFilter::for_type(feature),
            columns,
            drag_group: "Feature".to_string(),
            ranking_enabled: false,
            load_description: "Board".to_string(),
        };
        let first = surface.mount(spec.clone()).await.unwrap();
        let second = surface.mount(spec).await.unwrap();
        let second_id = model.lock().unwrap().board.as_ref().unwrap().id;

        // Destroying the superseded instance leaves the current one alone.
        first.destroy();
        assert_eq!(
            model.lock().unwrap().board.as_ref().map(|b| b.id),
            Some(second_id)
        );

        second.destroy();
        assert!(model.lock().unwrap().board.is_none());
    }

    #[test]
    fn test_empty_state_replaces_notice_on_mount() {
        let model = Arc::new(Mutex::new(SurfaceModel::default()));
        let surface = TuiSurface::new(Arc::clone(&model), Arc::new(FixedItems(Vec::new())));

        surface.show_empty_state("This type has no states defined.");
        assert_eq!(
            model.lock().unwrap().notice,
            Some(Notice::Empty("This type has no states defined.".to_string()))
        );

        surface.show_fetch_error("boom");
        assert_eq!(
            model.lock().unwrap().notice,
            Some(Notice::Error("boom".to_string()))
        );
    }
}
