//! Board controller
//!
//! Single point of truth for what the board currently shows. The controller
//! is owned by one task that drains a message queue in arrival order, user
//! commands and fetch completions alike, so there is no parallelism inside
//! it. Fetches are spawned tasks that post their completion back into the
//! same queue; in-flight fetches are never cancelled, but every state fetch
//! carries a generation number and stale completions are discarded.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use peb_core::{
    build_columns, BoardFilter, BoardSettings, ColumnSet, ItemId, ParentMap,
    PortfolioItem, PortfolioItemType, TypeId,
};

use crate::board::{BoardInstance, BoardSpec, BoardSurface, ParentControl};
use crate::chooser::AncestorChooser;
use crate::source::{SourceError, StateSnapshot, TypeSnapshot, TypeSource, WorkflowStateSource};

/// Message shown when a type has no workflow states.
pub const NO_STATES_MESSAGE: &str = "This type has no states defined.";

/// Controller lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    TypesLoaded,
    TypeSelected,
    StatesLoading,
    BoardRendered,
    EmptyRendered,
    LoadFailed,
}

/// Everything the controller reacts to, processed strictly in arrival order.
#[derive(Debug)]
pub enum BoardMessage {
    /// (Re)load the type list wholesale.
    LoadTypes,
    /// Type list fetch finished.
    TypesLoaded(Result<TypeSnapshot, SourceError>),
    /// User picked a type.
    SelectType(TypeId),
    /// State fetch for a selected type finished.
    StatesLoaded {
        generation: u64,
        result: Result<StateSnapshot, SourceError>,
    },
    /// User asked to pick a parent filter.
    ChooseParentFilter,
    /// User cleared the parent filter.
    ClearParentFilter,
    /// Retry the last failed fetch.
    Retry,
    /// Stop processing.
    Shutdown,
}

/// Notifications emitted after each handled transition.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    TypesLoaded { count: usize },
    TypeSelected { id: TypeId },
    BoardRebuilt { columns: usize },
    EmptyRendered,
    LoadFailed { message: String },
    AncestorChosen { item: ItemId },
    AncestorCleared,
    StaleFetchDropped { generation: u64 },
}

/// Observer of controller transitions.
#[async_trait]
pub trait BoardListener: Send + Sync {
    async fn on_event(&self, event: &BoardEvent);
}

/// Which fetch failed last, for `Retry`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchTarget {
    Types,
    States,
}

/// Cloneable command handle feeding the controller's queue.
#[derive(Debug, Clone)]
pub struct BoardHandle {
    tx: mpsc::UnboundedSender<BoardMessage>,
}

impl BoardHandle {
    /// Request the initial type load, or a wholesale reload.
    pub fn load_types(&self) {
        let _ = self.tx.send(BoardMessage::LoadTypes);
    }

    pub fn select_type(&self, id: TypeId) {
        let _ = self.tx.send(BoardMessage::SelectType(id));
    }

    pub fn choose_parent_filter(&self) {
        let _ = self.tx.send(BoardMessage::ChooseParentFilter);
    }

    pub fn clear_parent_filter(&self) {
        let _ = self.tx.send(BoardMessage::ClearParentFilter);
    }

    pub fn retry(&self) {
        let _ = self.tx.send(BoardMessage::Retry);
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(BoardMessage::Shutdown);
    }
}

/// The board controller. See the module docs for the queue discipline.
pub struct BoardController {
    types: Arc<dyn TypeSource>,
    states: Arc<dyn WorkflowStateSource>,
    chooser: Arc<dyn AncestorChooser>,
    surface: Arc<dyn BoardSurface>,
    settings: BoardSettings,
    listeners: Vec<Arc<dyn BoardListener>>,

    phase: Phase,
    type_list: Vec<PortfolioItemType>,
    parent_map: ParentMap,
    current_type: Option<PortfolioItemType>,
    parent_filter: Option<PortfolioItem>,
    board: Option<Box<dyn BoardInstance>>,
    generation: u64,
    last_failed: Option<FetchTarget>,

    tx: mpsc::UnboundedSender<BoardMessage>,
    rx: mpsc::UnboundedReceiver<BoardMessage>,
}

impl BoardController {
    pub fn new(
        types: Arc<dyn TypeSource>,
        states: Arc<dyn WorkflowStateSource>,
        chooser: Arc<dyn AncestorChooser>,
        surface: Arc<dyn BoardSurface>,
        settings: BoardSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            types,
            states,
            chooser,
            surface,
            settings,
            listeners: Vec::new(),
            phase: Phase::Uninitialized,
            type_list: Vec::new(),
            parent_map: ParentMap::default(),
            current_type: None,
            parent_filter: None,
            board: None,
            generation: 0,
            last_failed: None,
            tx,
            rx,
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn BoardListener>) {
        self.listeners.push(listener);
    }

    /// Command handle for frontends. Cloneable; sends are fire-and-forget.
    pub fn handle(&self) -> BoardHandle {
        BoardHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_type(&self) -> Option<&PortfolioItemType> {
        self.current_type.as_ref()
    }

    pub fn parent_filter(&self) -> Option<&PortfolioItem> {
        self.parent_filter.as_ref()
    }

    pub fn has_live_board(&self) -> bool {
        self.board.is_some()
    }

    /// Drain the queue until shutdown, then tear the board down.
    pub async fn run(mut self) {
        while self.step().await {}
        if let Some(board) = self.board.take() {
            board.destroy();
        }
    }

    /// Receive and process the next message. Returns false once the queue
    /// closed or shutdown was requested.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            None | Some(BoardMessage::Shutdown) => false,
            Some(message) => {
                self.dispatch(message).await;
                true
            }
        }
    }

    async fn dispatch(&mut self, message: BoardMessage) {
        match message {
            BoardMessage::LoadTypes => self.load_types(),
            BoardMessage::TypesLoaded(result) => self.on_types_loaded(result).await,
            BoardMessage::SelectType(id) => self.select_type(id).await,
            BoardMessage::StatesLoaded { generation, result } => {
                self.on_states_loaded(generation, result).await
            }
            BoardMessage::ChooseParentFilter => self.choose_parent_filter().await,
            BoardMessage::ClearParentFilter => self.clear_parent_filter().await,
            BoardMessage::Retry => self.retry(),
            BoardMessage::Shutdown => {}
        }
    }

    // ── Type loading ────────────────────────────────────────────────────

    fn load_types(&self) {
        let source = Arc::clone(&self.types);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.load_types().await;
            let _ = tx.send(BoardMessage::TypesLoaded(result));
        });
    }

    async fn on_types_loaded(&mut self, result: Result<TypeSnapshot, SourceError>) {
        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(error) => {
                self.fetch_failed(FetchTarget::Types, &error).await;
                return;
            }
        };

        debug!(types = snapshot.types.len(), "type list loaded");
        self.type_list = snapshot.types;
        // Replaced wholesale, never patched.
        self.parent_map = ParentMap::resolve(&self.type_list);
        self.phase = Phase::TypesLoaded;
        self.emit(BoardEvent::TypesLoaded {
            count: self.type_list.len(),
        })
        .await;

        // Keep the current selection when the reloaded list still contains
        // it, otherwise fall back to the highest-ranked type.
        let selection = self
            .current_type
            .as_ref()
            .map(|t| t.id)
            .filter(|id| self.type_list.iter().any(|t| t.id == *id))
            .or_else(|| self.type_list.first().map(|t| t.id));

        match selection {
            Some(id) => self.select_type(id).await,
            None => {
                self.surface
                    .set_type_selector(&self.type_list, None);
                self.drop_board();
                self.surface.show_empty_state("No item types defined.");
                self.phase = Phase::EmptyRendered;
                self.emit(BoardEvent::EmptyRendered).await;
            }
        }
    }

    // ── Type selection ──────────────────────────────────────────────────

    async fn select_type(&mut self, id: TypeId) {
        let Some(selected) = self.type_list.iter().find(|t| t.id == id).cloned() else {
            warn!(%id, "ignoring selection of unknown type");
            return;
        };

        let changed = self.current_type.as_ref().map(|t| t.id) != Some(id);
        self.current_type = Some(selected);
        self.phase = Phase::TypeSelected;
        self.surface.set_type_selector(&self.type_list, Some(id));
        self.emit(BoardEvent::TypeSelected { id }).await;

        let parent_control = self
            .parent_map
            .parent_of(&id)
            .map(ParentControl::for_parent);
        match parent_control {
            Some(control) => {
                self.surface.set_parent_control(control);
                // A filter chosen for another type never carries over.
                if changed {
                    self.drop_parent_filter().await;
                }
            }
            None => {
                self.surface.set_parent_control(ParentControl::Hidden);
                self.drop_parent_filter().await;
            }
        }

        self.request_states();
    }

    async fn drop_parent_filter(&mut self) {
        if self.parent_filter.take().is_some() {
            self.emit(BoardEvent::AncestorCleared).await;
        }
    }

    // ── State loading ───────────────────────────────────────────────────

    fn request_states(&mut self) {
        let Some(current) = self.current_type.as_ref() else {
            return;
        };
        self.generation += 1;
        let generation = self.generation;
        self.phase = Phase::StatesLoading;

        let item_type = current.id;
        let source = Arc::clone(&self.states);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.states_for(item_type).await;
            let _ = tx.send(BoardMessage::StatesLoaded { generation, result });
        });
    }

    async fn on_states_loaded(
        &mut self,
        generation: u64,
        result: Result<StateSnapshot, SourceError>,
    ) {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "dropping superseded state fetch"
            );
            self.emit(BoardEvent::StaleFetchDropped { generation }).await;
            return;
        }

        match result {
            Ok(snapshot) => {
                let columns = build_columns(&snapshot.states);
                self.rebuild_board(columns).await;
            }
            Err(error) => self.fetch_failed(FetchTarget::States, &error).await,
        }
    }

    // ── Board rebuild ───────────────────────────────────────────────────

    async fn rebuild_board(&mut self, columns: ColumnSet) {
        let ColumnSet::Columns(columns) = columns else {
            self.drop_board();
            self.surface.show_empty_state(NO_STATES_MESSAGE);
            self.phase = Phase::EmptyRendered;
            self.emit(BoardEvent::EmptyRendered).await;
            return;
        };

        let Some(current) = self.current_type.clone() else {
            return;
        };

        let mut filter = BoardFilter::for_type(current.id);
        if let Some(parent) = self.parent_filter.as_ref() {
            filter = filter.with_parent(parent.id);
        }

        let spec = BoardSpec {
            filter,
            columns,
            drag_group: current.name.clone(),
            ranking_enabled: self.settings.ranking_enabled,
            load_description: self.settings.load_description.clone(),
        };

        // Release the previous instance before the replacement exists;
        // two live boards are never observable.
        self.drop_board();
        match self.surface.mount(spec).await {
            Ok(instance) => {
                let columns = instance.spec().columns.len();
                self.board = Some(instance);
                self.phase = Phase::BoardRendered;
                self.emit(BoardEvent::BoardRebuilt { columns }).await;
            }
            Err(error) => self.fetch_failed(FetchTarget::States, &error).await,
        }
    }

    fn drop_board(&mut self) {
        if let Some(board) = self.board.take() {
            board.destroy();
        }
    }

    // ── Parent filter ───────────────────────────────────────────────────

    async fn choose_parent_filter(&mut self) {
        let Some(current) = self.current_type.clone() else {
            warn!("parent filter requested before a type was selected");
            return;
        };
        let constraint = self.parent_map.parent_of(&current.id).cloned();

        let chosen = match self.chooser.choose(constraint.as_ref()).await {
            Ok(chosen) => chosen,
            Err(error) => {
                warn!(%error, "ancestor chooser failed");
                return;
            }
        };

        let Some(item) = chosen else {
            debug!("ancestor chooser cancelled");
            return;
        };

        debug!(item = %item.id, "parent filter chosen");
        let id = item.id;
        self.parent_filter = Some(item);
        self.emit(BoardEvent::AncestorChosen { item: id }).await;
        // Columns will not change, but the board's filter predicate does,
        // so the whole fetch/build/rebuild cycle runs again.
        self.request_states();
    }

    async fn clear_parent_filter(&mut self) {
        if self.parent_filter.take().is_none() {
            return;
        }
        self.emit(BoardEvent::AncestorCleared).await;
        self.request_states();
    }

    // ── Failure handling ────────────────────────────────────────────────

    async fn fetch_failed(&mut self, target: FetchTarget, error: &SourceError) {
        warn!(%error, ?target, "fetch failed");
        self.drop_board();
        let message = error.to_string();
        self.surface.show_fetch_error(&message);
        self.phase = Phase::LoadFailed;
        self.last_failed = Some(target);
        self.emit(BoardEvent::LoadFailed { message }).await;
    }

    fn retry(&mut self) {
        match self.last_failed.take() {
            Some(FetchTarget::Types) => self.load_types(),
            Some(FetchTarget::States) => self.request_states(),
            None => debug!("retry requested with nothing to retry"),
        }
    }

    async fn emit(&self, event: BoardEvent) {
        for listener in &self.listeners {
            listener.on_event(&event).await;
        }
    }
}
