//! PEB Runtime - board orchestration
//!
//! Contains:
//! - Source: async data-source contracts and the dataset-backed impls
//! - Chooser: the ancestor chooser gateway
//! - Board: render-target contract (surface plus owned instance handle)
//! - Controller: the queue-driven board controller

mod board;
mod chooser;
mod controller;
mod dataset;
mod source;

pub use board::{BoardInstance, BoardSpec, BoardSurface, ParentControl};
pub use chooser::{AncestorChooser, ChannelChooser, ChooserRequest, StaticChooser};
pub use controller::{
    BoardController, BoardEvent, BoardHandle, BoardListener, BoardMessage, Phase,
    NO_STATES_MESSAGE,
};
pub use dataset::{Dataset, DatasetSource, TypeStates};
pub use source::{
    ItemSource, SourceError, StateSnapshot, TypeSnapshot, TypeSource, WorkflowStateSource,
};
