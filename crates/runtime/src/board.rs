//! Board render target contract
//!
//! The controller owns at most one live board instance and replaces it with
//! an explicit destroy-then-mount; surfaces render what they are handed and
//! nothing else.

use async_trait::async_trait;

use peb_core::{BoardFilter, Column, PortfolioItemType, TypeId};

use crate::source::Result;

/// Everything a surface needs to mount a board.
#[derive(Debug, Clone)]
pub struct BoardSpec {
    pub filter: BoardFilter,
    /// Ordered columns, unclassified first.
    pub columns: Vec<Column>,
    /// Drag-drop group, scoped to the selected type.
    pub drag_group: String,
    /// Whether drag-rank ordering is enabled for the workspace.
    pub ranking_enabled: bool,
    /// Description shown while the board loads.
    pub load_description: String,
}

/// Parent-filter control state. The controller decides, the surface renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParentControl {
    #[default]
    Hidden,
    Visible {
        label: String,
    },
}

impl ParentControl {
    /// Control label for a parent type, e.g. "Filter By Initiative".
    pub fn for_parent(parent: &PortfolioItemType) -> Self {
        ParentControl::Visible {
            label: format!("Filter By {}", parent.name),
        }
    }
}

/// A mounted board. Exactly one exists at a time; the controller destroys
/// the previous instance before mounting its replacement.
pub trait BoardInstance: Send + Sync {
    fn spec(&self) -> &BoardSpec;

    /// Tear the board down and release its display resources.
    fn destroy(self: Box<Self>);
}

/// Render target for the controller.
#[async_trait]
pub trait BoardSurface: Send + Sync {
    /// Mount a new board. The previous instance is already destroyed by the
    /// time this is called.
    async fn mount(&self, spec: BoardSpec) -> Result<Box<dyn BoardInstance>>;

    /// Render the "no states defined" message in place of a board.
    fn show_empty_state(&self, message: &str);

    /// Render a fetch failure with a retry affordance.
    fn show_fetch_error(&self, message: &str);

    /// Show, relabel or hide the parent-filter control.
    fn set_parent_control(&self, control: ParentControl);

    /// Refresh the type selector control.
    fn set_type_selector(&self, types: &[PortfolioItemType], selected: Option<TypeId>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_control_label() {
        let initiative = PortfolioItemType::new("Initiative", 2);
        assert_eq!(
            ParentControl::for_parent(&initiative),
            ParentControl::Visible {
                label: "Filter By Initiative".to_string()
            }
        );
    }

    #[test]
    fn test_parent_control_defaults_hidden() {
        assert_eq!(ParentControl::default(), ParentControl::Hidden);
    }
}
