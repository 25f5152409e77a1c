//! Column derivation from workflow states

use serde::{Deserialize, Serialize};

use crate::types::{StateId, WorkflowState};

/// Display label of the synthetic column that collects items with no state.
pub const NO_ENTRY_LABEL: &str = "No Entry";

/// Card cap for the synthetic unclassified column.
pub const NO_ENTRY_CARD_LIMIT: u32 = 50;

/// One board column. Order within a column list is significant: render order
/// equals match order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// State the column matches items against; `None` is the unclassified
    /// sentinel.
    pub value: Option<StateId>,
    pub display_value: String,
    /// Hard cap on rendered cards. Always set for the unclassified column.
    pub card_limit: Option<u32>,
    /// WIP limit carried over from the state, if it declares one.
    pub wip_limit: Option<u32>,
    /// Policy text shown alongside the column.
    pub policy: Option<String>,
}

/// Result of a column build: a renderable ordered column list, or the
/// explicit "this type has no states" signal. The signal is distinct from an
/// empty list: callers render a message instead of a zero-column board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSet {
    NoStates,
    /// Ordered columns, the unclassified column first. Never empty.
    Columns(Vec<Column>),
}

impl ColumnSet {
    /// The columns, or `None` for the no-states signal.
    pub fn columns(&self) -> Option<&[Column]> {
        match self {
            ColumnSet::NoStates => None,
            ColumnSet::Columns(columns) => Some(columns),
        }
    }
}

/// Build the board columns for a set of workflow states.
///
/// Input order is preserved; callers pass states ascending by ordering
/// value; the builder never sorts or deduplicates.
pub fn build_columns(states: &[WorkflowState]) -> ColumnSet {
    if states.is_empty() {
        return ColumnSet::NoStates;
    }

    let mut columns = Vec::with_capacity(states.len() + 1);
    columns.push(Column {
        value: None,
        display_value: NO_ENTRY_LABEL.to_string(),
        card_limit: Some(NO_ENTRY_CARD_LIMIT),
        wip_limit: None,
        policy: None,
    });

    for state in states {
        columns.push(Column {
            value: Some(state.id),
            display_value: state.name.clone(),
            card_limit: None,
            wip_limit: state.wip_limit,
            policy: state.policy.clone(),
        });
    }

    ColumnSet::Columns(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_states_yields_signal_not_empty_list() {
        let set = build_columns(&[]);
        assert_eq!(set, ColumnSet::NoStates);
        assert!(set.columns().is_none());
    }

    #[test]
    fn test_unclassified_column_prepended() {
        let states = vec![WorkflowState::new("Backlog", 10)];
        let set = build_columns(&states);
        let columns = set.columns().expect("columns");

        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].value, None);
        assert_eq!(columns[0].display_value, NO_ENTRY_LABEL);
        assert_eq!(columns[0].card_limit, Some(NO_ENTRY_CARD_LIMIT));
        assert_eq!(columns[0].wip_limit, None);
    }

    #[test]
    fn test_state_columns_preserve_order_and_metadata() {
        let states = vec![
            WorkflowState::new("Backlog", 10),
            WorkflowState::new("Doing", 20)
                .with_wip_limit(3)
                .with_policy("Swarm before you start new work"),
            WorkflowState::new("Done", 30),
        ];
        let set = build_columns(&states);
        let columns = set.columns().expect("columns");

        assert_eq!(columns.len(), 4);
        assert_eq!(columns[1].display_value, "Backlog");
        assert_eq!(columns[1].value, Some(states[0].id));
        assert_eq!(columns[1].wip_limit, None);
        assert_eq!(columns[2].display_value, "Doing");
        assert_eq!(columns[2].wip_limit, Some(3));
        assert_eq!(
            columns[2].policy.as_deref(),
            Some("Swarm before you start new work")
        );
        assert_eq!(columns[3].display_value, "Done");
        assert_eq!(columns[3].value, Some(states[2].id));
    }

    #[test]
    fn test_builder_does_not_resort() {
        // Deliberately out of order; ordering fidelity is the caller's job.
        let states = vec![
            WorkflowState::new("Done", 30),
            WorkflowState::new("Backlog", 10),
        ];
        let set = build_columns(&states);
        let columns = set.columns().expect("columns");
        assert_eq!(columns[1].display_value, "Done");
        assert_eq!(columns[2].display_value, "Backlog");
    }
}
