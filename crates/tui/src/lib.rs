//! PEB TUI - terminal rendering for the estimation board
//!
//! This crate provides the ratatui-based board surface and the interactive
//! application loop. It depends on `peb-runtime` for the controller contract
//! and never holds board state of its own beyond the shared view model.

mod app;
mod board_view;
mod surface;

pub use app::{run_board_tui, ChooserModal};
pub use board_view::{column_title, render_board, render_chooser, wip_exceeded};
pub use surface::{assign_cards, MountedBoard, Notice, SurfaceModel, TuiSurface};
