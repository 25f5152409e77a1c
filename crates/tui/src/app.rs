//! TUI application loop
//!
//! Polls terminal events, forwards commands to the controller through its
//! handle, and answers chooser requests with a modal picker. The controller
//! itself runs on its own task; this loop only reads the shared view model.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use peb_core::{BoardFilter, PortfolioItem};
use peb_runtime::{BoardHandle, ChooserRequest, ItemSource};

use crate::board_view::{render_board, render_chooser};
use crate::surface::{Notice, SurfaceModel};

/// Modal state while an ancestor chooser is open.
pub struct ChooserModal {
    request: ChooserRequest,
    candidates: Vec<PortfolioItem>,
    selected: usize,
}

impl ChooserModal {
    pub fn candidates(&self) -> &[PortfolioItem] {
        &self.candidates
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn constraint_name(&self) -> Option<&str> {
        self.request.constraint.as_ref().map(|t| t.name.as_str())
    }

    fn move_selection(&mut self, delta: isize) {
        if self.candidates.is_empty() {
            return;
        }
        let len = self.candidates.len() as isize;
        let next = (self.selected as isize + delta).rem_euclid(len);
        self.selected = next as usize;
    }

    /// Answer the controller and consume the modal.
    fn resolve(self, choice: Option<PortfolioItem>) {
        let _ = self.request.response_tx.send(choice);
    }
}

async fn open_modal(request: ChooserRequest, items: &dyn ItemSource) -> ChooserModal {
    let candidates = match request.constraint.as_ref() {
        Some(constraint) => items
            .items_matching(&BoardFilter::for_type(constraint.id))
            .await
            .unwrap_or_default(),
        None => Vec::new(),
    };
    ChooserModal {
        request,
        candidates,
        selected: 0,
    }
}

/// Run the board TUI until the user quits.
pub async fn run_board_tui(
    model: Arc<Mutex<SurfaceModel>>,
    handle: BoardHandle,
    mut chooser_rx: mpsc::UnboundedReceiver<ChooserRequest>,
    items: Arc<dyn ItemSource>,
) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut modal: Option<ChooserModal> = None;
    let mut should_quit = false;

    while !should_quit {
        // Chooser requests coming from the controller task.
        if modal.is_none() {
            if let Ok(request) = chooser_rx.try_recv() {
                modal = Some(open_modal(request, items.as_ref()).await);
            }
        }

        {
            let model = model.lock().expect("surface model poisoned");
            terminal.draw(|f| {
                render_board(f, f.area(), &model);
                if let Some(modal) = modal.as_ref() {
                    render_chooser(f, f.area(), modal);
                }
            })?;
        }

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(mut open) = modal.take() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => open.resolve(None),
                KeyCode::Up => {
                    open.move_selection(-1);
                    modal = Some(open);
                }
                KeyCode::Down => {
                    open.move_selection(1);
                    modal = Some(open);
                }
                KeyCode::Enter => {
                    let choice = open.candidates.get(open.selected).cloned();
                    open.resolve(choice);
                }
                _ => modal = Some(open),
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => should_quit = true,
            KeyCode::Left => cycle_type(&model, &handle, -1),
            KeyCode::Right | KeyCode::Tab => cycle_type(&model, &handle, 1),
            KeyCode::Char('f') => handle.choose_parent_filter(),
            KeyCode::Char('c') => handle.clear_parent_filter(),
            KeyCode::Char('r') => {
                // Retry a failed fetch when the error screen is up,
                // otherwise reload the type list wholesale.
                let failed = matches!(
                    model.lock().expect("surface model poisoned").notice,
                    Some(Notice::Error(_))
                );
                if failed {
                    handle.retry();
                } else {
                    handle.load_types();
                }
            }
            _ => {}
        }
    }

    if let Some(open) = modal.take() {
        open.resolve(None);
    }
    handle.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Move the type selection left or right, wrapping around.
fn cycle_type(model: &Arc<Mutex<SurfaceModel>>, handle: &BoardHandle, delta: isize) {
    let model = model.lock().expect("surface model poisoned");
    if model.types.is_empty() {
        return;
    }
    let current = model
        .selected
        .and_then(|id| model.types.iter().position(|t| t.id == id))
        .unwrap_or(0);
    let len = model.types.len() as isize;
    let next = (current as isize + delta).rem_euclid(len) as usize;
    handle.select_type(model.types[next].id);
}
