//! Estimation board entry point
//!
//! Wires the dataset source, the TUI surface and the controller together,
//! then hands the terminal to the interactive loop. `--headless` renders the
//! first board state to stdout instead, for quick inspection and scripting.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use peb_core::AppConfig;
use peb_runtime::{
    BoardController, BoardEvent, BoardListener, ChannelChooser, Dataset, DatasetSource,
};
use peb_tui::{Notice, SurfaceModel, TuiSurface};

/// Portfolio estimation board.
#[derive(Parser, Debug)]
#[command(name = "peb", version, about)]
struct Cli {
    /// Dataset file (JSON); defaults to the built-in sample data.
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Config file (YAML).
    #[arg(short, long, default_value = "peb.yaml")]
    config: PathBuf,

    /// Render the first board state to stdout and exit.
    #[arg(long)]
    headless: bool,
}

/// Resolves a one-shot once the controller has rendered anything at all.
struct RenderOnce {
    tx: Mutex<Option<oneshot::Sender<()>>>,
}

#[async_trait::async_trait]
impl BoardListener for RenderOnce {
    async fn on_event(&self, event: &BoardEvent) {
        let rendered = matches!(
            event,
            BoardEvent::BoardRebuilt { .. }
                | BoardEvent::EmptyRendered
                | BoardEvent::LoadFailed { .. }
        );
        if rendered {
            if let Some(tx) = self.tx.lock().expect("listener poisoned").take() {
                let _ = tx.send(());
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    tracing::info!(config = %cli.config.display(), "starting estimation board");

    let config = AppConfig::load(&cli.config).context("loading config")?;

    let dataset = match cli.data.clone().or_else(|| config.data.path.clone()) {
        Some(path) => Dataset::load(&path)
            .await
            .with_context(|| format!("loading dataset {}", path.display()))?,
        None => Dataset::sample(),
    };
    let source = Arc::new(DatasetSource::new(dataset));

    let model = Arc::new(Mutex::new(SurfaceModel::default()));
    model
        .lock()
        .expect("fresh model")
        .loading_label
        .clone_from(&config.board.load_description);
    let surface = Arc::new(TuiSurface::new(Arc::clone(&model), source.clone()));

    let (chooser, chooser_rx) = ChannelChooser::new();
    let mut controller = BoardController::new(
        source.clone(),
        source.clone(),
        Arc::new(chooser),
        surface,
        config.board.clone(),
    );

    if cli.headless {
        let (done_tx, done_rx) = oneshot::channel();
        controller.add_listener(Arc::new(RenderOnce {
            tx: Mutex::new(Some(done_tx)),
        }));
        let handle = controller.handle();
        handle.load_types();
        let runner = tokio::spawn(controller.run());

        tokio::time::timeout(Duration::from_secs(10), done_rx)
            .await
            .context("timed out waiting for the first render")??;
        print_board(&model);

        handle.shutdown();
        let _ = runner.await;
        return Ok(());
    }

    let handle = controller.handle();
    handle.load_types();
    let runner = tokio::spawn(controller.run());

    peb_tui::run_board_tui(model, handle, chooser_rx, source).await?;
    let _ = runner.await;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_board(model: &Arc<Mutex<SurfaceModel>>) {
    let model = model.lock().expect("surface model poisoned");

    for ty in &model.types {
        let marker = if model.selected == Some(ty.id) { "*" } else { " " };
        println!("{} {} (rank {})", marker, ty.name, ty.ordinal);
    }

    match (&model.notice, &model.board) {
        (Some(Notice::Empty(message)), _) => println!("\n{}", message),
        (Some(Notice::Error(message)), _) => println!("\nerror: {}", message),
        (None, Some(board)) => {
            for (column, cards) in board.spec.columns.iter().zip(&board.cards) {
                println!("\n{}", peb_tui::column_title(column, cards.len()).trim());
                for card in cards {
                    println!("  - {}", card.name);
                }
            }
        }
        (None, None) => println!("\n(nothing rendered)"),
    }
}
