//! Interactive todo host.
//!
//! Reads commands from stdin (see [`todo::terminal`]) and mounts the
//! rendered view after every fold step, to `TODO_VIEW_PATH` or stdout.
//!
//! `todo replay <actions.json>` folds a recorded list of actions instead
//! and mounts every snapshot in turn.
//!
//! Run with: cargo run --bin todo

use anyhow::Context;
use foldview_core::fold;
use foldview_runtime::StoreConfig;
use futures::StreamExt;
use std::io;
use todo::app::{self, AppError, Intents};
use todo::config::Config;
use todo::terminal::{Command, HELP, Terminal, parse_command};
use todo::view::{FileView, View, WriterView};
use todo::{Model, TodoAction, TodoEnvironment, TodoReducer};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into()))
        .with(fmt::layer().with_writer(io::stderr))
        .init();

    let mut view = open_view(&config);

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        Some("replay") => {
            let path = args.next().context("usage: todo replay <actions.json>")?;
            replay(&path, view.as_mut()).await
        },
        Some(other) => anyhow::bail!("Unknown mode '{other}'"),
        None => interactive(&config, view.as_mut()).await,
    }
}

fn open_view(config: &Config) -> Box<dyn View + Send> {
    match &config.view_path {
        Some(path) => {
            info!(path = %path.display(), "Mounting views to file");
            Box::new(FileView::new(path))
        },
        None => Box::new(WriterView::new(io::stdout())),
    }
}

async fn interactive(config: &Config, view: &mut (dyn View + Send)) -> anyhow::Result<()> {
    let store =
        app::new_store(StoreConfig::default().with_snapshot_capacity(config.snapshot_capacity));
    let (intents, fold) = app::wire(store.clone());

    let capture = tokio::task::spawn_blocking(move || capture_loop(&intents));

    info!("Todo host ready");
    let model = fold.run(view).await?;

    capture.await.context("capture thread panicked")??;
    store.shutdown(config.shutdown_timeout()).await?;

    info!(
        todos = model.count(),
        completed = model.completed_count(),
        "Session finished"
    );
    Ok(())
}

/// Runs on a blocking thread: stdin and the edit prompt both block.
fn capture_loop(intents: &Intents) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut terminal = Terminal::new(stdin.lock(), io::stderr());
    terminal.say(HELP)?;

    while let Some(line) = terminal.read_line()? {
        let event = match parse_command(&line) {
            Ok(Some(Command::Event(event))) => event,
            Ok(Some(Command::Help)) => {
                terminal.say(HELP)?;
                continue;
            },
            Ok(Some(Command::Quit)) => break,
            Ok(None) => continue,
            Err(error) => {
                terminal.say(&error)?;
                continue;
            },
        };

        match intents.dispatch(&event, &mut terminal) {
            Ok(dispatched) if dispatched.sequenced.is_empty() => {
                warn!(?event, "Event matched no capture rule");
            },
            Ok(_) => {},
            Err(AppError::Sequencer(error)) => {
                error!(%error, "Fold loop stopped; leaving");
                break;
            },
            Err(error) => return Err(error.into()),
        }
    }

    Ok(())
}

async fn replay(path: &str, view: &mut (dyn View + Send)) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let actions: Vec<TodoAction> =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!(actions = actions.len(), "Replaying");

    let seed = Model::new().apply(TodoAction::Identity);
    let mut snapshots = Box::pin(fold::scan(
        TodoReducer::new(),
        TodoEnvironment::new(),
        seed,
        futures::stream::iter(actions),
    ));

    while let Some(model) = snapshots.next().await {
        view.mount(todo::view::render(&model))?;
    }
    Ok(())
}
