//! Operators graph host.
//!
//! Fetches the operator list once, then rewrites `GRAPH_OUTPUT_PATH` with
//! the SVG after every simulation step until the layout settles.
//!
//! Run with: cargo run --bin operators-graph

use anyhow::Context;
use operators_graph::app;
use operators_graph::config::Config;
use operators_graph::layout::ForceLayout;
use operators_graph::source::HttpDocumentSource;
use operators_graph::svg::render_state;
use operators_graph::{GraphEnvironment, GraphStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{},foldview_runtime=warn", config.log_level).into()),
        )
        .with(fmt::layer())
        .init();

    config.validate().context("invalid configuration")?;

    let env = GraphEnvironment::new(
        HttpDocumentSource::shared(config.fetch_timeout())?,
        Arc::new(ForceLayout::new(config.width, config.height, config.seed)),
        config.source_url.clone(),
        config.tick_interval(),
    );
    let store = app::new_store(env);

    info!(
        url = %config.source_url,
        output = %config.output_path.display(),
        "Building operators graph"
    );

    let output = config.output_path.clone();
    let (width, height) = (config.width, config.height);
    let draw = |state: &operators_graph::GraphState| {
        let Some(svg) = render_state(state, width, height) else {
            return;
        };
        if let Err(e) = std::fs::write(&output, svg) {
            error!(path = %output.display(), error = %e, "Failed to write graph");
        }
    };

    let finished = tokio::select! {
        result = app::run(&store, draw) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            store.snapshot().await
        },
    };

    if let Err(e) = store.shutdown(Duration::from_secs(1)).await {
        info!(error = %e, "Pending simulation steps abandoned");
    }

    match finished.status {
        GraphStatus::Settled => info!(
            nodes = finished.nodes.len(),
            ticks = finished.ticks,
            "Graph settled"
        ),
        // Already logged by the reducer; the canvas stays empty.
        GraphStatus::Failed(_) => {},
        status => info!(?status, ticks = finished.ticks, "Stopped early"),
    }
    Ok(())
}
