mod app;

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use stackviz::render::Document;
use stackviz::{FilterMode, ForceDirectedGraph, RenderConfig, load_graph};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph JSON with `nodes` and `links`.
    graph: PathBuf,
    /// Render config JSON; omitted fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Resource type shown only under "All resources". Repeatable.
    #[arg(long = "hide-type", value_name = "TYPE")]
    hide_types: Vec<String>,
    /// Write the laid-out graph to this SVG file instead of opening a window.
    #[arg(long, value_name = "FILE.svg")]
    output: Option<PathBuf>,
    #[arg(long, default_value_t = 300)]
    ticks: usize,
    #[arg(long)]
    width: Option<f32>,
    #[arg(long)]
    height: Option<f32>,
    /// Start with every resource visible.
    #[arg(long)]
    show_all: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let graph = load_graph(&args.graph)?;
    let mut config = match &args.config {
        Some(path) => RenderConfig::from_json_file(path)?,
        None => RenderConfig::default(),
    };
    if let Some(width) = args.width {
        config.viewport_width = width;
    }
    if let Some(height) = args.height {
        config.viewport_height = height;
    }
    let config = config.sanitized();
    let (width, height) = (config.viewport_width, config.viewport_height);

    let mut view = ForceDirectedGraph::headless(&graph, &args.hide_types, config)
        .with_context(|| format!("invalid graph {}", args.graph.display()))?;
    if args.show_all {
        view.set_filter(FilterMode::All);
    }
    view.mount(width, height);

    match &args.output {
        Some(output) => view.write_svg(args.ticks, output),
        None => run_viewer(view, args.graph),
    }
}

fn run_viewer(view: ForceDirectedGraph<Document>, source: PathBuf) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "stackviz",
        options,
        Box::new(move |cc| Ok(Box::new(app::ViewerApp::new(cc, view, source)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}
