use clap::Parser;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use treescape::crawler;
use treescape::{FrontierConfig, FrontierController, LaidOutRect, Rect, RootPolicy, ScanConfig};

/// Scan a folder and print its treemap layout as JSON.
#[derive(Parser, Debug)]
#[command(name = "treescape-dump", version)]
struct Args {
    /// Folder to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    #[arg(long, default_value_t = 1080)]
    width: i32,

    #[arg(long, default_value_t = 690)]
    height: i32,

    /// Expand every folder before laying out
    #[arg(long)]
    expand_all: bool,

    /// Folders to expand, may be repeated
    #[arg(long = "expand", value_name = "PATH")]
    expand: Vec<PathBuf>,

    /// Show only the root rectangle unless the root is expanded
    #[arg(long)]
    collapsed_root: bool,

    #[arg(long)]
    skip_hidden: bool,

    #[arg(long)]
    follow_links: bool,

    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Dump<'a> {
    root: &'a std::path::Path,
    total_size: u64,
    area: Rect,
    rects: &'a [LaidOutRect],
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("treescape=info")),
        )
        .with_writer(io::stderr)
        .init();

    let scan_config = ScanConfig {
        skip_hidden: args.skip_hidden,
        follow_links: args.follow_links,
    };
    let (tree, _stats) = crawler::scan(&args.path, &scan_config).map_err(io::Error::other)?;

    let root_policy = if args.collapsed_root {
        RootPolicy::Collapsible
    } else {
        RootPolicy::AlwaysExpanded
    };
    let mut controller = FrontierController::new(tree, FrontierConfig { root_policy });

    if args.expand_all {
        let root = controller.tree().root_path().to_path_buf();
        controller.expand_all(&root).map_err(io::Error::other)?;
    }
    for path in &args.expand {
        controller.expand(path).map_err(io::Error::other)?;
    }

    let area = Rect::new(0, 0, args.width, args.height);
    let total_size = controller.tree().total_size();
    let root = controller.tree().root_path().to_path_buf();
    let layout = controller.layout(area);

    let dump = Dump {
        root: &root,
        total_size,
        area,
        rects: layout.rects(),
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&dump)
    } else {
        serde_json::to_string(&dump)
    }
    .map_err(io::Error::other)?;

    let mut out = io::stdout().lock();
    writeln!(out, "{json}")?;
    Ok(())
}
