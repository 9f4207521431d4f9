#![forbid(unsafe_code)]

//! Decision graph CLI - extract, lay out and progressively render decision trees.
//!
//! # Commands
//!
//! - `parse`: Output the extracted graph and warnings as JSON
//! - `layout`: Output the levelled layout as JSON
//! - `render`: Write an SVG of the diagram at a given reveal step
//! - `animate`: Run the timed reveal and report each step

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dg_core::{EngineConfig, LevelPolicy};
use dg_layout::{DiagramLayout, layout_graph_traced_with_metrics, layout_graph_with_metrics};
use dg_parser::{ParseResult, parse_evidence_json, parse_response};
use dg_render_svg::{SvgStyle, render_svg_with_style};
use dg_reveal::{RevealFrame, RevealScheduler};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(
    name = "dg-cli",
    version,
    about = "Decision graph CLI - extract, lay out and progressively render decision trees",
    long_about = "Reads `id[label]` / `a --> b` decision-tree text (optionally inside a\n\
        ```mermaid block of a larger response), places every node on a levelled\n\
        grid and reveals it node by node."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML config file with optional [layout] and [reveal] tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract the decision graph and output it as JSON.
    Parse {
        /// Input file path, "-" for stdin, or inline text. If omitted, reads from stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output counts and warnings only
        #[arg(long)]
        summary: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Lay out the decision graph and output node and edge positions as JSON.
    Layout {
        #[arg(default_value = "-")]
        input: String,

        /// Level assignment policy (last-write-wins, longest-path)
        #[arg(long, value_parser = parse_policy)]
        policy: Option<LevelPolicy>,

        /// Include per-stage layout snapshots
        #[arg(long)]
        trace: bool,

        #[arg(long)]
        pretty: bool,
    },

    /// Render the diagram to SVG at a reveal step.
    Render {
        #[arg(default_value = "-")]
        input: String,

        /// Number of revealed nodes. If omitted, everything is visible.
        #[arg(short, long)]
        step: Option<usize>,

        #[arg(long, value_parser = parse_policy)]
        policy: Option<LevelPolicy>,

        /// Draw arrowheads at edge ends
        #[arg(long)]
        arrowheads: bool,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// Print metadata (timing, dimensions, visibility) as JSON to stderr
        #[arg(long)]
        json: bool,
    },

    /// Reveal the diagram one node per tick, printing each step.
    Animate {
        #[arg(default_value = "-")]
        input: String,

        /// Milliseconds between reveal ticks (overrides config)
        #[arg(long)]
        tick_ms: Option<u64>,

        #[arg(long, value_parser = parse_policy)]
        policy: Option<LevelPolicy>,

        /// Write one SVG per step into this directory
        #[arg(long)]
        frames: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct RenderResult {
    node_count: usize,
    edge_count: usize,
    unresolved_edges: usize,
    visible_nodes: usize,
    width: f32,
    height: f32,
    level_policy: &'static str,
    from_fenced_block: bool,
    output_bytes: usize,
    parse_time_ms: f64,
    layout_time_ms: f64,
    render_time_ms: f64,
    total_time_ms: f64,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse {
            input,
            summary,
            pretty,
        } => cmd_parse(&input, summary, pretty),

        Command::Layout {
            input,
            policy,
            trace,
            pretty,
        } => cmd_layout(&input, &with_policy(config, policy), trace, pretty),

        Command::Render {
            input,
            step,
            policy,
            arrowheads,
            output,
            json,
        } => cmd_render(
            &input,
            &with_policy(config, policy),
            step,
            arrowheads,
            output.as_deref(),
            json,
        ),

        Command::Animate {
            input,
            tick_ms,
            policy,
            frames,
        } => cmd_animate(
            &input,
            &with_policy(config, policy),
            tick_ms,
            frames.as_deref(),
        ),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let config = EngineConfig::load(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn with_policy(mut config: EngineConfig, policy: Option<LevelPolicy>) -> EngineConfig {
    if let Some(policy) = policy {
        config.layout.level_policy = policy;
    }
    config
}

fn parse_policy(value: &str) -> Result<LevelPolicy, String> {
    LevelPolicy::parse(value).ok_or_else(|| {
        format!("unknown level policy '{value}' (expected last-write-wins or longest-path)")
    })
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).exists() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline decision-tree text
        Ok(input.to_string())
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

fn parse_and_report(source: &str) -> ParseResult {
    let parsed = parse_response(source);
    for warning in &parsed.warnings {
        warn!("Parse warning: {warning}");
    }
    parsed
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, summary: bool, pretty: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_and_report(&source);

    let output = if summary {
        let evidence = parse_evidence_json(&parsed);
        if pretty {
            let value: serde_json::Value = serde_json::from_str(&evidence)?;
            serde_json::to_string_pretty(&value)?
        } else {
            evidence
        }
    } else {
        to_json(&parsed, pretty)?
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: layout
// =============================================================================

fn cmd_layout(input: &str, config: &EngineConfig, trace: bool, pretty: bool) -> Result<()> {
    let source = load_input(input)?;
    let parsed = parse_and_report(&source);

    let output = if trace {
        let traced = layout_graph_traced_with_metrics(&parsed.graph, &config.layout);
        to_json(&traced, pretty)?
    } else {
        let layout = layout_graph_with_metrics(&parsed.graph, &config.layout);
        to_json(&layout, pretty)?
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: render
// =============================================================================

fn cmd_render(
    input: &str,
    config: &EngineConfig,
    step: Option<usize>,
    arrowheads: bool,
    output: Option<&str>,
    json_output: bool,
) -> Result<()> {
    let total_start = Instant::now();

    let parse_start = Instant::now();
    let source = load_input(input)?;
    let parsed = parse_and_report(&source);
    let parse_time = parse_start.elapsed();

    let layout_start = Instant::now();
    let layout = layout_graph_with_metrics(&parsed.graph, &config.layout);
    let layout_time = layout_start.elapsed();

    debug!(
        "Layout: canvas={}x{}, levels={}, unresolved={}",
        layout.width, layout.height, layout.stats.level_count, layout.stats.unresolved_edges
    );

    let render_start = Instant::now();
    let frame = match step {
        Some(step) => RevealFrame::at_step(&layout, step),
        None => RevealFrame::complete(&layout),
    };
    let style = SvgStyle {
        arrowheads,
        transition_ms: config.reveal.tick_ms,
        ..SvgStyle::default()
    };
    let svg = render_svg_with_style(&layout, &frame, &style);
    let render_time = render_start.elapsed();
    let total_time = total_start.elapsed();

    if json_output {
        let result = RenderResult {
            node_count: layout.stats.node_count,
            edge_count: layout.stats.edge_count,
            unresolved_edges: layout.stats.unresolved_edges,
            visible_nodes: frame.visible_node_count(),
            width: layout.width,
            height: layout.height,
            level_policy: layout.level_policy.as_str(),
            from_fenced_block: parsed.from_fenced_block,
            output_bytes: svg.len(),
            parse_time_ms: parse_time.as_secs_f64() * 1000.0,
            layout_time_ms: layout_time.as_secs_f64() * 1000.0,
            render_time_ms: render_time.as_secs_f64() * 1000.0,
            total_time_ms: total_time.as_secs_f64() * 1000.0,
            warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
        };
        eprintln!("{}", serde_json::to_string_pretty(&result)?);
    }

    write_output(output, &svg)?;

    info!(
        "Rendered {} nodes, {} edges ({} visible) in {:.2}ms",
        layout.stats.node_count,
        layout.stats.edge_count,
        frame.visible_node_count(),
        total_time.as_secs_f64() * 1000.0
    );

    Ok(())
}

// =============================================================================
// Command: animate
// =============================================================================

fn cmd_animate(
    input: &str,
    config: &EngineConfig,
    tick_ms: Option<u64>,
    frames: Option<&Path>,
) -> Result<()> {
    let interval = match tick_ms {
        Some(0) => bail!("--tick-ms must be greater than zero"),
        Some(ms) => Duration::from_millis(ms),
        None => config.reveal.tick(),
    };

    let source = load_input(input)?;
    let parsed = parse_and_report(&source);
    let layout = layout_graph_with_metrics(&parsed.graph, &config.layout);

    if let Some(dir) = frames {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create frame directory: {}", dir.display()))?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(run_animation(&layout, interval, frames))
}

async fn run_animation(
    layout: &DiagramLayout,
    interval: Duration,
    frames: Option<&Path>,
) -> Result<()> {
    let mut scheduler = RevealScheduler::with_interval(interval);
    let mut state_rx = scheduler.replace(layout)?;
    info!(
        nodes = layout.nodes.len(),
        tick_ms = scheduler.interval_ms(),
        "Revealing diagram"
    );

    let mut stdout = io::stdout();
    emit_step(&mut stdout, layout, 0, frames)?;

    while state_rx.changed().await.is_ok() {
        let counter = state_rx.borrow_and_update().counter();
        emit_step(&mut stdout, layout, counter, frames)?;
    }

    scheduler.shutdown();
    Ok(())
}

fn emit_step<W: Write>(
    out: &mut W,
    layout: &DiagramLayout,
    counter: usize,
    frames: Option<&Path>,
) -> Result<()> {
    let frame = RevealFrame::at_step(layout, counter);
    let visible: Vec<&str> = layout
        .nodes
        .iter()
        .filter(|node| frame.node_visible(node.node_index))
        .map(|node| node.node_id.as_str())
        .collect();

    writeln!(
        out,
        "step {counter}/{}: {}",
        layout.nodes.len(),
        visible.join(" ")
    )
    .context("Failed to write to stdout")?;
    out.flush().context("Failed to flush stdout")?;

    if let Some(dir) = frames {
        let path = dir.join(format!("frame-{counter:03}.svg"));
        let svg = dg_render_svg::render_svg(layout, &frame);
        std::fs::write(&path, svg)
            .with_context(|| format!("Failed to write frame: {}", path.display()))?;
    }
    Ok(())
}
