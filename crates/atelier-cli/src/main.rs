//! Atelier CLI - headless driver for the scene editing core

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{drag, pick, tree};

#[derive(Parser)]
#[command(name = "atelier")]
#[command(about = "Drive the Atelier scene sync and editing core from a records file", long_about = None)]
#[command(version)]
struct Cli {
    /// Explicit editor config file (skips the global/project layers)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Materialize a records file and print the live render tree
    Tree {
        /// Path to records file
        records: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Pick at a screen coordinate and resolve the selection
    Pick {
        /// Path to records file
        records: String,

        /// Pointer x in pixels
        #[arg(long)]
        x: f32,

        /// Pointer y in pixels
        #[arg(long)]
        y: f32,

        /// Viewport width in pixels
        #[arg(long, default_value = "1280")]
        width: f32,

        /// Viewport height in pixels
        #[arg(long, default_value = "720")]
        height: f32,

        /// Camera position (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3, default_value = "0,5,10")]
        eye: [f32; 3],

        /// Camera look-at point (comma-separated x,y,z)
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,0")]
        target: [f32; 3],

        /// Select the raw hit instead of its group
        #[arg(long)]
        modifier: bool,
    },

    /// Select a record and simulate a gizmo drag with debounced writes
    Drag {
        /// Path to records file
        records: String,

        /// Record id to select
        id: String,

        /// Gizmo mode (translate, rotate or scale)
        #[arg(long, default_value = "translate", value_parser = parse_mode)]
        mode: String,

        /// Handle axis (x, y, z or uniform)
        #[arg(long, default_value = "x", value_parser = parse_axis)]
        axis: String,

        /// Amount per step (units, degrees, or scale factor)
        #[arg(long, default_value = "0.1")]
        amount: f32,

        /// Number of drag steps
        #[arg(long, default_value = "10")]
        steps: u32,

        /// Simulated milliseconds between steps
        #[arg(long, default_value = "16")]
        interval_ms: u64,

        /// Use the wall clock and really wait between steps
        #[arg(long)]
        realtime: bool,
    },
}

fn parse_vec3(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    let z: f32 = parts[2].trim().parse().map_err(|e| format!("invalid z: {}", e))?;
    Ok([x, y, z])
}

fn parse_mode(s: &str) -> Result<String, String> {
    match s {
        "translate" | "rotate" | "scale" => Ok(s.to_string()),
        _ => Err(format!(
            "unknown mode '{}'; valid values: translate, rotate, scale",
            s
        )),
    }
}

fn parse_axis(s: &str) -> Result<String, String> {
    match s {
        "x" | "y" | "z" | "uniform" => Ok(s.to_string()),
        _ => Err(format!(
            "unknown axis '{}'; valid values: x, y, z, uniform",
            s
        )),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Tree { records, format } => tree::run(&records, &format, &config),
        Commands::Pick {
            records,
            x,
            y,
            width,
            height,
            eye,
            target,
            modifier,
        } => pick::run(pick::PickArgs {
            records,
            x,
            y,
            width,
            height,
            eye,
            target,
            modifier,
            config,
        }),
        Commands::Drag {
            records,
            id,
            mode,
            axis,
            amount,
            steps,
            interval_ms,
            realtime,
        } => drag::run(drag::DragArgs {
            records,
            id,
            mode,
            axis,
            amount,
            steps,
            interval_ms,
            realtime,
            config,
        }),
    }
}
