// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uprez: scanned-page resolution enhancement.
//
// Entry point. Parses arguments, initialises logging, and dispatches to the
// subcommand handlers.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use uprez_core::InterpolationMethod;
use uprez_core::human_errors::humanize_error;

#[derive(Debug, Parser)]
#[command(name = "uprez", version, about = "Raise the resolution of scanned pages")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Enhance a page to a target density.
    Enhance(EnhanceArgs),
    /// Write the text, pictorial, and foreground masks plus an overlay.
    Segment(SegmentArgs),
    /// Print dimensions and density.
    Info {
        input: PathBuf,
    },
    /// Print the default configuration as JSON.
    Config,
}

#[derive(Debug, clap::Args)]
struct EnhanceArgs {
    input: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    #[arg(long, default_value_t = 300)]
    target_dpi: u32,

    /// Override the density read from the input.
    #[arg(long)]
    source_dpi: Option<u32>,

    #[arg(long, default_value_t = InterpolationMethod::Lanczos)]
    interpolation: InterpolationMethod,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Learned super-resolution model (`.rten`).
    #[arg(long)]
    sr_model: Option<PathBuf>,

    /// Directory holding the OCR detection and recognition models.
    #[arg(long)]
    ocr_models: Option<PathBuf>,

    /// Preferred font for re-typeset text.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Also write a half-and-half before/after image here.
    #[arg(long)]
    comparison: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct SegmentArgs {
    input: PathBuf,

    #[arg(long)]
    out_dir: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let outcome = match cli.command {
        Command::Enhance(args) => commands::enhance(args),
        Command::Segment(args) => commands::segment(args),
        Command::Info { input } => commands::info(&input),
        Command::Config => commands::print_config(),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "Command failed");
            eprintln!("{}", humanize_error(&err));
            ExitCode::FAILURE
        }
    }
}
