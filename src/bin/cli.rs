// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Girderkit CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use girderkit::cli::Reporter;
use girderkit::{io, FailurePolicy, Kernel, KernelConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "girderkit")]
#[command(about = "Girderkit - steel plate-girder bridge geometry to IFC", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to girderkit.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a bridge description into an IFC document
    Build {
        /// Input bridge description (JSON)
        input: PathBuf,

        /// Output IFC file
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Also write a binary STL preview
        #[arg(long, value_name = "FILE")]
        stl: Option<PathBuf>,

        /// Also write a glTF/GLB preview
        #[arg(long, value_name = "FILE")]
        gltf: Option<PathBuf>,

        /// Write the JSON build report
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Stop at the first failing member
        #[arg(long)]
        fail_fast: bool,

        /// Worker threads (0 builds sequentially)
        #[arg(short = 'j', long)]
        threads: Option<usize>,
    },

    /// Load and validate a bridge description without building it
    Check {
        /// Input bridge description (JSON)
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "girderkit=debug" } else { "girderkit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<KernelConfig> {
    match path {
        Some(path) => {
            let mut config = KernelConfig::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => KernelConfig::load(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Build {
            input,
            output,
            stl,
            gltf,
            report,
            fail_fast,
            threads,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if *fail_fast {
                config.build.failure_policy = FailurePolicy::AbortOnFirst;
            }
            match threads {
                Some(0) => config.build.parallel = false,
                Some(n) => {
                    config.build.parallel = true;
                    config.build.threads = Some(*n);
                }
                None => {}
            }
            let outputs = Outputs {
                ifc: output,
                stl: stl.as_deref(),
                gltf: gltf.as_deref(),
                report: report.as_deref(),
            };
            build_command(input, &outputs, config, cli.verbose)
        }
        Commands::Check { input } => {
            let config = load_config(cli.config.as_deref())?;
            check_command(input, config)
        }
        Commands::Version => {
            println!("girderkit v{}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
    };

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(2),
        Err(err) => {
            Reporter::report_error(&format!("{err:#}"));
            std::process::exit(1);
        }
    }
}

struct Outputs<'a> {
    ifc: &'a Path,
    stl: Option<&'a Path>,
    gltf: Option<&'a Path>,
    report: Option<&'a Path>,
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Returns whether every member was built
fn build_command(input: &Path, outputs: &Outputs<'_>, config: KernelConfig, verbose: bool) -> Result<bool> {
    let kernel = Kernel::new(config);
    let file = input.display().to_string();

    let start = Instant::now();
    let spec = kernel.load(input)?;
    if verbose {
        Reporter::report_info(&format!(
            "Loaded {} ({} members)",
            spec.name.cyan(),
            spec.member_count()
        ));
    }

    let pb = spinner(format!("Building {}", spec.name));
    let built = kernel.build(&spec);
    pb.finish_and_clear();
    let (document, report) = built?;
    let duration = start.elapsed();

    io::export_ifc(&document, &kernel.config().export, outputs.ifc)?;
    if verbose {
        Reporter::report_info(&format!("Wrote {}", outputs.ifc.display()));
    }
    if let Some(path) = outputs.stl {
        io::export_stl(&document, path)?;
        if verbose {
            Reporter::report_info(&format!("Wrote {}", path.display()));
        }
    }
    if let Some(path) = outputs.gltf {
        io::export_gltf(&document, path)?;
        if verbose {
            Reporter::report_info(&format!("Wrote {}", path.display()));
        }
    }
    if let Some(path) = outputs.report {
        io::export_report(&report, path)
            .with_context(|| format!("Failed to export report for {file}"))?;
    }

    Reporter::report_build(&file, &report, duration);
    Ok(report.is_complete())
}

fn check_command(input: &Path, config: KernelConfig) -> Result<bool> {
    let kernel = Kernel::new(config);
    let spec = kernel.load(input)?;
    Reporter::report_check(&input.display().to_string(), &spec);
    Ok(true)
}
