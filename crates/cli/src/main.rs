//! CLI tool for converting song markup files into FreeShow slide decks.

mod batch;

use anyhow::{bail, Context, Result};
use chordshow_core::{MetadataTable, ProcessorConfig, SongProcessor};
use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File extensions picked up when scanning a directory.
const MARKUP_EXTENSIONS: &[&str] = &["chordpro", "cho", "pro"];

/// Convert chord-annotated song markup into FreeShow `.show` files.
#[derive(Parser, Debug)]
#[command(name = "chordshow")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input markup file(s) or directories
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Metadata table (`;`-separated, keyed by the `Fichier` column)
    #[arg(short, long)]
    metadata: Option<PathBuf>,

    /// Processor configuration file (.json, .yaml or .yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for .show files
    #[arg(short, long, default_value = "processedFreeShow")]
    output: PathBuf,

    /// Output directory for enhanced markup files
    #[arg(short, long, default_value = "processedChordPro")]
    enhanced_output: PathBuf,

    /// Do not write enhanced markup files
    #[arg(long)]
    no_enhanced: bool,

    /// Number of files converted in parallel (1 to 10)
    #[arg(short = 'j', long, default_value = "4")]
    parallel: usize,

    /// Print show JSON to stdout instead of writing files
    #[arg(short, long)]
    print: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// What one successful conversion produced.
#[derive(Debug)]
struct Converted {
    input: PathBuf,
    show_json: String,
    slide_count: usize,
    warnings: usize,
}

/// A file that could not be converted.
#[derive(Debug)]
struct Failure {
    input: PathBuf,
    error: anyhow::Error,
}

impl From<batch::JobPanic<PathBuf>> for Failure {
    fn from(panic: batch::JobPanic<PathBuf>) -> Self {
        Failure {
            input: panic.item,
            error: anyhow::anyhow!("conversion panicked: {}", panic.message),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = match &args.config {
        Some(path) => ProcessorConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ProcessorConfig::default(),
    };

    let metadata = match &args.metadata {
        Some(path) => MetadataTable::load(path)
            .with_context(|| format!("Failed to load metadata from {}", path.display()))?,
        None => MetadataTable::new(),
    };

    let inputs = collect_inputs(&args.input)?;
    if inputs.is_empty() {
        bail!("No markup files found");
    }

    if !args.print {
        create_dir(&args.output)?;
        if !args.no_enhanced {
            create_dir(&args.enhanced_output)?;
        }
    }

    let processor = SongProcessor::new(config);
    let workers = batch::clamp_workers(args.parallel);
    log::info!("Converting {} files with {} workers", inputs.len(), workers);

    let report = batch::run_bounded(&inputs, workers, |input| {
        process_file(input, &args, &processor, &metadata).map_err(|error| Failure {
            input: input.clone(),
            error,
        })
    });

    if args.print {
        let mut converted: Vec<&Converted> = report.completed.iter().collect();
        converted.sort_by(|a, b| a.input.cmp(&b.input));
        for item in converted {
            println!("{}", item.show_json);
        }
    }

    for failure in &report.failures {
        log::error!(
            "Error processing {}: {:#}",
            failure.input.display(),
            failure.error
        );
    }

    let slides: usize = report.completed.iter().map(|c| c.slide_count).sum();
    let warnings: usize = report.completed.iter().map(|c| c.warnings).sum();
    log::info!(
        "Converted {}/{} files ({} slides, {} validation warnings)",
        report.completed.len(),
        report.total(),
        slides,
        warnings
    );

    if report.all_failed() {
        bail!("All {} files failed to convert", report.failures.len());
    }

    Ok(())
}

/// Expand directories into their markup files; files are taken as given.
fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_markup_file(p))
                .collect();
            found.sort();
            log::debug!("Found {} markup files in {}", found.len(), path.display());
            inputs.extend(found);
        } else {
            inputs.push(path.clone());
        }
    }

    Ok(inputs)
}

fn is_markup_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MARKUP_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Convert one markup file and write its outputs.
fn process_file(
    input: &Path,
    args: &Args,
    processor: &SongProcessor,
    metadata: &MetadataTable,
) -> Result<Converted> {
    log::debug!("Processing: {}", input.display());

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("Invalid file name: {}", input.display()))?;

    let conversion = processor.convert(stem, &text, metadata.get(stem));
    let show_json = conversion
        .show
        .to_json_pretty()
        .with_context(|| format!("Failed to serialize show for {}", input.display()))?;

    if !args.print {
        let show_path = args.output.join(format!("{}.show", stem));
        write_output(&show_path, &show_json)?;
        log::debug!("Written to: {}", show_path.display());

        if !args.no_enhanced {
            let enhanced_path = args
                .enhanced_output
                .join(format!("{}-enhanced.chordpro", stem));
            write_output(&enhanced_path, &conversion.enhanced)?;
            log::debug!("Written to: {}", enhanced_path.display());
        }
    }

    Ok(Converted {
        input: input.to_path_buf(),
        slide_count: conversion.slide_count(),
        warnings: conversion.warnings.len(),
        show_json,
    })
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
