//! ORM/MRA/RMA texture unpacker CLI

mod logging;

use clap::{Args, Parser, Subcommand};
use orm_core::{BatchReport, ChannelPreset, Outcome, UnpackConfig, Unpacker};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "orm-cli")]
#[command(about = "Unpack an ORM/MRA/RMA packed texture to grayscale AO/Roughness/Metallic maps.")]
#[command(version = concat!("v", env!("CARGO_PKG_VERSION")))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML) with default unpack options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split a packed texture (or a folder of them) into grayscale maps
    Unpack(UnpackArgs),
    /// List channel presets
    Presets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Default)]
struct UnpackArgs {
    /// Input image, or folder with --batch
    input: PathBuf,
    /// Output folder (created if missing). Falls back to output_dir from --config
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Channel preset: ORM, MRA, or RMA. Default ORM
    #[arg(long)]
    preset: Option<String>,
    /// Invert the roughness channel (gloss → rough)
    #[arg(long)]
    invert_rough: bool,
    /// Invert the metallic channel
    #[arg(long)]
    invert_metal: bool,
    /// Export the alpha channel as Height if present
    #[arg(long)]
    alpha_as_height: bool,
    /// Treat input as a folder and process images recursively
    #[arg(long)]
    batch: bool,
    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

/// Preset listing entry for `presets --json`
#[derive(Debug, Serialize)]
struct PresetEntry {
    key: &'static str,
    label: &'static str,
    ao: char,
    roughness: char,
    metallic: char,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Unpack(args) => {
            let report = cmd_unpack(&args, cli.config.as_deref())?;
            print_summary(&report);
            Ok(())
        }
        Commands::Presets { json } => cmd_presets(json),
    }
}

/// Resolve options from config + flags and run the unpacker.
fn cmd_unpack(args: &UnpackArgs, config_path: Option<&Path>) -> Result<BatchReport, Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => UnpackConfig::load(path)?,
        None => UnpackConfig::default(),
    };

    let mut options = config.options;
    if let Some(preset) = &args.preset {
        options.preset = preset.parse()?;
    }
    options.invert_roughness |= args.invert_rough;
    options.invert_metallic |= args.invert_metal;
    options.export_alpha_as_height |= args.alpha_as_height;
    options.batch |= args.batch;

    let output_dir = args
        .out
        .clone()
        .or(config.output_dir)
        .ok_or_else(|| {
            orm_core::Error::InvalidConfiguration("an output folder is required (--out)".into())
        })?;

    let results = Unpacker::new(options).run(&args.input, &output_dir)?;
    let report = BatchReport::new(&args.input, &output_dir, &options, results);

    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    Ok(report)
}

fn print_summary(report: &BatchReport) {
    if !report.options.batch {
        let saved: Vec<String> = report
            .results
            .iter()
            .flat_map(|r| r.outputs())
            .map(|p| p.display().to_string())
            .collect();
        println!("Saved:\n- {}", saved.join("\n- "));
        return;
    }

    if report.processed == 0 {
        println!("No supported images found in {}", report.input.display());
        return;
    }

    for result in report.failures() {
        if let Outcome::Failure { message, .. } = &result.outcome {
            eprintln!("⚠ Skipping {}: {}", result.path.display(), message);
        }
    }
    println!(
        "Processed {} image(s) ({} succeeded, {} failed) → {}",
        report.processed,
        report.succeeded,
        report.failed,
        report.output_dir.display()
    );
}

fn preset_entries() -> Vec<PresetEntry> {
    ChannelPreset::ALL
        .iter()
        .map(|p| {
            let m = p.mapping();
            PresetEntry {
                key: p.key(),
                label: p.label(),
                ao: m.ao.letter(),
                roughness: m.roughness.letter(),
                metallic: m.metallic.letter(),
            }
        })
        .collect()
}

fn cmd_presets(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let entries = preset_entries();
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for e in &entries {
            println!(
                "{:<4} AO={} Roughness={} Metallic={}  {}",
                e.key, e.ao, e.roughness, e.metallic, e.label
            );
        }
    }
    Ok(())
}
