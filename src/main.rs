//! CLI Entry Point for logicreel
//!
//! Provides the command-line interface for the video-to-circuit pipeline:
//! - Full pipeline runs (stage, extract, encode)
//! - Individual stages for iterating on one step
//! - Save-file inspection
//!
//! # Usage
//!
//! Run the whole pipeline:
//! ```bash
//! logicreel run
//! ```
//!
//! Re-encode already extracted frames into an existing save:
//! ```bash
//! logicreel encode path/to/data.logicworld
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use logicreel::config::Settings;
use logicreel::encode::{EncodeReport, Encoder};
use logicreel::error::AppResult;
use logicreel::extract::FrameExtractor;
use logicreel::frames::FrameSequence;
use logicreel::save::{CircuitStates, SaveFile, SaveKind};
use logicreel::staging::{WorldMetadata, WorldStager, DATA_FILE};
use logicreel::telemetry::{self, OutputFormat};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "logicreel")]
#[command(about = "Turns a video into a delayer-circuit video player inside a game save", long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: stage the world, extract frames, encode
    Run,

    /// Extract frames from the input video and stop
    Extract,

    /// Inject the extracted frames into an existing save file, in place
    Encode {
        /// Path to the save file to modify
        save: PathBuf,
    },

    /// Stage the world directory without encoding
    Stage,

    /// Print a summary of a save file
    Inspect {
        /// Path to the save file to read
        save: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    telemetry::init(&settings.log_level, OutputFormat::default())?;

    match cli.command {
        Commands::Run => run(&settings)?,
        Commands::Extract => {
            let count = FrameExtractor::new(&settings.video).extract()?;
            println!("✅ Extracted {count} frames to '{}'", settings.video.frames_dir.display());
        }
        Commands::Encode { save } => {
            let report = encode_in_place(&settings, &save)?;
            print_report(&report);
        }
        Commands::Stage => {
            let data = stage(&settings)?;
            println!("✅ World staged at '{}'", data.display());
        }
        Commands::Inspect { save } => inspect(&save)?,
    }
    Ok(())
}

fn run(settings: &Settings) -> AppResult<()> {
    println!("🎞  logicreel - video to circuit pipeline");
    println!();

    // The template's own data file seeds both the metadata and the save the
    // frames are injected into.
    let template_data = settings.staging.template_dir.join(DATA_FILE);
    let mut save = read_save(&template_data)?;
    let metadata = WorldMetadata::new(&format_game_version(save.game_version));

    let stager = WorldStager::new(&settings.staging);
    let data_path = stager.stage(&metadata)?;

    FrameExtractor::new(&settings.video).extract()?;
    let frames = FrameSequence::scan(
        &settings.video.frames_dir,
        settings.encode.luma_threshold,
    )?;

    let report = Encoder::new(&settings.encode).inject(&mut save, &frames)?;
    write_save(&data_path, &save)?;

    print_report(&report);
    println!("✅ World written to '{}'", data_path.display());
    Ok(())
}

fn stage(settings: &Settings) -> AppResult<PathBuf> {
    let template_data = settings.staging.template_dir.join(DATA_FILE);
    let save = read_save(&template_data)?;
    let metadata = WorldMetadata::new(&format_game_version(save.game_version));
    WorldStager::new(&settings.staging).stage(&metadata)
}

fn encode_in_place(settings: &Settings, path: &Path) -> AppResult<EncodeReport> {
    let frames = FrameSequence::scan(
        &settings.video.frames_dir,
        settings.encode.luma_threshold,
    )?;
    let mut save = read_save(path)?;
    let report = Encoder::new(&settings.encode).inject(&mut save, &frames)?;
    write_save(path, &save)?;
    Ok(report)
}

fn inspect(path: &Path) -> AppResult<()> {
    let save = read_save(path)?;
    println!("Save file: {}", path.display());
    println!("  Save version: {}", save.save_version);
    println!("  Game version: {}", format_game_version(save.game_version));
    println!(
        "  Kind:         {}",
        match save.kind() {
            SaveKind::World => "world",
            SaveKind::Subassembly => "subassembly",
        }
    );
    println!("  Mods:         {}", save.mods.len());
    for info in &save.mods {
        println!("    - {} {}", info.id, format_game_version(info.version));
    }
    println!("  Component types: {}", save.component_types.len());
    println!("  Components:      {}", save.components.len());
    println!("  Wires:           {}", save.wires.len());
    match &save.circuit_states {
        CircuitStates::World(bits) => {
            println!("  Circuit states:  {} (bit-packed)", bits.len() * 8);
        }
        CircuitStates::Subassembly(lit) => {
            println!("  Lit states:      {}", lit.len());
        }
    }
    Ok(())
}

fn print_report(report: &EncodeReport) {
    println!("✅ Encoded {} frames", report.frames);
    println!("   Components added: {}", report.components_added);
    println!("   Wires added:      {}", report.wires_added);
    println!("   Nets created:     {}", report.states_added);
}

fn read_save(path: &Path) -> AppResult<SaveFile> {
    let mut reader = BufReader::new(File::open(path)?);
    SaveFile::read(&mut reader)
}

fn write_save(path: &Path, save: &SaveFile) -> AppResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    save.write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

fn format_game_version(version: [i32; 4]) -> String {
    version.map(|part| part.to_string()).join(".")
}
