//! Regen CLI - convert map cubemaps between Titanfall 2 and Apex Legends.
//!
//! This is the main entry point for the Regen command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use regen::dds::DDS_MAGIC;
use regen::prelude::*;
use regen::vtf::VTF_MAGIC;

/// Regen - cubemap conversion tool
#[derive(Parser)]
#[command(name = "regen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header of a DDS or VTF file
    Info {
        /// DDS or VTF file
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert an Apex Legends cubemap DDS array to a cubemaps.hdr.vtf
    Upgrade {
        /// Input DDS file
        #[arg(short, long, env = "REGEN_INPUT")]
        input: PathBuf,

        /// Output VTF file
        #[arg(short, long, env = "REGEN_OUTPUT")]
        output: PathBuf,

        /// JSON array of `{origin, ambient_rcp}` objects, one per cubemap
        #[arg(short, long, env = "REGEN_PROBES")]
        probes: Option<PathBuf>,
    },

    /// Split a cubemaps.hdr.vtf into one DDS per cubemap face
    Downgrade {
        /// Input VTF file
        #[arg(short, long, env = "REGEN_INPUT")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "REGEN_OUTPUT")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { file, json } => {
            cmd_info(&file, json)?;
        }
        Commands::Upgrade {
            input,
            output,
            probes,
        } => {
            cmd_upgrade(&input, &output, probes.as_deref())?;
        }
        Commands::Downgrade { input, output } => {
            cmd_downgrade(&input, &output)?;
        }
    }

    Ok(())
}

/// A parsed file of either container.
enum Container {
    Dds(DdsTexture),
    Vtf(VtfTexture),
}

fn open_container(path: &Path) -> Result<Container> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    match data.get(..4) {
        Some(magic) if magic == DDS_MAGIC => Ok(Container::Dds(
            DdsTexture::parse(&data).context("Failed to parse DDS")?,
        )),
        Some(magic) if magic == VTF_MAGIC => Ok(Container::Vtf(
            VtfTexture::parse(&data).context("Failed to parse VTF")?,
        )),
        _ => anyhow::bail!("{} is neither a DDS nor a VTF file", path.display()),
    }
}

fn cmd_info(path: &Path, json: bool) -> Result<()> {
    let container = open_container(path)?;

    if json {
        let text = match &container {
            Container::Dds(dds) => serde_json::to_string_pretty(dds),
            Container::Vtf(vtf) => serde_json::to_string_pretty(vtf),
        }
        .context("Failed to serialize header")?;
        println!("{}", text);
        return Ok(());
    }

    match container {
        Container::Dds(dds) => {
            println!("DDS {}x{}, {:?}", dds.width, dds.height, dds.format);
            println!("Mip levels: {}", dds.mip_count);
            println!("Array size: {}", dds.array_size);
            println!("Misc flag: {:#x}", dds.misc_flag);
        }
        Container::Vtf(vtf) => {
            println!(
                "VTF {}.{} {}x{}, {:?}",
                vtf.version.0, vtf.version.1, vtf.width, vtf.height, vtf.format
            );
            println!("Flags: {:?}", vtf.flags);
            println!("Cubemaps: {}", vtf.frame_count);
            println!("Mip levels: {}", vtf.mip_count);
            for resource in &vtf.resources {
                println!("  {:?} {:?}", resource.kind, resource.payload);
            }
            if let Some(table) = &vtf.ambient {
                println!("Ambient: {:?}", table.values);
            }
            if vtf.mipmaps.is_empty() {
                println!("Mipmaps not extracted (unknown format/size combination)");
            }
        }
    }

    Ok(())
}

fn cmd_upgrade(input: &Path, output: &Path, probes: Option<&Path>) -> Result<()> {
    info!("Upgrading {} -> {}", input.display(), output.display());

    let start = Instant::now();
    let dds = DdsTexture::from_file(input).context("Failed to read DDS file")?;

    let probes: Option<Vec<CubemapProbe>> = probes
        .map(|path| -> Result<_> {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&text).context("Failed to parse probe list")
        })
        .transpose()?;
    if let Some(probes) = &probes {
        debug!(
            stems = ?probes.iter().map(CubemapProbe::file_stem).collect::<Vec<_>>(),
            "loaded probes"
        );
    }

    let vtf = upgrade(&dds, probes.as_deref()).context("Failed to convert cubemaps")?;
    vtf.write_to_file(output)
        .context("Failed to write VTF file")?;

    info!(
        "Wrote {} cubemaps in {:?}",
        vtf.frame_count,
        start.elapsed()
    );

    Ok(())
}

fn cmd_downgrade(input: &Path, output: &Path) -> Result<()> {
    info!("Downgrading {} -> {}", input.display(), output.display());

    let vtf = VtfTexture::from_file(input).context("Failed to read VTF file")?;
    let faces = downgrade(&vtf).context("Failed to split cubemaps")?;

    let stem = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("cubemaps.hdr.vtf");

    fs::create_dir_all(output)?;

    let pb = ProgressBar::new(faces.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    for face in &faces {
        let path = output.join(face.file_name(stem));
        face.texture
            .write_to_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    info!("Wrote {} faces in {:?}", faces.len(), start.elapsed());

    Ok(())
}
