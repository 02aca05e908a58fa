//! framesum CLI
//!
//! Command-line interface for checksumming raw video files.

use clap::{Parser, Subcommand};
use framesum::{
    processing::{format_layout, Component},
    ChecksumAlgorithm, ChecksumSink, CropRegion, FrameFormat, RawFrameReader, SessionConfig,
    VideoInfo,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "framesum")]
#[command(about = "Video frame integrity checker - per-frame, per-plane and whole-file checksums")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Checksum every frame of a raw planar video file
    Verify {
        /// Raw input file
        input: PathBuf,

        /// Pixel format (GRAY8, NV12, NV21, I420, YV12, P010_10LE, I420_10LE)
        #[arg(short, long)]
        format: String,

        /// Frame width in pixels
        #[arg(short = 'W', long)]
        width: u32,

        /// Frame height in pixels
        #[arg(short = 'H', long)]
        height: u32,

        /// Per-plane row strides in bytes (e.g. 1920,1920)
        #[arg(long, value_delimiter = ',')]
        strides: Option<Vec<usize>>,

        /// Crop region as x,y,width,height
        #[arg(long)]
        crop: Option<String>,

        /// Checksum type (md5, sha1, sha256, sha512)
        #[arg(long)]
        hash: Option<String>,

        /// Calculate checksum per plane
        #[arg(long)]
        plane_checksum: bool,

        /// Do not calculate checksum per frame
        #[arg(long)]
        no_frame_checksum: bool,

        /// Calculate checksum for the whole raw data file (MD5 only)
        #[arg(long)]
        file_checksum: bool,

        /// Save extracted raw frames into a file
        #[arg(long)]
        dump_output: bool,

        /// Location of the file to write extracted raw frames
        #[arg(long)]
        dump_location: Option<PathBuf>,

        /// TOML session configuration; flags override it
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List supported pixel formats
    Formats,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("framesum=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            input,
            format,
            width,
            height,
            strides,
            crop,
            hash,
            plane_checksum,
            no_frame_checksum,
            file_checksum,
            dump_output,
            dump_location,
            config,
        } => {
            let mut session = match config {
                Some(path) => SessionConfig::from_file(path)?,
                None => SessionConfig::default(),
            };
            if let Some(hash) = hash {
                session.hash = hash.parse::<ChecksumAlgorithm>()?;
            }
            if plane_checksum {
                session.plane_checksum = true;
            }
            if no_frame_checksum {
                session.frame_checksum = false;
            }
            if file_checksum {
                session.file_checksum = true;
            }
            if dump_output {
                session.dump_output = true;
            }
            if dump_location.is_some() {
                session.dump_location = dump_location;
            }

            let info = VideoInfo::new(format.parse::<FrameFormat>()?, width, height);
            let crop = crop.map(|c| c.parse::<CropRegion>()).transpose()?;
            cmd_verify(input, info, strides, crop, session)
        }
        Commands::Formats => cmd_formats(),
    }
}

fn cmd_verify(
    input: PathBuf,
    info: VideoInfo,
    strides: Option<Vec<usize>>,
    crop: Option<CropRegion>,
    config: SessionConfig,
) -> anyhow::Result<()> {
    let file = std::fs::File::open(&input)?;
    let mut reader = RawFrameReader::new(std::io::BufReader::new(file), info);
    if let Some(strides) = strides {
        reader = reader.with_strides(strides)?;
    }
    if let Some(crop) = crop {
        reader = reader.with_crop(crop);
    }

    tracing::info!(
        "Verifying {} ({} {}, {} bytes per frame)",
        input.display(),
        info.format,
        info.resolution,
        reader.frame_size()
    );

    let mut sink = ChecksumSink::new(config);
    sink.start()?;
    sink.set_format(info)?;

    for frame in reader {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Input error: {}", e);
                let _ = sink.stop();
                return Err(e.into());
            }
        };

        match sink.render(&frame) {
            Ok(report) => print!("{}", report),
            Err(e) if e.is_recoverable() => continue,
            Err(e) => {
                let _ = sink.stop();
                return Err(e.into());
            }
        }
    }

    let stats = sink.stats();
    let summary = sink.stop()?;

    if let Some(csum) = &summary.file_checksum {
        println!("{}", csum);
    }

    tracing::info!(
        "Frames: {} checksummed, {} rejected, {} bytes extracted",
        summary.frames,
        summary.rejected,
        stats.bytes_extracted
    );
    if let Some(path) = &summary.raw_path {
        tracing::info!("Raw output kept at {}", path.display());
    }

    if summary.rejected > 0 {
        anyhow::bail!("{} frame(s) rejected", summary.rejected);
    }
    Ok(())
}

fn cmd_formats() -> anyhow::Result<()> {
    println!("Supported Formats");
    println!("=================\n");

    for format in FrameFormat::ALL {
        let planes = format_layout(format).planes;
        let order: Vec<&str> = planes
            .iter()
            .map(|p| match p.component {
                Component::Y => "Y",
                Component::U => "U",
                Component::V => "V",
                Component::Uv => "UV",
                Component::Vu => "VU",
            })
            .collect();
        let subsampling = if planes.len() > 1 { "4:2:0" } else { "none" };

        println!(
            "  {:<10} {} plane(s)  {:<8}  {:<5}  {}-bit samples",
            format.name(),
            planes.len(),
            order.join(","),
            subsampling,
            planes[0].bytes_per_sample * 8
        );
    }

    println!("\nUsage: framesum verify <file> --format <name> -W <width> -H <height>");

    Ok(())
}
