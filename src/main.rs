//! Summarize the frames of a trajectory.
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};
use lapy::{FormatSchema, FrameSelection, ReadMode, TrajectoryReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// xyz point cloud.
    Xyz,
    /// LAMMPS dump.
    Dump,
}

impl From<Format> for FormatSchema {
    fn from(format: Format) -> Self {
        match format {
            Format::Xyz => FormatSchema::POINT_CLOUD,
            Format::Dump => FormatSchema::DUMP,
        }
    }
}

/// Print the frame number, timestep and atom count of the frames in a trajectory.
///
/// Set `RUST_LOG=lapy=debug` to follow how frames are discovered.
#[derive(Parser)]
struct Args {
    /// Input path (xyz or lammpstrj).
    input: PathBuf,

    /// Trajectory format. Guessed from the file extension by default.
    #[arg(short = 'F', long, value_enum)]
    format: Option<Format>,

    /// Frame selection in the format `start:stop:step`. Each of these values optional.
    ///
    /// - `:100` will select the first 100 frames.
    ///
    /// - `3:14` will select the 4th up to and including the 14th frames, 11 frames in total.
    ///
    /// - `:100:2` will select every second frame from the the first 100 frames, 50 in total.
    #[arg(short, long)]
    frames: Option<FrameSelection>,

    /// Read the file frame by frame instead of loading it into memory.
    #[arg(long)]
    streaming: bool,

    /// Also print the box bounds of each frame.
    #[arg(long)]
    cell: bool,

    /// Also print the column names of each frame.
    #[arg(long)]
    columns: bool,

    /// Only print the total number of frames.
    #[arg(long)]
    count: bool,
}

fn main() -> lapy::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let schema = match args.format {
        Some(format) => format.into(),
        None => match FormatSchema::from_path(&args.input) {
            Some(schema) => schema,
            None => Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    "cannot guess the trajectory format from the file extension, use --format",
                )
                .exit(),
        },
    };
    let mode = if args.streaming {
        ReadMode::Streaming
    } else {
        ReadMode::Buffered
    };

    let mut reader = TrajectoryReader::open(&args.input, schema, mode)?;
    let mut stdout = BufWriter::new(std::io::stdout().lock());

    if args.count {
        writeln!(stdout, "{}", reader.frame_count()?)?;
        return Ok(());
    }

    let selection = args.frames.unwrap_or_default();
    for idx in 0.. {
        match selection.is_included(idx) {
            Some(true) => {}
            Some(false) => match reader.ensure(idx) {
                Err(err) if err.is_frame_not_found() => break,
                result => {
                    result?;
                    continue;
                }
            },
            None => break,
        }

        let frame = match reader.select(idx) {
            Err(err) if err.is_frame_not_found() => break,
            frame => frame?,
        };
        let timestep = match frame.timestep() {
            Some(step) => step.to_string(),
            None => "-".to_string(),
        };
        write!(stdout, "{idx}\t{timestep}\t{}", frame.atom_count())?;

        if args.cell {
            if let Some(cell) = frame.cell()? {
                write!(stdout, "\t{:?}", cell.bounds())?;
            }
        }
        if args.columns {
            write!(stdout, "\t{}", frame.columns()?.join(" "))?;
        }
        writeln!(stdout)?;
    }

    stdout.flush()?;
    Ok(())
}
