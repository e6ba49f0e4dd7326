use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use adaptive_rk_core::Trajectory;
use anyhow::{Context, Result};
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Delimiter {
    Comma,
    /// Single space between columns.
    Space,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Space => b' ',
        }
    }
}

/// Opens the destination for the trajectory: a buffered file, or stdout.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}.", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

/// Writes one `t, x, y` row per trajectory point.
pub fn write_trajectory<W: Write>(
    writer: W,
    trajectory: &Trajectory,
    delimiter: Delimiter,
    header: bool,
) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(false)
        .from_writer(writer);

    if header {
        csv.write_record(["t", "x", "y"])?;
    }
    for (t, state) in trajectory.states() {
        csv.serialize((t, state.x, state.y))?;
    }
    csv.flush().context("Failed to flush trajectory output.")?;
    Ok(())
}
