//! Read and write two-column text files of x and y values.
use std::fs;
use std::io;
use std::io::prelude::*;
use std::path;

use crate::signal::{SignalAccess, Spectrum};

fn invalid_data<E: ToString>(line_no: usize, err: E) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("line {}: {}", line_no + 1, err.to_string()),
    )
}

/// Parse whitespace separated `x y` pairs, one per line. Blank lines and lines
/// starting with `#` are skipped.
pub fn spectrum_from_reader<R: BufRead>(reader: R) -> io::Result<Spectrum> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let (Some(xi), Some(yi)) = (tokens.next(), tokens.next()) else {
            return Err(invalid_data(line_no, "expected two columns"));
        };
        x.push(xi.parse::<f64>().map_err(|e| invalid_data(line_no, e))?);
        y.push(yi.parse::<f64>().map_err(|e| invalid_data(line_no, e))?);
    }
    Spectrum::new(x, y).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

pub fn spectrum_from_file<P: AsRef<path::Path>>(path: P) -> io::Result<Spectrum> {
    let file = fs::File::open(path)?;
    spectrum_from_reader(io::BufReader::new(file))
}

/// Write the samples of `signal` as tab separated lines.
pub fn spectrum_to_writer<S: SignalAccess + ?Sized, W: Write>(
    signal: &S,
    writer: &mut W,
) -> io::Result<()> {
    for (x, y) in signal.x_array().iter().zip(signal.y_array()) {
        writeln!(writer, "{x}\t{y}")?;
    }
    Ok(())
}

pub fn spectrum_to_file<S: SignalAccess + ?Sized, P: AsRef<path::Path>>(
    signal: &S,
    path: P,
) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);
    spectrum_to_writer(signal, &mut writer)?;
    writer.flush()
}
