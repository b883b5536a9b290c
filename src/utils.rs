//! Utility functions for file handling and common operations

use crate::{SnpKitError, SnpKitResult};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::Path;

/// Check if a file is gzip compressed
pub fn is_gzipped<P: AsRef<Path>>(path: P) -> SnpKitResult<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0; 2];

    match file.read_exact(&mut buffer) {
        Ok(()) => Ok(buffer == [0x1f, 0x8b]),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(SnpKitError::Io(e)),
    }
}

/// Validate file paths and check if they exist
pub fn validate_file_exists<P: AsRef<Path>>(path: P) -> SnpKitResult<()> {
    if !path.as_ref().exists() {
        return Err(SnpKitError::FileNotFound(
            path.as_ref().to_string_lossy().to_string(),
        ));
    }
    Ok(())
}

/// Validate that a file is readable
pub fn validate_file_readable<P: AsRef<Path>>(path: P) -> SnpKitResult<()> {
    validate_file_exists(&path)?;

    File::open(&path)
        .map_err(|_| SnpKitError::FileNotFound(path.as_ref().to_string_lossy().to_string()))?;

    Ok(())
}

/// Open a plain or gzip-compressed text file
pub fn open_reader<P: AsRef<Path>>(path: P) -> SnpKitResult<Box<dyn BufRead>> {
    let file = File::open(&path)
        .map_err(|_| SnpKitError::FileNotFound(path.as_ref().to_string_lossy().to_string()))?;

    let reader: Box<dyn BufRead> = if is_gzipped(&path)? {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    Ok(reader)
}

/// Create an output sink: stdout when no path is given, gzip when the path
/// ends in `.gz`
pub fn create_writer(path: Option<&Path>) -> SnpKitResult<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(io::BufWriter::new(io::stdout())));
    };

    let file = File::create(path)?;
    let writer: Box<dyn Write> = if path.extension().and_then(|s| s.to_str()) == Some("gz") {
        Box::new(GzEncoder::new(file, Compression::default()))
    } else {
        Box::new(io::BufWriter::new(file))
    };

    Ok(writer)
}

/// Timer utility for measuring execution time
pub struct Timer {
    start: std::time::Instant,
    name: String,
}

impl Timer {
    pub fn new(name: &str) -> Self {
        log::info!("Starting timer: {}", name);
        Timer {
            start: std::time::Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }

    pub fn log_elapsed(&self) {
        log::info!("Timer '{}' elapsed: {:.2?}", self.name, self.elapsed());
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.log_elapsed();
    }
}
