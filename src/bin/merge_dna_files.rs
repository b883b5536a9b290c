//! CLI binary for merging raw DNA data files of one individual

use clap::Parser;
use env_logger::Env;
use snpkit::{
    merge::{merge_files, write_merged_table},
    utils::{create_writer, validate_file_readable, Timer},
    SnpKitError, SnpKitResult,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "merge_dna_files")]
#[command(about = "Merge several raw DNA data files into one 23andMe-style file")]
#[command(long_about = "
Merges raw data downloads from 23andMe, AncestryDNA and Genes for Good
(23andMe compatible) into a single file in 23andMe layout.

SNPs found in more than one file are counted as intersections. When two
files disagree on a genotype, even after allowing for a strand flip, a
conflict is reported on stderr. 23andMe and Genes for Good records take
priority over records from other sources; otherwise the file listed later
wins.

No-call entries are not carried over into the merged file.
")]
struct Args {
    /// Raw data files, in priority order (a comma-separated list is accepted)
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    files: Vec<String>,

    /// Path to the merged output file (stdout if omitted, gzip if it ends in .gz)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Force overwrite of output file if it exists
    #[arg(short, long)]
    force: bool,
}

/// Accept both `a.txt b.txt` and `a.txt,b.txt`
fn expand_file_list(files: &[String]) -> Vec<PathBuf> {
    files
        .iter()
        .flat_map(|arg| arg.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn run() -> SnpKitResult<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_secs()
        .init();

    let files = expand_file_list(&args.files);
    log::info!("Merging {} files", files.len());

    for file in &files {
        validate_file_readable(file)?;
    }

    if let Some(output) = &args.output {
        if output.exists() && !args.force {
            return Err(SnpKitError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("Output file {:?} already exists. Use --force to overwrite.", output),
            )));
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let summary = {
        let _timer = Timer::new("Merging raw data files");
        merge_files(&files)?
    };

    eprintln!("{} intersections found.", summary.intersections);
    if !summary.conflicts.is_empty() {
        log::info!("{} conflicting genotypes", summary.conflicts.len());
    }
    for rejected in &summary.rejected_files {
        eprintln!("Skipped malformed file: {}", rejected);
    }

    let mut writer = create_writer(args.output.as_deref())?;
    write_merged_table(&summary, &mut writer)?;

    log::info!("Wrote {} SNPs", summary.records.len());

    Ok(())
}

/// Handle application errors and provide user-friendly messages
fn handle_error(error: SnpKitError) -> ! {
    match error {
        SnpKitError::FileNotFound(path) => {
            eprintln!("Error: File not found: {}", path);
            eprintln!("Please check that the file exists and is readable.");
        }
        SnpKitError::Format { path, line, source } => {
            eprintln!("Error: Malformed line {} in {}: {}", line, path, source);
            eprintln!("Please check that the file is a supported raw data download.");
        }
        SnpKitError::InvalidConfig(msg) => {
            eprintln!("Error: Invalid configuration: {}", msg);
        }
        SnpKitError::Io(ref e) => {
            eprintln!("Error: I/O error: {}", e);
            eprintln!("Please check file permissions and disk space.");
        }
        SnpKitError::Csv(ref e) => {
            eprintln!("Error: CSV processing error: {}", e);
            eprintln!("Please check the raw data file format.");
        }
    }
    std::process::exit(1);
}

fn main() {
    if let Err(e) = run() {
        handle_error(e);
    }
}
