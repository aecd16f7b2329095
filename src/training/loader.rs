// src/training/loader.rs

use crate::domain::{Listing, RawListing};
use crate::training::TrainError;
use encoding_rs::{Encoding, SHIFT_JIS};
use std::fs;
use std::path::{Path, PathBuf};

/// File-name markers of files the trainer writes itself; never read back as input.
pub const DEFAULT_EXCLUDE_MARKERS: &[&str] = &["chome_model", "23ku_v"];

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub encoding: &'static Encoding,
    pub exclude_markers: Vec<String>,
    pub reference_year: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub files_read: usize,
    pub files_skipped: usize,
    pub rows_total: usize,
    pub rows_dropped: usize,
}

/// `cp932` and `sjis` are common names for what WHATWG calls Shift_JIS.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, TrainError> {
    match label.to_ascii_lowercase().as_str() {
        "cp932" | "sjis" | "ms932" => Ok(SHIFT_JIS),
        other => Encoding::for_label(other.as_bytes())
            .ok_or_else(|| TrainError::UnknownEncoding(label.to_string())),
    }
}

/// Expand directories into their `*.csv` files (sorted), keep explicit files
/// as given, and drop anything whose name carries an exclusion marker.
pub fn discover_csv_files(inputs: &[PathBuf], exclude_markers: &[String]) -> Result<Vec<PathBuf>, TrainError> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let entries = fs::read_dir(input).map_err(|source| TrainError::Io {
                path: input.clone(),
                source,
            })?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| {
                    p.extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
                })
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    files.retain(|path| {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        !exclude_markers.iter().any(|m| name.contains(m.as_str()))
    });

    if files.is_empty() {
        let shown: Vec<String> = inputs.iter().map(|p| p.display().to_string()).collect();
        return Err(TrainError::NoInputFiles(shown.join(", ")));
    }
    Ok(files)
}

/// Decode and parse one CSV payload. Returns usable listings and the number
/// of rows dropped.
pub fn parse_listings(bytes: &[u8], cfg: &LoaderConfig) -> Result<(Vec<Listing>, usize), csv::Error> {
    let (text, _, had_errors) = cfg.encoding.decode(bytes);
    if had_errors {
        log::debug!("input contained bytes invalid for {}", cfg.encoding.name());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    // Fail early on an unreadable header; row-level problems only drop the row.
    reader.headers()?;

    let mut listings = Vec::new();
    let mut dropped = 0;
    for record in reader.deserialize::<RawListing>() {
        match record.ok().and_then(|raw| raw.into_listing(cfg.reference_year)) {
            Some(listing) => listings.push(listing),
            None => dropped += 1,
        }
    }
    Ok((listings, dropped))
}

/// Read every file, skipping (and logging) the ones that cannot be read.
pub fn load_listings(files: &[PathBuf], cfg: &LoaderConfig) -> (Vec<Listing>, LoadReport) {
    let mut all = Vec::new();
    let mut report = LoadReport::default();

    for path in files {
        match load_file(path, cfg) {
            Ok((listings, dropped)) => {
                log::info!(
                    "{}: {} listings, {} rows dropped",
                    path.display(),
                    listings.len(),
                    dropped
                );
                report.files_read += 1;
                report.rows_total += listings.len() + dropped;
                report.rows_dropped += dropped;
                all.extend(listings);
            }
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                report.files_skipped += 1;
            }
        }
    }

    (all, report)
}

fn load_file(path: &Path, cfg: &LoaderConfig) -> Result<(Vec<Listing>, usize), TrainError> {
    let bytes = fs::read(path).map_err(|source| TrainError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_listings(&bytes, cfg).map_err(|source| TrainError::Csv {
        path: path.to_path_buf(),
        source,
    })
}
