// loader.rs
//
// Multi-source CSV ingestion. Each source file has an unknown encoding and
// delimiter; decoding never raises, row-level parse errors are skipped, and
// file-level failures are isolated per source. Every outcome lands in a
// per-source status report so silent data loss stays diagnosable.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use encoding_rs::EUC_KR;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::models::{CanonicalBuyerRecord, SourceLoadStatus, SourceStatus};
use crate::normalize::{normalize_row, ColumnMap};

/// Registry of known buyer-lead sources: source identifier to the CSV
/// filename published by the issuing agency.
pub const BUYER_SOURCE_FILES: &[(&str, &str)] = &[
    (
        "KOTRA_해외바이어현황_20240829",
        "대한무역투자진흥공사_해외바이어 현황_20240829.csv",
    ),
    (
        "중진공_해외바이어구매오퍼_20241231",
        "중소벤처기업진흥공단_해외바이어 구매오퍼 정보_20241231.csv",
    ),
    (
        "중진공_해외바이어인콰이어리_20241230",
        "중소벤처기업진흥공단_해외바이어 인콰이어리 신청_20241230.csv",
    ),
    (
        "무보_화장품바이어_20200812",
        "한국무역보험공사_화장품 바이어 정보_20200812.csv",
    ),
    (
        "중진공_고비즈코리아거래처_20250523",
        "중소벤처기업진흥공단_고비즈코리아 거래처정보_20250523.csv",
    ),
];

const DELIMITER_CANDIDATES: &[u8] = &[b',', b';', b'\t', b'|'];
const SNIFF_SAMPLE_CHARS: usize = 5000;

/// Result of loading one source: normalized records plus its status row.
#[derive(Debug)]
pub struct LoadedSource {
    pub records: Vec<CanonicalBuyerRecord>,
    pub status: SourceLoadStatus,
}

fn nfc(s: &str) -> String {
    s.nfc().collect()
}

/// Locates a source CSV by filename: the data directory override, the
/// working directory, `data/` and `datasets/`, then a recursive scan
/// comparing NFC-normalized filenames (macOS exports arrive NFD).
pub fn find_local_csv(filename: &str, data_dir: Option<&Path>) -> Option<PathBuf> {
    let target = nfc(filename);
    let cwd = std::env::current_dir().ok()?;

    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = data_dir {
        candidates.push(dir.join(filename));
    }
    candidates.push(cwd.join(filename));
    candidates.push(cwd.join("data").join(filename));
    candidates.push(cwd.join("datasets").join(filename));

    for p in &candidates {
        if p.exists() {
            return Some(p.clone());
        }
    }

    let mut roots: Vec<PathBuf> = Vec::new();
    if let Some(dir) = data_dir {
        roots.push(dir.to_path_buf());
    }
    roots.push(cwd);
    for root in roots {
        if let Some(found) = scan_for_csv(&root, &target, 0) {
            return Some(found);
        }
    }
    None
}

fn scan_for_csv(dir: &Path, target_nfc: &str, depth: usize) -> Option<PathBuf> {
    if depth > 4 {
        return None;
    }
    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if let Some(found) = scan_for_csv(&path, target_nfc, depth + 1) {
                return Some(found);
            }
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if nfc(name) == target_nfc {
                return Some(path);
            }
        }
    }
    None
}

/// Resolves every registered source to a local path where possible.
/// Unresolved sources stay in the map with `None` so the loader can report
/// them as missing.
pub fn resolve_source_paths(data_dir: Option<&Path>) -> Vec<(String, Option<PathBuf>)> {
    BUYER_SOURCE_FILES
        .iter()
        .map(|(source, filename)| {
            let path = find_local_csv(filename, data_dir);
            if path.is_none() {
                debug!("Source '{}' not found locally ({})", source, filename);
            }
            (source.to_string(), path)
        })
        .collect()
}

/// Decodes raw CSV bytes, trying `utf-8-sig`, `utf-8`, `cp949` and
/// `euc-kr` in order. When all strict attempts fail the bytes are
/// force-decoded as cp949 with replacement characters; decoding never
/// fails outright.
pub fn decode_csv_bytes(raw: &[u8]) -> (String, String) {
    if let Some(stripped) = raw.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        if let Ok(text) = std::str::from_utf8(stripped) {
            return (text.to_string(), "utf-8-sig".to_string());
        }
    }
    if let Ok(text) = std::str::from_utf8(raw) {
        return (text.to_string(), "utf-8".to_string());
    }
    // cp949 and euc-kr share the windows-949 decoder; both labels are kept
    // for the diagnostics report.
    for label in ["cp949", "euc-kr"] {
        if let Some(text) = EUC_KR.decode_without_bom_handling_and_without_replacement(raw) {
            return (text.into_owned(), label.to_string());
        }
    }
    let (text, _, _) = EUC_KR.decode(raw);
    (text.into_owned(), "cp949(errors=replace)".to_string())
}

/// Picks the most plausible delimiter from the first ~5000 characters by
/// counting candidate occurrences on the first non-empty line.
pub fn sniff_delimiter(text: &str) -> u8 {
    let sample: String = text.chars().take(SNIFF_SAMPLE_CHARS).collect();
    let first_line = sample
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or_default();
    let mut best = b',';
    let mut best_count = 0usize;
    for &delim in DELIMITER_CANDIDATES {
        let count = first_line.bytes().filter(|b| *b == delim).count();
        if count > best_count {
            best = delim;
            best_count = count;
        }
    }
    best
}

/// Parses decoded CSV text with the given delimiter. Rows that fail to
/// parse are skipped individually; short rows are tolerated.
fn parse_csv_text(text: &str, delimiter: u8) -> Result<(Vec<String>, Vec<StringRecord>)> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => {
                skipped += 1;
                debug!("Skipping malformed row: {}", e);
            }
        }
    }
    if skipped > 0 {
        warn!("Skipped {} malformed rows", skipped);
    }
    Ok((headers, rows))
}

/// Parses CSV text, retrying the remaining candidate delimiters when the
/// sniffed one produces a single-column table.
fn parse_csv_flexible(text: &str) -> Result<(Vec<String>, Vec<StringRecord>, u8)> {
    let sniffed = sniff_delimiter(text);
    let (headers, rows) = parse_csv_text(text, sniffed)?;
    if headers.len() > 1 {
        return Ok((headers, rows, sniffed));
    }
    for &alt in DELIMITER_CANDIDATES {
        if alt == sniffed {
            continue;
        }
        let (alt_headers, alt_rows) = parse_csv_text(text, alt)?;
        if alt_headers.len() > 1 {
            return Ok((alt_headers, alt_rows, alt));
        }
    }
    Ok((headers, rows, sniffed))
}

/// Loads and normalizes a single source file. Never panics; every failure
/// mode degrades into the returned status row.
pub fn load_single_source(source: &str, path: Option<&Path>) -> LoadedSource {
    let path = match path {
        Some(p) => p,
        None => {
            return LoadedSource {
                records: Vec::new(),
                status: SourceLoadStatus::missing(source),
            }
        }
    };
    let path_display = path.display().to_string();

    let raw = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return LoadedSource {
                records: Vec::new(),
                status: SourceLoadStatus::fail(source, &path_display, e.to_string()),
            }
        }
    };

    let (text, encoding) = decode_csv_bytes(&raw);
    let (headers, rows, delimiter) = match parse_csv_flexible(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            return LoadedSource {
                records: Vec::new(),
                status: SourceLoadStatus::fail(source, &path_display, e.to_string()),
            }
        }
    };

    let map = ColumnMap::infer(&headers);
    let records: Vec<CanonicalBuyerRecord> = rows
        .iter()
        .map(|row| normalize_row(&map, row, source))
        .collect();

    debug!(
        "Source '{}': {} rows, {} cols, encoding={}, delimiter={:?}",
        source,
        records.len(),
        headers.len(),
        encoding,
        delimiter as char
    );

    LoadedSource {
        status: SourceLoadStatus {
            source: source.to_string(),
            status: SourceStatus::Ok,
            rows: records.len(),
            cols: headers.len(),
            encoding,
            delimiter: (delimiter as char).to_string(),
            path: path_display,
            detail: String::new(),
        },
        records,
    }
}

/// Loads every requested source concurrently and aggregates the results.
/// The status report preserves the requested source order; record order is
/// irrelevant downstream since the final ordering contract is the score
/// sort.
pub async fn load_sources(
    resolved: Vec<(String, Option<PathBuf>)>,
) -> (Vec<CanonicalBuyerRecord>, Vec<SourceLoadStatus>) {
    let bar = ProgressBar::new(resolved.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}") {
        bar.set_style(style);
    }

    let mut handles = Vec::with_capacity(resolved.len());
    for (source, path) in resolved {
        let bar = bar.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            let loaded = load_single_source(&source, path.as_deref());
            bar.inc(1);
            loaded
        }));
    }

    let mut all_records = Vec::new();
    let mut statuses = Vec::new();
    for result in join_all(handles).await {
        match result {
            Ok(loaded) => {
                statuses.push(loaded.status);
                all_records.extend(loaded.records);
            }
            Err(e) => warn!("Source loading task panicked: {}", e),
        }
    }
    bar.finish_and_clear();

    info!(
        "Loaded {} records from {} sources ({} ok)",
        all_records.len(),
        statuses.len(),
        statuses
            .iter()
            .filter(|s| s.status == SourceStatus::Ok)
            .count()
    );
    (all_records, statuses)
}

/// Convenience view of the status report keyed by source.
pub fn status_by_source(statuses: &[SourceLoadStatus]) -> HashMap<&str, &SourceLoadStatus> {
    statuses.iter().map(|s| (s.source.as_str(), s)).collect()
}
