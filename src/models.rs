use chrono::NaiveDate;
use serde::Serialize;

/// Unified shape every source row is coerced into, regardless of the
/// originating CSV's column names. Every string field defaults to an empty
/// string rather than an absent value; only the parsed date may be absent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CanonicalBuyerRecord {
    pub company_name: String,
    pub country: String,
    pub city: String,
    pub product_text: String,
    pub hs_code: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: String,
    pub date: Option<NaiveDate>,
    pub date_raw: String,
    pub source: String,
}

/// A candidate after scoring and contact derivation, ready for
/// deduplication and presentation.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    pub company_name: String,
    pub domain: String,
    pub website: String,
    pub industry: String,
    pub country_targets: Vec<String>,
    pub email: String,
    pub contact_person: String,
    pub match_score: i32,
    pub source: String,
    pub country: String,
    pub city: String,
    pub product_text: String,
    pub hs_code: String,
    pub phone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStatus {
    Ok,
    Missing,
    Fail,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Ok => "ok",
            SourceStatus::Missing => "missing",
            SourceStatus::Fail => "fail",
        }
    }
}

/// Per-source diagnostics from the loader. One row per requested source,
/// whether or not the file could be read.
#[derive(Debug, Clone, Serialize)]
pub struct SourceLoadStatus {
    pub source: String,
    pub status: SourceStatus,
    pub rows: usize,
    pub cols: usize,
    pub encoding: String,
    pub delimiter: String,
    pub path: String,
    pub detail: String,
}

impl SourceLoadStatus {
    pub fn missing(source: &str) -> Self {
        SourceLoadStatus {
            source: source.to_string(),
            status: SourceStatus::Missing,
            rows: 0,
            cols: 0,
            encoding: String::new(),
            delimiter: String::new(),
            path: String::new(),
            detail: "path not resolved".to_string(),
        }
    }

    pub fn fail(source: &str, path: &str, detail: String) -> Self {
        SourceLoadStatus {
            source: source.to_string(),
            status: SourceStatus::Fail,
            rows: 0,
            cols: 0,
            encoding: String::new(),
            delimiter: String::new(),
            path: path.to_string(),
            detail,
        }
    }
}

/// Search parameters supplied by the caller (CLI or surrounding application).
#[derive(Debug, Clone)]
pub struct SearchParams {
    /// Industry label; must be one of the keys of the industry keyword table
    /// for the keyword bonuses to fire.
    pub industry: String,
    /// Optional HS-code filter. Internal whitespace is ignored.
    pub hs_code: String,
    /// Target countries. An empty list disables the country signal entirely.
    pub countries: Vec<String>,
    /// When true, records without an email are driven below any realistic
    /// score threshold.
    pub require_email: bool,
    /// Result list truncation, applied after scoring, dedup and sort.
    pub max_results: usize,
}
