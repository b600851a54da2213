//! Dataset loading and cleaning
//!
//! Reads the perfume CSV into an in-memory table of [`Record`]s:
//! - `rating` and `votes` are coerced to numbers; values that don't parse
//!   (including NaN/inf) count as absent
//! - rows missing any of brand, name, rating, votes are dropped
//! - `url` is normalized to `Option<String>` (empty cell = no link)
//!
//! A file whose header lacks one of the essential columns yields an *empty*
//! dataset rather than an error, so callers can render a "nothing to show"
//! state. Only a missing/unreadable file is reported as a failure.
//!
//! Loads are memoized by path for the lifetime of the process: the first
//! call parses, every later call (and every concurrent caller) gets the
//! same `Arc<Dataset>` back.

use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

/// Columns a usable dataset must have. `url` is optional on top of these.
pub const ESSENTIAL_COLUMNS: [&str; 4] = ["brand", "name", "rating", "votes"];

/// Rating threshold for the "high rating" metric and the figure band.
pub const HIGH_RATING: f64 = 4.0;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("dataset file not found: {0}")]
    Missing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One cleaned perfume entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub brand: String,
    pub name: String,
    pub rating: f64,
    pub votes: i64,
    /// `None` when the url column is missing or the cell is empty.
    pub url: Option<String>,
}

/// The full in-memory collection of valid records from one source file.
///
/// Immutable once built; downstream components only ever read it.
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<Record>,
    dropped: usize,
}

/// Column positions resolved from the header row.
struct Columns {
    brand: usize,
    name: usize,
    rating: usize,
    votes: usize,
    url: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Option<Columns> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == wanted)
        };
        let [brand, name, rating, votes] = ESSENTIAL_COLUMNS;
        Some(Columns {
            brand: find(brand)?,
            name: find(name)?,
            rating: find(rating)?,
            votes: find(votes)?,
            url: find("url"),
        })
    }
}

/// Numeric coercion: trimmed parse, non-finite counts as absent.
fn coerce_numeric(raw: &str) -> Option<f64> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    v.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Text field: trimmed, empty counts as absent.
fn coerce_text(raw: &str) -> Option<&str> {
    let v = raw.trim();
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
}

impl Dataset {
    /// Load and clean the dataset at `path`, memoized process-wide.
    ///
    /// The cache key is the canonical path, so `./data.csv` and its absolute
    /// form share one parse. The lock is held across the parse: at most one
    /// computation per distinct path ever runs, and concurrent callers for a
    /// cached path just clone the `Arc`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Arc<Dataset>, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        let key = path.canonicalize()?;

        let mut cache = cache().lock().unwrap_or_else(|e| e.into_inner());
        if let Some(dataset) = cache.get(&key) {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(Self::from_path(path)?);
        cache.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    fn from_path(path: &Path) -> Result<Dataset, LoadError> {
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => {
                b'\t'
            }
            _ => b',',
        };
        let file = File::open(path)?;
        Ok(Self::from_reader(file, delimiter)?)
    }

    /// Parse and clean from any reader. This is `load` without the existence
    /// check and the cache; the serve layer and tests go through it directly.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Dataset, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let Some(columns) = Columns::resolve(&headers) else {
            // Essential column missing: empty dataset, not an error
            return Ok(Dataset::default());
        };

        let mut records = Vec::new();
        let mut dropped = 0usize;

        for row in rdr.records() {
            let Ok(row) = row else {
                dropped += 1;
                continue;
            };

            let brand = row.get(columns.brand).and_then(coerce_text);
            let name = row.get(columns.name).and_then(coerce_text);
            let rating = row.get(columns.rating).and_then(coerce_numeric);
            let votes = row.get(columns.votes).and_then(coerce_numeric);

            let (Some(brand), Some(name), Some(rating), Some(votes)) =
                (brand, name, rating, votes)
            else {
                dropped += 1;
                continue;
            };

            let url = columns
                .url
                .and_then(|i| row.get(i))
                .and_then(coerce_text)
                .map(str::to_string);

            records.push(Record {
                brand: brand.to_string(),
                name: name.to_string(),
                rating,
                votes: votes as i64,
                url,
            });
        }

        Ok(Dataset { records, dropped })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source rows rejected during cleaning.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Sorted, deduplicated brand names. Recomputed on each call.
    pub fn brands(&self) -> Vec<String> {
        let mut brands: Vec<String> = self.records.iter().map(|r| r.brand.clone()).collect();
        brands.sort();
        brands.dedup();
        brands
    }

    /// All records for one brand, in source order.
    pub fn for_brand(&self, brand: &str) -> Vec<&Record> {
        self.records.iter().filter(|r| r.brand == brand).collect()
    }
}

fn cache() -> &'static Mutex<HashMap<PathBuf, Arc<Dataset>>> {
    static CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<Dataset>>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Headline numbers for one brand's subset.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrandSummary {
    pub total: usize,
    pub high_rated: usize,
    pub pct_high: f64,
}

impl BrandSummary {
    pub fn for_brand(dataset: &Dataset, brand: &str) -> Self {
        let subset = dataset.for_brand(brand);
        let total = subset.len();
        let high_rated = subset.iter().filter(|r| r.rating >= HIGH_RATING).count();
        let pct_high = if total > 0 {
            high_rated as f64 / total as f64
        } else {
            0.0
        };
        BrandSummary { total, high_rated, pct_high }
    }
}
