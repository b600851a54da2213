//! Brand selection and first-letter narrowing
//!
//! Pure resolution logic for the brand picker: derive a single-character
//! bucket from each brand's first character, narrow the option list by a
//! chosen bucket, and resolve exactly one selected brand. The rendering
//! layer (terminal or dashboard) only displays what this module decides.
//!
//! Narrowing never strands the user: a bucket that matches nothing falls
//! back to the full option list, flagged so the UI can say so.

use std::fmt;

/// Grouping key derived from a brand's first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    /// Alphabetic first character, uppercased.
    Letter(char),
    /// Numeric first character, rendered `0-9`.
    Digits,
    /// Everything else (including empty names), rendered `#`.
    Other,
}

impl Bucket {
    pub fn of(name: &str) -> Bucket {
        let Some(first) = name.trim().chars().next() else {
            return Bucket::Other;
        };
        if first.is_alphabetic() {
            Bucket::Letter(first.to_uppercase().next().unwrap_or(first))
        } else if first.is_numeric() {
            Bucket::Digits
        } else {
            Bucket::Other
        }
    }

    /// Inverse of `Display`, for query-string round-trips.
    pub fn parse(text: &str) -> Option<Bucket> {
        match text.trim() {
            "" => None,
            "0-9" => Some(Bucket::Digits),
            "#" => Some(Bucket::Other),
            s => {
                let mut chars = s.chars();
                let first = chars.next()?;
                if chars.next().is_none() && first.is_alphabetic() {
                    Some(Bucket::Letter(first.to_uppercase().next().unwrap_or(first)))
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bucket::Letter(c) => write!(f, "{}", c),
            Bucket::Digits => write!(f, "0-9"),
            Bucket::Other => write!(f, "#"),
        }
    }
}

/// Distinct buckets present in `options`: letters first (A–Z), then `0-9`,
/// then `#`. This is the order the filter row displays them in.
pub fn buckets_present(options: &[String]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = options.iter().map(|o| Bucket::of(o)).collect();
    buckets.sort();
    buckets.dedup();
    buckets
}

/// The outcome of resolving a brand selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Options visible after narrowing (the full list when `fell_back`).
    pub visible: Vec<String>,
    /// The single chosen brand, always a member of `visible`.
    pub chosen: String,
    /// True when the bucket matched nothing and the full list was restored.
    pub fell_back: bool,
}

/// Resolve one chosen brand from `options`, optionally narrowed by `bucket`.
///
/// Returns `None` only when `options` itself is empty ("nothing to
/// select"). The chosen brand is `default` if it is among the visible
/// options, otherwise the first visible option.
pub fn select_brand(
    options: &[String],
    default: Option<&str>,
    bucket: Option<Bucket>,
) -> Option<Selection> {
    if options.is_empty() {
        return None;
    }

    let (visible, fell_back) = match bucket {
        Some(bucket) => {
            let narrowed: Vec<String> = options
                .iter()
                .filter(|o| Bucket::of(o) == bucket)
                .cloned()
                .collect();
            if narrowed.is_empty() {
                (options.to_vec(), true)
            } else {
                (narrowed, false)
            }
        }
        None => (options.to_vec(), false),
    };

    let chosen = default
        .filter(|d| visible.iter().any(|o| o == d))
        .unwrap_or(&visible[0])
        .to_string();

    Some(Selection { visible, chosen, fell_back })
}
