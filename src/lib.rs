//! Scentscope - Explore perfume ratings and popularity by brand
//!
//! Scentscope loads a tabular dataset of perfume records (brand, name,
//! rating, votes, optional URL), cleans it, and renders a scatter plot of
//! rating versus vote count for a chosen brand - in the terminal as an
//! aggregate table, or in the browser as an interactive Plotly dashboard.
//!
//! # Pipeline
//!
//! Data flows strictly forward: load → brand index → selection → figure.
//!
//! 1. **Loading** ([`dataset`]): CSV parsing with numeric coercion.
//!    Rows missing brand, name, rating, or votes are dropped; a file
//!    missing one of those *columns* yields an empty dataset instead of an
//!    error. Loads are memoized by path for the process lifetime.
//!
//! 2. **Selection** ([`selector`]): brands grouped by first-character
//!    buckets (`A`..`Z`, `0-9`, `#`); narrowing that matches nothing falls
//!    back to the full list rather than stranding the user.
//!
//! 3. **Figures** ([`figure`]): a pure function from (dataset, brand) to a
//!    declarative Plotly-compatible spec - votes on a log axis (floored at
//!    1 for plotting, true value preserved per point), size and color
//!    encodings, and a high-rating band at 4.0 and above.
//!
//! # Quick Start
//!
//! ```no_run
//! use scentscope::{build_figure, Dataset};
//!
//! # fn main() -> Result<(), scentscope::LoadError> {
//! let dataset = Dataset::load("perfumes.csv")?;
//!
//! for brand in dataset.brands() {
//!     println!("{}: {} fragrance(s)", brand, dataset.for_brand(&brand).len());
//! }
//!
//! let figure = build_figure(&dataset, "Dior");
//! println!("{}", serde_json::to_string(&figure).unwrap());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`dataset`]: loading, cleaning, the path-keyed cache, brand index
//! - [`selector`]: bucket filter and brand selection resolution
//! - [`figure`]: scatter-plot spec construction for the rendering boundary
//! - [`serve`]: the local dashboard server

pub mod dataset;
pub mod figure;
pub mod selector;
pub mod serve;

pub use dataset::{BrandSummary, Dataset, LoadError, Record, ESSENTIAL_COLUMNS, HIGH_RATING};
pub use figure::{build_figure, rating_bounds, spec::FigureSpec};
pub use selector::{buckets_present, select_brand, Bucket, Selection};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is correct and documented.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        // Core types are re-exported from the crate root
        let _: Bucket = Bucket::Other;
        let dataset = Dataset::default();
        let _: Vec<String> = dataset.brands();
    }

    #[test]
    fn test_figure_accessible_from_root() {
        let figure: FigureSpec = build_figure(&Dataset::default(), "Dior");
        assert!(figure.data.is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(HIGH_RATING, 4.0);
        assert_eq!(ESSENTIAL_COLUMNS, ["brand", "name", "rating", "votes"]);
    }
}
