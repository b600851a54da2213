//! Figure construction
//!
//! Builds the scatter-plot specification for one brand's records:
//! rating on x, votes on a log y axis, point size scaling with votes,
//! point color scaling with rating, and a per-point payload carrying the
//! source URL and true vote count for click/hover handling downstream.
//!
//! `build_figure` is a pure function of (dataset, brand); an empty dataset
//! or an unknown brand produces a placeholder spec, never an error.

pub mod spec;

use crate::dataset::{Dataset, HIGH_RATING};
use spec::{
    Annotation, Axis, ColorBar, FigureSpec, Font, Layout, Margin, Marker, MarkerLine,
    ScatterTrace, Shape, ShapeLine, Title,
};

/// Maximum visual marker size, in px.
const SIZE_MAX: f64 = 48.0;

/// Padding applied to both ends of the rating axis.
const AXIS_PAD: f64 = 0.1;

/// Rating range assumed when the subset carries no ratings, pre-padding.
const DEFAULT_RATING_RANGE: (f64, f64) = (0.0, 5.0);

const HOVER_TEMPLATE: &str =
    "<b>%{hovertext}</b><br>Rating: %{x:.2f}<br>Votes: %{customdata[1]:,}<extra></extra>";

/// Padded bounds for the rating axis: `[min - 0.1, max + 0.1]`, or the
/// padded default range when there are no ratings at all.
pub fn rating_bounds(ratings: &[f64]) -> (f64, f64) {
    let (min, max) = if ratings.is_empty() {
        DEFAULT_RATING_RANGE
    } else {
        ratings.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
            (lo.min(r), hi.max(r))
        })
    };
    (min - AXIS_PAD, max + AXIS_PAD)
}

/// Build the scatter figure for `brand`.
pub fn build_figure(dataset: &Dataset, brand: &str) -> FigureSpec {
    if dataset.is_empty() {
        return placeholder("No data");
    }

    let subset = dataset.for_brand(brand);
    let title = format!("{} — Rating vs Votes", brand);
    if subset.is_empty() {
        return placeholder(&title);
    }

    let ratings: Vec<f64> = subset.iter().map(|r| r.rating).collect();
    let (x_min, x_max) = rating_bounds(&ratings);

    // Log axis guard: plotted votes never go below 1. The true value rides
    // along in customdata for hover text and click handling.
    let plot_votes: Vec<i64> = subset.iter().map(|r| r.votes.max(1)).collect();
    let true_votes: Vec<i64> = subset.iter().map(|r| r.votes).collect();
    let names: Vec<String> = subset.iter().map(|r| r.name.clone()).collect();
    let customdata: Vec<(String, i64)> = subset
        .iter()
        .map(|r| (r.url.clone().unwrap_or_default(), r.votes))
        .collect();

    // Plotly area sizing: sizeref pins the largest point at SIZE_MAX px
    let max_votes = true_votes.iter().copied().max().unwrap_or(1).max(1);
    let sizeref = 2.0 * max_votes as f64 / (SIZE_MAX * SIZE_MAX);

    let trace = ScatterTrace {
        kind: "scatter",
        mode: "markers",
        x: ratings.clone(),
        y: plot_votes,
        hovertext: names,
        hovertemplate: HOVER_TEMPLATE.to_string(),
        customdata,
        marker: Marker {
            size: true_votes,
            sizemode: "area",
            sizeref,
            color: ratings,
            colorscale: "Viridis",
            showscale: true,
            colorbar: ColorBar { title: Title::plain("Rating"), ticks: "outside" },
            line: MarkerLine { width: 0.5, color: "rgba(0,0,0,0.2)" },
        },
    };

    let mut layout = base_layout(&title);
    layout.xaxis = Some(Axis {
        title: Some(Title::plain("Rating")),
        range: Some([x_min, x_max]),
        zeroline: Some(false),
        showgrid: Some(true),
        gridcolor: Some("rgba(200,200,200,0.2)"),
        tickformat: Some(".2f"),
        ..Axis::default()
    });
    layout.yaxis = Some(Axis {
        title: Some(Title::plain("Votes (log scale)")),
        kind: Some("log"),
        showgrid: Some(true),
        gridcolor: Some("rgba(200,200,200,0.2)"),
        ..Axis::default()
    });

    // High-rating band, only when it has somewhere to span
    if x_max > HIGH_RATING {
        layout.shapes.push(Shape {
            kind: "rect",
            xref: "x",
            yref: "paper",
            x0: HIGH_RATING,
            x1: x_max,
            y0: 0.0,
            y1: 1.0,
            fillcolor: "LightGreen",
            opacity: 0.08,
            line: ShapeLine { width: 0.0 },
        });
        layout.annotations.push(Annotation {
            text: "High rating (>=4.0)",
            x: HIGH_RATING,
            y: 1.0,
            xref: "x",
            yref: "paper",
            xanchor: "left",
            yanchor: "top",
            showarrow: false,
        });
    }

    FigureSpec { data: vec![trace], layout }
}

fn base_layout(title: &str) -> Layout {
    Layout {
        title: Some(Title {
            text: title.to_string(),
            x: Some(0.5),
            xanchor: Some("center"),
            font: Some(Font { size: 24, family: "Arial, sans-serif" }),
        }),
        height: Some(900),
        margin: Some(Margin { l: 80, r: 80, t: 70, b: 80 }),
        hovermode: Some("closest"),
        // Fire click events without entering selection mode
        clickmode: Some("event"),
        plot_bgcolor: Some("white"),
        paper_bgcolor: Some("white"),
        autosize: Some(true),
        ..Layout::default()
    }
}

fn placeholder(title: &str) -> FigureSpec {
    FigureSpec { data: vec![], layout: base_layout(title) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn dataset(text: &str) -> Dataset {
        Dataset::from_reader(text.as_bytes(), b',').unwrap()
    }

    const THREE_BRANDS: &str = "brand,name,rating,votes,url\n\
                                Dior,A,4.5,100,http://x\n\
                                Dior,B,3.0,5,\n\
                                Chanel,C,4.8,200,http://y\n";

    // ==========================================================================
    // AXIS BOUNDS TESTS
    // ==========================================================================

    #[test]
    fn test_bounds_pad_min_and_max() {
        let (lo, hi) = rating_bounds(&[3.0, 4.5, 4.0]);

        assert!((lo - 2.9).abs() < 1e-9);
        assert!((hi - 4.6).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_default_when_no_ratings() {
        let (lo, hi) = rating_bounds(&[]);

        assert!((lo - -0.1).abs() < 1e-9);
        assert!((hi - 5.1).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_single_rating() {
        let (lo, hi) = rating_bounds(&[4.2]);

        assert!((lo - 4.1).abs() < 1e-9);
        assert!((hi - 4.3).abs() < 1e-9);
    }

    // ==========================================================================
    // FIGURE CONSTRUCTION TESTS
    // ==========================================================================
    //
    // One point per record of the chosen brand; plotted votes are floored at
    // 1 for the log axis while customdata keeps the true value.
    // ==========================================================================

    #[test]
    fn test_point_count_matches_brand_subset() {
        let ds = dataset(THREE_BRANDS);

        let fig = build_figure(&ds, "Dior");
        assert_eq!(fig.data.len(), 1);
        assert_eq!(fig.data[0].x.len(), 2);

        let fig = build_figure(&ds, "Chanel");
        assert_eq!(fig.data[0].x.len(), 1);
    }

    #[test]
    fn test_plot_votes_and_true_votes() {
        let ds = dataset(THREE_BRANDS);

        let fig = build_figure(&ds, "Dior");
        let trace = &fig.data[0];
        assert_eq!(trace.y, vec![100, 5]);
        assert_eq!(trace.customdata[0], ("http://x".to_string(), 100));
        assert_eq!(trace.customdata[1], (String::new(), 5));
    }

    #[test]
    fn test_zero_votes_floored_for_log_axis() {
        let ds = dataset("brand,name,rating,votes\nDior,A,4.5,0\n");

        let trace = &build_figure(&ds, "Dior").data[0];
        assert_eq!(trace.y, vec![1]);
        // True value preserved for display
        assert_eq!(trace.customdata[0].1, 0);
        assert!(trace.y.iter().all(|&v| v >= 1));
    }

    #[test]
    fn test_color_tracks_rating_and_size_tracks_votes() {
        let ds = dataset(THREE_BRANDS);

        let trace = &build_figure(&ds, "Dior").data[0];
        assert_eq!(trace.marker.color, vec![4.5, 3.0]);
        assert_eq!(trace.marker.size, vec![100, 5]);
        assert_eq!(trace.marker.sizemode, "area");
        // Largest point pinned at the max visual size
        assert!((trace.marker.sizeref - 2.0 * 100.0 / (48.0 * 48.0)).abs() < 1e-12);
    }

    #[test]
    fn test_axis_ranges() {
        let ds = dataset(THREE_BRANDS);

        let fig = build_figure(&ds, "Dior");
        let xaxis = fig.layout.xaxis.as_ref().unwrap();
        let [lo, hi] = xaxis.range.unwrap();
        assert!((lo - 2.9).abs() < 1e-9);
        assert!((hi - 4.6).abs() < 1e-9);

        let yaxis = fig.layout.yaxis.as_ref().unwrap();
        assert_eq!(yaxis.kind, Some("log"));
    }

    // ==========================================================================
    // EMPTY / PLACEHOLDER TESTS
    // ==========================================================================

    #[test]
    fn test_empty_dataset_placeholder() {
        let fig = build_figure(&Dataset::default(), "Dior");

        assert!(fig.data.is_empty());
        assert_eq!(fig.layout.title.as_ref().unwrap().text, "No data");
    }

    #[test]
    fn test_unknown_brand_placeholder() {
        let ds = dataset(THREE_BRANDS);

        let fig = build_figure(&ds, "Guerlain");
        assert!(fig.data.is_empty());
        assert_eq!(
            fig.layout.title.as_ref().unwrap().text,
            "Guerlain — Rating vs Votes"
        );
    }

    // ==========================================================================
    // HIGH-RATING BAND TESTS
    // ==========================================================================

    #[test]
    fn test_band_spans_to_upper_bound() {
        let ds = dataset(THREE_BRANDS);

        let fig = build_figure(&ds, "Dior");
        assert_eq!(fig.layout.shapes.len(), 1);
        let band = &fig.layout.shapes[0];
        assert_eq!(band.x0, 4.0);
        assert!((band.x1 - 4.6).abs() < 1e-9);
        assert_eq!(fig.layout.annotations.len(), 1);
    }

    #[test]
    fn test_band_skipped_when_all_ratings_low() {
        let ds = dataset("brand,name,rating,votes\nDior,A,3.0,10\nDior,B,2.5,4\n");

        let fig = build_figure(&ds, "Dior");
        assert!(fig.layout.shapes.is_empty());
        assert!(fig.layout.annotations.is_empty());
    }

    // ==========================================================================
    // SERIALIZATION TESTS
    // ==========================================================================
    //
    // The rendering boundary consumes this JSON verbatim, so the field names
    // and the absence of unset fields are part of the contract.
    // ==========================================================================

    #[test]
    fn test_spec_serializes_for_plotly() {
        let ds = dataset(THREE_BRANDS);

        let json = serde_json::to_value(build_figure(&ds, "Dior")).unwrap();
        assert!(json["data"].is_array());
        assert_eq!(json["data"][0]["type"], "scatter");
        assert_eq!(json["data"][0]["mode"], "markers");
        assert_eq!(json["data"][0]["customdata"][0][0], "http://x");
        assert_eq!(json["data"][0]["customdata"][0][1], 100);
        assert_eq!(json["layout"]["yaxis"]["type"], "log");
        assert_eq!(json["layout"]["clickmode"], "event");
    }

    #[test]
    fn test_unset_fields_are_skipped() {
        let json = serde_json::to_value(build_figure(&Dataset::default(), "Dior")).unwrap();

        let layout = json["layout"].as_object().unwrap();
        assert!(!layout.contains_key("xaxis"));
        assert!(!layout.contains_key("shapes"));
        // xaxis on a real figure has no "type" key (linear is the default)
        let ds = dataset(THREE_BRANDS);
        let json = serde_json::to_value(build_figure(&ds, "Dior")).unwrap();
        assert!(!json["layout"]["xaxis"].as_object().unwrap().contains_key("type"));
    }
}
