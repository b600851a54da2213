//! Declarative figure types for the rendering boundary
//!
//! These serialize to the `{ "data": [...], "layout": {...} }` JSON that
//! `Plotly.newPlot` consumes. Unset fields are skipped entirely so the
//! renderer applies its own defaults instead of seeing nulls.

use serde::Serialize;

/// The full scatter-plot specification handed to the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct FigureSpec {
    pub data: Vec<ScatterTrace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterTrace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    /// Ratings.
    pub x: Vec<f64>,
    /// Plot-safe votes, floored at 1 for the log axis.
    pub y: Vec<i64>,
    /// Perfume names for hover labels.
    pub hovertext: Vec<String>,
    pub hovertemplate: String,
    /// Opaque per-point payload: (url-or-empty, true votes).
    pub customdata: Vec<(String, i64)>,
    pub marker: Marker,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    /// True votes; visual size derives from these via area sizing.
    pub size: Vec<i64>,
    pub sizemode: &'static str,
    pub sizeref: f64,
    /// Ratings, mapped through the continuous color scale.
    pub color: Vec<f64>,
    pub colorscale: &'static str,
    pub showscale: bool,
    pub colorbar: ColorBar,
    pub line: MarkerLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorBar {
    pub title: Title,
    pub ticks: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkerLine {
    pub width: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<Margin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_bgcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_bgcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosize: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shapes: Vec<Shape>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xanchor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

impl Title {
    /// A bare title with no positioning, for colorbars and axes.
    pub fn plain(text: impl Into<String>) -> Title {
        Title { text: text.into(), x: None, xanchor: None, font: None }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Font {
    pub size: u32,
    pub family: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gridcolor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<&'static str>,
}

/// A region drawn behind the data, e.g. the high-rating band.
#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub fillcolor: &'static str,
    pub opacity: f64,
    pub line: ShapeLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShapeLine {
    pub width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub text: &'static str,
    pub x: f64,
    pub y: f64,
    pub xref: &'static str,
    pub yref: &'static str,
    pub xanchor: &'static str,
    pub yanchor: &'static str,
    pub showarrow: bool,
}
