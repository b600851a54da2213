//! HTTP server for the interactive dashboard
//!
//! `scentscope serve data.csv` → starts server, opens browser, serves the
//! explorer UI. The server is stateless beyond the dataset cache: every
//! request recomputes load → brands → selection → figure from scratch.

use crate::dataset::{BrandSummary, Dataset, LoadError};
use crate::figure::{build_figure, spec::FigureSpec};
use crate::selector::{self, Bucket};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use tiny_http::{Header, Method, Request, Response, Server};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    fn failure(error: impl Into<String>) -> Self {
        Self { ok: false, data: None, error: Some(error.into()) }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BrandsParams {
    #[serde(default)]
    pub path: String,
    /// Bucket filter in its display form (`A`..`Z`, `0-9`, `#`).
    #[serde(default)]
    pub bucket: Option<String>,
    /// Brand to keep selected if it survives narrowing.
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FigureParams {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub brand: String,
}

#[derive(Serialize, Debug)]
pub struct BrandsResponse {
    pub generated: String,
    /// Distinct brands before narrowing. Zero means "nothing to show".
    pub total: usize,
    pub buckets: Vec<String>,
    pub visible: Vec<String>,
    pub selected: Option<String>,
    pub fell_back: bool,
}

#[derive(Serialize)]
pub struct FigureResponse {
    pub generated: String,
    pub brand: String,
    pub summary: BrandSummary,
    pub figure: FigureSpec,
}

/// Start server, open browser, serve UI
pub fn start(port: u16, path: PathBuf) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);
    let path_str = path.canonicalize().unwrap_or(path.clone()).display().to_string();

    eprintln!("\n\x1b[1;32m🧴 Scentscope\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Dataset: {}\n", path_str);

    // Open browser
    let _ = open::that(&url);

    // Handle requests
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &path_str) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn handle_request(mut request: Request, default_path: &str) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let method = request.method().clone();

    match (&method, path) {
        // Serve embedded UI
        (&Method::Get, "/") => {
            // Inject the default dataset path into the HTML
            let html = UI_HTML.replace("{{DEFAULT_PATH}}", default_path);
            let response = Response::from_string(html)
                .with_header(Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..]).unwrap());
            request.respond(response)
        }

        // API: brand index + selection resolution
        (&Method::Get, "/api/brands") | (&Method::Post, "/api/brands") => {
            let mut params: BrandsParams = parse_params(&mut request).unwrap_or_default();
            if params.path.is_empty() {
                params.path = default_path.to_string();
            }
            eprintln!("→ brands bucket={}", params.bucket.as_deref().unwrap_or("All"));

            let payload = match brands_report(&params) {
                Ok(report) => ApiResponse::success(report),
                Err(e) => ApiResponse::failure(e.to_string()),
            };
            respond_json(request, &payload)
        }

        // API: figure spec for one brand
        (&Method::Get, "/api/figure") | (&Method::Post, "/api/figure") => {
            let mut params: FigureParams = parse_params(&mut request).unwrap_or_default();
            if params.path.is_empty() {
                params.path = default_path.to_string();
            }
            eprintln!("→ figure {}", params.brand);

            let payload = match figure_report(&params) {
                Ok(report) => ApiResponse::success(report),
                Err(e) => ApiResponse::failure(e.to_string()),
            };
            respond_json(request, &payload)
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

/// Params come from the query string or a JSON body, in that order.
fn parse_params<T: serde::de::DeserializeOwned>(request: &mut Request) -> Option<T> {
    let url = request.url().to_string();

    // Try query string
    if let Some(query) = url.split('?').nth(1) {
        if let Ok(params) = serde_urlencoded::from_str::<T>(query) {
            return Some(params);
        }
    }

    // Try JSON body
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body).ok()?;
    if !body.is_empty() {
        if let Ok(params) = serde_json::from_str::<T>(&body) {
            return Some(params);
        }
    }

    None
}

fn respond_json<T: Serialize>(request: Request, payload: &ApiResponse<T>) -> std::io::Result<()> {
    let json = serde_json::to_string(payload)?;
    let response = Response::from_string(json).with_header(
        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
    );
    request.respond(response)
}

fn brands_report(params: &BrandsParams) -> Result<BrandsResponse, LoadError> {
    let dataset = Dataset::load(&params.path)?;
    let options = dataset.brands();

    let bucket = params.bucket.as_deref().and_then(Bucket::parse);
    let buckets = selector::buckets_present(&options)
        .iter()
        .map(|b| b.to_string())
        .collect();

    let (visible, selected, fell_back) =
        match selector::select_brand(&options, params.default.as_deref(), bucket) {
            Some(sel) => (sel.visible, Some(sel.chosen), sel.fell_back),
            None => (Vec::new(), None, false),
        };

    Ok(BrandsResponse {
        generated: chrono::Local::now().to_rfc3339(),
        total: options.len(),
        buckets,
        visible,
        selected,
        fell_back,
    })
}

fn figure_report(params: &FigureParams) -> Result<FigureResponse, LoadError> {
    let dataset = Dataset::load(&params.path)?;

    Ok(FigureResponse {
        generated: chrono::Local::now().to_rfc3339(),
        brand: params.brand.clone(),
        summary: BrandSummary::for_brand(&dataset, &params.brand),
        figure: build_figure(&dataset, &params.brand),
    })
}
