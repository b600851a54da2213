use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scentscope::{selector, BrandSummary, Bucket, Dataset, HIGH_RATING};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "scentscope")]
#[command(author, version, about = "Explore perfume ratings and popularity by brand")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Dataset file to inspect (optional in GUI mode)
    path: Option<PathBuf>,

    /// Launch GUI file picker (auto-enabled when double-clicked)
    #[arg(long)]
    gui: bool,

    /// List each fragrance under its brand
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive dashboard
    Serve {
        /// Dataset file to explore
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "3001")]
        port: u16,
    },

    /// Print the brand index
    Brands {
        /// Dataset file to inspect
        path: PathBuf,

        /// Narrow to a first-letter bucket (A..Z, 0-9, #)
        #[arg(short, long)]
        bucket: Option<String>,
    },
}

fn main() {
    let args = Args::parse();

    // Handle subcommands first
    if let Some(cmd) = args.command {
        match cmd {
            Command::Serve { path, port } => {
                if let Err(e) = scentscope::serve::start(port, path) {
                    eprintln!("Server error: {}", e);
                    std::process::exit(1);
                }
                return;
            }
            Command::Brands { path, bucket } => {
                handle_brands(path, bucket);
                return;
            }
        }
    }

    // Determine if we should use GUI mode
    // With GUI feature: launch GUI if --gui flag OR no path provided
    // This makes double-click behavior "just work"
    #[cfg(feature = "gui")]
    let use_gui = args.gui || args.path.is_none();

    // Handle GUI mode
    #[cfg(feature = "gui")]
    let path = if use_gui {
        match pick_path_gui() {
            Some(p) => p,
            None => {
                // User cancelled - show message and exit
                eprintln!("No dataset file selected.");
                std::process::exit(0);
            }
        }
    } else {
        // Path was provided via CLI
        args.path.clone().unwrap()
    };

    #[cfg(not(feature = "gui"))]
    let path = if let Some(p) = args.path.clone() {
        p
    } else {
        eprintln!("Usage: scentscope <CSV>");
        eprintln!("Run 'scentscope --help' for more options.");
        eprintln!("Note: GUI mode not available in this build.");
        std::process::exit(1);
    };

    // Load with a spinner; the row count isn't known up front
    let pb = if !args.quiet {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(format!("Loading {}", path.display()));
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    } else {
        None
    };

    let dataset = match Dataset::load(&path) {
        Ok(dataset) => dataset,
        Err(e) => {
            if let Some(pb) = pb {
                pb.finish_and_clear();
            }
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if dataset.is_empty() {
        eprintln!("No usable data after cleaning.");
        if dataset.dropped() > 0 {
            eprintln!("({} row(s) rejected)", dataset.dropped());
        }
        return;
    }

    let brands = dataset.brands();

    if !args.quiet {
        eprintln!("\x1b[1mScentscope - Perfume Ratings Explorer\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!(
            "{} fragrance(s) across {} brand(s)\n",
            dataset.len(),
            brands.len()
        );

        for brand in &brands {
            let subset = dataset.for_brand(brand);
            let mean_rating =
                subset.iter().map(|r| r.rating).sum::<f64>() / subset.len() as f64;
            let total_votes: i64 = subset.iter().map(|r| r.votes).sum();
            let summary = BrandSummary::for_brand(&dataset, brand);

            let color = if mean_rating >= HIGH_RATING {
                "\x1b[32m" // Green
            } else if mean_rating >= 3.0 {
                "\x1b[33m" // Yellow
            } else {
                "\x1b[31m" // Red
            };
            let reset = "\x1b[0m";

            println!(
                "{}{:>5.2}{}  {:>5} item(s)  {:>9} votes  {:>5.1}% \u{2265}4.0  {}",
                color,
                mean_rating,
                reset,
                summary.total,
                total_votes,
                summary.pct_high * 100.0,
                brand
            );

            if args.verbose {
                for record in subset {
                    eprintln!(
                        "    {:<40}  {:.2}  {:>7} votes  {}",
                        truncate(&record.name, 40),
                        record.rating,
                        record.votes,
                        record.url.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    // Summary
    let high_rated = dataset
        .records()
        .iter()
        .filter(|r| r.rating >= HIGH_RATING)
        .count();

    if !args.quiet {
        eprintln!("\n{}", "─".repeat(70));
    }
    eprintln!("\x1b[1mSummary:\x1b[0m");
    eprintln!("  Rows kept:    {}", dataset.len());
    eprintln!("  Rows dropped: {}", dataset.dropped());
    eprintln!("  Brands:       {}", brands.len());
    eprintln!(
        "  Rating \u{2265}4.0:  {} ({:.1}%)",
        high_rated,
        high_rated as f64 / dataset.len() as f64 * 100.0
    );

    if !args.quiet {
        eprintln!("\n\x1b[90mRun 'scentscope serve {}' for the dashboard.\x1b[0m", path.display());
    }
}

#[cfg(feature = "gui")]
fn pick_path_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select perfume dataset")
        .add_filter("Delimited files", &["csv", "tsv", "tab"])
        .pick_file()
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}

fn handle_brands(path: PathBuf, bucket: Option<String>) {
    let dataset = match Dataset::load(&path) {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let options = dataset.brands();
    if options.is_empty() {
        println!("No brands found.");
        return;
    }

    let bucket = bucket.as_deref().and_then(Bucket::parse);
    match selector::select_brand(&options, None, bucket) {
        Some(sel) => {
            if sel.fell_back {
                eprintln!("No brands match the selected filter - showing all brands.");
            }
            for brand in &sel.visible {
                println!("{}", brand);
            }
        }
        None => println!("No brands found."),
    }
}
