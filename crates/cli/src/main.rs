//! solgen CLI — generate Solidity interfaces from embedded directives.
//!
//! Calls `solgen-core` directly; all progress reporting lives here, not in
//! the core.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use solgen_core::{load_solgen_config, scan};

/// solgen — derive interface files from implementation contracts.
#[derive(Parser)]
#[command(name = "solgen", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate interfaces for the given files, or for every eligible file
    Gen {
        /// Source files (relative to the project root). Empty = discover.
        paths: Vec<PathBuf>,

        /// Project root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Regenerate even when the output is newer than the source
        #[arg(long)]
        force: bool,
    },
    /// List files eligible for generation
    List {
        /// Project root (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

fn resolve_root(root: Option<PathBuf>) -> PathBuf {
    root.unwrap_or_else(|| std::env::current_dir().expect("Could not determine current directory"))
        .canonicalize()
        .expect("Path not found")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("solgen=warn".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Gen { paths, root, force } => {
            let root = resolve_root(root);
            let config = load_solgen_config(&root);

            let files: Vec<PathBuf> = if paths.is_empty() {
                scan::discover(&config)
            } else {
                paths
                    .into_iter()
                    .map(|p| if p.is_absolute() { p } else { root.join(p) })
                    .collect()
            };

            if files.is_empty() {
                eprintln!("No eligible source files under {}", root.display());
                std::process::exit(1);
            }

            let summary = scan::run_batch(&files, &config, force);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary).unwrap());
            } else {
                println!(
                    "{} generated, {} up to date, {} failed",
                    summary.generated, summary.skipped, summary.failed
                );
            }

            if summary.failed > 0 {
                std::process::exit(1);
            }
        }
        Commands::List { root } => {
            let root = resolve_root(root);
            let config = load_solgen_config(&root);
            let files = scan::discover(&config);

            if cli.json {
                let items: Vec<serde_json::Value> = files
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "path": p.strip_prefix(&root).unwrap_or(p).display().to_string(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items).unwrap());
            } else {
                if files.is_empty() {
                    eprintln!("No eligible source files under {}", root.display());
                    std::process::exit(1);
                }
                for file in &files {
                    println!("{}", file.strip_prefix(&root).unwrap_or(file).display());
                }
                eprintln!("\n{} eligible files", files.len());
            }
        }
    }
}
