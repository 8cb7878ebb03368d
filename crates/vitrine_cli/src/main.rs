//! Vitrine CLI
//!
//! Inspect the site configuration, the project catalog and routing, and run
//! the home page headlessly to check its animation lifecycle.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vitrine_site::catalog::{Catalog, CatalogView, Filter};
use vitrine_site::routes::Route;
use vitrine_site::SiteConfig;

mod simulate;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Vitrine site tooling", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Site configuration file
    #[arg(short, long, global = true, default_value = "vitrine.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config {
        /// Only validate, print nothing on success
        #[arg(long)]
        check: bool,
    },

    /// List the projects a filter selection shows
    Catalog {
        /// Filter (all, exhibitions, designs)
        #[arg(short, long, default_value = "all")]
        filter: String,

        /// Show every project instead of the collapsed preview
        #[arg(short, long)]
        expanded: bool,

        /// Catalog file (defaults to the built-in catalog)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a URL path to a view
    Route {
        /// Path such as /exhibitions/aero
        path: String,
    },

    /// Mount the home page headlessly and drive it through an idle cycle
    Simulate {
        /// Viewport width in pixels
        #[arg(long, default_value = "1440")]
        width: f32,

        /// Viewport height in pixels
        #[arg(long, default_value = "900")]
        height: f32,

        /// Simulate a touch-primary device
        #[arg(long)]
        touch: bool,

        /// Frame length in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: f64,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Config { check } => cmd_config(&cli.config, check),

        Commands::Catalog {
            filter,
            expanded,
            file,
            json,
        } => cmd_catalog(&filter, expanded, file.as_deref(), json),

        Commands::Route { path } => cmd_route(&path),

        Commands::Simulate {
            width,
            height,
            touch,
            frame_ms,
            json,
        } => {
            let config = load_config(&cli.config)?;
            let options = simulate::Options {
                width,
                height,
                touch,
                frame_ms,
            };
            let report = simulate::run(config, options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
            if !report.clean_teardown {
                anyhow::bail!("resources left behind after unmount: {}", report.leftover);
            }
            Ok(())
        }
    }
}

fn load_config(path: &Path) -> Result<SiteConfig> {
    SiteConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

fn load_catalog(file: Option<&Path>) -> Result<Catalog> {
    match file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Catalog::from_toml_str(&content)
                .with_context(|| format!("Failed to parse catalog {}", path.display()))
        }
        None => Catalog::builtin().context("Built-in catalog is invalid"),
    }
}

fn cmd_config(path: &Path, check: bool) -> Result<()> {
    let config = load_config(path)?;
    if check {
        info!("{} is valid", path.display());
        return Ok(());
    }
    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{rendered}");
    Ok(())
}

fn cmd_catalog(filter: &str, expanded: bool, file: Option<&Path>, json: bool) -> Result<()> {
    let catalog = load_catalog(file)?;
    let filter: Filter = filter.parse()?;

    let mut view = CatalogView::new();
    view.set_filter(filter);
    view.set_expanded(expanded);
    let visible = view.visible(&catalog);
    debug!(total = catalog.len(), shown = visible.len(), "catalog view");

    if json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    println!("{} ({} of {})", filter.label(), visible.len(), catalog.len());
    for record in &visible {
        println!("  {:<12} {:<40} {}", record.category.label(), record.title, record.link());
    }
    if view.has_more(&catalog) {
        println!("  ... use --expanded to view all");
    }
    Ok(())
}

fn cmd_route(path: &str) -> Result<()> {
    let catalog = load_catalog(None)?;
    let route = Route::resolve(path, &catalog);

    match &route {
        Route::Home => println!("home"),
        Route::Exhibition(_) | Route::Design(_) => {
            if let Some(project) = route.project(&catalog) {
                println!("gallery: {} ({})", project.title, project.category.label());
                println!("images:  {}", project.folder);
            }
        }
        Route::NotFound { .. } => {
            println!("{}", route.not_found_title().unwrap_or("Not Found"));
        }
        Route::Unmatched(path) => {
            anyhow::bail!("no view matches '{path}'");
        }
    }
    if let Some(back) = route.back_link() {
        println!("back:    {back}");
    }
    Ok(())
}
