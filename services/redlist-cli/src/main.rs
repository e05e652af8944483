//! Command-line interface for Red List basemap tooling.
//!
//! - `redlist render SG` resolves the boundary for Singapore, optionally
//!   fetches a remote raster basemap, and writes `sg.png`.
//! - `redlist test-auth` reports compute-service authentication status.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use basemap_common::{Color, RenderOptions};
use boundary::{ContextData, FsBoundaryStore};
use clap::{Args as ClapArgs, Parser, Subcommand};
use raster::{
    ComputeSession, FetchOptions, FetchOutcome, HttpComputeService, ImageHandle, RasterFetcher,
    RequestMode,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "redlist", version)]
#[command(about = "Country basemaps and Red List spatial tooling")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Test compute-service authentication status.
    TestAuth,
    /// Render a region basemap PNG.
    Render(RenderArgs),
}

#[derive(ClapArgs, Debug)]
struct RenderArgs {
    /// ISO 3166-1 alpha-2 region code, e.g. SG
    code: String,

    /// Output PNG path (default: <code>.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory holding <code>.wkb boundary files
    #[arg(long, env = "BOUNDARY_DIR", default_value = "data/boundaries")]
    boundary_dir: PathBuf,

    /// YAML file with full render options; flags below override it
    #[arg(long)]
    options: Option<PathBuf>,

    /// Remote raster handle for the basemap layer
    #[arg(long)]
    image: Option<String>,

    /// Clip the fetched raster to the region boundary
    #[arg(long)]
    clip: bool,

    /// Suppress gridlines (and the frame spines with them)
    #[arg(long)]
    no_grid: bool,

    /// Suppress the region outline
    #[arg(long)]
    no_border: bool,

    /// Suppress surrounding land/ocean/border context
    #[arg(long)]
    no_context: bool,

    /// Map title
    #[arg(long)]
    title: Option<String>,

    /// Region fill color (hex or named)
    #[arg(long)]
    fill_color: Option<String>,

    /// Region edge color (hex or named)
    #[arg(long)]
    edge_color: Option<String>,

    /// Output resolution (default 300)
    #[arg(long)]
    dpi: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        None => {
            println!("Hello from redlist!");
            println!();
            println!("Use --help to see available commands");
        }
        Some(Command::TestAuth) => test_auth().await?,
        Some(Command::Render(args)) => render(args).await?,
    }

    Ok(())
}

/// Print compute-service authentication status.
///
/// The status is advisory: the process exits 0 whether or not
/// authentication succeeds, so scripted callers must parse the output.
async fn test_auth() -> Result<()> {
    println!("Testing compute service authentication...");
    let session = ComputeSession::from_env().context("failed to build compute session")?;
    let status = session.check_authentication().await;

    if status.authenticated {
        println!("✓ Compute service authentication: SUCCESS");
        println!("  Message: {}", status.message);
        if let Some(project) = &status.project {
            println!("  Project: {project}");
        }
    } else {
        println!("✗ Compute service authentication: FAILED");
        println!("  Message: {}", status.message);
        println!();
        println!("Set COMPUTE_TOKEN (and optionally COMPUTE_PROJECT) to authenticate.");
    }
    Ok(())
}

async fn render(args: RenderArgs) -> Result<()> {
    let options = build_options(&args)?;

    let store = FsBoundaryStore::new(&args.boundary_dir);
    let resolved = boundary::resolve(&store, &args.code).await?;
    info!(code = %resolved.code, zone = %resolved.zone, "boundary resolved");

    let context = if options.show_surrounding_context {
        store.context().await
    } else {
        ContextData::default()
    };

    let outcome = match &options.image {
        Some(image) => {
            let session = ComputeSession::from_env().context("failed to build compute session")?;
            let fetcher = RasterFetcher::new(Arc::new(HttpComputeService::new(session)));
            let fetch_options = FetchOptions {
                dpi: options.dpi,
                // Clipped requests use the best-effort visualized path; a
                // plain basemap request asks for the exact grid.
                mode: if options.clip_to_boundary {
                    RequestMode::BestEffort
                } else {
                    RequestMode::Exact
                },
                vis_params: options.vis_params.clone(),
                clip_to: options
                    .clip_to_boundary
                    .then(|| resolved.geographic.clone()),
            };
            fetcher
                .fetch(
                    &ImageHandle::new(image.clone()),
                    &resolved.extent,
                    resolved.zone,
                    &fetch_options,
                )
                .await
        }
        None => FetchOutcome::not_requested(),
    };

    let path = renderer::render(&options, &resolved, &outcome, &context)?;
    println!("Map saved to: {}", path.display());
    Ok(())
}

/// Merge the YAML options file (if any) with command-line overrides.
fn build_options(args: &RenderArgs) -> Result<RenderOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read options file {}", path.display()))?;
            serde_yaml::from_str(&text)
                .with_context(|| format!("invalid options file {}", path.display()))?
        }
        None => RenderOptions::default(),
    };

    if let Some(output) = &args.output {
        options.output_path = Some(output.clone());
    }
    if let Some(image) = &args.image {
        options.image = Some(image.clone());
    }
    if args.clip {
        options.clip_to_boundary = true;
    }
    if args.no_grid {
        options.show_grid = false;
    }
    if args.no_border {
        options.show_border = false;
    }
    if args.no_context {
        options.show_surrounding_context = false;
    }
    if let Some(title) = &args.title {
        options.title = Some(title.clone());
    }
    if let Some(fill) = &args.fill_color {
        options.fill_color = Color::parse(fill).context("invalid --fill-color")?;
    }
    if let Some(edge) = &args.edge_color {
        options.edge_color = Color::parse(edge).context("invalid --edge-color")?;
    }
    if let Some(dpi) = args.dpi {
        options.dpi = dpi;
    }

    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "redlist",
            "render",
            "SG",
            "--no-grid",
            "--fill-color",
            "#ff6b6b",
            "--dpi",
            "150",
        ])
        .unwrap();
        let Some(Command::Render(args)) = cli.command else {
            panic!("expected render subcommand");
        };
        let options = build_options(&args).unwrap();
        assert!(!options.show_grid);
        assert!(options.show_border);
        assert_eq!(options.fill_color, Color::rgb(255, 107, 107));
        assert_eq!(options.dpi, 150);
    }
}
