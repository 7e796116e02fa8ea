//! Urban Map - geospatial dashboard with togglable thematic layers
//!
//! CLI commands:
//! - gui: Launch the native dashboard
//! - list: List the layers and their styles
//! - generate: Sample a layer dataset as JSON
//! - simulate: Reconcile a selection against a headless canvas

mod backend;
mod config;
mod error;
mod geo;
mod gui;
mod layers;
mod logging;
mod memory;
mod panels;
mod reconcile;
mod sampler;
mod session;
mod style;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DashboardConfig, Settings};
use crate::layers::{ActiveSelection, LayerId};

#[derive(Parser)]
#[command(name = "urban_map")]
#[command(about = "Urban diagnostics map with air quality, heat, vegetation and population layers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to dashboard.yaml (defaults to URBAN_MAP_CONFIG or ./dashboard.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the native dashboard
    Gui {
        /// Comma separated layers to show at start
        #[arg(short, long)]
        layers: Option<String>,
    },

    /// List layers and their styles
    List,

    /// Sample one heat layer and write it as JSON
    Generate {
        /// Layer id (poluicao, calor, pop)
        #[arg(short, long)]
        layer: String,

        /// Output file, stdout if omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Mount a headless canvas and reconcile a selection
    Simulate {
        /// Comma separated layers to select
        #[arg(short, long, default_value = "")]
        select: String,
    },
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::load();
    if let Err(e) = logging::init_logging(&settings.log_dir) {
        eprintln!("Logging disabled: {}", e);
    }
    tracing::info!("Urban Map starting up");

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or(settings.config_path);
    let config = DashboardConfig::load_or_default(&config_path)?;

    match cli.command {
        Commands::Gui { layers } => {
            let selection = match layers {
                Some(list) => ActiveSelection::parse_list(&list),
                None => config.initial_layers.iter().map(String::as_str).collect(),
            };
            tracing::info!("Launching dashboard");
            gui::run_viewer(config, selection)?;
        }

        Commands::List => list_layers(&config),

        Commands::Generate { layer, output } => {
            generate_layer(&config, &layer, output.as_ref())?;
        }

        Commands::Simulate { select } => {
            simulate(config, &ActiveSelection::parse_list(&select))?;
        }
    }

    Ok(())
}

/// Print layers with their style summaries
fn list_layers(config: &DashboardConfig) {
    println!("Layers ({}):", LayerId::ALL.len());
    println!();

    for id in LayerId::ALL {
        println!("## {} [{}]", id.title(), id);
        match config.layers.get(id) {
            Some(layer) => {
                let stops: Vec<String> = layer
                    .style
                    .gradient
                    .stops()
                    .iter()
                    .map(|s| format!("{}={}", s.stop, s.color.to_hex()))
                    .collect();
                println!(
                    "  heat: {} points within {} m of ({}, {})",
                    layer.count, layer.radius_m, layer.center.lat, layer.center.lon
                );
                println!(
                    "  radius {} blur {} gradient [{}]",
                    layer.style.radius,
                    layer.style.blur,
                    stops.join(", ")
                );
            }
            None => {
                let sw = config.green.bounds.south_west();
                let ne = config.green.bounds.north_east();
                println!(
                    "  static rectangle ({}, {}) .. ({}, {})",
                    sw.lat, sw.lon, ne.lat, ne.lon
                );
                println!(
                    "  fill {} opacity {} border {}",
                    config.green.style.color.to_hex(),
                    config.green.style.fill_opacity,
                    config.green.style.weight
                );
            }
        }
    }

    let panels = &config.panels;
    println!();
    println!("Region: {}", panels.region);
    for card in &panels.stats {
        println!("  {:<20} {:>10}  [{}]", card.label, card.value, card.layer);
    }
    println!("Critical areas:");
    for area in panels.areas_by_priority() {
        println!("  - {} ({}): {}", area.name, area.priority.label(), area.summary);
    }
}

/// Sample a heat layer and dump it as JSON
fn generate_layer(config: &DashboardConfig, layer: &str, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let id: LayerId = layer.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let layer_cfg = config
        .layers
        .get(id)
        .ok_or_else(|| anyhow::anyhow!("Layer '{}' is a static area and has no samples", id))?;

    let dataset = sampler::generate(layer_cfg.center, layer_cfg.radius_m, layer_cfg.count)?;
    let data = serde_json::json!({
        "layer": id,
        "title": id.title(),
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "center": dataset.center,
        "radius_m": dataset.radius_m,
        "count": dataset.count,
        "mean_weight": dataset.mean_weight(),
        "points": dataset.points,
    });

    match output {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(&data)?)?;
            println!("  {} -> {:?} ({} points)", id, path, dataset.len());
        }
        None => println!("{}", serde_json::to_string_pretty(&data)?),
    }
    Ok(())
}

/// Run mount + reconcile against the in-memory backend and report
fn simulate(config: DashboardConfig, selection: &ActiveSelection) -> anyhow::Result<()> {
    let mut session = session::MapSession::new(memory::MemoryBackend::new(), config);
    let outcome = session.mount(Some(&memory::Surface::attached("cli")))?;
    tracing::debug!("Mount outcome: {:?}", outcome);
    if let Some(canvas) = session.canvas() {
        println!(
            "Canvas #{} on '{}' at ({}, {}) zoom {}, {} tile layer(s)",
            canvas.serial,
            canvas.surface,
            canvas.view.center.lat,
            canvas.view.center.lon,
            canvas.view.zoom,
            canvas.tiles.len()
        );
    }

    if selection.is_empty() {
        println!("  No layers selected, every overlay stays hidden");
    }
    for unknown in selection.unknown() {
        println!("  [SKIP] unknown layer '{}'", unknown);
    }

    let report = session.apply_selection(selection);
    for id in LayerId::ALL {
        let state = if session.is_attached(id) { "ON " } else { "OFF" };
        let kind = session
            .registry()
            .and_then(|r| r.get(id))
            .and_then(|o| session.backend().overlay(o))
            .map(describe_overlay)
            .unwrap_or_default();
        println!("  [{}] {} ({}) {}", state, id, id.title(), kind);
    }

    let backend = session.backend();
    let stats = backend.stats();
    println!();
    println!(
        "{} attached, {} detached ({} attach / {} detach calls)",
        report.attached.len(),
        report.detached.len(),
        stats.attaches,
        stats.detaches
    );
    println!(
        "{} live canvas, {} overlays on it",
        backend.live_canvases(),
        session.canvas().map(|c| c.attached_count()).unwrap_or(0)
    );

    session.unmount();
    tracing::debug!("Simulation done, mounted: {}", session.is_mounted());
    Ok(())
}

fn describe_overlay(kind: &memory::OverlayKind) -> String {
    match kind {
        memory::OverlayKind::Heat { samples, style } => {
            format!("heat, {} samples, radius {} blur {}", samples, style.radius, style.blur)
        }
        memory::OverlayKind::Rectangle { bounds, style } => {
            let sw = bounds.south_west();
            let ne = bounds.north_east();
            format!(
                "rectangle ({}, {}) .. ({}, {}) fill {}",
                sw.lat,
                sw.lon,
                ne.lat,
                ne.lon,
                style.color.to_hex()
            )
        }
    }
}
