// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Saigai Map Contributors

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

use saigai_core::config::{Settings, SettingsManager};
use saigai_core::feed::{load_facilities, load_layers};
use saigai_core::geo::Coordinate;
use saigai_core::layers::{self, parse_layer_date, Layer, Visibility};
use saigai_core::proximity::{nearest, nearest_within};
use saigai_core::region::{is_outside_region, ServiceRegion};
use saigai_core::route::RouteTypeSelector;
use saigai_core::session::{EvacuationPlan, MapSession};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Layer snapshot (JSON array of layer records)
    #[arg(short, long, env = "SAIGAI_LAYERS", global = true)]
    layers: Option<PathBuf>,

    /// Settings file (defaults to settings.json in the config directory)
    #[arg(short, long, env = "SAIGAI_SETTINGS", global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every date that has at least one layer
    Dates,
    /// List layers, optionally for one date and visibility
    Layers {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        visibility: Option<Visibility>,
    },
    /// Show the public source/category menu
    Tree,
    /// Show the layer the map opens with
    Active,
    /// Check whether a location is inside a service region
    CheckRegion {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// prefecture or metro; all regions when omitted
        #[arg(long)]
        region: Option<ServiceRegion>,
    },
    /// Rank facilities by distance from a location
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Facility snapshot (JSON array)
        #[arg(short, long)]
        facilities: PathBuf,
        #[arg(short = 'k', long)]
        limit: Option<usize>,
    },
    /// Build route requests to the nearest facilities
    Route {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        #[arg(short, long)]
        facilities: PathBuf,
        /// evacuation_point, shelter, hospital or water_supply
        #[arg(long)]
        point_type: Option<String>,
        /// drive, walk or cycle
        #[arg(long)]
        mode: Option<String>,
        /// prefecture or metro; when omitted, prefecture first, then metro
        #[arg(long)]
        region: Option<ServiceRegion>,
        #[arg(short = 'k', long)]
        limit: Option<usize>,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    // Fails only if a logger is already installed
    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let manager = match path {
        Some(p) => SettingsManager::with_path(p),
        None => SettingsManager::new(),
    };
    manager.load()
}

fn require_layers(path: Option<&Path>) -> Result<Vec<Layer>> {
    let path = path.ok_or_else(|| {
        anyhow!("No layer snapshot given. Please specify with --layers or SAIGAI_LAYERS.")
    })?;
    load_layers(path)
}

fn describe(layer: &Layer) -> String {
    format!(
        "{} [{}] {} ({} / {}) {}",
        layer.layer_date,
        match layer.visibility {
            Visibility::Public => "pub",
            Visibility::Private => "prv",
        },
        layer.layer,
        layer.source,
        layer.category,
        layer.asset_url()
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = load_settings(cli.config.as_deref())?;

    match &cli.command {
        Commands::Dates => {
            let snapshot = require_layers(cli.layers.as_deref())?;
            for date in layers::distinct_dates(&snapshot) {
                println!("{}", date);
            }
        }
        Commands::Layers { date, visibility } => {
            let snapshot = require_layers(cli.layers.as_deref())?;
            let mut selected: Vec<&Layer> = snapshot.iter().collect();
            if let Some(raw) = date {
                let date =
                    parse_layer_date(raw).ok_or_else(|| anyhow!("Invalid date '{}'", raw))?;
                selected = layers::filter_for_date(selected, date);
            }
            if let Some(visibility) = visibility {
                selected = layers::filter_by_visibility(selected, *visibility);
            }
            if selected.is_empty() {
                println!("No layers match.");
            }
            for layer in selected {
                println!("{}", describe(layer));
            }
        }
        Commands::Tree => {
            let session = MapSession::new(require_layers(cli.layers.as_deref())?);
            for (source, categories) in session.navigation() {
                println!("{}", source);
                for (category, group) in categories {
                    println!("  {} ({})", category, category.icon_key());
                    for layer in group {
                        println!("    {} {}", layer.layer_date, layer.layer);
                    }
                }
            }
        }
        Commands::Active => {
            let session = MapSession::new(require_layers(cli.layers.as_deref())?);
            match session.current_layer() {
                Some(layer) => println!("{}", describe(layer)),
                None => match session.current_date() {
                    Some(date) => println!("No public layer to show ({}).", date),
                    None => println!("No layers."),
                },
            }
        }
        Commands::CheckRegion { lat, lng, region } => {
            let point = Coordinate::new(*lat, *lng);
            match region {
                Some(region) => {
                    let outside = is_outside_region(&point, &region.bounds(&settings))?;
                    println!(
                        "{} region: {}",
                        region,
                        if outside { "outside" } else { "inside" }
                    );
                }
                None => match ServiceRegion::containing(&point, &settings)? {
                    Some(region) => println!("Inside {} region.", region),
                    None => println!("Location outside supported area."),
                },
            }
        }
        Commands::Nearest {
            lat,
            lng,
            facilities,
            limit,
        } => {
            let origin = Coordinate::new(*lat, *lng);
            let facilities = load_facilities(facilities)?;
            let limit = limit.unwrap_or(settings.default_limit);
            let ranked = match settings.search_radius_km {
                Some(radius) => nearest_within(&origin, &facilities, limit, radius)?,
                None => nearest(&origin, &facilities, limit)?,
            };
            if ranked.is_empty() {
                println!("No facilities found.");
            }
            for (i, r) in ranked.iter().enumerate() {
                println!("{:>2}. {:>7.2} km  {}", i + 1, r.distance_km, r.facility.name);
            }
        }
        Commands::Route {
            lat,
            lng,
            facilities,
            point_type,
            mode,
            region,
            limit,
        } => {
            let mut selector = RouteTypeSelector::new();
            selector.set_point_type(
                point_type
                    .as_deref()
                    .unwrap_or(settings.default_point_type.as_str()),
            )?;
            selector.set_mode(mode.as_deref().unwrap_or(settings.default_mode.as_str()))?;

            let snapshot = match cli.layers.as_deref() {
                Some(path) => load_layers(path)?,
                None => Vec::new(),
            };
            let session = MapSession::new(snapshot).with_selector(selector);
            let facilities = load_facilities(facilities)?;

            let origin = Coordinate::new(*lat, *lng);
            let limit = limit.unwrap_or(settings.default_limit);

            let plan = match region {
                Some(region) => session.plan_evacuation(
                    &origin,
                    &facilities,
                    &region.bounds(&settings),
                    limit,
                    settings.search_radius_km,
                )?,
                None => {
                    let (used, plan) = session.plan_evacuation_in_service_area(
                        &origin,
                        &facilities,
                        &settings,
                        limit,
                        settings.search_radius_km,
                    )?;
                    if let Some(used) = used {
                        log::debug!("Planned in {} region", used);
                    }
                    plan
                }
            };

            if let EvacuationPlan::OutsideRegion { .. } = plan {
                log::warn!("Location outside supported area; no routes requested");
            }
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_route_command() {
        let cli = Cli::try_parse_from([
            "saigai",
            "route",
            "--lat",
            "35.6",
            "--lng",
            "140.1",
            "-f",
            "facilities.json",
            "--mode",
            "drive",
            "--region",
            "metro",
        ])
        .unwrap();

        match cli.command {
            Commands::Route { mode, region, .. } => {
                assert_eq!(mode.as_deref(), Some("drive"));
                assert_eq!(region, Some(ServiceRegion::Metro));
            }
            _ => panic!("Wrong command"),
        }
    }

    #[test]
    fn test_route_region_defaults_to_service_area() {
        let cli = Cli::try_parse_from([
            "saigai",
            "route",
            "--lat",
            "35.6",
            "--lng",
            "140.1",
            "-f",
            "f.json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Route { region: None, .. }));
    }

    #[test]
    fn test_negative_coordinates_accepted() {
        let cli = Cli::try_parse_from([
            "saigai",
            "check-region",
            "--lat",
            "-33.9",
            "--lng",
            "-70.6",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::CheckRegion { region: None, .. }));
    }

    #[test]
    fn test_unknown_region_rejected() {
        let result = Cli::try_parse_from([
            "saigai",
            "check-region",
            "--lat",
            "35.6",
            "--lng",
            "140.1",
            "--region",
            "osaka",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_layers_visibility_filter() {
        let cli = Cli::try_parse_from([
            "saigai",
            "--layers",
            "l.json",
            "layers",
            "--visibility",
            "public",
        ])
        .unwrap();
        assert_eq!(cli.layers, Some(PathBuf::from("l.json")));
        assert!(matches!(
            cli.command,
            Commands::Layers {
                visibility: Some(Visibility::Public),
                ..
            }
        ));
    }
}
