use std::process::exit;

use clap::{Parser, Subcommand};

use viaja_core::address::{AddressCandidate, SourceKind};
use viaja_core::config::AppConfig;
use viaja_core::dispatch::{DispatchConfig, DispatchSimulator};
use viaja_core::format::{format_fare_brl, format_route_summary, format_time};
use viaja_core::geo::LatLng;
use viaja_core::pricing::VehicleClass;
use viaja_core::routing::{GreatCircleRouter, Router};
use viaja_core::trip::TripSession;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "viaja",
    about = "Trip planning for the Via Já ride-hailing client",
    long_about = "Fare estimation, travel-time formatting, and a full planning\n\
                  session (route, vehicle selection, simulated dispatch) from\n\
                  the command line."
)]
struct Cli {
    /// Optional JSON config overriding the shipped defaults
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate fares for a trip distance
    Fare {
        /// Trip distance in kilometres
        #[arg(long)]
        distance_km: f64,
        /// Vehicle class (defaults to the whole table)
        #[arg(long)]
        vehicle: Option<String>,
    },
    /// Format a duration the way the client displays it
    Time {
        /// Duration in seconds
        #[arg(long)]
        seconds: u64,
    },
    /// Run a full planning session between two coordinates
    Plan {
        /// Origin as "lat,lng"
        #[arg(long)]
        from: String,
        /// Destination as "lat,lng"
        #[arg(long)]
        to: String,
        /// Intermediate stop as "lat,lng" (repeatable)
        #[arg(long)]
        stop: Vec<String>,
        /// Vehicle class to select
        #[arg(long, default_value = "Carro")]
        vehicle: String,
        /// Seed for the dispatch simulator
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// OSRM endpoint to route against instead of the great-circle
        /// fallback (requires the `osrm` feature)
        #[arg(long)]
        osrm: Option<String>,
    },
    /// Search for addresses via OpenCage
    #[cfg(feature = "opencage")]
    Search {
        /// Search text
        #[arg(long)]
        query: String,
        /// Proximity hint as "lat,lng"
        #[arg(long)]
        near: Option<String>,
        /// OpenCage API key
        #[arg(long, env = "OPENCAGE_API_KEY")]
        api_key: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match AppConfig::from_path(std::path::Path::new(path)) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load config {path}: {err}");
                exit(1);
            }
        },
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Fare {
            distance_km,
            vehicle,
        } => run_fare(&config, distance_km, vehicle.as_deref()),
        Commands::Time { seconds } => println!("{}", format_time(seconds)),
        Commands::Plan {
            from,
            to,
            stop,
            vehicle,
            seed,
            osrm,
        } => {
            let router = build_router(osrm);
            run_plan(&config, router.as_ref(), &from, &to, &stop, &vehicle, seed);
        }
        #[cfg(feature = "opencage")]
        Commands::Search {
            query,
            near,
            api_key,
        } => run_search(&query, near.as_deref(), &api_key),
    }
}

#[cfg(feature = "osrm")]
fn build_router(osrm: Option<String>) -> Box<dyn Router> {
    match osrm {
        Some(endpoint) => Box::new(viaja_core::routing::osrm::OsrmRouter::new(&endpoint)),
        None => Box::new(GreatCircleRouter::default()),
    }
}

#[cfg(not(feature = "osrm"))]
fn build_router(osrm: Option<String>) -> Box<dyn Router> {
    if osrm.is_some() {
        eprintln!("--osrm requires building with the `osrm` feature");
        exit(1);
    }
    Box::new(GreatCircleRouter::default())
}

// ── Subcommands ────────────────────────────────────────────────────

fn run_fare(config: &AppConfig, distance_km: f64, vehicle: Option<&str>) {
    if distance_km < 0.0 {
        eprintln!("distance must be non-negative");
        exit(1);
    }
    let classes: Vec<VehicleClass> = match vehicle {
        Some(name) => vec![parse_vehicle(name)],
        None => VehicleClass::ALL.to_vec(),
    };
    for class in classes {
        let fare = config.rates.estimate_fare(distance_km, class);
        println!("{:10} {}", class.label(), format_fare_brl(fare));
    }
}

fn run_plan(
    config: &AppConfig,
    router: &dyn Router,
    from: &str,
    to: &str,
    stops: &[String],
    vehicle: &str,
    seed: u64,
) {
    let vehicle = parse_vehicle(vehicle);

    let mut session = TripSession::new();
    session.set_origin(waypoint("Origem", parse_latlng(from)));
    for (n, stop) in stops.iter().enumerate() {
        session.add_stop(waypoint(&format!("Parada {}", n + 1), parse_latlng(stop)));
    }
    // The final destination goes after any intermediate stops.
    session.add_stop(waypoint("Destino", parse_latlng(to)));

    let Some(summary) = router.route_via(&session.waypoints()) else {
        eprintln!("no route found");
        exit(1);
    };
    session.apply_route(&summary);
    println!(
        "{}",
        format_route_summary(session.distance_km(), session.time_seconds())
    );

    for class in VehicleClass::ALL {
        let fare = config.rates.estimate_fare(session.distance_km(), class);
        println!("  {:10} {}", class.label(), format_fare_brl(fare));
    }

    session.select_vehicle(vehicle, &config.rates);
    println!(
        "Selecionado: {} — {}",
        vehicle.label(),
        format_fare_brl(session.fare())
    );

    let record = match session.confirm("cli") {
        Some(record) => record,
        None => {
            eprintln!("trip could not be confirmed");
            exit(1);
        }
    };

    let mut dispatch = DispatchSimulator::new(DispatchConfig {
        seed,
        ..config.dispatch
    });
    match dispatch.find_driver(record.origin.position, vehicle) {
        Some(offer) => println!(
            "Motorista encontrado: {} (chega em {})",
            offer.driver_name,
            format_time(offer.eta_seconds)
        ),
        None => println!("Procurando {} disponível...", vehicle.label()),
    }
}

#[cfg(feature = "opencage")]
fn run_search(query: &str, near: Option<&str>, api_key: &str) {
    use viaja_core::geocode::{opencage::OpenCageGeocoder, Geocoder};

    let geocoder = OpenCageGeocoder::new(api_key);
    let proximity = near.map(parse_latlng);
    match geocoder.search(query, proximity) {
        Ok(results) if results.is_empty() => println!("nenhum resultado"),
        Ok(results) => {
            for place in results {
                println!(
                    "{}  ({:.5}, {:.5})",
                    place.display_name, place.position.lat, place.position.lng
                );
            }
        }
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    }
}

// ── Argument parsing helpers ───────────────────────────────────────

fn parse_latlng(raw: &str) -> LatLng {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    let parsed = match parts.as_slice() {
        [lat, lng] => match (lat.parse::<f64>(), lng.parse::<f64>()) {
            (Ok(lat), Ok(lng)) => Some(LatLng::new(lat, lng)),
            _ => None,
        },
        _ => None,
    };
    match parsed {
        Some(point) => point,
        None => {
            eprintln!("expected \"lat,lng\", got \"{raw}\"");
            exit(1);
        }
    }
}

fn parse_vehicle(raw: &str) -> VehicleClass {
    match VehicleClass::parse(raw) {
        Some(class) => class,
        None => {
            eprintln!(
                "unknown vehicle class \"{raw}\" (expected one of: Moto, Carro, Lotação, Entrega)"
            );
            exit(1);
        }
    }
}

/// A bare-coordinate candidate for CLI-supplied waypoints.
fn waypoint(label: &str, position: LatLng) -> AddressCandidate {
    AddressCandidate {
        display_name: label.to_string(),
        poi_name: None,
        road: Some(label.to_string()),
        house_number: None,
        suburb: None,
        city: None,
        state: None,
        postcode: None,
        position,
        source: SourceKind::Remote,
    }
}
