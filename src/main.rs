//! Flipfield CLI - Run the ping-pong renderer from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::process;

use winit::event_loop::{ControlFlow, EventLoop};

use flipfield::{app::App, schema::SimulationConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage(&args[0]);
        return;
    }

    if args.iter().any(|a| a == "--example") {
        print_example_config();
        return;
    }

    // Load configuration, or fall back to the defaults
    let config: SimulationConfig = match args.get(1) {
        Some(path) => {
            let config_path = PathBuf::from(path);
            let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
                eprintln!("Error reading config file: {}", e);
                process::exit(1);
            });
            serde_json::from_str(&config_str).unwrap_or_else(|e| {
                eprintln!("Error parsing config: {}", e);
                process::exit(1);
            })
        }
        None => SimulationConfig::default(),
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        process::exit(1);
    }

    log::info!(
        "Starting Flipfield: {}x{} grid, {} sub-step(s), seed threshold {}",
        config.width,
        config.height,
        config.substeps,
        config.seed_threshold
    );

    let event_loop = EventLoop::new().unwrap_or_else(|e| {
        eprintln!("Error creating event loop: {}", e);
        process::exit(1);
    });
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {}", e);
        process::exit(1);
    }

    if let Some((stage, message)) = app.fatal_error() {
        eprintln!("Fatal {} error: {}", stage, message);
        process::exit(1);
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} [config.json]", program);
    eprintln!();
    eprintln!("Run the Flipfield ping-pong renderer.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  config.json  Optional path to a renderer configuration file");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --example    Print an example configuration and exit");
    eprintln!();
    eprintln!("Press Escape or close the window to quit.");
}

fn print_example_config() {
    let config = SimulationConfig::default();

    println!("Example configuration (config.json):");
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
