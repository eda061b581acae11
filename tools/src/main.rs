//! sim-runner: headless Monte Carlo runner for the capsule machine.
//!
//! Usage:
//!   sim-runner --seed 12345 --lifetimes 10000
//!   sim-runner --config machine.json --test-item "Gilded Lion"
//!   sim-runner --json > summary.json

mod report;

use anyhow::Result;
use gachapon_core::{config::SimConfig, engine::SimEngine};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let json_output = args.iter().any(|a| a == "--json");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());
    let test_item = args
        .windows(2)
        .find(|w| w[0] == "--test-item")
        .map(|w| w[1].to_string());

    let mut config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::sample_machine(),
    };
    // CLI overrides the configured run count when given.
    config.lifetimes = parse_arg(&args, "--lifetimes", config.lifetimes);

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());

    if !json_output {
        println!("gachapon — sim-runner");
        println!("  run_id:    {run_id}");
        println!("  seed:      {seed}");
        println!("  lifetimes: {}", config.lifetimes);
        println!("  items:     {}", config.items.len());
        println!("  capsules:  {}", config.total_capsules());
        println!();
    }

    let engine = SimEngine::new(run_id, config, seed)?;
    let summary = engine.run()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        report::print_report(&engine, &summary, test_item.as_deref());
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
