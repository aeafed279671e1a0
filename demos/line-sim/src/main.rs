mod sim;
mod topology;

use std::fs;
use std::time::Duration;

use anyhow::Context;
use dvroute::framework::{ProtocolParams, RoutingSystem};
use log::{info, LevelFilter};
use simplelog::*;

use crate::sim::{DemoSystem, Simulation};

/// a ring of four routers; the short side fails at t=30 and recovers at t=90.
/// Identical advertisements don't refresh a learned route, so routes lapse every TTL
/// period until the next periodic advertisement. The send at t=60 lands in such a gap
/// and is expected to be dropped.
const DEFAULT_TOPOLOGY: &str = "
link 1 a b 1
link 2 b c 1
link 3 c d 1
link 4 d a 4
host ha a 100 1
host hc c 100 1
send 20 a 100 hc
down 30 2
send 60 a 100 hc
up 90 2 b c 1
send 120 a 100 hc
run 150
";

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let paths: Vec<&String> = args.iter().filter(|a| !a.starts_with('-')).collect();

    CombinedLogger::init(vec![TermLogger::new(
        if verbose { LevelFilter::Debug } else { LevelFilter::Info },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )])?;

    let topology = match paths.first() {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("Failed to read topology {path}"))?;
            topology::parse(&text)?
        }
        None => topology::parse(DEFAULT_TOPOLOGY)?,
    };
    let params: ProtocolParams = match paths.get(1) {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {path}"))?;
            serde_json::from_str(&text).context("Invalid config")?
        }
        None => DemoSystem::config(),
    };
    info!("Running with {}", serde_json::to_string(&params)?);

    let run_for = topology.run_for.unwrap_or(Duration::from_secs(60));
    let mut sim = Simulation::new(topology, params)?;
    sim.run(run_for);

    for (name, router) in &sim.routers {
        println!("Routes at {name}:");
        for (dst, route) in router.table().iter() {
            println!(" - {dst}: port {}, latency {:?}, expiry {:?}", route.port, route.latency, route.expiry);
        }
    }
    println!("{} packets delivered", sim.delivered.len());
    Ok(())
}
