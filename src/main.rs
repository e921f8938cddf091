/*

    Build a KD-tree over a triangle workload and trace
    a batch of rays through it.

    Usage: kd-tracer [workload.json]
    Without arguments a random workload with default
    settings is traced.

    @date: Oct, 2025

*/

use std::{env, path::Path};
use tracing::{info, warn, error};

use kd_tracer::json_parser::parse_workload;
use kd_tracer::tracer::{self, Workload};

fn main() -> Result<(), Box<dyn std::error::Error>> {

    // Logging on console
    tracing_subscriber::fmt::init();

    // Parse args
    let args: Vec<String> = env::args().collect();
    let workload = if args.len() == 1 {
        warn!("No arguments were provided, tracing a random workload...");
        Workload::default()
    } else if args.len() == 2 {
        info!("Loading workload from {}...", args[1]);
        parse_workload(Path::new(&args[1])).map_err(|e| {
            error!("Failed to load workload: {}", e);
            e
        })?
    } else {
        error!("Usage: {} [workload.json]", args[0]);
        std::process::exit(1);
    };

    let summary = tracer::run(workload).map_err(|e| {
        error!("Tracing failed: {}", e);
        e
    })?;

    info!(
        "Build took {:?}, tracing {} rays took {:?} ({} hits, {} dropped triangles).",
        summary.build_time, summary.rays, summary.trace_time, summary.hits, summary.dropped_triangles
    );
    if let Some(mismatches) = summary.mismatches {
        if mismatches > 0 {
            return Err(format!("{} rays disagree with brute force", mismatches).into());
        }
    }
    info!("Finished execution.");
    Ok(())
}
