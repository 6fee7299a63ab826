//! Waypoint walking demo: one synchronous search and a few wandering agents
//! handled by the background worker.
//!
//! Run: RUST_LOG=debug cargo run --bin walk

use std::sync::Arc;

use gridwalk_core::{Layout, Movement, Vec2, render};
use gridwalk_paths::{PathConfig, PathWorker, Pathfinding, WorkerConfig};
use log::info;

const LAYOUT: &str = "
S.........#.........
.######...#...####..
......#...#......#..
..1...#.......2..#..
......#####......#..
.................#.3
..####....#######...
..#..........4......";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let layout = Layout::parse(LAYOUT)?;
    let map = Arc::new(layout.build()?);
    let marker = |c| layout.marker(c).map(Vec2::from).ok_or("missing marker");

    let mut patrol = Pathfinding::new(
        Arc::clone(&map),
        PathConfig {
            movement: Movement::EightSides,
            ..PathConfig::default()
        },
    )
    .with_start(marker('S')?)
    .with_targets([marker('1')?, marker('2')?, marker('3')?, marker('4')?]);

    let steps = patrol.find_path()?.len();
    info!("patrol route: {steps} steps");
    println!("patrol (eight sides, no deviation):\n{}\n", render(&map, patrol.path()));

    let worker = PathWorker::start(WorkerConfig::default())?;
    let mut handles = Vec::new();
    for seed in 0..3 {
        let wanderer = Pathfinding::new(
            Arc::clone(&map),
            PathConfig {
                deviation: 3,
                seed: Some(seed),
                ..PathConfig::default()
            },
        )
        .with_start(marker('S')?)
        .with_target(marker('3')?);
        handles.push(worker.submit(wanderer)?);
    }

    for (seed, handle) in handles.into_iter().enumerate() {
        let done = handle.wait()?;
        match done.outcome {
            Ok(()) => println!(
                "wanderer {seed} (deviation 3): {} steps\n{}\n",
                done.agent.path().len(),
                render(&map, done.agent.path())
            ),
            Err(e) => println!("wanderer {seed}: {e}"),
        }
    }
    worker.stop();
    Ok(())
}
