//! Flies a 100 m square and prints when each corner is reached.
//!
//! Run with: `cargo run -p logoflight-sitl --example square_mission`

use logoflight_core::{Instruction, LogoConfig};
use logoflight_sitl::MissionRunner;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let mission = [
        Instruction::repeat(4),
        Instruction::fd(100),
        Instruction::rt(90),
        Instruction::End,
    ];
    let failsafe = [Instruction::Home, Instruction::End];

    let mut runner = MissionRunner::new(&mission, &failsafe, LogoConfig::default())
        .expect("flight plan rejected");

    for (x, y) in [(0, 100), (100, 100), (100, 0), (0, 0)] {
        let ticks = runner
            .run_to_position(x, y, 26.0, 20_000)
            .expect("corner not reached");
        println!("reached corner ({x}, {y}) at tick {ticks}");
    }
    println!("square complete in {} simulated seconds", runner.ticks() / 40);
}
