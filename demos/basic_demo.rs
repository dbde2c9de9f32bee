//! Basic demonstration of the Ironline unit simulation.
//!
//! Run with: cargo run --example basic_demo
//! Set RUST_LOG=debug to watch command state transitions.

use glam::Vec3;
use ironline_sim::SimWorld;

fn main() {
    env_logger::init();

    println!("=== Ironline - Unit AI Demo ===\n");

    // Two battle lines with a broken wall between them.
    let mut sim = SimWorld::new_default_test_world();

    println!("Initial state:");
    print_snapshot(&mut sim);

    // Send the Blue line across the field; they will engage whatever they
    // see on the way. The Red line holds and defends itself.
    println!("\n--- Blue attack-moves across the field ---\n");
    for i in 0..3 {
        let z = -20.0 + (i as f32) * 20.0;
        sim.command_attack_move(i, Vec3::new(100.0, 0.0, z));
    }

    println!("Running simulation for 450 ticks (15 seconds at 30 ticks/sec)...\n");
    for tick in 0..450 {
        sim.step(1.0 / 30.0);

        if (tick + 1) % 90 == 0 {
            println!(
                "--- Tick {} (t={:.1}s) ---",
                sim.current_tick(),
                sim.current_time()
            );
            print_snapshot(&mut sim);
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(sim: &mut SimWorld) {
    let snapshot = sim.snapshot();

    for team in ["Blue", "Red"] {
        println!("  {} units:", team);
        for unit in snapshot.units.iter().filter(|u| u.team == team) {
            println!(
                "    Unit {}: pos=({:.1}, {:.1}) [{}]{}{}",
                unit.id,
                unit.x,
                unit.z,
                unit.command,
                if unit.firing { " FIRING" } else { "" },
                match unit.target {
                    Some(target) => format!(" -> unit {}", target),
                    None => String::new(),
                }
            );
        }
    }
}
