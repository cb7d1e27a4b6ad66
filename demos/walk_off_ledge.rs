use glam::Vec2;
use ledgewise::*;
use tracing_subscriber::EnvFilter;

// Walks a player off the left floating platform of the test level and
// prints the per-tick state. Try RUST_LOG=ledgewise=debug for the
// landing/coyote events.
fn main() -> Result<(), GridError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let level = levels::test_level()?;
    // Platform row 15 spans cols 5..=10: world x 160..352, top at y 480.
    let mut player = Player::with_query(&level, Vec2::new(300.0, 440.0));
    let dt = 1.0 / 60.0;

    for tick in 0..90 {
        if tick < 50 {
            player.move_right();
        }
        // Late jump a few ticks after the platform edge.
        if tick == 30 {
            let coyote = player.coyote_timer();
            println!("tick {tick}: jump accepted={} coyote={coyote:.3}", player.jump());
        }
        player.tick(dt);
        let p = player.position();
        let stats = player.last_step();
        println!(
            "tick {:>3} pos=({:>7.2},{:>7.2}) phase={:?} queries={} iters={} | {}",
            tick,
            p.x,
            p.y,
            player.phase(),
            stats.queries,
            stats.iterations,
            player.debug_info()
        );
    }
    Ok(())
}
