use glam::Vec2;
use ledgewise::*;
use std::time::Instant;

fn main() -> Result<(), GridError> {
    // 256x256 map with ~25% solids and a sprinkling of one-way and hazard tiles
    let w = 256u32; let h = 256u32;
    let mut grid = TileGrid::new("perf", w, h, 32.0)?;
    for y in 0..h as i32 { for x in 0..w as i32 {
        let tile = match (x ^ y) & 0x7 { 0 | 4 => Tile::Solid, 2 => Tile::OneWayPlatform, 6 if x % 5 == 0 => Tile::Hazardous, _ => Tile::Empty };
        grid.set_tile(glam::IVec2::new(x, y), tile);
    }}

    // Raw contact query throughput
    let n_queries = 1_000_000;
    let t0 = Instant::now();
    let mut grounded = 0u32;
    for i in 0..n_queries {
        let x = (i % 8000) as f32 * 1.013;
        let y = (i % 7000) as f32 * 1.171;
        if grid.check_collision(x, y, 32.0, 32.0).on_ground { grounded += 1; }
    }
    let dt = t0.elapsed().as_secs_f64();
    println!("contact: queries={} secs={:.3} throughput={:.0} q/s grounded={}", n_queries, dt, (n_queries as f64 / dt), grounded);

    // Swept axis resolution throughput, including path sampling and bisection
    let resolver = SweptResolver::default();
    let n_moves = 200_000;
    let t1 = Instant::now();
    let mut queries = 0u64;
    let mut iterations = 0u64;
    for i in 0..n_moves {
        let a = (i as f32 * 0.01).sin();
        let start = Aabb::new(Vec2::new(100.0 + (i % 4000) as f32, 100.0 + (i % 3000) as f32), Vec2::splat(32.0));
        let out = resolver.resolve(&grid, start, Vec2::new(40.0 * a, 60.0 * a.abs() + 1.0));
        for mv in [out.x, out.y].into_iter().flatten() { queries += mv.queries as u64; iterations += mv.iterations as u64; }
    }
    let dt1 = t1.elapsed().as_secs_f64();
    println!(
        "sweep: moves={} secs={:.3} throughput={:.0} moves/s avg_queries={:.2} avg_iters={:.2}",
        n_moves, dt1, (n_moves as f64 / dt1), queries as f64 / n_moves as f64, iterations as f64 / n_moves as f64
    );
    Ok(())
}
