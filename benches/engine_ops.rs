use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

use grid_2048::{Direction, Engine, GameConfig};

fn corpus() -> Vec<Engine> {
    let mut rng = StdRng::seed_from_u64(1337);
    let mut engines = Vec::new();
    // Advance each game a different distance for a spread of densities.
    for seed in 0..8u64 {
        let mut engine = Engine::with_seed(GameConfig::default(), seed);
        engine
            .setup()
            .expect("default configuration is always satisfiable");
        for _ in 0..(seed * 25) {
            if engine.is_finished() {
                break;
            }
            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            engine.make_move(direction);
        }
        engines.push(engine);
    }
    engines
}

fn bench_make_move(c: &mut Criterion) {
    let engines = corpus();
    c.bench_function("engine/make_move", |bch| {
        bch.iter(|| {
            let mut acc = 0u64;
            for engine in &engines {
                let mut game = engine.clone();
                game.make_move(Direction::Left);
                game.make_move(Direction::Up);
                acc ^= game.score();
            }
            black_box(acc)
        })
    });
}

fn bench_moves_available(c: &mut Criterion) {
    let engines = corpus();
    c.bench_function("engine/moves_available", |bch| {
        bch.iter(|| {
            let mut count = 0u32;
            for engine in &engines {
                if engine.moves_available() {
                    count += 1;
                }
            }
            black_box(count)
        })
    });
}

criterion_group!(engine_ops, bench_make_move, bench_moves_available);
criterion_main!(engine_ops);
