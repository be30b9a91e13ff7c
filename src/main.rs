use grid_2048::{Direction, Engine, GameConfig};
use rand::Rng;

fn main() {
    let mut engine = Engine::new(GameConfig::default());
    engine
        .setup()
        .expect("default configuration is always satisfiable");
    let mut rng = rand::thread_rng();
    println!("{}", engine.board());
    let mut move_count = 0u64;
    while !engine.is_finished() {
        let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        if engine.make_move(direction) {
            move_count += 1;
            println!("{}", engine.board());
        }
    }
    println!(
        "Moves made: {}, score: {}, best: {}, highest tile: {}",
        move_count,
        engine.score(),
        engine.best(),
        engine.board().highest_tile()
    );
}
