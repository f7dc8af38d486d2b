//! Ball Roller headless runner
//!
//! Plays a scripted session against the simulation core and logs what the
//! host UI would receive. Usage: `ball-roller [config.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use ball_roller::GameConfig;
    use ball_roller::sim::{GameEvent, GameState, KeyState, TickInput, tick};

    env_logger::init();
    log::info!("Ball Roller (native) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load_or_default(path),
        None => GameConfig::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);

    let mut state = GameState::new(config, seed);
    state.start();

    // 60 Hz for 60 simulated seconds, steering in a slow square
    const FRAME_DT: f32 = 1.0 / 60.0;
    let mut collisions = 0u32;
    let mut collected = 0u32;
    for frame in 0..3600u32 {
        let leg = (frame / 90) % 4;
        let input = TickInput {
            keys: KeyState {
                up: leg == 0,
                right: leg == 1,
                down: leg == 2,
                left: leg == 3,
                jump: frame % 240 == 0,
            },
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT);

        for event in state.drain_events() {
            match &event {
                GameEvent::Collision { count, .. } => collisions += count,
                GameEvent::Collect { count, .. } => collected += count,
                GameEvent::LevelUp { level } => log::info!("Level up -> {level}"),
                _ => {}
            }
            log::debug!("{:?}", event);
        }
    }
    state.end();

    println!("\nSession summary (seed {seed}):");
    println!("  score:      {}", state.score());
    println!("  level:      {}", state.level());
    println!("  collisions: {collisions}");
    println!("  collected:  {collected}");
    println!("  obstacles:  {} in play", state.obstacles.len());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM hosts drive `platform::web::WebSession`, this is just to satisfy the compiler
}
