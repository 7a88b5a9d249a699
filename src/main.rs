//! Eco Dash entry point
//!
//! On the web the page drives `eco_dash::web::WebGame` directly. Natively
//! this is a headless attract-mode session: the autopilot plays a few runs
//! against the real profile store and the results are logged.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use eco_dash::consts::FRAME_DT;
    use eco_dash::game::Game;
    use eco_dash::platform::{default_store, init_logging};
    use eco_dash::sim::{GameEvent, GamePhase, TickInput};
    use eco_dash::tuning::Tuning;

    /// Runs to play before exiting
    const RUNS: u32 = 3;
    /// Give up on a run after ten simulated minutes
    const MAX_FRAMES_PER_RUN: u32 = 60 * 60 * 10;

    init_logging();
    log::info!("Eco Dash (native) starting...");

    let seed = std::env::var("ECO_DASH_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });
    let tuning = match std::env::var("ECO_DASH_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json),
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path, e);
                Tuning::default()
            }
        },
        Err(_) => Tuning::default(),
    };

    let mut game = Game::new(seed, tuning, default_store());
    let idle = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    for run in 1..=RUNS {
        let mut frames = 0;
        game.frame(&idle, FRAME_DT);
        while game.phase().is_in_run() && frames < MAX_FRAMES_PER_RUN {
            game.frame(&idle, FRAME_DT);
            frames += 1;
        }

        for event in game.drain_events() {
            match event {
                GameEvent::RunEnded { score, stats, .. } => log::info!(
                    "Run {}: score {:.0}, {} jumps, {} fragments, {:.1}s",
                    run,
                    score,
                    stats.jumps,
                    stats.eco_points,
                    frames as f32 * FRAME_DT
                ),
                GameEvent::NewRecord { scene, score } => {
                    log::info!("New record in {}: {}", scene, score)
                }
                GameEvent::Unlocked(unlock) => log::info!("Unlocked: {}", unlock.name),
                _ => {}
            }
        }

        if *game.phase() == GamePhase::GameOver {
            game.return_to_menu();
        } else {
            log::info!("Run {} still going after {} frames, stopping", run, frames);
            break;
        }
    }

    let profile = game.profile();
    log::info!(
        "Profile: {} runs, best {}, {} achievements",
        profile.stats.total_runs,
        profile.max_best_score(),
        profile.achievements.len()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is eco_dash::web::WebGame, this is just to satisfy the compiler
}
