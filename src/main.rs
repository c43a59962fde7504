//! Bearcat entry point
//!
//! Runs a scripted, headless session of both sample games. Drawing goes to a
//! recording canvas so the run exercises the full frame pipeline without a
//! window.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::rc::Rc;

    use bearcat::GameError;
    use bearcat::Settings;
    use bearcat::platform::{Clock, DeltaTimer, FrameDriver, ManualClock, key_down, key_up};
    use bearcat::renderer::{RecordingCanvas, draw_defense, draw_platformer};
    use bearcat::sim::{
        DefensePhase, Game, GameEvent, GravityEffect, MovementAxis, Scene, SurfaceInfo,
        TowerDefense,
    };
    use glam::Vec2;

    fn level_one(scene: &mut Scene) -> Result<(), GameError> {
        scene.add_player(60.0, 685.0, 30.0, 30.0)?;
        scene.add_platform(400.0, 710.0, 800.0, 20.0, SurfaceInfo::default())?;
        scene.add_star(200.0, 680.0, 20.0, 20.0, 10)?;
        scene.add_star(320.0, 680.0, 20.0, 20.0, 10)?;
        scene.add_treadmill(520.0, 695.0, 120.0, 10.0, 2.0)?;
        scene.add_door(740.0, 670.0, 30.0, 60.0, "Level 2", true)?;
        Ok(())
    }

    fn level_two(scene: &mut Scene) -> Result<(), GameError> {
        scene.add_player(60.0, 685.0, 30.0, 30.0)?;
        scene.add_platform(400.0, 710.0, 800.0, 20.0, SurfaceInfo::default())?;
        scene.add_platform(400.0, 90.0, 800.0, 20.0, SurfaceInfo::default())?;
        scene.add_trampoline(300.0, 695.0, 60.0, 10.0, 1.2)?;
        scene.add_gravity_block(450.0, 680.0, 20.0, 20.0, GravityEffect::Invert)?;
        scene.add_enemy(600.0, 400.0, 25.0, 25.0, MovementAxis::Vertical, 2.0, 150.0)?;
        scene.add_moving_platform(200.0, 400.0, 100.0, 15.0, MovementAxis::Horizontal, 1.5, 80.0)?;
        scene.add_door(740.0, 130.0, 30.0, 60.0, "Level 1", true)?;
        Ok(())
    }

    /// Hold `key` for `secs`, pumping the frame driver at 60 Hz of wall time
    fn hold(
        game: &Rc<RefCell<Game>>,
        driver: &mut FrameDriver<ManualClock>,
        clock: &ManualClock,
        key: &str,
        secs: f64,
    ) -> u32 {
        key_down(&mut game.borrow_mut(), key);
        let mut steps = 0;
        let frames = (secs * 60.0).round() as u32;
        for _ in 0..frames {
            clock.advance(1.0 / 60.0);
            steps += driver.pump();
        }
        key_up(&mut game.borrow_mut(), key);
        steps
    }

    pub fn platformer() -> Result<(), GameError> {
        let settings = Settings {
            double_jump: true,
            ..Settings::default()
        };
        let fps = settings.fps;
        let mut game = Game::new(settings);
        game.define_level("Level 1", level_one);
        game.define_level("Level 2", level_two);
        game.load_level("Level 1")?;

        let game = Rc::new(RefCell::new(game));
        let clock = ManualClock::new();
        let mut driver = FrameDriver::new(clock.clone(), fps);
        let ticking = Rc::clone(&game);
        driver.register_frame_callback(move |_| ticking.borrow_mut().tick());

        let mut steps = hold(&game, &mut driver, &clock, "d", 3.0);
        steps += hold(&game, &mut driver, &clock, " ", 0.1);
        steps += hold(&game, &mut driver, &clock, "ArrowRight", 4.0);
        steps += hold(&game, &mut driver, &clock, "a", 1.0);

        let mut game = game.borrow_mut();
        for event in game.drain_events() {
            match event {
                GameEvent::LevelCompleted { from, to } => println!("  {from} -> {to}"),
                GameEvent::GravityInverted { multiplier } => {
                    println!("  gravity now {multiplier:+}")
                }
                GameEvent::LifeLost { remaining } => println!("  life lost, {remaining} left"),
                _ => {}
            }
        }

        let mut canvas = RecordingCanvas::new();
        draw_platformer(&game, &mut canvas);
        println!(
            "Platformer: {steps} ticks, level {:?}, score {} (+{}), {} shapes drawn",
            game.current_level().unwrap_or("-"),
            game.score,
            game.score_earned_this_level,
            canvas.shape_count(),
        );
        for text in canvas.texts() {
            println!("  HUD: {text}");
        }
        Ok(())
    }

    pub fn tower_defense(seed: u64) -> Result<(), GameError> {
        let path = vec![
            Vec2::new(0.0, 100.0),
            Vec2::new(500.0, 100.0),
            Vec2::new(500.0, 400.0),
            Vec2::new(100.0, 400.0),
            Vec2::new(100.0, 700.0),
            Vec2::new(800.0, 700.0),
        ];
        let settings = Settings::default();
        let mut td = TowerDefense::new(path, &settings, seed)?;

        td.add_wave();
        for i in 0..6 {
            td.add_enemy_to_wave("basic", i as f32 * 0.8)?;
        }
        td.add_wave();
        for i in 0..4 {
            td.add_enemy_to_wave("fast", i as f32 * 0.5)?;
            td.add_enemy_to_wave("erratic", i as f32 * 0.5 + 0.25)?;
        }
        td.add_wave();
        td.add_enemy_to_wave("tank", 0.0)?;
        td.add_enemy_to_wave("reverser", 1.0)?;

        td.place_tower("basic", Vec2::new(300.0, 160.0))?;
        td.place_tower("rapid", Vec2::new(440.0, 250.0))?;
        if let Err(err) = td.place_tower("cannon", Vec2::new(160.0, 550.0)) {
            log::warn!("Skipping cannon: {err}");
        }
        td.start();

        let clock = ManualClock::new();
        let mut timer = DeltaTimer::new(clock.clone());
        let mut frames = 0u32;
        while matches!(td.phase(), DefensePhase::Playing) && frames < 60 * 120 {
            clock.advance(1.0 / 30.0);
            td.tick(timer.delta());
            frames += 1;
        }

        let events = td.drain_events();
        let mut canvas = RecordingCanvas::new();
        draw_defense(&td, &mut canvas);
        println!(
            "Tower defense: {:?} after {:.1}s, money {}, lives {}, {} events",
            td.phase(),
            clock.now(),
            td.money,
            td.lives,
            events.len(),
        );
        for text in canvas.texts() {
            println!("  HUD: {text}");
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bearcat (native) starting headless demo");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    if let Err(err) = demo::platformer() {
        log::error!("Platformer demo failed: {err}");
    }
    if let Err(err) = demo::tower_defense(seed) {
        log::error!("Tower-defense demo failed: {err}");
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts drive the library directly on wasm
}
