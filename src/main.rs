//! Starshot entry point
//!
//! Runs a scripted headless session: the frame core drives the recording
//! renderer and a logging audio sink, then the final world view is printed
//! as JSON.
//!
//! Usage: `starshot [settings.json] [frames]`

use std::process::ExitCode;

use starshot::Settings;
use starshot::audio::{AudioMixer, LogSink};
use starshot::game::ShooterScenario;
use starshot::input::{InputEvent, InputQueue, Key};
use starshot::pacing::FrameClock;
use starshot::renderer::DisplayListRenderer;
use starshot::sim::{FrameError, Game, Phase};

const DEFAULT_FRAMES: u64 = 60 * 60;

/// Pilot input for frame `n`: hold fire, weave up and down every two seconds
fn script(n: u64, queue: &mut InputQueue) {
    if n == 0 {
        queue.push(InputEvent::KeyDown(Key::Fire));
    }
    match n % 240 {
        0 => queue.push(InputEvent::KeyDown(Key::Up)),
        60 => queue.push(InputEvent::KeyUp(Key::Up)),
        120 => queue.push(InputEvent::KeyDown(Key::Down)),
        180 => queue.push(InputEvent::KeyUp(Key::Down)),
        _ => {}
    }
}

fn run(settings: &Settings, frames: u64) -> Result<(), FrameError> {
    let scenario = ShooterScenario::new(settings.seed, settings.show_fps);
    let mut game = Game::new(scenario, settings.frame_config())?;
    let mut renderer = DisplayListRenderer::default();
    let mut queue = InputQueue::new();
    let mut clock = FrameClock::new();

    let mut mixer = AudioMixer::new(LogSink::default());
    mixer.set_master_volume(settings.master_volume);
    mixer.set_sfx_volume(settings.sfx_volume);
    mixer.set_muted(settings.muted);

    let delta = settings.frame_interval().min(settings.max_frame_delta);
    let mut time = 0.0f64;
    for n in 0..frames {
        script(n, &mut queue);
        if game.phase() == Phase::GameOver {
            queue.push(InputEvent::KeyDown(Key::Confirm));
        }

        let report = game.frame(&queue.drain(), delta, &mut renderer)?;
        mixer.play_all(game.take_audio());
        time += f64::from(delta);
        clock.record(time);

        if !report.drain.diagnostics.is_empty() {
            log::warn!(
                "frame {}: {} diagnostics",
                report.frame,
                report.drain.diagnostics.len()
            );
        }
        if game.quit_requested() {
            log::info!("quit requested at frame {}", report.frame);
            break;
        }
    }

    log::info!(
        "ran {} frames at {} fps nominal, {} sounds played",
        renderer.frames(),
        clock.fps(),
        mixer.sink().played()
    );
    match serde_json::to_string_pretty(&game.view()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("failed to serialize world view: {e}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starshot (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let frames = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    match run(&settings, frames) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
