/// Entry point and frame loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::SeedableRng;

use config::{AppConfig, LoadReport, LogConfig};
use error::AppError;
use sim::show::Show;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::pointer::PointerTracker;
use ui::renderer::Renderer;
use ui::sound::AudioHub;

fn main() {
    let (config, report) = AppConfig::load();

    if let Err(e) = init_logging(&config.log) {
        eprintln!("Logging disabled: {e}");
    }
    log_report(&report);

    let rng = match config.seed {
        Some(seed) => {
            log::info!("using fixed seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let mut show = Show::mount(rng);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init().map_err(AppError::TerminalInit) {
        log::error!("{e}");
        eprintln!("{e}");
        return;
    }

    let mut audio = AudioHub::new(&config.audio);

    let result = run(&mut show, &mut renderer, &mut audio, &config);

    show.teardown();
    audio.teardown();

    if let Err(e) = renderer.cleanup().map_err(AppError::TerminalCleanup) {
        log::error!("{e}");
        eprintln!("{e}");
    }

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("{e}");
    }

    println!();
    if show.finale_started {
        println!("You said yes. Happy Valentine's Day!");
    } else {
        println!("Still waiting for an answer...");
    }
}

/// Route `log` output to the configured file. The terminal is in the
/// alternate screen, so stderr is not an option.
fn init_logging(cfg: &LogConfig) -> Result<(), AppError> {
    if cfg.level == log::LevelFilter::Off && std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }

    let file = File::create(&cfg.file).map_err(|source| AppError::LogFile {
        path: cfg.file.clone(),
        source,
    })?;

    env_logger::Builder::new()
        .filter_level(cfg.level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|_| AppError::LoggerInstalled)
}

fn log_report(report: &LoadReport) {
    match &report.source {
        Some(path) => log::info!("config loaded from {}", path.display()),
        None => log::info!("no config.toml found, using defaults"),
    }
    for w in &report.warnings {
        log::warn!("config: {w}");
    }
}

fn run(
    show: &mut Show,
    renderer: &mut Renderer,
    audio: &mut AudioHub,
    config: &AppConfig,
) -> Result<(), AppError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let frame = Duration::from_millis(config.frame_ms);
    let started = Instant::now();
    let mut pointer = PointerTracker::new();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.quit_pressed() {
            log::info!("quit requested");
            break;
        }

        show.advance(started.elapsed());
        handle_input(show, renderer, &kb, &gp, &mut pointer);

        for event in show.drain_events() {
            log::trace!("event {event:?}");
            audio.cue(&event);
        }

        renderer.render(show).map_err(AppError::Render)?;
        std::thread::sleep(frame);
    }

    Ok(())
}

// ── Key Constants ──

const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];
const KEYS_AFFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char('y'), KeyCode::Char('Y')];
const KEYS_APPROACH: &[KeyCode] = &[
    KeyCode::Tab,
    KeyCode::Right,
    KeyCode::Char('n'),
    KeyCode::Char('N'),
];

fn handle_input(
    show: &mut Show,
    renderer: &Renderer,
    kb: &InputState,
    gp: &GamepadState,
    pointer: &mut PointerTracker,
) {
    pointer.apply(show, |s: &Show| renderer.question_layout(s), &kb.moves, &kb.clicks);

    if kb.any_pressed(KEYS_AFFIRM) || gp.affirm_pressed() {
        show.on_affirm();
    }
    if kb.any_pressed(KEYS_APPROACH) || gp.approach_pressed() {
        let geometry = renderer.question_layout(show).geometry();
        show.on_approach(geometry);
    }
}
