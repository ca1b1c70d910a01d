/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or
/// `~/.config/valentine`. Missing files and missing keys fall back to
/// defaults; a malformed file is logged and ignored.
///
/// The finale timing is not configurable. Only the host (frame cadence,
/// audio, logging, gamepad mapping, RNG seed) is.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub frame_ms: u64,
    pub seed: Option<u64>,
    pub audio: AudioConfig,
    pub log: LogConfig,
    pub gamepad: GamepadConfig,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub enabled: bool,
    pub volume: f32,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: log::LevelFilter,
    pub file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub affirm: Vec<String>,
    pub approach: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: TomlGeneral,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    gamepad: TomlGamepad,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_frame_ms")]
    frame_ms: u64,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_volume")]
    volume: f32,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_affirm")]
    affirm: Vec<String>,
    #[serde(default = "default_approach")]
    approach: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

// ── Defaults ──

fn default_frame_ms() -> u64 { 16 }
fn default_true() -> bool { true }
fn default_volume() -> f32 { 1.0 }
fn default_log_level() -> String { "warn".into() }
fn default_log_file() -> String { "valentine.log".into() }

fn default_affirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_approach() -> Vec<String> { vec!["B".into(), "X".into(), "Y".into(), "Right".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { frame_ms: default_frame_ms(), seed: None }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio { enabled: true, volume: default_volume() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { level: default_log_level(), file: default_log_file() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            affirm: default_affirm(),
            approach: default_approach(),
            quit: default_quit(),
        }
    }
}

/// Things worth reporting once the logger exists.
/// Config is read before logging is set up, so problems are collected here.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub source: Option<PathBuf>,
    pub warnings: Vec<String>,
}

// ── Loading ──

impl AppConfig {
    /// Load config from `config.toml` in the first candidate dir that has one.
    pub fn load() -> (Self, LoadReport) {
        let mut report = LoadReport::default();
        let toml_cfg = load_toml(&candidate_dirs(), &mut report);
        let cfg = Self::from_toml(toml_cfg, &mut report);
        (cfg, report)
    }

    /// Parse a config document directly, without searching the filesystem.
    pub fn parse(text: &str) -> Result<(Self, LoadReport), toml::de::Error> {
        let mut report = LoadReport::default();
        let parsed = toml::from_str::<TomlConfig>(text)?;
        let cfg = Self::from_toml(parsed, &mut report);
        Ok((cfg, report))
    }

    fn from_toml(t: TomlConfig, report: &mut LoadReport) -> Self {
        let level = match t.log.level.parse::<log::LevelFilter>() {
            Ok(l) => l,
            Err(_) => {
                report.warnings.push(format!(
                    "unknown log level '{}', using '{}'",
                    t.log.level,
                    default_log_level()
                ));
                log::LevelFilter::Warn
            }
        };

        let volume = if t.audio.volume.is_finite() {
            t.audio.volume.clamp(0.0, 1.0)
        } else {
            report.warnings.push("audio.volume is not a number, using 1.0".into());
            default_volume()
        };

        AppConfig {
            // Zero would spin the loop.
            frame_ms: t.general.frame_ms.max(1),
            seed: t.general.seed,
            audio: AudioConfig { enabled: t.audio.enabled, volume },
            log: LogConfig { level, file: PathBuf::from(t.log.file) },
            gamepad: GamepadConfig {
                affirm: t.gamepad.affirm,
                approach: t.gamepad.approach,
                quit: t.gamepad.quit,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD + user config dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user = PathBuf::from(&home).join(".config/valentine");
        if user.is_dir() && !dirs.iter().any(|d| d == &user) {
            dirs.push(user);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn load_toml(search_dirs: &[PathBuf], report: &mut LoadReport) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                report.source = Some(path.clone());
                return match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => cfg,
                    Err(e) => {
                        report.warnings.push(format!(
                            "{} parse error, using defaults: {e}",
                            path.display()
                        ));
                        TomlConfig::default()
                    }
                };
            }
            Err(e) => {
                report.warnings.push(format!("could not read {}: {e}", path.display()));
            }
        }
    }
    TomlConfig::default()
}
