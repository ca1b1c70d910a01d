/// Sound: procedural cues via rodio, behind a lazily opened hub.
///
/// One-shot cues (pulse, tick, glitch) are generated as in-memory WAV
/// buffers when the engine opens and played fire-and-forget. The ambient
/// tone is an endless sine with a 2s fade-in held in a single slot:
/// starting one stops the previous.
///
/// `AudioHub` opens the output device on the first cue, not at startup,
/// and releases it on `teardown()`.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::config::AudioConfig;
use crate::sim::event::ShowEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;

    use rodio::source::SineWave;
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    const AMBIENT_FREQ: f32 = 110.0;
    const AMBIENT_LEVEL: f32 = 0.08;
    const AMBIENT_FADE: Duration = Duration::from_secs(2);

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        volume: f32,
        sfx_pulse: Arc<Vec<u8>>,
        sfx_tick: Arc<Vec<u8>>,
        sfx_glitch: Arc<Vec<u8>>,
        ambient: Option<Sink>,
    }

    impl SoundEngine {
        pub fn new(volume: f32) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                volume,
                sfx_pulse: Arc::new(make_wav(&gen_pulse())),
                sfx_tick: Arc::new(make_wav(&gen_tick())),
                sfx_glitch: Arc::new(make_wav(&gen_glitch())),
                ambient: None,
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.set_volume(self.volume);
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_pulse(&self) { self.play(&self.sfx_pulse); }
        pub fn play_tick(&self) { self.play(&self.sfx_tick); }
        pub fn play_glitch(&self) { self.play(&self.sfx_glitch); }

        pub fn start_ambient(&mut self) {
            self.stop_ambient();
            match Sink::try_new(&self.handle) {
                Ok(sink) => {
                    let tone = SineWave::new(AMBIENT_FREQ)
                        .amplify(AMBIENT_LEVEL)
                        .fade_in(AMBIENT_FADE);
                    sink.set_volume(self.volume);
                    sink.append(tone);
                    self.ambient = Some(sink);
                }
                Err(e) => log::warn!("ambient tone unavailable: {e}"),
            }
        }

        pub fn stop_ambient(&mut self) {
            if let Some(sink) = self.ambient.take() {
                sink.stop();
            }
        }

        #[allow(dead_code)]
        pub fn ambient_playing(&self) -> bool {
            self.ambient.is_some()
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Exponential glide from `from` to `to` over `over` seconds, then flat.
    fn glide(from: f32, to: f32, over: f32, t: f32) -> f32 {
        if t >= over { to } else { from * (to / from).powf(t / over) }
    }

    /// Exponential decay from `peak` to `floor` across `span` seconds.
    fn decay(peak: f32, floor: f32, span: f32, t: f32) -> f32 {
        peak * (floor / peak).powf((t / span).min(1.0))
    }

    /// Heartbeat: 80→40 Hz thump, 10ms attack, gone by 150ms
    pub(super) fn gen_pulse() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.15) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = glide(80.0, 40.0, 0.1, t);
                phase += TAU * freq / SAMPLE_RATE as f32;
                let env = if t < 0.01 {
                    0.3 * t / 0.01
                } else {
                    decay(0.3, 0.01, 0.14, t - 0.01)
                };
                phase.sin() * env
            })
            .collect()
    }

    /// Countdown tick: 50ms of 800 Hz
    pub(super) fn gen_tick() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.05) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                (t * 800.0 * TAU).sin() * decay(0.2, 0.01, 0.05, t)
            })
            .collect()
    }

    /// Glitch: sawtooth bass drop 120→40 Hz (600ms) over a burst of
    /// low-passed noise (200ms)
    pub(super) fn gen_glitch() -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * 0.6) as usize;
        let dt = 1.0 / SAMPLE_RATE as f32;
        let rc = 1.0 / (TAU * 800.0);
        let alpha = dt / (rc + dt);

        let mut phase = 0.0_f32;
        let mut rng: u32 = 0x9E37_79B9;
        let mut lp = 0.0_f32;

        (0..n)
            .map(|i| {
                let t = i as f32 * dt;

                let freq = glide(120.0, 40.0, 0.4, t);
                phase = (phase + freq * dt).fract();
                let saw = phase * 2.0 - 1.0;
                let bass_env = if t < 0.02 {
                    0.4 * t / 0.02
                } else {
                    decay(0.4, 0.01, 0.58, t - 0.02)
                };

                let noise = if t < 0.2 {
                    rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                    let white = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                    lp += alpha * (white - lp);
                    lp * decay(0.15, 0.01, 0.2, t)
                } else {
                    0.0
                };

                saw * bass_env + noise
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a 16-bit mono PCM buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let bits_per_sample: u16 = 16;
        let block_align: u16 = bits_per_sample / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&1u16.to_le_bytes()); // mono
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Engine — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine {
    ambient: bool,
}

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_volume: f32) -> Option<Self> { Some(SoundEngine { ambient: false }) }
    pub fn play_pulse(&self) {}
    pub fn play_tick(&self) {}
    pub fn play_glitch(&self) {}
    pub fn start_ambient(&mut self) { self.ambient = true; }
    pub fn stop_ambient(&mut self) { self.ambient = false; }
    #[allow(dead_code)]
    pub fn ambient_playing(&self) -> bool { self.ambient }
}

// ════════════════════════════════════════════════════════════
//  Hub — lazy open, single ambient slot, explicit teardown
// ════════════════════════════════════════════════════════════

pub struct AudioHub {
    enabled: bool,
    volume: f32,
    engine: Option<SoundEngine>,
    /// Opening failed once; don't retry every cue.
    unavailable: bool,
}

impl AudioHub {
    pub fn new(cfg: &AudioConfig) -> Self {
        AudioHub {
            enabled: cfg.enabled,
            volume: cfg.volume,
            engine: None,
            unavailable: false,
        }
    }

    fn engine(&mut self) -> Option<&mut SoundEngine> {
        if !self.enabled || self.unavailable {
            return None;
        }
        if self.engine.is_none() {
            match SoundEngine::new(self.volume) {
                Some(e) => {
                    log::debug!("audio engine opened");
                    self.engine = Some(e);
                }
                None => {
                    self.unavailable = true;
                    return None;
                }
            }
        }
        self.engine.as_mut()
    }

    /// Play whatever `event` calls for. Non-audio events are ignored.
    pub fn cue(&mut self, event: &ShowEvent) {
        let wants_audio = matches!(
            event,
            ShowEvent::Pulse | ShowEvent::Tick | ShowEvent::Glitch | ShowEvent::AmbientStart
        );
        if !wants_audio { return; }
        let Some(engine) = self.engine() else { return };
        match event {
            ShowEvent::Pulse => engine.play_pulse(),
            ShowEvent::Tick => engine.play_tick(),
            ShowEvent::Glitch => engine.play_glitch(),
            ShowEvent::AmbientStart => engine.start_ambient(),
            _ => {}
        }
    }

    #[allow(dead_code)]
    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    #[allow(dead_code)]
    pub fn ambient_playing(&self) -> bool {
        self.engine.as_ref().is_some_and(|e| e.ambient_playing())
    }

    /// Stop the ambient tone and release the output device.
    pub fn teardown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop_ambient();
            log::debug!("audio engine closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hub(enabled: bool) -> AudioHub {
        AudioHub::new(&AudioConfig { enabled, volume: 0.5 })
    }

    #[test]
    fn disabled_hub_never_opens() {
        let mut h = hub(false);
        h.cue(&ShowEvent::Pulse);
        h.cue(&ShowEvent::AmbientStart);
        assert!(!h.is_open());
        assert!(!h.ambient_playing());
    }

    #[test]
    fn non_audio_events_do_not_open_the_device() {
        let mut h = hub(true);
        h.cue(&ShowEvent::MessageCleared);
        h.cue(&ShowEvent::Jolt);
        assert!(!h.is_open());
    }

    #[test]
    fn teardown_releases_engine() {
        let mut h = hub(true);
        // May or may not open depending on the machine's audio device.
        h.cue(&ShowEvent::AmbientStart);
        h.teardown();
        assert!(!h.is_open());
        assert!(!h.ambient_playing());
    }

    #[cfg(feature = "sound")]
    mod waveforms {
        use super::super::inner::{gen_glitch, gen_pulse, gen_tick, make_wav};

        #[test]
        fn cues_have_expected_lengths() {
            // 150ms, 50ms, 600ms at 22.05 kHz
            assert!(gen_pulse().len().abs_diff(3307) <= 1);
            assert!(gen_tick().len().abs_diff(1102) <= 1);
            assert!(gen_glitch().len().abs_diff(13230) <= 1);
        }

        #[test]
        fn samples_stay_in_range() {
            for s in gen_pulse().into_iter().chain(gen_tick()).chain(gen_glitch()) {
                assert!(s.is_finite() && s.abs() <= 1.0);
            }
        }

        #[test]
        fn wav_header_matches_payload() {
            let wav = make_wav(&[0.0, 0.5, -0.5]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(&wav[8..12], b"WAVE");
            assert_eq!(wav.len(), 44 + 6);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
        }
    }
}
