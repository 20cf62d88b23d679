//! Sound cues
//!
//! The driver owns one [`AudioSink`] handed to it at construction. In the
//! browser that is [`WebAudio`], which synthesizes every cue with Web Audio
//! oscillators - no external files needed.

use std::cell::RefCell;
use std::rc::Rc;

/// Cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Bubble popped
    Pop,
    /// Phase flipped to breathing in
    Inhale,
    /// Phase flipped to breathing out
    Exhale,
    /// Countdown finished
    SessionEnd,
    /// Session result took first place
    HighScore,
}

pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
    /// Master volume (0.0 - 1.0)
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
}

/// Plays nothing
#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioSink for SilentAudio {
    fn play(&mut self, _cue: SoundCue) {}
    fn set_volume(&mut self, _volume: f32) {}
    fn set_muted(&mut self, _muted: bool) {}
}

/// Records cues into a shared list (headless runs and tests)
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    cues: Rc<RefCell<Vec<SoundCue>>>,
    muted: bool,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the cues played so far
    pub fn cues(&self) -> Rc<RefCell<Vec<SoundCue>>> {
        self.cues.clone()
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        if !self.muted {
            log::debug!("Cue: {:?}", cue);
            self.cues.borrow_mut().push(cue);
        }
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundCue};

    /// Web Audio cue synthesizer. Clones share one context.
    #[derive(Clone)]
    pub struct WebAudio {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for WebAudio {
        fn default() -> Self {
            Self::new()
        }
    }

    impl WebAudio {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: 0.8,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        fn effective_volume(&self) -> f32 {
            if self.muted { 0.0 } else { self.volume }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Pop - short bright blip falling in pitch
        fn play_pop(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(300.0, t + 0.08)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }

        /// Phase chime - soft sine swell, rising for inhale, falling for exhale
        fn play_chime(&self, ctx: &AudioContext, vol: f32, from: f32, to: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, from, OscillatorType::Sine) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(0.01, t).ok();
            gain.gain()
                .linear_ramp_to_value_at_time(vol * 0.2, t + 0.15)
                .ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.9)
                .ok();
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .linear_ramp_to_value_at_time(to, t + 0.9)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 1.0).ok();
        }

        /// Session end - three descending bell tones
        fn play_session_end(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            for (i, freq) in [784.0, 659.0, 523.0].into_iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle)
                else {
                    continue;
                };
                let start = t + i as f64 * 0.25;
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.6)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.65).ok();
            }
        }

        /// High score - rising arpeggio
        fn play_high_score(&self, ctx: &AudioContext, vol: f32) {
            let t = ctx.current_time();
            for (i, freq) in [523.0, 659.0, 784.0, 1047.0].into_iter().enumerate() {
                let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Sine) else {
                    continue;
                };
                let start = t + i as f64 * 0.12;
                gain.gain().set_value_at_time(vol * 0.3, start).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, start + 0.3)
                    .ok();
                osc.start_with_when(start).ok();
                osc.stop_with_when(start + 0.35).ok();
            }
        }
    }

    impl AudioSink for WebAudio {
        fn play(&mut self, cue: SoundCue) {
            let vol = self.effective_volume();
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match cue {
                SoundCue::Pop => self.play_pop(ctx, vol),
                SoundCue::Inhale => self.play_chime(ctx, vol, 330.0, 440.0),
                SoundCue::Exhale => self.play_chime(ctx, vol, 440.0, 330.0),
                SoundCue::SessionEnd => self.play_session_end(ctx, vol),
                SoundCue::HighScore => self.play_high_score(ctx, vol),
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume = volume.clamp(0.0, 1.0);
        }

        fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }
    }
}
