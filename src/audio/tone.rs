use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::encode::sink::AudioInputConfig;
use crate::foundation::error::{NewsreelError, NewsreelResult};

pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;
pub const DEFAULT_CHANNELS: u16 = 2;

static SPOOL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Background tone played under a briefing: one triangle oscillator with a gain envelope and an
/// exponential frequency sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneSpec {
    pub start_hz: f64,
    pub end_hz: f64,
    /// Time to ramp from `floor_gain` to `peak_gain`.
    pub attack_secs: f64,
    pub floor_gain: f64,
    pub peak_gain: f64,
    /// Gain reached at the very end, ramped linearly from the peak.
    pub tail_gain: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self {
            start_hz: 180.0,
            end_hz: 90.0,
            attack_secs: 1.0,
            floor_gain: 0.0001,
            peak_gain: 0.06,
            tail_gain: 0.025,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
        }
    }
}

impl ToneSpec {
    pub fn validate(&self) -> NewsreelResult<()> {
        if !(self.start_hz > 0.0 && self.end_hz > 0.0) {
            return Err(NewsreelError::validation("tone frequencies must be > 0"));
        }
        if !self.attack_secs.is_finite() || self.attack_secs < 0.0 {
            return Err(NewsreelError::validation("tone attack_secs must be >= 0"));
        }
        for g in [self.floor_gain, self.peak_gain, self.tail_gain] {
            if !(0.0..=1.0).contains(&g) {
                return Err(NewsreelError::validation("tone gains must be in [0, 1]"));
            }
        }
        if self.sample_rate == 0 || self.channels == 0 {
            return Err(NewsreelError::validation(
                "tone sample_rate and channels must be > 0",
            ));
        }
        Ok(())
    }

    /// Envelope gain at `t` seconds into a tone lasting `duration_secs`.
    pub fn gain_at(&self, t: f64, duration_secs: f64) -> f64 {
        let t = t.clamp(0.0, duration_secs.max(0.0));
        if t < self.attack_secs {
            let u = t / self.attack_secs;
            return self.floor_gain + (self.peak_gain - self.floor_gain) * u;
        }
        let tail = duration_secs - self.attack_secs;
        if tail <= 0.0 {
            return self.peak_gain;
        }
        let u = (t - self.attack_secs) / tail;
        self.peak_gain + (self.tail_gain - self.peak_gain) * u
    }

    /// Oscillator frequency at `t`, sweeping exponentially from `start_hz` to `end_hz`.
    pub fn frequency_at(&self, t: f64, duration_secs: f64) -> f64 {
        if duration_secs <= 0.0 {
            return self.start_hz;
        }
        let u = (t / duration_secs).clamp(0.0, 1.0);
        self.start_hz * (self.end_hz / self.start_hz).powf(u)
    }

    /// Interleaved PCM for the whole tone, every channel carrying the same signal.
    pub fn synthesize(&self, duration_secs: f64) -> Vec<f32> {
        let sr = f64::from(self.sample_rate);
        let frames = (duration_secs.max(0.0) * sr).round() as usize;
        let channels = usize::from(self.channels);
        let mut out = Vec::with_capacity(frames * channels);
        let mut phase = 0.0f64;
        for i in 0..frames {
            let t = i as f64 / sr;
            let s = (triangle(phase) * self.gain_at(t, duration_secs)) as f32;
            out.extend(std::iter::repeat_n(s, channels));
            phase = (phase + self.frequency_at(t, duration_secs) / sr).fract();
        }
        out
    }
}

/// Unit triangle wave over one period `phase in [0, 1)`, starting at 0 and rising.
fn triangle(phase: f64) -> f64 {
    let p = (phase + 0.75).fract();
    4.0 * (p - 0.5).abs() - 1.0
}

/// Handle to a synthesized tone spooled to a raw `f32le` file for the encoder to mux.
///
/// The spool file exists only between `start` and `stop`; dropping the handle stops it.
#[derive(Debug)]
pub struct ToneSource {
    spec: ToneSpec,
    spool: Option<PathBuf>,
}

impl ToneSource {
    pub fn new(spec: ToneSpec) -> Self {
        Self { spec, spool: None }
    }

    pub fn spec(&self) -> &ToneSpec {
        &self.spec
    }

    /// Synthesize `duration_secs` of tone into the system temp dir.
    pub fn start(&mut self, duration_secs: f64) -> NewsreelResult<AudioInputConfig> {
        self.start_in(&std::env::temp_dir(), duration_secs)
    }

    #[tracing::instrument(skip(self), fields(sample_rate = self.spec.sample_rate))]
    pub fn start_in(&mut self, dir: &Path, duration_secs: f64) -> NewsreelResult<AudioInputConfig> {
        self.spec.validate()?;
        self.stop();

        let samples = self.spec.synthesize(duration_secs);
        let path = dir.join(format!(
            "newsreel_tone_{}_{}_{}.f32le",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            SPOOL_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        write_f32le_file(&samples, &path)?;
        tracing::debug!(path = %path.display(), samples = samples.len(), "tone spooled");
        self.spool = Some(path.clone());

        Ok(AudioInputConfig {
            path,
            sample_rate: self.spec.sample_rate,
            channels: self.spec.channels,
        })
    }

    /// Release the spooled track. Idempotent.
    pub fn stop(&mut self) {
        if let Some(path) = self.spool.take() {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "tone released"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!(path = %path.display(), "tone spool already gone");
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove tone spool");
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.spool.is_some()
    }

    pub fn spool_path(&self) -> Option<&Path> {
        self.spool.as_deref()
    }
}

impl Drop for ToneSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Write interleaved `f32` PCM samples to a raw little-endian file.
pub(crate) fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> NewsreelResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            NewsreelError::capture_setup(format!(
                "failed to create tone directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        NewsreelError::capture_setup(format!(
            "failed to write tone file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/tone.rs"]
mod tests;
