use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::foundation::math::Fnv1a64;
use crate::render::surface::FrameRGBA;

/// Configuration provided to a [`RecordingSink`] when a recording starts.
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    /// Optional raw PCM track to mux under the video.
    pub audio: Option<AudioInputConfig>,
    /// Artifact base name without extension, see [`file_stem_for`].
    pub file_stem: String,
}

/// Raw PCM audio input for sinks that encode sound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioInputConfig {
    /// Path to interleaved `f32le` PCM data.
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Finished recording.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoArtifact {
    /// Encoded container bytes, never empty.
    pub bytes: Vec<u8>,
    pub mime: String,
    /// `<story id>.<ext>`, suitable as a download name.
    pub file_name: String,
    /// Where the artifact can be viewed: `file://` for files on disk, `memory://` otherwise.
    pub url: String,
    pub path: Option<PathBuf>,
}

impl std::fmt::Debug for VideoArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoArtifact")
            .field("bytes", &self.bytes.len())
            .field("mime", &self.mime)
            .field("file_name", &self.file_name)
            .field("url", &self.url)
            .field("path", &self.path)
            .finish()
    }
}

/// Consumer of rendered frames that produces a [`VideoArtifact`].
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order between one
/// `begin` and its `end`. `abort` releases everything without producing an artifact and may be
/// called at any point, including more than once.
pub trait RecordingSink: Send {
    fn begin(&mut self, cfg: SinkConfig) -> NewsreelResult<()>;
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()>;
    fn end(&mut self) -> NewsreelResult<VideoArtifact>;
    fn abort(&mut self);
}

/// File-name-safe stem for a story id: ASCII alphanumerics, `-` and `_` kept, anything else
/// replaced with `_`.
pub fn file_stem_for(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "briefing".to_owned()
    } else {
        stem
    }
}

/// What a [`DigestSink`] observed. Shared so callers can inspect it after handing the sink off.
#[derive(Debug, Default, Clone)]
pub struct DigestLog {
    pub config: Option<(u32, u32, Fps)>,
    pub audio: Option<AudioInputConfig>,
    /// Frame indices with the FNV-1a digest of their size and bytes, in push order.
    pub frames: Vec<(FrameIndex, u64)>,
    pub ended: bool,
    pub aborted: bool,
}

/// In-memory sink that fingerprints frames instead of encoding them.
///
/// The artifact payload is the frame digests as little-endian `u64`s.
#[derive(Debug, Default)]
pub struct DigestSink {
    log: Arc<Mutex<DigestLog>>,
    stem: Option<String>,
    active: bool,
}

impl DigestSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Arc<Mutex<DigestLog>> {
        Arc::clone(&self.log)
    }

    fn with_log<R>(&self, f: impl FnOnce(&mut DigestLog) -> R) -> NewsreelResult<R> {
        let mut guard = self
            .log
            .lock()
            .map_err(|_| NewsreelError::encode("digest log lock poisoned"))?;
        Ok(f(&mut guard))
    }
}

impl RecordingSink for DigestSink {
    fn begin(&mut self, cfg: SinkConfig) -> NewsreelResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(NewsreelError::validation(
                "digest sink width/height must be non-zero",
            ));
        }
        self.with_log(|log| {
            *log = DigestLog {
                config: Some((cfg.width, cfg.height, cfg.fps)),
                audio: cfg.audio.clone(),
                ..Default::default()
            };
        })?;
        self.stem = Some(cfg.file_stem);
        self.active = true;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()> {
        if !self.active {
            return Err(NewsreelError::encode("digest sink not started"));
        }
        self.with_log(|log| {
            if let Some((w, h, _)) = log.config
                && (frame.width != w || frame.height != h)
            {
                return Err(NewsreelError::validation(format!(
                    "frame size mismatch: got {}x{}, expected {w}x{h}",
                    frame.width, frame.height
                )));
            }
            if let Some((last, _)) = log.frames.last()
                && idx.0 <= last.0
            {
                return Err(NewsreelError::encode(
                    "digest sink received out-of-order frame index",
                ));
            }
            let mut hasher = Fnv1a64::new_default();
            hasher.write_u64(u64::from(frame.width));
            hasher.write_u64(u64::from(frame.height));
            hasher.write_bytes(&frame.data);
            log.frames.push((idx, hasher.finish()));
            Ok(())
        })?
    }

    fn end(&mut self) -> NewsreelResult<VideoArtifact> {
        if !self.active {
            return Err(NewsreelError::encode("digest sink not started"));
        }
        self.active = false;
        let bytes = self.with_log(|log| {
            log.ended = true;
            log.frames
                .iter()
                .flat_map(|(_, d)| d.to_le_bytes())
                .collect::<Vec<u8>>()
        })?;
        if bytes.is_empty() {
            return Err(NewsreelError::encode("no frames were recorded"));
        }
        let stem = self.stem.take().unwrap_or_else(|| "briefing".to_owned());
        Ok(VideoArtifact {
            bytes,
            mime: "application/x-newsreel-digest".to_owned(),
            file_name: format!("{stem}.digest"),
            url: format!("memory://{stem}.digest"),
            path: None,
        })
    }

    fn abort(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let _ = self.with_log(|log| log.aborted = true);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
