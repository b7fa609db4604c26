use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use crate::encode::sink::{RecordingSink, SinkConfig, VideoArtifact};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::surface::FrameRGBA;

/// Output container and codec pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Container {
    /// VP9 video with Opus audio.
    #[default]
    Webm,
    /// H.264 video with AAC audio.
    Mp4,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Webm => "video/webm",
            Self::Mp4 => "video/mp4",
        }
    }
}

impl std::str::FromStr for Container {
    type Err = NewsreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webm" => Ok(Self::Webm),
            "mp4" => Ok(Self::Mp4),
            other => Err(NewsreelError::validation(format!(
                "unknown container '{other}' (expected webm or mp4)"
            ))),
        }
    }
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Video bitrate of a recorded briefing, in bits per second.
pub const DEFAULT_VIDEO_BITRATE: u32 = 5_500_000;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Directory the artifact is written into, as `<file stem>.<ext>`.
    pub out_dir: PathBuf,
    pub container: Container,
    /// Overwrite output file if it already exists.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    pub video_bitrate: u32,
}

impl FfmpegSinkOpts {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            container: Container::default(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
            video_bitrate: DEFAULT_VIDEO_BITRATE,
        }
    }

    pub fn output_path(&self, file_stem: &str) -> PathBuf {
        self.out_dir
            .join(format!("{file_stem}.{}", self.container.extension()))
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Audio is optional and provided through `SinkConfig.audio`. A sink dropped before `end` kills the
/// encoder and removes the partial output.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    out_path: Option<PathBuf>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            out_path: None,
            last_idx: None,
        }
    }

    fn build_command(&self, cfg: &SinkConfig, out_path: &Path) -> NewsreelResult<Command> {
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if self.opts.overwrite { "-y" } else { "-n" });

        // Input: raw premultiplied RGBA8 frames, flattened before they reach stdin.
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        if let Some(audio) = cfg.audio.as_ref() {
            if audio.sample_rate == 0 || audio.channels == 0 {
                return Err(NewsreelError::validation(
                    "audio sample_rate and channels must be non-zero when audio is enabled",
                ));
            }
            cmd.args([
                "-f",
                "f32le",
                "-ar",
                &audio.sample_rate.to_string(),
                "-ac",
                &audio.channels.to_string(),
                "-i",
            ])
            .arg(&audio.path);
        }

        let bitrate = self.opts.video_bitrate.to_string();
        match self.opts.container {
            Container::Webm => {
                cmd.args([
                    "-c:v",
                    "libvpx-vp9",
                    "-b:v",
                    &bitrate,
                    "-pix_fmt",
                    "yuv420p",
                    "-deadline",
                    "realtime",
                    "-cpu-used",
                    "8",
                ]);
            }
            Container::Mp4 => {
                cmd.args([
                    "-c:v",
                    "libx264",
                    "-b:v",
                    &bitrate,
                    "-pix_fmt",
                    "yuv420p",
                    "-movflags",
                    "+faststart",
                ]);
            }
        }
        if cfg.audio.is_some() {
            let codec = match self.opts.container {
                Container::Webm => "libopus",
                Container::Mp4 => "aac",
            };
            cmd.args(["-c:a", codec, "-shortest"]);
        } else {
            cmd.arg("-an");
        }
        cmd.arg(out_path);
        Ok(cmd)
    }

    fn join_stderr(&mut self) -> NewsreelResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| NewsreelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| NewsreelError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    /// Close stdin, wait for ffmpeg and read back the output. The child and output path stay on
    /// `self` until the artifact is built, so a failure here can still be aborted.
    fn finish_encoding(&mut self) -> NewsreelResult<VideoArtifact> {
        drop(self.stdin.take());
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| NewsreelError::encode("ffmpeg sink not started"))?;
        let status = child.wait().map_err(|e| {
            NewsreelError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        self.child = None;
        let stderr_bytes = self.join_stderr()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(NewsreelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let (Some(cfg), Some(out_path)) = (self.cfg.as_ref(), self.out_path.as_ref()) else {
            return Err(NewsreelError::encode("ffmpeg sink lost its configuration"));
        };
        let bytes = std::fs::read(out_path).map_err(|e| {
            NewsreelError::encode(format!(
                "failed to read encoded output '{}': {e}",
                out_path.display()
            ))
        })?;
        if bytes.is_empty() {
            return Err(NewsreelError::encode("ffmpeg produced an empty file"));
        }
        let abs = std::fs::canonicalize(out_path).map_err(|e| {
            NewsreelError::encode(format!("failed to resolve '{}': {e}", out_path.display()))
        })?;
        let url = url::Url::from_file_path(&abs)
            .map_err(|_| {
                NewsreelError::encode(format!("'{}' is not a valid file URL", abs.display()))
            })?
            .to_string();
        let file_name = format!("{}.{}", cfg.file_stem, self.opts.container.extension());

        self.cfg = None;
        self.out_path = None;
        Ok(VideoArtifact {
            bytes,
            mime: self.opts.container.mime().to_owned(),
            file_name,
            url,
            path: Some(abs),
        })
    }
}

impl RecordingSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> NewsreelResult<()> {
        if self.child.is_some() {
            return Err(NewsreelError::encode("ffmpeg sink already recording"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(NewsreelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(NewsreelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        let out_path = self.opts.output_path(&cfg.file_stem);
        ensure_parent_dir(&out_path)?;
        if !self.opts.overwrite && out_path.exists() {
            return Err(NewsreelError::validation(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(NewsreelError::capture_unsupported(
                "ffmpeg is required for video recording, but was not found on PATH",
            ));
        }

        let mut cmd = self.build_command(&cfg, &out_path)?;
        let mut child = cmd.spawn().map_err(|e| {
            NewsreelError::capture_setup(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| NewsreelError::capture_setup("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| NewsreelError::capture_setup("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            path = %out_path.display(),
            container = %self.opts.container,
            audio = cfg.audio.is_some(),
            "ffmpeg recording started"
        );
        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.out_path = Some(out_path);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NewsreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| NewsreelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(NewsreelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(NewsreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if !frame.premultiplied {
            return Err(NewsreelError::validation(
                "ffmpeg sink expects premultiplied frames",
            ));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(NewsreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(NewsreelError::encode("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            NewsreelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> NewsreelResult<VideoArtifact> {
        let out = self.finish_encoding();
        if out.is_err() {
            // Kills a child that could not be waited on and removes any partial output.
            self.abort();
        }
        out
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("ffmpeg recording aborted");
        }
        let _ = self.join_stderr();
        self.cfg = None;
        if let Some(path) = self.out_path.take()
            && let Err(e) = std::fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output");
        }
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        if self.child.is_some() {
            self.abort();
        }
    }
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i`; rational as `num/den`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> NewsreelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(NewsreelError::validation(
            "flatten_premul_over_bg_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> NewsreelResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
