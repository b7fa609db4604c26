use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
use crate::encode::sink::RecordingSink;
use crate::foundation::core::Canvas;
use crate::foundation::error::NewsreelResult;
use crate::render::cpu::CpuSurface;
use crate::render::surface::DrawingSurface;
use crate::render::text::{FontConfig, FontSet};

/// Which capture capabilities a host offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureSupport {
    pub surface: bool,
    pub recorder: bool,
    pub audio: bool,
}

impl CaptureSupport {
    pub const FULL: Self = Self {
        surface: true,
        recorder: true,
        audio: true,
    };

    /// Name of the first missing capability, if any.
    pub fn missing(&self) -> Option<&'static str> {
        if !self.surface {
            Some("drawing surface")
        } else if !self.recorder {
            Some("video recorder")
        } else if !self.audio {
            Some("audio output")
        } else {
            None
        }
    }
}

/// Factory for the media resources one capture session owns.
pub trait MediaHost {
    type Surface: DrawingSurface;
    type Sink: RecordingSink;

    fn capture_support(&self) -> CaptureSupport;
    fn create_surface(&mut self, canvas: Canvas) -> NewsreelResult<Self::Surface>;
    fn create_sink(&mut self) -> NewsreelResult<Self::Sink>;
}

/// Production host: `vello_cpu` surfaces and the system `ffmpeg`.
#[derive(Debug)]
pub struct FfmpegHost {
    fonts: FontConfig,
    loaded: Option<FontSet>,
    sink_opts: FfmpegSinkOpts,
    ffmpeg_available: bool,
}

impl FfmpegHost {
    /// Probes `PATH` for `ffmpeg` once; fonts load on the first surface.
    pub fn new(fonts: FontConfig, sink_opts: FfmpegSinkOpts) -> Self {
        let ffmpeg_available = is_ffmpeg_on_path();
        if !ffmpeg_available {
            tracing::warn!("ffmpeg not found on PATH; video recording unavailable");
        }
        Self {
            fonts,
            loaded: None,
            sink_opts,
            ffmpeg_available,
        }
    }

    pub fn sink_opts(&self) -> &FfmpegSinkOpts {
        &self.sink_opts
    }
}

impl MediaHost for FfmpegHost {
    type Surface = CpuSurface;
    type Sink = FfmpegSink;

    fn capture_support(&self) -> CaptureSupport {
        CaptureSupport {
            surface: true,
            recorder: self.ffmpeg_available,
            audio: self.ffmpeg_available,
        }
    }

    fn create_surface(&mut self, canvas: Canvas) -> NewsreelResult<CpuSurface> {
        let fonts = match self.loaded.take() {
            Some(f) => f,
            None => self.fonts.load()?,
        };
        let surface = CpuSurface::new(canvas, &fonts);
        self.loaded = Some(fonts);
        surface
    }

    fn create_sink(&mut self) -> NewsreelResult<FfmpegSink> {
        Ok(FfmpegSink::new(self.sink_opts.clone()))
    }
}
