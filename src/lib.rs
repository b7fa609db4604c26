//! newsreel turns recent AI tooling headlines into ten second video briefings.
//!
//! The pipeline is:
//!
//! - Fetch and curate stories with a [`NewsGateway`] (or serve them over HTTP, see [`server`])
//! - Pick one with [`SelectionState`]
//! - Record it with a [`CapturePipeline`]: every tick the [`SceneRenderer`] lays out one frame, a
//!   [`DrawingSurface`] rasterizes it and a [`RecordingSink`] encodes it alongside a synthesized
//!   background tone
#![forbid(unsafe_code)]

mod foundation;

pub mod audio;
pub mod capture;
pub mod encode;
pub mod news;
pub mod render;
pub mod server;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{NewsreelError, NewsreelResult};

pub use crate::audio::tone::{ToneSource, ToneSpec};
pub use crate::capture::clock::{FrameClock, ImmediateClock, PacedClock};
pub use crate::capture::host::{CaptureSupport, FfmpegHost, MediaHost};
pub use crate::capture::session::{CapturePipeline, CaptureSession, CaptureSettings};
pub use crate::capture::state::{CaptureEvent, CaptureState, CaptureStatus};
pub use crate::encode::ffmpeg::{Container, FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{
    AudioInputConfig, DigestLog, DigestSink, RecordingSink, SinkConfig, VideoArtifact,
};
pub use crate::news::gateway::{CachedGateway, GatewayConfig, NewsGateway, curate};
pub use crate::news::selection::SelectionState;
pub use crate::news::story::{Cadence, RawStory, SearchResponse, Story, normalize_story};
pub use crate::render::command::{DrawCmd, FontWeight, TextStyle};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::scene::{Scene, SceneRenderer};
pub use crate::render::surface::{DrawingSurface, FrameRGBA};
pub use crate::render::text::{FontConfig, FontSet};
pub use crate::render::wrap::{ApproxMeasure, TextMeasure};
