use crate::encode::sink::VideoArtifact;
use crate::foundation::core::FrameIndex;

pub const IDLE_MESSAGE: &str = "Select a headline to create the briefing video.";
pub const CAPTURING_MESSAGE: &str = "Rendering video intelligence package…";
pub const ENCODING_MESSAGE: &str = "Encoding video payload…";
pub const READY_MESSAGE: &str = "Video ready: download or preview below.";
pub const FAILED_MESSAGE: &str = "Could not generate the video. Please try again.";

/// Lifecycle of one briefing recording.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    /// `frame` is the last frame pushed to the sink.
    Capturing {
        frame: FrameIndex,
        progress: u8,
    },
    Encoding,
    Ready {
        artifact: VideoArtifact,
    },
    Error {
        message: String,
    },
}

impl CaptureState {
    pub fn status(&self) -> CaptureStatus {
        match self {
            Self::Idle => CaptureStatus::Idle,
            Self::Capturing { .. } => CaptureStatus::Capturing,
            Self::Encoding => CaptureStatus::Encoding,
            Self::Ready { .. } => CaptureStatus::Ready,
            Self::Error { .. } => CaptureStatus::Error,
        }
    }

    /// The user-facing status line.
    pub fn message(&self) -> &str {
        match self {
            Self::Idle => IDLE_MESSAGE,
            Self::Capturing { .. } => CAPTURING_MESSAGE,
            Self::Encoding => ENCODING_MESSAGE,
            Self::Ready { .. } => READY_MESSAGE,
            Self::Error { message } => message,
        }
    }

    /// A session is open and still producing frames or flushing.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Capturing { .. } | Self::Encoding)
    }

    pub fn artifact(&self) -> Option<&VideoArtifact> {
        match self {
            Self::Ready { artifact } => Some(artifact),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    Idle,
    Capturing,
    Encoding,
    Ready,
    Error,
}

impl std::fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Encoding => "encoding",
            Self::Ready => "ready",
            Self::Error => "error",
        })
    }
}

/// Notification delivered to pipeline subscribers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureEvent {
    State(CaptureStatus),
    Progress(u8),
}

/// Capture progress after pushing frame `frame` of `total_frames`: integer percent, floored and
/// capped at 99 until the artifact is ready.
pub fn progress_percent(frame: u64, total_frames: u64) -> u8 {
    if total_frames == 0 {
        return 99;
    }
    let pct = u128::from(frame) * 100 / u128::from(total_frames);
    pct.min(99) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/capture/state.rs"]
mod tests;
