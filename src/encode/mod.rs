//! Recording sinks.
//!
//! Sinks consume rendered frames in timeline order and produce a downloadable
//! [`VideoArtifact`](sink::VideoArtifact).

/// `ffmpeg`-based recording (WebM or MP4 via the system `ffmpeg`).
pub mod ffmpeg;
/// Sink trait, artifact type and the in-memory digest sink.
pub mod sink;
