use crate::audio::tone::{ToneSource, ToneSpec};
use crate::capture::clock::FrameClock;
use crate::capture::host::MediaHost;
use crate::capture::state::{
    CaptureEvent, CaptureState, CaptureStatus, FAILED_MESSAGE, progress_percent,
};
use crate::encode::sink::{RecordingSink, SinkConfig, VideoArtifact, file_stem_for};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::news::story::Story;
use crate::render::scene::SceneRenderer;
use crate::render::surface::DrawingSurface;

pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_DURATION_SECS: f64 = 10.0;

/// Shape of every recording made by a [`CapturePipeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureSettings {
    pub canvas: Canvas,
    pub fps: Fps,
    pub duration_secs: f64,
    pub tone: ToneSpec,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            canvas: Canvas::BRIEFING,
            fps: Fps {
                num: DEFAULT_FPS,
                den: 1,
            },
            duration_secs: DEFAULT_DURATION_SECS,
            tone: ToneSpec::default(),
        }
    }
}

impl CaptureSettings {
    pub fn validate(&self) -> NewsreelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(NewsreelError::validation("canvas width/height must be > 0"));
        }
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return Err(NewsreelError::validation("duration_secs must be finite and > 0"));
        }
        if self.total_frames() == 0 {
            return Err(NewsreelError::validation(
                "duration_secs is shorter than one frame",
            ));
        }
        self.tone.validate()
    }

    /// Frames scheduled per recording (`duration × fps`, floored).
    pub fn total_frames(&self) -> u64 {
        self.fps.secs_to_frames_floor(self.duration_secs)
    }
}

/// Resources of one in-flight recording: the surface, the sink and the tone.
///
/// Dropping or releasing the session aborts the sink and stops the tone; `finish` hands the sink's
/// artifact back instead.
pub struct CaptureSession<S: DrawingSurface, K: RecordingSink> {
    story: Story,
    renderer: SceneRenderer,
    surface: S,
    sink: Option<K>,
    tone: ToneSource,
    next_frame: u64,
    total_frames: u64,
}

impl<S: DrawingSurface, K: RecordingSink> CaptureSession<S, K> {
    /// Create the surface, start the tone and open the sink, unwinding on any failure.
    pub fn open<H>(host: &mut H, story: &Story, settings: &CaptureSettings) -> NewsreelResult<Self>
    where
        H: MediaHost<Surface = S, Sink = K>,
    {
        let surface = host.create_surface(settings.canvas)?;
        let mut tone = ToneSource::new(settings.tone);
        let audio = tone.start(settings.duration_secs)?;
        let mut sink = host.create_sink()?;
        if let Err(e) = sink.begin(SinkConfig {
            width: settings.canvas.width,
            height: settings.canvas.height,
            fps: settings.fps,
            audio: Some(audio),
            file_stem: file_stem_for(&story.id),
        }) {
            sink.abort();
            return Err(e);
        }

        Ok(Self {
            story: story.clone(),
            renderer: SceneRenderer::new(settings.canvas),
            surface,
            sink: Some(sink),
            tone,
            next_frame: 0,
            total_frames: settings.total_frames(),
        })
    }

    pub fn story(&self) -> &Story {
        &self.story
    }

    pub fn next_frame(&self) -> FrameIndex {
        FrameIndex(self.next_frame)
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// All frames `0..=total_frames` have been pushed.
    pub fn is_complete(&self) -> bool {
        self.next_frame > self.total_frames
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn tone(&self) -> &ToneSource {
        &self.tone
    }

    /// Draw the next frame and push it to the sink.
    pub fn capture_next(&mut self) -> NewsreelResult<FrameIndex> {
        if self.is_complete() {
            return Err(NewsreelError::render("all frames already captured"));
        }
        let idx = FrameIndex(self.next_frame);
        let cmds = self
            .renderer
            .render_frame(&self.story, idx, self.total_frames, &mut self.surface);
        self.surface.paint(&cmds)?;
        let sink = self
            .sink
            .as_mut()
            .ok_or_else(|| NewsreelError::encode("recording already closed"))?;
        sink.push_frame(idx, self.surface.frame())?;
        self.next_frame += 1;
        Ok(idx)
    }

    /// Stop the tone and flush the sink into its artifact.
    pub fn finish(&mut self) -> NewsreelResult<VideoArtifact> {
        self.tone.stop();
        let mut sink = self
            .sink
            .take()
            .ok_or_else(|| NewsreelError::encode("recording already closed"))?;
        let out = sink.end();
        if out.is_err() {
            sink.abort();
        }
        out
    }

    /// Abort the sink and stop the tone. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut sink) = self.sink.take() {
            sink.abort();
        }
        self.tone.stop();
    }
}

impl<S: DrawingSurface, K: RecordingSink> Drop for CaptureSession<S, K> {
    fn drop(&mut self) {
        self.release();
    }
}

type Observer = Box<dyn FnMut(&CaptureEvent) + Send>;

/// Drives briefing recordings: one session at a time, advanced by [`CapturePipeline::tick`].
///
/// Subscribers see every status change and every progress change. Dropping the pipeline tears down
/// any in-flight session.
pub struct CapturePipeline<H: MediaHost> {
    host: H,
    settings: CaptureSettings,
    state: CaptureState,
    progress: u8,
    session: Option<CaptureSession<H::Surface, H::Sink>>,
    observers: Vec<Observer>,
    last_error: Option<String>,
}

impl<H: MediaHost> CapturePipeline<H> {
    pub fn new(host: H, settings: CaptureSettings) -> NewsreelResult<Self> {
        settings.validate()?;
        Ok(Self {
            host,
            settings,
            state: CaptureState::Idle,
            progress: 0,
            session: None,
            observers: Vec::new(),
            last_error: None,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn status(&self) -> CaptureStatus {
        self.state.status()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn status_message(&self) -> &str {
        self.state.message()
    }

    /// Detail of the most recent failure, for logs and diagnostics.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn session(&self) -> Option<&CaptureSession<H::Surface, H::Sink>> {
        self.session.as_ref()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&CaptureEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Start recording `story`, cancelling any recording in flight. `None` does nothing.
    #[tracing::instrument(skip(self, story), fields(story = story.map(|s| s.id.as_str())))]
    pub fn generate(&mut self, story: Option<&Story>) -> NewsreelResult<()> {
        let Some(story) = story else {
            return Ok(());
        };

        if self.session.is_some() {
            self.cancel_session();
            tracing::info!("cancelled in-flight capture");
        }
        self.last_error = None;

        if let Some(missing) = self.host.capture_support().missing() {
            let err = NewsreelError::capture_unsupported(format!(
                "{missing} is not available on this host"
            ));
            self.last_error = Some(err.to_string());
            tracing::warn!(%missing, "capture unsupported");
            self.set_state(CaptureState::Error {
                message: format!("Video capture is not supported: missing {missing}."),
            });
            return Err(err);
        }

        let session = match CaptureSession::open(&mut self.host, story, &self.settings) {
            Ok(s) => s,
            Err(e) => return Err(self.fail(e)),
        };
        tracing::info!(
            total_frames = session.total_frames(),
            fps = self.settings.fps.as_f64(),
            "capture started"
        );
        self.session = Some(session);
        self.progress = 0;
        self.emit(CaptureEvent::Progress(0));
        self.set_state(CaptureState::Capturing {
            frame: FrameIndex(0),
            progress: 0,
        });
        Ok(())
    }

    /// Advance the recording by one animation tick. Does nothing unless capturing.
    pub fn tick(&mut self) -> NewsreelResult<()> {
        if !matches!(self.state, CaptureState::Capturing { .. }) {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        let captured = session.capture_next();
        let total = session.total_frames();
        let complete = session.is_complete();
        let idx = match captured {
            Ok(idx) => idx,
            Err(e) => return Err(self.fail(e)),
        };

        let pct = progress_percent(idx.0, total);
        self.set_progress(pct);
        self.set_state(CaptureState::Capturing {
            frame: idx,
            progress: pct,
        });

        if complete {
            self.set_state(CaptureState::Encoding);
            self.encode()?;
        }
        Ok(())
    }

    fn encode(&mut self) -> NewsreelResult<()> {
        let Some(mut session) = self.session.take() else {
            return Err(self.fail(NewsreelError::encode("no session to encode")));
        };
        match session.finish() {
            Ok(artifact) => {
                tracing::info!(
                    file = %artifact.file_name,
                    bytes = artifact.bytes.len(),
                    url = %artifact.url,
                    "capture ready"
                );
                self.set_progress(100);
                self.set_state(CaptureState::Ready { artifact });
                Ok(())
            }
            Err(e) => {
                drop(session);
                Err(self.fail(e))
            }
        }
    }

    /// Tick on `clock` until the recording settles, returning the artifact.
    pub fn run_to_completion(
        &mut self,
        clock: &mut dyn FrameClock,
    ) -> NewsreelResult<&VideoArtifact> {
        while matches!(self.state, CaptureState::Capturing { .. }) {
            clock.wait_next();
            self.tick()?;
        }
        match &self.state {
            CaptureState::Ready { artifact } => Ok(artifact),
            CaptureState::Error { message } => Err(NewsreelError::encode(
                self.last_error.clone().unwrap_or_else(|| message.clone()),
            )),
            _ => Err(NewsreelError::validation("no capture in progress")),
        }
    }

    /// Stop any in-flight recording and release its resources. Idempotent.
    pub fn teardown(&mut self) {
        if self.session.is_some() {
            self.cancel_session();
            tracing::info!("capture torn down");
            self.set_state(CaptureState::Idle);
        }
    }

    fn cancel_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }

    fn fail(&mut self, err: NewsreelError) -> NewsreelError {
        self.cancel_session();
        tracing::error!(error = %err, "video generation failed");
        self.last_error = Some(err.to_string());
        self.set_state(CaptureState::Error {
            message: FAILED_MESSAGE.to_owned(),
        });
        err
    }

    fn set_state(&mut self, next: CaptureState) {
        let changed = next.status() != self.state.status();
        self.state = next;
        if changed {
            self.emit(CaptureEvent::State(self.state.status()));
        }
    }

    fn set_progress(&mut self, pct: u8) {
        if pct != self.progress {
            self.progress = pct;
            self.emit(CaptureEvent::Progress(pct));
        }
    }

    fn emit(&mut self, event: CaptureEvent) {
        for observer in &mut self.observers {
            observer(&event);
        }
    }
}

impl<H: MediaHost> Drop for CapturePipeline<H> {
    fn drop(&mut self) {
        if self.session.is_some() {
            self.cancel_session();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/session.rs"]
mod tests;
