//! Three-scene briefing layout.
//!
//! The timeline is split into three equal scenes (title, key insights, next steps) drawn over a
//! persistent header and an animated background. Everything here is a pure function of the story
//! and the frame index; rasterization happens in a [`DrawingSurface`](crate::DrawingSurface).

use crate::foundation::core::{Canvas, FrameIndex, Point, Rect, Rgba8, Vec2};
use crate::news::story::Story;
use crate::render::command::{DrawCmd, TextStyle};
use crate::render::wrap::{TextMeasure, fit_line, wrap_text};

pub const SCENE_COUNT: u64 = 3;

const MARGIN_X: f64 = 72.0;
const BRAND_TEXT: &str = "AI Briefing Studio";

const BG_FROM: Rgba8 = Rgba8::rgb(0x06, 0x07, 0x13);
const BG_TO: Rgba8 = Rgba8::rgb(0x1a, 0x1d, 0x3a);
const GRID_COLOR: Rgba8 = Rgba8::rgb(0x6f, 0x7c, 0xff);
const GRID_OPACITY: f32 = 0.08;
const GRID_SPACING: u64 = 80;
const GRID_SPEED_X: u64 = 4;
const GRID_SPEED_Y: u64 = 2;
const GLOW_RADII: Vec2 = Vec2::new(220.0, 160.0);
const GLOW_BLUR_PX: f64 = 120.0;

const CALLOUTS: [&str; 2] = [
    "Add to your AI stack evaluation board.",
    "Share with your team for experimentation.",
];
const CALLOUT_FALLBACK: &str = "Track community traction over the next 48h.";

/// One of the three fixed narrative segments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scene {
    Title,
    Insights,
    NextSteps,
}

impl Scene {
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Title,
            1 => Self::Insights,
            _ => Self::NextSteps,
        }
    }

    /// Minimum opacity of the scene's content at the very start of its transition.
    pub fn opacity_floor(self) -> f32 {
        match self {
            Self::Title => 0.2,
            Self::Insights | Self::NextSteps => 0.3,
        }
    }
}

/// `floor(3 * frame / total)`, clamped to the last scene for the closing tick (`frame == total`).
pub fn scene_index(frame: FrameIndex, total_frames: u64) -> usize {
    if total_frames == 0 {
        return 0;
    }
    let idx = u128::from(frame.0) * u128::from(SCENE_COUNT) / u128::from(total_frames);
    idx.min(u128::from(SCENE_COUNT - 1)) as usize
}

/// Fractional progress through the current scene, in `[0, 1)`.
pub fn scene_progress(frame: FrameIndex, total_frames: u64) -> f64 {
    if total_frames == 0 {
        return 0.0;
    }
    // fract(3 * frame / total), kept in integers so scene boundaries land exactly on 0.
    let rem = (u128::from(frame.0) * u128::from(SCENE_COUNT)) % u128::from(total_frames);
    rem as f64 / total_frames as f64
}

/// Content opacity ramp: intra-scene progress lifted by `floor`, clamped to `[floor, 1]`.
pub fn transition_opacity(frame: FrameIndex, total_frames: u64, floor: f32) -> f32 {
    let floor = floor.clamp(0.0, 1.0);
    (scene_progress(frame, total_frames) as f32 + floor).clamp(floor, 1.0)
}

/// Builds the draw commands of one frame.
#[derive(Clone, Copy, Debug)]
pub struct SceneRenderer {
    canvas: Canvas,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new(Canvas::BRIEFING)
    }
}

impl SceneRenderer {
    pub fn new(canvas: Canvas) -> Self {
        Self { canvas }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Paint frame `frame` of a `total_frames`-long briefing for `story`.
    ///
    /// `measure` supplies text widths for word wrapping; pass the target surface so wrapping
    /// matches what gets rasterized.
    pub fn render_frame(
        &self,
        story: &Story,
        frame: FrameIndex,
        total_frames: u64,
        measure: &mut dyn TextMeasure,
    ) -> Vec<DrawCmd> {
        let mut cmds = Vec::with_capacity(64);
        self.background(frame, &mut cmds);
        self.header(story, &mut cmds);

        let scene = Scene::from_index(scene_index(frame, total_frames));
        let opacity = transition_opacity(frame, total_frames, scene.opacity_floor());
        cmds.push(DrawCmd::PushOpacity(opacity));
        match scene {
            Scene::Title => self.title_scene(story, measure, &mut cmds),
            Scene::Insights => self.insights_scene(story, measure, &mut cmds),
            Scene::NextSteps => self.next_steps_scene(story, measure, &mut cmds),
        }
        cmds.push(DrawCmd::PopOpacity);
        cmds
    }

    fn background(&self, frame: FrameIndex, cmds: &mut Vec<DrawCmd>) {
        let (w, h) = (self.canvas.width_f64(), self.canvas.height_f64());
        cmds.push(DrawCmd::LinearGradient {
            start: Point::ORIGIN,
            end: Point::new(w, h),
            from: BG_FROM,
            to: BG_TO,
        });

        cmds.push(DrawCmd::PushOpacity(GRID_OPACITY));
        let spacing = GRID_SPACING as f64;
        let mut x = ((frame.0 * GRID_SPEED_X) % GRID_SPACING) as f64;
        while x < w {
            cmds.push(DrawCmd::FillRect {
                rect: Rect::new(x - 0.5, 0.0, x + 0.5, h),
                color: GRID_COLOR,
            });
            x += spacing;
        }
        let mut y = h - ((frame.0 * GRID_SPEED_Y) % GRID_SPACING) as f64;
        while y > 0.0 {
            cmds.push(DrawCmd::FillRect {
                rect: Rect::new(0.0, y - 0.5, w, y + 0.5),
                color: GRID_COLOR,
            });
            y -= spacing;
        }
        cmds.push(DrawCmd::PopOpacity);

        cmds.push(DrawCmd::FillEllipse {
            center: Point::new(w * 0.65, h * 0.35),
            radii: GLOW_RADII,
            color: Rgba8::rgba(148, 169, 255, 0.25),
            blur_px: GLOW_BLUR_PX,
        });
    }

    fn header(&self, story: &Story, cmds: &mut Vec<DrawCmd>) {
        cmds.push(DrawCmd::Text {
            text: BRAND_TEXT.to_owned(),
            origin: Point::new(MARGIN_X, 120.0),
            style: TextStyle::regular(56.0),
            color: Rgba8::rgba(255, 255, 255, 0.82),
        });
        cmds.push(DrawCmd::Text {
            text: story.posted_at.format("%b %-d, %Y, %H:%M UTC").to_string(),
            origin: Point::new(MARGIN_X, 170.0),
            style: TextStyle::regular(28.0),
            color: Rgba8::rgba(124, 160, 255, 0.8),
        });
    }

    fn title_scene(&self, story: &Story, measure: &mut dyn TextMeasure, cmds: &mut Vec<DrawCmd>) {
        let style = TextStyle::bold(72.0);
        let line_height = 72.0;
        let max_width = self.content_width();
        for (i, line) in wrap_text(&story.title, max_width, style, measure)
            .into_iter()
            .enumerate()
        {
            cmds.push(DrawCmd::Text {
                text: line,
                origin: Point::new(MARGIN_X, 290.0 + i as f64 * line_height),
                style,
                color: Rgba8::rgb(0xf2, 0xf4, 0xff),
            });
        }
    }

    fn insights_scene(
        &self,
        story: &Story,
        measure: &mut dyn TextMeasure,
        cmds: &mut Vec<DrawCmd>,
    ) {
        cmds.push(DrawCmd::Text {
            text: "Key Insights".to_owned(),
            origin: Point::new(MARGIN_X, 260.0),
            style: TextStyle::bold(48.0),
            color: Rgba8::rgb(0xf3, 0xf6, 0xff),
        });
        for (i, point) in story.talking_points.iter().take(3).enumerate() {
            self.bullet(point, 320.0 + i as f64 * 90.0, i, measure, cmds);
        }
    }

    fn next_steps_scene(
        &self,
        story: &Story,
        measure: &mut dyn TextMeasure,
        cmds: &mut Vec<DrawCmd>,
    ) {
        cmds.push(DrawCmd::Text {
            text: "Next Steps".to_owned(),
            origin: Point::new(MARGIN_X, 280.0),
            style: TextStyle::bold(52.0),
            color: Rgba8::rgb(0xf5, 0xf6, 0xff),
        });
        let last = match story.url.as_deref() {
            Some(url) => format!("Full story: {url}"),
            None => CALLOUT_FALLBACK.to_owned(),
        };
        let lines = [CALLOUTS[0].to_owned(), CALLOUTS[1].to_owned(), last];
        for (i, line) in lines.iter().enumerate() {
            self.bullet(line, 340.0 + i as f64 * 90.0, i + 3, measure, cmds);
        }
    }

    fn bullet(
        &self,
        text: &str,
        y: f64,
        idx: usize,
        measure: &mut dyn TextMeasure,
        cmds: &mut Vec<DrawCmd>,
    ) {
        let style = TextStyle::regular(28.0);
        let text_x = MARGIN_X + 36.0;
        cmds.push(DrawCmd::FillEllipse {
            center: Point::new(MARGIN_X + 8.0, y - 8.0),
            radii: Vec2::new(8.0, 8.0),
            color: Rgba8::rgba(142, 169, 255, 0.75 - 0.05 * idx as f32),
            blur_px: 0.0,
        });
        cmds.push(DrawCmd::Text {
            text: fit_line(text, self.canvas.width_f64() - text_x - MARGIN_X, style, measure),
            origin: Point::new(text_x, y),
            style,
            color: Rgba8::rgba(240, 243, 255, 0.92),
        });
    }

    fn content_width(&self) -> f64 {
        self.canvas.width_f64() - 2.0 * MARGIN_X
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scene.rs"]
mod tests;
