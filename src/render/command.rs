use crate::foundation::core::{Point, Rect, Rgba8, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Regular,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size_px: f32,
    pub weight: FontWeight,
}

impl TextStyle {
    pub const fn regular(size_px: f32) -> Self {
        Self {
            size_px,
            weight: FontWeight::Regular,
        }
    }

    pub const fn bold(size_px: f32) -> Self {
        Self {
            size_px,
            weight: FontWeight::Bold,
        }
    }
}

/// One drawing instruction against a canvas-sized surface, in canvas pixel coordinates.
///
/// Commands are applied in order with source-over compositing. Opacity layers nest.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    /// Cover the whole canvas with a linear gradient running from `start` to `end`.
    LinearGradient {
        start: Point,
        end: Point,
        from: Rgba8,
        to: Rgba8,
    },
    FillRect {
        rect: Rect,
        color: Rgba8,
    },
    /// Axis-aligned ellipse; `blur_px > 0` softens it like a CSS `blur()` filter.
    FillEllipse {
        center: Point,
        radii: Vec2,
        color: Rgba8,
        blur_px: f64,
    },
    /// Single line of text; `origin` is the left end of the baseline.
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
        color: Rgba8,
    },
    PushOpacity(f32),
    PopOpacity,
}
