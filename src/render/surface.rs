use crate::foundation::core::Canvas;
use crate::foundation::error::NewsreelResult;
use crate::render::command::DrawCmd;
use crate::render::wrap::TextMeasure;

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent premultiplied frame covering `canvas`.
    pub fn transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0u8; canvas.rgba8_len()],
            premultiplied: true,
        }
    }
}

/// Drawing target for the scene renderer.
///
/// `paint` replaces the surface contents with the result of applying `cmds` to a transparent
/// canvas; `frame` exposes the pixels of the last paint. Text measurement must agree with how text
/// is rasterized so word wrapping fits.
pub trait DrawingSurface: TextMeasure {
    fn canvas(&self) -> Canvas;
    fn paint(&mut self, cmds: &[DrawCmd]) -> NewsreelResult<()>;
    fn frame(&self) -> &FrameRGBA;
}
