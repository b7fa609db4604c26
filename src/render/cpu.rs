use std::collections::HashMap;
use std::sync::Arc;

use kurbo::Shape;

use crate::foundation::core::{Canvas, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::blur::{css_blur_params, gaussian_blur_premul};
use crate::render::command::{DrawCmd, FontWeight, TextStyle};
use crate::render::surface::{DrawingSurface, FrameRGBA};
use crate::render::text::{FontSet, TextBrushRgba8, TextLayoutEngine};
use crate::render::wrap::TextMeasure;

/// Glow sprites are blurred at this fraction of their final size and upscaled when drawn.
const GLOW_DOWNSAMPLE: f64 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    start: [u64; 2],
    end: [u64; 2],
    from: Rgba8,
    to: Rgba8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GlowKey {
    radii: [u64; 2],
    blur_bits: u64,
    color: Rgba8,
}

#[derive(Clone)]
struct GlowSprite {
    paint: vello_cpu::Image,
    /// Offset of the sprite's top-left corner from the ellipse center, in canvas pixels.
    offset: Vec2,
    w: u32,
    h: u32,
}

/// Software [`DrawingSurface`] backed by `vello_cpu`, with Parley-shaped text.
///
/// Full-canvas gradients and blurred glows are rasterized once per distinct parameter set and
/// reused as image paints on later frames.
pub struct CpuSurface {
    canvas: Canvas,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: vello_cpu::Pixmap,
    frame: FrameRGBA,

    text_engine: TextLayoutEngine,
    regular_font: vello_cpu::peniko::FontData,
    bold_font: vello_cpu::peniko::FontData,

    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
    glow_cache: HashMap<GlowKey, GlowSprite>,
}

impl CpuSurface {
    pub fn new(canvas: Canvas, fonts: &FontSet) -> NewsreelResult<Self> {
        let (w, h) = canvas_dims_u16(canvas)?;
        Ok(Self {
            canvas,
            ctx: None,
            pixmap: vello_cpu::Pixmap::new(w, h),
            frame: FrameRGBA::transparent(canvas),
            text_engine: TextLayoutEngine::new(fonts)?,
            regular_font: font_data(fonts.bytes(FontWeight::Regular)),
            bold_font: font_data(fonts.bytes(FontWeight::Bold)),
            gradient_cache: HashMap::new(),
            glow_cache: HashMap::new(),
        })
    }

    fn take_ctx(&mut self) -> NewsreelResult<vello_cpu::RenderContext> {
        let (w, h) = canvas_dims_u16(self.canvas)?;
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        Ok(ctx)
    }

    fn draw_all(
        &mut self,
        cmds: &[DrawCmd],
        ctx: &mut vello_cpu::RenderContext,
    ) -> NewsreelResult<()> {
        let mut depth = 0usize;
        for cmd in cmds {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            match cmd {
                DrawCmd::LinearGradient {
                    start,
                    end,
                    from,
                    to,
                } => {
                    let img = self.gradient_paint(*start, *end, *from, *to)?;
                    ctx.set_paint(img);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                        0.0,
                        0.0,
                        self.canvas.width_f64(),
                        self.canvas.height_f64(),
                    ));
                }
                DrawCmd::FillRect { rect, color } => {
                    ctx.set_paint(color_to_cpu(*color));
                    ctx.fill_rect(&rect_to_cpu(*rect));
                }
                DrawCmd::FillEllipse {
                    center,
                    radii,
                    color,
                    blur_px,
                } => {
                    if *blur_px > 0.0 {
                        let sprite = self.glow_sprite(*radii, *color, *blur_px)?;
                        let origin = *center + sprite.offset;
                        ctx.set_transform(
                            vello_cpu::kurbo::Affine::translate((origin.x, origin.y))
                                * vello_cpu::kurbo::Affine::scale(GLOW_DOWNSAMPLE),
                        );
                        ctx.set_paint(sprite.paint);
                        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                            0.0,
                            0.0,
                            f64::from(sprite.w),
                            f64::from(sprite.h),
                        ));
                    } else {
                        ctx.set_paint(color_to_cpu(*color));
                        ctx.fill_path(&ellipse_path(*center, *radii));
                    }
                }
                DrawCmd::Text {
                    text,
                    origin,
                    style,
                    color,
                } => self.draw_text(ctx, text, *origin, *style, *color)?,
                DrawCmd::PushOpacity(alpha) => {
                    ctx.push_opacity_layer(alpha.clamp(0.0, 1.0));
                    depth += 1;
                }
                DrawCmd::PopOpacity => {
                    if depth == 0 {
                        return Err(NewsreelError::render(
                            "PopOpacity without a matching PushOpacity",
                        ));
                    }
                    ctx.pop_layer();
                    depth -= 1;
                }
            }
        }
        if depth != 0 {
            return Err(NewsreelError::render(format!(
                "{depth} opacity layer(s) left open at end of frame"
            )));
        }
        Ok(())
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        origin: Point,
        style: TextStyle,
        color: Rgba8,
    ) -> NewsreelResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        let layout = self.text_engine.layout_line(text, style, brush)?;
        let font = match style.weight {
            FontWeight::Regular => &self.regular_font,
            FontWeight::Bold => &self.bold_font,
        };

        let Some(first) = layout.lines().next() else {
            return Ok(());
        };
        let baseline = f64::from(first.metrics().baseline);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            origin.x,
            origin.y - baseline,
        )));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let b = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn gradient_paint(
        &mut self,
        start: Point,
        end: Point,
        from: Rgba8,
        to: Rgba8,
    ) -> NewsreelResult<vello_cpu::Image> {
        let key = GradientKey {
            start: [start.x.to_bits(), start.y.to_bits()],
            end: [end.x.to_bits(), end.y.to_bits()],
            from,
            to,
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }
        let bytes = linear_gradient_premul(self.canvas, start, end, from, to);
        let img = premul_bytes_to_image(&bytes, self.canvas.width, self.canvas.height)?;
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }

    fn glow_sprite(
        &mut self,
        radii: Vec2,
        color: Rgba8,
        blur_px: f64,
    ) -> NewsreelResult<GlowSprite> {
        let key = GlowKey {
            radii: [radii.x.to_bits(), radii.y.to_bits()],
            blur_bits: blur_px.to_bits(),
            color,
        };
        if let Some(s) = self.glow_cache.get(&key).cloned() {
            return Ok(s);
        }
        let (bytes, w, h) = glow_sprite_premul(radii, color, blur_px)?;
        let paint = premul_bytes_to_image(&bytes, w, h)?;
        let (margin_r, _) = css_blur_params(blur_px);
        let margin = f64::from(margin_r);
        let sprite = GlowSprite {
            paint,
            offset: Vec2::new(-(radii.x + margin), -(radii.y + margin)),
            w,
            h,
        };
        tracing::debug!(w, h, blur_px, "rasterized glow sprite");
        self.glow_cache.insert(key, sprite.clone());
        Ok(sprite)
    }
}

impl TextMeasure for CpuSurface {
    fn measure(&mut self, text: &str, style: TextStyle) -> f64 {
        // Layout only fails on an invalid size, which measures as nothing.
        self.text_engine.measure(text, style).unwrap_or(0.0)
    }
}

impl DrawingSurface for CpuSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn paint(&mut self, cmds: &[DrawCmd]) -> NewsreelResult<()> {
        let mut ctx = self.take_ctx()?;
        let drawn = self.draw_all(cmds, &mut ctx);
        if drawn.is_ok() {
            ctx.flush();
            self.pixmap.data_as_u8_slice_mut().fill(0);
            ctx.render_to_pixmap(&mut self.pixmap);
            self.frame
                .data
                .copy_from_slice(self.pixmap.data_as_u8_slice());
        }
        self.ctx = Some(ctx);
        drawn
    }

    fn frame(&self) -> &FrameRGBA {
        &self.frame
    }
}

fn canvas_dims_u16(canvas: Canvas) -> NewsreelResult<(u16, u16)> {
    let w: u16 = canvas
        .width
        .try_into()
        .map_err(|_| NewsreelError::validation("canvas width exceeds u16"))?;
    let h: u16 = canvas
        .height
        .try_into()
        .map_err(|_| NewsreelError::validation("canvas height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(NewsreelError::validation("canvas width/height must be > 0"));
    }
    Ok((w, h))
}

fn font_data(bytes: &Arc<Vec<u8>>) -> vello_cpu::peniko::FontData {
    vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.to_vec()), 0)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn ellipse_path(center: Point, radii: Vec2) -> vello_cpu::kurbo::BezPath {
    let e = kurbo::Ellipse::new(center, radii, 0.0);
    let mut p = vello_cpu::kurbo::BezPath::new();
    for el in e.path_elements(0.1) {
        match el {
            kurbo::PathEl::MoveTo(a) => p.move_to((a.x, a.y)),
            kurbo::PathEl::LineTo(a) => p.line_to((a.x, a.y)),
            kurbo::PathEl::QuadTo(a, b) => p.quad_to((a.x, a.y), (b.x, b.y)),
            kurbo::PathEl::CurveTo(a, b, c) => p.curve_to((a.x, a.y), (b.x, b.y), (c.x, c.y)),
            kurbo::PathEl::ClosePath => p.close_path(),
        }
    }
    p
}

/// Premultiplied canvas-sized linear gradient. Pixels are sampled at their centers and projected
/// onto the `start -> end` axis; positions outside the segment take the end colors.
pub(crate) fn linear_gradient_premul(
    canvas: Canvas,
    start: Point,
    end: Point,
    from: Rgba8,
    to: Rgba8,
) -> Vec<u8> {
    let mut bytes = vec![0u8; canvas.rgba8_len()];
    let axis = end - start;
    let len2 = axis.hypot2();
    let w = canvas.width as usize;
    for (i, px) in bytes.chunks_exact_mut(4).enumerate() {
        let p = Point::new((i % w) as f64 + 0.5, (i / w) as f64 + 0.5);
        let t = if len2 <= f64::EPSILON {
            0.0
        } else {
            (p - start).dot(axis) / len2
        };
        px.copy_from_slice(&from.lerp(to, t).premultiplied());
    }
    bytes
}

/// Blurred ellipse sprite at `1 / GLOW_DOWNSAMPLE` scale, padded by the blur reach on every side.
pub(crate) fn glow_sprite_premul(
    radii: Vec2,
    color: Rgba8,
    blur_px: f64,
) -> NewsreelResult<(Vec<u8>, u32, u32)> {
    if !(radii.x > 0.0 && radii.y > 0.0 && radii.x.is_finite() && radii.y.is_finite()) {
        return Err(NewsreelError::validation("ellipse radii must be finite and > 0"));
    }
    let (reach, _) = css_blur_params(blur_px);
    let margin = f64::from(reach);
    let full_w = 2.0 * (radii.x + margin);
    let full_h = 2.0 * (radii.y + margin);
    let w = (full_w / GLOW_DOWNSAMPLE).ceil().max(1.0) as u32;
    let h = (full_h / GLOW_DOWNSAMPLE).ceil().max(1.0) as u32;

    let (rx, ry) = (radii.x / GLOW_DOWNSAMPLE, radii.y / GLOW_DOWNSAMPLE);
    let (cx, cy) = (full_w / GLOW_DOWNSAMPLE / 2.0, full_h / GLOW_DOWNSAMPLE / 2.0);
    let premul = color.premultiplied();
    let mut bytes = vec![0u8; (w as usize) * (h as usize) * 4];
    for y in 0..h {
        for x in 0..w {
            let dx = (f64::from(x) + 0.5 - cx) / rx;
            let dy = (f64::from(y) + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                let idx = ((y as usize) * (w as usize) + (x as usize)) * 4;
                bytes[idx..idx + 4].copy_from_slice(&premul);
            }
        }
    }

    let (radius, sigma) = css_blur_params(blur_px / GLOW_DOWNSAMPLE);
    let blurred = gaussian_blur_premul(&bytes, w, h, radius, sigma)?;
    Ok((blurred, w, h))
}

fn premul_bytes_to_image(bytes: &[u8], width: u32, height: u32) -> NewsreelResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| NewsreelError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| NewsreelError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(NewsreelError::render("pixmap byte len mismatch"));
    }
    let pixels: Vec<vello_cpu::peniko::color::PremulRgba8> = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect();
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
