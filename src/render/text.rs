use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{NewsreelError, NewsreelResult};
use crate::render::command::{FontWeight, TextStyle};

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Font files used for rasterized text. Unset paths are probed from common system locations.
#[derive(Clone, Debug, Default)]
pub struct FontConfig {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
}

impl FontConfig {
    /// Load font bytes. A missing bold face falls back to the regular one.
    pub fn load(&self) -> NewsreelResult<FontSet> {
        let regular_path = match &self.regular {
            Some(p) => p.clone(),
            None => probe(REGULAR_CANDIDATES).ok_or_else(|| {
                NewsreelError::capture_setup(
                    "no usable font found in system locations; pass --font <path>",
                )
            })?,
        };
        let regular = read_font(&regular_path)?;

        let bold = match self.bold.clone().or_else(|| probe(BOLD_CANDIDATES)) {
            Some(p) => read_font(&p)?,
            None => regular.clone(),
        };
        tracing::debug!(regular = %regular_path.display(), "loaded fonts");
        Ok(FontSet { regular, bold })
    }
}

fn probe(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

fn read_font(path: &Path) -> NewsreelResult<Arc<Vec<u8>>> {
    std::fs::read(path).map(Arc::new).map_err(|e| {
        NewsreelError::capture_setup(format!("failed to read font '{}': {e}", path.display()))
    })
}

/// Raw font bytes per weight.
#[derive(Clone, Debug)]
pub struct FontSet {
    pub regular: Arc<Vec<u8>>,
    pub bold: Arc<Vec<u8>>,
}

impl FontSet {
    pub fn bytes(&self, weight: FontWeight) -> &Arc<Vec<u8>> {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Shapes single-line text with Parley against the fonts of a [`FontSet`].
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    regular_family: String,
    bold_family: String,
}

impl TextLayoutEngine {
    pub(crate) fn new(fonts: &FontSet) -> NewsreelResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let regular_family = register_family(&mut font_ctx, &fonts.regular)?;
        let bold_family = if Arc::ptr_eq(&fonts.regular, &fonts.bold) {
            regular_family.clone()
        } else {
            register_family(&mut font_ctx, &fonts.bold)?
        };
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            regular_family,
            bold_family,
        })
    }

    /// Shape `text` as one unbroken line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        style: TextStyle,
        brush: TextBrushRgba8,
    ) -> NewsreelResult<parley::Layout<TextBrushRgba8>> {
        if !style.size_px.is_finite() || style.size_px <= 0.0 {
            return Err(NewsreelError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let (family, weight) = match style.weight {
            FontWeight::Regular => (self.regular_family.clone(), parley::style::FontWeight::NORMAL),
            FontWeight::Bold => (self.bold_family.clone(), parley::style::FontWeight::BOLD),
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(weight));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    pub(crate) fn measure(&mut self, text: &str, style: TextStyle) -> NewsreelResult<f64> {
        let layout = self.layout_line(text, style, TextBrushRgba8::default())?;
        Ok(f64::from(layout.width()))
    }
}

fn register_family(font_ctx: &mut parley::FontContext, bytes: &[u8]) -> NewsreelResult<String> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| NewsreelError::capture_setup("no font families registered from font bytes"))?;
    font_ctx
        .collection
        .family_name(family_id)
        .map(str::to_owned)
        .ok_or_else(|| NewsreelError::capture_setup("registered font family has no name"))
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
