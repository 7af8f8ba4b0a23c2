//! Caption fonts: a resolution chain over candidate font files and the
//! Parley layout engine that shapes the year text under each photo.

use std::borrow::Cow;
use std::path::PathBuf;

use crate::error::{MecateError, MecateResult};

/// Font files tried in order when the caller has no preference. Decorative
/// faces first, then the plain system faces that are almost always present.
const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "fonts/caption.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Comic_Sans_MS.ttf",
    "/System/Library/Fonts/Supplemental/Comic Sans MS.ttf",
    "C:\\Windows\\Fonts\\comic.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Ordered chain of candidate caption fonts.
///
/// Resolution walks the chain and keeps the first file that both reads and
/// registers as a font family. An exhausted chain fails the whole render;
/// there is no way to draw captions without a font.
#[derive(Clone, Debug)]
pub struct FontStack {
    candidates: Vec<PathBuf>,
}

impl Default for FontStack {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl FontStack {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect())
    }

    /// Prepend preferred candidates, keeping their given order.
    pub fn prefer(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut preferred: Vec<PathBuf> = paths.into_iter().collect();
        preferred.append(&mut self.candidates);
        self.candidates = preferred;
        self
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that loads and registers as a usable font.
    pub fn resolve(&self) -> MecateResult<ResolvedFont> {
        let mut scratch = parley::FontContext::default();
        for path in &self.candidates {
            let bytes = match std::fs::read(path) {
                Ok(b) => b,
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "font candidate unreadable");
                    continue;
                }
            };
            let families = scratch
                .collection
                .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
            if families.is_empty() {
                tracing::debug!(path = %path.display(), "font candidate did not register");
                continue;
            }
            tracing::debug!(path = %path.display(), "caption font resolved");
            return Ok(ResolvedFont {
                path: path.clone(),
                bytes,
            });
        }
        Err(MecateError::font(format!(
            "no caption font found; tried {} candidate(s): {}",
            self.candidates.len(),
            self.candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

/// A font that made it through the chain.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl ResolvedFont {
    pub(crate) fn render_font(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(self.bytes.clone()), 0)
    }
}

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct CaptionBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Stateful helper for shaping caption text from raw font bytes.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<CaptionBrush>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Shape a single-line caption using the provided font bytes.
    pub(crate) fn layout_caption(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: CaptionBrush,
    ) -> MecateResult<parley::Layout<CaptionBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(MecateError::validation(
                "caption size_px must be finite and > 0",
            ));
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| MecateError::font("no font families registered from font bytes"))?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| MecateError::font("registered font family has no name"))?
            .to_string();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<CaptionBrush> = builder.build(text);
        layout.break_all_lines(None);

        Ok(layout)
    }
}

/// Paint a shaped caption into the current context transform.
pub(crate) fn draw_caption(
    ctx: &mut vello_cpu::RenderContext,
    layout: &parley::Layout<CaptionBrush>,
    font: &vello_cpu::peniko::FontData,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let brush = run.style().brush;
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                brush.r, brush.g, brush.b, brush.a,
            ));
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_chain_is_a_font_error() {
        let stack = FontStack::new(vec![PathBuf::from("/definitely/not/here.ttf")]);
        let err = stack.resolve().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("font error:"));
        assert!(msg.contains("/definitely/not/here.ttf"));
    }

    #[test]
    fn prefer_prepends_in_order() {
        let stack = FontStack::new(vec![PathBuf::from("c.ttf")])
            .prefer([PathBuf::from("a.ttf"), PathBuf::from("b.ttf")]);
        let names: Vec<_> = stack
            .candidates()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        assert_eq!(names, vec!["a.ttf", "b.ttf", "c.ttf"]);
    }

    #[test]
    fn default_chain_is_not_empty() {
        assert!(!FontStack::with_defaults().candidates().is_empty());
    }

    #[test]
    fn caption_size_must_be_positive() {
        let mut engine = TextLayoutEngine::new();
        let brush = CaptionBrush::default();
        assert!(engine.layout_caption("2019", b"junk", 0.0, brush).is_err());
        assert!(
            engine
                .layout_caption("2019", b"junk", f32::NAN, brush)
                .is_err()
        );
    }

    #[test]
    fn junk_font_bytes_do_not_register() {
        let mut engine = TextLayoutEngine::new();
        let err = engine
            .layout_caption("2019", b"not a font", 60.0, CaptionBrush::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("font error:"));
    }
}
