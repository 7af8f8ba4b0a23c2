//! The polaroid frame compositor.
//!
//! One photo in, one tilted tile out: center-square crop, resize, white frame
//! with the year caption, then a small random rotation into an expanded
//! transparent canvas so no corner clips. Decode and drawing failures are
//! returned to the caller, which skips the photo and keeps rendering.

use std::sync::Arc;

use anyhow::Context as _;
use kurbo::Affine;

use crate::error::MecateResult;
use crate::math::Rng64;
use crate::model::PhotoSource;
use crate::raster;
use crate::text::{CaptionBrush, ResolvedFont, TextLayoutEngine, draw_caption};

/// Flat tile dimensions before rotation.
pub const TILE_WIDTH: u32 = 900;
pub const TILE_HEIGHT: u32 = 1100;

/// Side of the square photo inside the frame.
pub const PHOTO_SIZE: u32 = 800;

/// Frame margin around the photo on top, left and right; the rest of the
/// bottom stays free for the caption.
pub const PHOTO_MARGIN: u32 = 50;

/// Largest tilt in either direction, degrees.
pub const MAX_TILT_DEG: f64 = 4.5;

const FRAME_BORDER: f64 = 4.0;
const CAPTION_TOP: f64 = 930.0;
const CAPTION_SIZE: f32 = 60.0;

const FRAME_WHITE: [u8; 4] = [255, 255, 255, 255];
const BORDER_GRAY: [u8; 4] = [0xCC, 0xCC, 0xCC, 255];
const CAPTION_COLOR: CaptionBrush = CaptionBrush {
    r: 0x22,
    g: 0x22,
    b: 0x22,
    a: 255,
};

/// A finished tile: premultiplied RGBA, already rotated, transparent outside
/// the frame corners.
#[derive(Clone, Debug)]
pub struct PolaroidTile {
    pub width: u32,
    pub height: u32,
    pub tilt_deg: f64,
    pixmap: Arc<vello_cpu::Pixmap>,
}

impl PolaroidTile {
    /// Raw premultiplied RGBA8 bytes, row-major.
    pub fn pixel_data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub(crate) fn paint(&self) -> vello_cpu::Image {
        raster::image_paint_from_pixmap(self.pixmap.clone())
    }
}

/// Centered square crop window over a `width`×`height` image: `(x, y, side)`
/// with `side` equal to the shorter dimension.
pub fn center_square(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

/// Axis-aligned bounds of the flat tile after rotating by `tilt_deg`.
pub fn rotated_bounds(tilt_deg: f64) -> (u32, u32) {
    let (sin, cos) = tilt_deg.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let w = f64::from(TILE_WIDTH);
    let h = f64::from(TILE_HEIGHT);
    (
        (w * cos + h * sin).ceil() as u32,
        (w * sin + h * cos).ceil() as u32,
    )
}

/// Build one tile from raw photo bytes and its year caption.
pub fn compose_tile(
    photo: &PhotoSource,
    caption: &str,
    font: &ResolvedFont,
    engine: &mut TextLayoutEngine,
    rng: &mut Rng64,
) -> MecateResult<PolaroidTile> {
    let decoded = image::load_from_memory(&photo.bytes).context("decode photo")?;
    let rgba = decoded.to_rgba8();
    let (crop_x, crop_y, side) = center_square(rgba.width(), rgba.height());
    let square = image::imageops::crop_imm(&rgba, crop_x, crop_y, side, side).to_image();
    let resized = image::imageops::resize(
        &square,
        PHOTO_SIZE,
        PHOTO_SIZE,
        image::imageops::FilterType::Lanczos3,
    );
    let mut photo_px = resized.into_raw();
    raster::premultiply_rgba8_in_place(&mut photo_px);
    let photo_paint = raster::image_paint_from_premul(&photo_px, PHOTO_SIZE, PHOTO_SIZE)?;

    let flat = compose_flat(photo_paint, caption, font, engine)?;

    // The tilt is drawn only after the photo composited successfully, so a
    // skipped photo consumes no randomness.
    let tilt_deg = rng.next_f64_range(-MAX_TILT_DEG, MAX_TILT_DEG);
    rotate_expanded(flat, tilt_deg)
}

fn compose_flat(
    photo_paint: vello_cpu::Image,
    caption: &str,
    font: &ResolvedFont,
    engine: &mut TextLayoutEngine,
) -> MecateResult<vello_cpu::Pixmap> {
    let tw = f64::from(TILE_WIDTH);
    let th = f64::from(TILE_HEIGHT);
    let mut ctx = vello_cpu::RenderContext::new(TILE_WIDTH as u16, TILE_HEIGHT as u16);

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(raster::solid(FRAME_WHITE));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, tw, th));

    let margin = f64::from(PHOTO_MARGIN);
    ctx.set_transform(raster::affine_to_cpu(Affine::translate((margin, margin))));
    ctx.set_paint(photo_paint);
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(PHOTO_SIZE),
        f64::from(PHOTO_SIZE),
    ));

    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(raster::solid(BORDER_GRAY));
    for bar in [
        vello_cpu::kurbo::Rect::new(0.0, 0.0, tw, FRAME_BORDER),
        vello_cpu::kurbo::Rect::new(0.0, th - FRAME_BORDER, tw, th),
        vello_cpu::kurbo::Rect::new(0.0, 0.0, FRAME_BORDER, th),
        vello_cpu::kurbo::Rect::new(tw - FRAME_BORDER, 0.0, tw, th),
    ] {
        ctx.fill_rect(&bar);
    }

    let layout = engine.layout_caption(caption, &font.bytes, CAPTION_SIZE, CAPTION_COLOR)?;
    let text_x = (tw - f64::from(layout.width())) / 2.0;
    ctx.set_transform(raster::affine_to_cpu(Affine::translate((
        text_x,
        CAPTION_TOP,
    ))));
    draw_caption(&mut ctx, &layout, &font.render_font());

    ctx.flush();
    let mut flat = vello_cpu::Pixmap::new(TILE_WIDTH as u16, TILE_HEIGHT as u16);
    ctx.render_to_pixmap(&mut flat);
    Ok(flat)
}

fn rotate_expanded(flat: vello_cpu::Pixmap, tilt_deg: f64) -> MecateResult<PolaroidTile> {
    let (width, height) = rotated_bounds(tilt_deg);
    let transform = Affine::translate((f64::from(width) / 2.0, f64::from(height) / 2.0))
        * Affine::rotate(tilt_deg.to_radians())
        * Affine::translate((-f64::from(TILE_WIDTH) / 2.0, -f64::from(TILE_HEIGHT) / 2.0));

    let mut ctx = vello_cpu::RenderContext::new(width as u16, height as u16);
    ctx.set_transform(raster::affine_to_cpu(transform));
    ctx.set_paint(raster::image_paint_from_pixmap(Arc::new(flat)));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(TILE_WIDTH),
        f64::from(TILE_HEIGHT),
    ));

    ctx.flush();
    let mut out = vello_cpu::Pixmap::new(width as u16, height as u16);
    ctx.render_to_pixmap(&mut out);
    Ok(PolaroidTile {
        width,
        height,
        tilt_deg,
        pixmap: Arc::new(out),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_square_uses_shorter_side() {
        assert_eq!(center_square(1200, 800), (200, 0, 800));
        assert_eq!(center_square(800, 1200), (0, 200, 800));
        assert_eq!(center_square(640, 640), (0, 0, 640));
        assert_eq!(center_square(1, 1), (0, 0, 1));
        assert_eq!(center_square(1, 500), (0, 249, 1));
    }

    #[test]
    fn rotated_bounds_stay_in_resolution_class() {
        let (w0, h0) = rotated_bounds(0.0);
        assert_eq!((w0, h0), (TILE_WIDTH, TILE_HEIGHT));

        for deg in [-4.5, -2.0, 1.3, 4.5] {
            let (w, h) = rotated_bounds(deg);
            assert!(w >= TILE_WIDTH && h >= TILE_HEIGHT);
            // At most the worst case for 4.5 degrees.
            assert!(w <= TILE_WIDTH + 100 && h <= TILE_HEIGHT + 100);
        }
    }

    #[test]
    fn rotated_bounds_symmetric_in_sign() {
        assert_eq!(rotated_bounds(3.0), rotated_bounds(-3.0));
    }
}
