//! One printable sheet: dark background, lighted border, rope strands, and
//! the tiles pinned onto them.

use kurbo::{Affine, Cap, Join, Stroke};

use crate::curve;
use crate::error::MecateResult;
use crate::math::Rng64;
use crate::raster;
use crate::tile::PolaroidTile;

/// Page raster size: one landscape sheet at print resolution.
pub const PAGE_WIDTH: u32 = 3300;
pub const PAGE_HEIGHT: u32 = 2550;

/// Border inset from every page edge.
pub const BORDER_MARGIN: i32 = 80;

/// Distance between light fixtures along the border.
pub const LIGHT_SPACING: i32 = 250;

/// Largest per-axis jitter applied to a light's position.
pub const LIGHT_JITTER: i32 = 15;

const BACKGROUND: [u8; 4] = [12, 12, 12, 255];
const BORDER_COLOR: [u8; 4] = [0x22, 0x22, 0x22, 255];
const SOCKET_COLOR: [u8; 4] = [0x11, 0x11, 0x11, 255];
const ROPE_COLOR: [u8; 4] = [0xC2, 0x9A, 0x69, 255];
const PIN_BODY_COLOR: [u8; 4] = [0x8B, 0x5A, 0x2B, 255];
const PIN_CLASP_COLOR: [u8; 4] = [0xB0, 0xC4, 0xDE, 255];

const BORDER_WIDTH: f64 = 6.0;
const ROPE_WIDTH: f64 = 16.0;
const GLOW_RADIUS: f64 = 50.0;
const GLOW_ALPHA: u8 = 60;
const BULB_RADIUS: f64 = 14.0;

/// Bulb colors, all fully saturated so they read on the dark page.
const LIGHT_PALETTE: [[u8; 3]; 5] = [
    [255, 60, 60],
    [60, 255, 60],
    [60, 150, 255],
    [255, 230, 60],
    [255, 80, 255],
];

/// A finished page: premultiplied RGBA8, fully opaque.
#[derive(Clone, Debug)]
pub struct PageRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// In-progress page canvas. Construction paints the background; decoration,
/// strands and tiles accumulate in paint order until [`PageCanvas::finish`]
/// rasterizes everything.
pub(crate) struct PageCanvas {
    ctx: vello_cpu::RenderContext,
}

impl PageCanvas {
    pub(crate) fn new() -> Self {
        let mut ctx = vello_cpu::RenderContext::new(PAGE_WIDTH as u16, PAGE_HEIGHT as u16);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(raster::solid(BACKGROUND));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(PAGE_WIDTH),
            f64::from(PAGE_HEIGHT),
        ));
        Self { ctx }
    }

    /// Draw the border rectangle and its string lights.
    pub(crate) fn decorate(&mut self, rng: &mut Rng64) {
        self.draw_border();
        for (px, py) in light_anchor_points() {
            let lx = f64::from(px + rng.next_i32_inclusive(-LIGHT_JITTER, LIGHT_JITTER));
            let ly = f64::from(py + rng.next_i32_inclusive(-LIGHT_JITTER, LIGHT_JITTER));
            let [r, g, b] = LIGHT_PALETTE[rng.next_index(LIGHT_PALETTE.len())];
            self.draw_light(lx, ly, [r, g, b]);
        }
    }

    fn draw_border(&mut self) {
        let m = f64::from(BORDER_MARGIN);
        let (w, h) = (f64::from(PAGE_WIDTH), f64::from(PAGE_HEIGHT));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(raster::solid(BORDER_COLOR));
        for bar in [
            vello_cpu::kurbo::Rect::new(m, m, w - m, m + BORDER_WIDTH),
            vello_cpu::kurbo::Rect::new(m, h - m - BORDER_WIDTH, w - m, h - m),
            vello_cpu::kurbo::Rect::new(m, m, m + BORDER_WIDTH, h - m),
            vello_cpu::kurbo::Rect::new(w - m - BORDER_WIDTH, m, w - m, h - m),
        ] {
            self.ctx.fill_rect(&bar);
        }
    }

    /// One fixture: soft glow halo, bright bulb, dark socket above it.
    fn draw_light(&mut self, lx: f64, ly: f64, [r, g, b]: [u8; 3]) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

        self.ctx.set_paint(raster::solid([r, g, b, GLOW_ALPHA]));
        self.ctx.fill_path(&raster::circle_path(lx, ly, GLOW_RADIUS));

        self.ctx.set_paint(raster::solid([r, g, b, 255]));
        self.ctx.fill_path(&raster::circle_path(lx, ly, BULB_RADIUS));

        self.ctx.set_paint(raster::solid(SOCKET_COLOR));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            lx - 8.0,
            ly - 22.0,
            lx + 8.0,
            ly - 14.0,
        ));
    }

    /// Stroke one rope strand across the page.
    pub(crate) fn draw_strand(&mut self, base_y: f64) {
        let center = curve::strand_path(base_y);
        let style = Stroke::new(ROPE_WIDTH)
            .with_join(Join::Round)
            .with_caps(Cap::Round);
        let outline = kurbo::stroke(
            center.elements().iter().copied(),
            &style,
            &kurbo::StrokeOpts::default(),
            0.25,
        );
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(raster::solid(ROPE_COLOR));
        self.ctx.fill_path(&raster::bezpath_to_cpu(&outline));
    }

    /// Paste a tile x-centered on `center_x` with its top edge at `top_y`.
    pub(crate) fn paste_tile(&mut self, tile: &PolaroidTile, center_x: f64, top_y: f64) {
        let origin_x = center_x - f64::from(tile.width) / 2.0;
        self.ctx
            .set_transform(raster::affine_to_cpu(Affine::translate((origin_x, top_y))));
        self.ctx.set_paint(tile.paint());
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(tile.width),
            f64::from(tile.height),
        ));
    }

    /// Small clothespin at a hang point: wooden body plus a metal clasp.
    pub(crate) fn draw_clothespin(&mut self, center_x: f64, hang_y: f64) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(raster::solid(PIN_BODY_COLOR));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            center_x - 18.0,
            hang_y - 45.0,
            center_x + 18.0,
            hang_y + 25.0,
        ));
        self.ctx.set_paint(raster::solid(PIN_CLASP_COLOR));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            center_x - 20.0,
            hang_y - 5.0,
            center_x + 20.0,
            hang_y + 5.0,
        ));
    }

    pub(crate) fn finish(mut self) -> MecateResult<PageRGBA> {
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(PAGE_WIDTH as u16, PAGE_HEIGHT as u16);
        self.ctx.render_to_pixmap(&mut pixmap);
        Ok(PageRGBA {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            data: pixmap.data_as_u8_slice().to_vec(),
        })
    }
}

/// Un-jittered fixture positions along the border: the horizontal runs first
/// (top and bottom together), then the vertical runs below the top corners.
fn light_anchor_points() -> Vec<(i32, i32)> {
    let w = PAGE_WIDTH as i32;
    let h = PAGE_HEIGHT as i32;
    let m = BORDER_MARGIN;

    let mut points = Vec::new();
    let mut x = m;
    while x < w - m {
        points.push((x, m));
        points.push((x, h - m));
        x += LIGHT_SPACING;
    }
    let mut y = m + LIGHT_SPACING;
    while y < h - m {
        points.push((m, y));
        points.push((w - m, y));
        y += LIGHT_SPACING;
    }
    points
}
