//! Page, strand and slot assignment, and the pass that turns year entries
//! into finished pages.
//!
//! Years are laid out two per page in timeline order: even positions hang on
//! the top strand, odd positions on the bottom one. Within a strand, photos
//! occupy up to three fixed slots, left to right in upload order.

use crate::curve;
use crate::error::{MecateResult, RenderWarning};
use crate::math::Rng64;
use crate::model::CollageSpec;
use crate::page::{PageCanvas, PageRGBA};
use crate::text::{ResolvedFont, TextLayoutEngine};
use crate::tile::compose_tile;

/// Years per page, one per strand.
pub const YEARS_PER_PAGE: usize = 2;

/// Strand anchor heights (the curve sags below these).
pub const STRAND_BASE_TOP: f64 = 250.0;
pub const STRAND_BASE_BOTTOM: f64 = 1450.0;

/// Fixed horizontal hang positions; a year with n photos takes the first n.
pub const SLOT_POSITIONS: [f64; 3] = [600.0, 1650.0, 2700.0];

/// The tile's top edge sits this far above the rope so the clothespin
/// overlaps both.
const TILE_HANG_RISE: f64 = 20.0;

/// Pages needed for `years` entries.
pub fn page_count(years: usize) -> usize {
    years.div_ceil(YEARS_PER_PAGE)
}

/// Page index for the year at sorted position `k`.
pub fn page_for(k: usize) -> usize {
    k / YEARS_PER_PAGE
}

/// Strand anchor for the year at sorted position `k`.
pub fn strand_base(k: usize) -> f64 {
    if k % 2 == 0 {
        STRAND_BASE_TOP
    } else {
        STRAND_BASE_BOTTOM
    }
}

/// Hang positions for `photo_count` photos. Counts beyond the slot table are
/// tolerated by ignoring the excess.
pub fn slot_positions(photo_count: usize) -> &'static [f64] {
    &SLOT_POSITIONS[..photo_count.min(SLOT_POSITIONS.len())]
}

/// Render every page for the spec.
///
/// All pages are decorated and strung first, then tiles are hung year by
/// year, so the random stream is consumed page-lights-first regardless of
/// photo failures. A photo that fails to composite is reported and skipped;
/// its year keeps its strand either way.
pub(crate) fn build_pages(
    spec: &CollageSpec,
    font: &ResolvedFont,
) -> MecateResult<(Vec<PageRGBA>, Vec<RenderWarning>)> {
    spec.validate()?;

    let mut rng = Rng64::new(spec.seed);
    let mut canvases: Vec<PageCanvas> = (0..page_count(spec.year_count()))
        .map(|_| PageCanvas::new())
        .collect();
    for canvas in &mut canvases {
        canvas.decorate(&mut rng);
        canvas.draw_strand(STRAND_BASE_TOP);
        canvas.draw_strand(STRAND_BASE_BOTTOM);
    }

    let mut engine = TextLayoutEngine::new();
    let mut warnings = Vec::new();
    for (k, (label, entry)) in spec.entries().enumerate() {
        let canvas = &mut canvases[page_for(k)];
        let base_y = strand_base(k);
        for (photo, &slot_x) in entry.photos().iter().zip(slot_positions(entry.photos().len())) {
            match compose_tile(photo, label, font, &mut engine, &mut rng) {
                Ok(tile) => {
                    let hang_y = curve::strand_y(slot_x, base_y);
                    canvas.paste_tile(&tile, slot_x, hang_y - TILE_HANG_RISE);
                    canvas.draw_clothespin(slot_x, hang_y);
                }
                Err(cause) => {
                    tracing::warn!(
                        label,
                        photo = photo.name.as_str(),
                        %cause,
                        "skipping photo"
                    );
                    warnings.push(RenderWarning::PhotoSkipped {
                        label: label.to_string(),
                        photo: photo.name.clone(),
                        cause,
                    });
                }
            }
        }
    }

    let pages = canvases
        .into_iter()
        .map(PageCanvas::finish)
        .collect::<MecateResult<Vec<_>>>()?;
    Ok((pages, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_years_share_a_page() {
        assert_eq!(page_count(1), 1);
        assert_eq!(page_count(2), 1);
        assert_eq!(page_count(3), 2);
        assert_eq!(page_count(4), 2);
        assert_eq!(page_count(5), 3);
    }

    #[test]
    fn even_positions_hang_on_top() {
        assert_eq!(strand_base(0), STRAND_BASE_TOP);
        assert_eq!(strand_base(1), STRAND_BASE_BOTTOM);
        assert_eq!(strand_base(2), STRAND_BASE_TOP);
        assert_eq!(page_for(0), 0);
        assert_eq!(page_for(1), 0);
        assert_eq!(page_for(2), 1);
        assert_eq!(page_for(3), 1);
    }

    #[test]
    fn slots_fill_left_to_right() {
        assert_eq!(slot_positions(0), &[] as &[f64]);
        assert_eq!(slot_positions(1), &[600.0]);
        assert_eq!(slot_positions(2), &[600.0, 1650.0]);
        assert_eq!(slot_positions(3), &[600.0, 1650.0, 2700.0]);
        // Contract violations upstream degrade to the full slot table.
        assert_eq!(slot_positions(9), &[600.0, 1650.0, 2700.0]);
    }
}
