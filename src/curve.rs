//! The rope curve ("mecate") tiles hang from.
//!
//! A downward-opening parabola in page space (y grows downward): the rope sits
//! at `base_y` at both page edges and sags [`SAG`] units at the horizontal
//! midpoint. The same function positions the drawn rope and the hang point of
//! every tile, which is what keeps the clothespins on the line.

use kurbo::BezPath;

use crate::page::PAGE_WIDTH;

/// Vertical drop of the rope at the page midpoint.
pub const SAG: f64 = 180.0;

/// Horizontal sampling step used when flattening the rope into a polyline.
pub const SAMPLE_STEP: u32 = 20;

/// Vertical rope position at horizontal position `x` for a strand anchored at
/// `base_y`.
pub fn strand_y(x: f64, base_y: f64) -> f64 {
    let half = f64::from(PAGE_WIDTH) / 2.0;
    (-SAG / (half * half)) * (x - half) * (x - half) + base_y + SAG
}

/// The rope centerline as a polyline, sampled every [`SAMPLE_STEP`] units
/// across the full page width.
pub fn strand_path(base_y: f64) -> BezPath {
    let mut path = BezPath::new();
    let mut x = 0u32;
    while x <= PAGE_WIDTH {
        let p = (f64::from(x), strand_y(f64::from(x), base_y));
        if x == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
        x += SAMPLE_STEP;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn edges_return_to_base() {
        for base in [250.0, 1450.0, 0.0] {
            assert!((strand_y(0.0, base) - base).abs() < EPS);
            assert!((strand_y(f64::from(PAGE_WIDTH), base) - base).abs() < EPS);
        }
    }

    #[test]
    fn sag_peaks_at_midpoint() {
        let mid = f64::from(PAGE_WIDTH) / 2.0;
        assert!((strand_y(mid, 250.0) - (250.0 + SAG)).abs() < EPS);
        for x in [100.0, 600.0, 1650.0, 2700.0, 3200.0] {
            assert!(strand_y(x, 250.0) <= 250.0 + SAG + EPS);
        }
    }

    #[test]
    fn curve_is_symmetric() {
        let w = f64::from(PAGE_WIDTH);
        for x in [0.0, 300.0, 600.0, 1000.0, 1650.0] {
            assert!((strand_y(x, 250.0) - strand_y(w - x, 250.0)).abs() < EPS);
        }
    }

    #[test]
    fn path_spans_full_width() {
        let path = strand_path(250.0);
        let expected = (PAGE_WIDTH / SAMPLE_STEP + 1) as usize;
        assert_eq!(path.elements().len(), expected);
    }
}
