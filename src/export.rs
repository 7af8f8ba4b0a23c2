//! Assemble finished pages into one PDF byte buffer.

use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};

use crate::error::{MecateError, MecateResult};
use crate::page::PageRGBA;

/// Print resolution the pages were drawn for.
pub const EXPORT_DPI: f32 = 300.0;

const MM_PER_INCH: f32 = 25.4;

/// Each page is flattened against this backing before embedding; the PDF has
/// no page-level transparency.
const BACKDROP: [u8; 3] = [0, 0, 0];

fn px_to_mm(px: u32) -> f32 {
    px as f32 / EXPORT_DPI * MM_PER_INCH
}

/// Serialize the ordered page sequence into a single PDF.
///
/// Fails only on an empty sequence or a PDF serialization error; callers
/// should not invoke this with nothing to assemble.
pub fn assemble_pdf(pages: &[PageRGBA]) -> MecateResult<Vec<u8>> {
    let Some(first) = pages.first() else {
        return Err(MecateError::validation("no pages to assemble"));
    };

    let (doc, first_page, first_layer) = PdfDocument::new(
        "Linea del Tiempo",
        Mm(px_to_mm(first.width)),
        Mm(px_to_mm(first.height)),
        "page 1",
    );

    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = doc.add_page(
                Mm(px_to_mm(page.width)),
                Mm(px_to_mm(page.height)),
                format!("page {}", i + 1),
            );
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        let xobject = ImageXObject {
            width: Px(page.width as usize),
            height: Px(page.height as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: flatten_to_rgb(page),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        };
        Image::from(xobject).add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(0.0)),
                translate_y: Some(Mm(0.0)),
                dpi: Some(EXPORT_DPI),
                ..Default::default()
            },
        );
    }

    doc.save_to_bytes()
        .map_err(|e| MecateError::export(format!("serialize pdf: {e}")))
}

/// Premultiplied RGBA over the opaque backdrop, alpha dropped.
fn flatten_to_rgb(page: &PageRGBA) -> Vec<u8> {
    let mut out = Vec::with_capacity((page.width * page.height * 3) as usize);
    for px in page.data.chunks_exact(4) {
        let inv = 255 - u16::from(px[3]);
        for c in 0..3 {
            out.push(px[c].saturating_add(((u16::from(BACKDROP[c]) * inv + 127) / 255) as u8));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_page(width: u32, height: u32, rgba: [u8; 4]) -> PageRGBA {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&rgba);
        }
        PageRGBA {
            width,
            height,
            data,
        }
    }

    #[test]
    fn empty_page_sequence_is_rejected() {
        let err = assemble_pdf(&[]).unwrap_err();
        assert!(err.to_string().contains("no pages"));
    }

    #[test]
    fn pdf_header_and_multiple_pages() {
        let pages = vec![
            solid_page(8, 6, [200, 10, 10, 255]),
            solid_page(8, 6, [10, 200, 10, 255]),
        ];
        let bytes = assemble_pdf(&pages).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 200);
    }

    #[test]
    fn flatten_composites_over_backdrop() {
        let opaque = solid_page(1, 1, [90, 91, 92, 255]);
        assert_eq!(flatten_to_rgb(&opaque), vec![90, 91, 92]);

        // Premultiplied half-transparent white over black keeps its premul rgb.
        let translucent = solid_page(1, 1, [128, 128, 128, 128]);
        assert_eq!(flatten_to_rgb(&translucent), vec![128, 128, 128]);
    }

    #[test]
    fn page_size_maps_to_print_millimeters() {
        assert!((px_to_mm(3300) - 279.4).abs() < 1e-3);
        assert!((px_to_mm(2550) - 215.9).abs() < 1e-3);
    }
}
