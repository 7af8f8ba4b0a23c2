//! Top-level render entry points: spec in, pages or PDF bytes out.

use crate::error::{MecateResult, RenderWarning};
use crate::export;
use crate::layout;
use crate::model::CollageSpec;
use crate::page::PageRGBA;
use crate::text::FontStack;

/// File name the finished document is offered under.
pub const DOWNLOAD_FILE_NAME: &str = "Linea_del_Tiempo.pdf";

/// Rendered pages plus the non-fatal warnings gathered along the way.
#[derive(Debug)]
pub struct RenderedPages {
    pub pages: Vec<PageRGBA>,
    pub warnings: Vec<RenderWarning>,
}

/// The finished document.
#[derive(Debug)]
pub struct CollageOutput {
    pub pdf: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<RenderWarning>,
}

/// Render every page of the collage without assembling the document.
#[tracing::instrument(skip(spec, fonts))]
pub fn render_pages(spec: &CollageSpec, fonts: &FontStack) -> MecateResult<RenderedPages> {
    spec.validate()?;
    let font = fonts.resolve()?;
    let (pages, warnings) = layout::build_pages(spec, &font)?;
    tracing::debug!(
        pages = pages.len(),
        warnings = warnings.len(),
        "collage pages rendered"
    );
    Ok(RenderedPages { pages, warnings })
}

/// Full pipeline: render all pages and assemble them into one PDF buffer.
pub fn render_collage(spec: &CollageSpec, fonts: &FontStack) -> MecateResult<CollageOutput> {
    let rendered = render_pages(spec, fonts)?;
    let pdf = export::assemble_pdf(&rendered.pages)?;
    Ok(CollageOutput {
        pdf,
        page_count: rendered.pages.len(),
        warnings: rendered.warnings,
    })
}
