//! Paints a [`PageLayout`] onto a krilla document and writes the PDF.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context};
use krilla::color::rgb;
use krilla::geom::{PathBuilder, Point, Size, Transform};
use krilla::image::Image;
use krilla::num::NormalizedF32;
use krilla::page::PageSettings;
use krilla::paint::Fill;
use krilla::text::TextDirection;
use krilla::Document;
use tracing::{info, warn};

use super::page::{Element, PageLayout, Rect, Rgb, Weight};
use crate::fonts::{FontFaces, FontWeight};

/// Baseline offset from the top of a line box, as a fraction of the font size.
const ASCENT_FACTOR: f32 = 0.8;

fn solid(color: Rgb) -> Fill {
    Fill {
        paint: rgb::Color::new(color.0, color.1, color.2).into(),
        opacity: NormalizedF32::ONE,
        rule: Default::default(),
    }
}

fn rect_path(rect: &Rect) -> Option<krilla::geom::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(rect.x, rect.y);
    pb.line_to(rect.right(), rect.y);
    pb.line_to(rect.right(), rect.bottom());
    pb.line_to(rect.x, rect.bottom());
    pb.close();
    pb.finish()
}

/// Serializes one page to PDF bytes.
pub fn paint_page(layout: &PageLayout, fonts: &FontFaces) -> anyhow::Result<Vec<u8>> {
    let mut document = Document::new();
    let mut page = document.start_page_with(
        PageSettings::from_wh(layout.width, layout.height)
            .ok_or_else(|| anyhow!("Invalid page dimensions"))?,
    );
    let mut surface = page.surface();
    let mut skipped_text = 0usize;

    for element in &layout.elements {
        match element {
            Element::Fill { rect, color } => {
                let Some(path) = rect_path(rect) else {
                    continue;
                };
                surface.set_fill(Some(solid(*color)));
                surface.draw_path(&path);
            }
            Element::Text {
                x,
                y,
                size,
                weight,
                color,
                text,
            } => {
                let weight = match weight {
                    Weight::Regular => FontWeight::Regular,
                    Weight::Bold => FontWeight::Bold,
                };
                let Some(font) = fonts.get(weight) else {
                    skipped_text += 1;
                    continue;
                };
                surface.set_fill(Some(solid(*color)));
                surface.draw_text(
                    Point::from_xy(*x, *y + size * ASCENT_FACTOR),
                    font.clone(),
                    *size,
                    text,
                    false,
                    TextDirection::Auto,
                );
            }
            Element::Image { rect, image } => {
                let (Some(loaded), Some(size)) =
                    (layout.images.get(*image), Size::from_wh(rect.width, rect.height))
                else {
                    continue;
                };
                surface.push_transform(&Transform::from_translate(rect.x, rect.y));
                surface.draw_image(loaded.image.clone(), size);
                surface.pop();
            }
        }
    }

    surface.finish();
    page.finish();

    if skipped_text > 0 {
        warn!(skipped_text, "No font available, text omitted");
    }

    document
        .finish()
        .map_err(|e| anyhow!("Failed to generate PDF: {:?}", e))
}

/// Embeds `image` alone into a scratch document.
///
/// krilla decodes image data only in `Document::finish`; running that here
/// turns a damaged photo into an error for this image instead of the page.
pub fn check_image(image: &Image) -> anyhow::Result<()> {
    let (w, h) = image.size();
    let (w, h) = (w.max(1) as f32, h.max(1) as f32);
    let size = Size::from_wh(w, h).ok_or_else(|| anyhow!("Invalid image size {}x{}", w, h))?;

    let mut document = Document::new();
    let mut page = document.start_page_with(
        PageSettings::from_wh(w, h).ok_or_else(|| anyhow!("Invalid image size {}x{}", w, h))?,
    );
    let mut surface = page.surface();
    surface.draw_image(image.clone(), size);
    surface.finish();
    page.finish();

    document
        .finish()
        .map(|_| ())
        .map_err(|e| anyhow!("Failed to decode image: {:?}", e))
}

/// Paints `layout` and writes it to `path` in a single write.
pub fn write_pdf(layout: &PageLayout, fonts: &FontFaces, path: &Path) -> anyhow::Result<()> {
    let pdf_data = paint_page(layout, fonts)?;
    fs::write(path, &pdf_data).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = ?path, bytes = pdf_data.len(), "PDF written");
    Ok(())
}
