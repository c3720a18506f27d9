//! Page display list: what the layout passes produce and the painter consumes.

use std::fmt;
use std::path::PathBuf;

use krilla::image::Image;
use serde::Serialize;

/// RGB colour, 0-255 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const YELLOW: Rgb = Rgb(255, 235, 59);
    pub const RED: Rgb = Rgb(211, 47, 47);
    pub const MARKER_RED: Rgb = Rgb(200, 0, 0);
    pub const LIGHT_GRAY: Rgb = Rgb(230, 230, 230);
    pub const RULE_GRAY: Rgb = Rgb(150, 150, 150);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Weight {
    Regular,
    Bold,
}

/// Axis-aligned rectangle, top-left origin, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Element {
    /// Solid rectangle (highlight bands, separators).
    Fill { rect: Rect, color: Rgb },
    /// One line of text; `y` is the top of the line box.
    Text {
        x: f32,
        y: f32,
        size: f32,
        weight: Weight,
        color: Rgb,
        text: String,
    },
    /// Raster image placed into `rect`; `image` indexes [`PageLayout::images`].
    Image { rect: Rect, image: usize },
}

/// A decoded photo kept alongside the display list.
#[derive(Clone)]
pub struct LoadedImage {
    pub source: PathBuf,
    pub image: Image,
    pub pixel_size: (u32, u32),
}

impl fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedImage")
            .field("source", &self.source)
            .field("pixel_size", &self.pixel_size)
            .finish()
    }
}

/// One fixed-size page worth of drawing operations, in paint order.
#[derive(Debug, Clone, Serialize)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub elements: Vec<Element>,
    #[serde(skip)]
    pub images: Vec<LoadedImage>,
}

impl PageLayout {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn fill(&mut self, rect: Rect, color: Rgb) {
        self.elements.push(Element::Fill { rect, color });
    }

    pub fn text(&mut self, x: f32, y: f32, size: f32, weight: Weight, color: Rgb, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.elements.push(Element::Text {
            x,
            y,
            size,
            weight,
            color,
            text,
        });
    }

    pub fn image(&mut self, rect: Rect, image: LoadedImage) {
        self.images.push(image);
        self.elements.push(Element::Image {
            rect,
            image: self.images.len() - 1,
        });
    }

    /// All text runs, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Text elements whose content equals `needle`.
    pub fn find_text<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .iter()
            .filter(move |e| matches!(e, Element::Text { text, .. } if text == needle))
    }

    pub fn image_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Image { .. }))
            .count()
    }
}

/// Largest size with the aspect ratio of `natural` that fits in `bounds`.
pub fn fit_within(natural: (f32, f32), bounds: (f32, f32)) -> (f32, f32) {
    let (w, h) = natural;
    let (max_w, max_h) = bounds;
    if w <= 0.0 || h <= 0.0 || max_w <= 0.0 || max_h <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_w / w).min(max_h / h);
    (w * scale, h * scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_within_keeps_aspect_ratio() {
        let (w, h) = fit_within((400.0, 200.0), (100.0, 100.0));
        assert_eq!((w, h), (100.0, 50.0));
        let (w, h) = fit_within((100.0, 300.0), (150.0, 150.0));
        assert_eq!((w, h), (50.0, 150.0));
    }

    #[test]
    fn test_fit_within_degenerate() {
        assert_eq!(fit_within((0.0, 10.0), (100.0, 100.0)), (0.0, 0.0));
        assert_eq!(fit_within((10.0, 10.0), (0.0, 100.0)), (0.0, 0.0));
    }

    #[test]
    fn test_empty_text_is_not_recorded() {
        let mut page = PageLayout::new(100.0, 100.0);
        page.text(0.0, 0.0, 10.0, Weight::Regular, Rgb::BLACK, "");
        page.text(0.0, 0.0, 10.0, Weight::Regular, Rgb::BLACK, "x");
        assert_eq!(page.texts().collect::<Vec<_>>(), vec!["x"]);
    }
}
