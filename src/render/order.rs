//! Single-page order sheet: labelled fields on the left, photos on the right.

use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use krilla::image::Image;
use tracing::{debug, warn};

use super::page::{fit_within, LoadedImage, PageLayout, Rect, Rgb, Weight};
use super::paint::check_image;
use crate::dates::{DateHighlight, RenderClock};
use crate::model::{OrderRecord, Photo};
use crate::text::{approx_width, chars_for_width, format_number, strip_diacritics, wrap_text};

// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 36.0;
/// Reserved under the content area for the sugar-sheet marker.
const FOOTER_BAND: f32 = 30.0;
const GUTTER: f32 = 14.0;
const TEXT_COLUMN_SHARE: f32 = 0.55;
const MAX_PHOTO_COLUMN: f32 = 220.0;
const MAX_PHOTOS: usize = 3;
const PHOTO_GAP: f32 = 8.0;

const TITLE_SIZE: f32 = 18.0;
const FIELD_SIZE: f32 = 11.0;
const FALLBACK_SIZE: f32 = 9.0;
const LINE_FACTOR: f32 = 1.35;
const FIELD_GAP: f32 = 4.0;
const BAND_PAD: f32 = 2.0;

const MARKER_TEXT: &str = "ARE FOAIE DE ZAHAR";
const MARKER_SIZE: f32 = 14.0;
const MARKER_HEIGHT: f32 = 22.0;

/// One labelled line group in the text column.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
    pub background: Option<Rgb>,
    pub foreground: Rgb,
}

impl Field {
    fn plain(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: strip_diacritics(&value.into()),
            background: None,
            foreground: Rgb::BLACK,
        }
    }

    fn highlighted(label: &'static str, value: impl Into<String>, highlight: DateHighlight) -> Self {
        Self {
            background: highlight.background(),
            foreground: highlight.foreground(),
            ..Self::plain(label, value)
        }
    }
}

fn push_text(fields: &mut Vec<Field>, label: &'static str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        fields.push(Field::plain(label, v));
    }
}

/// The fields to print, in order; empty values are already dropped.
pub fn order_fields(order: &OrderRecord, clock: &RenderClock) -> Vec<Field> {
    let mut fields = Vec::new();

    push_text(&mut fields, "Client", Some(order.client_name.as_str()));
    push_text(&mut fields, "Telefon", order.client_phone.as_deref());
    push_text(&mut fields, "Livrare", order.delivery_method.as_deref());
    push_text(&mut fields, "Locatie", order.location.as_deref());
    push_text(&mut fields, "Adresa", order.address.as_deref());
    push_text(&mut fields, "Preluat de", order.staff_name.as_deref());

    if let Some(ts) = order.pickup_date {
        let highlight = DateHighlight::classify(Some(clock.day_of(ts)), clock.today);
        fields.push(Field::highlighted("Data ridicare", clock.format_timestamp(ts), highlight));
    }
    if let Some(advance) = order.advance {
        fields.push(Field::plain("Avans", format!("{} lei", format_number(advance))));
    }

    if order.no_cake {
        push_text(&mut fields, "Tort", Some("Fara tort"));
    } else {
        let weight = match order.weight.as_deref() {
            Some(w) if w.eq_ignore_ascii_case("custom") => order.custom_weight.as_deref(),
            Some(w) if !w.trim().is_empty() => Some(w),
            _ => order.custom_weight.as_deref(),
        };
        let floors = order.floors.map(|f| f.to_string());
        push_text(&mut fields, "Tip tort", order.cake_type.as_deref());
        push_text(&mut fields, "Greutate", weight);
        push_text(&mut fields, "Forma", order.shape.as_deref());
        push_text(&mut fields, "Etaje", floors.as_deref());
    }

    if let Some(other) = order.other_products.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        fields.push(Field {
            background: Some(Rgb::YELLOW),
            ..Field::plain("Alte produse", other)
        });
    }

    if !order.no_cake {
        let colors: Vec<&str> = [order.color1.as_deref(), order.color2.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        push_text(&mut fields, "Imbracaminte", order.coating.as_deref());
        push_text(&mut fields, "Culori", Some(colors.join(" / ").as_str()));
        push_text(&mut fields, "Tip decor", order.decor_type.as_deref());
        push_text(&mut fields, "Detalii decor", order.decor_details.as_deref());
    }

    push_text(&mut fields, "Observatii", order.observations.as_deref());

    fields
}

/// Resolves and decodes photos from disk.
#[derive(Debug, Clone)]
pub struct PhotoLoader {
    /// Directory public URLs are relative to.
    pub public_root: PathBuf,
}

impl PhotoLoader {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    /// Stored path first, then the URL under the public root.
    pub fn resolve(&self, photo: &Photo) -> Option<PathBuf> {
        let stored = photo.path.as_deref().filter(|p| !p.is_empty()).map(PathBuf::from);
        let by_url = self.public_root.join(photo.url.trim_start_matches('/'));
        stored.into_iter().chain(std::iter::once(by_url)).find(|p| p.is_file())
    }

    pub fn load(&self, photo: &Photo) -> anyhow::Result<LoadedImage> {
        let source = self
            .resolve(photo)
            .ok_or_else(|| anyhow!("photo {} not found on disk", photo.url))?;
        let bytes = fs::read(&source).with_context(|| format!("Failed to read {}", source.display()))?;
        let image = decode_image(bytes)?;
        check_image(&image)?;
        let pixel_size = image.size();
        Ok(LoadedImage {
            source,
            image,
            pixel_size,
        })
    }
}

fn decode_image(bytes: Vec<u8>) -> anyhow::Result<Image> {
    let decoded = if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Image::from_png(bytes.into(), true)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Image::from_jpeg(bytes.into(), true)
    } else if bytes.starts_with(b"GIF8") {
        Image::from_gif(bytes.into(), true)
    } else if bytes.len() > 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        Image::from_webp(bytes.into(), true)
    } else {
        bail!("unsupported image format");
    };
    decoded.map_err(|e| anyhow!("Failed to decode image: {:?}", e))
}

struct Columns {
    text_x: f32,
    text_width: f32,
    photo_x: f32,
    photo_width: f32,
    top: f32,
    bottom: f32,
}

impl Columns {
    fn new() -> Self {
        let content_width = PAGE_WIDTH - 2.0 * MARGIN;
        let text_width = (content_width * TEXT_COLUMN_SHARE).max(content_width - MAX_PHOTO_COLUMN - GUTTER);
        Self {
            text_x: MARGIN,
            text_width,
            photo_x: MARGIN + text_width + GUTTER,
            photo_width: content_width - text_width - GUTTER,
            top: MARGIN,
            bottom: PAGE_HEIGHT - MARGIN - FOOTER_BAND,
        }
    }
}

/// Lays out the whole order sheet.
pub fn layout_order(order: &OrderRecord, clock: &RenderClock, photos: &PhotoLoader) -> PageLayout {
    let mut page = PageLayout::new(PAGE_WIDTH, PAGE_HEIGHT);
    let cols = Columns::new();
    let (sugar_sheet, regular) = order.split_photos();

    let mut y = cols.top;
    page.text(
        cols.text_x,
        y,
        TITLE_SIZE,
        Weight::Bold,
        Rgb::BLACK,
        format!("COMANDA #{}", order.order_number),
    );
    y += TITLE_SIZE * LINE_FACTOR + FIELD_GAP;

    let fields = order_fields(order, clock);
    let total = fields.len();
    for (idx, field) in fields.iter().enumerate() {
        match draw_field(&mut page, field, cols.text_x, cols.text_width, y, cols.bottom) {
            FieldFit::Whole(height) => y += height + FIELD_GAP,
            FieldFit::Cut { shown, total_lines } => {
                warn!(
                    order = order.order_number,
                    field = field.label,
                    shown,
                    total_lines,
                    dropped = total - idx - 1,
                    "Order sheet full, field cut and remaining fields dropped"
                );
                break;
            }
            FieldFit::None => {
                warn!(
                    order = order.order_number,
                    dropped = total - idx,
                    "Order sheet full, remaining fields dropped"
                );
                break;
            }
        }
    }

    draw_photos(&mut page, &regular, photos, &cols);

    if sugar_sheet.is_some() {
        draw_sugar_sheet_marker(&mut page);
    }

    page
}

/// How much of a field made it onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
enum FieldFit {
    /// Every line drawn; the band height.
    Whole(f32),
    /// Only the first `shown` lines fit above the bottom.
    Cut { shown: usize, total_lines: usize },
    /// Not even one line fits.
    None,
}

/// Draws as many lines of `field` as fit between `y` and `bottom`.
fn draw_field(page: &mut PageLayout, field: &Field, x: f32, width: f32, y: f32, bottom: f32) -> FieldFit {
    let line_height = FIELD_SIZE * LINE_FACTOR;
    let label = format!("{}: ", field.label);
    let label_width = approx_width(&label, FIELD_SIZE, true);
    let inner = width - 2.0 * BAND_PAD;

    let mut lines = wrap_text(
        &field.value,
        chars_for_width(inner - label_width, FIELD_SIZE, false),
        chars_for_width(inner, FIELD_SIZE, false),
    );
    let total_lines = lines.len().max(1);
    let room = ((bottom - y - 2.0 * BAND_PAD) / line_height).floor();
    if room < 1.0 {
        return FieldFit::None;
    }
    let shown = total_lines.min(room as usize);
    lines.truncate(shown);

    let height = shown as f32 * line_height + 2.0 * BAND_PAD;
    if let Some(background) = field.background {
        page.fill(Rect::new(x, y, width, height), background);
    }
    let text_y = y + BAND_PAD;
    page.text(x + BAND_PAD, text_y, FIELD_SIZE, Weight::Bold, field.foreground, label);
    for (i, line) in lines.into_iter().enumerate() {
        let line_x = if i == 0 { x + BAND_PAD + label_width } else { x + BAND_PAD };
        page.text(
            line_x,
            text_y + i as f32 * line_height,
            FIELD_SIZE,
            Weight::Regular,
            field.foreground,
            line,
        );
    }

    if shown < total_lines {
        FieldFit::Cut { shown, total_lines }
    } else {
        FieldFit::Whole(height)
    }
}

fn draw_photos(page: &mut PageLayout, regular: &[&Photo], loader: &PhotoLoader, cols: &Columns) {
    let shown = &regular[..regular.len().min(MAX_PHOTOS)];
    if shown.is_empty() {
        return;
    }
    if regular.len() > MAX_PHOTOS {
        debug!(total = regular.len(), shown = MAX_PHOTOS, "Extra photos not printed");
    }

    let count = shown.len() as f32;
    let available = cols.bottom - cols.top;
    let cell_height = (available - PHOTO_GAP * (count - 1.0)) / count;

    for (i, photo) in shown.iter().enumerate() {
        let cell = Rect::new(
            cols.photo_x,
            cols.top + i as f32 * (cell_height + PHOTO_GAP),
            cols.photo_width,
            cell_height,
        );
        match loader.load(photo) {
            Ok(loaded) => {
                let natural = (loaded.pixel_size.0 as f32, loaded.pixel_size.1 as f32);
                let (w, h) = fit_within(natural, (cell.width, cell.height));
                let x = cell.x + (cell.width - w) / 2.0;
                page.image(Rect::new(x, cell.y, w, h), loaded);
            }
            Err(err) => {
                warn!(photo = photo.id, error = %err, "Photo unavailable, printing its URL");
                draw_photo_fallback(page, photo, &cell);
            }
        }
    }
}

fn draw_photo_fallback(page: &mut PageLayout, photo: &Photo, cell: &Rect) {
    let line_height = FALLBACK_SIZE * LINE_FACTOR;
    let max_chars = chars_for_width(cell.width, FALLBACK_SIZE, false);
    let text = format!("Imagine indisponibila: {}", photo.url);
    let mut y = cell.y;
    for line in wrap_text(&text, max_chars, max_chars) {
        if y + line_height > cell.bottom() {
            break;
        }
        page.text(cell.x, y, FALLBACK_SIZE, Weight::Regular, Rgb::BLACK, line);
        y += line_height;
    }
}

/// Pinned to the bottom margin, drawn after everything else.
fn draw_sugar_sheet_marker(page: &mut PageLayout) {
    let width = PAGE_WIDTH - 2.0 * MARGIN;
    let band = Rect::new(MARGIN, PAGE_HEIGHT - MARGIN - MARKER_HEIGHT, width, MARKER_HEIGHT);
    page.fill(band, Rgb::YELLOW);
    let text_width = approx_width(MARKER_TEXT, MARKER_SIZE, true);
    page.text(
        band.x + (band.width - text_width).max(0.0) / 2.0,
        band.y + (MARKER_HEIGHT - MARKER_SIZE) / 2.0,
        MARKER_SIZE,
        Weight::Bold,
        Rgb::MARKER_RED,
        MARKER_TEXT,
    );
}

/// 4x2 RGB PNG used by photo tests.
#[cfg(test)]
pub(crate) const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d,
    0x49, 0x48, 0x44, 0x52, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x02,
    0x08, 0x02, 0x00, 0x00, 0x00, 0xf0, 0xca, 0xea, 0x34, 0x00, 0x00, 0x00,
    0x10, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x38, 0x21, 0x27, 0x07,
    0x47, 0x0c, 0xc8, 0x1c, 0x00, 0x6f, 0x0a, 0x08, 0x21, 0x06, 0xa5, 0xd2,
    0x76, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60,
    0x82,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::page::Element;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    fn clock() -> RenderClock {
        RenderClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        )
    }

    fn order() -> OrderRecord {
        OrderRecord {
            order_number: 5,
            client_name: "Ana Popescu".to_string(),
            client_phone: Some("0722000000".to_string()),
            cake_type: Some("Tort cu ciocolată".to_string()),
            ..OrderRecord::default()
        }
    }

    fn photo(id: i64, sugar: bool) -> Photo {
        Photo {
            id,
            url: format!("/uploads/missing-{}.jpg", id),
            path: Some(format!("/nonexistent/missing-{}.jpg", id)),
            is_foaie_de_zahar: sugar,
        }
    }

    fn loader() -> PhotoLoader {
        PhotoLoader::new("/nonexistent-public-root")
    }

    fn field_fill_color(page: &PageLayout, label: &str) -> Option<Rgb> {
        let label_y = page.elements.iter().find_map(|e| match e {
            Element::Text { text, y, .. } if text == &format!("{}: ", label) => Some(*y),
            _ => None,
        })?;
        page.elements.iter().find_map(|e| match e {
            Element::Fill { rect, color } if rect.y <= label_y && rect.bottom() > label_y => Some(*color),
            _ => None,
        })
    }

    #[test]
    fn test_empty_fields_are_skipped() {
        let fields = order_fields(&order(), &clock());
        let labels: Vec<_> = fields.iter().map(|f| f.label).collect();
        assert_eq!(labels, vec!["Client", "Telefon", "Tip tort"]);
        assert_eq!(fields[2].value, "Tort cu ciocolata");
    }

    #[test]
    fn test_no_cake_hides_cake_and_decor() {
        let mut o = order();
        o.no_cake = true;
        o.coating = Some("fondant".to_string());
        let labels: Vec<_> = order_fields(&o, &clock()).iter().map(|f| f.label).collect();
        assert_eq!(labels, vec!["Client", "Telefon", "Tort"]);
    }

    #[test]
    fn test_custom_weight_replaces_placeholder() {
        let mut o = order();
        o.weight = Some("custom".to_string());
        o.custom_weight = Some("3.5 kg".to_string());
        let fields = order_fields(&o, &clock());
        let weight = fields.iter().find(|f| f.label == "Greutate").unwrap();
        assert_eq!(weight.value, "3.5 kg");
    }

    #[test]
    fn test_pickup_date_highlight() {
        let mut o = order();
        o.pickup_date = Some(Utc.with_ymd_and_hms(2024, 6, 9, 12, 0, 0).unwrap());
        let page = layout_order(&o, &clock(), &loader());
        assert_eq!(field_fill_color(&page, "Data ridicare"), Some(Rgb::YELLOW));

        o.pickup_date = Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        let page = layout_order(&o, &clock(), &loader());
        assert_eq!(field_fill_color(&page, "Data ridicare"), Some(Rgb::RED));
        let label_color = page.find_text("Data ridicare: ").find_map(|e| match e {
            Element::Text { color, .. } => Some(*color),
            _ => None,
        });
        assert_eq!(label_color, Some(Rgb::WHITE));

        o.pickup_date = Some(Utc.with_ymd_and_hms(2024, 6, 12, 12, 0, 0).unwrap());
        let page = layout_order(&o, &clock(), &loader());
        assert_eq!(field_fill_color(&page, "Data ridicare"), None);
    }

    #[test]
    fn test_other_products_always_yellow() {
        let mut o = order();
        o.other_products = Some("10 fursecuri".to_string());
        let page = layout_order(&o, &clock(), &loader());
        assert_eq!(field_fill_color(&page, "Alte produse"), Some(Rgb::YELLOW));
        assert_eq!(field_fill_color(&page, "Client"), None);
    }

    #[test]
    fn test_sugar_sheet_photo_is_kept_out_of_the_grid() {
        let mut o = order();
        o.photos = vec![photo(1, false), photo(2, true)];
        let page = layout_order(&o, &clock(), &loader());

        let fallbacks: Vec<_> = page
            .texts()
            .filter(|t| t.starts_with("Imagine indisponibila"))
            .collect();
        assert_eq!(fallbacks.len(), 1);
        assert!(fallbacks[0].contains("missing-1"));
        assert_eq!(page.find_text(MARKER_TEXT).count(), 1);
    }

    #[test]
    fn test_marker_is_last_and_pinned_to_bottom() {
        let mut o = order();
        o.photos = vec![photo(1, true)];
        o.observations = Some("x".repeat(50));
        let page = layout_order(&o, &clock(), &loader());

        match page.elements.last() {
            Some(Element::Text { text, y, .. }) => {
                assert_eq!(text, MARKER_TEXT);
                assert!(*y > PAGE_HEIGHT - MARGIN - MARKER_HEIGHT);
            }
            other => panic!("unexpected last element {:?}", other),
        }
        let content_bottom = PAGE_HEIGHT - MARGIN - FOOTER_BAND;
        let collides = page.elements.iter().any(|e| match e {
            Element::Text { text, y, .. } if text != MARKER_TEXT => *y > content_bottom,
            _ => false,
        });
        assert!(!collides);
    }

    #[test]
    fn test_no_marker_without_flag() {
        let mut o = order();
        o.photos = vec![photo(1, false)];
        let page = layout_order(&o, &clock(), &loader());
        assert_eq!(page.find_text(MARKER_TEXT).count(), 0);
    }

    #[test]
    fn test_at_most_three_photo_cells() {
        let mut o = order();
        o.photos = (1..=5).map(|i| photo(i, false)).collect();
        let page = layout_order(&o, &clock(), &loader());
        let cells = page.texts().filter(|t| t.starts_with("Imagine indisponibila")).count();
        assert_eq!(cells, 3);
    }

    #[test]
    fn test_overflowing_field_is_cut_and_later_fields_dropped() {
        let mut o = order();
        o.other_products = Some("Fursecuri cu unt si vanilie ".repeat(200));
        o.observations = Some("Ultimul camp".to_string());
        let page = layout_order(&o, &clock(), &loader());

        assert_eq!(page.find_text("Client: ").count(), 1);
        assert_eq!(page.find_text("Alte produse: ").count(), 1);
        assert_eq!(page.find_text("Observatii: ").count(), 0);

        let bottom = PAGE_HEIGHT - MARGIN - FOOTER_BAND;
        let value_lines: Vec<f32> = page
            .elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, y, .. } if text.contains("Fursecuri") => Some(*y),
                _ => None,
            })
            .collect();
        assert!(value_lines.len() > 10);
        // The column is used down to its last line, not abandoned early.
        let last = value_lines.iter().cloned().fold(0.0, f32::max);
        assert!(last + 3.0 * FIELD_SIZE * LINE_FACTOR > bottom);

        for e in &page.elements {
            match e {
                Element::Text { y, size, .. } => assert!(y + size <= bottom),
                Element::Fill { rect, .. } => assert!(rect.bottom() <= bottom + 0.01),
                Element::Image { .. } => {}
            }
        }
        assert_eq!(field_fill_color(&page, "Alte produse"), Some(Rgb::YELLOW));
    }

    #[test]
    fn test_text_column_respects_photo_budget() {
        let cols = Columns::new();
        assert!(cols.photo_width <= MAX_PHOTO_COLUMN + 0.01);
        assert!(cols.text_width >= (PAGE_WIDTH - 2.0 * MARGIN) * TEXT_COLUMN_SHARE);
    }

    #[test]
    fn test_resolve_prefers_stored_path_then_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(public.join("uploads")).unwrap();
        fs::write(public.join("uploads/a.jpg"), b"x").unwrap();
        let stored = dir.path().join("stored.jpg");

        let loader = PhotoLoader::new(&public);
        let mut p = Photo {
            id: 1,
            url: "/uploads/a.jpg".to_string(),
            path: Some(stored.to_string_lossy().into_owned()),
            is_foaie_de_zahar: false,
        };
        assert_eq!(loader.resolve(&p), Some(public.join("uploads/a.jpg")));

        fs::write(&stored, b"x").unwrap();
        assert_eq!(loader.resolve(&p), Some(stored.clone()));

        p.url = "/uploads/none.jpg".to_string();
        fs::remove_file(&stored).unwrap();
        assert_eq!(loader.resolve(&p), None);
    }

    #[test]
    fn test_undecodable_photo_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.jpg"), b"not an image").unwrap();
        let loader = PhotoLoader::new(dir.path());
        let p = Photo {
            id: 1,
            url: "/bad.jpg".to_string(),
            path: None,
            is_foaie_de_zahar: false,
        };
        assert!(loader.load(&p).is_err());
    }

    fn stored_photo(dir: &std::path::Path, name: &str, bytes: &[u8]) -> Photo {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        Photo {
            id: 1,
            url: format!("/uploads/{}", name),
            path: Some(path.to_string_lossy().into_owned()),
            is_foaie_de_zahar: false,
        }
    }

    #[test]
    fn test_valid_png_is_placed_in_its_cell() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = order();
        o.photos = vec![stored_photo(dir.path(), "ok.png", TINY_PNG)];

        let loaded = loader().load(&o.photos[0]).unwrap();
        assert_eq!(loaded.pixel_size, (4, 2));

        let page = layout_order(&o, &clock(), &loader());
        assert_eq!(page.image_count(), 1);
        let cols = Columns::new();
        let rect = page
            .elements
            .iter()
            .find_map(|e| match e {
                Element::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .unwrap();
        assert!((rect.width - cols.photo_width).abs() < 0.01);
        assert!((rect.height - cols.photo_width / 2.0).abs() < 0.01);
    }

    #[test]
    fn test_truncated_png_falls_back_to_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut o = order();
        o.photos = vec![stored_photo(dir.path(), "cut.png", &TINY_PNG[..45])];

        assert!(loader().load(&o.photos[0]).is_err());

        let page = layout_order(&o, &clock(), &loader());
        assert_eq!(page.image_count(), 0);
        assert!(page.texts().any(|t| t == "Imagine indisponibila: /uploads/cut.png"));
    }
}
