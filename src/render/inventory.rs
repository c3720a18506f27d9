//! Landscape inventory sheet: three main columns, each split into
//! product name | INV (on hand) | NEC (required), filled top to bottom.

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::page::{PageLayout, Rect, Rgb, Weight};
use crate::dates::{short_date, DateHighlight, RenderClock};
use crate::model::{CategoryDefinition, InventoryRecord, StockLine};
use crate::text::{approx_width, chars_for_width, format_number, strip_diacritics, truncate_to};

// A4 landscape, in points.
pub const PAGE_WIDTH: f32 = 841.89;
pub const PAGE_HEIGHT: f32 = 595.28;
const MARGIN: f32 = 20.0;
const HEADER_HEIGHT: f32 = 26.0;
const CAPTION_HEIGHT: f32 = 11.0;
const COLUMN_GAP: f32 = 8.0;
const COLUMNS: usize = 3;

const NAME_SHARE: f32 = 0.40;
const INV_SHARE: f32 = 0.32;

const CATEGORY_HEIGHT: f32 = 12.0;
const ROW_HEIGHT: f32 = 10.5;
const CELL_PAD: f32 = 2.0;
const RULE: f32 = 0.4;

const TITLE_SIZE: f32 = 12.0;
const CATEGORY_SIZE: f32 = 7.5;
const CELL_SIZE: f32 = 6.5;

/// On-hand cell: text plus the recency highlight of its reception date.
#[derive(Debug, Clone, PartialEq)]
pub struct InvCell {
    pub text: String,
    pub highlight: DateHighlight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// Only set on a product's first row.
    pub name: Option<String>,
    pub inv: Option<InvCell>,
    pub nec: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridGroup {
    pub category: String,
    pub rows: Vec<GridRow>,
}

fn stock_row(name: Option<&str>, line: &StockLine, today: NaiveDate) -> GridRow {
    let inv = (line.quantity > 0.0).then(|| {
        let amount = format!("{} {}", format_number(line.quantity), line.unit.trim());
        let text = match line.reception_date {
            Some(date) => format!("{} {}", short_date(date), amount),
            None => amount,
        };
        InvCell {
            text: strip_diacritics(text.trim()),
            highlight: DateHighlight::classify(line.reception_date, today),
        }
    });
    let nec = (line.required_quantity > 0.0).then(|| {
        let text = format!("{} {}", format_number(line.required_quantity), line.required_unit.trim());
        strip_diacritics(text.trim())
    });
    GridRow {
        name: name.map(strip_diacritics),
        inv,
        nec,
    }
}

/// One row per stock line with data, or a single empty row.
fn product_rows(record: &InventoryRecord, category: &str, product: &str, today: NaiveDate) -> Vec<GridRow> {
    let lines: Vec<&StockLine> = record.lines_for(category, product).collect();
    if lines.is_empty() {
        return vec![GridRow {
            name: Some(strip_diacritics(product)),
            inv: None,
            nec: None,
        }];
    }
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| stock_row((i == 0).then_some(product), line, today))
        .collect()
}

/// Submitted products of `category` not in `known`, in submission order.
fn custom_products<'a>(record: &'a InventoryRecord, category: &str, known: &[String]) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for entry in record.entries.iter().filter(|e| e.category == category) {
        let name = entry.product_name.as_str();
        if name.trim().is_empty() || known.iter().any(|k| k == name) || out.contains(&name) {
            continue;
        }
        out.push(name);
    }
    out
}

/// Row model for the whole sheet, before placement.
///
/// Every known product yields at least one row. Custom products follow the
/// known ones; categories present only in the submission come last.
pub fn plan_rows(record: &InventoryRecord, categories: &[CategoryDefinition], clock: &RenderClock) -> Vec<GridGroup> {
    let mut groups = Vec::new();

    for category in categories {
        let mut rows = Vec::new();
        for product in &category.products {
            rows.extend(product_rows(record, &category.name, product, clock.today));
        }
        for product in custom_products(record, &category.name, &category.products) {
            rows.extend(product_rows(record, &category.name, product, clock.today));
        }
        groups.push(GridGroup {
            category: strip_diacritics(&category.name),
            rows,
        });
    }

    let mut unknown: Vec<&str> = Vec::new();
    for entry in &record.entries {
        let name = entry.category.as_str();
        if !categories.iter().any(|c| c.name == name) && !unknown.contains(&name) {
            unknown.push(name);
        }
    }
    for category in unknown {
        let mut rows = Vec::new();
        for product in custom_products(record, category, &[]) {
            rows.extend(product_rows(record, category, product, clock.today));
        }
        debug!(category, rows = rows.len(), "Category not in definitions, appended");
        groups.push(GridGroup {
            category: strip_diacritics(category),
            rows,
        });
    }

    groups
}

/// Vertical flow cursor across the main columns of one page.
#[derive(Debug, Clone)]
pub struct ColumnFlow {
    column: usize,
    columns: usize,
    y: f32,
    top: f32,
    bottom: f32,
    exhausted: bool,
}

impl ColumnFlow {
    pub fn new(columns: usize, top: f32, bottom: f32) -> Self {
        Self {
            column: 0,
            columns,
            y: top,
            top,
            bottom,
            exhausted: false,
        }
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Reserves `height` and returns `(column, y)`, moving to the next column
    /// when the current one is full. Returns `None` once the last column is
    /// full; from then on every request fails.
    pub fn place(&mut self, height: f32) -> Option<(usize, f32)> {
        self.place_with_next(height, 0.0)
    }

    /// Like [`Self::place`], but only where `next` more points also fit in the
    /// same column. Only `height` is reserved.
    pub fn place_with_next(&mut self, height: f32, next: f32) -> Option<(usize, f32)> {
        if self.exhausted {
            return None;
        }
        let needed = height + next;
        if needed > self.bottom - self.top {
            return None;
        }
        while self.y + needed > self.bottom {
            if !self.advance_column() {
                self.exhausted = true;
                return None;
            }
        }
        let at = self.y;
        self.y += height;
        Some((self.column, at))
    }

    fn advance_column(&mut self) -> bool {
        if self.column + 1 >= self.columns {
            return false;
        }
        self.column += 1;
        self.y = self.top;
        true
    }
}

#[derive(Debug, Clone, Copy)]
struct Grid {
    column_width: f32,
    name_width: f32,
    inv_width: f32,
    nec_width: f32,
}

impl Grid {
    fn new() -> Self {
        let content = PAGE_WIDTH - 2.0 * MARGIN;
        let column_width = (content - COLUMN_GAP * (COLUMNS as f32 - 1.0)) / COLUMNS as f32;
        let name_width = column_width * NAME_SHARE;
        let inv_width = column_width * INV_SHARE;
        Self {
            column_width,
            name_width,
            inv_width,
            nec_width: column_width - name_width - inv_width,
        }
    }

    fn column_x(&self, column: usize) -> f32 {
        MARGIN + column as f32 * (self.column_width + COLUMN_GAP)
    }

    fn inv_x(&self, column: usize) -> f32 {
        self.column_x(column) + self.name_width
    }

    fn nec_x(&self, column: usize) -> f32 {
        self.inv_x(column) + self.inv_width
    }
}

/// Lays out the inventory sheet; `version` is printed in the header.
pub fn layout_inventory(
    record: &InventoryRecord,
    categories: &[CategoryDefinition],
    clock: &RenderClock,
    version: u32,
) -> PageLayout {
    let mut page = PageLayout::new(PAGE_WIDTH, PAGE_HEIGHT);
    let grid = Grid::new();

    draw_header(&mut page, record, version);

    let caption_y = MARGIN + HEADER_HEIGHT;
    for column in 0..COLUMNS {
        draw_caption(&mut page, &grid, column, caption_y);
    }

    let top = caption_y + CAPTION_HEIGHT;
    let bottom = PAGE_HEIGHT - MARGIN;
    let mut flow = ColumnFlow::new(COLUMNS, top, bottom);
    let mut rules: Vec<(usize, f32)> = Vec::new();
    let mut dropped = 0usize;

    for group in plan_rows(record, categories, clock) {
        // Keep the header in the same column as its first row.
        let first_row = if group.rows.is_empty() { 0.0 } else { ROW_HEIGHT };
        match flow.place_with_next(CATEGORY_HEIGHT, first_row) {
            Some((column, y)) => {
                let band = Rect::new(grid.column_x(column), y, grid.column_width, CATEGORY_HEIGHT);
                page.fill(band, Rgb::LIGHT_GRAY);
                let max_chars = chars_for_width(grid.column_width - 2.0 * CELL_PAD, CATEGORY_SIZE, true);
                page.text(
                    band.x + CELL_PAD,
                    y + (CATEGORY_HEIGHT - CATEGORY_SIZE) / 2.0,
                    CATEGORY_SIZE,
                    Weight::Bold,
                    Rgb::BLACK,
                    truncate_to(&group.category.to_uppercase(), max_chars),
                );
                rules.push((column, y + CATEGORY_HEIGHT));
            }
            None => {
                dropped += 1 + group.rows.len();
                continue;
            }
        }

        for row in &group.rows {
            let Some((column, y)) = flow.place(ROW_HEIGHT) else {
                dropped += 1;
                continue;
            };
            draw_row(&mut page, &grid, column, y, row);
            rules.push((column, y + ROW_HEIGHT));
        }
    }

    if dropped > 0 {
        warn!(
            user = %record.username,
            dropped,
            "Inventory sheet full, remaining rows dropped"
        );
    }

    draw_separators(&mut page, &grid, &rules, caption_y, bottom);
    page
}

fn draw_header(page: &mut PageLayout, record: &InventoryRecord, version: u32) {
    let title = format!(
        "INVENTAR - {} - {}",
        strip_diacritics(&record.username),
        record.date.format("%d.%m.%Y")
    );
    page.text(MARGIN, MARGIN, TITLE_SIZE, Weight::Bold, Rgb::BLACK, title);

    let stamp = format!("v{}", version);
    let stamp_x = PAGE_WIDTH - MARGIN - approx_width(&stamp, TITLE_SIZE, true);
    page.text(stamp_x, MARGIN, TITLE_SIZE, Weight::Bold, Rgb::BLACK, stamp);
}

fn draw_caption(page: &mut PageLayout, grid: &Grid, column: usize, y: f32) {
    page.fill(
        Rect::new(grid.column_x(column), y, grid.column_width, CAPTION_HEIGHT),
        Rgb::LIGHT_GRAY,
    );
    let text_y = y + (CAPTION_HEIGHT - CELL_SIZE) / 2.0;
    for (x, caption) in [
        (grid.column_x(column), "Produs"),
        (grid.inv_x(column), "INV"),
        (grid.nec_x(column), "NEC"),
    ] {
        page.text(x + CELL_PAD, text_y, CELL_SIZE, Weight::Bold, Rgb::BLACK, caption);
    }
}

fn draw_row(page: &mut PageLayout, grid: &Grid, column: usize, y: f32, row: &GridRow) {
    let text_y = y + (ROW_HEIGHT - CELL_SIZE) / 2.0;

    if let Some(name) = &row.name {
        let max_chars = chars_for_width(grid.name_width - 2.0 * CELL_PAD, CELL_SIZE, false);
        page.text(
            grid.column_x(column) + CELL_PAD,
            text_y,
            CELL_SIZE,
            Weight::Regular,
            Rgb::BLACK,
            truncate_to(name, max_chars),
        );
    }

    if let Some(inv) = &row.inv {
        let x = grid.inv_x(column);
        if let Some(background) = inv.highlight.background() {
            page.fill(Rect::new(x, y, grid.inv_width, ROW_HEIGHT), background);
        }
        let max_chars = chars_for_width(grid.inv_width - 2.0 * CELL_PAD, CELL_SIZE, false);
        page.text(
            x + CELL_PAD,
            text_y,
            CELL_SIZE,
            Weight::Regular,
            inv.highlight.foreground(),
            truncate_to(&inv.text, max_chars),
        );
    }

    if let Some(nec) = &row.nec {
        let max_chars = chars_for_width(grid.nec_width - 2.0 * CELL_PAD, CELL_SIZE, true);
        page.text(
            grid.nec_x(column) + CELL_PAD,
            text_y,
            CELL_SIZE,
            Weight::Bold,
            Rgb::BLACK,
            truncate_to(nec, max_chars),
        );
    }
}

/// Row rules plus every vertical divider, in one pass after the rows.
fn draw_separators(page: &mut PageLayout, grid: &Grid, rules: &[(usize, f32)], top: f32, bottom: f32) {
    for &(column, y) in rules {
        page.fill(
            Rect::new(grid.column_x(column), y - RULE / 2.0, grid.column_width, RULE),
            Rgb::RULE_GRAY,
        );
    }

    let height = bottom - top;
    for column in 0..COLUMNS {
        for x in [grid.inv_x(column), grid.nec_x(column)] {
            page.fill(Rect::new(x - RULE / 2.0, top, RULE, height), Rgb::RULE_GRAY);
        }
        if column + 1 < COLUMNS {
            let x = grid.column_x(column) + grid.column_width + COLUMN_GAP / 2.0;
            page.fill(Rect::new(x - RULE / 2.0, top, RULE, height), Rgb::RULE_GRAY);
        }
    }
}
