//! Document renderers.
//!
//! This module is split into:
//! - `page.rs` - Display list produced by the layout passes
//! - `order.rs` - Single-page order sheet
//! - `inventory.rs` - Landscape inventory grid
//! - `paint.rs` - krilla painter and PDF writer

pub mod inventory;
pub mod order;
pub mod page;
pub mod paint;

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use crate::dates::RenderClock;
use crate::fonts::FontFaces;
use crate::model::{validate_categories, CategoryDefinition, InventoryRecord, OrderRecord};
use crate::naming::{allocate_file_name, document_version, inventory_file_name, order_file_name};
use crate::settings::RenderSettings;
use crate::version::{check_version, layout_fingerprint, ConfigStore, VersionOutcome};
use order::PhotoLoader;

const GENERATION_FAILED: &str = "could not generate document";

/// A written inventory sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryDocument {
    pub path: PathBuf,
    /// Version printed on the sheet, derived from the file name.
    pub stamp_version: u32,
    /// Persisted document version after the layout-change check.
    pub document_version: VersionOutcome,
}

/// Renders records to PDF files in one output directory.
///
/// Holds no per-document state; concurrent calls each build their own page
/// and document.
#[derive(Clone)]
pub struct Renderer {
    output_dir: PathBuf,
    fonts: FontFaces,
    photos: PhotoLoader,
}

impl Renderer {
    pub fn new(output_dir: impl Into<PathBuf>, fonts: FontFaces, public_root: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            fonts,
            photos: PhotoLoader::new(public_root),
        }
    }

    pub fn from_settings(settings: &RenderSettings, fonts: FontFaces) -> Self {
        Self::new(&settings.output_dir, fonts, &settings.public_root)
    }

    fn prepare_output_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create output directory {}", self.output_dir.display()))
    }

    /// Writes the order sheet and returns its path.
    pub fn render_order(&self, order: &OrderRecord, clock: &RenderClock) -> anyhow::Result<PathBuf> {
        self.prepare_output_dir().context(GENERATION_FAILED)?;
        let name = allocate_file_name(&self.output_dir, &order_file_name(order.order_number));
        let path = self.output_dir.join(&name);

        let page = order::layout_order(order, clock, &self.photos);
        paint::write_pdf(&page, &self.fonts, &path).context(GENERATION_FAILED)?;

        info!(order = order.order_number, path = ?path, "Order sheet generated");
        Ok(path)
    }

    /// Writes the inventory sheet, then runs the layout-change version check.
    pub fn render_inventory(
        &self,
        record: &InventoryRecord,
        categories: &[CategoryDefinition],
        clock: &RenderClock,
        store: &mut dyn ConfigStore,
    ) -> anyhow::Result<InventoryDocument> {
        validate_categories(categories).context(GENERATION_FAILED)?;
        self.prepare_output_dir().context(GENERATION_FAILED)?;

        let base = inventory_file_name(&record.username, record.date);
        let name = allocate_file_name(&self.output_dir, &base);
        let stamp_version = document_version(&base, &name);
        let path = self.output_dir.join(&name);

        let page = inventory::layout_inventory(record, categories, clock, stamp_version);
        paint::write_pdf(&page, &self.fonts, &path).context(GENERATION_FAILED)?;

        let document_version = check_version(store, &layout_fingerprint(), record.document_version);

        info!(
            user = %record.username,
            path = ?path,
            stamp_version,
            document_version = document_version.version,
            "Inventory sheet generated"
        );
        Ok(InventoryDocument {
            path,
            stamp_version,
            document_version,
        })
    }
}
