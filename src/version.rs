//! Detects layout changes between deployments and bumps the stored
//! document version when they happen.
//!
//! The fingerprint covers [`LAYOUT_REVISION`] and the display lists produced
//! for fixed reference inputs, so any change to what the renderers draw shows
//! up without hashing source text.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Offset, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::dates::RenderClock;
use crate::model::{CategoryDefinition, InventoryEntry, InventoryRecord, OrderRecord, StockLine};
use crate::render::inventory::layout_inventory;
use crate::render::order::{layout_order, PhotoLoader};

/// Bump by hand when output changes in a way the reference inputs miss.
pub const LAYOUT_REVISION: u32 = 1;

/// Config key holding the fingerprint of the last deployed layout.
pub const FINGERPRINT_KEY: &str = "inventoryPdfLogicHash";

/// Generic key-value configuration storage.
pub trait ConfigStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// String map persisted as a JSON object.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> anyhow::Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", self.path.display()))
    }
}

impl ConfigStore for JsonFileStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&values)?;
        fs::write(&self.path, json).with_context(|| format!("Failed to write {}", self.path.display()))
    }
}

fn reference_clock() -> RenderClock {
    RenderClock::new(
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap_or_default(),
        Utc.fix(),
    )
}

fn reference_inventory() -> (InventoryRecord, Vec<CategoryDefinition>) {
    let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap_or_default();
    let record = InventoryRecord {
        id: 0,
        user_id: 0,
        username: "referinta".to_string(),
        date: day(10),
        pdf_path: None,
        document_version: None,
        entries: vec![
            InventoryEntry {
                category: "Creme".to_string(),
                product_name: "Frisca".to_string(),
                is_custom_product: false,
                stock_lines: vec![
                    StockLine {
                        reception_date: Some(day(8)),
                        quantity: 2.0,
                        unit: "kg".to_string(),
                        required_quantity: 1.5,
                        required_unit: "kg".to_string(),
                    },
                    StockLine {
                        reception_date: Some(day(9)),
                        quantity: 1.0,
                        unit: "kg".to_string(),
                        ..StockLine::default()
                    },
                ],
            },
            InventoryEntry {
                category: "Creme".to_string(),
                product_name: "Ganache alb".to_string(),
                is_custom_product: true,
                stock_lines: vec![StockLine {
                    required_quantity: 3.0,
                    required_unit: "buc".to_string(),
                    ..StockLine::default()
                }],
            },
        ],
    };
    let categories = vec![CategoryDefinition {
        name: "Creme".to_string(),
        units: vec!["kg".to_string(), "buc".to_string()],
        default_unit: "kg".to_string(),
        products: vec!["Frisca".to_string(), "Mascarpone".to_string()],
    }];
    (record, categories)
}

fn reference_order() -> OrderRecord {
    OrderRecord {
        order_number: 1,
        client_name: "Referinta".to_string(),
        client_phone: Some("0700000000".to_string()),
        cake_type: Some("Tort".to_string()),
        weight: Some("2 kg".to_string()),
        other_products: Some("Fursecuri".to_string()),
        observations: Some("Text de referinta pentru amprenta".to_string()),
        ..OrderRecord::default()
    }
}

/// SHA-256 hex digest over the revision constant and the reference layouts.
pub fn layout_fingerprint() -> String {
    let mut hasher = Sha256::new();
    hasher.update(LAYOUT_REVISION.to_le_bytes());

    let clock = reference_clock();
    let (record, categories) = reference_inventory();
    let inventory = layout_inventory(&record, &categories, &clock, 1);
    let order = layout_order(&reference_order(), &clock, &PhotoLoader::new(""));

    for page in [&inventory, &order] {
        match serde_json::to_vec(page) {
            Ok(bytes) => hasher.update(&bytes),
            Err(err) => warn!(error = %err, "Failed to serialize reference layout"),
        }
    }

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Result of a version check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionOutcome {
    /// Version the record should carry from now on.
    pub version: u32,
    pub bumped: bool,
}

/// Compares `fingerprint` with the stored one and bumps `current` if it changed.
///
/// A missing stored value records a baseline without bumping. Store errors are
/// logged and treated as "no change".
pub fn check_version(store: &mut dyn ConfigStore, fingerprint: &str, current: Option<u32>) -> VersionOutcome {
    let current = current.unwrap_or(1);
    let unchanged = VersionOutcome {
        version: current,
        bumped: false,
    };

    let stored = match store.get(FINGERPRINT_KEY) {
        Ok(stored) => stored,
        Err(err) => {
            warn!(error = %err, "Failed to read layout fingerprint, skipping version check");
            return unchanged;
        }
    };

    match stored {
        Some(stored) if stored == fingerprint => {
            debug!("Layout unchanged");
            unchanged
        }
        Some(_) => {
            if let Err(err) = store.set(FINGERPRINT_KEY, fingerprint) {
                warn!(error = %err, "Failed to store layout fingerprint, skipping version bump");
                return unchanged;
            }
            let version = current.saturating_add(1);
            info!(version, "Layout changed, document version bumped");
            VersionOutcome { version, bumped: true }
        }
        None => {
            if let Err(err) = store.set(FINGERPRINT_KEY, fingerprint) {
                warn!(error = %err, "Failed to store layout fingerprint baseline");
            }
            unchanged
        }
    }
}
