//! Records handed to the renderer by the rest of the application.
//!
//! The JSON shape matches what the REST layer serializes (camelCase keys).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    /// Public URL path, e.g. `/uploads/abc.jpg`.
    pub url: String,
    /// Filesystem path recorded at upload time; may be stale.
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub is_foaie_de_zahar: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRecord {
    pub id: i64,
    pub order_number: i64,
    pub client_name: String,
    pub client_phone: Option<String>,
    /// `ridicare` (pickup) or `livrare` (delivery).
    pub delivery_method: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub staff_name: Option<String>,
    pub pickup_date: Option<DateTime<Utc>>,
    pub advance: Option<f64>,
    pub no_cake: bool,
    pub cake_type: Option<String>,
    pub weight: Option<String>,
    pub custom_weight: Option<String>,
    pub shape: Option<String>,
    pub floors: Option<u32>,
    pub other_products: Option<String>,
    pub coating: Option<String>,
    pub color1: Option<String>,
    pub color2: Option<String>,
    pub decor_type: Option<String>,
    pub decor_details: Option<String>,
    pub observations: Option<String>,
    pub photos: Vec<Photo>,
    pub pdf_path: Option<String>,
}

impl OrderRecord {
    /// `(sugar_sheet, regular)`: the first flagged photo, and every unflagged one.
    ///
    /// Extra flagged photos beyond the first are neither.
    pub fn split_photos(&self) -> (Option<&Photo>, Vec<&Photo>) {
        split_photos(&self.photos)
    }
}

pub fn split_photos(photos: &[Photo]) -> (Option<&Photo>, Vec<&Photo>) {
    let sugar = photos.iter().find(|p| p.is_foaie_de_zahar);
    let regular = photos.iter().filter(|p| !p.is_foaie_de_zahar).collect();
    (sugar, regular)
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StockLine {
    pub reception_date: Option<NaiveDate>,
    pub quantity: f64,
    pub unit: String,
    pub required_quantity: f64,
    pub required_unit: String,
}

impl StockLine {
    pub fn has_data(&self) -> bool {
        self.quantity > 0.0 || self.required_quantity > 0.0
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryEntry {
    pub category: String,
    pub product_name: String,
    pub is_custom_product: bool,
    pub stock_lines: Vec<StockLine>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub username: String,
    /// Submission day; one record per user per day.
    pub date: NaiveDate,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub document_version: Option<u32>,
    #[serde(default)]
    pub entries: Vec<InventoryEntry>,
}

impl InventoryRecord {
    /// Stock lines with data for `product` in `category`, across all entries.
    pub fn lines_for<'a>(&'a self, category: &'a str, product: &'a str) -> impl Iterator<Item = &'a StockLine> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.category == category && e.product_name == product)
            .flat_map(|e| e.stock_lines.iter())
            .filter(|l| l.has_data())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    pub name: String,
    pub units: Vec<String>,
    pub default_unit: String,
    #[serde(default)]
    pub products: Vec<String>,
}

impl CategoryDefinition {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            bail!("category with empty name");
        }
        if self.units.is_empty() {
            bail!("category '{}' has no units", self.name);
        }
        if !self.units.contains(&self.default_unit) {
            bail!(
                "category '{}': default unit '{}' is not one of {:?}",
                self.name,
                self.default_unit,
                self.units
            );
        }
        let mut seen = HashSet::new();
        for product in &self.products {
            if !seen.insert(product.as_str()) {
                bail!("category '{}' lists product '{}' twice", self.name, product);
            }
        }
        Ok(())
    }
}

/// Validates a full definition list: each category, plus unique names.
pub fn validate_categories(categories: &[CategoryDefinition]) -> anyhow::Result<()> {
    let mut names = HashSet::new();
    for category in categories {
        category.validate()?;
        if !names.insert(category.name.as_str()) {
            bail!("category '{}' defined twice", category.name);
        }
    }
    Ok(())
}

/// Reads a JSON document from disk.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

/// Writes a JSON document to disk, pretty-printed.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: i64, sugar: bool) -> Photo {
        Photo {
            id,
            url: format!("/uploads/{}.jpg", id),
            path: None,
            is_foaie_de_zahar: sugar,
        }
    }

    #[test]
    fn test_split_photos_first_flag_wins() {
        let photos = vec![photo(1, false), photo(2, true), photo(3, true), photo(4, false)];
        let (sugar, regular) = split_photos(&photos);
        assert_eq!(sugar.map(|p| p.id), Some(2));
        assert_eq!(regular.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn test_split_photos_trusts_only_the_flag() {
        let mut p = photo(1, false);
        p.url = "/uploads/foaie-de-zahar-1.jpg".to_string();
        let photos = [p];
        let (sugar, regular) = split_photos(&photos);
        assert!(sugar.is_none());
        assert_eq!(regular.len(), 1);
    }

    #[test]
    fn test_order_json_shape() {
        let json = r#"{
            "orderNumber": 12,
            "clientName": "Ana",
            "pickupDate": "2024-06-10T09:00:00Z",
            "noCake": false,
            "photos": [{"id": 1, "url": "/uploads/a.jpg", "isFoaieDeZahar": true}]
        }"#;
        let order: OrderRecord = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_number, 12);
        assert!(order.photos[0].is_foaie_de_zahar);
        assert!(order.pickup_date.is_some());
    }

    #[test]
    fn test_inventory_lines_for_filters_empty_lines() {
        let json = r#"{
            "username": "ana",
            "date": "2024-06-10",
            "entries": [
                {"category": "Creme", "productName": "Frisca", "stockLines": [
                    {"receptionDate": "2024-06-09", "quantity": 2, "unit": "kg"},
                    {"quantity": 0, "requiredQuantity": 0}
                ]},
                {"category": "Creme", "productName": "Frisca", "stockLines": [
                    {"requiredQuantity": 1, "requiredUnit": "l"}
                ]}
            ]
        }"#;
        let record: InventoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.lines_for("Creme", "Frisca").count(), 2);
        assert_eq!(record.lines_for("Creme", "Ganache").count(), 0);
    }

    fn category(name: &str) -> CategoryDefinition {
        CategoryDefinition {
            name: name.to_string(),
            units: vec!["kg".to_string(), "buc".to_string()],
            default_unit: "kg".to_string(),
            products: vec!["A".to_string(), "B".to_string()],
        }
    }

    #[test]
    fn test_category_validation() {
        assert!(validate_categories(&[category("Creme"), category("Blaturi")]).is_ok());
        assert!(validate_categories(&[category("Creme"), category("Creme")]).is_err());

        let mut bad_unit = category("Creme");
        bad_unit.default_unit = "l".to_string();
        assert!(bad_unit.validate().is_err());

        let mut dup = category("Creme");
        dup.products.push("A".to_string());
        assert!(dup.validate().is_err());

        assert!(category(" ").validate().is_err());
    }
}
