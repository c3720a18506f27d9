//! Order and inventory sheet rendering for the bakery back office.
//!
//! Records come in already loaded; the [`render::Renderer`] lays them out on a
//! fixed page, paints the page with krilla and returns the written path.

pub mod dates;
pub mod fonts;
pub mod model;
pub mod naming;
pub mod render;
pub mod settings;
pub mod text;
pub mod version;

pub use dates::{DateHighlight, RenderClock};
pub use fonts::{FontChoice, FontFaces, FontProvisioner, HttpFetcher};
pub use model::{CategoryDefinition, InventoryEntry, InventoryRecord, OrderRecord, Photo, StockLine};
pub use render::{InventoryDocument, Renderer};
pub use settings::RenderSettings;
