use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use bakery_docs::fonts::{FontChoice, FontFaces, FontProvisioner, HttpFetcher};
use bakery_docs::model::{read_json, write_json, CategoryDefinition, InventoryRecord, OrderRecord};
use bakery_docs::version::JsonFileStore;
use bakery_docs::{RenderClock, RenderSettings, Renderer};
use clap::{Parser, Subcommand};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "bakery-docs")]
#[command(version = "0.1.0")]
#[command(about = "Renders bakery order and inventory sheets to PDF", long_about = None)]
struct Cli {
    /// Settings file (JSON); defaults are used for missing keys
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an order sheet and store its path on the record
    Order {
        /// Order record (JSON)
        record: PathBuf,
    },
    /// Render an inventory sheet and store its path and version on the record
    Inventory {
        /// Inventory record (JSON)
        record: PathBuf,
        /// Category definitions (JSON array)
        #[arg(long)]
        categories: PathBuf,
    },
    /// Download the configured font pair if it is missing
    Fonts,
}

fn default_config_path() -> PathBuf {
    directories::ProjectDirs::from("ro", "Cofetarie", "bakery-docs")
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("settings.json"))
}

fn provision_fonts(settings: &RenderSettings) -> FontChoice {
    let provisioner = FontProvisioner::new(
        &settings.fonts_dir,
        settings.font_family.clone(),
        settings.font_sources.clone(),
    );
    provisioner.ensure(&HttpFetcher::new(settings.download_timeout()))
}

fn renderer(settings: &RenderSettings) -> Renderer {
    let fonts = FontFaces::load(&provision_fonts(settings));
    Renderer::from_settings(settings, fonts)
}

fn render_order(settings: &RenderSettings, record_path: &Path) -> anyhow::Result<()> {
    let mut order: OrderRecord = read_json(record_path)?;
    let path = renderer(settings).render_order(&order, &RenderClock::now())?;

    order.pdf_path = Some(path.to_string_lossy().into_owned());
    write_json(record_path, &order).context("Failed to store PDF path on the order")?;
    println!("{}", path.display());
    Ok(())
}

fn render_inventory(settings: &RenderSettings, record_path: &Path, categories_path: &Path) -> anyhow::Result<()> {
    let mut record: InventoryRecord = read_json(record_path)?;
    let categories: Vec<CategoryDefinition> = read_json(categories_path)?;
    let mut store = JsonFileStore::new(&settings.store_path);

    let doc = renderer(settings).render_inventory(&record, &categories, &RenderClock::now(), &mut store)?;

    record.pdf_path = Some(doc.path.to_string_lossy().into_owned());
    record.document_version = Some(doc.document_version.version);
    write_json(record_path, &record).context("Failed to store PDF path on the inventory")?;
    println!("{}", doc.path.display());
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let args = Cli::parse();
    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let settings = RenderSettings::load(&config_path);

    let result = match &args.command {
        Command::Order { record } => render_order(&settings, record),
        Command::Inventory { record, categories } => render_inventory(&settings, record, categories),
        Command::Fonts => {
            match provision_fonts(&settings) {
                FontChoice::Family { regular, bold } => {
                    info!(regular = ?regular, bold = ?bold, "Fonts ready");
                }
                FontChoice::Builtin => {
                    info!("Fonts unavailable, documents will use the builtin font");
                }
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = ?err, "Command failed");
            ExitCode::FAILURE
        }
    }
}
