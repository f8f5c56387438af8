//! wardrobe: command-line front end for the wardrobe catalogue.
//!
//! Results are printed to stdout as JSON; logs go to stderr or `LOG_FILE`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use wardrobe_app::report;
use wardrobe_app::telemetry::{self, LogSettings};
use wardrobe_app::{AppConfig, CatalogService, NewItem, OutfitBrowserService, OutfitBuilderService};
use wardrobe_db::{
    from_record_in, log_pool_metrics, outfit_type_label, BlobStore, CategoryFilter, ClothingItem,
    ClothingItemRepository, Database, DeleteOutcome, FilesystemBackend, ItemCategory, ItemFilter,
    OutfitFilter, OutfitRepository, SavedOutfit, SlotKey, TypeFilter, UpdateItemRequest,
};

#[derive(Parser)]
#[command(name = "wardrobe")]
#[command(author, version, about = "Clothing catalogue and outfit builder")]
#[command(propagate_version = true)]
struct Cli {
    /// Acting user id (overrides WARDROBE_USER_ID)
    #[arg(short, long, global = true)]
    user: Option<Uuid>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage clothing items
    Items {
        #[command(subcommand)]
        command: ItemCommands,
    },

    /// Compose and browse saved outfits
    Outfits {
        #[command(subcommand)]
        command: OutfitCommands,
    },

    /// Apply pending database migrations
    Migrate,
}

#[derive(Subcommand)]
enum ItemCommands {
    /// List items, newest first
    List {
        /// Category, "favorites" or "all"
        #[arg(short, long, default_value = "all")]
        category: CategoryFilter,

        /// Case-insensitive match on name or color
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Upload an image and create an item
    Add {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        category: ItemCategory,

        #[arg(long)]
        color: String,

        /// Image file to upload
        #[arg(short, long)]
        image: PathBuf,

        /// Optional http(s) link to where the item can be bought
        #[arg(short, long)]
        purchase_link: Option<String>,
    },

    /// Change item details
    Edit {
        id: Uuid,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        category: Option<ItemCategory>,

        #[arg(long)]
        color: Option<String>,

        #[arg(short, long, conflicts_with = "clear_link")]
        purchase_link: Option<String>,

        /// Remove the purchase link
        #[arg(long)]
        clear_link: bool,
    },

    /// Set or clear the favorite flag
    Favorite {
        id: Uuid,
        #[arg(action = clap::ArgAction::Set)]
        favorite: bool,
    },

    /// Delete an item
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum OutfitCommands {
    /// List saved outfits, newest first
    List {
        /// Case-insensitive match on outfit name
        #[arg(short, long)]
        search: Option<String>,

        /// Outfit type or "all"
        #[arg(short = 't', long = "type", default_value = "all")]
        outfit_type: String,
    },

    /// Save an outfit from slot assignments or a free item list
    Save {
        #[arg(short, long)]
        name: String,

        #[arg(short = 't', long = "type")]
        outfit_type: Option<String>,

        #[arg(long)]
        season: Option<String>,

        #[arg(long, conflicts_with = "item")]
        top: Option<Uuid>,

        #[arg(long, conflicts_with = "item")]
        bottom: Option<Uuid>,

        #[arg(long, conflicts_with = "item")]
        shoes: Option<Uuid>,

        #[arg(long, conflicts_with = "item")]
        accessory: Option<Uuid>,

        /// Item for a free-selection outfit (repeatable)
        #[arg(short, long)]
        item: Vec<Uuid>,
    },

    /// Show one outfit with its items resolved
    Show { id: Uuid },

    /// Set or clear the favorite flag
    Favorite {
        id: Uuid,
        #[arg(action = clap::ArgAction::Set)]
        favorite: bool,
    },

    /// Delete an outfit
    Delete { id: Uuid },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let _log_guard = telemetry::init(&LogSettings::from_env());

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let detail = format!("{:#}", e);
            error!(subsystem = "cli", error = %detail, "Command failed");
            eprintln!("Error: {}", report::user_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// Stores and settings shared by every command.
struct AppContext {
    config: AppConfig,
    user_id: Uuid,
    items: Arc<dyn ClothingItemRepository>,
    outfits: Arc<dyn OutfitRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl AppContext {
    fn catalog(&self) -> CatalogService {
        CatalogService::new(self.items.clone(), self.blobs.clone(), self.user_id)
            .with_max_image_bytes(self.config.max_image_bytes)
    }

    fn browser(&self) -> OutfitBrowserService {
        OutfitBrowserService::new(self.outfits.clone(), self.user_id)
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<Database> {
    Database::connect_with_config(&config.database_url, config.pool_config())
        .await
        .context("connecting to database")
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    if cli.user.is_some() {
        config.user_id = cli.user;
    }

    let db = connect(&config).await?;
    if let Commands::Migrate = cli.command {
        db.migrate().await.context("running migrations")?;
        info!(subsystem = "cli", op = "migrate", "Migrations applied");
        return Ok(());
    }

    let blobs = FilesystemBackend::new(&config.storage_path, &config.public_base_url);
    blobs
        .validate()
        .await
        .map_err(|e| anyhow::anyhow!("image storage unavailable: {}", e))?;

    let ctx = AppContext {
        user_id: config.require_user()?,
        items: Arc::new(db.items.clone()),
        outfits: Arc::new(db.outfits.clone()),
        blobs: Arc::new(blobs),
        config,
    };

    let result = match cli.command {
        Commands::Items { command } => run_items(&ctx, command).await,
        Commands::Outfits { command } => run_outfits(&ctx, command).await,
        Commands::Migrate => Ok(()),
    };
    log_pool_metrics(db.pool());
    result
}

async fn run_items(ctx: &AppContext, command: ItemCommands) -> anyhow::Result<()> {
    let catalog = ctx.catalog();
    catalog.refresh().await?;

    match command {
        ItemCommands::List { category, search } => {
            let mut filter = ItemFilter::new().with_category(category);
            if let Some(text) = search {
                filter = filter.with_search(text);
            }
            print_json(&catalog.list(&filter))
        }
        ItemCommands::Add {
            name,
            category,
            color,
            image,
            purchase_link,
        } => {
            let data = tokio::fs::read(&image)
                .await
                .with_context(|| format!("reading {}", image.display()))?;
            let new = NewItem {
                name,
                category,
                color,
                purchase_link,
            };
            print_json(&catalog.add_item(new, &data).await?)
        }
        ItemCommands::Edit {
            id,
            name,
            category,
            color,
            purchase_link,
            clear_link,
        } => {
            let req = UpdateItemRequest {
                name,
                category,
                color,
                purchase_link: if clear_link {
                    Some(None)
                } else {
                    purchase_link.map(Some)
                },
            };
            print_json(&catalog.edit_item(id, req).await?)
        }
        ItemCommands::Favorite { id, favorite } => {
            print_json(&catalog.set_favorite(id, favorite).await?)
        }
        ItemCommands::Delete { id } => print_json(
            &catalog
                .delete_item(id)
                .await?
                .map(|outcome| Deleted { id, outcome }),
        ),
    }
}

async fn run_outfits(ctx: &AppContext, command: OutfitCommands) -> anyhow::Result<()> {
    match command {
        OutfitCommands::List {
            search,
            outfit_type,
        } => {
            let browser = ctx.browser();
            browser.refresh().await?;
            let mut filter = OutfitFilter::new().with_type(TypeFilter::from(outfit_type));
            if let Some(text) = search {
                filter = filter.with_search(text);
            }
            print_json(&browser.filter(&filter))
        }
        OutfitCommands::Save {
            name,
            outfit_type,
            season,
            top,
            bottom,
            shoes,
            accessory,
            item,
        } => {
            let catalog = ctx.catalog();
            catalog.refresh().await?;

            let builder = if item.is_empty() {
                let builder = OutfitBuilderService::fixed(ctx.outfits.clone(), ctx.user_id);
                let slots = [
                    (SlotKey::Top, top),
                    (SlotKey::Bottom, bottom),
                    (SlotKey::Shoes, shoes),
                    (SlotKey::Accessory, accessory),
                ];
                for (slot, id) in slots {
                    if let Some(id) = id {
                        require_item(&catalog, id)?;
                        builder.assign(slot, id)?;
                    }
                }
                builder
            } else {
                let builder = OutfitBuilderService::free(ctx.outfits.clone(), ctx.user_id);
                for id in item {
                    let found = require_item(&catalog, id)?;
                    if !builder.toggle(&found)? {
                        bail!("item {} listed twice", id);
                    }
                }
                builder
            };

            print_json(
                &builder
                    .save(&name, outfit_type.as_deref(), season.as_deref())
                    .await?,
            )
        }
        OutfitCommands::Show { id } => {
            let outfit = ctx.outfits.fetch(ctx.user_id, id).await?;
            let catalog = ctx.catalog();
            catalog.refresh().await?;
            let restored = catalog.with_catalog(|c| from_record_in(&outfit.items, c));
            let resolved_items: Vec<ClothingItem> = restored
                .assignment
                .item_ids()
                .into_iter()
                .filter_map(|item_id| catalog.get(item_id))
                .collect();

            print_json(&OutfitView {
                type_label: outfit_type_label(outfit.outfit_type.as_deref()),
                outfit: &outfit,
                resolved_items,
                missing_item_ids: restored.missing,
            })
        }
        OutfitCommands::Favorite { id, favorite } => {
            let browser = ctx.browser();
            browser.refresh().await?;
            print_json(&browser.set_favorite(id, favorite).await?)
        }
        OutfitCommands::Delete { id } => {
            let browser = ctx.browser();
            browser.refresh().await?;
            print_json(
                &browser
                    .delete(id)
                    .await?
                    .map(|outcome| Deleted { id, outcome }),
            )
        }
    }
}

#[derive(Serialize)]
struct Deleted {
    id: Uuid,
    outcome: DeleteOutcome,
}

#[derive(Serialize)]
struct OutfitView<'a> {
    #[serde(flatten)]
    outfit: &'a SavedOutfit,
    type_label: &'static str,
    resolved_items: Vec<ClothingItem>,
    missing_item_ids: Vec<Uuid>,
}

fn require_item(catalog: &CatalogService, id: Uuid) -> anyhow::Result<ClothingItem> {
    catalog
        .get(id)
        .with_context(|| format!("item {} is not in the catalogue", id))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
