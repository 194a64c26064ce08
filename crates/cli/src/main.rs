//! Esther CLI - Catalog administration tools.
//!
//! # Usage
//!
//! ```bash
//! # List products, categories and section banners
//! esther catalog list
//!
//! # Create a category
//! esther category add -n "Blusas" -g women
//!
//! # Create a product with two colors and sizes
//! esther product add -n "Blusa Lino" -p 89.90 -c <category-id> -g women \
//!     --color "Rojo:#ff0000" --color Azul --size S,M,L
//!
//! # Change a product's price and sizes, keeping everything else
//! esther product edit <product-id> -p 95 --size M,L
//!
//! # Upload images to a product (or one of its colors)
//! esther product images <product-id> front.jpg back.jpg --color <color-id>
//!
//! # Point a section banner at an uploaded file
//! esther section set main_banner --file banner.webp
//!
//! # Remove a section banner record
//! esther section clear women
//!
//! # Delete an image binary from the CDN
//! esther image delete https://res.cloudinary.com/...
//! ```
//!
//! Reads the same environment as the storefront binary.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use esther_core::{Gender, SectionKey, SizeName};

mod commands;

#[derive(Parser)]
#[command(name = "esther")]
#[command(author, version, about = "Esther catalog admin tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage products and their galleries
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Manage section banners
    Section {
        #[command(subcommand)]
        action: SectionAction,
    },
    /// Manage image binaries on the CDN
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List products, categories and section banners
    List,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Create a category
    Add {
        #[arg(short, long)]
        name: String,

        /// Partition (`women`, `men`, `cold_weather`)
        #[arg(short, long)]
        gender: Gender,
    },
    /// Delete a category
    Delete { id: String },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Create a product
    Add {
        #[arg(short, long)]
        name: String,

        /// Price in Bs; empty means zero
        #[arg(short, long, default_value = "")]
        price: String,

        /// Category id
        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        gender: Gender,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Sizes offered, comma separated (XS, S, M, L, XL, XXL)
        #[arg(long, value_delimiter = ',')]
        size: Vec<SizeName>,

        /// Color as `Name` or `Name:#hex`, repeatable
        #[arg(long)]
        color: Vec<String>,

        /// Existing image URL, repeatable
        #[arg(long)]
        image_url: Vec<String>,
    },
    /// Change fields of an existing product
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        /// Price in Bs
        #[arg(short, long)]
        price: Option<String>,

        /// Category id
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        gender: Option<Gender>,

        #[arg(short, long)]
        description: Option<String>,

        /// Replace the offered sizes, comma separated
        #[arg(long, value_delimiter = ',', num_args = 0..)]
        size: Option<Vec<SizeName>>,

        /// Append a color as `Name` or `Name:#hex`, repeatable
        #[arg(long)]
        add_color: Vec<String>,
    },
    /// Delete a product
    Delete { id: String },
    /// Upload images to a product's general gallery or one color
    Images {
        id: String,

        /// Color id to attach the images to
        #[arg(long)]
        color: Option<String>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Drop an image reference from a product (the binary is kept)
    RemoveImage { id: String, url: String },
}

#[derive(Subcommand)]
enum SectionAction {
    /// Point a section at an image URL or an uploaded file
    Set {
        /// `main_banner`, `women`, `men` or `cold_weather`
        key: SectionKey,

        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        url: Option<String>,

        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Remove a section's image record
    Clear { key: SectionKey },
}

#[derive(Subcommand)]
enum ImageAction {
    /// Delete an image by delivery URL or public id
    Delete { target: String },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let admin = commands::admin_service()?;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(&admin).await?,
        },
        Commands::Category { action } => match action {
            CategoryAction::Add { name, gender } => {
                commands::category::add(&admin, name, gender).await?;
            }
            CategoryAction::Delete { id } => commands::category::delete(&admin, &id).await?,
        },
        Commands::Product { action } => match action {
            ProductAction::Add {
                name,
                price,
                category,
                gender,
                description,
                size,
                color,
                image_url,
            } => {
                let colors = color
                    .iter()
                    .map(String::as_str)
                    .map(commands::product::parse_color)
                    .collect();
                let draft = esther_core::drafts::ProductDraft {
                    name,
                    price,
                    description,
                    category_id: category,
                    gender,
                    image_urls: image_url,
                    colors,
                    sizes: size,
                };
                commands::product::add(&admin, draft).await?;
            }
            ProductAction::Edit {
                id,
                name,
                price,
                category,
                gender,
                description,
                size,
                add_color,
            } => {
                let edit = commands::product::ProductEdit {
                    name,
                    price,
                    category,
                    gender,
                    description,
                    sizes: size,
                    colors: add_color
                        .iter()
                        .map(String::as_str)
                        .map(commands::product::parse_color)
                        .collect(),
                };
                commands::product::edit(&admin, &id, edit).await?;
            }
            ProductAction::Delete { id } => commands::product::delete(&admin, &id).await?,
            ProductAction::Images { id, color, files } => {
                commands::product::upload_images(&admin, &id, color.as_deref(), &files).await?;
            }
            ProductAction::RemoveImage { id, url } => {
                commands::product::remove_image(&admin, &id, &url).await?;
            }
        },
        Commands::Section { action } => match action {
            SectionAction::Set { key, url, file } => {
                commands::section::set(&admin, key, url.as_deref(), file.as_deref()).await?;
            }
            SectionAction::Clear { key } => commands::section::clear(&admin, key).await?,
        },
        Commands::Image { action } => match action {
            ImageAction::Delete { target } => commands::image::delete(&admin, &target).await?,
        },
    }
    Ok(())
}
