//! Product commands.

use std::path::PathBuf;

use esther_core::drafts::{ColorDraft, ProductDraft};
use esther_core::{ColorId, Gender, ProductId, SizeName};
use esther_storefront::admin::{AdminService, GalleryUpdate};

use super::{CliError, read_image};

/// Parse a `--color` value: `Name` or `Name:#hex`.
pub fn parse_color(raw: &str) -> ColorDraft {
    let (name, hex_code) = raw.split_once(':').unwrap_or((raw, ""));
    ColorDraft {
        id: None,
        name: name.trim().to_string(),
        hex_code: hex_code.trim().to_string(),
        image_urls: Vec::new(),
    }
}

pub async fn add(admin: &AdminService, draft: ProductDraft) -> Result<(), CliError> {
    let product = admin.add_product(draft).await?;
    tracing::info!("Created product {} ({})", product.name, product.id);
    for color in &product.colors {
        tracing::info!("  color {} {} ({})", color.name, color.hex_code, color.id);
    }
    Ok(())
}

/// Field overrides for `product edit`; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct ProductEdit {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
    pub gender: Option<Gender>,
    pub description: Option<String>,
    pub sizes: Option<Vec<SizeName>>,
    /// Colors appended to the existing ones.
    pub colors: Vec<ColorDraft>,
}

impl ProductEdit {
    fn apply(self, draft: &mut ProductDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(category) = self.category {
            draft.category_id = category;
        }
        if let Some(gender) = self.gender {
            draft.gender = gender;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(sizes) = self.sizes {
            draft.sizes = sizes;
        }
        draft.colors.extend(self.colors);
    }
}

/// Load a product, apply `edit` and save it.
pub async fn edit(admin: &AdminService, id: &str, edit: ProductEdit) -> Result<(), CliError> {
    let id = ProductId::new(id);
    let mut draft = ProductDraft::from(&admin.product(&id).await?);
    edit.apply(&mut draft);

    let product = admin.update_product(&id, draft).await?;
    tracing::info!(
        "Updated product {} ({}) - {} Bs",
        product.name,
        product.id,
        product.price.display()
    );
    Ok(())
}

pub async fn delete(admin: &AdminService, id: &str) -> Result<(), CliError> {
    admin.delete_product(&ProductId::new(id)).await?;
    Ok(())
}

/// Upload files to the general gallery, or to one color when given.
pub async fn upload_images(
    admin: &AdminService,
    id: &str,
    color: Option<&str>,
    paths: &[PathBuf],
) -> Result<(), CliError> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(read_image(path).await?);
    }

    let id = ProductId::new(id);
    let GalleryUpdate { product, batch } = match color {
        Some(color) => {
            admin
                .add_color_images(&id, &ColorId::new(color), &files)
                .await?
        }
        None => admin.add_product_images(&id, &files).await?,
    };

    for image in &batch.uploaded {
        tracing::info!("Uploaded {}", image.url);
    }
    for (file_name, error) in &batch.failed {
        tracing::warn!("Failed to upload {file_name}: {error}");
    }
    tracing::info!(
        "{} now has {} general images",
        product.name,
        product.image_urls.len()
    );
    Ok(())
}

pub async fn remove_image(admin: &AdminService, id: &str, url: &str) -> Result<(), CliError> {
    let product = admin.remove_product_image(&ProductId::new(id), url).await?;
    tracing::info!("Removed image from {}", product.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored() -> ProductDraft {
        ProductDraft {
            name: "Blusa Lino".to_string(),
            price: "89.90".to_string(),
            category_id: "c1".to_string(),
            gender: Gender::Women,
            colors: vec![parse_color("Rojo")],
            sizes: vec![SizeName::S],
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_edit_keeps_unset_fields() {
        let mut draft = stored();
        ProductEdit {
            price: Some("95".to_string()),
            ..ProductEdit::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.price, "95");
        assert_eq!(draft.name, "Blusa Lino");
        assert_eq!(draft.category_id, "c1");
        assert_eq!(draft.sizes, vec![SizeName::S]);
    }

    #[test]
    fn test_edit_replaces_sizes_and_appends_colors() {
        let mut draft = stored();
        ProductEdit {
            gender: Some(Gender::ColdWeather),
            sizes: Some(vec![]),
            colors: vec![parse_color("Azul:#0000ff")],
            ..ProductEdit::default()
        }
        .apply(&mut draft);

        assert_eq!(draft.gender, Gender::ColdWeather);
        assert!(draft.sizes.is_empty());
        let names: Vec<&str> = draft.colors.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Rojo", "Azul"]);
    }

    #[test]
    fn test_parse_color_with_hex() {
        let color = parse_color("Rojo:#ff0000");
        assert_eq!(color.name, "Rojo");
        assert_eq!(color.hex_code, "#ff0000");
        assert!(color.id.is_none());
    }

    #[test]
    fn test_parse_color_name_only() {
        let color = parse_color(" Azul ");
        assert_eq!(color.name, "Azul");
        assert_eq!(color.hex_code, "");
    }
}
