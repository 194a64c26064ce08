//! Catalog records as stored by the data gateway.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::gender::{Gender, SectionKey};
use super::id::{CategoryId, ColorId, ProductId, SectionImageId};
use super::price::Price;
use super::size::Size;

/// A product listed in the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// General images, shown when no color is selected.
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_urls: Vec<String>,
    pub category_id: CategoryId,
    pub gender: Gender,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: Vec<Color>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sizes: Vec<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Look up one of this product's colors.
    #[must_use]
    pub fn color(&self, id: &ColorId) -> Option<&Color> {
        self.colors.iter().find(|color| &color.id == id)
    }

    /// Whether the product has no images at all, general or per color.
    #[must_use]
    pub fn has_no_images(&self) -> bool {
        self.image_urls.is_empty() && self.colors.iter().all(|c| c.image_urls.is_empty())
    }
}

/// A color variant with its own image set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
    /// Swatch value, e.g. `#000000`.
    pub hex_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_urls: Vec<String>,
}

/// A product category scoped to one gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub gender: Gender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Banner image for a catalog partition or the main banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionImage {
    pub id: SectionImageId,
    pub gender: SectionKey,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Decode JSON `null` as the type's default value.
///
/// Older rows store `null` instead of an empty array or string.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_null_image_lists_decode_as_empty() {
        let json = r##"{
            "id": "p1",
            "name": "Vestido Elegante Negro",
            "price": 89.99,
            "description": null,
            "image_urls": null,
            "category_id": "dresses",
            "gender": "women",
            "colors": [{"id": "c1", "name": "Negro", "hex_code": "#000000", "image_urls": null}]
        }"##;

        let product: Product = serde_json::from_str(json).unwrap();
        assert!(product.image_urls.is_empty());
        assert!(product.sizes.is_empty());
        assert!(product.description.is_empty());
        assert!(product.has_no_images());
    }

    #[test]
    fn test_color_lookup() {
        let json = r##"{
            "id": "p1", "name": "Blusa", "price": "45.99", "category_id": "shirts",
            "gender": "women",
            "colors": [{"id": "c1", "name": "Blanco", "hex_code": "#ffffff", "image_urls": ["a.jpg"]}]
        }"##;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.color(&ColorId::new("c1")).unwrap().name, "Blanco");
        assert!(product.color(&ColorId::new("missing")).is_none());
        assert!(!product.has_no_images());
    }

    #[test]
    fn test_section_image_main_banner() {
        let json = r#"{"id": "s1", "gender": "main_banner", "image_url": "https://cdn/x.jpg"}"#;
        let image: SectionImage = serde_json::from_str(json).unwrap();
        assert_eq!(image.gender, SectionKey::MainBanner);
    }
}
