//! Admin input before it is sent to the data gateway.
//!
//! Drafts carry raw form values. Validation turns them into the records the
//! gateway accepts, so nothing malformed ever reaches the network.

use serde::{Deserialize, Serialize};

use crate::types::{
    CategoryId, Color, ColorId, Gender, Price, PriceError, Product, SectionKey, Size, SizeName,
};

/// Swatch used when a color is saved without one.
pub const DEFAULT_HEX_CODE: &str = "#000000";

/// Reasons an admin draft is rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("name is required")]
    MissingName,

    #[error("category is required")]
    MissingCategory,

    #[error(transparent)]
    Price(#[from] PriceError),

    /// A color at the given position has no name.
    #[error("color #{0} needs a name")]
    UnnamedColor(usize),

    #[error("image url is required")]
    MissingImageUrl,
}

/// Raw product form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    /// Price as typed; an empty field means zero.
    pub price: String,
    pub description: String,
    pub category_id: String,
    pub gender: Gender,
    pub image_urls: Vec<String>,
    pub colors: Vec<ColorDraft>,
    pub sizes: Vec<SizeName>,
}

/// Raw color variant values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorDraft {
    /// Existing id when editing a saved color.
    pub id: Option<ColorId>,
    pub name: String,
    pub hex_code: String,
    pub image_urls: Vec<String>,
}

/// A validated product as written to the gateway, without server fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub image_urls: Vec<String>,
    pub category_id: CategoryId,
    pub gender: Gender,
    pub colors: Vec<Color>,
    pub sizes: Vec<Size>,
}

/// Raw category form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSectionImage {
    pub gender: SectionKey,
    pub image_url: String,
}

impl ProductDraft {
    /// Validate the form into a product record.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError`] for a blank name or category, a negative or
    /// unparseable price, or an unnamed color.
    pub fn validate(self) -> Result<NewProduct, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }

        let category_id = self.category_id.trim();
        if category_id.is_empty() {
            return Err(DraftError::MissingCategory);
        }

        let price_input = self.price.trim();
        let price = if price_input.is_empty() {
            Price::default()
        } else {
            price_input.parse::<Price>()?
        };

        let colors = self
            .colors
            .into_iter()
            .enumerate()
            .map(|(i, color)| {
                if color.name.trim().is_empty() {
                    Err(DraftError::UnnamedColor(i + 1))
                } else {
                    Ok(color.into_color())
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut size_names = self.sizes;
        size_names.sort_unstable();
        size_names.dedup();

        Ok(NewProduct {
            name: name.to_owned(),
            price,
            description: self.description.trim().to_owned(),
            image_urls: non_empty_urls(self.image_urls),
            category_id: CategoryId::new(category_id),
            gender: self.gender,
            colors,
            sizes: size_names.into_iter().map(Size::new).collect(),
        })
    }
}

impl From<&Product> for NewProduct {
    /// Editable fields of a stored product, for partial edits.
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            image_urls: product.image_urls.clone(),
            category_id: product.category_id.clone(),
            gender: product.gender,
            colors: product.colors.clone(),
            sizes: product.sizes.clone(),
        }
    }
}

impl NewProduct {
    /// Reuse the ids of `existing` sizes that are still offered.
    pub fn keep_size_ids(&mut self, existing: &[Size]) {
        for size in &mut self.sizes {
            if let Some(old) = existing.iter().find(|old| old.name == size.name) {
                size.id = old.id.clone();
            }
        }
    }
}

impl From<&Product> for ProductDraft {
    /// Prefill the edit form from a stored product.
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: product.price.amount().to_string(),
            description: product.description.clone(),
            category_id: product.category_id.to_string(),
            gender: product.gender,
            image_urls: product.image_urls.clone(),
            colors: product
                .colors
                .iter()
                .map(|color| ColorDraft {
                    id: Some(color.id.clone()),
                    name: color.name.clone(),
                    hex_code: color.hex_code.clone(),
                    image_urls: color.image_urls.clone(),
                })
                .collect(),
            sizes: product.sizes.iter().map(|size| size.name).collect(),
        }
    }
}

impl ColorDraft {
    /// Build the color record, keeping an existing id or generating a new one.
    #[must_use]
    pub fn into_color(self) -> Color {
        let hex_code = match self.hex_code.trim() {
            "" => DEFAULT_HEX_CODE.to_owned(),
            hex => hex.to_owned(),
        };

        Color {
            id: self.id.unwrap_or_else(ColorId::generate),
            name: self.name.trim().to_owned(),
            hex_code,
            image_urls: non_empty_urls(self.image_urls),
        }
    }
}

impl CategoryDraft {
    /// # Errors
    ///
    /// Returns [`DraftError::MissingName`] for a blank name.
    pub fn validate(self) -> Result<NewCategory, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }
        Ok(NewCategory {
            name: name.to_owned(),
            gender: self.gender,
        })
    }
}

impl NewSectionImage {
    /// # Errors
    ///
    /// Returns [`DraftError::MissingImageUrl`] for a blank url.
    pub fn new(gender: SectionKey, image_url: &str) -> Result<Self, DraftError> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(DraftError::MissingImageUrl);
        }
        Ok(Self {
            gender,
            image_url: image_url.to_owned(),
        })
    }
}

fn non_empty_urls(urls: Vec<String>) -> Vec<String> {
    urls.into_iter()
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty())
        .collect()
}
